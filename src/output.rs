use std::io::Write;

/// A sink for the lines the engines report while they run.
///
/// The engines only ever call [`Output::emit_line`]; whoever owns the run closes the sink once
/// it is done with it.
pub trait Output {
    fn emit_line(&mut self, line: &str);

    fn close(&mut self);
}

/// Writes each line to an [`io::Write`](std::io::Write). Write errors are logged and otherwise
/// ignored.
#[derive(Debug)]
pub struct WriterOutput<W: Write> {
    writer: W,
}

impl<W: Write> WriterOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Output for WriterOutput<W> {
    fn emit_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.writer, "{}", line) {
            log::warn!("failed to write output line: {}", e);
        }
    }

    fn close(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("failed to flush output: {}", e);
        }
    }
}

impl Output for Vec<String> {
    fn emit_line(&mut self, line: &str) {
        self.push(line.to_string());
    }

    fn close(&mut self) {}
}
