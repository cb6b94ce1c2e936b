use clap::{value_t, App, Arg};
use knfsat::*;
use log::{debug, warn};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::str::FromStr;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Algorithm {
    Dpll,
    DpllAll,
    Resolution,
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dpll" => Ok(Algorithm::Dpll),
            "dpll-all" => Ok(Algorithm::DpllAll),
            "resolution" => Ok(Algorithm::Resolution),
            _ => Err(format!("unknown algorithm '{}'", s)),
        }
    }
}

fn main() {
    env_logger::init();

    let matches = App::new("knfsat")
        .about("Decides satisfiability of formulas like {{a, -b}, {b, c}, {-a}}")
        .arg(Arg::with_name("INPUT").help("file holding the formula").index(1))
        .arg(
            Arg::with_name("formula")
                .short("f")
                .long("formula")
                .takes_value(true)
                .value_name("TEXT")
                .conflicts_with("INPUT")
                .help("the formula itself instead of a file"),
        )
        .arg(
            Arg::with_name("algorithm")
                .short("a")
                .long("algorithm")
                .takes_value(true)
                .possible_values(&["dpll", "dpll-all", "resolution"])
                .default_value("dpll")
                .help("dpll finds one satisfying allocation, dpll-all every one, resolution refutes"),
        )
        .arg(
            Arg::with_name("trace")
                .short("t")
                .long("trace")
                .help("print intermediate results"),
        )
        .arg(
            Arg::with_name("timeout")
                .long("timeout")
                .takes_value(true)
                .value_name("SECONDS")
                .validator(validate_timeout)
                .help("abort the run after this many seconds"),
        )
        .get_matches();

    let algorithm = value_t!(matches, "algorithm", Algorithm).unwrap_or_else(|e| e.exit());
    let timeout = matches
        .value_of("timeout")
        .map(parse_timeout)
        .transpose()
        .unwrap_or_else(|e| clap::Error::value_validation_auto(e).exit());

    let f = if let Some(text) = matches.value_of("formula") {
        parse(text).map_err(CliError::from)
    } else if let Some(path) = matches.value_of("INPUT") {
        parse_from_file(path)
    } else {
        parse_from_reader(io::stdin())
    };

    match f {
        Ok(f) => {
            let out = WriterOutput::new(io::stdout());
            let (result, _) = run(f, algorithm, matches.is_present("trace"), timeout, out);
            std::process::exit(exit_code(&result));
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(-1);
        }
    }
}

fn validate_timeout(s: String) -> Result<(), String> {
    parse_timeout(&s).map(|_| ())
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    s.parse::<f64>()
        .ok()
        .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
        .ok_or_else(|| format!("'{}' is not a representable non-negative number of seconds", s))
}

fn exit_code(result: &Result<SatResult, Aborted>) -> i32 {
    match result {
        Ok(SatResult::Satisfiable) => 0,
        Ok(SatResult::Unsatisfiable) => 1,
        Err(Aborted) => 2,
    }
}

#[derive(Debug)]
enum CliError {
    Io(std::io::Error),
    Parse(ParseError),
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "cannot read the formula: {}", e),
            CliError::Parse(e) => write!(f, "invalid formula: {}", e),
        }
    }
}

fn parse_from_file(path: &str) -> Result<Formula, CliError> {
    let file = File::open(path)?;
    parse_from_reader(file)
}

fn parse_from_reader<R: Read>(mut reader: R) -> Result<Formula, CliError> {
    let mut text = String::new();
    let _ = reader.read_to_string(&mut text)?;
    Ok(parse(&text)?)
}

/// Runs `algorithm` on a worker thread writing to `out`, cancelling it once `timeout` has passed.
/// Hands `out` back when the worker is done.
fn run<O>(
    formula: Formula,
    algorithm: Algorithm,
    show_trace: bool,
    timeout: Option<Duration>,
    out: O,
) -> (Result<SatResult, Aborted>, O)
where
    O: Output + Send + 'static,
{
    let cancel = CancelFlag::new();
    let (done_tx, done_rx) = mpsc::channel();
    let worker = {
        let mut cancel = cancel.clone();
        thread::spawn(move || {
            let mut out = out;
            let mut formula = formula;
            let result = report(&mut formula, algorithm, show_trace, &mut out, &mut cancel);
            if result.is_err() {
                out.emit_line("");
                out.emit_line("Aborted!");
            }
            out.close();
            let _ = done_tx.send(());
            (result, out)
        })
    };

    if let Some(timeout) = timeout {
        if let Err(RecvTimeoutError::Timeout) = done_rx.recv_timeout(timeout) {
            warn!("no answer after {:?}, cancelling", timeout);
            cancel.cancel();
        }
    }

    match worker.join() {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// Prints `formula`, runs `algorithm` on it and prints the answer.
fn report<O: Output>(
    formula: &mut Formula,
    algorithm: Algorithm,
    show_trace: bool,
    out: &mut O,
    termination: &mut dyn Termination,
) -> Result<SatResult, Aborted> {
    out.emit_line(&format!("Formula: {}", formula));
    out.emit_line("");
    debug!("running {:?} on {} clauses", algorithm, formula.len());

    match algorithm {
        Algorithm::Resolution => {
            let trace = if show_trace { Some(&mut *out as &mut dyn Output) } else { None };
            let refutation = refute(formula, trace, termination)?;
            out.emit_line("");
            if refutation.is_unsatisfiable() {
                out.emit_line("Formula is unsatisfiable");
            } else {
                out.emit_line("Formula is satisfiable");
            }
            Ok(refutation.sat_result())
        }
        Algorithm::Dpll | Algorithm::DpllAll => {
            let trace = if show_trace { Some(&mut *out as &mut dyn Output) } else { None };
            let dpll = Dpll::new(algorithm == Algorithm::DpllAll);
            let allocations = dpll.solve(formula, trace, termination)?;
            if allocations.is_empty() {
                out.emit_line("");
                out.emit_line("No satisfying allocation found,");
                out.emit_line("formula is unsatisfiable");
            }
            out.emit_line("");
            out.emit_line(&format!("Satisfying allocations ({}):", allocations.len()));
            for allocation in &allocations {
                out.emit_line(&allocation.to_string());
            }
            Ok(dpll::sat_result(&allocations))
        }
    }
}
