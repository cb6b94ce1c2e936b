//! Satisfiability of propositional formulas in conjunctive normal form.
//!
//! Formulas are written as braced clause sets, e.g. `{{a, -b}, {b; c}, {-a}}`, and read with
//! [`parse`]. Two independent engines answer questions about them: [`Dpll`] searches for
//! satisfying allocations, [`refute`] tries to derive the empty clause by resolution.

pub mod dpll;
pub mod formula;
pub mod output;
pub mod resolution;
pub mod termination;

#[cfg(test)]
mod brute_force;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum SatResult {
    Satisfiable,
    Unsatisfiable,
}

pub use dpll::{Allocation, Dpll};
pub use formula::parser::{parse, ParseError, ParseErrorKind};
pub use formula::{Clause, Formula, Literal, Variable};
pub use output::{Output, WriterOutput};
pub use resolution::{refute, Proof, ProofStep, Refutation};
pub use termination::{Aborted, CancelFlag, Indefinite, Termination, TimeBudget};
