//! Resolution refutation.
//!
//! [`refute`] keeps adding resolvents to the formula until it derives the empty clause, which
//! proves the formula unsatisfiable, or until no new resolvent exists, in which case the formula
//! is satisfiable. Every derived clause remembers the two clauses it came from, so a refutation
//! can be replayed as a proof.

use crate::formula::{Clause, Formula, Literal};
use crate::output::Output;
use crate::termination::{Aborted, Termination};
use crate::SatResult;
use log::{debug, trace};
use std::fmt::{self, Display, Formatter};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Refutation {
    /// The empty clause was derived.
    Refuted(Proof),
    /// No new resolvent can be derived.
    Saturated,
}

impl Refutation {
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, Refutation::Refuted(_))
    }

    pub fn sat_result(&self) -> SatResult {
        match self {
            Refutation::Refuted(_) => SatResult::Unsatisfiable,
            Refutation::Saturated => SatResult::Satisfiable,
        }
    }
}

/// One resolution step: `resolvent` is the union of both parents without `pivot` (from the
/// first parent) and its negation (from the second).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ProofStep {
    pub parents: (Clause, Clause),
    pub pivot: Literal,
    pub resolvent: Clause,
}

impl Display for ProofStep {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} + {} --> {}", self.parents.0, self.parents.1, self.resolvent)
    }
}

/// The derivation of the empty clause, ordered so that every step comes after the steps deriving
/// its parents. The last step derives the empty clause.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Proof {
    steps: Vec<ProofStep>,
}

impl Proof {
    pub fn steps(&self) -> &[ProofStep] {
        &self.steps
    }
}

#[derive(Clone, Copy, Debug)]
enum Provenance {
    Original,
    Derived { parents: (usize, usize), pivot: Literal },
}

/// A candidate resolvent with the indices of its parents in the formula.
struct Resolvent {
    clause: Clause,
    parents: (usize, usize),
    pivot: Literal,
}

impl Resolvent {
    fn step(&self, formula: &Formula) -> ProofStep {
        proof_step(formula, self.parents, self.pivot, &self.clause)
    }
}

/// Runs resolution on `formula`, inserting every derived resolvent into it.
pub fn refute(
    formula: &mut Formula,
    mut trace: Option<&mut dyn Output>,
    termination: &mut dyn Termination,
) -> Result<Refutation, Aborted> {
    if formula.is_false() {
        debug!("formula already contains the empty clause");
        return Ok(Refutation::Refuted(Proof::default()));
    }

    // indexed like the formula's clauses; insertion only ever appends
    let mut provenance = vec![Provenance::Original; formula.len()];
    loop {
        if termination.should_stop() {
            debug!("resolution aborted after {} clauses", formula.len());
            return Err(Aborted);
        }

        let resolvent = match next_resolvent(formula) {
            Some(resolvent) => resolvent,
            None => {
                debug!("saturated with {} clauses", formula.len());
                if let Some(out) = trace.as_deref_mut() {
                    out.emit_line("No new resolvents can be derived.");
                    out.emit_line(&format!("Total number of clauses: {}", formula.len()));
                }
                return Ok(Refutation::Saturated);
            }
        };

        let step = resolvent.step(formula);
        trace!("resolved {} on {}", step, resolvent.pivot);
        if let Some(out) = trace.as_deref_mut() {
            out.emit_line(&step.to_string());
        }

        if resolvent.clause.is_empty() {
            debug!("derived the empty clause with {} clauses", formula.len());
            let proof = reconstruct(formula, &provenance, &resolvent);
            if let Some(out) = trace.as_deref_mut() {
                out.emit_line("Empty clause found!");
                out.emit_line("");
                out.emit_line(&format!("Total number of clauses: {}", formula.len()));
                for step in proof.steps() {
                    out.emit_line(&step.to_string());
                }
            }
            return Ok(Refutation::Refuted(proof));
        }

        let added = formula.insert(resolvent.clause);
        debug_assert!(added, "resolvents are never already in the formula");
        provenance.push(Provenance::Derived {
            parents: resolvent.parents,
            pivot: resolvent.pivot,
        });
    }
}

/// The first new, non-tautological resolvent in formula order: clauses, then their literals, then
/// the clauses containing the negated literal.
fn next_resolvent(formula: &Formula) -> Option<Resolvent> {
    for (i, c1) in formula.clauses().enumerate() {
        for &l1 in c1.literals() {
            let l2 = l1.negated();
            for (j, c2) in formula.clauses().enumerate() {
                if i == j || !c2.contains(&l2) {
                    continue;
                }
                let clause = Clause::new(
                    c1.literals()
                        .filter(|&&l| l != l1)
                        .chain(c2.literals().filter(|&&l| l != l2))
                        .copied(),
                );
                if clause.is_tautology() || formula.contains(&clause) {
                    continue;
                }
                return Some(Resolvent {
                    clause,
                    parents: (i, j),
                    pivot: l1,
                });
            }
        }
    }
    None
}

/// Walks the derivation graph from the empty clause: each step is visited before its derived
/// parents, first parent first. Reversing the visit order puts every derivation before its use.
fn reconstruct(formula: &Formula, provenance: &[Provenance], empty: &Resolvent) -> Proof {
    fn visit(
        formula: &Formula,
        provenance: &[Provenance],
        parents: (usize, usize),
        steps: &mut Vec<ProofStep>,
    ) {
        for &parent in &[parents.0, parents.1] {
            if let Provenance::Derived { parents, pivot } = provenance[parent] {
                steps.push(proof_step(formula, parents, pivot, formula.clause(parent)));
                visit(formula, provenance, parents, steps);
            }
        }
    }

    let mut steps = vec![empty.step(formula)];
    visit(formula, provenance, empty.parents, &mut steps);
    steps.reverse();
    Proof { steps }
}

fn proof_step(
    formula: &Formula,
    parents: (usize, usize),
    pivot: Literal,
    resolvent: &Clause,
) -> ProofStep {
    ProofStep {
        parents: (formula.clause(parents.0).clone(), formula.clause(parents.1).clone()),
        pivot,
        resolvent: resolvent.clone(),
    }
}
