use crate::formula::{Clause, Formula, Literal};
use crate::output::Output;
use crate::termination::{Aborted, Termination};
use crate::SatResult;
use log::{debug, trace};
use std::fmt::{self, Display, Formatter};

/// A set of literals assigned true, in the order the search assigned them.
///
/// Variables that do not appear are unconstrained. Equality ignores the order.
#[derive(Clone, Debug, Default)]
pub struct Allocation {
    literals: Vec<Literal>,
}

impl Allocation {
    pub fn literals(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    pub fn contains(&self, literal: &Literal) -> bool {
        self.literals.contains(literal)
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Whether every clause of `formula` contains one of our literals.
    pub fn satisfies(&self, formula: &Formula) -> bool {
        formula
            .clauses()
            .all(|clause| clause.literals().any(|literal| self.contains(literal)))
    }
}

impl PartialEq for Allocation {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.literals().all(|literal| other.contains(literal))
    }
}

impl Eq for Allocation {}

impl Display for Allocation {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("[")?;
        for (i, literal) in self.literals.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", literal)?;
        }
        f.write_str("]")
    }
}

/// Summarizes the allocations returned by [`Dpll::solve`].
pub fn sat_result(allocations: &[Allocation]) -> SatResult {
    if allocations.is_empty() {
        SatResult::Unsatisfiable
    } else {
        SatResult::Satisfiable
    }
}

/// Davis-Putnam-Logemann-Loveland search over immutable formulas.
///
/// Every step substitutes a literal, simplifies the result into a fresh [`Formula`] and recurses
/// on it. Unit clauses are stepped first, in formula order; otherwise the search branches on the
/// first literal of the first clause, trying it true before false.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dpll {
    enumerate_all: bool,
}

impl Dpll {
    /// With `enumerate_all` unset the search stops at the first satisfying allocation. With it
    /// set, the search keeps going and collects every allocation it runs into.
    pub fn new(enumerate_all: bool) -> Self {
        Self { enumerate_all }
    }

    pub fn solve(
        &self,
        formula: &Formula,
        trace: Option<&mut dyn Output>,
        termination: &mut dyn Termination,
    ) -> Result<Vec<Allocation>, Aborted> {
        let mut search = Search {
            enumerate_all: self.enumerate_all,
            assignment: vec![],
            allocations: vec![],
            trace,
            termination,
        };

        if formula.is_true() {
            search.allocations.push(Allocation::default());
        } else if !formula.is_false() {
            let _ = search.run(formula)?;
        }

        debug!("dpll found {} allocation(s)", search.allocations.len());
        Ok(search.allocations)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Step {
    /// The search below this step is over: the literal led to a contradiction, or it completed
    /// an allocation that was recorded while enumerating.
    Closed,
    /// A satisfying allocation was found and the search should stop.
    Satisfied,
    /// The subformula was explored without stopping the search.
    Open,
}

struct Search<'t, 'm> {
    enumerate_all: bool,
    assignment: Vec<Literal>,
    allocations: Vec<Allocation>,
    trace: Option<&'t mut dyn Output>,
    termination: &'m mut dyn Termination,
}

impl<'t, 'm> Search<'t, 'm> {
    /// Searches a formula that is neither trivially true nor trivially false. Returns whether
    /// the search should stop because an allocation was found.
    fn run(&mut self, formula: &Formula) -> Result<bool, Aborted> {
        if self.termination.should_stop() {
            debug!("dpll aborted at depth {}", self.assignment.len());
            return Err(Aborted);
        }

        for clause in formula.clauses() {
            if let Some(&literal) = clause.unit() {
                match self.step(formula, literal)? {
                    Step::Closed => return Ok(false),
                    Step::Satisfied => return Ok(true),
                    Step::Open => {}
                }
            }
        }

        let literal = *formula
            .clauses()
            .next()
            .and_then(Clause::first)
            .expect("an open formula has a non-empty first clause");
        if self.step(formula, literal)? == Step::Satisfied {
            return Ok(true);
        }
        Ok(self.step(formula, literal.negated())? == Step::Satisfied)
    }

    fn step(&mut self, formula: &Formula, literal: Literal) -> Result<Step, Aborted> {
        let substitution = Substitution { formula, literal };
        let simplified = substitution.simplify();
        let depth = self.assignment.len();

        trace!("step {} at depth {}: {} = {}", literal, depth, substitution, simplified);
        if let Some(out) = self.trace.as_deref_mut() {
            out.emit_line(&format!(
                "{}F[{}/{}]: {}",
                indent(depth),
                literal.variable(),
                if literal.is_positive() { "true" } else { "false" },
                substitution
            ));
            out.emit_line(&format!("{}= {}", indent(depth + 1), simplified));
        }

        self.assignment.push(literal);
        let step = if simplified.is_true() {
            let allocation = Allocation {
                literals: self.assignment.clone(),
            };
            trace!("satisfying allocation {}", allocation);
            if let Some(out) = self.trace.as_deref_mut() {
                out.emit_line(&format!(
                    "{}satisfying allocation found: {}",
                    indent(depth + 1),
                    allocation
                ));
            }
            if !self.allocations.contains(&allocation) {
                self.allocations.push(allocation);
            }
            if self.enumerate_all {
                Step::Closed
            } else {
                Step::Satisfied
            }
        } else if simplified.is_false() {
            Step::Closed
        } else if self.run(&simplified)? {
            Step::Satisfied
        } else {
            Step::Open
        };
        self.assignment.pop();

        Ok(step)
    }
}

fn indent(depth: usize) -> String {
    " ".repeat(2 * depth)
}

/// `formula` with `literal` replaced by true and its negation by false.
///
/// Displays with the constants in place, e.g. `{{true, b}, {false, c}}`; [`Substitution::simplify`]
/// evaluates them away.
struct Substitution<'f> {
    formula: &'f Formula,
    literal: Literal,
}

impl<'f> Substitution<'f> {
    /// Drops every clause containing `literal` and removes its negation from the remaining ones.
    fn simplify(&self) -> Formula {
        let negated = self.literal.negated();
        Formula::new(
            self.formula
                .clauses()
                .filter(|clause| !clause.contains(&self.literal))
                .map(|clause| Clause::new(clause.literals().filter(|&&l| l != negated).copied())),
        )
    }
}

impl<'f> Display for Substitution<'f> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let negated = self.literal.negated();
        f.write_str("{")?;
        for (i, clause) in self.formula.clauses().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str("{")?;
            for (j, literal) in clause.literals().enumerate() {
                if j > 0 {
                    f.write_str(", ")?;
                }
                if *literal == self.literal {
                    f.write_str("true")?;
                } else if *literal == negated {
                    f.write_str("false")?;
                } else {
                    write!(f, "{}", literal)?;
                }
            }
            f.write_str("}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brute_force::{models, solve_brute_force};
    use crate::formula::parser::parse;
    use crate::formula::{formula_strategy, n, p};
    use crate::termination::{CancelFlag, Indefinite, TimeBudget};
    use proptest::prelude::*;
    use std::time::Duration;
    use test_env_log::test;

    fn solve(f: &Formula, enumerate_all: bool) -> Vec<Allocation> {
        Dpll::new(enumerate_all)
            .solve(f, None, &mut Indefinite)
            .expect("not aborted")
    }

    fn solve_traced(f: &Formula, enumerate_all: bool) -> (Vec<Allocation>, Vec<String>) {
        let mut lines: Vec<String> = vec![];
        let allocations = Dpll::new(enumerate_all)
            .solve(f, Some(&mut lines), &mut Indefinite)
            .expect("not aborted");
        (allocations, lines)
    }

    fn allocation(literals: Vec<Literal>) -> Allocation {
        Allocation { literals }
    }

    #[test]
    fn solve_bcp_sat() {
        let c1 = Clause::new(vec![p('a'), p('b')]);
        let c2 = Clause::new(vec![n('a')]);
        let f = Formula::new(vec![c1, c2]);

        assert_eq!(solve(&f, false), vec![allocation(vec![n('a'), p('b')])]);
    }

    #[test]
    fn solve_bcp_unsat() {
        let c1 = Clause::new(vec![p('a'), p('b')]);
        let c2 = Clause::new(vec![n('a')]);
        let c3 = Clause::new(vec![n('b')]);
        let f = Formula::new(vec![c1, c2, c3]);

        assert!(solve(&f, false).is_empty());
        assert!(solve(&f, true).is_empty());
    }

    #[test]
    fn solve_conflict_sat() {
        let c1 = Clause::new(vec![p('a'), p('b'), p('c')]);
        let c2 = Clause::new(vec![n('a'), n('b'), p('c')]);
        let c3 = Clause::new(vec![n('b'), n('c')]);
        let f = Formula::new(vec![c1, c2, c3]);

        let allocations = solve(&f, false);
        assert_eq!(sat_result(&allocations), SatResult::Satisfiable);
        assert!(allocations[0].satisfies(&f));
    }

    #[test]
    fn solve_trivial_formulas() {
        assert_eq!(solve(&Formula::default(), false), vec![Allocation::default()]);
        assert_eq!(solve(&Formula::default(), true), vec![Allocation::default()]);

        let f = Formula::new(vec![Clause::new(vec![p('a')]), Clause::empty()]);
        assert!(solve(&f, false).is_empty());
        assert!(solve(&f, true).is_empty());
    }

    #[test]
    fn solve_tautology() {
        let f = parse("{{x,-x}}").unwrap();
        assert_eq!(solve(&f, false), vec![allocation(vec![p('x')])]);
        assert_eq!(solve(&f, true), vec![allocation(vec![p('x')]), allocation(vec![n('x')])]);
    }

    #[test]
    fn solve_golden_first() {
        let f = parse("{{-p,q,-r,s},{-q,-r,s},{r},{-p,s},{-p,r}}").unwrap();
        let allocations = solve(&f, false);
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].to_string(), "[r, -p, -q]");
    }

    #[test]
    fn solve_golden_all() {
        let f = parse("{{-p,q,-r,s},{-q,-r,s},{r},{-p,s},{-p,r}}").unwrap();
        let allocations = solve(&f, true);
        assert_eq!(
            allocations,
            vec![
                allocation(vec![p('r'), n('p'), n('q')]),
                allocation(vec![p('r'), n('p'), p('q'), p('s')]),
                allocation(vec![p('r'), p('p'), p('s')]),
                allocation(vec![p('p'), p('q'), p('r'), p('s')]),
                allocation(vec![p('p'), n('q'), p('r'), p('s')]),
            ]
        );
        for allocation in &allocations {
            assert!(allocation.satisfies(&f));
        }
        assert_eq!(allocations[1].to_string(), "[r, -p, q, s]");
    }

    #[test]
    fn trace_first() {
        let f = parse("{{a,b}}").unwrap();
        let (_, lines) = solve_traced(&f, false);
        assert_eq!(
            lines,
            vec!["F[a/true]: {{true, b}}", "  = {}", "  satisfying allocation found: [a]"]
        );
    }

    #[test]
    fn trace_all() {
        let f = parse("{{a,b}}").unwrap();
        let (allocations, lines) = solve_traced(&f, true);
        assert_eq!(allocations, vec![allocation(vec![p('a')]), allocation(vec![n('a'), p('b')])]);
        assert_eq!(
            lines,
            vec![
                "F[a/true]: {{true, b}}",
                "  = {}",
                "  satisfying allocation found: [a]",
                "F[a/false]: {{false, b}}",
                "  = {{b}}",
                "  F[b/true]: {{true}}",
                "    = {}",
                "    satisfying allocation found: [-a, b]",
            ]
        );
    }

    #[test]
    fn trace_golden_prefix() {
        let f = parse("{{-p,q,-r,s},{-q,-r,s},{r},{-p,s},{-p,r}}").unwrap();
        let (_, lines) = solve_traced(&f, true);
        assert_eq!(
            &lines[..4],
            &[
                "F[r/true]: {{-p, q, false, s}, {-q, false, s}, {true}, {-p, s}, {-p, true}}",
                "  = {{-p, q, s}, {-q, s}, {-p, s}}",
                "  F[p/false]: {{true, q, s}, {-q, s}, {true, s}}",
                "    = {{-q, s}}",
            ]
        );
    }

    #[test]
    fn substitution_simplifies_and_dedups() {
        let f = parse("{{-p,q},{q},{p,r},{-p}}").unwrap();
        let substitution = Substitution { formula: &f, literal: p('p') };
        assert_eq!(substitution.to_string(), "{{false, q}, {q}, {true, r}, {false}}");
        assert_eq!(substitution.simplify().to_string(), "{{q}, {}}");
        assert!(substitution.simplify().is_false());
    }

    #[test]
    fn abort_with_cancelled_flag() {
        let f = parse("{{a,b},{-a,c}}").unwrap();
        let flag = CancelFlag::new();
        flag.cancel();
        let mut polled = flag.clone();
        assert_eq!(Dpll::new(true).solve(&f, None, &mut polled), Err(Aborted));
    }

    #[test]
    fn abort_with_exhausted_budget() {
        let f = parse("{{a,b},{-a,c}}").unwrap();
        let mut budget = TimeBudget::starting_now(Duration::from_secs(0));
        assert_eq!(Dpll::new(false).solve(&f, None, &mut budget), Err(Aborted));
    }

    proptest! {
        #[test]
        fn proptest_solve(f in formula_strategy()) {
            let allocations = solve(&f, false);
            prop_assert!(allocations.len() <= 1);
            prop_assert_eq!(sat_result(&allocations), solve_brute_force(&f));
            for allocation in &allocations {
                prop_assert!(allocation.satisfies(&f));
            }
        }

        #[test]
        fn proptest_enumerate(f in formula_strategy()) {
            let allocations = solve(&f, true);
            prop_assert_eq!(sat_result(&allocations), solve_brute_force(&f));
            for allocation in &allocations {
                prop_assert!(allocation.satisfies(&f));
            }
            // every total model extends one of the partial allocations
            for model in models(&f) {
                prop_assert!(allocations.iter().any(|a| a.literals().all(|l| model.contains(l))));
            }
        }
    }
}
