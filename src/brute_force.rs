use crate::*;

// Truth-table enumeration, used as an oracle in the engine tests
pub(crate) fn models(f: &Formula) -> Vec<Vec<Literal>> {
    let variables = f.variables();
    assert!(variables.len() <= 15); // just for safety

    let mut models = vec![];
    for assignment in 0..2u32.pow(variables.len() as u32) {
        let model = variables
            .iter()
            .enumerate()
            .map(|(i, &v)| Literal::new(v, assignment & (1 << i) != 0))
            .collect::<Vec<_>>();
        // every clause needs a literal that is true under this assignment
        if f.clauses().all(|clause| clause.literals().any(|literal| model.contains(literal))) {
            models.push(model);
        }
    }
    models
}

pub(crate) fn solve_brute_force(f: &Formula) -> SatResult {
    if models(f).is_empty() {
        SatResult::Unsatisfiable
    } else {
        SatResult::Satisfiable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{n, p};

    #[test]
    fn solve_bcp_sat() {
        let c1 = Clause::new(vec![p('a'), p('b')]);
        let c2 = Clause::new(vec![n('a')]);
        let f = Formula::new(vec![c1, c2]);

        assert_eq!(solve_brute_force(&f), SatResult::Satisfiable);
        assert_eq!(models(&f), vec![vec![n('a'), p('b')]]);
    }

    #[test]
    fn solve_bcp_unsat() {
        let c1 = Clause::new(vec![p('a'), p('b')]);
        let c2 = Clause::new(vec![n('a')]);
        let c3 = Clause::new(vec![n('b')]);
        let f = Formula::new(vec![c1, c2, c3]);

        assert_eq!(solve_brute_force(&f), SatResult::Unsatisfiable);
    }

    #[test]
    fn golden_models() {
        let f: Formula = "{{-p,q,-r,s},{-q,-r,s},{r},{-p,s},{-p,r}}".parse().unwrap();
        assert_eq!(models(&f).len(), 5);
    }

    #[test]
    fn empty_formula_and_empty_clause() {
        assert_eq!(models(&Formula::default()), vec![Vec::<Literal>::new()]);
        assert_eq!(
            solve_brute_force(&Formula::new(vec![Clause::empty()])),
            SatResult::Unsatisfiable
        );
    }
}
