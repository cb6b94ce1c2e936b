pub mod parser;

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A propositional variable. The grammar restricts names to a single letter.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
pub struct Variable(pub char);

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Literal {
    Positive(Variable),
    Negative(Variable),
}

impl Literal {
    pub fn new(variable: Variable, negated: bool) -> Self {
        if negated {
            Literal::Negative(variable)
        } else {
            Literal::Positive(variable)
        }
    }

    pub fn variable(&self) -> &Variable {
        match self {
            Literal::Positive(v) => v,
            Literal::Negative(v) => v,
        }
    }

    pub fn is_positive(&self) -> bool {
        match self {
            Literal::Positive(_) => true,
            Literal::Negative(_) => false,
        }
    }

    pub fn negated(&self) -> Self {
        match self {
            Literal::Positive(v) => Literal::Negative(*v),
            Literal::Negative(v) => Literal::Positive(*v),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Literal::Positive(v) => write!(f, "{}", v),
            Literal::Negative(v) => write!(f, "-{}", v),
        }
    }
}

/// A disjunction of literals.
///
/// Literals keep their insertion order but are deduplicated, and two clauses are equal when they
/// hold the same set of literals regardless of order. A clause may contain a variable in both
/// polarities; such a clause is a tautology and [`Clause::is_tautology`] reports it.
#[derive(Clone, Debug, Default)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    pub fn new(disjuncts: impl IntoIterator<Item = Literal>) -> Self {
        let mut literals: Vec<Literal> = vec![];
        for literal in disjuncts {
            if !literals.contains(&literal) {
                literals.push(literal);
            }
        }
        Self { literals }
    }

    /// The empty clause, which is unsatisfiable.
    pub fn empty() -> Self {
        Self::default()
    }

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

    /// The only literal of a unit clause.
    pub fn unit(&self) -> Option<&Literal> {
        match self.literals.as_slice() {
            [literal] => Some(literal),
            _ => None,
        }
    }

    pub fn first(&self) -> Option<&Literal> {
        self.literals.first()
    }

    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .any(|literal| self.contains(&literal.negated()))
    }
}

impl PartialEq for Clause {
    fn eq(&self, other: &Self) -> bool {
        // literals are deduplicated, so equal length plus inclusion is set equality
        self.len() == other.len() && self.literals().all(|literal| other.contains(literal))
    }
}

impl Eq for Clause {}

impl Display for Clause {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write_braced(f, &self.literals)
    }
}

/// A conjunction of clauses.
///
/// Clauses are deduplicated by set equality and iterate in insertion order; both engines rely on
/// this order for their deterministic picks.
#[derive(Clone, Debug, Default)]
pub struct Formula {
    clauses: Vec<Clause>,
}

impl Formula {
    pub fn new(conjuncts: impl IntoIterator<Item = Clause>) -> Self {
        let mut formula = Self::default();
        for clause in conjuncts {
            let _ = formula.insert(clause);
        }
        formula
    }

    /// Adds `clause` unless an equal clause is already present. Returns whether it was added.
    pub fn insert(&mut self, clause: Clause) -> bool {
        if self.contains(&clause) {
            false
        } else {
            self.clauses.push(clause);
            true
        }
    }

    pub fn contains(&self, clause: &Clause) -> bool {
        self.clauses.contains(clause)
    }

    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    pub fn clause(&self, idx: usize) -> &Clause {
        &self.clauses[idx]
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// A formula without clauses is trivially true.
    pub fn is_true(&self) -> bool {
        self.is_empty()
    }

    /// A formula containing the empty clause is trivially false.
    pub fn is_false(&self) -> bool {
        self.clauses.iter().any(Clause::is_empty)
    }

    /// Every variable mentioned by the formula, in order of first appearance.
    pub fn variables(&self) -> Vec<Variable> {
        let mut variables = vec![];
        for literal in self.clauses.iter().flat_map(Clause::literals) {
            if !variables.contains(literal.variable()) {
                variables.push(*literal.variable());
            }
        }
        variables
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.clauses().all(|clause| other.contains(clause))
    }
}

impl Eq for Formula {}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write_braced(f, &self.clauses)
    }
}

impl FromStr for Formula {
    type Err = parser::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}

fn write_braced<T: Display>(f: &mut Formatter, items: &[T]) -> fmt::Result {
    f.write_str("{")?;
    let mut first = true;
    for item in items {
        if first {
            first = false;
        } else {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str("}")
}

#[cfg(test)]
pub(crate) fn p(x: char) -> Literal {
    Literal::Positive(Variable(x))
}

#[cfg(test)]
pub(crate) fn n(x: char) -> Literal {
    Literal::Negative(Variable(x))
}

/// Random formulas over the variables `a..=h`, small enough for the brute-force oracle.
#[cfg(test)]
pub(crate) fn formula_strategy() -> impl proptest::strategy::Strategy<Value = Formula> {
    formula_over(8, 8)
}

/// Few variables keep the number of distinct resolvents, and so resolution's saturation, small.
#[cfg(test)]
pub(crate) fn small_formula_strategy() -> impl proptest::strategy::Strategy<Value = Formula> {
    formula_over(4, 6)
}

#[cfg(test)]
fn formula_over(
    num_variables: u8,
    max_clauses: usize,
) -> impl proptest::strategy::Strategy<Value = Formula> {
    use proptest::prelude::*;

    let literal = (0..num_variables, any::<bool>())
        .prop_map(|(v, negated)| Literal::new(Variable((b'a' + v) as char), negated));
    let clause = prop::collection::vec(literal, 1..4).prop_map(Clause::new);
    prop::collection::vec(clause, 1..max_clauses).prop_map(Formula::new)
}
