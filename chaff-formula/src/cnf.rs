//! Formulas in conjunctive normal form.
use std::cmp::max;
use std::fmt;
use std::ops::Range;

use crate::lit::{FormulaError, Lit};

/// A formula in conjunctive normal form (CNF).
///
/// All clauses share a single literal buffer, each clause is a range into that buffer. Clauses
/// are kept exactly as given, including empty clauses and repeated literals.
#[derive(Default, Eq)]
pub struct CnfFormula {
    var_count: usize,
    literals: Vec<Lit>,
    clause_ranges: Vec<Range<usize>>,
}

impl CnfFormula {
    pub fn new() -> CnfFormula {
        CnfFormula::default()
    }

    /// Builds a formula from signed DIMACS numbers.
    ///
    /// The variable count is the maximum of `var_count` and the largest variable used.
    pub fn from_dimacs(
        var_count: usize,
        clauses: &[Vec<isize>],
    ) -> Result<CnfFormula, FormulaError> {
        let mut formula = CnfFormula::new();
        formula.set_var_count(var_count);
        let mut lits = vec![];
        for (clause_index, clause) in clauses.iter().enumerate() {
            lits.clear();
            for &number in clause {
                lits.push(Lit::try_from_dimacs(number, clause_index)?);
            }
            formula.add_clause(&lits);
        }
        Ok(formula)
    }

    /// Number of variables.
    ///
    /// Never less than one more than the largest variable index present, so per-variable tables
    /// of this length can be indexed by every literal of the formula.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Raises the variable count to `count`, never lowers it.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_count = max(self.var_count, count)
    }

    /// Number of clauses.
    pub fn len(&self) -> usize {
        self.clause_ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clause_ranges.is_empty()
    }

    /// Appends a clause.
    ///
    /// `literals` can yield `Lit` or `&Lit`.
    pub fn add_clause<L>(&mut self, literals: impl IntoIterator<Item = L>)
    where
        Vec<Lit>: Extend<L>,
    {
        let begin = self.literals.len();
        self.literals.extend(literals);
        let end = self.literals.len();

        for &lit in self.literals[begin..end].iter() {
            self.var_count = max(lit.index() + 1, self.var_count);
        }

        self.clause_ranges.push(begin..end);
    }

    /// Iterates over the clauses in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &[Lit]> {
        let literals = &self.literals;
        self.clause_ranges
            .iter()
            .map(move |range| &literals[range.clone()])
    }
}

impl<F, I, L> From<F> for CnfFormula
where
    F: IntoIterator<Item = I>,
    I: IntoIterator<Item = L>,
    Vec<Lit>: Extend<L>,
{
    fn from(formula: F) -> CnfFormula {
        let mut cnf_formula = CnfFormula::new();
        for clause in formula {
            cnf_formula.add_clause(clause);
        }
        cnf_formula
    }
}

impl fmt::Debug for CnfFormula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.var_count(), f)?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq for CnfFormula {
    fn eq(&self, other: &CnfFormula) -> bool {
        self.var_count() == other.var_count()
            && self.len() == other.len()
            && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;

    use proptest::{collection::SizeRange, prelude::*, *};

    use crate::lit::strategy::lit;

    pub fn vec_formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = Vec<Vec<Lit>>> {
        let clauses = clauses.into();
        let clause_len = clause_len.into();

        vars.prop_ind_flat_map(move |vars| {
            collection::vec(
                collection::vec(lit(0..vars), clause_len.clone()),
                clauses.clone(),
            )
        })
    }

    /// Random formulas whose variable count is exactly the drawn `vars` value.
    pub fn cnf_formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = CnfFormula> {
        let clauses = clauses.into();
        let clause_len = clause_len.into();

        vars.prop_flat_map(move |vars| {
            collection::vec(
                collection::vec(lit(0..vars), clause_len.clone()),
                clauses.clone(),
            )
            .prop_map(move |clauses| {
                let mut formula = CnfFormula::from(clauses);
                formula.set_var_count(vars);
                formula
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{strategy::*, *};

    use proptest::*;

    #[test]
    fn keeps_clauses_verbatim() {
        let input = cnf![
            1, 2, 3;
            -1, -1;
            7, 2;
            ;
            4, 5;
        ];

        let formula = CnfFormula::from(input.iter().cloned());

        assert_eq!(formula.len(), 5);
        for (clause, &ref_clause) in formula.iter().zip(input.iter()) {
            assert_eq!(clause, ref_clause);
        }

        assert_eq!(formula.var_count(), 7);
    }

    #[test]
    fn from_dimacs_numbers() {
        let formula = CnfFormula::from_dimacs(9, &[vec![1, -2], vec![], vec![3]]).unwrap();

        assert_eq!(formula.var_count(), 9);
        assert_eq!(
            formula,
            {
                let mut expected = cnf_formula![
                    1, -2;
                    ;
                    3;
                ];
                expected.set_var_count(9);
                expected
            }
        );

        let grown = CnfFormula::from_dimacs(1, &[vec![4, 2]]).unwrap();
        assert_eq!(grown.var_count(), 4);
    }

    #[test]
    fn from_dimacs_rejects_zero() {
        assert_eq!(
            CnfFormula::from_dimacs(3, &[vec![1], vec![2, 0, 3]]),
            Err(FormulaError::ZeroLiteral { clause: 1 })
        );
    }

    proptest! {
        #[test]
        fn var_count_covers_literals(input in vec_formula(1..100usize, 0..200, 0..10)) {
            let formula = CnfFormula::from(input.iter().map(|clause| clause.iter().cloned()));

            prop_assert_eq!(formula.len(), input.len());

            let var_count = input
                .iter()
                .flat_map(|clause| clause.iter().map(|lit| lit.index() + 1))
                .max()
                .unwrap_or(0);

            prop_assert_eq!(formula.var_count(), var_count);
        }

        #[test]
        fn strategy_sets_var_count(formula in cnf_formula(1..50usize, 0..100, 0..5)) {
            for clause in formula.iter() {
                for lit in clause {
                    prop_assert!(lit.index() < formula.var_count());
                }
            }
        }
    }
}
