//! Formula generators for solver tests.
use proptest::{prelude::*, *};

use rand::distributions::Bernoulli;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cnf::CnfFormula;
use crate::lit::Lit;

/// One literal per variable, the polarity of variable `i` taken from `polarity[i]`.
fn polarity_lits(polarity: Vec<bool>) -> Vec<Lit> {
    polarity
        .into_iter()
        .enumerate()
        .map(|(index, polarity)| Lit::from_index(index, polarity))
        .collect()
}

/// Generate small hard unsat instances.
///
/// Implementation of http://www.cs.qub.ac.uk/~i.spence/sgen/ but with random partitions
pub fn sgen_unsat_formula(
    blocks: impl Strategy<Value = usize>,
) -> impl Strategy<Value = CnfFormula> {
    blocks.prop_flat_map(|blocks| {
        collection::vec(bool::ANY, blocks * 4 + 1).prop_perturb(|polarity, mut rng| {
            let mut clauses: Vec<Vec<Lit>> = vec![];
            let mut lits = polarity_lits(polarity);

            for &invert in [false, true].iter() {
                lits.shuffle(&mut rng);
                let (&extra, grouped) = lits.split_last().unwrap();
                for group in grouped.chunks_exact(4) {
                    for a in 0..4 {
                        for b in 0..a {
                            for c in 0..b {
                                clauses.push(vec![
                                    group[a] ^ invert,
                                    group[b] ^ invert,
                                    group[c] ^ invert,
                                ]);
                            }
                        }
                    }
                }
                for b in 0..4 {
                    for c in 0..b {
                        clauses.push(vec![extra ^ invert, lits[b] ^ invert, lits[c] ^ invert]);
                    }
                }
            }

            for clause in clauses.iter_mut() {
                clause.shuffle(&mut rng);
            }
            clauses.shuffle(&mut rng);
            CnfFormula::from(clauses)
        })
    })
}

/// Generate a sat instance.
///
/// This generates a random full assignment and then only generates clauses compatible with that
/// assignment.
pub fn sat_formula(
    vars: impl Strategy<Value = usize>,
    clause_count: impl Strategy<Value = usize>,
    density: impl Strategy<Value = f64>,
    polarity_dist: impl Strategy<Value = f64>,
) -> impl Strategy<Value = CnfFormula> {
    (vars, clause_count, density, polarity_dist).prop_flat_map(
        |(vars, clause_count, density, polarity_dist)| {
            let density = Bernoulli::new(density).unwrap();
            let polarity_dist = Bernoulli::new(polarity_dist).unwrap();

            collection::vec(bool::ANY, vars).prop_perturb(move |polarity, mut rng| {
                let hidden = polarity_lits(polarity);
                let mut clauses: Vec<Vec<Lit>> = Vec::with_capacity(clause_count);

                for _ in 0..clause_count {
                    let &fixed_lit = hidden.choose(&mut rng).unwrap();
                    let mut clause = vec![fixed_lit];
                    for &lit in hidden.iter() {
                        if lit != fixed_lit && rng.sample(density) {
                            clause.push(lit ^ rng.sample(polarity_dist));
                        }
                    }
                    clause.shuffle(&mut rng);
                    clauses.push(clause);
                }

                let mut formula = CnfFormula::from(clauses);
                formula.set_var_count(vars);
                formula
            })
        },
    )
}

/// Pigeon hole formula for `holes + 1` pigeons, unsatisfiable for every `holes`.
///
/// Variable `pigeon * holes + hole` states that the pigeon sits in the hole.
pub fn pigeon_hole_formula(holes: usize) -> CnfFormula {
    let pigeons = holes + 1;
    let sits = |pigeon: usize, hole: usize| Lit::from_index(pigeon * holes + hole, true);

    let mut formula = CnfFormula::new();
    formula.set_var_count(pigeons * holes);

    for pigeon in 0..pigeons {
        formula.add_clause((0..holes).map(|hole| sits(pigeon, hole)));
    }

    for hole in 0..holes {
        for a in 0..pigeons {
            for b in 0..a {
                formula.add_clause(vec![!sits(a, hole), !sits(b, hole)]);
            }
        }
    }
    formula
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pigeon_hole_shape() {
        let formula = pigeon_hole_formula(2);
        assert_eq!(formula.var_count(), 6);
        // 3 "somewhere" clauses plus 3 pairs for each of the 2 holes
        assert_eq!(formula.len(), 9);
    }

    proptest! {
        #[test]
        fn sat_formula_has_clause_count(
            formula in sat_formula(2..10usize, 1..20usize, 0.1..0.5, 0.5..1.0),
        ) {
            prop_assert!(!formula.is_empty());
            prop_assert!(formula.iter().all(|clause| !clause.is_empty()));
        }

        #[test]
        fn sgen_uses_all_vars(formula in sgen_unsat_formula(1..3usize)) {
            prop_assert_eq!(formula.var_count() % 4, 1);
            prop_assert!(formula.iter().all(|clause| clause.len() == 3));
        }
    }
}
