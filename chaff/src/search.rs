//! The DPLL search loop.
use log::debug;
use partial_ref::{partial, PartialRef};

use crate::context::{parts::*, Context};
use crate::decision::{make_decision, resolve_conflict, Resolution};
use crate::prop::{propagate, Conflict};
use crate::state::SearchState;
use crate::trace::Event;

/// Perform one transition of the search state machine.
///
/// Does nothing in a terminal state.
pub fn search_step(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseDbP,
        mut PropQueueP,
        mut SolverStateP,
        mut TraceP,
        mut TrailP,
        mut WatchlistsP,
    ),
) {
    let state = ctx.part(SolverStateP).search_state;
    let next_state = match state {
        SearchState::Propagating => match propagate(ctx.borrow()) {
            Ok(()) => SearchState::Deciding,
            Err(conflict) => found_conflict(ctx.borrow(), conflict),
        },
        SearchState::Deciding => match make_decision(ctx.borrow()) {
            None => SearchState::Sat,
            Some(Ok(())) => SearchState::Propagating,
            Some(Err(conflict)) => found_conflict(ctx.borrow(), conflict),
        },
        SearchState::ConflictResolving => match resolve_conflict(ctx.borrow()) {
            Resolution::Flipped => SearchState::Propagating,
            Resolution::FlipConflict(conflict) => found_conflict(ctx.borrow(), conflict),
            Resolution::Exhausted => SearchState::Unsat,
        },
        SearchState::Sat | SearchState::Unsat => state,
    };

    ctx.part_mut(SolverStateP).search_state = next_state;
}

fn found_conflict(mut ctx: partial!(Context, mut TraceP), conflict: Conflict) -> SearchState {
    debug!("Conflict {:?}", conflict);
    ctx.part_mut(TraceP).event(Event::Conflict);
    SearchState::ConflictResolving
}

/// Run the search until it reaches a terminal state.
pub fn search(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseDbP,
        mut PropQueueP,
        mut SolverStateP,
        mut TraceP,
        mut TrailP,
        mut WatchlistsP,
    ),
) -> SearchState {
    while !ctx.part(SolverStateP).search_state.is_terminal() {
        search_step(ctx.borrow());
    }
    ctx.part(SolverStateP).search_state
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use partial_ref::IntoPartialRefMut;

    use chaff_formula::test::{sat_formula, sgen_unsat_formula};
    use chaff_formula::{cnf::strategy::cnf_formula, cnf_formula, CnfFormula, Lit};

    use crate::clause::ClauseRef;
    use crate::context::set_var_count;
    use crate::load::load_clause;

    fn load_formula(
        mut ctx: partial!(
            Context,
            mut AssignmentP,
            mut ClauseDbP,
            mut PropQueueP,
            mut SolverStateP,
            mut TmpDataP,
            mut WatchlistsP,
        ),
        formula: &CnfFormula,
    ) {
        set_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Each clause with two or more literals is in the watchlists of its two distinct watched
    /// literals, once each, and in no other watchlist.
    fn check_watches(
        ctx: partial!(Context, AssignmentP, ClauseDbP, WatchlistsP),
    ) -> Result<(), TestCaseError> {
        let clause_db = ctx.part(ClauseDbP);
        let watchlists = ctx.part(WatchlistsP);
        let lit_count = ctx.part(AssignmentP).assignment().len() * 2;

        let mut watching: Vec<Vec<Lit>> = vec![vec![]; clause_db.count()];
        let mut crefs: Vec<Option<ClauseRef>> = vec![None; clause_db.count()];

        for code in 0..lit_count {
            let lit = Lit::from_code(code);
            for &cref in watchlists.watched_by(lit) {
                watching[cref.index()].push(lit);
                crefs[cref.index()] = Some(cref);
            }
        }

        for (index, lits) in clause_db.iter().enumerate() {
            if lits.len() < 2 {
                prop_assert!(watching[index].is_empty());
                continue;
            }

            let cref = crefs[index].ok_or_else(|| TestCaseError::fail("unwatched clause"))?;
            let [first, second] = clause_db.watched(cref);
            prop_assert_ne!(first, second);

            let mut expected = vec![first, second];
            expected.sort();
            watching[index].sort();
            prop_assert_eq!(&watching[index], &expected);
        }

        Ok(())
    }

    #[test]
    fn step_sequence() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let formula = cnf_formula![
            1, 2;
            -1, 2;
            1, -2;
            -1, -2;
        ];

        load_formula(ctx.borrow(), &formula);

        let mut states = vec![ctx.part(SolverStateP).search_state];
        while !ctx.part(SolverStateP).search_state.is_terminal() {
            search_step(ctx.borrow());
            states.push(ctx.part(SolverStateP).search_state);
        }

        use SearchState::*;
        assert_eq!(
            states,
            vec![
                Propagating,
                Deciding,
                Propagating,
                ConflictResolving,
                Propagating,
                ConflictResolving,
                Unsat,
            ]
        );

        search_step(ctx.borrow());
        assert_eq!(ctx.part(SolverStateP).search_state, Unsat);
    }

    #[test]
    fn unsat_without_decisions() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let formula = cnf_formula![
            1, 2, 3;
            -1;
            1, -2;
            2, -3;
        ];

        load_formula(ctx.borrow(), &formula);

        assert_eq!(search(ctx.borrow()), SearchState::Unsat);
        assert_eq!(ctx.part(TraceP).stats().decisions, 0);
    }

    proptest! {
        #[test]
        fn watches_consistent_after_each_step(formula in cnf_formula(1..12usize, 0..50, 0..5)) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            load_formula(ctx.borrow(), &formula);
            check_watches(ctx.borrow())?;

            while !ctx.part(SolverStateP).search_state.is_terminal() {
                search_step(ctx.borrow());
                check_watches(ctx.borrow())?;
            }
        }

        #[test]
        fn sgen_unsat(formula in sgen_unsat_formula(1..4usize)) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            load_formula(ctx.borrow(), &formula);

            prop_assert_eq!(search(ctx.borrow()), SearchState::Unsat);
            prop_assert!(ctx.part(TrailP).trail().is_empty());
        }

        #[test]
        fn sat(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            load_formula(ctx.borrow(), &formula);

            prop_assert_eq!(search(ctx.borrow()), SearchState::Sat);

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|&lit| ctx.part(AssignmentP).lit_is_true(lit)));
            }
        }
    }
}
