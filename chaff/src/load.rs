//! Loading a formula into the solver.
use log::debug;
use partial_ref::{partial, PartialRef};

use chaff_formula::Lit;

use crate::context::{parts::*, Context};
use crate::state::SearchState;

/// Adds a clause to the formula.
///
/// Removes repeated literals, keeping the first occurrence of each. Empty clauses make the formula
/// unsatisfiable, unit clauses are enqueued for propagation and all other clauses are watched by
/// their first two literals. Tautological clauses are kept.
pub fn load_clause(
    mut ctx: partial!(
        Context,
        mut ClauseDbP,
        mut PropQueueP,
        mut SolverStateP,
        mut TmpDataP,
        mut WatchlistsP,
    ),
    lits: &[Lit],
) {
    if ctx.part(SolverStateP).search_state == SearchState::Unsat {
        return;
    }

    let (tmp_data, mut ctx) = ctx.split_part_mut(TmpDataP);

    tmp_data.lits.clear();
    for &lit in lits {
        let flag = &mut tmp_data.flags[lit.code()];
        if !*flag {
            *flag = true;
            tmp_data.lits.push(lit);
        }
    }
    for &lit in tmp_data.lits.iter() {
        tmp_data.flags[lit.code()] = false;
    }

    let lits = &tmp_data.lits[..];

    let cref = ctx.part_mut(ClauseDbP).add_clause(lits);

    match *lits {
        [] => {
            debug!("Clause {} is empty", cref.index() + 1);
            ctx.part_mut(SolverStateP).search_state = SearchState::Unsat;
        }
        [lit] => ctx.part_mut(PropQueueP).push(lit),
        [_, _, ..] => {
            let watched = ctx.part(ClauseDbP).watched(cref);
            ctx.part_mut(WatchlistsP).watch_clause(cref, watched);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use chaff_formula::{lit, lits};

    use crate::context::set_var_count;

    #[test]
    fn unsat_on_empty_clause() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        load_clause(ctx.borrow(), &[]);

        assert_eq!(ctx.part(SolverStateP).search_state, SearchState::Unsat);
        assert_eq!(ctx.part(ClauseDbP).count(), 1);
    }

    #[test]
    fn unit_clauses() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 3);

        load_clause(ctx.borrow(), &lits![1]);

        assert_eq!(ctx.part(PropQueueP).len(), 1);

        load_clause(ctx.borrow(), &lits![-2, -2]);

        assert_eq!(ctx.part(PropQueueP).len(), 2);

        load_clause(ctx.borrow(), &lits![1, 1, 1]);

        assert_eq!(ctx.part(PropQueueP).len(), 2);
        assert_eq!(ctx.part(ClauseDbP).count(), 3);
        assert!(ctx.part(WatchlistsP).watched_by(lit!(1)).is_empty());
        assert_eq!(ctx.part(SolverStateP).search_state, SearchState::Propagating);
    }

    #[test]
    fn long_clauses() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 5);

        load_clause(ctx.borrow(), &lits![1, 2, 3]);
        load_clause(ctx.borrow(), &lits![-2, -2, 3, 4, -2]);
        load_clause(ctx.borrow(), &lits![4, -5, 5, 2]);

        let clause_db = ctx.part(ClauseDbP);
        let lits: Vec<&[Lit]> = clause_db.iter().collect();
        assert_eq!(
            lits,
            vec![
                &lits![1, 2, 3][..],
                &lits![-2, 3, 4][..],
                &lits![4, -5, 5, 2][..],
            ]
        );

        let watchlists = ctx.part(WatchlistsP);
        assert_eq!(watchlists.watched_by(lit!(-2)).len(), 1);
        assert_eq!(watchlists.watched_by(lit!(3)).len(), 1);
        assert_eq!(watchlists.watched_by(lit!(-5)).len(), 1);
        assert!(watchlists.watched_by(lit!(2)).len() == 1);
        assert!(ctx.part(PropQueueP).is_empty());
    }

    #[test]
    fn ignores_clauses_after_empty_clause() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 2);

        load_clause(ctx.borrow(), &lits![1, 2]);
        load_clause(ctx.borrow(), &[]);
        load_clause(ctx.borrow(), &lits![-1]);

        assert_eq!(ctx.part(SolverStateP).search_state, SearchState::Unsat);
        assert!(ctx.part(PropQueueP).is_empty());
    }
}
