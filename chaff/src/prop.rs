//! Unit propagation.
use partial_ref::{partial, PartialRef};

use chaff_formula::Lit;

use crate::clause::ClauseRef;
use crate::context::{parts::*, Context};

pub mod assignment;
pub mod queue;
pub mod watch;

pub use assignment::{assign, undo_last, Assignment, DecisionKind, Trail, TrailEntry};
pub use queue::PropQueue;
pub use watch::Watchlists;

/// A falsified clause or a forced literal that is already false.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Conflict {
    Clause(ClauseRef),
    /// Two forced literals contradict each other, as for the unit clauses `x` and `-x`.
    Unit(Lit),
}

/// Assign all pending forced literals until the queue is empty or a conflict is found.
pub fn propagate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseDbP,
        mut PropQueueP,
        mut TraceP,
        mut TrailP,
        mut WatchlistsP,
    ),
) -> Result<(), Conflict> {
    while let Some(lit) = ctx.part_mut(PropQueueP).pop() {
        match ctx.part(AssignmentP).lit_value(lit) {
            Some(true) => (),
            Some(false) => return Err(Conflict::Unit(lit)),
            None => assign(ctx.borrow(), lit, DecisionKind::Implied)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use chaff_formula::{cnf_formula, lit};

    use crate::context::set_var_count;
    use crate::load::load_clause;

    #[test]
    fn chain_of_implications() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let formula = cnf_formula![
            -1, 2;
            -2, 3, -4;
            -3, 4;
            1;
            -3, 5, 1;
        ];

        set_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }

        propagate(ctx.borrow()).unwrap();

        let assignment = ctx.part(AssignmentP);
        assert!(assignment.lit_is_true(lit!(1)));
        assert!(assignment.lit_is_true(lit!(2)));
        assert_eq!(assignment.lit_value(lit!(3)), None);
        assert_eq!(assignment.lit_value(lit!(4)), None);
        assert!(ctx.part(TrailP).trail().iter().all(|entry| entry.kind == DecisionKind::Implied));
    }

    #[test]
    fn contradicting_units() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 1);
        load_clause(ctx.borrow(), &[lit!(1)]);
        load_clause(ctx.borrow(), &[lit!(-1)]);

        assert_eq!(propagate(ctx.borrow()), Err(Conflict::Unit(lit!(1))));
        assert_eq!(ctx.part(TrailP).trail().len(), 1);
    }

    #[test]
    fn detects_falsified_clause() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let formula = cnf_formula![
            1, 2;
            1, -2;
            -1;
        ];

        set_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }

        match propagate(ctx.borrow()) {
            Err(Conflict::Clause(cref)) => assert_eq!(cref.index(), 0),
            other => panic!("expected falsified clause, got {:?}", other),
        }
    }
}
