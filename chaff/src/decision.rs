//! Decisions and chronological backtracking.
use partial_ref::{partial, PartialRef};

use chaff_formula::Var;

use crate::context::{parts::*, Context};
use crate::prop::{assign, undo_last, Conflict, DecisionKind};

/// Outcome of conflict resolution.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Resolution {
    /// A decision was flipped and its new polarity assigned.
    Flipped,
    /// Assigning the flipped polarity falsified a clause.
    FlipConflict(Conflict),
    /// No decision with an untried polarity was left.
    Exhausted,
}

/// The lowest variable without a value.
pub fn lowest_unassigned(assignment: &[Option<bool>]) -> Option<Var> {
    assignment
        .iter()
        .position(Option::is_none)
        .map(Var::from_index)
}

/// Assign `false` to the lowest unassigned variable.
///
/// Returns `None` if all variables are assigned.
pub fn make_decision(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseDbP,
        mut PropQueueP,
        mut TraceP,
        mut TrailP,
        mut WatchlistsP,
    ),
) -> Option<Result<(), Conflict>> {
    debug_assert!(ctx.part(PropQueueP).is_empty());
    let var = lowest_unassigned(ctx.part(AssignmentP).assignment())?;
    Some(assign(ctx.borrow(), var.negative(), DecisionKind::TriedOneWay))
}

/// Undo assignments up to and including the most recent decision that was tried one way, then
/// assign the opposite polarity of that decision.
///
/// Pending propagations are discarded.
pub fn resolve_conflict(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseDbP,
        mut PropQueueP,
        mut TraceP,
        mut TrailP,
        mut WatchlistsP,
    ),
) -> Resolution {
    ctx.part_mut(PropQueueP).clear();

    while let Some(entry) = undo_last(ctx.borrow()) {
        if entry.kind == DecisionKind::TriedOneWay {
            return match assign(ctx.borrow(), !entry.lit, DecisionKind::TriedBothWays) {
                Ok(()) => Resolution::Flipped,
                Err(conflict) => Resolution::FlipConflict(conflict),
            };
        }
    }

    Resolution::Exhausted
}
