//! Central solver data structure.
use partial_ref::{part, partial, PartialRef, PartialRefTarget};

use crate::clause::ClauseDb;
use crate::config::SolverConfig;
use crate::prop::{Assignment, PropQueue, Trail, Watchlists};
use crate::state::SolverState;
use crate::tmp::TmpData;
use crate::trace::Trace;

/// Part declarations for the [`Context`] struct.
pub mod parts {
    use super::*;

    part!(pub AssignmentP: Assignment);
    part!(pub ClauseDbP: ClauseDb);
    part!(pub PropQueueP: PropQueue);
    part!(pub SolverConfigP: SolverConfig);
    part!(pub SolverStateP: SolverState);
    part!(pub TmpDataP: TmpData);
    part!(pub TraceP: Trace);
    part!(pub TrailP: Trail);
    part!(pub WatchlistsP: Watchlists);
}

pub use parts::*;

/// Central solver data structure.
///
/// This struct contains all data kept by the solver. Functions operating on multiple fields use
/// partial references from the `partial_ref` crate, so each of them states which parts it reads
/// and which it modifies.
#[derive(PartialRefTarget, Default)]
pub struct Context {
    #[part = "AssignmentP"]
    assignment: Assignment,
    #[part = "ClauseDbP"]
    clause_db: ClauseDb,
    #[part = "PropQueueP"]
    prop_queue: PropQueue,
    #[part = "SolverConfigP"]
    solver_config: SolverConfig,
    #[part = "SolverStateP"]
    solver_state: SolverState,
    #[part = "TmpDataP"]
    tmp_data: TmpData,
    #[part = "TraceP"]
    trace: Trace,
    #[part = "TrailP"]
    trail: Trail,
    #[part = "WatchlistsP"]
    watchlists: Watchlists,
}

impl Context {
    /// The event trace, borrowed for as long as the context itself.
    pub fn trace(&self) -> &Trace {
        &self.trace
    }
}

/// Update structures for a new variable count.
pub fn set_var_count(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut PropQueueP,
        mut TmpDataP,
        mut WatchlistsP
    ),
    count: usize,
) {
    ctx.part_mut(AssignmentP).set_var_count(count);
    ctx.part_mut(PropQueueP).set_var_count(count);
    ctx.part_mut(TmpDataP).set_var_count(count);
    ctx.part_mut(WatchlistsP).set_var_count(count);
}

/// Increases the variable count to at least the given value.
pub fn ensure_var_count(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut PropQueueP,
        mut TmpDataP,
        mut WatchlistsP
    ),
    count: usize,
) {
    if count > ctx.part(AssignmentP).assignment().len() {
        set_var_count(ctx.borrow(), count)
    }
}
