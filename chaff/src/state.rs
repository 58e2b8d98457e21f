//! Search state.

/// State of the search state machine.
///
/// The search starts by propagating the unit clauses of the formula and ends in one of the two
/// terminal states.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SearchState {
    Propagating,
    Deciding,
    ConflictResolving,
    Sat,
    Unsat,
}

impl Default for SearchState {
    fn default() -> SearchState {
        SearchState::Propagating
    }
}

impl SearchState {
    /// Whether the search is finished.
    pub fn is_terminal(self) -> bool {
        match self {
            SearchState::Sat | SearchState::Unsat => true,
            _ => false,
        }
    }
}

/// Miscellaneous solver state.
#[derive(Default)]
pub struct SolverState {
    pub search_state: SearchState,
    /// Set by the first call to solve, the formula is fixed from then on.
    pub solving_started: bool,
}
