//! Chaff is a [DPLL][dpll] based SAT solver. Given a boolean formula in
//! [conjunctive normal form][cnf], it either finds a variable assignment that makes the formula
//! true or exhausts the search tree.
//!
//! Unit propagation uses two watched literals per clause. Decisions always pick the lowest
//! unassigned variable and try `false` first, conflicts are resolved by chronological
//! backtracking to the most recent decision that was only tried one way. There is no clause
//! learning and there are no restarts, so the search is fully deterministic.
//!
//! [dpll]: https://en.wikipedia.org/wiki/DPLL_algorithm
//! [cnf]: https://en.wikipedia.org/wiki/Conjunctive_normal_form

pub mod config;
pub mod counting;
pub mod solver;
pub mod trace;

mod clause;
mod context;
mod decision;
mod load;
mod prop;
mod search;
mod state;
mod tmp;


pub use chaff_formula::{cnf, lit, CnfFormula, Lit, Var};

pub use solver::{LoadResult, Solver, SolverError, Verdict};
pub use state::SearchState;
pub use trace::{Event, SolverStats};

pub mod dimacs {
    //! DIMACS CNF parser and writer.
    pub use chaff_dimacs::*;
}
