//! Solver configuration.
use serde::Deserialize;

/// Configurable parameters of the solver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// Keep a log of all search events, see [`Solver::events`](crate::solver::Solver::events).
    pub record_events: bool,
    /// Check a satisfying assignment against all clauses before reporting it.
    pub verify_model: bool,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            record_events: false,
            verify_model: true,
        }
    }
}

impl SolverConfig {
    /// Description of all options and their default values.
    pub fn help() -> String {
        let default = SolverConfig::default();
        format!(
            "record_events: Keep a log of all search events. (Default: {})\n\
             verify_model: Check a satisfying assignment against all clauses. (Default: {})\n",
            default.record_events, default.verify_model,
        )
    }
}

/// Partial update of a [`SolverConfig`].
///
/// Unset fields leave the corresponding parameter unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverConfigUpdate {
    pub record_events: Option<bool>,
    pub verify_model: Option<bool>,
}

impl SolverConfigUpdate {
    pub fn new() -> SolverConfigUpdate {
        SolverConfigUpdate::default()
    }

    /// Combine two updates, the fields set in `other` take precedence.
    pub fn merge(&mut self, other: SolverConfigUpdate) {
        if other.record_events.is_some() {
            self.record_events = other.record_events;
        }
        if other.verify_model.is_some() {
            self.verify_model = other.verify_model;
        }
    }

    /// Change the fields of `config` that are set in this update.
    pub fn apply(&self, config: &mut SolverConfig) {
        if let Some(record_events) = self.record_events {
            config.record_events = record_events;
        }
        if let Some(verify_model) = self.verify_model {
            config.verify_model = verify_model;
        }
    }
}
