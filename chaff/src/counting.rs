//! A DPLL solver using per-clause counters of false literals.
//!
//! Every assignment updates all clauses containing the complementary literal and propagation
//! rescans all clauses, so this is much slower than [`Solver`](crate::solver::Solver). It uses the
//! same decision order and conflict resolution, which makes it useful as a reference for testing.
use std::cmp::max;
use std::io;

use log::{error, info};

use chaff_formula::{CnfFormula, Lit, Var};

use crate::config::{SolverConfig, SolverConfigUpdate};
use crate::decision::lowest_unassigned;
use crate::prop::{DecisionKind, TrailEntry};
use crate::solver::{LoadResult, SolverError, Verdict};
use crate::state::SearchState;
use crate::trace::{Event, SolverStats, Trace};

/// A clause together with the number of its literals that are currently false.
struct CountedClause {
    lits: Vec<Lit>,
    false_count: usize,
}

impl CountedClause {
    fn is_falsified(&self) -> bool {
        self.false_count == self.lits.len()
    }
}

/// DPLL solver based on false literal counters.
#[derive(Default)]
pub struct CountingSolver {
    clauses: Vec<CountedClause>,
    /// Clauses containing each literal, indexed by literal code.
    occurrences: Vec<Vec<usize>>,
    assignment: Vec<Option<bool>>,
    trail: Vec<TrailEntry>,
    state: SearchState,
    solving_started: bool,
    config: SolverConfig,
    trace: Trace,
}

impl CountingSolver {
    pub fn new() -> CountingSolver {
        CountingSolver::default()
    }

    /// Keep a log of all search events.
    pub fn record_events(&mut self, recording: bool) {
        self.config.record_events = recording;
        self.trace.set_recording(recording);
    }

    /// Change the configuration, with the same restrictions as
    /// [`Solver::config`](crate::solver::Solver::config).
    pub fn config(&mut self, update: &SolverConfigUpdate) -> Result<(), SolverError> {
        if update.record_events == Some(true) && self.solving_started && !self.trace.recording() {
            return Err(SolverError::InvalidConfig {
                option: "record_events",
                reason: "recording cannot start after solving started",
            });
        }
        update.apply(&mut self.config);
        self.trace.set_recording(self.config.record_events);
        Ok(())
    }

    /// Write decisions, conflicts and backtracks to `target` while searching.
    pub fn write_trace(&mut self, target: impl io::Write + 'static) {
        self.trace.set_output(Box::new(target));
    }

    /// Add the clauses of a formula over at least `var_count` variables.
    pub fn load(
        &mut self,
        var_count: usize,
        formula: &CnfFormula,
    ) -> Result<LoadResult, SolverError> {
        if self.solving_started {
            return Err(SolverError::AlreadySolved);
        }
        if var_count > Var::max_count() {
            return Err(SolverError::TooManyVars {
                count: var_count,
                max: Var::max_count(),
            });
        }

        let var_count = max(var_count, formula.var_count());
        if var_count > self.assignment.len() {
            self.assignment.resize(var_count, None);
            self.occurrences.resize(var_count * 2, vec![]);
        }

        for clause in formula.iter() {
            let mut lits: Vec<Lit> = Vec::with_capacity(clause.len());
            for &lit in clause {
                if !lits.contains(&lit) {
                    lits.push(lit);
                }
            }

            if lits.is_empty() {
                self.state = SearchState::Unsat;
            }

            let index = self.clauses.len();
            for &lit in lits.iter() {
                self.occurrences[lit.code()].push(index);
            }
            self.clauses.push(CountedClause {
                lits,
                false_count: 0,
            });
        }

        if self.state == SearchState::Unsat {
            Ok(LoadResult::EmptyClauseDetected)
        } else {
            Ok(LoadResult::Ok)
        }
    }

    /// Check the satisfiability of the loaded formula.
    ///
    /// Errors are logged, use [`try_solve`](CountingSolver::try_solve) to get them instead.
    pub fn solve(&mut self) -> Verdict {
        if let Err(err) = self.run_search().and_then(|()| self.check_model()) {
            error!("{}", err);
        }
        self.verdict()
    }

    /// Like [`solve`](CountingSolver::solve) but fails when the trace output failed or, if
    /// enabled, when the found assignment doesn't satisfy the formula.
    pub fn try_solve(&mut self) -> Result<Verdict, SolverError> {
        self.run_search()?;
        self.check_model()?;
        Ok(self.verdict())
    }

    fn run_search(&mut self) -> Result<(), SolverError> {
        if self.solving_started {
            return Ok(());
        }
        self.solving_started = true;

        while !self.state.is_terminal() {
            self.step();
        }
        info!("Search finished: {:?}", self.state);
        info!("{}", self.trace.stats());

        self.trace.finish_output()?;
        Ok(())
    }

    fn check_model(&self) -> Result<(), SolverError> {
        if !self.config.verify_model || self.state != SearchState::Sat {
            return Ok(());
        }
        let unsatisfied = self
            .clauses
            .iter()
            .position(|clause| !clause.lits.iter().any(|&lit| self.lit_is_true(lit)));
        match unsatisfied {
            Some(index) => Err(SolverError::InvalidModel { clause: index + 1 }),
            None => Ok(()),
        }
    }

    fn verdict(&self) -> Verdict {
        if self.state == SearchState::Sat {
            Verdict::Sat(
                self.assignment
                    .iter()
                    .enumerate()
                    .flat_map(|(index, value)| {
                        value.map(|polarity| Lit::from_index(index, polarity))
                    })
                    .collect(),
            )
        } else {
            Verdict::Unsat
        }
    }

    /// Search events in order, empty unless recording is enabled.
    pub fn events(&self) -> &[Event] {
        self.trace.events()
    }

    pub fn stats(&self) -> SolverStats {
        self.trace.stats()
    }

    fn step(&mut self) {
        let conflict = match self.state {
            SearchState::Propagating => self.propagate(),
            SearchState::Deciding => match lowest_unassigned(&self.assignment) {
                None => {
                    self.state = SearchState::Sat;
                    return;
                }
                Some(var) => self.assign(var.negative(), DecisionKind::TriedOneWay),
            },
            SearchState::ConflictResolving => match self.resolve_conflict() {
                Some(flip_conflict) => flip_conflict,
                None => {
                    self.state = SearchState::Unsat;
                    return;
                }
            },
            SearchState::Sat | SearchState::Unsat => return,
        };

        self.state = if conflict {
            self.trace.event(Event::Conflict);
            SearchState::ConflictResolving
        } else if self.state == SearchState::Propagating {
            SearchState::Deciding
        } else {
            SearchState::Propagating
        };
    }

    /// Assigns true to `lit`, returns whether a clause became falsified.
    fn assign(&mut self, lit: Lit, kind: DecisionKind) -> bool {
        debug_assert!(self.assignment[lit.index()].is_none());
        self.assignment[lit.index()] = Some(lit.is_positive());

        let entry = TrailEntry { lit, kind };
        self.trail.push(entry);
        self.trace.event(entry.event());

        let mut conflict = false;
        for &index in self.occurrences[(!lit).code()].iter() {
            let clause = &mut self.clauses[index];
            clause.false_count += 1;
            conflict |= clause.is_falsified();
        }
        conflict
    }

    fn undo_last(&mut self) -> Option<TrailEntry> {
        let entry = self.trail.pop()?;
        self.assignment[entry.lit.index()] = None;
        for &index in self.occurrences[(!entry.lit).code()].iter() {
            self.clauses[index].false_count -= 1;
        }
        Some(entry)
    }

    fn lit_is_true(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_positive())
    }

    /// Assign the remaining literal of unit clauses until nothing changes.
    ///
    /// Returns whether a clause became falsified.
    fn propagate(&mut self) -> bool {
        loop {
            let mut changed = false;

            for index in 0..self.clauses.len() {
                let clause = &self.clauses[index];
                if clause.is_falsified() {
                    return true;
                }
                if clause.false_count + 1 != clause.lits.len()
                    || clause.lits.iter().any(|&lit| self.lit_is_true(lit))
                {
                    continue;
                }

                let assignment = &self.assignment;
                let unit = clause
                    .lits
                    .iter()
                    .cloned()
                    .find(|lit| assignment[lit.index()].is_none());

                if let Some(unit) = unit {
                    if self.assign(unit, DecisionKind::Implied) {
                        return true;
                    }
                    changed = true;
                }
            }

            if !changed {
                return false;
            }
        }
    }

    /// Backtrack to the most recent decision tried one way and flip it.
    ///
    /// Returns `None` when no such decision is left, otherwise whether the flipped assignment
    /// falsified a clause.
    fn resolve_conflict(&mut self) -> Option<bool> {
        while let Some(entry) = self.undo_last() {
            if entry.kind == DecisionKind::TriedOneWay {
                return Some(self.assign(!entry.lit, DecisionKind::TriedBothWays));
            }
        }
        None
    }
}
