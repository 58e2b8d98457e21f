//! Boolean satisfiability solver.
use std::cmp::max;
use std::io;

use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use log::{error, info};
use thiserror::Error;

use chaff_dimacs::{DimacsParser, ParserError};
use chaff_formula::{CnfFormula, FormulaError, Lit, Var};

use crate::config::{SolverConfig, SolverConfigUpdate};
use crate::context::{ensure_var_count, parts::*, Context};
use crate::load::load_clause;
use crate::search::search;
use crate::state::SearchState;
use crate::trace::{Event, SolverStats};

/// Possible errors while loading a formula or solving.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    Formula(#[from] FormulaError),
    #[error("{count} variables exceed the supported maximum of {max}")]
    TooManyVars { count: usize, max: usize },
    #[error("Error parsing DIMACS input: {0}")]
    Parse(#[from] ParserError),
    #[error("Error reading input: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid configuration for {option}: {reason}")]
    InvalidConfig {
        option: &'static str,
        reason: &'static str,
    },
    #[error("The formula cannot be changed after solving started")]
    AlreadySolved,
    #[error("The found assignment does not satisfy clause {clause}")]
    InvalidModel { clause: usize },
}

/// Outcome of loading a formula.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LoadResult {
    Ok,
    /// The formula contains an empty clause and is unsatisfiable without any search.
    EmptyClauseDetected,
}

/// Result of a search.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Verdict {
    /// Satisfiable, with one literal per variable in variable order.
    Sat(Vec<Lit>),
    Unsat,
}

impl Verdict {
    pub fn is_sat(&self) -> bool {
        match self {
            Verdict::Sat(_) => true,
            Verdict::Unsat => false,
        }
    }

    /// The satisfying assignment, if any.
    pub fn model(&self) -> Option<&[Lit]> {
        match self {
            Verdict::Sat(model) => Some(model),
            Verdict::Unsat => None,
        }
    }
}

/// A boolean satisfiability solver.
#[derive(Default)]
pub struct Solver {
    ctx: Box<Context>,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Create a new solver with the given configuration.
    pub fn with_config(config: SolverConfig) -> Solver {
        let mut solver = Solver::new();
        {
            let mut ctx = solver.ctx.into_partial_ref_mut();
            ctx.part_mut(TraceP).set_recording(config.record_events);
            *ctx.part_mut(SolverConfigP) = config;
        }
        solver
    }

    /// Change the solver configuration.
    ///
    /// Event recording cannot be enabled once the search started.
    pub fn config(&mut self, update: &SolverConfigUpdate) -> Result<(), SolverError> {
        let mut ctx = self.ctx.into_partial_ref_mut();

        if update.record_events == Some(true)
            && ctx.part(SolverStateP).solving_started
            && !ctx.part(TraceP).recording()
        {
            return Err(SolverError::InvalidConfig {
                option: "record_events",
                reason: "recording cannot start after solving started",
            });
        }

        let (config, mut ctx) = ctx.split_part_mut(SolverConfigP);
        update.apply(config);
        ctx.part_mut(TraceP).set_recording(config.record_events);

        Ok(())
    }

    /// Add the clauses of a formula over at least `var_count` variables.
    ///
    /// Variables that appear in the formula are added even when they exceed `var_count`.
    pub fn load(
        &mut self,
        var_count: usize,
        formula: &CnfFormula,
    ) -> Result<LoadResult, SolverError> {
        let mut ctx = self.ctx.into_partial_ref_mut();

        if ctx.part(SolverStateP).solving_started {
            return Err(SolverError::AlreadySolved);
        }

        if var_count > Var::max_count() {
            return Err(SolverError::TooManyVars {
                count: var_count,
                max: Var::max_count(),
            });
        }

        ensure_var_count(ctx.borrow(), max(var_count, formula.var_count()));

        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }

        if ctx.part(SolverStateP).search_state == SearchState::Unsat {
            Ok(LoadResult::EmptyClauseDetected)
        } else {
            Ok(LoadResult::Ok)
        }
    }

    /// Add clauses given as signed DIMACS numbers.
    pub fn load_dimacs_clauses(
        &mut self,
        var_count: usize,
        clauses: &[Vec<isize>],
    ) -> Result<LoadResult, SolverError> {
        let formula = CnfFormula::from_dimacs(var_count, clauses)?;
        self.load(var_count, &formula)
    }

    /// Reads and adds a formula in DIMACS CNF format.
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<LoadResult, SolverError> {
        use io::BufRead;

        let mut buffer = io::BufReader::new(input);
        let mut parser = DimacsParser::new();

        loop {
            let data = buffer.fill_buf()?;
            if data.is_empty() {
                break;
            }
            parser.parse_chunk(data)?;
            let len = data.len();
            buffer.consume(len);
        }
        parser.eof()?;
        parser.check_header()?;

        info!(
            "Parsed formula with {} variables and {} clauses",
            parser.var_count(),
            parser.clause_count()
        );

        let formula = parser.take_formula();
        self.load(formula.var_count(), &formula)
    }

    /// Check the satisfiability of the loaded formula.
    ///
    /// Solving a second time returns the same verdict without searching again. A satisfying
    /// assignment that fails verification is logged, use [`try_solve`](Solver::try_solve) to get
    /// the error instead.
    pub fn solve(&mut self) -> Verdict {
        if let Err(err) = self.run_search().and_then(|()| self.check_model()) {
            error!("{}", err);
        }
        self.verdict()
    }

    /// Like [`solve`](Solver::solve) but fails when the found assignment doesn't satisfy the
    /// formula.
    ///
    /// The check is only performed when enabled in the configuration.
    pub fn try_solve(&mut self) -> Result<Verdict, SolverError> {
        self.run_search()?;
        self.check_model()?;
        Ok(self.verdict())
    }

    /// Write decisions, conflicts and backtracks to `target` while searching.
    ///
    /// Lines look like `Decide: -3`, `Conflict` and `Backtrack: 3`. A write error stops the
    /// output and is returned by [`try_solve`](Solver::try_solve).
    pub fn write_trace(&mut self, target: impl io::Write + 'static) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ctx.part_mut(TraceP).set_output(Box::new(target));
    }

    /// Searches unless this was done before, fails if the trace output failed.
    fn run_search(&mut self) -> Result<(), SolverError> {
        let mut ctx = self.ctx.into_partial_ref_mut();

        if ctx.part(SolverStateP).solving_started {
            return Ok(());
        }
        ctx.part_mut(SolverStateP).solving_started = true;

        info!(
            "Searching {} clauses over {} variables",
            ctx.part(ClauseDbP).count(),
            ctx.part(AssignmentP).assignment().len()
        );

        let state = search(ctx.borrow());

        info!("Search finished: {:?}", state);
        info!("{}", ctx.part(TraceP).stats());

        ctx.part_mut(TraceP).finish_output()?;
        Ok(())
    }

    fn verdict(&self) -> Verdict {
        match self.model() {
            Some(model) => Verdict::Sat(model),
            None => Verdict::Unsat,
        }
    }

    fn check_model(&self) -> Result<(), SolverError> {
        let ctx = self.ctx.into_partial_ref();

        if !ctx.part(SolverConfigP).verify_model
            || ctx.part(SolverStateP).search_state != SearchState::Sat
        {
            return Ok(());
        }

        let assignment = ctx.part(AssignmentP);

        for (index, clause) in ctx.part(ClauseDbP).iter().enumerate() {
            if !clause.iter().any(|&lit| assignment.lit_is_true(lit)) {
                return Err(SolverError::InvalidModel { clause: index + 1 });
            }
        }

        Ok(())
    }

    /// Total assignment satisfying the formula, one literal per variable in variable order.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let ctx = self.ctx.into_partial_ref();
        if ctx.part(SolverStateP).search_state == SearchState::Sat {
            Some(ctx.part(AssignmentP).lits().collect())
        } else {
            None
        }
    }

    /// Current state of the search.
    pub fn search_state(&self) -> SearchState {
        self.ctx.into_partial_ref().part(SolverStateP).search_state
    }

    /// Number of decisions, propagations, conflicts and backtracks so far.
    pub fn stats(&self) -> SolverStats {
        self.ctx.into_partial_ref().part(TraceP).stats()
    }

    /// Search events in order.
    ///
    /// Empty unless [`SolverConfig::record_events`] is set.
    pub fn events(&self) -> &[Event] {
        self.ctx.trace().events()
    }
}
