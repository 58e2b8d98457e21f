//! Search events and statistics.
use std::fmt;
use std::io::{self, Write};

use log::trace;

use chaff_formula::Lit;

/// A single step of the search.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Event {
    /// A decision tried the given literal first.
    Decide(Lit),
    /// The literal was assigned by unit propagation.
    Propagate(Lit),
    /// Propagation or an assignment falsified a clause.
    Conflict,
    /// Conflict resolution flipped a decision, assigning the given literal.
    Backtrack(Lit),
}

impl Event {
    /// Whether this event is a decision, conflict or backtrack.
    ///
    /// The order of these events only depends on the formula, not on the order in which unit
    /// propagation visits clauses.
    pub fn is_search_step(&self) -> bool {
        match self {
            Event::Propagate(_) => false,
            _ => true,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Event::Decide(lit) => write!(f, "Decide: {}", lit),
            Event::Propagate(lit) => write!(f, "Propagate: {}", lit),
            Event::Conflict => write!(f, "Conflict"),
            Event::Backtrack(lit) => write!(f, "Backtrack: {}", lit),
        }
    }
}

/// Counters of search events.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct SolverStats {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub backtracks: u64,
}

impl fmt::Display for SolverStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} decisions, {} propagations, {} conflicts, {} backtracks",
            self.decisions, self.propagations, self.conflicts, self.backtracks
        )
    }
}

/// Event log and statistics of a search.
#[derive(Default)]
pub struct Trace {
    events: Vec<Event>,
    recording: bool,
    stats: SolverStats,
    /// Receives decisions, conflicts and backtracks as they happen, one per line.
    output: Option<Box<dyn Write>>,
    /// First write error of `output`, which is dropped afterwards.
    output_error: Option<io::Error>,
}

impl Trace {
    /// Count an event, keeping it when recording is enabled.
    pub fn event(&mut self, event: Event) {
        trace!("{}", event);

        match event {
            Event::Decide(_) => self.stats.decisions += 1,
            Event::Propagate(_) => self.stats.propagations += 1,
            Event::Conflict => self.stats.conflicts += 1,
            Event::Backtrack(_) => self.stats.backtracks += 1,
        }

        if self.recording {
            self.events.push(event);
        }

        if event.is_search_step() {
            let result = match &mut self.output {
                Some(output) => writeln!(output, "{}", event),
                None => Ok(()),
            };
            self.output_failed(result);
        }
    }

    fn output_failed(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            self.output = None;
            self.output_error.get_or_insert(err);
        }
    }

    /// Write search steps to `output` while searching.
    pub fn set_output(&mut self, output: Box<dyn Write>) {
        self.output = Some(output);
    }

    /// Flush the output and return the first error writing to it.
    pub fn finish_output(&mut self) -> Result<(), io::Error> {
        let result = match &mut self.output {
            Some(output) => output.flush(),
            None => Ok(()),
        };
        self.output_failed(result);
        match self.output_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }

    pub fn recording(&self) -> bool {
        self.recording
    }

    /// Recorded events in order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn stats(&self) -> SolverStats {
        self.stats
    }
}
