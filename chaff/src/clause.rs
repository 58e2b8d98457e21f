//! Clause storage.
use std::ops::Range;

use chaff_formula::{lit::LitIdx, Lit};

/// Compact reference to a clause in the [`ClauseDb`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ClauseRef {
    index: LitIdx,
}

impl ClauseRef {
    /// Position of the clause in load order.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Location and watch state of a stored clause.
#[derive(Clone)]
struct ClauseEntry {
    range: Range<usize>,
    /// Positions of the two watched literals within the clause.
    ///
    /// Only meaningful for clauses with at least two literals.
    watched: [LitIdx; 2],
}

/// All clauses of the loaded formula.
///
/// Clauses are kept in load order with duplicated literals already removed. The literals of a
/// clause are never reordered, moving a watch only updates the stored watched positions.
#[derive(Default)]
pub struct ClauseDb {
    literals: Vec<Lit>,
    clauses: Vec<ClauseEntry>,
}

impl ClauseDb {
    /// Store a clause, watching its first two literals.
    pub fn add_clause(&mut self, lits: &[Lit]) -> ClauseRef {
        let begin = self.literals.len();
        self.literals.extend_from_slice(lits);
        let cref = ClauseRef {
            index: self.clauses.len() as LitIdx,
        };
        self.clauses.push(ClauseEntry {
            range: begin..self.literals.len(),
            watched: [0, 1],
        });
        cref
    }

    /// Number of stored clauses.
    pub fn count(&self) -> usize {
        self.clauses.len()
    }

    pub fn lits(&self, cref: ClauseRef) -> &[Lit] {
        &self.literals[self.clauses[cref.index()].range.clone()]
    }

    /// Positions of the watched literals of a clause.
    pub fn watched_pos(&self, cref: ClauseRef) -> [usize; 2] {
        let watched = self.clauses[cref.index()].watched;
        [watched[0] as usize, watched[1] as usize]
    }

    /// The two watched literals of a clause.
    pub fn watched(&self, cref: ClauseRef) -> [Lit; 2] {
        let lits = self.lits(cref);
        let [first, second] = self.watched_pos(cref);
        [lits[first], lits[second]]
    }

    /// Move the watch in slot `slot` (0 or 1) to the literal at `pos`.
    pub fn set_watched_pos(&mut self, cref: ClauseRef, slot: usize, pos: usize) {
        let entry = &mut self.clauses[cref.index()];
        debug_assert!(pos < entry.range.len());
        entry.watched[slot] = pos as LitIdx;
    }

    /// Iterate over all clauses in load order.
    pub fn iter(&self) -> impl Iterator<Item = &[Lit]> {
        let literals = &self.literals;
        self.clauses
            .iter()
            .map(move |entry| &literals[entry.range.clone()])
    }
}
