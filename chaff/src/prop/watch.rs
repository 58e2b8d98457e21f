//! Watchlists to detect clauses that became unit.
//!
//! Each clause with two or more literals has two watched literals and is contained in the
//! watchlists of exactly those two literals. While a clause is neither satisfied nor unit, both
//! watched literals are non-false.
//!
//! When a watched literal becomes false, the clause is scanned in literal order for the first
//! non-false literal that is not the other watched literal, and the watch moves there. If there is
//! none, the clause is satisfied, unit or falsified depending on the other watched literal. A
//! falsified clause stops the update right away.
//!
//! Backtracking only unassigns variables, so it never invalidates watches and needs no update.
use std::mem::replace;

use partial_ref::{partial, PartialRef};
use vec_mut_scan::VecMutScan;

use chaff_formula::Lit;

use crate::clause::ClauseRef;
use crate::context::{parts::*, Context};

use super::Conflict;

/// Watchlists indexed by the code of the watched literal.
#[derive(Default)]
pub struct Watchlists {
    watches: Vec<Vec<ClauseRef>>,
}

impl Watchlists {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.watches.resize(count * 2, vec![]);
    }

    /// Start watching a clause.
    ///
    /// `lits` are the two distinct literals that are watched initially.
    pub fn watch_clause(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        debug_assert!(lits[0] != lits[1]);
        for &lit in lits.iter() {
            self.add_watch(lit, cref);
        }
    }

    /// Clauses watching a given literal.
    #[cfg(test)]
    pub fn watched_by(&self, lit: Lit) -> &[ClauseRef] {
        &self.watches[lit.code()]
    }

    pub fn watched_by_mut(&mut self, lit: Lit) -> &mut Vec<ClauseRef> {
        &mut self.watches[lit.code()]
    }

    /// Make a literal watch a clause.
    pub fn add_watch(&mut self, lit: Lit, cref: ClauseRef) {
        self.watches[lit.code()].push(cref)
    }
}

/// Visit the clauses watching a literal that just became false.
///
/// Moves watches away from `lit` where possible and enqueues the other watched literal of clauses
/// that became unit. Returns the first falsified clause, leaving the clauses not yet visited in
/// the watchlist of `lit`.
pub fn update_watches(
    mut ctx: partial!(
        Context,
        mut ClauseDbP,
        mut PropQueueP,
        mut WatchlistsP,
        AssignmentP,
    ),
    lit: Lit,
) -> Result<(), Conflict> {
    // Move the watchlist out while it is processed, so watches can be added to other lists.
    let mut watches = replace(ctx.part_mut(WatchlistsP).watched_by_mut(lit), vec![]);

    let mut scan = VecMutScan::new(&mut watches);

    let mut result = Ok(());

    while let Some(watch) = scan.next() {
        let cref = *watch;

        let clause_db = ctx.part(ClauseDbP);
        let assignment = ctx.part(AssignmentP);

        let lits = clause_db.lits(cref);
        let watched_pos = clause_db.watched_pos(cref);
        let slot = if lits[watched_pos[0]] == lit { 0 } else { 1 };
        debug_assert_eq!(lits[watched_pos[slot]], lit);
        let other = lits[watched_pos[slot ^ 1]];

        let replacement = lits
            .iter()
            .enumerate()
            .find(|&(_, &candidate)| {
                candidate != lit && candidate != other && !assignment.lit_is_false(candidate)
            })
            .map(|(pos, &candidate)| (pos, candidate));

        if let Some((pos, new_lit)) = replacement {
            ctx.part_mut(ClauseDbP).set_watched_pos(cref, slot, pos);
            ctx.part_mut(WatchlistsP).add_watch(new_lit, cref);
            watch.remove();
            continue;
        }

        match ctx.part(AssignmentP).lit_value(other) {
            Some(true) => (),
            None => ctx.part_mut(PropQueueP).push(other),
            Some(false) => {
                result = Err(Conflict::Clause(cref));
                break;
            }
        }
    }

    // Keeps all unprocessed watches in the current watchlist.
    drop(scan);

    *ctx.part_mut(WatchlistsP).watched_by_mut(lit) = watches;

    result
}
