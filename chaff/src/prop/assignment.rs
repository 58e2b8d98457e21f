use partial_ref::{partial, PartialRef};

use chaff_formula::Lit;

use crate::context::{parts::*, Context};
use crate::trace::Event;

use super::{watch::update_watches, Conflict};

/// Current partial assignment.
#[derive(Default)]
pub struct Assignment {
    assignment: Vec<Option<bool>>,
}

impl Assignment {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.assignment.resize(count, None);
    }

    /// Current partial assignment as slice.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.assignment[lit.index()].map(|b| b ^ lit.is_negative())
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_positive())
    }

    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_negative())
    }

    pub fn assign_lit(&mut self, lit: Lit) {
        self.assignment[lit.index()] = lit.is_positive().into()
    }

    pub fn unassign_lit(&mut self, lit: Lit) {
        self.assignment[lit.index()] = None
    }

    /// Literals of the current assignment in variable order.
    pub fn lits(&self) -> impl Iterator<Item = Lit> + '_ {
        self.assignment
            .iter()
            .enumerate()
            .flat_map(|(index, value)| value.map(|polarity| Lit::from_index(index, polarity)))
    }
}

/// How a trail entry was assigned.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DecisionKind {
    /// Forced by unit propagation.
    Implied,
    /// A decision with the other polarity still untried.
    TriedOneWay,
    /// A decision whose first polarity led to a conflict.
    TriedBothWays,
}

/// An assigned literal together with the reason for the assignment.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct TrailEntry {
    pub lit: Lit,
    pub kind: DecisionKind,
}

impl TrailEntry {
    /// The event that is emitted when this entry is assigned.
    pub fn event(self) -> Event {
        match self.kind {
            DecisionKind::Implied => Event::Propagate(self.lit),
            DecisionKind::TriedOneWay => Event::Decide(self.lit),
            DecisionKind::TriedBothWays => Event::Backtrack(self.lit),
        }
    }
}

/// Assignment history.
///
/// Contains exactly one entry per assigned variable, in assignment order.
#[derive(Default)]
pub struct Trail {
    trail: Vec<TrailEntry>,
}

impl Trail {
    /// Entries in assignment order.
    pub fn trail(&self) -> &[TrailEntry] {
        &self.trail
    }

    pub fn push(&mut self, entry: TrailEntry) {
        self.trail.push(entry)
    }

    pub fn pop(&mut self) -> Option<TrailEntry> {
        self.trail.pop()
    }
}

/// Assigns true to a literal and updates the watches of its complement.
///
/// The literal's variable has to be unassigned. The assignment stays in place even when a
/// conflict is returned.
pub fn assign(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseDbP,
        mut PropQueueP,
        mut TraceP,
        mut TrailP,
        mut WatchlistsP,
    ),
    lit: Lit,
    kind: DecisionKind,
) -> Result<(), Conflict> {
    let assignment = ctx.part_mut(AssignmentP);
    debug_assert!(assignment.lit_value(lit) == None);

    assignment.assign_lit(lit);

    let entry = TrailEntry { lit, kind };
    ctx.part_mut(TrailP).push(entry);
    ctx.part_mut(TraceP).event(entry.event());

    update_watches(ctx.borrow(), !lit)
}

/// Undo the most recent assignment.
///
/// Watches need no update, unassigning a variable cannot make a watched literal false.
pub fn undo_last(mut ctx: partial!(Context, mut AssignmentP, mut TrailP)) -> Option<TrailEntry> {
    let entry = ctx.part_mut(TrailP).pop()?;
    ctx.part_mut(AssignmentP).unassign_lit(entry.lit);
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use chaff_formula::lit;

    use crate::context::set_var_count;

    #[test]
    fn assign_and_undo() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 3);

        assign(ctx.borrow(), lit!(-2), DecisionKind::TriedOneWay).unwrap();
        assign(ctx.borrow(), lit!(3), DecisionKind::Implied).unwrap();

        assert!(ctx.part(AssignmentP).lit_is_false(lit!(2)));
        assert!(ctx.part(AssignmentP).lit_is_true(lit!(3)));
        assert_eq!(ctx.part(AssignmentP).lit_value(lit!(1)), None);
        assert_eq!(
            ctx.part(AssignmentP).lits().collect::<Vec<_>>(),
            vec![lit!(-2), lit!(3)]
        );
        assert_eq!(ctx.part(TrailP).trail().len(), 2);

        assert_eq!(
            undo_last(ctx.borrow()),
            Some(TrailEntry {
                lit: lit!(3),
                kind: DecisionKind::Implied
            })
        );
        assert_eq!(ctx.part(AssignmentP).lit_value(lit!(3)), None);
        assert_eq!(ctx.part(TrailP).trail().len(), 1);

        assert_eq!(
            undo_last(ctx.borrow()).map(|entry| entry.kind),
            Some(DecisionKind::TriedOneWay)
        );
        assert_eq!(undo_last(ctx.borrow()), None);
        assert!(ctx.part(AssignmentP).assignment().iter().all(Option::is_none));
    }
}
