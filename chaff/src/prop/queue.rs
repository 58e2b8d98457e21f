use chaff_formula::Lit;

/// Literals that are forced true but not yet assigned.
///
/// Each literal is contained at most once. Literals are taken out in last-in first-out order.
#[derive(Default)]
pub struct PropQueue {
    pending: Vec<Lit>,
    /// Membership flag for each literal code.
    queued: Vec<bool>,
}

impl PropQueue {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.queued.resize(count * 2, false);
    }

    /// Enqueue a literal unless it is already pending.
    pub fn push(&mut self, lit: Lit) {
        let queued = &mut self.queued[lit.code()];
        if !*queued {
            *queued = true;
            self.pending.push(lit);
        }
    }

    /// Take out the most recently enqueued literal.
    pub fn pop(&mut self) -> Option<Lit> {
        let lit = self.pending.pop()?;
        self.queued[lit.code()] = false;
        Some(lit)
    }

    /// Discard all pending literals.
    pub fn clear(&mut self) {
        for lit in self.pending.drain(..) {
            self.queued[lit.code()] = false;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
