//! Temporary data.
use chaff_formula::Lit;

/// Scratch buffers reused across calls.
///
/// Users have to leave `flags` all-false when they are done.
#[derive(Default)]
pub struct TmpData {
    pub lits: Vec<Lit>,
    /// A boolean for each literal code.
    pub flags: Vec<bool>,
}

impl TmpData {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.flags.resize(count * 2, false);
    }
}
