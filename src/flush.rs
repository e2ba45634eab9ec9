//! Flush policies.

/// Controls when the document gets written to disk.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Rewrite the whole file after every mutation. Safest, but most I/O.
    #[default]
    Immediate,
    /// Only write when you call `flush()` yourself. Useful for bulk loads.
    Manual,
}

impl FlushPolicy {
    /// Whether a mutation should be followed by a save.
    pub fn saves_on_mutation(self) -> bool {
        matches!(self, FlushPolicy::Immediate)
    }
}
