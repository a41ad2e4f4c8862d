//! Active-path tracking for cycle detection
//!
//! The import graph and the type derivation graph are both walked
//! depth-first with cycle detection on the active path. [`VisitPath`] is
//! the shared mechanism: an ordered stack of names that can report the
//! full path through an offending revisit for diagnostics.

/// An ordered stack of the names currently being expanded
#[derive(Debug, Default)]
pub struct VisitPath {
    entries: Vec<String>,
}

impl VisitPath {
    /// Create an empty path
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a name is on the active path
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry == name)
    }

    /// Push a name onto the active path
    pub fn enter(&mut self, name: impl Into<String>) {
        self.entries.push(name.into());
    }

    /// Pop the most recently entered name
    pub fn leave(&mut self) {
        self.entries.pop();
    }

    /// The active path extended with the offending revisit, for diagnostics
    #[must_use]
    pub fn cycle_through(&self, offender: &str) -> Vec<String> {
        let mut cycle = self.entries.clone();
        cycle.push(offender.to_string());
        cycle
    }
}
