use serde::Serialize;

/// Completed predictions in this session. Lives only in memory; a new
/// dashboard starts again from zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionCounter(u64);

impl SessionCounter {
    pub fn new() -> Self {
        Self(0)
    }

    /// Adds exactly one and returns the new count.
    pub fn increment(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}
