//! Scripted uniform sources for testing.

use crate::UniformSource;

/// Replays a fixed list of uniform draws, restarting from the beginning once exhausted.
#[derive(Clone, Debug)]
pub struct Sequence {
    values: Vec<f64>,
    next: usize,
}

impl Sequence {
    /// Create a source that replays `values` in order.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "sequence must contain at least one value");
        Self { values, next: 0 }
    }

    /// Number of draws taken so far.
    pub fn draws(&self) -> usize {
        self.next
    }
}

impl UniformSource for Sequence {
    fn next_uniform(&mut self) -> f64 {
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}
