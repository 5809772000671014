//! Test-only fixtures shared across unit test modules.

use crate::error::SourceError;
use crate::source::{LevelSymbols, WeightedSequenceSource};

/// A [`WeightedSequenceSource`] over data fully known ahead of time, column
/// by column.
pub(crate) struct VecSequenceSource {
    weights: Vec<f32>,
    columns: Vec<LevelSymbols>,
    next: usize,
}

impl VecSequenceSource {
    pub(crate) fn new(weights: Vec<f32>, columns: Vec<LevelSymbols>) -> Self {
        Self {
            weights,
            columns,
            next: 0,
        }
    }
}

impl WeightedSequenceSource for VecSequenceSource {
    fn num_sequences(&self) -> usize {
        self.weights.len()
    }

    fn weight(&self, seq: usize) -> f32 {
        self.weights[seq]
    }

    fn advance(&mut self) -> Result<LevelSymbols, SourceError> {
        let column = self
            .columns
            .get(self.next)
            .cloned()
            .ok_or(SourceError::Exhausted {
                level: self.next,
                len: self.columns.len(),
            })?;
        self.next += 1;
        Ok(column)
    }
}
