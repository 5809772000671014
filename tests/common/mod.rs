//! Shared fixtures for integration tests.

use hapdag_core::{LevelSymbols, SourceError, WeightedSequenceSource};

/// A [`WeightedSequenceSource`] over data fully known ahead of time, column
/// by column.
pub struct VecSequenceSource {
    weights: Vec<f32>,
    columns: Vec<LevelSymbols>,
    next: usize,
}

impl VecSequenceSource {
    pub fn new(weights: Vec<f32>, columns: Vec<LevelSymbols>) -> Self {
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

/// Transposes `sequences` (one row per sequence, one column per position)
/// into the column-major form [`WeightedSequenceSource::advance`] yields.
pub fn columns_from_rows(sequences: &[Vec<u32>]) -> Vec<LevelSymbols> {
    let Some(l) = sequences.first().map(Vec::len) else {
        return Vec::new();
    };
    (0..l)
        .map(|pos| sequences.iter().map(|row| row[pos]).collect())
        .collect()
}
