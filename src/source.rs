//! The weighted sequence source: a lazy, single-pass feeder of per-position symbols.

use crate::error::SourceError;

/// Per-position symbols for every sequence, in sequence order.
///
/// `LevelSymbols[s]` is the allele symbol of sequence `s` at the
/// just-advanced position; it must lie in `[0, arity)` for that position.
pub type LevelSymbols = Vec<u32>;

/// A lazy, single-pass, resettable-per-position source of `N` weighted
/// sequences.
///
/// Implementations are pure data feeders: no cancellation or retry semantics
/// are defined beyond returning an error from [`advance`](Self::advance).
///
/// # Examples
/// ```
/// use hapdag_core::{LevelSymbols, SourceError, WeightedSequenceSource};
///
/// struct Fixed {
///     weights: Vec<f32>,
///     columns: Vec<LevelSymbols>,
///     next: usize,
/// }
///
/// impl WeightedSequenceSource for Fixed {
///     fn num_sequences(&self) -> usize { self.weights.len() }
///     fn weight(&self, seq: usize) -> f32 { self.weights[seq] }
///     fn advance(&mut self) -> Result<LevelSymbols, SourceError> {
///         let column = self.columns.get(self.next).cloned().ok_or(SourceError::Exhausted {
///             level: self.next,
///             len: self.columns.len(),
///         })?;
///         self.next += 1;
///         Ok(column)
///     }
/// }
///
/// let mut source = Fixed { weights: vec![1.0, 1.0], columns: vec![vec![0, 1]], next: 0 };
/// assert_eq!(source.num_sequences(), 2);
/// assert_eq!(source.advance().unwrap(), vec![0, 1]);
/// ```
pub trait WeightedSequenceSource {
    /// Returns `N`, the number of sequences, which is constant for the
    /// lifetime of the source.
    fn num_sequences(&self) -> usize;

    /// Returns the weight of sequence `seq`. Must be positive, finite, and
    /// constant across calls and positions.
    fn weight(&self, seq: usize) -> f32;

    /// Advances to the next position and yields its per-sequence symbols.
    ///
    /// Must be called exactly `L` times in axis order, where `L` is the
    /// length of the [`crate::MarkerAxis`] driving construction.
    ///
    /// # Errors
    /// Returns [`SourceError::Exhausted`] if no further positions are
    /// available before `L` positions have been yielded, and
    /// [`SourceError::AdvancedPastAxis`] if called beyond `L` positions.
    /// Implementations should not themselves validate symbol range against
    /// the axis; the builder performs that validation against the
    /// authoritative arity.
    fn advance(&mut self) -> Result<LevelSymbols, SourceError>;
}
