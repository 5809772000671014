//! Error types for the hapdag core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::fmt;

use thiserror::Error;

/// Stable codes describing [`SourceError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum SourceErrorCode {
    /// A sequence weight was non-positive, NaN, or infinite.
    InvalidWeight,
    /// A yielded symbol fell outside the position's declared alphabet.
    SymbolOutOfRange,
    /// The source was asked to advance past the end of the marker axis.
    AdvancedPastAxis,
    /// The source ran out of positions before the axis was exhausted.
    Exhausted,
}

impl SourceErrorCode {
    /// Returns the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidWeight => "SOURCE_INVALID_WEIGHT",
            Self::SymbolOutOfRange => "SOURCE_SYMBOL_OUT_OF_RANGE",
            Self::AdvancedPastAxis => "SOURCE_ADVANCED_PAST_AXIS",
            Self::Exhausted => "SOURCE_EXHAUSTED",
        }
    }
}

impl fmt::Display for SourceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error produced by a [`crate::WeightedSequenceSource`] implementation.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SourceError {
    /// A sequence weight was non-positive, NaN, or infinite.
    #[error("sequence {seq} has invalid weight {weight}")]
    InvalidWeight {
        /// Index of the offending sequence.
        seq: usize,
        /// The invalid weight value observed.
        weight: f32,
    },
    /// A yielded symbol fell outside the position's declared alphabet.
    #[error("sequence {seq} yielded symbol {symbol} but level {level} has arity {arity}")]
    SymbolOutOfRange {
        /// Index of the offending sequence.
        seq: usize,
        /// The level (position) at which the symbol was yielded.
        level: usize,
        /// The out-of-range symbol value.
        symbol: u32,
        /// The declared arity of the level.
        arity: u32,
    },
    /// The source was asked to advance past the end of the marker axis.
    #[error("advance() called at level {level} but the axis has only {len} positions")]
    AdvancedPastAxis {
        /// The requested level.
        level: usize,
        /// The number of positions declared by the marker axis.
        len: usize,
    },
    /// The source ran out of positions before the axis was exhausted.
    #[error("source exhausted at level {level} of {len}")]
    Exhausted {
        /// The level at which the source failed to yield further data.
        level: usize,
        /// The number of positions declared by the marker axis.
        len: usize,
    },
}

impl SourceError {
    /// Retrieves the stable [`SourceErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> SourceErrorCode {
        match self {
            Self::InvalidWeight { .. } => SourceErrorCode::InvalidWeight,
            Self::SymbolOutOfRange { .. } => SourceErrorCode::SymbolOutOfRange,
            Self::AdvancedPastAxis { .. } => SourceErrorCode::AdvancedPastAxis,
            Self::Exhausted { .. } => SourceErrorCode::Exhausted,
        }
    }
}

/// Stable codes describing [`DagError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum DagErrorCode {
    /// The marker axis was empty or declared an invalid arity.
    InvalidAxis,
    /// The builder configuration was rejected.
    InvalidConfig,
    /// The sequence source failed.
    SourceFailure,
    /// A node or edge index was outside its declared bounds.
    OutOfRange,
    /// `FrozenDag` construction detected inconsistent level shapes.
    ShapeConsistency,
    /// An internal invariant was violated; indicates a logic error.
    Internal,
}

impl DagErrorCode {
    /// Returns the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidAxis => "DAG_INVALID_AXIS",
            Self::InvalidConfig => "DAG_INVALID_CONFIG",
            Self::SourceFailure => "DAG_SOURCE_FAILURE",
            Self::OutOfRange => "DAG_OUT_OF_RANGE",
            Self::ShapeConsistency => "DAG_SHAPE_CONSISTENCY",
            Self::Internal => "DAG_INTERNAL",
        }
    }
}

impl fmt::Display for DagErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type produced while constructing a [`crate::FrozenDag`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DagError {
    /// The marker axis was empty or declared an invalid arity.
    #[error("invalid marker axis: {reason}")]
    InvalidAxis {
        /// Human-readable explanation of the axis failure.
        reason: String,
    },
    /// The builder configuration was rejected.
    #[error("invalid builder configuration: {reason}")]
    InvalidConfig {
        /// Human-readable explanation of the configuration failure.
        reason: String,
    },
    /// The sequence source failed.
    #[error("sequence source failed: {error}")]
    Source {
        #[source]
        error: SourceError,
    },
    /// A node or edge index was outside its declared bounds.
    #[error("index {index} is out of range (bound {bound}) while {context}")]
    OutOfRange {
        /// The offending index.
        index: usize,
        /// The exclusive bound the index should have satisfied.
        bound: usize,
        /// What operation was being performed when the bound was violated.
        context: &'static str,
    },
    /// `FrozenDag` construction detected inconsistent level shapes.
    #[error("shape consistency violated: {reason}")]
    ShapeConsistency {
        /// Human-readable explanation of the shape mismatch.
        reason: String,
    },
    /// An internal invariant was violated; indicates a logic error.
    #[error("internal invariant violated: {invariant}")]
    Internal {
        /// Name of the violated invariant, to assist debugging.
        invariant: &'static str,
    },
}

impl From<SourceError> for DagError {
    fn from(error: SourceError) -> Self {
        Self::Source { error }
    }
}

impl DagError {
    /// Retrieves the stable [`DagErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> DagErrorCode {
        match self {
            Self::InvalidAxis { .. } => DagErrorCode::InvalidAxis,
            Self::InvalidConfig { .. } => DagErrorCode::InvalidConfig,
            Self::Source { .. } => DagErrorCode::SourceFailure,
            Self::OutOfRange { .. } => DagErrorCode::OutOfRange,
            Self::ShapeConsistency { .. } => DagErrorCode::ShapeConsistency,
            Self::Internal { .. } => DagErrorCode::Internal,
        }
    }

    /// Retrieves the inner [`SourceErrorCode`] when the error originated in a
    /// [`crate::WeightedSequenceSource`].
    #[must_use]
    pub const fn source_code(&self) -> Option<SourceErrorCode> {
        match self {
            Self::Source { error } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, DagError>;
