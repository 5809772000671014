//! A leveled directed acyclic graph (DAG) construction engine for weighted
//! haplotype sequence populations.
//!
//! Each level corresponds to one marker position; edges are labeled with an
//! allele symbol and weighted by the sum of the sequence weights traversing
//! them. A streaming, bounded-lookahead agglomerative merge collapses
//! structurally similar parent nodes at each level as it is built, trading
//! exact minimality for a single deterministic pass over the input.
//!
//! # Examples
//! ```
//! use hapdag_core::{BuilderConfig, LevelSymbols, MarkerAxis, SourceError, WeightedSequenceSource};
//!
//! struct Columns {
//!     weights: Vec<f32>,
//!     data: Vec<LevelSymbols>,
//!     next: usize,
//! }
//!
//! impl WeightedSequenceSource for Columns {
//!     fn num_sequences(&self) -> usize { self.weights.len() }
//!     fn weight(&self, seq: usize) -> f32 { self.weights[seq] }
//!     fn advance(&mut self) -> Result<LevelSymbols, SourceError> {
//!         let column = self.data.get(self.next).cloned().ok_or(SourceError::Exhausted {
//!             level: self.next,
//!             len: self.data.len(),
//!         })?;
//!         self.next += 1;
//!         Ok(column)
//!     }
//! }
//!
//! let axis = MarkerAxis::new(vec![2, 2]).unwrap();
//! let source = Columns { weights: vec![1.0, 1.0], data: vec![vec![0, 1], vec![0, 1]], next: 0 };
//! let config = BuilderConfig::new(1.0, 4);
//! let dag = hapdag_core::build(&axis, source, &config).unwrap();
//! assert_eq!(dag.n_levels(), 2);
//! ```

#![warn(missing_docs)]

mod axis;
mod builder;
mod chain;
mod dag;
mod error;
mod frozen;
mod level;
mod memory;
mod merger;
mod score;
mod similarity;
mod source;

#[cfg(test)]
mod test_utils;

pub use axis::MarkerAxis;
pub use builder::{build, BuilderConfig};
pub use dag::{FrozenDag, LevelSummary};
pub use error::{DagError, DagErrorCode, Result, SourceError, SourceErrorCode};
pub use frozen::{FrozenLevel, IndexWidth};
pub use memory::{estimate_peak_bytes, format_bytes};
pub use score::ScorePair;
pub use source::{LevelSymbols, WeightedSequenceSource};
