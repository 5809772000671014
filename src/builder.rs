//! The top-level driver (C9): streams a [`WeightedSequenceSource`] into a
//! sliding chain of [`MutableLevel`]s, runs the merger at each new
//! frontier, and freezes settled levels into a [`FrozenDag`].

use tracing::instrument;

use crate::axis::MarkerAxis;
use crate::chain::LevelChain;
use crate::dag::FrozenDag;
use crate::error::{DagError, Result};
use crate::frozen::freeze_level;
use crate::level::MutableLevel;
use crate::merger;
use crate::similarity::{
    ChainExtender, SimilarityParams, DEFAULT_GROWTH_RATIOS, DEFAULT_MAX_THRESHOLD_RATIO,
};
use crate::source::WeightedSequenceSource;

/// Configuration accepted by [`build`] (spec §6's recognized configuration
/// table).
///
/// `scale` and `max_window` are required; `min_window` defaults to
/// `max_window / 12 + 1` unless overridden.
///
/// # Examples
/// ```
/// use hapdag_core::BuilderConfig;
///
/// let config = BuilderConfig::new(1.0, 12).with_min_window(2);
/// assert_eq!(config.min_window(), 2);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct BuilderConfig {
    scale: f32,
    max_window: u32,
    min_window: Option<u32>,
    max_threshold_ratio: f32,
    growth_ratios: (f32, f32),
}

impl BuilderConfig {
    /// Builds a configuration from the required `scale` and `max_window`.
    #[must_use]
    pub fn new(scale: f32, max_window: u32) -> Self {
        Self {
            scale,
            max_window,
            min_window: None,
            max_threshold_ratio: DEFAULT_MAX_THRESHOLD_RATIO,
            growth_ratios: DEFAULT_GROWTH_RATIOS,
        }
    }

    /// Overrides the derived `min_window` with an explicit value.
    #[must_use]
    pub fn with_min_window(mut self, min_window: u32) -> Self {
        self.min_window = Some(min_window);
        self
    }

    /// Overrides the early-reject ratio applied to a pair's final `maxDiff`.
    #[must_use]
    pub fn with_max_threshold_ratio(mut self, max_threshold_ratio: f32) -> Self {
        self.max_threshold_ratio = max_threshold_ratio;
        self
    }

    /// Overrides the descent-gating `(maxDiff, proportion)` ratios that
    /// decide whether the similarity recursion grows the chain further.
    #[must_use]
    pub fn with_growth_ratios(mut self, max_diff_ratio: f32, min_prop_ratio: f32) -> Self {
        self.growth_ratios = (max_diff_ratio, min_prop_ratio);
        self
    }

    /// Returns the configured similarity-threshold scale.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Returns the configured hard depth cap.
    #[must_use]
    pub fn max_window(&self) -> u32 {
        self.max_window
    }

    /// Returns the effective `min_window`, derived from `max_window` unless
    /// explicitly overridden.
    #[must_use]
    pub fn min_window(&self) -> u32 {
        self.min_window.unwrap_or(self.max_window / 12 + 1)
    }

    /// Returns the configured early-reject ratio.
    #[must_use]
    pub fn max_threshold_ratio(&self) -> f32 {
        self.max_threshold_ratio
    }

    /// Returns the configured descent-gating ratios.
    #[must_use]
    pub fn growth_ratios(&self) -> (f32, f32) {
        self.growth_ratios
    }

    fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(DagError::InvalidConfig {
                reason: format!("scale must be finite and positive, got {}", self.scale),
            });
        }
        if self.max_window < 1 {
            return Err(DagError::InvalidConfig {
                reason: "max_window must be at least 1".to_string(),
            });
        }
        let min_window = self.min_window();
        if min_window < 1 || min_window > self.max_window {
            return Err(DagError::InvalidConfig {
                reason: format!(
                    "min_window {min_window} must lie between 1 and max_window {}",
                    self.max_window
                ),
            });
        }
        Ok(())
    }
}

struct SourceExtender<'a, S> {
    source: &'a mut S,
    axis: &'a MarkerAxis,
    weights: &'a [f32],
}

impl<'a, S: WeightedSequenceSource> ChainExtender for SourceExtender<'a, S> {
    fn ensure_level_after(&mut self, chain: &mut LevelChain, after_index: usize) -> Result<bool> {
        let next_index = after_index + 1;
        if chain.get(next_index).is_some() {
            return Ok(true);
        }
        if next_index >= self.axis.len() {
            return Ok(false);
        }
        let arity = self.axis.arity(next_index);
        let symbols = self.source.advance()?;
        let level = {
            let prev = chain.get(after_index).ok_or(DagError::Internal {
                invariant: "ensure_level_after requires its predecessor to be resident",
            })?;
            MutableLevel::from_parent(next_index, arity, self.weights, &symbols, prev)?
        };
        chain.push_back(level);
        if let Some(prev_mut) = chain.get_mut(after_index) {
            prev_mut.release_seq_lists();
        }
        Ok(true)
    }
}

fn top_up(
    chain: &mut LevelChain,
    extender: &mut dyn ChainExtender,
    frontier: usize,
    min_window: u32,
) -> Result<()> {
    let target = frontier + min_window as usize - 1;
    loop {
        let Some(highest) = chain.highest_index() else {
            return Err(DagError::Internal {
                invariant: "top_up requires the chain to already contain the root level",
            });
        };
        if highest >= target {
            return Ok(());
        }
        if !extender.ensure_level_after(chain, highest)? {
            return Ok(());
        }
    }
}

/// Streams `source` through `axis` and constructs the complete [`FrozenDag`].
///
/// # Errors
/// Returns any [`DagError`] raised by the source, by an invalid axis or
/// configuration, or by an internal invariant violation.
#[instrument(
    name = "hapdag.build",
    skip(source, config),
    fields(
        n_sequences = tracing::field::Empty,
        n_levels = axis.len(),
        scale = config.scale(),
        max_window = config.max_window(),
        min_window = config.min_window(),
    ),
    err
)]
pub fn build<S: WeightedSequenceSource>(
    axis: &MarkerAxis,
    mut source: S,
    config: &BuilderConfig,
) -> Result<FrozenDag> {
    config.validate()?;

    let n = source.num_sequences();
    tracing::Span::current().record("n_sequences", n);
    if n == 0 {
        return Err(DagError::InvalidConfig {
            reason: "source must yield at least one sequence".to_string(),
        });
    }
    let weights: Vec<f32> = (0..n).map(|s| source.weight(s)).collect();

    let root_symbols = source.advance()?;
    let mut chain = LevelChain::new();
    chain.push_back(MutableLevel::root(axis.arity(0), &weights, &root_symbols)?);

    let sim_params = SimilarityParams {
        scale: config.scale(),
        min_window: config.min_window(),
        max_window: config.max_window(),
        max_threshold_ratio: config.max_threshold_ratio(),
        growth_ratios: config.growth_ratios(),
    };

    let mut extender = SourceExtender {
        source: &mut source,
        axis,
        weights: &weights,
    };

    let mut frozen_levels = Vec::with_capacity(axis.len());
    let mut frontier = 1usize;
    while frontier < axis.len() {
        top_up(&mut chain, &mut extender, frontier, sim_params.min_window)?;
        if chain.get(frontier).is_none() {
            return Err(DagError::Internal {
                invariant: "frontier level failed to materialize despite axis coverage",
            });
        }

        merger::run(&mut chain, &mut extender, frontier, &sim_params)?;

        if let Some(prev) = chain.pop_front() {
            tracing::debug!(level = prev.level_index(), "freezing settled level");
            #[cfg(feature = "metrics")]
            metrics::counter!("hapdag_core_levels_frozen_total").increment(1);
            frozen_levels.push(freeze_level(&prev));
        }
        frontier += 1;
    }
    while let Some(level) = chain.pop_front() {
        frozen_levels.push(freeze_level(&level));
    }

    FrozenDag::new(frozen_levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DagErrorCode;
    use crate::test_utils::VecSequenceSource;

    #[test]
    fn rejects_non_positive_scale() {
        let config = BuilderConfig::new(0.0, 4);
        assert_eq!(config.validate().unwrap_err().code(), DagErrorCode::InvalidConfig);
    }

    #[test]
    fn rejects_zero_max_window() {
        let config = BuilderConfig::new(1.0, 0);
        assert_eq!(config.validate().unwrap_err().code(), DagErrorCode::InvalidConfig);
    }

    #[test]
    fn rejects_min_window_above_max_window() {
        let config = BuilderConfig::new(1.0, 4).with_min_window(5);
        assert_eq!(config.validate().unwrap_err().code(), DagErrorCode::InvalidConfig);
    }

    #[test]
    fn derives_min_window_from_max_window_by_default() {
        let config = BuilderConfig::new(1.0, 36);
        assert_eq!(config.min_window(), 4);
    }

    #[test]
    fn builds_a_two_level_dag_from_two_sequences() {
        let axis = MarkerAxis::new(vec![2, 2]).unwrap();
        let source = VecSequenceSource::new(
            vec![1.0, 1.0],
            vec![vec![0, 1], vec![0, 1]],
        );
        let config = BuilderConfig::new(1.0, 4);
        let dag = build(&axis, source, &config).unwrap();
        assert_eq!(dag.n_levels(), 2);
        assert_eq!(dag.level(0).n_parent_nodes(), 1);
    }

    #[test]
    fn rejects_an_empty_source() {
        let axis = MarkerAxis::new(vec![2]).unwrap();
        let source = VecSequenceSource::new(vec![], vec![]);
        let config = BuilderConfig::new(1.0, 4);
        let err = build(&axis, source, &config).unwrap_err();
        assert_eq!(err.code(), DagErrorCode::InvalidConfig);
    }
}
