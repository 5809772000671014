//! The similarity engine: recursive subtree-mass comparison between two
//! parent nodes at the merge frontier, with on-demand lookahead growth.

use crate::chain::LevelChain;
use crate::error::{DagError, Result};
use crate::score::ScorePair;

/// Default early-reject ratio: a pair whose final `maxDiff` exceeds
/// `max_threshold_ratio * threshold` is dropped entirely rather than scored.
pub(crate) const DEFAULT_MAX_THRESHOLD_RATIO: f32 = 1.4;

/// Default descent-gating gain/proportion ratios (spec §4.5's
/// `growth_ratios`).
pub(crate) const DEFAULT_GROWTH_RATIOS: (f32, f32) = (0.7, 0.5);

/// Tunable parameters governing the bounded-depth subtree walk.
///
/// See spec §4.5. `min_window` is always explored regardless of the
/// descent-gating predicate; `max_window` is a hard cap.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SimilarityParams {
    pub(crate) scale: f32,
    pub(crate) min_window: u32,
    pub(crate) max_window: u32,
    pub(crate) max_threshold_ratio: f32,
    pub(crate) growth_ratios: (f32, f32),
}

/// Callback narrowing the similarity recursion's access to the chain-growing
/// machinery to exactly "materialize one more level if input remains".
///
/// Kept distinct from the input source or the builder so the recursion can be
/// exercised against a prebuilt, already-complete chain in tests.
pub(crate) trait ChainExtender {
    /// Ensures a level exists immediately after `after_index`. Returns
    /// `Ok(true)` if such a level now exists (either already present or
    /// freshly grown), `Ok(false)` if no further input remains.
    fn ensure_level_after(&mut self, chain: &mut LevelChain, after_index: usize) -> Result<bool>;
}

/// Computes the similarity score of parent nodes `p` and `q` living at
/// `level_index`, growing `chain` forward through `extender` as needed.
///
/// Returns `None` when the pair's subtree divergence is large enough that no
/// [`ScorePair`] should be emitted at all (spec §4.5's early-reject rule).
///
/// # Errors
/// Propagates any [`DagError`] raised while growing the chain, and returns
/// [`DagError::Internal`] if `level_index` is not resident or either node
/// has non-positive weight.
pub(crate) fn score_pair(
    chain: &mut LevelChain,
    extender: &mut dyn ChainExtender,
    level_index: usize,
    params: &SimilarityParams,
    p: u32,
    q: u32,
) -> Result<Option<ScorePair>> {
    let (n_a, n_b) = {
        let level = chain.get(level_index).ok_or(DagError::Internal {
            invariant: "score_pair requires the frontier level to be resident",
        })?;
        (level.parent_weight(p), level.parent_weight(q))
    };
    if !(n_a > 0.0) || !(n_b > 0.0) {
        return Err(DagError::Internal {
            invariant: "score_pair requires both parent nodes to carry positive weight",
        });
    }
    let threshold = params.scale * (1.0 / n_a + 1.0 / n_b).sqrt();

    let max_diff = recurse(
        chain,
        extender,
        level_index,
        Some(p),
        Some(q),
        n_a,
        n_b,
        n_a,
        n_b,
        threshold,
        0,
        0.0,
        params,
    )?;

    if max_diff > params.max_threshold_ratio * threshold {
        tracing::trace!(p, q, max_diff, threshold, "pair rejected above max_threshold_ratio");
        return Ok(None);
    }
    let mergeable = max_diff < threshold;
    if max_diff == 0.0 && !mergeable {
        // Only possible when threshold <= 0 (e.g. scale = 0): the pair can
        // never become mergeable regardless of its score, so there is
        // nothing useful to emit, and a zero-valued non-mergeable ScorePair
        // would violate its own invariant.
        return Ok(None);
    }
    Ok(Some(ScorePair::new(p, q, max_diff, mergeable)?))
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    chain: &mut LevelChain,
    extender: &mut dyn ChainExtender,
    level_index: usize,
    p_a: Option<u32>,
    p_b: Option<u32>,
    cnt_a: f32,
    cnt_b: f32,
    n_a: f32,
    n_b: f32,
    threshold: f32,
    depth: u32,
    max_diff_acc: f32,
    params: &SimilarityParams,
) -> Result<f32> {
    let prop_a = cnt_a / n_a;
    let prop_b = cnt_b / n_b;
    let diff = (prop_a - prop_b).abs();
    if diff >= threshold {
        return Ok(diff);
    }
    if prop_a.max(prop_b) <= max_diff_acc {
        return Ok(max_diff_acc);
    }
    let mut max_diff = max_diff_acc.max(diff);

    if chain.get(level_index).is_none() {
        let (growth_max_diff_ratio, growth_min_prop_ratio) = params.growth_ratios;
        let should_grow = depth < params.max_window
            && ((max_diff > growth_max_diff_ratio * threshold
                && prop_a.min(prop_b) > growth_min_prop_ratio * threshold)
                || depth < params.min_window);
        if should_grow {
            let grew = extender.ensure_level_after(
                chain,
                level_index.checked_sub(1).ok_or(DagError::Internal {
                    invariant: "score_pair recursion underflowed level index",
                })?,
            )?;
            if !grew {
                return Ok(max_diff);
            }
        } else {
            if depth >= params.max_window {
                tracing::warn!(depth, "similarity recursion hit max_window without resolving");
            }
            return Ok(max_diff);
        }
    }

    let (Some(p_a), Some(p_b)) = (p_a, p_b) else {
        return Ok(max_diff);
    };
    let Some(level) = chain.get(level_index) else {
        return Ok(max_diff);
    };
    let arity = level.arity();

    for symbol in 0..arity {
        let Some(level) = chain.get(level_index) else {
            return Ok(max_diff);
        };
        let (c_a, w_a) = level.out_edge_child_weight(p_a, symbol);
        let (c_b, w_b) = level.out_edge_child_weight(p_b, symbol);
        let d = recurse(
            chain,
            extender,
            level_index + 1,
            c_a,
            c_b,
            w_a,
            w_b,
            n_a,
            n_b,
            threshold,
            depth + 1,
            max_diff,
            params,
        )?;
        if d > max_diff {
            if d >= threshold {
                return Ok(d);
            }
            max_diff = d;
        }
    }
    Ok(max_diff)
}
