//! The level merger: pairwise scoring, greedy merge acceptance, and
//! incremental rescoring at one frontier level.

use std::collections::HashMap;

use crate::chain::LevelChain;
use crate::error::{DagError, Result};
use crate::score::ScorePair;
use crate::similarity::{score_pair, ChainExtender, SimilarityParams};

/// Runs the greedy merge loop on `level_index` to completion.
///
/// Collects active parent nodes, scores every pair, then repeatedly accepts
/// the lowest-scoring mergeable pair until none remain. Sibling status does
/// not gate which pairs get scored — step 2(b) of the greedy loop still
/// needs to merge two siblinged nodes when their subtrees match closely
/// enough — it only decides which endpoint is retained once a pair is
/// chosen.
///
/// # Errors
/// Propagates any [`DagError`] raised while scoring pairs or applying
/// structural merges.
pub(crate) fn run(
    chain: &mut LevelChain,
    extender: &mut dyn ChainExtender,
    level_index: usize,
    params: &SimilarityParams,
) -> Result<()> {
    let parents = chain
        .get(level_index)
        .ok_or(DagError::Internal {
            invariant: "merger target level is not resident in the chain",
        })?
        .parent_node_array();

    let mut has_sibling: HashMap<u32, bool> = HashMap::with_capacity(parents.len());
    for &p in &parents {
        has_sibling.insert(p, chain.has_sibling(level_index, p)?);
    }

    let parents_before = parents.len();
    let mut pairs: Vec<ScorePair> = Vec::new();
    for i in 0..parents.len() {
        for j in (i + 1)..parents.len() {
            let (p, q) = (parents[i], parents[j]);
            if let Some(pair) = score_pair(chain, extender, level_index, params, p, q)? {
                pairs.push(pair);
            }
        }
    }
    #[cfg(feature = "metrics")]
    metrics::counter!("hapdag_pairs_scored").increment(pairs.len() as u64);

    let mut merges_applied: u32 = 0;

    loop {
        let Some(min_pair) = pairs.iter().filter(|pr| pr.mergeable()).copied().min() else {
            break;
        };
        let (p, q) = (min_pair.a(), min_pair.b());
        let p_sib = has_sibling[&p];
        let q_sib = has_sibling[&q];

        let (retained, removed) = if p_sib != q_sib {
            if p_sib {
                (p, q)
            } else {
                (q, p)
            }
        } else {
            let level = chain.get(level_index).ok_or(DagError::Internal {
                invariant: "merger target level vanished mid-run",
            })?;
            let w_p = level.parent_weight(p);
            let w_q = level.parent_weight(q);
            if w_p < w_q {
                (q, p)
            } else {
                (p, q)
            }
        };

        chain.merge_parent_nodes(level_index, retained, removed)?;
        merges_applied += 1;
        tracing::trace!(level = level_index, retained, removed, score = min_pair.value(), "merge accepted");
        #[cfg(feature = "metrics")]
        metrics::counter!("hapdag_merges_applied").increment(1);

        let mut updated = Vec::with_capacity(pairs.len());
        for pair in pairs {
            if pair.involves(removed) {
                continue;
            }
            if pair.involves(retained) {
                let other = if pair.a() == retained {
                    pair.b()
                } else {
                    pair.a()
                };
                let (lo, hi) = if retained < other {
                    (retained, other)
                } else {
                    (other, retained)
                };
                if let Some(rescored) = score_pair(chain, extender, level_index, params, lo, hi)? {
                    updated.push(rescored);
                }
            } else {
                updated.push(pair);
            }
        }
        pairs = updated;
    }

    let parents_after = chain
        .get(level_index)
        .ok_or(DagError::Internal {
            invariant: "merger target level vanished before completion",
        })?
        .parent_node_array()
        .len();
    tracing::debug!(
        level = level_index,
        parents_before,
        parents_after,
        merges_applied,
        "level merge pass complete"
    );
    #[cfg(feature = "metrics")]
    metrics::histogram!("hapdag_level_parent_count").record(parents_after as f64);

    Ok(())
}
