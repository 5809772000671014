//! The frozen DAG: an immutable sequence of [`FrozenLevel`]s plus
//! cross-level aggregates (spec §4.8, component C8).

use crate::error::{DagError, Result};
use crate::frozen::FrozenLevel;

/// A compact per-level diagnostic snapshot returned by
/// [`FrozenDag::level_summary`].
#[derive(Clone, Copy, Debug)]
pub struct LevelSummary {
    /// The level's position in the axis.
    pub level: usize,
    /// Number of parent nodes at this level.
    pub n_parent_nodes: usize,
    /// Number of child nodes at this level.
    pub n_child_nodes: usize,
    /// Number of edges at this level.
    pub n_edges: usize,
    /// Sum of every parent node's weight at this level.
    pub level_weight: f32,
}

/// An immutable, validated sequence of [`FrozenLevel`]s with precomputed
/// aggregates (spec §4.8).
#[derive(Debug)]
pub struct FrozenDag {
    levels: Vec<FrozenLevel>,
    distance: Vec<f32>,
    n_nodes: usize,
    n_edges: usize,
    max_nodes: usize,
    max_edges: usize,
}

impl FrozenDag {
    /// Validates and wraps a sequence of frozen levels.
    ///
    /// # Errors
    /// Returns [`DagError::ShapeConsistency`] if `levels` is empty, if the
    /// root level does not have exactly one parent node, or if any
    /// level's child-node count does not match its successor's
    /// parent-node count.
    pub(crate) fn new(levels: Vec<FrozenLevel>) -> Result<Self> {
        let Some(root) = levels.first() else {
            return Err(DagError::ShapeConsistency {
                reason: "a FrozenDag must contain at least one level".to_string(),
            });
        };
        if root.n_parent_nodes() != 1 {
            return Err(DagError::ShapeConsistency {
                reason: format!(
                    "level 0 must have exactly one parent node, found {}",
                    root.n_parent_nodes()
                ),
            });
        }
        for window in levels.windows(2) {
            let [prev, cur] = window else { unreachable!() };
            if prev.n_child_nodes() != cur.n_parent_nodes() {
                return Err(DagError::ShapeConsistency {
                    reason: format!(
                        "level child-node count {} does not match successor parent-node count {}",
                        prev.n_child_nodes(),
                        cur.n_parent_nodes()
                    ),
                });
            }
        }

        let distance = compute_distance(&levels);
        let n_nodes = 1 + levels.iter().map(FrozenLevel::n_child_nodes).sum::<usize>();
        let n_edges = levels.iter().map(FrozenLevel::n_edges).sum();
        let max_nodes = levels.iter().map(FrozenLevel::n_child_nodes).max().unwrap_or(0);
        let max_edges = levels.iter().map(FrozenLevel::n_edges).max().unwrap_or(0);

        Ok(Self {
            levels,
            distance,
            n_nodes,
            n_edges,
            max_nodes,
            max_edges,
        })
    }

    /// Returns the number of levels.
    #[must_use]
    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    /// Returns level `ℓ`.
    #[must_use]
    pub fn level(&self, l: usize) -> &FrozenLevel {
        &self.levels[l]
    }

    /// Returns the total number of nodes across all levels, including the
    /// root.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Returns the total number of edges across all levels.
    #[must_use]
    pub fn n_edges(&self) -> usize {
        self.n_edges
    }

    /// Returns the largest per-level child-node count.
    #[must_use]
    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Returns the largest per-level edge count.
    #[must_use]
    pub fn max_edges(&self) -> usize {
        self.max_edges
    }

    /// Returns the cumulative, per-level-clamped distance array (spec §3).
    #[must_use]
    pub fn distance(&self) -> &[f32] {
        &self.distance
    }

    /// Returns whether `parent_edge` at level `l` terminates at the same
    /// node that `child_edge` at level `l + 1` originates from.
    #[must_use]
    pub fn is_child_of(&self, l: usize, parent_edge: usize, child_edge: usize) -> bool {
        self.levels[l].child_node(parent_edge) == self.levels[l + 1].parent_node(child_edge)
    }

    /// Returns the mean number of outgoing edges per parent-node instance,
    /// summed across every level.
    #[must_use]
    pub fn mean_branching_factor(&self) -> f32 {
        let total_parents: usize = self.levels.iter().map(FrozenLevel::n_parent_nodes).sum();
        if total_parents == 0 {
            return 0.0;
        }
        self.n_edges as f32 / total_parents as f32
    }

    /// Returns a per-level diagnostic snapshot, useful for logging and
    /// tests without walking the full CSR structure.
    #[must_use]
    pub fn level_summary(&self) -> Vec<LevelSummary> {
        self.levels
            .iter()
            .enumerate()
            .map(|(level, l)| LevelSummary {
                level,
                n_parent_nodes: l.n_parent_nodes(),
                n_child_nodes: l.n_child_nodes(),
                n_edges: l.n_edges(),
                level_weight: l.level_weight(),
            })
            .collect()
    }
}

fn compute_distance(levels: &[FrozenLevel]) -> Vec<f32> {
    let mut distance = Vec::with_capacity(levels.len());
    let mut acc = 0.0_f32;
    for level in levels {
        let mass: f32 = (0..level.n_edges())
            .map(|e| level.edge_prob(e) * level.cond_edge_prob(e))
            .sum();
        let term = (-mass.log10()).max(0.0);
        acc += term;
        distance.push(acc);
    }
    distance
}
