//! The frozen, immutable level representation produced by compacting a
//! settled [`MutableLevel`].

use std::collections::HashMap;

use crate::level::MutableLevel;

const NARROW_INDEX_LIMIT: usize = 65_535;

/// Index-width variant selected transparently at freeze time (spec §4.7).
#[derive(Clone, Debug)]
enum IndexArray {
    Narrow(Vec<u16>),
    Wide(Vec<u32>),
}

impl IndexArray {
    fn build(values: Vec<u32>, narrow: bool) -> Self {
        if narrow {
            Self::Narrow(values.iter().map(|&v| v as u16).collect())
        } else {
            Self::Wide(values)
        }
    }

    fn get(&self, index: usize) -> u32 {
        match self {
            Self::Narrow(v) => u32::from(v[index]),
            Self::Wide(v) => v[index],
        }
    }

    fn is_narrow(&self) -> bool {
        matches!(self, Self::Narrow(_))
    }
}

/// Whether a [`FrozenLevel`]'s index-valued arrays are stored 16- or 32-bit
/// wide. A pure memory-layout detail; every accessor returns plain `u32`
/// regardless of variant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IndexWidth {
    /// Indices fit in 16 bits (`edgeCount <= 65535 && maxNodeId <= 65535`).
    Narrow,
    /// Indices are stored as full 32-bit values.
    Wide,
}

/// An immutable, compact encoding of one DAG level with O(1) structural
/// queries (spec §4.7, component C7).
#[derive(Clone, Debug)]
pub struct FrozenLevel {
    n_parent_nodes: usize,
    n_child_nodes: usize,
    parent_of: IndexArray,
    child_of: IndexArray,
    sym_of: Vec<u32>,
    edge_weight: Vec<f32>,
    node_weight: Vec<f32>,
    level_weight: f32,
    out_start: IndexArray,
    out_edges: IndexArray,
    in_start: IndexArray,
    in_edges: IndexArray,
}

impl FrozenLevel {
    /// Returns the index-width variant this level was stored with.
    #[must_use]
    pub fn index_width(&self) -> IndexWidth {
        if self.parent_of.is_narrow() {
            IndexWidth::Narrow
        } else {
            IndexWidth::Wide
        }
    }

    /// Returns the number of edges at this level.
    #[must_use]
    pub fn n_edges(&self) -> usize {
        self.sym_of.len()
    }

    /// Returns the number of parent nodes at this level.
    #[must_use]
    pub fn n_parent_nodes(&self) -> usize {
        self.n_parent_nodes
    }

    /// Returns the number of child nodes at this level.
    #[must_use]
    pub fn n_child_nodes(&self) -> usize {
        self.n_child_nodes
    }

    /// Returns the parent node id of edge `e`.
    #[must_use]
    pub fn parent_node(&self, e: usize) -> u32 {
        self.parent_of.get(e)
    }

    /// Returns the child node id of edge `e`.
    #[must_use]
    pub fn child_node(&self, e: usize) -> u32 {
        self.child_of.get(e)
    }

    /// Returns the allele symbol labeling edge `e`.
    #[must_use]
    pub fn symbol(&self, e: usize) -> u32 {
        self.sym_of[e]
    }

    /// Returns the edge weight of edge `e`.
    #[must_use]
    pub fn edge_weight(&self, e: usize) -> f32 {
        self.edge_weight[e]
    }

    /// Returns the total weight flowing through parent node `p`.
    #[must_use]
    pub fn parent_weight(&self, p: usize) -> f32 {
        self.node_weight[p]
    }

    /// Returns `edgeWeight(e) / parentWeight(parentNode(e))`.
    #[must_use]
    pub fn cond_edge_prob(&self, e: usize) -> f32 {
        self.edge_weight[e] / self.node_weight[self.parent_of.get(e) as usize]
    }

    /// Returns `edgeWeight(e) / levelWeight`.
    #[must_use]
    pub fn edge_prob(&self, e: usize) -> f32 {
        self.edge_weight[e] / self.level_weight
    }

    /// Returns `parentWeight(p) / levelWeight`.
    #[must_use]
    pub fn parent_prob(&self, p: usize) -> f32 {
        self.node_weight[p] / self.level_weight
    }

    /// Returns the sum of every parent's weight at this level.
    #[must_use]
    pub fn level_weight(&self) -> f32 {
        self.level_weight
    }

    /// Returns the number of outgoing edges of parent node `p`.
    #[must_use]
    pub fn n_out_edges(&self, p: usize) -> usize {
        (self.out_start.get(p + 1) - self.out_start.get(p)) as usize
    }

    /// Returns the `i`-th (in CSR storage order) outgoing edge of parent
    /// node `p`.
    #[must_use]
    pub fn out_edge(&self, p: usize, i: usize) -> u32 {
        self.out_edges.get(self.out_start.get(p) as usize + i)
    }

    /// Returns the outgoing edge of `p` labeled `symbol`, or `None` if
    /// absent. A linear scan of `p`'s (typically small) out-edge set.
    #[must_use]
    pub fn out_edge_by_symbol(&self, p: usize, symbol: u32) -> Option<u32> {
        (0..self.n_out_edges(p))
            .map(|i| self.out_edge(p, i))
            .find(|&e| self.sym_of[e as usize] == symbol)
    }

    /// Returns the number of incoming edges of child node `c`.
    #[must_use]
    pub fn n_in_edges(&self, c: usize) -> usize {
        (self.in_start.get(c + 1) - self.in_start.get(c)) as usize
    }

    /// Returns the `i`-th (in CSR storage order) incoming edge of child
    /// node `c`.
    #[must_use]
    pub fn in_edge(&self, c: usize, i: usize) -> u32 {
        self.in_edges.get(self.in_start.get(c) as usize + i)
    }
}

/// Compacts a settled [`MutableLevel`] into a [`FrozenLevel`].
///
/// Surviving edges are rank-remapped to dense parent and child ids in order
/// of first appearance, preserving source order within each bucket (spec
/// §4.7).
pub(crate) fn freeze_level(level: &MutableLevel) -> FrozenLevel {
    let mut parent_rank: HashMap<u32, u32> = HashMap::new();
    let mut child_rank: HashMap<u32, u32> = HashMap::new();
    let mut parent_of = Vec::new();
    let mut child_of = Vec::new();
    let mut sym_of = Vec::new();
    let mut edge_weight = Vec::new();

    for (parent, child, symbol, weight) in level.active_edges() {
        let next_parent_rank = parent_rank.len() as u32;
        let p = *parent_rank.entry(parent).or_insert(next_parent_rank);
        let next_child_rank = child_rank.len() as u32;
        let c = *child_rank.entry(child).or_insert(next_child_rank);
        parent_of.push(p);
        child_of.push(c);
        sym_of.push(symbol);
        edge_weight.push(weight);
    }

    let n_edges = sym_of.len();
    let n_parent_nodes = parent_rank.len();
    let n_child_nodes = child_rank.len();

    let mut node_weight = vec![0.0_f32; n_parent_nodes];
    for (i, &p) in parent_of.iter().enumerate() {
        node_weight[p as usize] += edge_weight[i];
    }
    let level_weight = node_weight.iter().sum();

    let out_edges_order = build_csr(&parent_of, n_parent_nodes);
    let in_edges_order = build_csr(&child_of, n_child_nodes);

    let max_node_id = n_parent_nodes.max(n_child_nodes).saturating_sub(1);
    let narrow = n_edges <= NARROW_INDEX_LIMIT && max_node_id <= NARROW_INDEX_LIMIT;

    FrozenLevel {
        n_parent_nodes,
        n_child_nodes,
        parent_of: IndexArray::build(parent_of, narrow),
        child_of: IndexArray::build(child_of, narrow),
        sym_of,
        edge_weight,
        node_weight,
        level_weight,
        out_start: IndexArray::build(out_edges_order.starts, narrow),
        out_edges: IndexArray::build(out_edges_order.edges, narrow),
        in_start: IndexArray::build(in_edges_order.starts, narrow),
        in_edges: IndexArray::build(in_edges_order.edges, narrow),
    }
}

struct Csr {
    starts: Vec<u32>,
    edges: Vec<u32>,
}

/// Stable counting-sort building a CSR index over `keys` (either `parentOf`
/// or `childOf`), preserving each bucket's edges in source order.
fn build_csr(keys: &[u32], n_buckets: usize) -> Csr {
    let mut counts = vec![0_u32; n_buckets + 1];
    for &k in keys {
        counts[k as usize + 1] += 1;
    }
    for i in 0..n_buckets {
        counts[i + 1] += counts[i];
    }
    let starts = counts.clone();
    let mut cursor = counts;
    let mut edges = vec![0_u32; keys.len()];
    for (e, &k) in keys.iter().enumerate() {
        edges[cursor[k as usize] as usize] = e as u32;
        cursor[k as usize] += 1;
    }
    Csr { starts, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::MutableLevel;

    #[test]
    fn small_levels_freeze_to_narrow_indices() {
        let weights = vec![1.0, 1.0];
        let symbols = vec![0, 1];
        let level = MutableLevel::root(2, &weights, &symbols).unwrap();
        let frozen = freeze_level(&level);
        assert_eq!(frozen.index_width(), IndexWidth::Narrow);
        assert_eq!(frozen.n_edges(), 2);
    }

    #[test]
    fn levels_exceeding_the_narrow_limit_freeze_to_wide_indices() {
        let n = NARROW_INDEX_LIMIT + 2;
        let weights = vec![1.0; n];
        let symbols: Vec<u32> = (0..n as u32).collect();
        let level = MutableLevel::root(n as u32, &weights, &symbols).unwrap();
        let frozen = freeze_level(&level);
        assert_eq!(frozen.index_width(), IndexWidth::Wide);
        assert_eq!(frozen.n_edges(), n);
        assert_eq!(frozen.n_parent_nodes(), 1);
        assert_eq!(frozen.n_child_nodes(), n);
    }
}
