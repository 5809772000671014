//! The mutable per-level graph fragment built while streaming sequences and
//! merging parent nodes at the frontier.

use std::collections::HashMap;

use crate::error::{DagError, Result};
use crate::source::LevelSymbols;

/// Sentinel marking "no edge"/"no node" in the linked-list indices below.
const NONE: u32 = u32::MAX;

#[derive(Clone, Copy, Debug)]
struct EdgeSlot {
    parent: u32,
    child: u32,
    symbol: u32,
    weight: f32,
    active: bool,
}

/// A mutable, in-progress fragment of the level graph at one marker position.
///
/// See spec §4.3 (`MutableLevel`, component C3). Deleted edge slots are kept
/// (marked inactive) rather than compacted until [`freeze`](crate::frozen::freeze_level)
/// runs over the settled level.
#[derive(Debug)]
pub(crate) struct MutableLevel {
    level_index: usize,
    arity: u32,
    edges: Vec<EdgeSlot>,
    active_edge_count: usize,
    out_edge_by_symbol: HashMap<(u32, u32), u32>,
    parent_out_degree: HashMap<u32, u32>,
    parent_weight: HashMap<u32, f32>,
    first_in_edge: HashMap<u32, u32>,
    next_in_edge: Vec<u32>,
    first_seq: HashMap<u32, usize>,
    next_seq: Vec<usize>,
    next_child_id: u32,
}

impl MutableLevel {
    /// Builds the root level (`L = 0`), whose unique parent is node `0`.
    ///
    /// # Errors
    /// Returns [`DagError::Source`] wrapping a symbol-range or weight error
    /// if a sequence's symbol or weight is invalid.
    pub(crate) fn root(
        arity: u32,
        weights: &[f32],
        symbols: &LevelSymbols,
    ) -> Result<Self> {
        let n_sequences = weights.len();
        let mut level = Self {
            level_index: 0,
            arity,
            edges: (0..arity)
                .map(|symbol| EdgeSlot {
                    parent: 0,
                    child: symbol,
                    symbol,
                    weight: 0.0,
                    active: false,
                })
                .collect(),
            active_edge_count: 0,
            out_edge_by_symbol: HashMap::new(),
            parent_out_degree: HashMap::new(),
            parent_weight: HashMap::new(),
            first_in_edge: HashMap::new(),
            next_in_edge: vec![NONE; arity as usize],
            first_seq: HashMap::new(),
            next_seq: vec![usize::MAX; n_sequences],
            next_child_id: arity,
        };

        for (seq, &symbol) in symbols.iter().enumerate() {
            level.validate_symbol(seq, symbol)?;
            let weight = weights[seq];
            level.validate_weight(seq, weight)?;

            let slot = &mut level.edges[symbol as usize];
            if slot.active {
                slot.weight += weight;
            } else {
                slot.active = true;
                slot.weight = weight;
                level.active_edge_count += 1;
                level.out_edge_by_symbol.insert((0, symbol), symbol);
                *level.parent_out_degree.entry(0).or_insert(0) += 1;
                level.first_in_edge.insert(symbol, symbol);
            }
            *level.parent_weight.entry(0).or_insert(0.0) += weight;
            level.push_seq(symbol, seq);
        }

        Ok(level)
    }

    /// Builds level `level_index > 0` by partitioning sequences according to
    /// `prev`'s per-child sequence-membership lists.
    ///
    /// # Errors
    /// Returns [`DagError::Source`] wrapping a symbol-range or weight error
    /// if a sequence's symbol or weight is invalid.
    pub(crate) fn from_parent(
        level_index: usize,
        arity: u32,
        weights: &[f32],
        symbols: &LevelSymbols,
        prev: &MutableLevel,
    ) -> Result<Self> {
        let n_sequences = weights.len();
        let mut level = Self {
            level_index,
            arity,
            edges: Vec::with_capacity(n_sequences),
            active_edge_count: 0,
            out_edge_by_symbol: HashMap::new(),
            parent_out_degree: HashMap::new(),
            parent_weight: HashMap::new(),
            first_in_edge: HashMap::new(),
            next_in_edge: Vec::with_capacity(n_sequences),
            first_seq: HashMap::new(),
            next_seq: vec![usize::MAX; n_sequences],
            next_child_id: 0,
        };

        let mut parents: Vec<u32> = prev.first_seq.keys().copied().collect();
        parents.sort_unstable();

        for parent in parents {
            let mut cursor = prev.first_seq.get(&parent).copied();
            while let Some(seq) = cursor {
                let symbol = symbols[seq];
                level.validate_symbol(seq, symbol)?;
                let weight = weights[seq];
                level.validate_weight(seq, weight)?;

                let child = level.add_or_accumulate(parent, symbol, weight);
                level.push_seq(child, seq);

                cursor = prev.next_seq.get(seq).copied().filter(|&n| n != usize::MAX);
            }
        }

        // Interim arrays were grown on demand; shrink once population settles
        // if the active edge count ended up well below the worst case of
        // one edge per sequence.
        if level.active_edge_count < (n_sequences * 3) / 4 {
            level.edges.shrink_to_fit();
            level.next_in_edge.shrink_to_fit();
        }

        Ok(level)
    }

    fn add_or_accumulate(&mut self, parent: u32, symbol: u32, weight: f32) -> u32 {
        *self.parent_weight.entry(parent).or_insert(0.0) += weight;
        match self.out_edge_by_symbol.get(&(parent, symbol)).copied() {
            Some(idx) => {
                self.edges[idx as usize].weight += weight;
                self.edges[idx as usize].child
            }
            None => {
                let child = self.next_child_id;
                self.next_child_id += 1;
                let idx = self.edges.len() as u32;
                self.edges.push(EdgeSlot {
                    parent,
                    child,
                    symbol,
                    weight,
                    active: true,
                });
                self.next_in_edge.push(NONE);
                self.out_edge_by_symbol.insert((parent, symbol), idx);
                *self.parent_out_degree.entry(parent).or_insert(0) += 1;
                self.first_in_edge.insert(child, idx);
                self.active_edge_count += 1;
                child
            }
        }
    }

    fn push_seq(&mut self, child: u32, seq: usize) {
        let head = self.first_seq.get(&child).copied().unwrap_or(usize::MAX);
        self.next_seq[seq] = head;
        self.first_seq.insert(child, seq);
    }

    fn validate_symbol(&self, seq: usize, symbol: u32) -> Result<()> {
        if symbol >= self.arity {
            return Err(DagError::Source {
                error: crate::error::SourceError::SymbolOutOfRange {
                    seq,
                    level: self.level_index,
                    symbol,
                    arity: self.arity,
                },
            });
        }
        Ok(())
    }

    fn validate_weight(&self, seq: usize, weight: f32) -> Result<()> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(DagError::Source {
                error: crate::error::SourceError::InvalidWeight { seq, weight },
            });
        }
        Ok(())
    }

    /// Releases the per-child sequence-membership lists once the next level
    /// has consumed them.
    pub(crate) fn release_seq_lists(&mut self) {
        self.first_seq = HashMap::new();
        self.next_seq = Vec::new();
    }

    pub(crate) fn level_index(&self) -> usize {
        self.level_index
    }

    pub(crate) fn arity(&self) -> u32 {
        self.arity
    }

    /// Returns the sorted, unique set of active parent node ids.
    pub(crate) fn parent_node_array(&self) -> Vec<u32> {
        let mut parents: Vec<u32> = self.parent_weight.keys().copied().collect();
        parents.sort_unstable();
        parents
    }

    pub(crate) fn parent_weight(&self, parent: u32) -> f32 {
        self.parent_weight.get(&parent).copied().unwrap_or(0.0)
    }

    pub(crate) fn parent_out_degree(&self, parent: u32) -> u32 {
        self.parent_out_degree.get(&parent).copied().unwrap_or(0)
    }

    pub(crate) fn out_edge(&self, parent: u32, symbol: u32) -> Option<u32> {
        self.out_edge_by_symbol.get(&(parent, symbol)).copied()
    }

    pub(crate) fn out_edge_child_weight(&self, parent: u32, symbol: u32) -> (Option<u32>, f32) {
        match self.out_edge(parent, symbol) {
            Some(idx) => (Some(self.edges[idx as usize].child), self.edges[idx as usize].weight),
            None => (None, 0.0),
        }
    }

    pub(crate) fn first_in_edge(&self, child: u32) -> Option<u32> {
        self.first_in_edge.get(&child).copied()
    }

    pub(crate) fn edge_parent(&self, edge: u32) -> u32 {
        self.edges[edge as usize].parent
    }

    /// Iterates over active edges in source (allocation) order, yielding
    /// `(parent, child, symbol, weight)`.
    pub(crate) fn active_edges(&self) -> impl Iterator<Item = (u32, u32, u32, f32)> + '_ {
        self.edges.iter().filter(|e| e.active).map(|e| (e.parent, e.child, e.symbol, e.weight))
    }

    /// Merges child node `removed` into `retained` within this level's
    /// in-edge index: every edge whose `child` field equals `removed` is
    /// redirected to `retained`.
    pub(crate) fn merge_child_nodes(&mut self, retained: u32, removed: u32) {
        if retained == removed {
            return;
        }
        let Some(removed_head) = self.first_in_edge.remove(&removed) else {
            return;
        };
        let mut tail = removed_head;
        loop {
            self.edges[tail as usize].child = retained;
            let next = self.next_in_edge[tail as usize];
            if next == NONE {
                break;
            }
            tail = next;
        }
        let retained_head = self.first_in_edge.get(&retained).copied().unwrap_or(NONE);
        self.next_in_edge[tail as usize] = retained_head;
        self.first_in_edge.insert(retained, removed_head);
    }

    /// Merges the outgoing edges of parent node `removed` into `retained` at
    /// this level, symbol by symbol. Returns the `(retained_child,
    /// removed_child)` pairs whose subtrees must be recursively merged at
    /// the next level.
    pub(crate) fn merge_own_symbols(&mut self, retained: u32, removed: u32) -> Vec<(u32, u32)> {
        let mut scheduled = Vec::new();
        for symbol in 0..self.arity {
            let Some(d_idx) = self.out_edge_by_symbol.remove(&(removed, symbol)) else {
                continue;
            };
            match self.out_edge_by_symbol.get(&(retained, symbol)).copied() {
                None => {
                    self.out_edge_by_symbol.insert((retained, symbol), d_idx);
                    self.edges[d_idx as usize].parent = retained;
                    *self.parent_out_degree.entry(retained).or_insert(0) += 1;
                    if let Some(deg) = self.parent_out_degree.get_mut(&removed) {
                        *deg = deg.saturating_sub(1);
                    }
                    let w = self.edges[d_idx as usize].weight;
                    *self.parent_weight.entry(retained).or_insert(0.0) += w;
                    if let Some(pw) = self.parent_weight.get_mut(&removed) {
                        *pw -= w;
                    }
                }
                Some(r_idx) => {
                    let d_weight = self.edges[d_idx as usize].weight;
                    self.edges[r_idx as usize].weight += d_weight;
                    self.edges[d_idx as usize].active = false;
                    self.active_edge_count -= 1;
                    if let Some(deg) = self.parent_out_degree.get_mut(&removed) {
                        *deg = deg.saturating_sub(1);
                    }
                    if let Some(pw) = self.parent_weight.get_mut(&removed) {
                        *pw -= d_weight;
                    }
                    *self.parent_weight.entry(retained).or_insert(0.0) += d_weight;
                    let r_child = self.edges[r_idx as usize].child;
                    let d_child = self.edges[d_idx as usize].child;
                    scheduled.push((r_child, d_child));
                }
            }
        }
        self.parent_weight.remove(&removed);
        self.parent_out_degree.remove(&removed);
        scheduled
    }
}
