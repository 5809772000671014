//! Property-based tests for the quantified invariants in the frozen DAG's
//! output contract.

mod common;

use common::{columns_from_rows, VecSequenceSource};
use hapdag_core::{BuilderConfig, MarkerAxis};
use test_strategy::proptest;

#[proptest]
fn frozen_dag_satisfies_quantified_invariants(
    #[strategy(1usize..6)] n_sequences: usize,
    #[strategy(1usize..4)] n_levels: usize,
    #[strategy(proptest::collection::vec(
        proptest::collection::vec(0u32..2, #n_levels),
        #n_sequences,
    ))]
    rows: Vec<Vec<u32>>,
    #[strategy(proptest::collection::vec(1.0f32..5.0, #n_sequences))] weights: Vec<f32>,
) {
    let axis = MarkerAxis::new(vec![2; n_levels]).unwrap();
    let source = VecSequenceSource::new(weights.clone(), columns_from_rows(&rows));
    let config = BuilderConfig::new(1.0, 6);
    let dag = hapdag_core::build(&axis, source, &config).unwrap();

    for l in 0..dag.n_levels() {
        let level = dag.level(l);

        // At most one outgoing edge with a given symbol per parent.
        for p in 0..level.n_parent_nodes() {
            let mut seen = [false; 2];
            for i in 0..level.n_out_edges(p) {
                let e = level.out_edge(p, i) as usize;
                let symbol = level.symbol(e) as usize;
                assert!(!seen[symbol], "duplicate symbol under parent {p}");
                seen[symbol] = true;
            }
        }

        // Parent weight equals the sum of its outgoing edge weights.
        for p in 0..level.n_parent_nodes() {
            let sum: f32 = (0..level.n_out_edges(p))
                .map(|i| level.edge_weight(level.out_edge(p, i) as usize))
                .sum();
            assert!((sum - level.parent_weight(p)).abs() < 1e-3);
        }

        // condEdgeProb identity.
        for e in 0..level.n_edges() {
            let expected = level.edge_weight(e) / level.parent_weight(level.parent_node(e) as usize);
            assert!((level.cond_edge_prob(e) - expected).abs() < 1e-4);
        }

        // edgeProb sums to 1 across the level.
        let total_edge_prob: f32 = (0..level.n_edges()).map(|e| level.edge_prob(e)).sum();
        assert!((total_edge_prob - 1.0).abs() < 1e-3);

        if l + 1 < dag.n_levels() {
            assert_eq!(level.n_child_nodes(), dag.level(l + 1).n_parent_nodes());
        }
    }

    // Total input weight is conserved at the root.
    let total_weight: f32 = weights.iter().sum();
    assert!((dag.level(0).parent_weight(0) - total_weight).abs() < 1e-3);

    // distance[] is monotone non-decreasing.
    for window in dag.distance().windows(2) {
        assert!(window[1] + 1e-4 >= window[0]);
    }
}
