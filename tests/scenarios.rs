//! Integration tests replaying the concrete construction scenarios.

mod common;

use common::{columns_from_rows, VecSequenceSource};
use hapdag_core::{BuilderConfig, MarkerAxis};

#[test]
fn trivial_single_sequence_chain() {
    let axis = MarkerAxis::new(vec![2, 2, 2]).unwrap();
    let source = VecSequenceSource::new(vec![1.0], columns_from_rows(&[vec![0, 1, 0]]));
    let config = BuilderConfig::new(1.0, 4);
    let dag = hapdag_core::build(&axis, source, &config).unwrap();

    assert_eq!(dag.n_levels(), 3);
    assert_eq!(dag.n_edges(), 3);
    for l in 0..3 {
        let level = dag.level(l);
        assert_eq!(level.n_parent_nodes(), 1);
        assert_eq!(level.n_child_nodes(), 1);
        assert_eq!(level.n_edges(), 1);
        assert!((level.cond_edge_prob(0) - 1.0).abs() < 1e-6);
    }
}

#[test]
fn no_merge_split_with_zero_scale() {
    let axis = MarkerAxis::new(vec![2, 2]).unwrap();
    let rows = vec![vec![0, 0], vec![1, 1]];
    let source = VecSequenceSource::new(vec![1.0, 1.0], columns_from_rows(&rows));
    let config = BuilderConfig::new(0.0, 4);
    let dag = hapdag_core::build(&axis, source, &config).unwrap();

    assert_eq!(dag.level(0).n_edges(), 2);
    assert_eq!(dag.level(1).n_edges(), 2);
    assert_eq!(dag.n_nodes(), 5);
    assert_eq!(dag.n_edges(), 4);
}

#[test]
fn forced_merge_collapses_to_single_node_when_subtrees_match() {
    let axis = MarkerAxis::new(vec![2, 2, 2]).unwrap();
    let rows = vec![
        vec![0, 0, 0],
        vec![0, 1, 0],
        vec![1, 0, 0],
        vec![1, 1, 0],
    ];
    let source = VecSequenceSource::new(vec![1.0, 1.0, 1.0, 1.0], columns_from_rows(&rows));
    let config = BuilderConfig::new(100.0, 4);
    let dag = hapdag_core::build(&axis, source, &config).unwrap();

    assert_eq!(dag.level(2).n_parent_nodes(), 1);
}

#[test]
fn total_input_weight_is_preserved_at_the_root() {
    let axis = MarkerAxis::new(vec![2, 3]).unwrap();
    let rows = vec![vec![0, 1], vec![1, 2], vec![0, 0]];
    let source = VecSequenceSource::new(vec![2.0, 3.5, 0.5], columns_from_rows(&rows));
    let config = BuilderConfig::new(1.0, 4);
    let dag = hapdag_core::build(&axis, source, &config).unwrap();

    let total: f32 = (0..dag.level(0).n_edges())
        .map(|e| dag.level(0).edge_weight(e))
        .sum();
    assert!((total - 6.0).abs() < 1e-5);
    assert!((dag.level(0).parent_weight(0) - 6.0).abs() < 1e-5);
}

#[test]
fn sequence_order_does_not_affect_the_frozen_shape() {
    let axis = MarkerAxis::new(vec![2, 2, 2]).unwrap();
    let rows = vec![
        vec![0, 0, 0],
        vec![0, 1, 0],
        vec![1, 0, 0],
        vec![1, 1, 0],
    ];
    let mut permuted = rows.clone();
    permuted.reverse();

    let config = BuilderConfig::new(1.0, 4);
    let a = hapdag_core::build(
        &axis,
        VecSequenceSource::new(vec![1.0; 4], columns_from_rows(&rows)),
        &config,
    )
    .unwrap();
    let b = hapdag_core::build(
        &axis,
        VecSequenceSource::new(vec![1.0; 4], columns_from_rows(&permuted)),
        &config,
    )
    .unwrap();

    for l in 0..3 {
        assert_eq!(a.level(l).n_parent_nodes(), b.level(l).n_parent_nodes());
        assert_eq!(a.level(l).n_child_nodes(), b.level(l).n_child_nodes());
        assert_eq!(a.level(l).n_edges(), b.level(l).n_edges());
    }
    assert_eq!(a.n_nodes(), b.n_nodes());
}

#[test]
fn distance_is_monotone_non_decreasing() {
    let axis = MarkerAxis::new(vec![2, 2, 2, 2]).unwrap();
    let rows = vec![
        vec![0, 0, 0, 1],
        vec![0, 1, 0, 1],
        vec![1, 0, 1, 0],
        vec![1, 1, 1, 0],
    ];
    let source = VecSequenceSource::new(vec![1.0, 2.0, 1.0, 3.0], columns_from_rows(&rows));
    let config = BuilderConfig::new(0.5, 4);
    let dag = hapdag_core::build(&axis, source, &config).unwrap();

    let distance = dag.distance();
    for window in distance.windows(2) {
        assert!(window[1] + 1e-6 >= window[0]);
    }
}

#[test]
fn exactly_one_symbol_used_yields_one_edge_per_parent_node() {
    let axis = MarkerAxis::new(vec![2, 2, 2]).unwrap();
    let rows = vec![vec![0, 0, 0], vec![0, 0, 0], vec![0, 0, 0]];
    let source = VecSequenceSource::new(vec![1.0, 1.0, 1.0], columns_from_rows(&rows));
    let config = BuilderConfig::new(1.0, 4);
    let dag = hapdag_core::build(&axis, source, &config).unwrap();

    for l in 0..3 {
        assert_eq!(dag.level(l).n_edges(), dag.level(l).n_parent_nodes());
    }
}
