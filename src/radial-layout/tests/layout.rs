// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::time::Duration;

use float_cmp::approx_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

use radial_layout::{
    Annealer, AnnealingConfig, ErrorCode, Graph, GraphBuilder, RadialGeometry, RadialLayout,
    RootedTree, generate_layout, layout_cost,
};

/// Fifteen vertices, many reciprocal edges and a few cycles that force
/// extra edges.
fn sample_graph() -> Graph {
    let arrows: &[(usize, usize, &[&str])] = &[
        (0, 5, &["url", "url"]),
        (0, 1, &["url1"]),
        (0, 12, &["url1"]),
        (0, 13, &["url1", "url"]),
        (1, 2, &["url1"]),
        (1, 3, &["url1"]),
        (1, 4, &["url1", "url"]),
        (1, 6, &["url1"]),
        (1, 0, &["url1"]),
        (2, 1, &["url1"]),
        (2, 10, &["url1", "url"]),
        (3, 1, &["url1"]),
        (4, 1, &["url1"]),
        (5, 6, &["url1"]),
        (5, 9, &["url1"]),
        (6, 5, &["url1"]),
        (6, 1, &["url1", "url", "url"]),
        (6, 7, &["url1"]),
        (6, 8, &["url1"]),
        (7, 6, &["url1"]),
        (9, 5, &["url1"]),
        (9, 10, &["url1"]),
        (9, 11, &["url1", "url"]),
        (9, 12, &["url1"]),
        (10, 9, &["url1"]),
        (10, 2, &["url1"]),
        (11, 9, &["url1", "url"]),
        (11, 14, &["url1"]),
        (12, 0, &["url1"]),
        (12, 9, &["url1", "url"]),
        (13, 0, &["url1"]),
        (13, 14, &["url1"]),
        (14, 13, &["url1", "url"]),
        (14, 11, &["url1"]),
    ];
    let mut builder = GraphBuilder::with_vertices(15);
    for &(tail, head, urls) in arrows {
        builder.add_edge(tail, head, urls.iter().copied());
    }
    builder.build().unwrap()
}

fn undirected_pairs(graph: &Graph) -> BTreeSet<(usize, usize)> {
    graph
        .edges()
        .iter()
        .map(|e| (e.tail.min(e.head), e.tail.max(e.head)))
        .collect()
}

#[test]
fn test_cycle_extraction() {
    let mut builder = GraphBuilder::with_vertices(4);
    builder
        .add_edge(0, 1, ["a"])
        .add_edge(1, 2, ["b"])
        .add_edge(2, 3, ["c"])
        .add_edge(3, 1, ["d"]);
    let tree = RootedTree::new(builder.build().unwrap(), 0).unwrap();

    let tree_pairs: Vec<_> = tree.tree_edges().iter().map(|e| (e.tail, e.head)).collect();
    let extra_pairs: Vec<_> = tree.extra_edges().iter().map(|e| (e.tail, e.head)).collect();
    assert_eq!(tree_pairs, vec![(0, 1), (1, 2), (1, 3)]);
    assert_eq!(extra_pairs, vec![(2, 3)]);

    let layout = RadialLayout::compute(&tree).unwrap();
    assert_eq!(layout.depth(3), Some(2));
    // 1 has two leaf children, so it is capped at a half circle that is
    // split evenly
    let s2 = layout.sector(2).unwrap();
    let s3 = layout.sector(3).unwrap();
    assert!(approx_eq!(f64, s2.width, PI / 2.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, s3.width, PI / 2.0, epsilon = 1e-12));
}

#[test]
fn test_half_circle_split_by_subtree_size() {
    // 1 receives a half circle and three children of sizes 1, 1 and 2
    let mut builder = GraphBuilder::with_vertices(8);
    for (tail, head) in [(0, 1), (0, 2), (1, 3), (1, 4), (1, 5), (5, 6), (5, 7)] {
        builder.add_edge(tail, head, ["u"]);
    }
    let tree = RootedTree::new(builder.build().unwrap(), 0).unwrap();
    let layout = RadialLayout::compute(&tree).unwrap();

    let widths: Vec<f64> = [3, 4, 5]
        .iter()
        .map(|&v| layout.sector(v).unwrap().width)
        .collect();
    assert!(approx_eq!(f64, layout.sector(1).unwrap().width, PI, epsilon = 1e-12));
    assert!(approx_eq!(f64, widths[0], PI / 4.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, widths[1], PI / 4.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, widths[2], PI / 2.0, epsilon = 1e-12));
}

#[test]
fn test_each_pair_surfaces_once() {
    let graph = sample_graph();
    let pairs = undirected_pairs(&graph);
    let tree = RootedTree::new(graph, 3).unwrap();

    assert_eq!(tree.tree_edges().len(), 14);
    assert_eq!(tree.tree_edges().len() + tree.extra_edges().len(), pairs.len());

    let surfaced: BTreeSet<(usize, usize)> = tree
        .edges()
        .map(|(_, e)| (e.tail.min(e.head), e.tail.max(e.head)))
        .collect();
    assert_eq!(surfaced, pairs);

    // every tree edge points from parent to child
    for edge in tree.tree_edges() {
        assert_eq!(tree.parent(edge.head), Some(edge.tail));
    }
}

#[test]
fn test_sample_graph_layout() {
    let tree = RootedTree::new(sample_graph(), 3).unwrap();
    let layout = RadialLayout::compute(&tree).unwrap();

    assert!(tree.warnings().is_empty());
    assert_eq!(layout.depth(3), Some(0));
    assert_eq!(layout.depth(1), Some(1));
    assert_eq!(layout.depth(0), Some(2));
    assert_eq!(layout.depth(9), Some(4));
    assert_eq!(layout.depth(11), Some(5));
    assert_eq!(layout.height(), 5);
    // 6 -> 1 carries {url1, url} and merges with 1 -> 6
    assert_eq!(tree.max_edge_weight(), 2);

    let rings = layout.rings();
    assert_eq!(rings.iter().map(Vec::len).sum::<usize>(), 15);
    assert!(layout.max_radius() > 0.0 && layout.max_radius() <= 0.5);
}

#[test]
fn test_annealing_never_worse_on_sample_graph() {
    for seed in [1, 2, 3, 42] {
        let mut tree = RootedTree::new(sample_graph(), 3).unwrap();
        let mut layout = RadialLayout::compute(&tree).unwrap();
        let initial = layout_cost(&tree, &layout).total();

        let config = AnnealingConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let result = Annealer::new(&mut tree, &mut layout, &config, &mut rng)
            .unwrap()
            .run_until(|i| i >= 500)
            .unwrap();

        assert_eq!(result.initial_cost, initial);
        assert!(result.cost <= initial);
        assert_eq!(layout_cost(&tree, &layout).total(), result.cost);
        // the installed layout is a fresh sector pass over the installed order
        assert_eq!(RadialLayout::compute(&tree).unwrap(), layout);
    }
}

#[test]
fn test_generate_layout() {
    let config = AnnealingConfig {
        time_budget: Duration::from_millis(100),
        ..AnnealingConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(2026);
    let outcome = generate_layout(sample_graph(), 3, &config, &mut rng).unwrap();

    let geometry: &RadialGeometry = &outcome.geometry;
    assert_eq!(geometry.root, 3);
    assert!(geometry.vertices.iter().all(Option::is_some));
    assert_eq!(geometry.tree_edges.len(), 14);
    assert_eq!(geometry.tree_edges.len() + geometry.extra_edges.len(), 18);
    assert!(outcome.annealing.cost <= outcome.annealing.initial_cost);
    assert!(outcome.warnings.is_empty());

    for placement in geometry.vertices.iter().flatten() {
        assert!(placement.angular_position >= 0.0);
        assert!(placement.angular_position < 2.0 * PI);
        assert!(approx_eq!(
            f64,
            placement.position.length(),
            placement.depth as f64,
            epsilon = 1e-9
        ));
    }

    let json = serde_json::to_string(geometry).unwrap();
    assert!(json.contains("\"extra_edges\""));
}

#[test]
fn test_generate_layout_disconnected() {
    let mut builder = GraphBuilder::with_vertices(5);
    builder
        .add_edge(0, 1, ["a"])
        .add_edge(0, 2, ["b"])
        .add_edge(3, 4, ["c"]);
    let config = AnnealingConfig {
        time_budget: Duration::from_millis(10),
        ..AnnealingConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(0);
    let outcome = generate_layout(builder.build().unwrap(), 0, &config, &mut rng).unwrap();

    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].code, ErrorCode::DisconnectedInput);
    assert!(outcome.geometry.placement(3).is_none());
    assert!(outcome.geometry.placement(2).is_some());
    assert_eq!(outcome.geometry.tree_edges.len(), 2);
}

#[test]
fn test_generate_layout_errors() {
    let mut rng = StdRng::seed_from_u64(0);
    let config = AnnealingConfig::default();

    let err = generate_layout(sample_graph(), 15, &config, &mut rng).unwrap_err();
    assert_eq!(err.code, ErrorCode::RootNotInGraph);

    let bad = AnnealingConfig {
        temperature_step: 0,
        ..AnnealingConfig::default()
    };
    let err = generate_layout(sample_graph(), 3, &bad, &mut rng).unwrap_err();
    assert_eq!(err.code, ErrorCode::BadConfig);
}
