// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Visual cost of a radial layout.
//!
//! Tree edges never cross each other in a radial layout, so only the extra
//! edges are scored: each one against every other extra edge and every tree
//! edge, plus a penalty for each vertex marker it passes through.

use serde::{Deserialize, Serialize};

use crate::geometry::{Circle, Intersection, Segment};
use crate::graph::{Edge, Position, VertexId};
use crate::sectors::RadialLayout;
use crate::tree::RootedTree;

/// Penalty for two edges drawn on top of each other.
pub const MINGLED_PENALTY: u64 = 5;
/// Penalty for two edges crossing at a single point.
pub const CROSSING_PENALTY: u64 = 1;
/// Penalty for an edge running through a vertex marker.
pub const VERTEX_HIT_PENALTY: u64 = 10;
/// Marker radius as a fraction of the layout's `max_radius`.
pub const MARKER_RATIO: f64 = 0.9;

/// Counts of each kind of visual defect. `total()` weighs them into the
/// scalar the annealer minimizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub mingled: u64,
    pub crossings: u64,
    pub vertex_hits: u64,
}

impl CostBreakdown {
    pub fn total(&self) -> u64 {
        self.mingled * MINGLED_PENALTY
            + self.crossings * CROSSING_PENALTY
            + self.vertex_hits * VERTEX_HIT_PENALTY
    }
}

struct PlacedEdge {
    tail: VertexId,
    head: VertexId,
    segment: Segment,
}

impl PlacedEdge {
    fn new(edge: &Edge, layout: &RadialLayout) -> Option<Self> {
        let start = layout.position(edge.tail)?;
        let end = layout.position(edge.head)?;
        Some(PlacedEdge {
            tail: edge.tail,
            head: edge.head,
            segment: Segment::new(start, end),
        })
    }

    fn touches(&self, v: VertexId) -> bool {
        self.tail == v || self.head == v
    }

    fn shares_endpoint(&self, other: &PlacedEdge) -> bool {
        self.touches(other.tail) || self.touches(other.head)
    }
}

fn score_pair(a: &PlacedEdge, b: &PlacedEdge, cost: &mut CostBreakdown) {
    match a.segment.intersection(&b.segment) {
        Intersection::Overlap(_) => cost.mingled += 1,
        Intersection::Point(_) if !a.shares_endpoint(b) => cost.crossings += 1,
        _ => {}
    }
}

/// Score the current placement of `tree` described by `layout`.
pub fn layout_cost(tree: &RootedTree, layout: &RadialLayout) -> CostBreakdown {
    let mut cost = CostBreakdown::default();
    if tree.extra_edges().is_empty() {
        return cost;
    }

    let extra: Vec<PlacedEdge> = tree
        .extra_edges()
        .iter()
        .filter_map(|e| PlacedEdge::new(e, layout))
        .collect();
    let tree_edges: Vec<PlacedEdge> = tree
        .tree_edges()
        .iter()
        .filter_map(|e| PlacedEdge::new(e, layout))
        .collect();
    let markers: Vec<(VertexId, Position)> = (0..tree.vertex_count())
        .filter_map(|v| layout.position(v).map(|p| (v, p)))
        .collect();
    let marker_radius = layout.marker_radius(MARKER_RATIO);

    for (i, edge) in extra.iter().enumerate() {
        for other in &extra[i + 1..] {
            score_pair(edge, other, &mut cost);
        }
        for other in &tree_edges {
            score_pair(edge, other, &mut cost);
        }
        for &(v, center) in &markers {
            if !edge.touches(v)
                && Circle::new(center, marker_radius).intersects_segment(&edge.segment)
            {
                cost.vertex_hits += 1;
            }
        }
    }

    cost
}
