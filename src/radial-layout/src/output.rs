// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use serde::{Deserialize, Serialize};

use crate::cost::MARKER_RATIO;
use crate::graph::{Edge, Position, VertexId};
use crate::sectors::RadialLayout;
use crate::tree::{EdgeRole, RootedTree};

/// Where a vertex ended up. Angles are in radians.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VertexPlacement {
    pub id: VertexId,
    pub depth: usize,
    pub angular_position: f64,
    pub sector_start: f64,
    pub sector_width: f64,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeGeometry {
    pub tail: VertexId,
    pub head: VertexId,
    pub weight: usize,
    pub role: EdgeRole,
}

impl EdgeGeometry {
    fn new(role: EdgeRole, edge: &Edge) -> Self {
        EdgeGeometry {
            tail: edge.tail,
            head: edge.head,
            weight: edge.weight(),
            role,
        }
    }
}

/// Everything a renderer needs to draw a radial layout: one entry per input
/// vertex (`None` for vertices unreachable from the root), both edge sets and
/// the marker sizing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadialGeometry {
    pub root: VertexId,
    pub vertices: Vec<Option<VertexPlacement>>,
    pub tree_edges: Vec<EdgeGeometry>,
    pub extra_edges: Vec<EdgeGeometry>,
    pub max_radius: f64,
    pub marker_radius: f64,
    /// Number of rings beyond the root.
    pub height: usize,
    pub max_edge_weight: usize,
}

impl RadialGeometry {
    pub fn new(tree: &RootedTree, layout: &RadialLayout) -> Self {
        let vertices = (0..tree.vertex_count())
            .map(|id| {
                let depth = layout.depth(id)?;
                let sector = layout.sector(id)?;
                Some(VertexPlacement {
                    id,
                    depth,
                    angular_position: sector.angular_position(),
                    sector_start: sector.start,
                    sector_width: sector.width,
                    position: Position::from_polar(depth as f64, sector.angular_position()),
                })
            })
            .collect();

        let mut tree_edges = Vec::with_capacity(tree.tree_edges().len());
        let mut extra_edges = Vec::with_capacity(tree.extra_edges().len());
        for (role, edge) in tree.edges() {
            match role {
                EdgeRole::Tree => tree_edges.push(EdgeGeometry::new(role, edge)),
                EdgeRole::Extra => extra_edges.push(EdgeGeometry::new(role, edge)),
            }
        }

        RadialGeometry {
            root: tree.root(),
            vertices,
            tree_edges,
            extra_edges,
            max_radius: layout.max_radius(),
            marker_radius: layout.marker_radius(MARKER_RATIO),
            height: layout.height(),
            max_edge_weight: tree.max_edge_weight(),
        }
    }

    pub fn placement(&self, id: VertexId) -> Option<&VertexPlacement> {
        self.vertices.get(id).and_then(Option::as_ref)
    }
}
