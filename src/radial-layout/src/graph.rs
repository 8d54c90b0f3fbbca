// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::common::Result;

/// Point or displacement in the layout plane. One unit is the distance
/// between two consecutive rings.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    /// Point at `radius` from the ring center, at angle `theta` radians.
    pub fn from_polar(radius: f64, theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Position::new(radius * cos, radius * sin)
    }

    /// Signed area of the parallelogram spanned by `self` and `other`;
    /// positive when `other` lies counter-clockwise of `self`.
    pub fn cross_2d(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Add for Position {
    type Output = Position;
    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;
    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Position {
    type Output = Position;
    fn mul(self, factor: f64) -> Position {
        Position::new(self.x * factor, self.y * factor)
    }
}

/// Dense vertex identifier; doubles as the index into per-vertex arrays.
pub type VertexId = usize;

/// Index into an edge arena.
pub type EdgeId = usize;

/// Labels carried by an edge. The weight of an edge is the number of
/// distinct labels it carries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    pub urls: BTreeSet<String>,
}

impl EdgeData {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }

    pub fn weight(&self) -> usize {
        self.urls.len()
    }

    /// Replace both label sets with their union.
    pub fn merge(a: &mut EdgeData, b: &mut EdgeData) {
        a.urls.extend(b.urls.iter().cloned());
        b.urls.clone_from(&a.urls);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub tail: VertexId,
    pub head: VertexId,
    pub data: EdgeData,
}

impl Edge {
    pub fn weight(&self) -> usize {
        self.data.weight()
    }

    /// Whether `self` and `other` join the same pair of vertices, in either
    /// direction.
    pub fn joins_same_pair(&self, other: &Edge) -> bool {
        (self.tail == other.tail && self.head == other.head)
            || (self.tail == other.head && self.head == other.tail)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    /// Outgoing edges (indices into the owning edge arena). The order is
    /// the angular order of the vertex's branches.
    pub children: Vec<EdgeId>,
}

/// A validated directed graph over dense vertex ids. Use `GraphBuilder` to
/// construct.
#[derive(Clone, Debug)]
pub struct Graph {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,
}

impl Graph {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn has_vertex(&self, id: VertexId) -> bool {
        id < self.vertices.len()
    }

    pub fn outgoing(&self, id: VertexId) -> impl Iterator<Item = &Edge> {
        self.vertices
            .get(id)
            .into_iter()
            .flat_map(|v| v.children.iter().map(|&e| &self.edges[e]))
    }
}

/// Builder for a `Graph`. Vertex ids must end up forming exactly `[0, n)`;
/// `build` checks this and reports the first violation.
#[derive(Default)]
pub struct GraphBuilder {
    vertex_ids: Vec<VertexId>,
    edges: Vec<Edge>,
    edge_index: BTreeMap<(VertexId, VertexId), EdgeId>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-populated with vertices `0..n`.
    pub fn with_vertices(n: usize) -> Self {
        Self {
            vertex_ids: (0..n).collect(),
            ..Self::default()
        }
    }

    pub fn add_vertex(&mut self, id: VertexId) -> &mut Self {
        self.vertex_ids.push(id);
        self
    }

    /// Add the edge `tail -> head`. A repeated `(tail, head)` pair merges its
    /// labels into the existing edge instead of creating a parallel one.
    pub fn add_edge<I, S>(&mut self, tail: VertexId, head: VertexId, urls: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let data = EdgeData::new(urls);
        if let Some(&existing) = self.edge_index.get(&(tail, head)) {
            self.edges[existing].data.urls.extend(data.urls);
        } else {
            self.edge_index.insert((tail, head), self.edges.len());
            self.edges.push(Edge { tail, head, data });
        }
        self
    }

    pub fn build(self) -> Result<Graph> {
        let n = self.vertex_ids.len();
        let mut seen = vec![false; n];
        for &id in &self.vertex_ids {
            if id >= n {
                return crate::graph_err!(
                    VertexOutOfRange,
                    format!("vertex id {id} outside dense range [0, {n})")
                );
            }
            if seen[id] {
                return crate::graph_err!(DuplicateVertex, format!("vertex id {id}"));
            }
            seen[id] = true;
        }
        // n distinct ids all below n: the set is exactly [0, n)
        debug_assert!(seen.iter().all(|&s| s));

        let mut vertices: Vec<Vertex> = (0..n)
            .map(|id| Vertex {
                id,
                children: Vec::new(),
            })
            .collect();

        for (edge_id, edge) in self.edges.iter().enumerate() {
            for endpoint in [edge.tail, edge.head] {
                if endpoint >= n {
                    return crate::graph_err!(
                        UnknownVertex,
                        format!(
                            "edge {}->{} references vertex {endpoint} not in graph",
                            edge.tail, edge.head
                        )
                    );
                }
            }
            vertices[edge.tail].children.push(edge_id);
        }

        Ok(Graph {
            vertices,
            edges: self.edges,
        })
    }
}
