// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Spanning-tree extraction.
//!
//! A directed graph is first made symmetric (every edge gets a reverse twin
//! carrying the same labels), then a breadth-first walk from the root keeps
//! the first edge reaching each vertex as a tree edge. Any other edge that
//! reaches an already-visited vertex becomes an *extra* edge. Each undirected
//! vertex pair of the input therefore surfaces exactly once in the result.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::common::{ErrorCode, Result, Warning};
use crate::graph::{Edge, EdgeData, EdgeId, Graph, Vertex, VertexId};

/// Which collection of a `RootedTree` an edge belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeRole {
    Tree,
    Extra,
}

/// A spanning tree over the vertices reachable from `root`, plus the edges
/// that had to be set aside to keep it a tree.
///
/// `Vertex::children` here index into `tree_edges`, and their order is the
/// only thing the annealer changes.
#[derive(Clone, Debug)]
pub struct RootedTree {
    root: VertexId,
    vertices: Vec<Vertex>,
    tree_edges: Vec<Edge>,
    extra_edges: Vec<Edge>,
    parents: Vec<Option<VertexId>>,
    reachable: Vec<bool>,
    branching: Vec<VertexId>,
    warnings: Vec<Warning>,
}

fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (lo, hi) = items.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}

/// Give every edge a reverse twin. Existing twins with different labels get
/// the union of both label sets.
fn symmetrize(edges: &mut Vec<Edge>, children: &mut [Vec<EdgeId>]) {
    let original = edges.len();
    for id in 0..original {
        let (tail, head) = (edges[id].tail, edges[id].head);
        let reverse = children[head]
            .iter()
            .copied()
            .find(|&r| edges[r].head == tail);
        match reverse {
            None => {
                let twin = Edge {
                    tail: head,
                    head: tail,
                    data: edges[id].data.clone(),
                };
                children[head].push(edges.len());
                edges.push(twin);
            }
            Some(r) if edges[r].data != edges[id].data => {
                let (fwd, rev) = pair_mut(edges, id, r);
                EdgeData::merge(&mut fwd.data, &mut rev.data);
            }
            Some(_) => {}
        }
    }
}

impl RootedTree {
    /// Extract the spanning tree of `graph` rooted at `root`.
    ///
    /// Fails if `root` is not a vertex of the graph or if any edge is a
    /// self-loop. Vertices not reachable from `root` are left out of the tree
    /// and reported through `warnings()`.
    pub fn new(graph: Graph, root: VertexId) -> Result<Self> {
        let n = graph.vertex_count();
        if root >= n {
            return crate::graph_err!(
                RootNotInGraph,
                format!("root {root} is not one of the {n} vertices")
            );
        }
        if let Some(e) = graph.edges.iter().find(|e| e.tail == e.head) {
            return crate::graph_err!(SelfLoop, format!("edge {}->{}", e.tail, e.head));
        }

        let Graph {
            vertices,
            mut edges,
        } = graph;
        let mut children: Vec<Vec<EdgeId>> = vertices.into_iter().map(|v| v.children).collect();

        symmetrize(&mut edges, &mut children);

        let mut visited = vec![false; n];
        let mut parents = vec![None; n];
        let mut tree_edges: Vec<Edge> = Vec::new();
        let mut extra_edges: Vec<Edge> = Vec::new();
        let mut tree_children: Vec<Vec<EdgeId>> = vec![Vec::new(); n];

        visited[root] = true;
        let mut queue = VecDeque::from([root]);
        while let Some(v) = queue.pop_front() {
            let outgoing = std::mem::take(&mut children[v]);
            for e in outgoing {
                let w = edges[e].head;
                // the undirected pair surfaces once: drop w's edge back to v
                if let Some(pos) = children[w].iter().position(|&r| edges[r].head == v) {
                    children[w].remove(pos);
                }

                if visited[w] {
                    extra_edges.push(edges[e].clone());
                } else {
                    visited[w] = true;
                    parents[w] = Some(v);
                    queue.push_back(w);
                    tree_children[v].push(tree_edges.len());
                    tree_edges.push(edges[e].clone());
                }
            }
        }

        let mut warnings = Vec::new();
        let unreachable: Vec<VertexId> = (0..n).filter(|&v| !visited[v]).collect();
        if !unreachable.is_empty() {
            // unreachable vertices only link to each other, and after
            // symmetrize each of their vertex pairs appears once per direction
            let dropped_edges: usize =
                unreachable.iter().map(|&v| children[v].len()).sum::<usize>() / 2;
            tracing::warn!(
                root,
                unreachable = unreachable.len(),
                dropped_edges,
                "vertices unreachable from root excluded from layout"
            );
            warnings.push(Warning {
                code: ErrorCode::DisconnectedInput,
                details: format!(
                    "{} vertices unreachable from root {root}, {dropped_edges} edges dropped: {:?}",
                    unreachable.len(),
                    unreachable
                ),
            });
        }

        let vertices: Vec<Vertex> = tree_children
            .into_iter()
            .enumerate()
            .map(|(id, children)| Vertex { id, children })
            .collect();
        let branching = vertices
            .iter()
            .filter(|v| v.children.len() >= 2)
            .map(|v| v.id)
            .collect();

        tracing::debug!(
            vertices = n,
            tree_edges = tree_edges.len(),
            extra_edges = extra_edges.len(),
            "extracted spanning tree"
        );

        Ok(RootedTree {
            root,
            vertices,
            tree_edges,
            extra_edges,
            parents,
            reachable: visited,
            branching,
            warnings,
        })
    }

    pub fn root(&self) -> VertexId {
        self.root
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn tree_edges(&self) -> &[Edge] {
        &self.tree_edges
    }

    pub fn extra_edges(&self) -> &[Edge] {
        &self.extra_edges
    }

    /// Every retained edge tagged with its role, tree edges first.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeRole, &Edge)> {
        self.tree_edges
            .iter()
            .map(|e| (EdgeRole::Tree, e))
            .chain(self.extra_edges.iter().map(|e| (EdgeRole::Extra, e)))
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_reachable(&self, v: VertexId) -> bool {
        self.reachable.get(v).copied().unwrap_or(false)
    }

    pub fn parent(&self, v: VertexId) -> Option<VertexId> {
        self.parents.get(v).copied().flatten()
    }

    /// Children of `v` in their current angular order.
    pub fn children(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .get(v)
            .into_iter()
            .flat_map(|vertex| vertex.children.iter().map(|&e| self.tree_edges[e].head))
    }

    pub fn child_count(&self, v: VertexId) -> usize {
        self.vertices.get(v).map_or(0, |vertex| vertex.children.len())
    }

    /// Vertices with at least two children, i.e. those whose child order
    /// can be permuted.
    pub fn branching_vertices(&self) -> &[VertexId] {
        &self.branching
    }

    /// Largest label count over all retained edges.
    pub fn max_edge_weight(&self) -> usize {
        self.edges().map(|(_, e)| e.weight()).max().unwrap_or(0)
    }

    /// Swap two child slots of `v`. Applying the same swap twice restores
    /// the original order.
    pub fn swap_children(&mut self, v: VertexId, first: usize, second: usize) -> Result<()> {
        let Some(vertex) = self.vertices.get_mut(v) else {
            return crate::graph_err!(VertexOutOfRange, format!("vertex {v}"));
        };
        let len = vertex.children.len();
        if first >= len || second >= len {
            return crate::graph_err!(
                ChildSlotOutOfRange,
                format!("slots ({first}, {second}) of vertex {v} with {len} children")
            );
        }
        vertex.children.swap(first, second);
        Ok(())
    }

    /// Snapshot of every vertex's child order.
    pub fn child_orders(&self) -> Vec<Vec<EdgeId>> {
        self.vertices.iter().map(|v| v.children.clone()).collect()
    }

    /// Reinstall a snapshot taken with `child_orders`. Fails without
    /// touching the tree unless every entry is a reordering of the matching
    /// vertex's current children.
    pub fn restore_child_orders(&mut self, orders: &[Vec<EdgeId>]) -> Result<()> {
        if orders.len() != self.vertices.len() {
            return crate::graph_err!(
                ForeignSnapshot,
                format!(
                    "snapshot covers {} vertices, tree has {}",
                    orders.len(),
                    self.vertices.len()
                )
            );
        }
        for (vertex, order) in self.vertices.iter().zip(orders) {
            let mut current = vertex.children.clone();
            let mut proposed = order.clone();
            current.sort_unstable();
            proposed.sort_unstable();
            if current != proposed {
                return crate::graph_err!(
                    ForeignSnapshot,
                    format!("order {order:?} is not a reordering of vertex {}'s children", vertex.id)
                );
            }
        }
        for (vertex, order) in self.vertices.iter_mut().zip(orders) {
            vertex.children.clone_from(order);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;
    use crate::graph::GraphBuilder;

    fn pairs(edges: &[Edge]) -> Vec<(VertexId, VertexId)> {
        edges.iter().map(|e| (e.tail, e.head)).collect()
    }

    #[test]
    fn test_cycle_closing_edge_becomes_extra() {
        let mut builder = GraphBuilder::with_vertices(4);
        builder
            .add_edge(0, 1, ["a"])
            .add_edge(1, 2, ["b"])
            .add_edge(2, 3, ["c"])
            .add_edge(3, 1, ["d"]);
        let tree = RootedTree::new(builder.build().unwrap(), 0).unwrap();

        // 3->1 has a twin 1->3, so the walk reaches 3 from 1 before 2 is
        // dequeued and 2->3 is the edge that closes the cycle
        assert_eq!(pairs(tree.tree_edges()), vec![(0, 1), (1, 2), (1, 3)]);
        assert_eq!(pairs(tree.extra_edges()), vec![(2, 3)]);
        assert_eq!(tree.extra_edges()[0].data, EdgeData::new(["c"]));
        assert_eq!(tree.tree_edges()[2].data, EdgeData::new(["d"]));
        assert!(tree.warnings().is_empty());
    }

    #[test]
    fn test_reverse_edges_merge_labels() {
        let mut builder = GraphBuilder::with_vertices(2);
        builder.add_edge(0, 1, ["a", "b"]).add_edge(1, 0, ["b", "c"]);
        let tree = RootedTree::new(builder.build().unwrap(), 0).unwrap();

        assert_eq!(pairs(tree.tree_edges()), vec![(0, 1)]);
        assert!(tree.extra_edges().is_empty());
        assert_eq!(tree.tree_edges()[0].weight(), 3);
    }

    #[test]
    fn test_edges_point_away_from_root() {
        // 1 -> 0 only; rooting at 0 still reaches 1 through the twin
        let mut builder = GraphBuilder::with_vertices(3);
        builder.add_edge(1, 0, ["a"]).add_edge(2, 1, ["b"]);
        let tree = RootedTree::new(builder.build().unwrap(), 0).unwrap();

        assert_eq!(pairs(tree.tree_edges()), vec![(0, 1), (1, 2)]);
        assert_eq!(tree.parent(2), Some(1));
        assert_eq!(tree.parent(0), None);
    }

    #[test]
    fn test_acyclic_input_unchanged() {
        let mut builder = GraphBuilder::with_vertices(5);
        builder
            .add_edge(0, 1, ["a"])
            .add_edge(0, 2, ["b"])
            .add_edge(1, 3, ["c"])
            .add_edge(1, 4, ["d"]);
        let graph = builder.build().unwrap();
        let original = pairs(graph.edges());
        let tree = RootedTree::new(graph, 0).unwrap();

        assert!(tree.extra_edges().is_empty());
        let mut got = pairs(tree.tree_edges());
        got.sort();
        let mut want = original;
        want.sort();
        assert_eq!(got, want);
        assert_eq!(tree.children(1).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(tree.branching_vertices(), &[0, 1]);
    }

    #[test]
    fn test_cross_edge_in_queue() {
        // 0 -> {1, 2}, 1 -> 2: when 1 is processed, 2 is visited but queued
        let mut builder = GraphBuilder::with_vertices(3);
        builder
            .add_edge(0, 1, ["a"])
            .add_edge(0, 2, ["b"])
            .add_edge(1, 2, ["c"]);
        let tree = RootedTree::new(builder.build().unwrap(), 0).unwrap();

        assert_eq!(pairs(tree.tree_edges()), vec![(0, 1), (0, 2)]);
        assert_eq!(pairs(tree.extra_edges()), vec![(1, 2)]);
        let roles: Vec<EdgeRole> = tree.edges().map(|(r, _)| r).collect();
        assert_eq!(roles, vec![EdgeRole::Tree, EdgeRole::Tree, EdgeRole::Extra]);
    }

    #[test]
    fn test_unreachable_vertices_warn() {
        let mut builder = GraphBuilder::with_vertices(5);
        builder
            .add_edge(0, 1, ["a"])
            .add_edge(2, 3, ["b"])
            .add_edge(3, 4, ["c"]);
        let tree = RootedTree::new(builder.build().unwrap(), 0).unwrap();

        assert_eq!(pairs(tree.tree_edges()), vec![(0, 1)]);
        assert!(tree.extra_edges().is_empty());
        assert!(!tree.is_reachable(2));
        assert!(tree.is_reachable(1));
        assert_eq!(tree.warnings().len(), 1);
        assert_eq!(tree.warnings()[0].code, ErrorCode::DisconnectedInput);
        // 2->3 and 3->4 are lost with their endpoints
        assert!(tree.warnings()[0].details.contains("2 edges dropped"));
    }

    #[test]
    fn test_rejects_self_loop() {
        let mut builder = GraphBuilder::with_vertices(2);
        builder.add_edge(0, 1, ["a"]).add_edge(1, 1, ["b"]);
        let err = RootedTree::new(builder.build().unwrap(), 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Graph);
        assert_eq!(err.code, ErrorCode::SelfLoop);
    }

    #[test]
    fn test_rejects_missing_root() {
        let builder = GraphBuilder::with_vertices(2);
        let err = RootedTree::new(builder.build().unwrap(), 2).unwrap_err();
        assert_eq!(err.code, ErrorCode::RootNotInGraph);
    }

    #[test]
    fn test_swap_children_and_restore() {
        let mut builder = GraphBuilder::with_vertices(4);
        builder
            .add_edge(0, 1, ["a"])
            .add_edge(0, 2, ["b"])
            .add_edge(0, 3, ["c"]);
        let mut tree = RootedTree::new(builder.build().unwrap(), 0).unwrap();
        let snapshot = tree.child_orders();

        tree.swap_children(0, 0, 2).unwrap();
        assert_eq!(tree.children(0).collect::<Vec<_>>(), vec![3, 2, 1]);

        tree.restore_child_orders(&snapshot).unwrap();
        assert_eq!(tree.children(0).collect::<Vec<_>>(), vec![1, 2, 3]);

        let err = tree.swap_children(0, 0, 3).unwrap_err();
        assert_eq!(err.code, ErrorCode::ChildSlotOutOfRange);
        let err = tree.swap_children(9, 0, 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::VertexOutOfRange);
    }

    fn star(leaves: usize) -> RootedTree {
        let mut builder = GraphBuilder::with_vertices(leaves + 1);
        for v in 1..=leaves {
            builder.add_edge(0, v, ["u"]);
        }
        RootedTree::new(builder.build().unwrap(), 0).unwrap()
    }

    #[test]
    fn test_restore_rejects_foreign_snapshot() {
        let mut tree = star(3);
        let before = tree.child_orders();

        let err = tree.restore_child_orders(&star(6).child_orders()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Graph);
        assert_eq!(err.code, ErrorCode::ForeignSnapshot);
        assert_eq!(tree.child_orders(), before);
        assert_eq!(tree.children(0).collect::<Vec<_>>(), vec![1, 2, 3]);

        // right length, but not a reordering of the root's children
        let mut bogus = before.clone();
        bogus[0] = vec![0, 1, 7];
        let err = tree.restore_child_orders(&bogus).unwrap_err();
        assert_eq!(err.code, ErrorCode::ForeignSnapshot);
        assert_eq!(tree.child_orders(), before);

        let mut reordered = before.clone();
        reordered[0].reverse();
        tree.restore_child_orders(&reordered).unwrap();
        assert_eq!(tree.children(0).collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn test_max_edge_weight() {
        let mut builder = GraphBuilder::with_vertices(3);
        builder
            .add_edge(0, 1, ["a"])
            .add_edge(1, 2, ["a", "b", "c"])
            .add_edge(2, 0, ["x", "y"]);
        let tree = RootedTree::new(builder.build().unwrap(), 0).unwrap();
        assert_eq!(tree.max_edge_weight(), 3);
    }
}
