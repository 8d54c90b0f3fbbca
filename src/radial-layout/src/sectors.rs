// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Radial placement of a rooted tree.
//!
//! Every vertex sits on the ring matching its depth. The root owns the full
//! circle; each vertex splits its angular sector among its children in
//! proportion to their subtree sizes, in child order, with no child ever
//! receiving more than half the circle. Sectors depend on child order, so
//! any reordering requires a full `update_sectors` pass.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::graph::{Position, VertexId};
use crate::tree::RootedTree;

/// Marker radius bound used before any vertex narrows it.
pub const INITIAL_MAX_RADIUS: f64 = 0.5;

/// Largest angular share a single child may receive.
pub const MAX_CHILD_SHARE: f64 = PI;

/// Angular interval `[start, start + width)` in radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub start: f64,
    pub width: f64,
}

impl Sector {
    pub const FULL_CIRCLE: Sector = Sector {
        start: 0.0,
        width: 2.0 * PI,
    };

    pub fn angular_position(&self) -> f64 {
        self.start + self.width / 2.0
    }
}

/// Depth of every vertex reachable from the root (pre-order walk over tree
/// edges only).
pub fn compute_depths(tree: &RootedTree) -> Vec<Option<usize>> {
    let mut depths = vec![None; tree.vertex_count()];
    let mut stack = vec![(tree.root(), 0usize)];
    while let Some((v, depth)) = stack.pop() {
        depths[v] = Some(depth);
        // reversed so children pop in their stored order
        let children: Vec<VertexId> = tree.children(v).collect();
        for &child in children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    depths
}

/// Subtree size of every vertex: 1 for a leaf, otherwise the sum of the
/// children's sizes. A vertex does not count itself once it has children.
/// Vertices outside the tree get 0.
pub fn compute_subtree_sizes(tree: &RootedTree) -> Vec<usize> {
    let mut sizes = vec![0usize; tree.vertex_count()];
    // (vertex, children already pushed)
    let mut stack = vec![(tree.root(), false)];
    while let Some((v, expanded)) = stack.pop() {
        if expanded {
            sizes[v] = if tree.child_count(v) == 0 {
                1
            } else {
                tree.children(v).map(|c| sizes[c]).sum()
            };
        } else {
            stack.push((v, true));
            for child in tree.children(v) {
                stack.push((child, false));
            }
        }
    }
    sizes
}

/// Assign a sector to every vertex in the tree and return the sectors along
/// with the largest marker radius that keeps neighbouring markers apart.
pub fn compute_sectors(
    tree: &RootedTree,
    depths: &[Option<usize>],
    sizes: &[usize],
) -> Result<(Vec<Option<Sector>>, f64)> {
    let mut sectors: Vec<Option<Sector>> = vec![None; tree.vertex_count()];
    let mut max_radius = INITIAL_MAX_RADIUS;

    let mut stack = vec![(tree.root(), Sector::FULL_CIRCLE)];
    while let Some((v, sector)) = stack.pop() {
        sectors[v] = Some(sector);
        if sector.width < MAX_CHILD_SHARE {
            let depth = depths[v].unwrap_or(0) as f64;
            max_radius = max_radius.min(depth * (sector.width / 2.0).sin());
        }

        if tree.child_count(v) == 0 {
            continue;
        }
        let parent_size = sizes[v];
        if parent_size == 0 {
            return crate::layout_err!(
                DegenerateSector,
                format!("vertex {v} has children but a subtree size of 0")
            );
        }

        let mut start = sector.start;
        for child in tree.children(v) {
            let share = (sizes[child] as f64 / parent_size as f64) * sector.width;
            let width = share.min(MAX_CHILD_SHARE);
            stack.push((child, Sector { start, width }));
            start += width;
        }
    }

    Ok((sectors, max_radius))
}

/// Depth, subtree size and sector of every vertex of a `RootedTree`.
///
/// Entries for vertices unreachable from the root are `None` (or 0 for
/// subtree sizes) and must not be relied on.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialLayout {
    depths: Vec<Option<usize>>,
    subtree_sizes: Vec<usize>,
    sectors: Vec<Option<Sector>>,
    max_radius: f64,
}

impl RadialLayout {
    pub fn compute(tree: &RootedTree) -> Result<Self> {
        let depths = compute_depths(tree);
        let subtree_sizes = compute_subtree_sizes(tree);
        let (sectors, max_radius) = compute_sectors(tree, &depths, &subtree_sizes)?;
        Ok(RadialLayout {
            depths,
            subtree_sizes,
            sectors,
            max_radius,
        })
    }

    /// Recompute every sector after the child order of `tree` changed.
    /// Depths and subtree sizes do not depend on child order and are kept,
    /// so `tree` must be the tree this layout was computed from.
    pub fn update_sectors(&mut self, tree: &RootedTree) -> Result<()> {
        if tree.vertex_count() != self.depths.len() || self.depth(tree.root()) != Some(0) {
            return crate::layout_err!(
                TreeMismatch,
                format!(
                    "layout over {} vertices cannot place a tree of {} vertices rooted at {}",
                    self.depths.len(),
                    tree.vertex_count(),
                    tree.root()
                )
            );
        }
        let (sectors, max_radius) = compute_sectors(tree, &self.depths, &self.subtree_sizes)?;
        self.sectors = sectors;
        self.max_radius = max_radius;
        Ok(())
    }

    pub fn depth(&self, v: VertexId) -> Option<usize> {
        self.depths.get(v).copied().flatten()
    }

    pub fn depths(&self) -> &[Option<usize>] {
        &self.depths
    }

    pub fn subtree_size(&self, v: VertexId) -> usize {
        self.subtree_sizes.get(v).copied().unwrap_or(0)
    }

    pub fn subtree_sizes(&self) -> &[usize] {
        &self.subtree_sizes
    }

    pub fn sector(&self, v: VertexId) -> Option<Sector> {
        self.sectors.get(v).copied().flatten()
    }

    pub fn sectors(&self) -> &[Option<Sector>] {
        &self.sectors
    }

    pub fn angular_position(&self, v: VertexId) -> Option<f64> {
        self.sector(v).map(|s| s.angular_position())
    }

    /// Cartesian position `(depth cos θ, depth sin θ)` of `v`.
    pub fn position(&self, v: VertexId) -> Option<Position> {
        let depth = self.depth(v)?;
        let theta = self.angular_position(v)?;
        Some(Position::from_polar(depth as f64, theta))
    }

    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Radius of the marker drawn at each vertex, as a fraction of
    /// `max_radius`.
    pub fn marker_radius(&self, ratio: f64) -> f64 {
        ratio * self.max_radius
    }

    /// Largest depth of any vertex in the tree.
    pub fn height(&self) -> usize {
        self.depths.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Vertices grouped by ring, each ring sorted by ascending angular
    /// position. `rings()[0]` holds only the root.
    pub fn rings(&self) -> Vec<Vec<VertexId>> {
        let mut rings: Vec<Vec<VertexId>> = Vec::new();
        for (v, depth) in self.depths.iter().enumerate() {
            let Some(depth) = *depth else {
                continue;
            };
            if rings.len() <= depth {
                rings.resize_with(depth + 1, Vec::new);
            }
            rings[depth].push(v);
        }
        for ring in rings.iter_mut() {
            ring.sort_by(|&a, &b| {
                let ta = self.angular_position(a).unwrap_or(0.0);
                let tb = self.angular_position(b).unwrap_or(0.0);
                ta.total_cmp(&tb)
            });
        }
        rings
    }
}
