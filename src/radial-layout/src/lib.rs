// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

#![forbid(unsafe_code)]

pub mod annealing;
pub mod common;
pub mod config;
pub mod cost;
pub mod geometry;
pub mod graph;
pub mod output;
pub mod sectors;
pub mod tree;

use rand::Rng;

pub use self::annealing::{Annealer, AnnealingResult, BacktrackRecord, run_annealing};
pub use self::common::{Error, ErrorCode, ErrorKind, Result, Warning};
pub use self::config::AnnealingConfig;
pub use self::cost::{CostBreakdown, layout_cost};
pub use self::graph::{Graph, GraphBuilder, Position, VertexId};
pub use self::output::RadialGeometry;
pub use self::sectors::RadialLayout;
pub use self::tree::{EdgeRole, RootedTree};

/// Result of laying out a whole graph.
#[derive(Clone, Debug)]
pub struct LayoutOutcome {
    pub geometry: RadialGeometry,
    pub annealing: AnnealingResult,
    pub warnings: Vec<Warning>,
}

/// Extract the spanning tree of `graph` rooted at `root`, place it radially
/// and anneal its sibling order within `config.time_budget`.
pub fn generate_layout<R: Rng>(
    graph: Graph,
    root: VertexId,
    config: &AnnealingConfig,
    rng: &mut R,
) -> Result<LayoutOutcome> {
    config.validate()?;
    let mut tree = RootedTree::new(graph, root)?;
    let mut layout = RadialLayout::compute(&tree)?;
    let annealing = run_annealing(&mut tree, &mut layout, config, rng)?;

    Ok(LayoutOutcome {
        geometry: RadialGeometry::new(&tree, &layout),
        annealing,
        warnings: tree.warnings().to_vec(),
    })
}
