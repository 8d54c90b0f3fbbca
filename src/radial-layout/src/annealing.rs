// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Simulated annealing over sibling orders.
//!
//! A transition swaps two child slots of one vertex and recomputes every
//! sector. Improvements are always kept; a worse state is kept with the
//! Metropolis probability `exp((old - new) / T)`. A rejected transition is
//! undone by applying the same swap again. The best child-order table seen
//! during the run is reinstalled at the end if it beats the final state.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::common::Result;
use crate::config::{AnnealingConfig, estimate_decrease_factor, estimate_initial_temperature};
use crate::cost::{CostBreakdown, layout_cost};
use crate::graph::VertexId;
use crate::sectors::RadialLayout;
use crate::tree::RootedTree;

/// Number of random neighbours sampled when calibrating the temperature.
pub const CALIBRATION_SAMPLES: usize = 100;

/// The swap applied by the most recent transition. Re-applying it undoes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BacktrackRecord {
    pub vertex: VertexId,
    pub first: usize,
    pub second: usize,
}

/// Outcome of an optimization run.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnealingResult {
    pub initial_cost: u64,
    /// Cost of the installed layout; never above `initial_cost`.
    pub cost: u64,
    pub breakdown: CostBreakdown,
    pub iterations: usize,
    pub accepted: usize,
    pub improved: bool,
}

/// Pick a random neighbour of the current state: a vertex with at least two
/// children and two distinct child slots of it.
fn random_swap<R: Rng>(tree: &RootedTree, rng: &mut R) -> Option<BacktrackRecord> {
    let branching = tree.branching_vertices();
    if branching.is_empty() {
        return None;
    }
    let vertex = branching[rng.random_range(0..branching.len())];
    let n = tree.child_count(vertex);
    let first = rng.random_range(0..n);
    let mut second = rng.random_range(0..n - 1);
    if second >= first {
        second += 1;
    }
    Some(BacktrackRecord {
        vertex,
        first,
        second,
    })
}

fn apply_swap(
    tree: &mut RootedTree,
    layout: &mut RadialLayout,
    record: BacktrackRecord,
) -> Result<()> {
    tree.swap_children(record.vertex, record.first, record.second)?;
    layout.update_sectors(tree)
}

/// Average absolute cost change over `samples` random neighbours of the
/// current state. Every sampled swap is undone, so `tree` and `layout` are
/// left as they were. Returns 0 when no vertex can be permuted.
pub fn sample_mean_cost_delta<R: Rng>(
    tree: &mut RootedTree,
    layout: &mut RadialLayout,
    rng: &mut R,
    samples: usize,
) -> Result<f64> {
    if samples == 0 {
        return Ok(0.0);
    }
    let base = layout_cost(tree, layout).total();
    let mut total_delta = 0u64;
    for _ in 0..samples {
        let Some(record) = random_swap(tree, rng) else {
            return Ok(0.0);
        };
        apply_swap(tree, layout, record)?;
        total_delta += layout_cost(tree, layout).total().abs_diff(base);
        apply_swap(tree, layout, record)?;
    }
    Ok(total_delta as f64 / samples as f64)
}

/// Derive a config whose temperature schedule fits the cost landscape of
/// `tree`: the starting temperature accepts an average uphill move 95% of
/// the time and the schedule ends, after about `expected_iterations`
/// proposals, accepting it 1% of the time. Falls back to the default
/// temperatures when every sampled neighbour costs the same.
pub fn calibrate<R: Rng>(
    tree: &mut RootedTree,
    layout: &mut RadialLayout,
    rng: &mut R,
    time_budget: Duration,
    expected_iterations: usize,
    temperature_step: usize,
) -> Result<AnnealingConfig> {
    let mut config = AnnealingConfig {
        time_budget,
        temperature_step,
        ..AnnealingConfig::default()
    };
    config.validate()?;

    let mean_delta = sample_mean_cost_delta(tree, layout, rng, CALIBRATION_SAMPLES)?;
    if mean_delta > 0.0 {
        config.initial_temperature = estimate_initial_temperature(mean_delta);
        let cooling_steps = expected_iterations / temperature_step;
        config.decrease_factor =
            estimate_decrease_factor(cooling_steps, config.initial_temperature, mean_delta)
                .min(1.0 - f64::EPSILON);
    }
    tracing::debug!(
        mean_delta,
        initial_temperature = config.initial_temperature,
        decrease_factor = config.decrease_factor,
        "calibrated annealing schedule"
    );

    config.validate()?;
    Ok(config)
}

/// Annealing state over a tree and its layout. Both are modified in place;
/// when a run returns they hold the best state found.
pub struct Annealer<'a, R: Rng> {
    tree: &'a mut RootedTree,
    layout: &'a mut RadialLayout,
    rng: &'a mut R,
    temperature: f64,
    temperature_step: usize,
    decrease_factor: f64,
    backtrack: Option<BacktrackRecord>,
}

impl<'a, R: Rng> Annealer<'a, R> {
    pub fn new(
        tree: &'a mut RootedTree,
        layout: &'a mut RadialLayout,
        config: &AnnealingConfig,
        rng: &'a mut R,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Annealer {
            tree,
            layout,
            rng,
            temperature: config.initial_temperature,
            temperature_step: config.temperature_step,
            decrease_factor: config.decrease_factor,
            backtrack: None,
        })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn cost(&self) -> CostBreakdown {
        layout_cost(self.tree, self.layout)
    }

    /// Move to a random neighbour. Returns `None`, leaving the state
    /// untouched, when no vertex has two children to swap.
    pub fn propose(&mut self) -> Result<Option<BacktrackRecord>> {
        let Some(record) = random_swap(self.tree, self.rng) else {
            return Ok(None);
        };
        apply_swap(self.tree, self.layout, record)?;
        self.backtrack = Some(record);
        Ok(Some(record))
    }

    /// Undo the last proposal. Only one step of history is kept; returns
    /// `false` if there is nothing to undo.
    pub fn revert(&mut self) -> Result<bool> {
        match self.backtrack.take() {
            Some(record) => {
                apply_swap(self.tree, self.layout, record)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn accept(&mut self, old_cost: u64, new_cost: u64) -> bool {
        if new_cost <= old_cost {
            return true;
        }
        let probability = ((old_cost as f64 - new_cost as f64) / self.temperature).exp();
        probability > self.rng.random::<f64>()
    }

    /// Anneal until `stop(iterations)` returns true. `stop` is consulted
    /// before every proposal, so a run may do zero iterations.
    pub fn run_until<F>(&mut self, mut stop: F) -> Result<AnnealingResult>
    where
        F: FnMut(usize) -> bool,
    {
        let initial_cost = self.cost().total();

        if self.tree.branching_vertices().is_empty() {
            tracing::debug!("no vertex has two children; nothing to anneal");
            return Ok(AnnealingResult {
                initial_cost,
                cost: initial_cost,
                breakdown: self.cost(),
                iterations: 0,
                accepted: 0,
                improved: false,
            });
        }

        let mut current_cost = initial_cost;
        let mut best_cost = initial_cost;
        let mut best_orders = self.tree.child_orders();
        let mut iterations = 0;
        let mut accepted = 0;

        while !stop(iterations) {
            if self.propose()?.is_none() {
                break;
            }
            let new_cost = self.cost().total();
            if self.accept(current_cost, new_cost) {
                tracing::trace!(
                    iteration = iterations,
                    cost = new_cost,
                    temperature = self.temperature,
                    "accepted"
                );
                self.backtrack = None;
                current_cost = new_cost;
                accepted += 1;
                if new_cost < best_cost {
                    best_cost = new_cost;
                    best_orders = self.tree.child_orders();
                }
            } else {
                tracing::trace!(
                    iteration = iterations,
                    cost = new_cost,
                    temperature = self.temperature,
                    "rejected"
                );
                self.revert()?;
            }

            iterations += 1;
            if iterations % self.temperature_step == 0 {
                self.temperature *= self.decrease_factor;
            }
        }

        if best_cost < current_cost {
            self.tree.restore_child_orders(&best_orders)?;
            self.layout.update_sectors(self.tree)?;
        }
        let breakdown = self.cost();
        debug_assert_eq!(breakdown.total(), best_cost.min(current_cost));

        tracing::info!(
            initial_cost,
            cost = breakdown.total(),
            iterations,
            accepted,
            "annealing finished"
        );

        Ok(AnnealingResult {
            initial_cost,
            cost: breakdown.total(),
            breakdown,
            iterations,
            accepted,
            improved: breakdown.total() < initial_cost,
        })
    }
}

/// Anneal the sibling order of `tree` within `config.time_budget`, leaving
/// the best order found installed in `tree` and `layout`.
pub fn run_annealing<R: Rng>(
    tree: &mut RootedTree,
    layout: &mut RadialLayout,
    config: &AnnealingConfig,
    rng: &mut R,
) -> Result<AnnealingResult> {
    let start = Instant::now();
    let budget = config.time_budget;
    Annealer::new(tree, layout, config, rng)?.run_until(|_| start.elapsed() >= budget)
}
