// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::Result;

/// Acceptance probability targeted for an average uphill move at the start
/// of a run.
const INITIAL_ACCEPTANCE: f64 = 0.95;
/// Acceptance probability targeted for an average uphill move at the end.
const FINAL_ACCEPTANCE: f64 = 0.01;

/// Tuning parameters for the sibling-order annealer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnealingConfig {
    /// Wall-clock budget for one optimization run. Checked once per
    /// iteration, so a run may overshoot by one iteration.
    pub time_budget: Duration,
    pub initial_temperature: f64,
    /// Number of proposed transitions between two cooling steps.
    pub temperature_step: usize,
    /// Multiplicative cooling factor, in `(0, 1)`.
    pub decrease_factor: f64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(2),
            initial_temperature: 1.0,
            temperature_step: 10,
            decrease_factor: 0.8,
        }
    }
}

impl AnnealingConfig {
    /// Build a config from a budget in (fractional) seconds, as a user
    /// would type it, and validate it.
    pub fn from_seconds(
        seconds: f64,
        initial_temperature: f64,
        temperature_step: usize,
        decrease_factor: f64,
    ) -> Result<Self> {
        let time_budget = match Duration::try_from_secs_f64(seconds) {
            Ok(budget) => budget,
            Err(err) => {
                return crate::config_err!(format!("time budget {seconds}s: {err}"));
            }
        };
        let config = AnnealingConfig {
            time_budget,
            initial_temperature,
            temperature_step,
            decrease_factor,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.initial_temperature.is_finite() && self.initial_temperature > 0.0) {
            return crate::config_err!(format!(
                "initial temperature must be positive, got {}",
                self.initial_temperature
            ));
        }
        if self.temperature_step == 0 {
            return crate::config_err!("temperature step must be at least 1".to_string());
        }
        if !(self.decrease_factor > 0.0 && self.decrease_factor < 1.0) {
            return crate::config_err!(format!(
                "decrease factor must lie in (0, 1), got {}",
                self.decrease_factor
            ));
        }
        Ok(())
    }
}

/// Temperature at which an uphill move of `mean_delta` is accepted with
/// probability 0.95.
pub fn estimate_initial_temperature(mean_delta: f64) -> f64 {
    -mean_delta / INITIAL_ACCEPTANCE.ln()
}

/// Cooling factor that brings the acceptance probability of an uphill move
/// of `mean_delta` from its value at `initial_temperature` down to 0.01 over
/// `cooling_steps` cooling steps.
pub fn estimate_decrease_factor(
    cooling_steps: usize,
    initial_temperature: f64,
    mean_delta: f64,
) -> f64 {
    let final_ratio = -mean_delta / (initial_temperature * FINAL_ACCEPTANCE.ln());
    final_ratio.powf(1.0 / cooling_steps.max(1) as f64)
}
