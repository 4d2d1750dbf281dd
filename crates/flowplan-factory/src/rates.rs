//! Effective craft rates and productivity-scaled outputs.

use crate::error::FactoryError;
use crate::problem::{FactoryProblem, Machine, Recipe};

/// Per-machine effective crafts/min for one recipe:
/// `base_speed × (1 + speed_mult) × 60 / time_s`.
pub fn effective_crafts_per_min(recipe: &Recipe, machine: &Machine) -> f64 {
    machine.base_speed * (1.0 + machine.speed_mult) * 60.0 / recipe.time_s
}

/// Output quantity after productivity modules. Inputs are never scaled.
pub fn effective_output(base_qty: f64, machine: &Machine) -> f64 {
    base_qty * (1.0 + machine.prod_mult)
}

/// Effective crafts/min per recipe, aligned with `problem.recipes`.
#[derive(Debug, Clone)]
pub struct RateTable {
    pub eff: Vec<f64>,
}

impl RateTable {
    /// Compute every recipe's effective rate, rejecting non-positive ones.
    pub fn build(problem: &FactoryProblem) -> Result<Self, FactoryError> {
        let mut eff = Vec::with_capacity(problem.recipes.len());
        for recipe in &problem.recipes {
            let machine = problem
                .machines
                .get(&recipe.machine)
                .ok_or_else(|| FactoryError::UnknownMachine {
                    recipe: recipe.name.clone(),
                    machine: recipe.machine.clone(),
                })?;
            let rate = effective_crafts_per_min(recipe, machine);
            if !rate.is_finite() || rate <= 0.0 {
                return Err(FactoryError::NonPositiveRate(recipe.name.clone()));
            }
            eff.push(rate);
        }
        Ok(Self { eff })
    }
}
