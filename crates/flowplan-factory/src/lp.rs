//! LP construction.
//!
//! One decision variable per recipe (crafts/min, sorted name order), one
//! balance row per item, supply rows for capped raws, capacity rows per
//! machine type. The objective minimizes total machines used; the target
//! equality pins the primary goal, so the machine objective is the whole
//! lexicographic story.

use crate::problem::{FactoryProblem, ItemClasses};
use crate::rates::{effective_output, RateTable};
use microlp::{ComparisonOp, OptimizationDirection, Problem as LpProblem, Variable};
use std::collections::BTreeMap;

/// A built LP plus the recipe-aligned variable handles.
#[derive(Debug)]
pub struct FactoryLp {
    pub lp: LpProblem,
    pub vars: Vec<Variable>,
}

/// Build the LP for one target rate.
pub fn build(
    problem: &FactoryProblem,
    classes: &ItemClasses,
    rates: &RateTable,
    target_rate: f64,
) -> FactoryLp {
    let mut lp = LpProblem::new(OptimizationDirection::Minimize);

    let vars: Vec<Variable> = rates
        .eff
        .iter()
        .map(|&eff| lp.add_var(1.0 / eff, (0.0, f64::INFINITY)))
        .collect();

    for item in problem.all_items() {
        let coeffs = net_coefficients(problem, &vars, &item);
        if item == classes.target {
            lp.add_constraint(coeffs, ComparisonOp::Eq, target_rate);
        } else if classes.intermediates.contains(&item) {
            lp.add_constraint(coeffs, ComparisonOp::Eq, 0.0);
        } else if classes.byproducts.contains(&item) {
            lp.add_constraint(coeffs, ComparisonOp::Ge, 0.0);
        } else {
            // Raw: never created; consumption bounded by the cap if one is
            // declared. Consumption is -net, so the cap row negates.
            let negated: Vec<(Variable, f64)> =
                coeffs.iter().map(|&(var, coeff)| (var, -coeff)).collect();
            lp.add_constraint(coeffs, ComparisonOp::Le, 0.0);
            if let Some(&cap) = problem.supply.get(&item) {
                lp.add_constraint(negated, ComparisonOp::Le, cap);
            }
        }
    }

    for (machine_id, machine) in &problem.machines {
        let usage: Vec<(Variable, f64)> = problem
            .recipes
            .iter()
            .enumerate()
            .filter(|(_, recipe)| &recipe.machine == machine_id)
            .map(|(idx, _)| (vars[idx], 1.0 / rates.eff[idx]))
            .collect();
        if !usage.is_empty() {
            lp.add_constraint(usage, ComparisonOp::Le, machine.max_machines as f64);
        }
    }

    FactoryLp { lp, vars }
}

/// Net-production coefficients for one item.
///
/// A recipe carrying the item on both sides (catalyst) contributes a single
/// combined term; microlp rejects duplicate variables within a constraint.
fn net_coefficients(
    problem: &FactoryProblem,
    vars: &[Variable],
    item: &str,
) -> Vec<(Variable, f64)> {
    let mut coeffs: BTreeMap<usize, f64> = BTreeMap::new();
    for (idx, recipe) in problem.recipes.iter().enumerate() {
        let machine = problem.machine_for(recipe);
        if let Some(&qty) = recipe.outputs.get(item) {
            *coeffs.entry(idx).or_insert(0.0) += effective_output(qty, machine);
        }
        if let Some(&qty) = recipe.inputs.get(item) {
            *coeffs.entry(idx).or_insert(0.0) -= qty;
        }
    }
    coeffs
        .into_iter()
        .map(|(idx, coeff)| (vars[idx], coeff))
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================
