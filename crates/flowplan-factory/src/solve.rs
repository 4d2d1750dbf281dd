//! Solver driver: LP invocation, relaxed-target search, result shaping.

use crate::error::FactoryError;
use crate::lp;
use crate::problem::{classify, FactoryProblem, ItemClasses};
use crate::rates::{effective_output, RateTable};
use crate::schema::{BottleneckHints, FactoryOutput};
use flowplan_core::numeric::{negligible, round6, EPS_BALANCE};
use std::collections::BTreeMap;

/// Bisection steps for the relaxed-target search. 40 halvings of the
/// initial interval reach ~1e-12 relative width.
const SEARCH_ITERATIONS: u32 = 40;

/// Solve one validated factory problem.
pub fn solve_problem(problem: &FactoryProblem) -> Result<FactoryOutput, FactoryError> {
    let classes = classify(problem)?;
    let rates = RateTable::build(problem)?;
    log::debug!(
        "factory LP: {} recipes, {} machine types, target {} @ {}/min",
        problem.recipes.len(),
        problem.machines.len(),
        problem.target_item,
        problem.target_rate,
    );

    match attempt(problem, &classes, &rates, problem.target_rate)? {
        Some(x) => Ok(shape_ok(problem, &classes, &rates, &x)),
        None => relaxed_target_search(problem, &classes, &rates),
    }
}

/// Solve the LP at one target rate. `Ok(None)` means infeasible at this
/// rate; solver anomalies (unbounded, internal) become errors.
fn attempt(
    problem: &FactoryProblem,
    classes: &ItemClasses,
    rates: &RateTable,
    target_rate: f64,
) -> Result<Option<Vec<f64>>, FactoryError> {
    let built = lp::build(problem, classes, rates, target_rate);
    match built.lp.solve() {
        Ok(solution) => {
            // Clamp solver noise below zero; the variables are bounded at 0.
            let x = built
                .vars
                .iter()
                .map(|&var| solution[var].max(0.0))
                .collect();
            Ok(Some(x))
        }
        Err(microlp::Error::Infeasible) => Ok(None),
        Err(err) => Err(FactoryError::Solver(err.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Relaxed-target search
// ---------------------------------------------------------------------------

fn relaxed_target_search(
    problem: &FactoryProblem,
    classes: &ItemClasses,
    rates: &RateTable,
) -> Result<FactoryOutput, FactoryError> {
    let mut lo = 0.0_f64;
    let mut hi = problem.target_rate;
    let mut best: Option<(f64, Vec<f64>)> = None;

    for _ in 0..SEARCH_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        match attempt(problem, classes, rates, mid)? {
            Some(x) => {
                best = Some((mid, x));
                lo = mid;
            }
            None => hi = mid,
        }
    }

    // Rate zero is always feasible (the all-idle plan), so an empty search
    // can only mean the feasible region collapses to the origin.
    let (best_rate, x) = match best {
        Some(found) => found,
        None => {
            let x = attempt(problem, classes, rates, 0.0)?
                .ok_or_else(|| FactoryError::Solver("LP infeasible at zero target".into()))?;
            (0.0, x)
        }
    };

    log::debug!("relaxed-target search settled at {best_rate}");

    Ok(FactoryOutput::Infeasible {
        max_feasible_target_per_min: round6(best_rate),
        bottleneck_hints: bottleneck_hints(problem, classes, rates, &x),
    })
}

/// Constraints within tolerance of their limit at the best feasible plan.
fn bottleneck_hints(
    problem: &FactoryProblem,
    classes: &ItemClasses,
    rates: &RateTable,
    x: &[f64],
) -> BottleneckHints {
    let mut raw = Vec::new();
    for item in &classes.raw {
        if let Some(&cap) = problem.supply.get(item) {
            if cap - consumption_of(problem, x, item) <= slack_tolerance(cap) {
                raw.push(item.clone());
            }
        }
    }

    let mut machines = Vec::new();
    for (machine_id, machine) in &problem.machines {
        let usage = machine_usage(problem, rates, x, machine_id);
        let limit = machine.max_machines as f64;
        let used = problem
            .recipes
            .iter()
            .any(|recipe| &recipe.machine == machine_id);
        if used && limit - usage <= slack_tolerance(limit) {
            machines.push(machine_id.clone());
        }
    }

    BottleneckHints { raw, machines }
}

/// Slack classification: ε with a relative scale. After 40 bisection steps
/// the binding constraint's slack is ~limit·2⁻⁴⁰, which a pure absolute ε
/// would misclassify for large limits.
fn slack_tolerance(limit: f64) -> f64 {
    EPS_BALANCE.max(EPS_BALANCE * limit.abs())
}

// ---------------------------------------------------------------------------
// Result shaping
// ---------------------------------------------------------------------------

fn shape_ok(
    problem: &FactoryProblem,
    classes: &ItemClasses,
    rates: &RateTable,
    x: &[f64],
) -> FactoryOutput {
    let mut per_recipe = BTreeMap::new();
    for (idx, recipe) in problem.recipes.iter().enumerate() {
        if !negligible(x[idx]) {
            per_recipe.insert(recipe.name.clone(), round6(x[idx]));
        }
    }

    let mut per_machine = BTreeMap::new();
    for machine_id in problem.machines.keys() {
        let count = machine_usage(problem, rates, x, machine_id);
        if !negligible(count) {
            per_machine.insert(machine_id.clone(), round6(count));
        }
    }

    let mut raw_consumption = BTreeMap::new();
    for item in &classes.raw {
        let consumption = consumption_of(problem, x, item);
        if !negligible(consumption) {
            raw_consumption.insert(item.clone(), round6(consumption));
        }
    }

    let mut byproduct_surplus = BTreeMap::new();
    for item in &classes.byproducts {
        let surplus = production_of(problem, x, item);
        if !negligible(surplus) {
            byproduct_surplus.insert(item.clone(), round6(surplus));
        }
    }

    FactoryOutput::Ok {
        per_recipe_crafts_per_min: per_recipe,
        per_machine_counts: per_machine,
        raw_consumption_per_min: raw_consumption,
        byproduct_surplus_per_min: byproduct_surplus,
    }
}

fn consumption_of(problem: &FactoryProblem, x: &[f64], item: &str) -> f64 {
    problem
        .recipes
        .iter()
        .enumerate()
        .filter_map(|(idx, recipe)| recipe.inputs.get(item).map(|&qty| qty * x[idx]))
        .sum()
}

fn production_of(problem: &FactoryProblem, x: &[f64], item: &str) -> f64 {
    problem
        .recipes
        .iter()
        .enumerate()
        .filter_map(|(idx, recipe)| {
            let machine = problem.machine_for(recipe);
            recipe
                .outputs
                .get(item)
                .map(|&qty| effective_output(qty, machine) * x[idx])
        })
        .sum()
}

fn machine_usage(problem: &FactoryProblem, rates: &RateTable, x: &[f64], machine_id: &str) -> f64 {
    problem
        .recipes
        .iter()
        .enumerate()
        .filter(|(_, recipe)| recipe.machine == machine_id)
        .map(|(idx, _)| x[idx] / rates.eff[idx])
        .sum()
}

// ===========================================================================
// Tests
// ===========================================================================
