//! Shared test helpers: input builders, a deterministic chain generator,
//! and the invariant checker used by integration and property tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::schema::{FactoryInput, MachineData, RecipeData, TargetData};
use std::collections::BTreeMap;

// ===========================================================================
// Builders
// ===========================================================================

pub fn machine(base_speed: f64, speed_mult: f64, prod_mult: f64, max_machines: u64) -> MachineData {
    MachineData {
        base_speed_crafts_per_min: base_speed,
        speed_mult,
        prod_mult,
        max_machines,
    }
}

pub fn recipe(
    name: &str,
    machine: &str,
    time_s: f64,
    inputs: &[(&str, f64)],
    outputs: &[(&str, f64)],
) -> RecipeData {
    RecipeData {
        name: name.to_string(),
        machine: machine.to_string(),
        time_s,
        inputs: item_map(inputs),
        outputs: item_map(outputs),
    }
}

pub fn problem(
    target_item: &str,
    target_rate: f64,
    recipes: Vec<RecipeData>,
    machines: &[(&str, MachineData)],
    supply: &[(&str, f64)],
) -> FactoryInput {
    FactoryInput {
        target: TargetData {
            item: target_item.to_string(),
            rate_per_min: target_rate,
        },
        recipes,
        machines: machines
            .iter()
            .map(|(id, data)| (id.to_string(), data.clone()))
            .collect(),
        raw_supply_per_min: item_map(supply),
    }
}

fn item_map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries
        .iter()
        .map(|(item, qty)| (item.to_string(), *qty))
        .collect()
}

// ===========================================================================
// Generators
// ===========================================================================

/// A linear production chain `item_0 → item_1 → … → item_n` with one recipe
/// per link, targeting the last item. Deterministic in `links`.
pub fn chain_problem(links: usize, target_rate: f64) -> FactoryInput {
    let recipes = (0..links)
        .map(|i| {
            recipe(
                &format!("step_{i:03}"),
                "assembler",
                60.0,
                &[(&format!("item_{i:03}"), 1.0)],
                &[(&format!("item_{:03}", i + 1), 1.0)],
            )
        })
        .collect();
    problem(
        &format!("item_{links:03}"),
        target_rate,
        recipes,
        &[("assembler", machine(1.0, 0.0, 0.0, 1_000_000))],
        &[("item_000", target_rate * 2.0)],
    )
}

// ===========================================================================
// Invariant checker
// ===========================================================================

/// Check a solved output document against the input's balance, supply, and
/// machine-capacity invariants. Panics with a description on violation.
/// Only `status = "ok"` documents are checked.
pub fn assert_factory_invariants(input: &FactoryInput, output_json: &str) {
    let output: serde_json::Value = serde_json::from_str(output_json).expect("output parses");
    if output["status"] != "ok" {
        return;
    }

    let per_recipe = output["per_recipe_crafts_per_min"]
        .as_object()
        .expect("per_recipe_crafts_per_min is a map");
    let crafts = |name: &str| -> f64 {
        per_recipe
            .get(name)
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(0.0)
    };

    // Net production per item, with productivity applied to outputs.
    let mut net: BTreeMap<String, f64> = BTreeMap::new();
    let mut produced: BTreeMap<String, bool> = BTreeMap::new();
    let mut consumed: BTreeMap<String, bool> = BTreeMap::new();
    for recipe in &input.recipes {
        let x = crafts(&recipe.name);
        assert!(x >= 0.0, "recipe '{}' has negative crafts {x}", recipe.name);
        let prod_mult = input.machines[&recipe.machine].prod_mult;
        for (item, qty) in &recipe.outputs {
            *net.entry(item.clone()).or_default() += qty * (1.0 + prod_mult) * x;
            produced.insert(item.clone(), true);
        }
        for (item, qty) in &recipe.inputs {
            *net.entry(item.clone()).or_default() -= qty * x;
            consumed.insert(item.clone(), true);
        }
    }

    for (item, balance) in &net {
        let is_target = *item == input.target.item;
        let is_raw = !produced.contains_key(item);
        let is_byproduct = !is_target && !is_raw && !consumed.contains_key(item);
        if is_target {
            assert!(
                (balance - input.target.rate_per_min).abs() <= 1e-6,
                "target '{item}' nets {balance}, wanted {}",
                input.target.rate_per_min
            );
        } else if is_raw {
            assert!(*balance <= 1e-6, "raw '{item}' is being created: {balance}");
            if let Some(cap) = input.raw_supply_per_min.get(item) {
                assert!(
                    -balance <= cap + 1e-6,
                    "raw '{item}' consumption {} exceeds cap {cap}",
                    -balance
                );
            }
        } else if is_byproduct {
            assert!(*balance >= -1e-6, "byproduct '{item}' nets negative: {balance}");
        } else {
            assert!(
                balance.abs() <= 1e-6,
                "intermediate '{item}' is unbalanced: {balance}"
            );
        }
    }

    // Machine capacity.
    for (machine_id, data) in &input.machines {
        let mut usage = 0.0;
        for recipe in &input.recipes {
            if &recipe.machine == machine_id {
                let eff = data.base_speed_crafts_per_min * (1.0 + data.speed_mult) * 60.0
                    / recipe.time_s;
                usage += crafts(&recipe.name) / eff;
            }
        }
        assert!(
            usage <= data.max_machines as f64 + 1e-6,
            "machine '{machine_id}' usage {usage} exceeds cap {}",
            data.max_machines
        );
    }
}
