//! Validated problem model and the item classifier.
//!
//! [`FactoryProblem::from_input`] is the only way to obtain a problem, so
//! every downstream stage can rely on: unique recipe names in sorted order,
//! resolvable machine references, non-negative finite quantities, and sane
//! multipliers. Everything is immutable after load.

use crate::error::FactoryError;
use crate::schema::{FactoryInput, MachineData, RecipeData};
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// A machine type after validation.
#[derive(Debug, Clone)]
pub struct Machine {
    pub base_speed: f64,
    pub speed_mult: f64,
    pub prod_mult: f64,
    pub max_machines: u64,
}

/// A recipe after validation.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: String,
    pub machine: String,
    pub time_s: f64,
    pub inputs: BTreeMap<String, f64>,
    pub outputs: BTreeMap<String, f64>,
}

/// The immutable factory problem. Recipes are sorted by name.
#[derive(Debug, Clone)]
pub struct FactoryProblem {
    pub target_item: String,
    pub target_rate: f64,
    pub recipes: Vec<Recipe>,
    pub machines: BTreeMap<String, Machine>,
    pub supply: BTreeMap<String, f64>,
}

impl FactoryProblem {
    /// Validate a deserialized input document into a problem model.
    pub fn from_input(input: FactoryInput) -> Result<Self, FactoryError> {
        if input.target.item.is_empty() {
            return Err(FactoryError::EmptyTarget);
        }
        if !input.target.rate_per_min.is_finite() || input.target.rate_per_min < 0.0 {
            return Err(FactoryError::BadTargetRate(input.target.rate_per_min));
        }

        let machines = validate_machines(input.machines)?;
        let recipes = validate_recipes(input.recipes, &machines)?;

        for (item, &cap) in &input.raw_supply_per_min {
            if !cap.is_finite() || cap < 0.0 {
                return Err(FactoryError::BadSupplyCap(item.clone()));
            }
        }

        Ok(Self {
            target_item: input.target.item,
            target_rate: input.target.rate_per_min,
            recipes,
            machines,
            supply: input.raw_supply_per_min,
        })
    }

    /// The machine a recipe runs on. Resolvability is a load-time invariant.
    pub fn machine_for(&self, recipe: &Recipe) -> &Machine {
        &self.machines[&recipe.machine]
    }

    /// Every item mentioned by any recipe, plus the target.
    pub fn all_items(&self) -> BTreeSet<String> {
        let mut items = BTreeSet::new();
        items.insert(self.target_item.clone());
        for recipe in &self.recipes {
            items.extend(recipe.inputs.keys().cloned());
            items.extend(recipe.outputs.keys().cloned());
        }
        items
    }
}

fn validate_machines(
    machines: BTreeMap<String, MachineData>,
) -> Result<BTreeMap<String, Machine>, FactoryError> {
    let mut out = BTreeMap::new();
    for (id, data) in machines {
        if !data.base_speed_crafts_per_min.is_finite() || data.base_speed_crafts_per_min <= 0.0 {
            return Err(FactoryError::NonPositiveBaseSpeed(id));
        }
        if !data.speed_mult.is_finite() || data.speed_mult < -1.0 {
            return Err(FactoryError::SpeedMultTooLow(id));
        }
        if !data.prod_mult.is_finite() || data.prod_mult < 0.0 {
            return Err(FactoryError::NegativeProductivity(id));
        }
        out.insert(
            id,
            Machine {
                base_speed: data.base_speed_crafts_per_min,
                speed_mult: data.speed_mult,
                prod_mult: data.prod_mult,
                max_machines: data.max_machines,
            },
        );
    }
    Ok(out)
}

fn validate_recipes(
    recipes: Vec<RecipeData>,
    machines: &BTreeMap<String, Machine>,
) -> Result<Vec<Recipe>, FactoryError> {
    let mut out: Vec<Recipe> = Vec::with_capacity(recipes.len());
    let mut seen = BTreeSet::new();

    for data in recipes {
        if !seen.insert(data.name.clone()) {
            return Err(FactoryError::DuplicateRecipe(data.name));
        }
        if !machines.contains_key(&data.machine) {
            return Err(FactoryError::UnknownMachine {
                recipe: data.name,
                machine: data.machine,
            });
        }
        if !data.time_s.is_finite() || data.time_s <= 0.0 {
            return Err(FactoryError::NonPositiveTime(data.name));
        }
        for map in [&data.inputs, &data.outputs] {
            for (item, &qty) in map {
                if item.is_empty() {
                    return Err(FactoryError::EmptyItem(data.name));
                }
                if !qty.is_finite() || qty < 0.0 {
                    return Err(FactoryError::BadQuantity {
                        recipe: data.name,
                        item: item.clone(),
                    });
                }
            }
        }
        out.push(Recipe {
            name: data.name,
            machine: data.machine,
            time_s: data.time_s,
            inputs: data.inputs,
            outputs: data.outputs,
        });
    }

    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

// ---------------------------------------------------------------------------
// Item classifier
// ---------------------------------------------------------------------------

/// The four disjoint item classes. Target membership takes precedence over
/// every other rule.
#[derive(Debug, Clone)]
pub struct ItemClasses {
    pub target: String,
    pub intermediates: BTreeSet<String>,
    pub byproducts: BTreeSet<String>,
    pub raw: BTreeSet<String>,
}

/// Partition every referenced item into target / intermediate / byproduct /
/// raw. Fails when the target item is produced by no recipe.
pub fn classify(problem: &FactoryProblem) -> Result<ItemClasses, FactoryError> {
    let mut produced = BTreeSet::new();
    let mut consumed = BTreeSet::new();
    for recipe in &problem.recipes {
        produced.extend(recipe.outputs.keys().cloned());
        consumed.extend(recipe.inputs.keys().cloned());
    }

    if !produced.contains(&problem.target_item) {
        return Err(FactoryError::TargetNotProduced(problem.target_item.clone()));
    }

    let raw: BTreeSet<String> = consumed.difference(&produced).cloned().collect();
    let byproducts: BTreeSet<String> = produced
        .difference(&consumed)
        .filter(|item| **item != problem.target_item)
        .cloned()
        .collect();
    let intermediates: BTreeSet<String> = produced
        .intersection(&consumed)
        .filter(|item| **item != problem.target_item)
        .cloned()
        .collect();

    Ok(ItemClasses {
        target: problem.target_item.clone(),
        intermediates,
        byproducts,
        raw,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
