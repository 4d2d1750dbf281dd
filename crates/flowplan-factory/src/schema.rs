//! Serde mirrors of the factory JSON surface.
//!
//! Input structs are plain data shapes deserialized from stdin and resolved
//! into the validated [`FactoryProblem`](crate::problem::FactoryProblem)
//! model by the loader. The output enum is tagged on `status` so the field
//! is always present and first in the emitted document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Top-level factory problem document.
#[derive(Debug, Clone, Deserialize)]
pub struct FactoryInput {
    pub target: TargetData,
    #[serde(default)]
    pub recipes: Vec<RecipeData>,
    #[serde(default)]
    pub machines: BTreeMap<String, MachineData>,
    #[serde(default)]
    pub raw_supply_per_min: BTreeMap<String, f64>,
}

/// The production target: which item, at what rate.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetData {
    pub item: String,
    pub rate_per_min: f64,
}

/// One recipe: machine binding, craft time, and per-craft item quantities.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub name: String,
    pub machine: String,
    pub time_s: f64,
    #[serde(default, rename = "in")]
    pub inputs: BTreeMap<String, f64>,
    #[serde(default, rename = "out")]
    pub outputs: BTreeMap<String, f64>,
}

/// One machine type with its module bonuses and fleet limit.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineData {
    pub base_speed_crafts_per_min: f64,
    #[serde(default)]
    pub speed_mult: f64,
    #[serde(default)]
    pub prod_mult: f64,
    pub max_machines: u64,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// The factory result document.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FactoryOutput {
    Ok {
        per_recipe_crafts_per_min: BTreeMap<String, f64>,
        per_machine_counts: BTreeMap<String, f64>,
        raw_consumption_per_min: BTreeMap<String, f64>,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        byproduct_surplus_per_min: BTreeMap<String, f64>,
    },
    Infeasible {
        max_feasible_target_per_min: f64,
        bottleneck_hints: BottleneckHints,
    },
}

/// Constraints sitting at their limit at the best feasible rate.
#[derive(Debug, Clone, Serialize)]
pub struct BottleneckHints {
    pub raw: Vec<String>,
    pub machines: Vec<String>,
}

// ===========================================================================
// Tests
// ===========================================================================
