//! Property tests for the factory engine.

use flowplan_factory::solve_json;
use flowplan_factory::test_utils::*;
use proptest::prelude::*;

fn solve_to_value(input: &flowplan_factory::schema::FactoryInput) -> serde_json::Value {
    let json = serde_json::to_string(&serde_json::json!({
        "target": {"item": input.target.item, "rate_per_min": input.target.rate_per_min},
        "recipes": input.recipes.iter().map(|r| serde_json::json!({
            "name": r.name, "machine": r.machine, "time_s": r.time_s,
            "in": r.inputs, "out": r.outputs,
        })).collect::<Vec<_>>(),
        "machines": input.machines.iter().map(|(id, m)| (id.clone(), serde_json::json!({
            "base_speed_crafts_per_min": m.base_speed_crafts_per_min,
            "speed_mult": m.speed_mult,
            "prod_mult": m.prod_mult,
            "max_machines": m.max_machines,
        }))).collect::<serde_json::Map<String, serde_json::Value>>(),
        "raw_supply_per_min": input.raw_supply_per_min,
    }))
    .unwrap();
    let output = solve_json(&json).unwrap();
    assert_factory_invariants(input, &output);
    serde_json::from_str(&output).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Scaling the target by k scales every reported rate by k.
    #[test]
    fn chain_outputs_scale_with_target(
        links in 1usize..6,
        rate in 1.0f64..500.0,
        k in prop_oneof![Just(0.5f64), Just(2.0), Just(4.0)],
    ) {
        let base = solve_to_value(&chain_problem(links, rate));
        let scaled = solve_to_value(&chain_problem(links, rate * k));

        prop_assert_eq!(base["status"].as_str(), Some("ok"));
        prop_assert_eq!(scaled["status"].as_str(), Some("ok"));

        let base_map = base["per_recipe_crafts_per_min"].as_object().unwrap();
        let scaled_map = scaled["per_recipe_crafts_per_min"].as_object().unwrap();
        for (name, value) in base_map {
            let b = value.as_f64().unwrap();
            let s = scaled_map[name].as_f64().unwrap();
            prop_assert!(
                (s - b * k).abs() <= 1e-5 * (1.0 + b * k),
                "recipe {} scaled {} vs expected {}", name, s, b * k
            );
        }
    }

    /// The engine is a pure function: identical inputs give identical bytes.
    #[test]
    fn solve_is_deterministic(links in 1usize..6, rate in 1.0f64..500.0) {
        let input = chain_problem(links, rate);
        let a = solve_to_value(&input);
        let b = solve_to_value(&input);
        prop_assert_eq!(a, b);
    }
}
