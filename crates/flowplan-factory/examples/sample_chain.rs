//! Solves a small smelting chain and prints the result document.
//!
//! Run with: `cargo run --package flowplan-factory --example sample_chain`

const SAMPLE: &str = r#"{
    "target": {"item": "green_circuit", "rate_per_min": 1800.0},
    "recipes": [
        {"name": "iron_plate", "machine": "smelter", "time_s": 60,
         "in": {"iron_ore": 1}, "out": {"iron_plate": 1}},
        {"name": "green_circuit", "machine": "assembler", "time_s": 60,
         "in": {"iron_plate": 1}, "out": {"green_circuit": 1}}
    ],
    "machines": {
        "smelter": {"base_speed_crafts_per_min": 1.0, "speed_mult": 0.0,
                     "prod_mult": 0.2, "max_machines": 100000},
        "assembler": {"base_speed_crafts_per_min": 1.0, "speed_mult": 0.0,
                       "prod_mult": 0.1, "max_machines": 100000}
    },
    "raw_supply_per_min": {"iron_ore": 1500.0}
}"#;

fn main() {
    match flowplan_factory::solve_json(SAMPLE) {
        Ok(document) => println!("{document}"),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
