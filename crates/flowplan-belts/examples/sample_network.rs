//! Solves a small merge/split network and prints the result document.
//!
//! Run with: `cargo run --package flowplan-belts --example sample_network`

const SAMPLE: &str = r#"{
    "sources": [{"id": "s1", "capacity": 900}, {"id": "s2", "capacity": 600}],
    "sinks": ["sink"],
    "nodes": [{"id": "b", "capacity": 900}, {"id": "c", "capacity": 600}],
    "edges": [
        {"from": "s1", "to": "a", "lo": 0, "hi": 2000},
        {"from": "s2", "to": "a", "lo": 0, "hi": 2000},
        {"from": "a", "to": "b", "lo": 0, "hi": 2000},
        {"from": "a", "to": "c", "lo": 0, "hi": 2000},
        {"from": "b", "to": "sink", "lo": 0, "hi": 2000},
        {"from": "c", "to": "sink", "lo": 0, "hi": 2000}
    ]
}"#;

fn main() {
    match flowplan_belts::solve_json(SAMPLE) {
        Ok(document) => println!("{document}"),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
