//! End-to-end tests for the belts engine through its JSON surface.

use flowplan_belts::solve_json;
use flowplan_belts::test_utils::*;
use flowplan_belts::BeltsError;

fn solve_input(input: &flowplan_belts::schema::BeltsInput) -> String {
    solve_json(&input_json(input)).unwrap()
}

fn input_json(input: &flowplan_belts::schema::BeltsInput) -> String {
    serde_json::to_string(&serde_json::json!({
        "sources": input.sources.iter().map(|s| serde_json::json!({
            "id": s.id, "capacity": s.capacity,
        })).collect::<Vec<_>>(),
        "sinks": input.sinks,
        "nodes": input.nodes.iter().map(|n| serde_json::json!({
            "id": n.id, "capacity": n.capacity,
        })).collect::<Vec<_>>(),
        "edges": input.edges.iter().map(|e| serde_json::json!({
            "from": e.from, "to": e.to, "lo": e.lo, "hi": e.hi,
        })).collect::<Vec<_>>(),
    }))
    .unwrap()
}

fn parsed(output: &str) -> serde_json::Value {
    serde_json::from_str(output).unwrap()
}

fn flow_of(output: &serde_json::Value, from: &str, to: &str) -> f64 {
    output["flows"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|entry| entry["from"] == from && entry["to"] == to)
        .map(|entry| entry["flow"].as_f64().unwrap())
        .sum()
}

// ===========================================================================
// Test 1: parallel merge/split network
// ===========================================================================

#[test]
fn parallel_sources_merge_and_split() {
    let input = network(
        &[("s1", Some(900.0)), ("s2", Some(600.0))],
        &["sink"],
        &[("b", Some(900.0)), ("c", Some(600.0))],
        &[
            edge("s1", "a", 0.0, 2000.0),
            edge("s2", "a", 0.0, 2000.0),
            edge("a", "b", 0.0, 2000.0),
            edge("a", "c", 0.0, 2000.0),
            edge("b", "sink", 0.0, 2000.0),
            edge("c", "sink", 0.0, 2000.0),
        ],
    );
    let output = solve_input(&input);
    let value = parsed(&output);

    assert_eq!(value["status"], "ok");
    assert_eq!(value["max_flow_per_min"].as_f64().unwrap(), 1500.0);
    assert_eq!(flow_of(&value, "s1", "a"), 900.0);
    assert_eq!(flow_of(&value, "s2", "a"), 600.0);
    assert_eq!(flow_of(&value, "a", "b"), 900.0);
    assert_eq!(flow_of(&value, "a", "c"), 600.0);
    assert_eq!(flow_of(&value, "b", "sink"), 900.0);
    assert_eq!(flow_of(&value, "c", "sink"), 600.0);

    assert_belts_invariants(&input, &output);
}

// ===========================================================================
// Test 2: lower bound forces routing
// ===========================================================================

#[test]
fn lower_bound_forces_routing_on_parallel_edges() {
    let input = network(
        &[("s", None)],
        &["t"],
        &[],
        &[edge("s", "t", 10.0, 20.0), edge("s", "t", 0.0, 5.0)],
    );
    let output = solve_input(&input);
    let value = parsed(&output);

    assert_eq!(value["status"], "ok");
    let flows = value["flows"].as_array().unwrap();
    let first = flows[0]["flow"].as_f64().unwrap();
    let second = flows[1]["flow"].as_f64().unwrap();
    assert!((10.0..=20.0).contains(&first), "first edge carries {first}");
    assert!((0.0..=5.0).contains(&second), "second edge carries {second}");
    let total = value["max_flow_per_min"].as_f64().unwrap();
    assert!((10.0..=25.0).contains(&total), "total flow {total}");

    assert_belts_invariants(&input, &output);
}

// ===========================================================================
// Test 3: infeasible lower bound
// ===========================================================================

#[test]
fn lower_bound_beyond_source_capacity_is_infeasible() {
    let input = network(
        &[("s", Some(50.0))],
        &["t"],
        &[],
        &[edge("s", "t", 100.0, 200.0)],
    );
    let output = solve_input(&input);
    let value = parsed(&output);

    assert_eq!(value["status"], "infeasible");
    let certificate = &value["certificate"];
    assert!(certificate["demand_balance"].as_f64().unwrap() >= 50.0);
    assert_eq!(
        certificate["tight_edges"],
        serde_json::json!([{"from": "s", "to": "t"}])
    );
    assert_eq!(certificate["cut_reachable"], serde_json::json!(["t"]));
}

// ===========================================================================
// Node capacity bottleneck
// ===========================================================================

#[test]
fn node_capacity_shortfall_names_the_tight_node() {
    let input = network(
        &[("s", Some(1500.0))],
        &["t"],
        &[("a", Some(1000.0))],
        &[edge("s", "a", 0.0, 2000.0), edge("a", "t", 0.0, 2000.0)],
    );
    let output = solve_input(&input);
    let value = parsed(&output);

    assert_eq!(value["status"], "infeasible");
    let certificate = &value["certificate"];
    assert_eq!(certificate["demand_balance"].as_f64().unwrap(), 500.0);
    assert_eq!(certificate["tight_nodes"], serde_json::json!(["a"]));
    assert_eq!(certificate["cut_reachable"], serde_json::json!(["a", "s"]));
}

// ===========================================================================
// Determinism and symmetry
// ===========================================================================

#[test]
fn repeat_runs_are_byte_identical() {
    let input = layered_network(3, 3, 50.0);
    assert_eq!(solve_input(&input), solve_input(&input));
}

#[test]
fn reversed_network_has_the_same_max_flow() {
    let input = network(
        &[("s", None)],
        &["t"],
        &[("mid", Some(35.0))],
        &[
            edge("s", "mid", 0.0, 60.0),
            edge("mid", "t", 0.0, 60.0),
            edge("s", "t", 0.0, 10.0),
        ],
    );
    let forward = parsed(&solve_input(&input));
    let backward = parsed(&solve_input(&reversed(&input)));
    assert_eq!(forward["status"], "ok");
    assert_eq!(
        forward["max_flow_per_min"].as_f64().unwrap(),
        backward["max_flow_per_min"].as_f64().unwrap()
    );
}

#[test]
fn layered_network_satisfies_invariants() {
    let input = layered_network(4, 3, 75.0);
    let output = solve_input(&input);
    let value = parsed(&output);
    assert_eq!(value["status"], "ok");
    // Each lane of the last rank feeds the sink at its node capacity.
    assert_eq!(value["max_flow_per_min"].as_f64().unwrap(), 225.0);
    assert_belts_invariants(&input, &output);
}

// ===========================================================================
// Lower bounds through interior structure
// ===========================================================================

#[test]
fn chained_lower_bounds_stay_within_bounds() {
    let input = network(
        &[("s", None)],
        &["t"],
        &[("mid", Some(30.0))],
        &[
            edge("s", "mid", 5.0, 25.0),
            edge("mid", "t", 10.0, 25.0),
            edge("s", "t", 0.0, 40.0),
        ],
    );
    let output = solve_input(&input);
    let value = parsed(&output);
    assert_eq!(value["status"], "ok");
    assert_belts_invariants(&input, &output);

    let mid_in = flow_of(&value, "s", "mid");
    let mid_out = flow_of(&value, "mid", "t");
    assert!((mid_in - mid_out).abs() < 1e-6);
    assert!(mid_out >= 10.0 - 1e-6);
}

// ===========================================================================
// Error paths
// ===========================================================================

#[test]
fn garbage_input_is_a_json_error() {
    assert!(matches!(solve_json("]["), Err(BeltsError::Json(_))));
}

#[test]
fn inverted_bounds_are_malformed() {
    let json = r#"{
        "sources": [{"id": "s", "capacity": null}],
        "sinks": ["t"],
        "nodes": [],
        "edges": [{"from": "s", "to": "t", "lo": 9.0, "hi": 3.0}]
    }"#;
    assert!(matches!(solve_json(json), Err(BeltsError::BadBounds { .. })));
}

#[test]
fn missing_sinks_are_malformed() {
    let json = r#"{
        "sources": [{"id": "s", "capacity": null}],
        "sinks": [],
        "nodes": [],
        "edges": []
    }"#;
    assert!(matches!(solve_json(json), Err(BeltsError::NoSinks)));
}

#[test]
fn empty_edge_endpoint_is_malformed() {
    let json = r#"{
        "sources": [{"id": "s", "capacity": null}],
        "sinks": ["t"],
        "nodes": [],
        "edges": [{"from": "", "to": "t", "lo": 0.0, "hi": 3.0}]
    }"#;
    assert!(matches!(
        solve_json(json),
        Err(BeltsError::EmptyNodeId { index: 0 })
    ));
}
