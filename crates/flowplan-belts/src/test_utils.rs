//! Shared test helpers: input builders, a layered-network generator, and
//! the invariant checker used by integration and property tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::schema::{BeltsInput, EdgeData, NodeData, SourceData};
use std::collections::BTreeMap;

// ===========================================================================
// Builders
// ===========================================================================

pub fn edge(from: &str, to: &str, lo: f64, hi: f64) -> EdgeData {
    EdgeData {
        from: from.to_string(),
        to: to.to_string(),
        lo,
        hi,
    }
}

pub fn network(
    sources: &[(&str, Option<f64>)],
    sinks: &[&str],
    nodes: &[(&str, Option<f64>)],
    edges: &[EdgeData],
) -> BeltsInput {
    BeltsInput {
        sources: sources
            .iter()
            .map(|(id, capacity)| SourceData {
                id: id.to_string(),
                capacity: *capacity,
            })
            .collect(),
        sinks: sinks.iter().map(|id| id.to_string()).collect(),
        nodes: nodes
            .iter()
            .map(|(id, capacity)| NodeData {
                id: id.to_string(),
                capacity: *capacity,
            })
            .collect(),
        edges: edges.to_vec(),
    }
}

// ===========================================================================
// Generators and transforms
// ===========================================================================

/// A layered network: one uncapped source, `layers` ranks of `width` capped
/// nodes wired rank-to-rank, one sink. Deterministic in its parameters.
pub fn layered_network(layers: usize, width: usize, capacity: f64) -> BeltsInput {
    let node_id = |layer: usize, lane: usize| format!("n{layer}_{lane}");
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for layer in 0..layers {
        for lane in 0..width {
            nodes.push(NodeData {
                id: node_id(layer, lane),
                capacity: Some(capacity),
            });
        }
    }
    for lane in 0..width {
        edges.push(edge("src", &node_id(0, lane), 0.0, capacity));
    }
    for layer in 1..layers {
        for from_lane in 0..width {
            for to_lane in 0..width {
                edges.push(edge(
                    &node_id(layer - 1, from_lane),
                    &node_id(layer, to_lane),
                    0.0,
                    capacity,
                ));
            }
        }
    }
    for lane in 0..width {
        edges.push(edge(&node_id(layers - 1, lane), "dst", 0.0, capacity));
    }

    BeltsInput {
        sources: vec![SourceData {
            id: "src".to_string(),
            capacity: None,
        }],
        sinks: vec!["dst".to_string()],
        nodes,
        edges,
    }
}

/// Scale every bound and capacity by `k`.
pub fn scaled(input: &BeltsInput, k: f64) -> BeltsInput {
    BeltsInput {
        sources: input
            .sources
            .iter()
            .map(|s| SourceData {
                id: s.id.clone(),
                capacity: s.capacity.map(|c| c * k),
            })
            .collect(),
        sinks: input.sinks.clone(),
        nodes: input
            .nodes
            .iter()
            .map(|n| NodeData {
                id: n.id.clone(),
                capacity: n.capacity.map(|c| c * k),
            })
            .collect(),
        edges: input
            .edges
            .iter()
            .map(|e| EdgeData {
                from: e.from.clone(),
                to: e.to.clone(),
                lo: e.lo * k,
                hi: e.hi * k,
            })
            .collect(),
    }
}

/// Reverse every edge and swap source/sink roles (capacities dropped, so
/// only meaningful for networks without admission caps or lower bounds).
pub fn reversed(input: &BeltsInput) -> BeltsInput {
    BeltsInput {
        sources: input
            .sinks
            .iter()
            .map(|id| SourceData {
                id: id.clone(),
                capacity: None,
            })
            .collect(),
        sinks: input.sources.iter().map(|s| s.id.clone()).collect(),
        nodes: input.nodes.clone(),
        edges: input
            .edges
            .iter()
            .map(|e| EdgeData {
                from: e.to.clone(),
                to: e.from.clone(),
                lo: e.lo,
                hi: e.hi,
            })
            .collect(),
    }
}

// ===========================================================================
// Invariant checker
// ===========================================================================

/// Check a solved output document against the input's edge bounds,
/// conservation, and node-capacity invariants. Panics with a description on
/// violation. Only `status = "ok"` documents are checked.
pub fn assert_belts_invariants(input: &BeltsInput, output_json: &str) {
    let output: serde_json::Value = serde_json::from_str(output_json).expect("output parses");
    if output["status"] != "ok" {
        return;
    }

    let entries = output["flows"].as_array().expect("flows is an array");

    // Group output entries by endpoint pair; ties within a pair keep input
    // order, matching the emitter's sort.
    let mut grouped: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
    for entry in entries {
        let from = entry["from"].as_str().unwrap().to_string();
        let to = entry["to"].as_str().unwrap().to_string();
        let flow = entry["flow"].as_f64().unwrap();
        grouped.entry((from, to)).or_default().push(flow);
    }

    let mut per_edge_flow = Vec::with_capacity(input.edges.len());
    let mut seen: BTreeMap<(String, String), usize> = BTreeMap::new();
    for edge in &input.edges {
        let key = (edge.from.clone(), edge.to.clone());
        let rank = *seen.entry(key.clone()).and_modify(|r| *r += 1).or_insert(0);
        let flow = grouped
            .get(&key)
            .and_then(|flows| flows.get(rank))
            .copied()
            .unwrap_or_else(|| panic!("missing flow entry for {} -> {}", edge.from, edge.to));
        assert!(
            flow >= edge.lo - 1e-6 && flow <= edge.hi + 1e-6,
            "edge {} -> {} flow {flow} outside [{}, {}]",
            edge.from,
            edge.to,
            edge.lo,
            edge.hi
        );
        per_edge_flow.push(flow);
    }

    // Conservation at interior nodes; net absorption capped at sinks.
    let sources: Vec<&str> = input.sources.iter().map(|s| s.id.as_str()).collect();
    let sinks: Vec<&str> = input.sinks.iter().map(String::as_str).collect();
    let mut inflow: BTreeMap<&str, f64> = BTreeMap::new();
    let mut outflow: BTreeMap<&str, f64> = BTreeMap::new();
    for (idx, edge) in input.edges.iter().enumerate() {
        *outflow.entry(edge.from.as_str()).or_default() += per_edge_flow[idx];
        *inflow.entry(edge.to.as_str()).or_default() += per_edge_flow[idx];
    }

    let mut all_ids: Vec<&str> = inflow.keys().chain(outflow.keys()).copied().collect();
    all_ids.sort_unstable();
    all_ids.dedup();
    for id in all_ids {
        let balance = inflow.get(id).copied().unwrap_or(0.0) - outflow.get(id).copied().unwrap_or(0.0);
        if !sources.contains(&id) && !sinks.contains(&id) {
            assert!(
                balance.abs() <= 1e-6,
                "interior node '{id}' unbalanced by {balance}"
            );
        }
    }

    // Node capacities: throughput for interior nodes, net absorption for
    // sinks.
    for node in &input.nodes {
        if let Some(cap) = node.capacity {
            let id = node.id.as_str();
            let through = if sinks.contains(&id) {
                inflow.get(id).copied().unwrap_or(0.0) - outflow.get(id).copied().unwrap_or(0.0)
            } else {
                inflow.get(id).copied().unwrap_or(0.0)
            };
            assert!(
                through <= cap + 1e-6,
                "node '{id}' carries {through} over capacity {cap}"
            );
        }
    }
}
