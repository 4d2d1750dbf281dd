//! Serde mirrors of the belts JSON surface.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Top-level belts problem document.
#[derive(Debug, Clone, Deserialize)]
pub struct BeltsInput {
    #[serde(default)]
    pub sources: Vec<SourceData>,
    #[serde(default)]
    pub sinks: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<NodeData>,
    #[serde(default)]
    pub edges: Vec<EdgeData>,
}

/// A declared source with an optional admission capacity.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceData {
    pub id: String,
    #[serde(default)]
    pub capacity: Option<f64>,
}

/// A declared node with an optional throughput capacity.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeData {
    pub id: String,
    #[serde(default)]
    pub capacity: Option<f64>,
}

/// A directed edge with lower and upper flow bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeData {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub lo: f64,
    pub hi: f64,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// The belts result document.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BeltsOutput {
    Ok {
        max_flow_per_min: f64,
        flows: Vec<FlowEntry>,
    },
    Infeasible {
        certificate: Certificate,
    },
}

/// Flow assigned to one original edge.
#[derive(Debug, Clone, Serialize)]
pub struct FlowEntry {
    pub from: String,
    pub to: String,
    pub flow: f64,
}

/// Proof of infeasibility: the residual-reachable side of the cut and the
/// saturated structure crossing it.
#[derive(Debug, Clone, Serialize)]
pub struct Certificate {
    pub cut_reachable: Vec<String>,
    pub tight_nodes: Vec<String>,
    pub tight_edges: Vec<TightEdge>,
    pub demand_balance: f64,
}

/// An original edge pinned by the cut.
#[derive(Debug, Clone, Serialize)]
pub struct TightEdge {
    pub from: String,
    pub to: String,
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_from_json() {
        let json = r#"{
            "sources": [{"id": "s1", "capacity": 900}, {"id": "s2", "capacity": null}],
            "sinks": ["t"],
            "nodes": [{"id": "a", "capacity": 600}],
            "edges": [{"from": "s1", "to": "a", "lo": 10, "hi": 20}]
        }"#;
        let input: BeltsInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.sources.len(), 2);
        assert_eq!(input.sources[0].capacity, Some(900.0));
        assert_eq!(input.sources[1].capacity, None);
        assert_eq!(input.sinks, vec!["t"]);
        assert_eq!(input.nodes[0].capacity, Some(600.0));
        assert_eq!(input.edges[0].lo, 10.0);
        assert_eq!(input.edges[0].hi, 20.0);
    }

    #[test]
    fn lower_bound_defaults_to_zero() {
        let json = r#"{"from": "a", "to": "b", "hi": 5}"#;
        let edge: EdgeData = serde_json::from_str(json).unwrap();
        assert_eq!(edge.lo, 0.0);
    }

    #[test]
    fn nodes_list_defaults_to_empty() {
        let json = r#"{
            "sources": [{"id": "s"}],
            "sinks": ["t"],
            "edges": [{"from": "s", "to": "t", "hi": 5}]
        }"#;
        let input: BeltsInput = serde_json::from_str(json).unwrap();
        assert!(input.nodes.is_empty());
    }

    #[test]
    fn ok_output_puts_status_first() {
        let output = BeltsOutput::Ok {
            max_flow_per_min: 1500.0,
            flows: vec![FlowEntry {
                from: "a".into(),
                to: "b".into(),
                flow: 900.0,
            }],
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.starts_with(r#"{"status":"ok""#));
        assert!(json.contains(r#""flows":[{"from":"a","to":"b","flow":900.0}]"#));
    }

    #[test]
    fn infeasible_output_shape() {
        let output = BeltsOutput::Infeasible {
            certificate: Certificate {
                cut_reachable: vec!["t".into()],
                tight_nodes: vec![],
                tight_edges: vec![TightEdge {
                    from: "s".into(),
                    to: "t".into(),
                }],
                demand_balance: 50.0,
            },
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.starts_with(r#"{"status":"infeasible""#));
        assert!(json.contains(r#""tight_edges":[{"from":"s","to":"t"}]"#));
        assert!(json.contains(r#""demand_balance":50.0"#));
    }
}
