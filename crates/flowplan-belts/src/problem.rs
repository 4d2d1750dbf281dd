//! Validated problem model for the belts engine.
//!
//! Node roles are fixed at load: declared sources, declared sinks, and
//! everything else interior. Edge endpoints that appear in no declaration
//! are interior and uncapped, so sparse inputs stay legal.

use crate::error::BeltsError;
use crate::schema::BeltsInput;
use std::collections::{BTreeMap, BTreeSet};

/// One original edge, input order preserved.
#[derive(Debug, Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub lo: f64,
    pub hi: f64,
}

/// Role of an original node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Source,
    Sink,
    Interior,
}

/// The immutable belts problem.
#[derive(Debug, Clone)]
pub struct BeltsProblem {
    /// Declared sources and their admission capacities (`None` = unlimited).
    pub sources: BTreeMap<String, Option<f64>>,
    /// Declared sinks.
    pub sinks: BTreeSet<String>,
    /// Declared node capacities. For interior nodes this caps throughput
    /// (via splitting); for sinks it caps the admission edge.
    pub caps: BTreeMap<String, f64>,
    /// Edges in input order.
    pub edges: Vec<Edge>,
}

impl BeltsProblem {
    /// Validate a deserialized input document into a problem model.
    pub fn from_input(input: BeltsInput) -> Result<Self, BeltsError> {
        let mut sources = BTreeMap::new();
        for source in input.sources {
            if source.id.is_empty() {
                return Err(BeltsError::EmptyDeclaredId("sources"));
            }
            if let Some(cap) = source.capacity {
                if !cap.is_finite() || cap < 0.0 {
                    return Err(BeltsError::BadSourceCapacity(source.id));
                }
            }
            if sources.insert(source.id.clone(), source.capacity).is_some() {
                return Err(BeltsError::DuplicateSource(source.id));
            }
        }
        if sources.is_empty() {
            return Err(BeltsError::NoSources);
        }

        let mut sinks = BTreeSet::new();
        for sink in input.sinks {
            if sink.is_empty() {
                return Err(BeltsError::EmptyDeclaredId("sinks"));
            }
            if sources.contains_key(&sink) {
                return Err(BeltsError::SourceIsSink(sink));
            }
            if !sinks.insert(sink.clone()) {
                return Err(BeltsError::DuplicateSink(sink));
            }
        }
        if sinks.is_empty() {
            return Err(BeltsError::NoSinks);
        }

        let mut caps = BTreeMap::new();
        let mut declared = BTreeSet::new();
        for node in input.nodes {
            if node.id.is_empty() {
                return Err(BeltsError::EmptyDeclaredId("nodes"));
            }
            if sources.contains_key(&node.id) {
                return Err(BeltsError::SourceRedeclared(node.id));
            }
            if !declared.insert(node.id.clone()) {
                return Err(BeltsError::DuplicateNode(node.id));
            }
            if let Some(cap) = node.capacity {
                if !cap.is_finite() || cap < 0.0 {
                    return Err(BeltsError::BadNodeCapacity(node.id));
                }
                caps.insert(node.id, cap);
            }
        }

        let mut edges = Vec::with_capacity(input.edges.len());
        for (index, edge) in input.edges.into_iter().enumerate() {
            if edge.from.is_empty() || edge.to.is_empty() {
                return Err(BeltsError::EmptyNodeId { index });
            }
            if !edge.lo.is_finite() || edge.lo < 0.0 {
                return Err(BeltsError::BadLowerBound {
                    from: edge.from,
                    to: edge.to,
                });
            }
            if !edge.hi.is_finite() || edge.hi < edge.lo {
                return Err(BeltsError::BadBounds {
                    from: edge.from,
                    to: edge.to,
                });
            }
            edges.push(Edge {
                from: edge.from,
                to: edge.to,
                lo: edge.lo,
                hi: edge.hi,
            });
        }

        Ok(Self {
            sources,
            sinks,
            caps,
            edges,
        })
    }

    pub fn role(&self, id: &str) -> Role {
        if self.sources.contains_key(id) {
            Role::Source
        } else if self.sinks.contains(id) {
            Role::Sink
        } else {
            Role::Interior
        }
    }

    /// Every node id referenced anywhere, sorted.
    pub fn all_node_ids(&self) -> BTreeSet<String> {
        let mut ids: BTreeSet<String> = self.sources.keys().cloned().collect();
        ids.extend(self.sinks.iter().cloned());
        ids.extend(self.caps.keys().cloned());
        for edge in &self.edges {
            ids.insert(edge.from.clone());
            ids.insert(edge.to.clone());
        }
        ids
    }

    /// Whether every declared source carries a finite admission capacity.
    pub fn all_sources_capped(&self) -> bool {
        self.sources.values().all(Option::is_some)
    }

    /// Aggregate declared supply; meaningful only when all sources are
    /// capped.
    pub fn total_supply(&self) -> f64 {
        self.sources.values().filter_map(|cap| *cap).sum()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
