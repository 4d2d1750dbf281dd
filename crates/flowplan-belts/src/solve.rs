//! Two-phase solve, certificate extraction, and flow reconstruction.

use crate::error::BeltsError;
use crate::graph::FlowNodeId;
use crate::problem::{BeltsProblem, Role};
use crate::schema::{BeltsOutput, Certificate, FlowEntry, TightEdge};
use crate::transform::{self, Network};
use flowplan_core::numeric::{round6, EPS_BALANCE, EPS_RESIDUAL};
use slotmap::SecondaryMap;
use std::collections::{BTreeMap, BTreeSet};

/// Solve one validated belts problem.
pub fn solve_problem(problem: &BeltsProblem) -> Result<BeltsOutput, BeltsError> {
    let mut net = transform::build(problem);

    // Phase 1: satisfy lower-bound demands by circulation through T → S.
    if net.total_demand > EPS_RESIDUAL {
        let routed = net.graph.max_flow(net.aux_source, net.aux_sink);
        log::debug!(
            "feasibility phase routed {routed} of {} demand",
            net.total_demand
        );
        let shortfall: f64 = net
            .demand_arcs
            .iter()
            .map(|&(_, arc)| net.graph.arc(arc).residual)
            .filter(|residual| *residual > EPS_BALANCE)
            .sum();
        if shortfall > EPS_BALANCE {
            return Ok(BeltsOutput::Infeasible {
                certificate: phase1_certificate(problem, &net, shortfall),
            });
        }
    }

    // Phase 2: real max flow with the auxiliary structure retired. The
    // phase-1 flow stays in place; augmentation only ever improves on it.
    net.graph.disable(net.circulation);
    let aux_arcs = net.aux_arcs.clone();
    for arc in aux_arcs {
        net.graph.disable(arc);
    }
    net.graph.max_flow(net.main_source, net.main_sink);

    check_residuals(&net)?;
    let flows = reconstruct(problem, &net)?;
    let achieved = sink_inflow(problem, &flows);

    // With every source capacity declared, the full supply must be
    // routable; a shortfall is answered with the min-cut certificate.
    if problem.all_sources_capped() {
        let supply = problem.total_supply();
        if supply - achieved > EPS_BALANCE {
            return Ok(BeltsOutput::Infeasible {
                certificate: phase2_certificate(problem, &net, supply - achieved),
            });
        }
    }

    Ok(BeltsOutput::Ok {
        max_flow_per_min: round6(achieved),
        flows: flow_entries(problem, &flows),
    })
}

// ---------------------------------------------------------------------------
// Reconstruction
// ---------------------------------------------------------------------------

/// Per-edge flow in input order: lower bound added back onto the working
/// flow, clamped against rounding dust at the interval ends.
fn reconstruct(problem: &BeltsProblem, net: &Network) -> Result<Vec<f64>, BeltsError> {
    let mut flows = Vec::with_capacity(problem.edges.len());
    for (idx, edge) in problem.edges.iter().enumerate() {
        let residual = net.graph.arc(net.edge_arcs[idx]).residual;
        let sent = (edge.hi - edge.lo) - residual;
        flows.push((sent + edge.lo).clamp(edge.lo, edge.hi));
    }

    // Conservation must hold at every interior node before rounding.
    let mut balance: BTreeMap<&str, f64> = BTreeMap::new();
    for (idx, edge) in problem.edges.iter().enumerate() {
        *balance.entry(edge.from.as_str()).or_default() -= flows[idx];
        *balance.entry(edge.to.as_str()).or_default() += flows[idx];
    }
    for (id, imbalance) in balance {
        if problem.role(id) == Role::Interior && imbalance.abs() > EPS_BALANCE {
            return Err(BeltsError::ConservationViolated {
                node: id.to_string(),
                imbalance,
            });
        }
    }

    Ok(flows)
}

/// Net flow absorbed by the declared sinks.
fn sink_inflow(problem: &BeltsProblem, flows: &[f64]) -> f64 {
    let mut total = 0.0;
    for (idx, edge) in problem.edges.iter().enumerate() {
        if problem.sinks.contains(&edge.to) {
            total += flows[idx];
        }
        if problem.sinks.contains(&edge.from) {
            total -= flows[idx];
        }
    }
    total
}

/// One output entry per input edge, sorted by endpoints with input order
/// breaking ties between parallel edges.
fn flow_entries(problem: &BeltsProblem, flows: &[f64]) -> Vec<FlowEntry> {
    let mut order: Vec<usize> = (0..problem.edges.len()).collect();
    order.sort_by(|&a, &b| {
        let ea = &problem.edges[a];
        let eb = &problem.edges[b];
        (&ea.from, &ea.to).cmp(&(&eb.from, &eb.to))
    });
    order
        .into_iter()
        .map(|idx| FlowEntry {
            from: problem.edges[idx].from.clone(),
            to: problem.edges[idx].to.clone(),
            flow: round6(flows[idx]),
        })
        .collect()
}

/// Residuals can never legitimately go negative; a violation means the
/// kernel corrupted its own bookkeeping.
fn check_residuals(net: &Network) -> Result<(), BeltsError> {
    for (_, arc) in net.graph.arcs() {
        if arc.residual < -EPS_BALANCE {
            return Err(BeltsError::NegativeResidual {
                detail: format!(
                    "{:?} -> {:?} ({:?}, residual {})",
                    net.graph.node(arc.from),
                    net.graph.node(arc.to),
                    arc.kind,
                    arc.residual
                ),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Certificates
// ---------------------------------------------------------------------------

fn phase1_certificate(problem: &BeltsProblem, net: &Network, shortfall: f64) -> Certificate {
    let reachable = net.graph.residual_reachable(net.aux_source);

    // The residual cut cannot cross an edge whose own lower bound caused
    // the failure (its tail is outside the reachable set), so unmet demand
    // is also attributed back to the lower-bounded edges entering each
    // unmet node.
    let mut attributed = BTreeSet::new();
    for &(node, arc) in &net.demand_arcs {
        if net.graph.arc(arc).residual > EPS_BALANCE {
            for (idx, edge) in problem.edges.iter().enumerate() {
                if edge.lo > EPS_RESIDUAL && net.entry(&edge.to) == node {
                    attributed.insert(idx);
                }
            }
        }
    }

    build_certificate(problem, net, &reachable, &attributed, shortfall)
}

fn phase2_certificate(problem: &BeltsProblem, net: &Network, deficit: f64) -> Certificate {
    let reachable = net.graph.residual_reachable(net.main_source);
    build_certificate(problem, net, &reachable, &BTreeSet::new(), deficit)
}

fn build_certificate(
    problem: &BeltsProblem,
    net: &Network,
    reachable: &SecondaryMap<FlowNodeId, ()>,
    attributed: &BTreeSet<usize>,
    demand_balance: f64,
) -> Certificate {
    // Original nodes with any working half on the source side of the cut.
    let mut cut_reachable = BTreeSet::new();
    for (node_id, kind) in net.graph.nodes() {
        if reachable.contains_key(node_id) {
            if let Some(original) = kind.original() {
                cut_reachable.insert(original.to_string());
            }
        }
    }

    // Split nodes whose capacity arc crosses the cut.
    let mut tight_nodes = Vec::new();
    for (id, &cap_arc) in &net.cap_arcs {
        let arc = net.graph.arc(cap_arc);
        if reachable.contains_key(arc.from) && !reachable.contains_key(arc.to) {
            tight_nodes.push(id.clone());
        }
    }

    // Original edges crossing the cut, merged with the attributed set.
    let mut indices = attributed.clone();
    for (idx, &arc_id) in net.edge_arcs.iter().enumerate() {
        let arc = net.graph.arc(arc_id);
        if reachable.contains_key(arc.from) && !reachable.contains_key(arc.to) {
            indices.insert(idx);
        }
    }
    let tight_edges = indices
        .into_iter()
        .map(|idx| TightEdge {
            from: problem.edges[idx].from.clone(),
            to: problem.edges[idx].to.clone(),
        })
        .collect();

    Certificate {
        cut_reachable: cut_reachable.into_iter().collect(),
        tight_nodes,
        tight_edges,
        demand_balance: round6(demand_balance),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
