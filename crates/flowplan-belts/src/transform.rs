//! Problem-to-network transformation.
//!
//! Three steps, applied in one deterministic pass:
//! 1. **Node splitting** -- each capacity-bounded interior node becomes an
//!    in/out pair joined by a capacity arc. Sources and sinks stay whole;
//!    their capacities apply to the admission arcs instead.
//! 2. **Lower-bound elimination** -- working capacity `hi - lo` per edge,
//!    with per-node excess accumulated for the demand/drain wiring.
//! 3. **Virtual wiring** -- main source/sink admissions, aux source/sink
//!    demand arcs, and the circulation arc that lets the feasibility phase
//!    route through the whole network.

use crate::graph::{ArcKind, FlowArcId, FlowGraph, FlowNodeId, NodeKind};
use crate::problem::{BeltsProblem, Role};
use flowplan_core::numeric::{EPS_RESIDUAL, UNBOUNDED};
use slotmap::SecondaryMap;
use std::collections::BTreeMap;

/// Working representation of one original node. Unsplit nodes have
/// `entry == exit`.
#[derive(Debug, Clone, Copy)]
pub struct WorkingNode {
    /// Where incoming edges land.
    pub entry: FlowNodeId,
    /// Where outgoing edges depart.
    pub exit: FlowNodeId,
}

/// The built network plus every handle the solver needs afterwards.
#[derive(Debug)]
pub struct Network {
    pub graph: FlowGraph,
    pub working: BTreeMap<String, WorkingNode>,

    pub main_source: FlowNodeId,
    pub main_sink: FlowNodeId,
    pub aux_source: FlowNodeId,
    pub aux_sink: FlowNodeId,

    /// The `T → S` arc enabling feasibility circulation.
    pub circulation: FlowArcId,
    /// Forward working arc per input edge, input order.
    pub edge_arcs: Vec<FlowArcId>,
    /// Capacity arc per split node.
    pub cap_arcs: BTreeMap<String, FlowArcId>,
    /// Demand arcs (`S* → n`), with the demanded working node.
    pub demand_arcs: Vec<(FlowNodeId, FlowArcId)>,
    /// Every aux-source/aux-sink arc, for retiring before phase 2.
    pub aux_arcs: Vec<FlowArcId>,
    /// Total demand capacity leaving the aux source.
    pub total_demand: f64,
}

impl Network {
    /// Entry half of an original node's working representation.
    pub fn entry(&self, id: &str) -> FlowNodeId {
        self.working[id].entry
    }

    /// Exit half of an original node's working representation.
    pub fn exit(&self, id: &str) -> FlowNodeId {
        self.working[id].exit
    }
}

/// Build the working network for one problem.
pub fn build(problem: &BeltsProblem) -> Network {
    let mut graph = FlowGraph::new();
    let mut working = BTreeMap::new();
    let mut cap_arcs = BTreeMap::new();

    // Working nodes in sorted identifier order; split halves are adjacent.
    for id in problem.all_node_ids() {
        let split = problem.role(&id) == Role::Interior && problem.caps.contains_key(&id);
        if split {
            let entry = graph.add_node(NodeKind::SplitIn(id.clone()));
            let exit = graph.add_node(NodeKind::SplitOut(id.clone()));
            let cap_arc = graph.add_arc(entry, exit, problem.caps[&id], ArcKind::NodeCap);
            cap_arcs.insert(id.clone(), cap_arc);
            working.insert(id, WorkingNode { entry, exit });
        } else {
            let node = graph.add_node(NodeKind::Plain(id.clone()));
            working.insert(
                id,
                WorkingNode {
                    entry: node,
                    exit: node,
                },
            );
        }
    }

    let main_source = graph.add_node(NodeKind::MainSource);
    let main_sink = graph.add_node(NodeKind::MainSink);
    let aux_source = graph.add_node(NodeKind::AuxSource);
    let aux_sink = graph.add_node(NodeKind::AuxSink);

    // Working edge arcs with lower bounds subtracted; excess accumulates on
    // the working endpoints.
    let mut excess: SecondaryMap<FlowNodeId, f64> = SecondaryMap::new();
    let mut edge_arcs = Vec::with_capacity(problem.edges.len());
    for (idx, edge) in problem.edges.iter().enumerate() {
        let tail = working[&edge.from].exit;
        let head = working[&edge.to].entry;
        let arc = graph.add_arc(tail, head, edge.hi - edge.lo, ArcKind::Edge(idx));
        edge_arcs.push(arc);
        *excess.entry(tail).unwrap().or_insert(0.0) -= edge.lo;
        *excess.entry(head).unwrap().or_insert(0.0) += edge.lo;
    }

    // Demand/drain wiring, iterated over the sorted working map so arc
    // insertion order is a function of the input alone.
    let mut demand_arcs = Vec::new();
    let mut aux_arcs = Vec::new();
    let mut total_demand = 0.0;
    for node in working.values() {
        let halves = if node.entry == node.exit {
            vec![node.entry]
        } else {
            vec![node.entry, node.exit]
        };
        for half in halves {
            let amount = excess.get(half).copied().unwrap_or(0.0);
            if amount > EPS_RESIDUAL {
                let arc = graph.add_arc(aux_source, half, amount, ArcKind::Demand);
                demand_arcs.push((half, arc));
                aux_arcs.push(arc);
                total_demand += amount;
            } else if amount < -EPS_RESIDUAL {
                let arc = graph.add_arc(half, aux_sink, -amount, ArcKind::Drain);
                aux_arcs.push(arc);
            }
        }
    }

    // Admission arcs. Source capacities come from the source declarations;
    // sink capacities, when declared in the nodes list, cap the admission.
    for (id, capacity) in &problem.sources {
        let cap = capacity.unwrap_or(UNBOUNDED);
        graph.add_arc(main_source, working[id].entry, cap, ArcKind::SourceAdmission);
    }
    for id in &problem.sinks {
        let cap = problem.caps.get(id).copied().unwrap_or(UNBOUNDED);
        graph.add_arc(working[id].exit, main_sink, cap, ArcKind::SinkAdmission);
    }

    let circulation = graph.add_arc(main_sink, main_source, UNBOUNDED, ArcKind::Circulation);

    graph.seal();
    log::debug!(
        "built network: {} working nodes, {} edges, demand {total_demand}",
        working.len(),
        edge_arcs.len(),
    );

    Network {
        graph,
        working,
        main_source,
        main_sink,
        aux_source,
        aux_sink,
        circulation,
        edge_arcs,
        cap_arcs,
        demand_arcs,
        aux_arcs,
        total_demand,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::BeltsProblem;
    use crate::test_utils::*;

    fn built(input: crate::schema::BeltsInput) -> (BeltsProblem, Network) {
        let problem = BeltsProblem::from_input(input).unwrap();
        let net = build(&problem);
        (problem, net)
    }

    #[test]
    fn capped_interior_node_is_split() {
        let (_, net) = built(network(
            &[("s", None)],
            &["t"],
            &[("mid", Some(100.0))],
            &[edge("s", "mid", 0.0, 50.0), edge("mid", "t", 0.0, 50.0)],
        ));
        let mid = &net.working["mid"];
        assert_ne!(mid.entry, mid.exit);
        let cap_arc = net.graph.arc(net.cap_arcs["mid"]);
        assert_eq!(cap_arc.capacity, 100.0);
        assert_eq!(cap_arc.from, mid.entry);
        assert_eq!(cap_arc.to, mid.exit);
    }

    #[test]
    fn sources_and_sinks_stay_whole() {
        // A capped sink is not split; the capacity rides its admission arc.
        let (_, net) = built(network(
            &[("s", Some(40.0))],
            &["t"],
            &[("t", Some(30.0))],
            &[edge("s", "t", 0.0, 50.0)],
        ));
        let s = &net.working["s"];
        let t = &net.working["t"];
        assert_eq!(s.entry, s.exit);
        assert_eq!(t.entry, t.exit);
        assert!(net.cap_arcs.is_empty());

        let admissions: Vec<(ArcKind, f64)> = net
            .graph
            .arcs()
            .filter(|(_, arc)| {
                matches!(arc.kind, ArcKind::SourceAdmission | ArcKind::SinkAdmission)
            })
            .map(|(_, arc)| (arc.kind, arc.capacity))
            .collect();
        assert!(admissions.contains(&(ArcKind::SourceAdmission, 40.0)));
        assert!(admissions.contains(&(ArcKind::SinkAdmission, 30.0)));
    }

    #[test]
    fn uncapped_source_gets_sentinel_admission() {
        let (_, net) = built(network(
            &[("s", None)],
            &["t"],
            &[],
            &[edge("s", "t", 0.0, 50.0)],
        ));
        let admission = net
            .graph
            .arcs()
            .find(|(_, arc)| arc.kind == ArcKind::SourceAdmission)
            .map(|(_, arc)| arc.capacity)
            .unwrap();
        assert_eq!(admission, UNBOUNDED);
    }

    #[test]
    fn lower_bounds_shrink_working_capacity() {
        let (_, net) = built(network(
            &[("s", None)],
            &["t"],
            &[],
            &[edge("s", "t", 10.0, 25.0)],
        ));
        assert_eq!(net.graph.arc(net.edge_arcs[0]).capacity, 15.0);
    }

    #[test]
    fn lower_bounds_create_demand_and_drain() {
        let (_, net) = built(network(
            &[("s", None)],
            &["t"],
            &[],
            &[edge("s", "mid", 10.0, 25.0), edge("mid", "t", 0.0, 25.0)],
        ));
        assert_eq!(net.total_demand, 10.0);
        assert_eq!(net.demand_arcs.len(), 1);
        // The demanded node is mid's entry, the drained node is s.
        let (demanded, demand_arc) = net.demand_arcs[0];
        assert_eq!(demanded, net.entry("mid"));
        assert_eq!(net.graph.arc(demand_arc).capacity, 10.0);
        assert_eq!(net.aux_arcs.len(), 2);
    }

    #[test]
    fn chained_lower_bounds_cancel_through_interior() {
        // lo=10 in and lo=10 out of mid leaves mid balanced; s supplies and
        // t demands.
        let (_, net) = built(network(
            &[("s", None)],
            &["t"],
            &[],
            &[edge("s", "mid", 10.0, 25.0), edge("mid", "t", 10.0, 25.0)],
        ));
        assert_eq!(net.total_demand, 10.0);
        let (demanded, _) = net.demand_arcs[0];
        assert_eq!(demanded, net.entry("t"));
    }

    #[test]
    fn self_loop_excess_cancels_on_unsplit_node() {
        let (_, net) = built(network(
            &[("s", None)],
            &["t"],
            &[],
            &[
                edge("s", "m", 0.0, 10.0),
                edge("m", "m", 2.0, 5.0),
                edge("m", "t", 0.0, 10.0),
            ],
        ));
        assert_eq!(net.total_demand, 0.0);
        assert!(net.demand_arcs.is_empty());
    }

    #[test]
    fn self_loop_on_split_node_routes_through_capacity_arc() {
        let (_, net) = built(network(
            &[("s", None)],
            &["t"],
            &[("m", Some(20.0))],
            &[
                edge("s", "m", 0.0, 10.0),
                edge("m", "m", 2.0, 5.0),
                edge("m", "t", 0.0, 10.0),
            ],
        ));
        // The loop runs m_out → m_in, so both halves carry excess.
        assert_eq!(net.total_demand, 2.0);
        let loop_arc = net.graph.arc(net.edge_arcs[1]);
        assert_eq!(loop_arc.from, net.exit("m"));
        assert_eq!(loop_arc.to, net.entry("m"));
    }

    #[test]
    fn edges_attach_to_split_halves() {
        let (_, net) = built(network(
            &[("s", None)],
            &["t"],
            &[("mid", Some(100.0))],
            &[edge("s", "mid", 0.0, 50.0), edge("mid", "t", 0.0, 50.0)],
        ));
        let inbound = net.graph.arc(net.edge_arcs[0]);
        let outbound = net.graph.arc(net.edge_arcs[1]);
        assert_eq!(inbound.to, net.entry("mid"));
        assert_eq!(outbound.from, net.exit("mid"));
    }
}
