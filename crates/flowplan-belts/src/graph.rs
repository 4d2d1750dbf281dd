//! The residual flow graph and the Edmonds–Karp kernel.
//!
//! Nodes and arcs live in `slotmap` arenas; adjacency is a `SecondaryMap`
//! keyed by node, following the same SoA layout as the rest of the
//! workspace. Every forward arc is paired with a zero-capacity reverse arc;
//! augmentation moves residual between the pair.
//!
//! Determinism: adjacency lists are sorted once (`seal`) by destination
//! identifier -- original nodes by name, split halves under their original's
//! name, virtual nodes last -- with insertion order breaking ties. BFS visits
//! arcs in exactly that order.

use flowplan_core::numeric::EPS_RESIDUAL;
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use std::collections::VecDeque;

new_key_type! {
    /// Identifies a working node in the flow graph.
    pub struct FlowNodeId;

    /// Identifies a directed residual arc.
    pub struct FlowArcId;
}

// ---------------------------------------------------------------------------
// Node and arc data
// ---------------------------------------------------------------------------

/// What a working node stands for; doubles as its adjacency sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An unsplit original node.
    Plain(String),
    /// Entry half of a split capacity node.
    SplitIn(String),
    /// Exit half of a split capacity node.
    SplitOut(String),
    /// Main virtual source (connects declared sources).
    MainSource,
    /// Main virtual sink (connects declared sinks).
    MainSink,
    /// Auxiliary source feeding lower-bound demands.
    AuxSource,
    /// Auxiliary sink draining lower-bound surpluses.
    AuxSink,
}

impl NodeKind {
    /// The original node this working node represents, if any.
    pub fn original(&self) -> Option<&str> {
        match self {
            NodeKind::Plain(id) | NodeKind::SplitIn(id) | NodeKind::SplitOut(id) => Some(id),
            _ => None,
        }
    }

    /// Stable total order: originals by identifier, virtuals after.
    fn sort_key(&self) -> (u8, &str) {
        match self {
            NodeKind::Plain(id) | NodeKind::SplitIn(id) | NodeKind::SplitOut(id) => {
                (0, id.as_str())
            }
            NodeKind::MainSource => (1, ""),
            NodeKind::MainSink => (2, ""),
            NodeKind::AuxSource => (3, ""),
            NodeKind::AuxSink => (4, ""),
        }
    }
}

/// Why a forward arc exists. Drives certificate attribution and flow
/// reconstruction after the solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcKind {
    /// Working arc of an input edge (index into the input edge list).
    Edge(usize),
    /// The `v_in → v_out` capacity arc of a split node.
    NodeCap,
    /// Main-source admission arc to a declared source.
    SourceAdmission,
    /// Declared sink's admission arc to the main sink.
    SinkAdmission,
    /// Aux-source demand arc (lower-bound satisfaction).
    Demand,
    /// Drain arc to the aux sink.
    Drain,
    /// The circulation arc from main sink back to main source.
    Circulation,
    /// Reverse half of any forward arc.
    Reverse,
}

/// One directed residual arc.
#[derive(Debug, Clone)]
pub struct Arc {
    pub from: FlowNodeId,
    pub to: FlowNodeId,
    /// Remaining capacity; decremented by augmentation.
    pub residual: f64,
    /// Built capacity (0 for reverse arcs).
    pub capacity: f64,
    /// The paired arc in the opposite direction.
    pub rev: FlowArcId,
    pub kind: ArcKind,
    /// Disabled arcs are invisible to BFS and reachability.
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// FlowGraph
// ---------------------------------------------------------------------------

/// A directed residual multigraph with paired reverse arcs.
#[derive(Debug, Default)]
pub struct FlowGraph {
    nodes: SlotMap<FlowNodeId, NodeKind>,
    arcs: SlotMap<FlowArcId, Arc>,
    adjacency: SecondaryMap<FlowNodeId, Vec<FlowArcId>>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, kind: NodeKind) -> FlowNodeId {
        let id = self.nodes.insert(kind);
        self.adjacency.insert(id, Vec::new());
        id
    }

    pub fn node(&self, id: FlowNodeId) -> &NodeKind {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (FlowNodeId, &NodeKind)> {
        self.nodes.iter()
    }

    pub fn arc(&self, id: FlowArcId) -> &Arc {
        &self.arcs[id]
    }

    pub fn arcs(&self) -> impl Iterator<Item = (FlowArcId, &Arc)> {
        self.arcs.iter()
    }

    /// Add a forward arc and its paired zero-capacity reverse.
    pub fn add_arc(
        &mut self,
        from: FlowNodeId,
        to: FlowNodeId,
        capacity: f64,
        kind: ArcKind,
    ) -> FlowArcId {
        let fwd = self.arcs.insert(Arc {
            from,
            to,
            residual: capacity,
            capacity,
            rev: FlowArcId::default(),
            kind,
            enabled: true,
        });
        let rev = self.arcs.insert(Arc {
            from: to,
            to: from,
            residual: 0.0,
            capacity: 0.0,
            rev: fwd,
            kind: ArcKind::Reverse,
            enabled: true,
        });
        self.arcs[fwd].rev = rev;
        self.adjacency[from].push(fwd);
        self.adjacency[to].push(rev);
        fwd
    }

    /// Flow currently on a forward arc.
    pub fn flow(&self, id: FlowArcId) -> f64 {
        let arc = &self.arcs[id];
        arc.capacity - arc.residual
    }

    /// Hide an arc (and its reverse) from BFS and reachability.
    pub fn disable(&mut self, id: FlowArcId) {
        let rev = self.arcs[id].rev;
        self.arcs[id].enabled = false;
        self.arcs[rev].enabled = false;
    }

    /// Sort every adjacency list into its deterministic visiting order.
    /// Call once, after all arcs are added.
    pub fn seal(&mut self) {
        let nodes = &self.nodes;
        let arcs = &self.arcs;
        for (_, list) in self.adjacency.iter_mut() {
            list.sort_by(|&a, &b| {
                nodes[arcs[a].to]
                    .sort_key()
                    .cmp(&nodes[arcs[b].to].sort_key())
            });
        }
    }

    // -----------------------------------------------------------------------
    // Edmonds–Karp
    // -----------------------------------------------------------------------

    /// Run max-flow from `source` to `sink`, mutating residuals in place.
    /// Returns the total augmented value.
    pub fn max_flow(&mut self, source: FlowNodeId, sink: FlowNodeId) -> f64 {
        let mut total = 0.0;
        let mut rounds = 0u64;
        let mut parent: SecondaryMap<FlowNodeId, FlowArcId> = SecondaryMap::new();

        loop {
            parent.clear();
            if !self.bfs(source, sink, &mut parent) {
                break;
            }

            // Bottleneck along the shortest path.
            let mut delta = f64::INFINITY;
            let mut node = sink;
            while node != source {
                let arc = &self.arcs[parent[node]];
                delta = delta.min(arc.residual);
                node = arc.from;
            }

            // Apply the exact delta to each residual/reverse pair.
            let mut node = sink;
            while node != source {
                let arc_id = parent[node];
                let rev = self.arcs[arc_id].rev;
                self.arcs[arc_id].residual -= delta;
                self.arcs[rev].residual += delta;
                node = self.arcs[arc_id].from;
            }

            total += delta;
            rounds += 1;
        }

        log::debug!("max-flow: {total} after {rounds} augmentations");
        total
    }

    /// Shortest-path BFS over usable residual arcs. Fills `parent` with the
    /// arc used to reach each visited node.
    fn bfs(
        &self,
        source: FlowNodeId,
        sink: FlowNodeId,
        parent: &mut SecondaryMap<FlowNodeId, FlowArcId>,
    ) -> bool {
        let mut visited: SecondaryMap<FlowNodeId, ()> = SecondaryMap::new();
        let mut queue = VecDeque::new();
        visited.insert(source, ());
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            for &arc_id in &self.adjacency[u] {
                let arc = &self.arcs[arc_id];
                if !arc.enabled || arc.residual <= EPS_RESIDUAL {
                    continue;
                }
                if visited.contains_key(arc.to) {
                    continue;
                }
                visited.insert(arc.to, ());
                parent.insert(arc.to, arc_id);
                if arc.to == sink {
                    return true;
                }
                queue.push_back(arc.to);
            }
        }
        false
    }

    /// A node's sorted adjacency (forward and reverse arcs).
    pub fn adjacency_of(&self, node: FlowNodeId) -> &[FlowArcId] {
        &self.adjacency[node]
    }

    /// Nodes reachable from `start` through usable residual arcs.
    pub fn residual_reachable(&self, start: FlowNodeId) -> SecondaryMap<FlowNodeId, ()> {
        let mut visited: SecondaryMap<FlowNodeId, ()> = SecondaryMap::new();
        let mut queue = VecDeque::new();
        visited.insert(start, ());
        queue.push_back(start);

        while let Some(u) = queue.pop_front() {
            for &arc_id in &self.adjacency[u] {
                let arc = &self.arcs[arc_id];
                if !arc.enabled || arc.residual <= EPS_RESIDUAL {
                    continue;
                }
                if visited.contains_key(arc.to) {
                    continue;
                }
                visited.insert(arc.to, ());
                queue.push_back(arc.to);
            }
        }
        visited
    }
}

// ===========================================================================
// Tests
// ===========================================================================
