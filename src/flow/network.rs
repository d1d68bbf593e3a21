//! Flow network arena and builder.
//!
//! # Layout
//!
//! ```text
//! Source ─quota─▶ Doctor ─1─▶ DoctorShift ─1─▶ CabinetShift ─1─▶ Sink
//! ```
//!
//! Nodes live in an arena and are interned by value: the same [`FlowNode`]
//! always maps to the same [`NodeId`]. Every edge is stored as a pair of arcs
//! (forward with the edge capacity, reverse with zero residual) so flow can be
//! cancelled later.
//!
//! Eligibility is decided here and only here: a DoctorShift→CabinetShift edge
//! exists iff the doctor holds a specialization the cabinet accepts, the
//! location is in the doctor's preference list, and the slot is not blocked.
//! The solver never re-checks eligibility.

use std::collections::{BTreeSet, HashMap};

use crate::config::SolverConfig;
use crate::models::{CabinetCatalog, CabinetKey, CabinetSlot, DoctorProfile, ShiftSlot};

/// Index of a node in the arena.
pub type NodeId = usize;
/// Index of an arc in the arena.
pub type ArcId = usize;

/// Node identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlowNode {
    Source,
    Sink,
    Doctor(String),
    DoctorShift(String, ShiftSlot),
    CabinetShift(CabinetSlot),
}

/// Cost semantics of an arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArcKind {
    /// Structural arc with no cost of its own.
    Plain,
    /// DoctorShift→CabinetShift (forward) or its cancelling twin (reverse).
    Assign {
        /// Index into [`FlowNetwork::doctors`].
        doctor: usize,
        /// Index into [`FlowNetwork::cabinets`].
        cabinet: usize,
        /// The CabinetShift endpoint.
        cell: NodeId,
        /// Static preference cost of the doctor for the cabinet's location.
        preference: f64,
        /// `true` on the DoctorShift→CabinetShift direction.
        forward: bool,
    },
}

/// One direction of an edge.
#[derive(Debug, Clone)]
pub struct FlowArc {
    /// Head node.
    pub to: NodeId,
    /// Remaining capacity.
    pub residual: i64,
    /// The paired arc in the opposite direction.
    pub twin: ArcId,
    /// Cost semantics.
    pub kind: ArcKind,
}

/// Residual flow network for one solve.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    nodes: Vec<FlowNode>,
    index: HashMap<FlowNode, NodeId>,
    adjacency: Vec<Vec<ArcId>>,
    arcs: Vec<FlowArc>,
    edges: HashMap<(NodeId, NodeId), ArcId>,
    doctors: Vec<String>,
    doctor_index: HashMap<String, usize>,
    cabinets: Vec<CabinetKey>,
    cabinet_index: HashMap<CabinetKey, usize>,
    source_capacity: i64,
}

impl FlowNetwork {
    /// Creates a network holding only Source and Sink.
    pub fn new() -> Self {
        let mut net = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            adjacency: Vec::new(),
            arcs: Vec::new(),
            edges: HashMap::new(),
            doctors: Vec::new(),
            doctor_index: HashMap::new(),
            cabinets: Vec::new(),
            cabinet_index: HashMap::new(),
            source_capacity: 0,
        };
        net.add_node(FlowNode::Source);
        net.add_node(FlowNode::Sink);
        net
    }

    /// The Source node.
    #[inline]
    pub fn source(&self) -> NodeId {
        0
    }

    /// The Sink node.
    #[inline]
    pub fn sink(&self) -> NodeId {
        1
    }

    /// Interns a node, returning its id.
    pub fn add_node(&mut self, node: FlowNode) -> NodeId {
        if let Some(&id) = self.index.get(&node) {
            return id;
        }
        let id = self.nodes.len();
        match &node {
            FlowNode::Doctor(doctor) => {
                self.register_doctor(doctor);
            }
            FlowNode::CabinetShift(cell) => {
                self.register_cabinet(cell.key());
            }
            _ => {}
        }
        self.nodes.push(node.clone());
        self.index.insert(node, id);
        self.adjacency.push(Vec::new());
        id
    }

    /// Interns a Doctor node, returning it with the doctor's index into
    /// [`FlowNetwork::doctors`].
    pub fn add_doctor(&mut self, doctor: &str) -> (NodeId, usize) {
        let node = self.add_node(FlowNode::Doctor(doctor.to_string()));
        (node, self.register_doctor(doctor))
    }

    /// Adds an edge with its zero-residual twin.
    ///
    /// Edges are unique per ordered node pair: adding an existing edge
    /// returns the forward arc already in place.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, capacity: i64, kind: ArcKind) -> ArcId {
        if let Some(&existing) = self.edges.get(&(from, to)) {
            return existing;
        }
        let forward = self.arcs.len();
        let reverse = forward + 1;
        let reverse_kind = match kind {
            ArcKind::Plain => ArcKind::Plain,
            ArcKind::Assign {
                doctor,
                cabinet,
                cell,
                preference,
                ..
            } => ArcKind::Assign {
                doctor,
                cabinet,
                cell,
                preference,
                forward: false,
            },
        };
        self.arcs.push(FlowArc {
            to,
            residual: capacity,
            twin: reverse,
            kind,
        });
        self.arcs.push(FlowArc {
            to: from,
            residual: 0,
            twin: forward,
            kind: reverse_kind,
        });
        self.adjacency[from].push(forward);
        self.adjacency[to].push(reverse);
        self.edges.insert((from, to), forward);
        if from == self.source() {
            self.source_capacity += capacity;
        }
        forward
    }

    fn register_doctor(&mut self, doctor: &str) -> usize {
        if let Some(&i) = self.doctor_index.get(doctor) {
            return i;
        }
        let i = self.doctors.len();
        self.doctors.push(doctor.to_string());
        self.doctor_index.insert(doctor.to_string(), i);
        i
    }

    fn register_cabinet(&mut self, key: CabinetKey) -> usize {
        if let Some(&i) = self.cabinet_index.get(&key) {
            return i;
        }
        let i = self.cabinets.len();
        self.cabinets.push(key.clone());
        self.cabinet_index.insert(key, i);
        i
    }

    /// Looks up a node by identity.
    pub fn find(&self, node: &FlowNode) -> Option<NodeId> {
        self.index.get(node).copied()
    }

    /// Forward arc of the edge `from → to`, if one was added.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<ArcId> {
        self.edges.get(&(from, to)).copied()
    }

    /// Node identity for an id.
    pub fn node(&self, id: NodeId) -> &FlowNode {
        &self.nodes[id]
    }

    /// The cabinet slot of a CabinetShift node.
    pub fn cell(&self, id: NodeId) -> Option<&CabinetSlot> {
        match &self.nodes[id] {
            FlowNode::CabinetShift(cell) => Some(cell),
            _ => None,
        }
    }

    /// Arc by id.
    #[inline]
    pub fn arc(&self, id: ArcId) -> &FlowArc {
        &self.arcs[id]
    }

    /// All arcs.
    pub fn arcs(&self) -> &[FlowArc] {
        &self.arcs
    }

    /// Outgoing arcs (forward and reverse) of a node.
    #[inline]
    pub fn arcs_from(&self, node: NodeId) -> &[ArcId] {
        &self.adjacency[node]
    }

    /// Moves `amount` units across an arc, crediting its twin.
    pub fn push(&mut self, arc: ArcId, amount: i64) {
        self.arcs[arc].residual -= amount;
        let twin = self.arcs[arc].twin;
        self.arcs[twin].residual += amount;
    }

    /// Consumes capacity on an arc without crediting its twin.
    ///
    /// Flow forced this way can never be cancelled by a later search.
    pub fn consume(&mut self, arc: ArcId, amount: i64) {
        self.arcs[arc].residual -= amount;
    }

    /// Doctor ids in registration order.
    pub fn doctors(&self) -> &[String] {
        &self.doctors
    }

    /// Cabinets in registration order.
    pub fn cabinets(&self) -> &[CabinetKey] {
        &self.cabinets
    }

    /// Index of a doctor in [`FlowNetwork::doctors`].
    pub fn doctor_index(&self, doctor: &str) -> Option<usize> {
        self.doctor_index.get(doctor).copied()
    }

    /// Index of a cabinet in [`FlowNetwork::cabinets`].
    pub fn cabinet_index(&self, key: &CabinetKey) -> Option<usize> {
        self.cabinet_index.get(key).copied()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges (arc pairs).
    pub fn edge_count(&self) -> usize {
        self.arcs.len() / 2
    }

    /// Sum of Source→Doctor capacities; an upper bound on total flow.
    pub fn source_capacity(&self) -> i64 {
        self.source_capacity
    }

    /// CabinetShift nodes in arena order.
    pub fn cells(&self) -> impl Iterator<Item = &CabinetSlot> {
        self.nodes.iter().filter_map(|n| match n {
            FlowNode::CabinetShift(cell) => Some(cell),
            _ => None,
        })
    }
}

impl Default for FlowNetwork {
    fn default() -> Self {
        Self::new()
    }
}

/// One doctor's demand on the network for a single solve.
#[derive(Debug, Clone)]
pub struct DoctorDemand<'a> {
    /// Doctor profile.
    pub profile: &'a DoctorProfile,
    /// Source→Doctor capacity.
    pub quota: u32,
    /// Slots the doctor has no DoctorShift node for.
    pub blocked: BTreeSet<ShiftSlot>,
    /// If set, assignment edges are created only towards these cells.
    pub allowed: Option<BTreeSet<CabinetSlot>>,
    /// Cells the doctor always gets an assignment edge to, eligible or not.
    pub pinned: BTreeSet<CabinetSlot>,
}

impl<'a> DoctorDemand<'a> {
    /// Creates a demand with no blocked slots and no target restriction.
    pub fn new(profile: &'a DoctorProfile, quota: u32) -> Self {
        Self {
            profile,
            quota,
            blocked: BTreeSet::new(),
            allowed: None,
            pinned: BTreeSet::new(),
        }
    }

    /// Sets blocked slots.
    pub fn with_blocked(mut self, blocked: BTreeSet<ShiftSlot>) -> Self {
        self.blocked = blocked;
        self
    }

    /// Restricts assignment targets.
    pub fn with_allowed(mut self, allowed: BTreeSet<CabinetSlot>) -> Self {
        self.allowed = Some(allowed);
        self
    }

    /// Sets pinned cells.
    pub fn with_pinned(mut self, pinned: BTreeSet<CabinetSlot>) -> Self {
        self.pinned = pinned;
        self
    }
}

/// Builds the layered network for one week.
///
/// # Example
/// ```
/// use u_roster::config::SolverConfig;
/// use u_roster::flow::{DoctorDemand, NetworkBuilder};
/// use u_roster::models::{CabinetCatalog, DoctorProfile};
///
/// let catalog = CabinetCatalog::new().with_cabinets("North", "therapy", ["101"]);
/// let doctor = DoctorProfile::new("D1")
///     .with_specialization("therapy")
///     .with_preferred_location("North");
/// let config = SolverConfig::default();
///
/// let net = NetworkBuilder::new(&catalog, &config)
///     .with_demand(DoctorDemand::new(&doctor, 3))
///     .build();
/// // Source, Sink, 14 cabinet slots, 1 doctor, 14 doctor slots
/// assert_eq!(net.node_count(), 2 + 14 + 1 + 14);
/// assert_eq!(net.source_capacity(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct NetworkBuilder<'a> {
    catalog: &'a CabinetCatalog,
    config: &'a SolverConfig,
    restrict_to: Option<BTreeSet<CabinetSlot>>,
    demands: Vec<DoctorDemand<'a>>,
}

impl<'a> NetworkBuilder<'a> {
    /// Creates a builder over a catalog.
    pub fn new(catalog: &'a CabinetCatalog, config: &'a SolverConfig) -> Self {
        Self {
            catalog,
            config,
            restrict_to: None,
            demands: Vec::new(),
        }
    }

    /// Limits the cabinet layer to the given cells instead of the whole catalog.
    pub fn restrict_to(mut self, cells: BTreeSet<CabinetSlot>) -> Self {
        self.restrict_to = Some(cells);
        self
    }

    /// Adds a doctor.
    pub fn with_demand(mut self, demand: DoctorDemand<'a>) -> Self {
        self.demands.push(demand);
        self
    }

    /// Adds several doctors.
    pub fn with_demands<I: IntoIterator<Item = DoctorDemand<'a>>>(mut self, demands: I) -> Self {
        self.demands.extend(demands);
        self
    }

    /// Static preference cost for a zero-based rank.
    pub fn preference_cost(config: &SolverConfig, rank: usize) -> f64 {
        config.preference_base + config.preference_step * rank as f64
    }

    /// Builds the network.
    pub fn build(self) -> FlowNetwork {
        let mut net = FlowNetwork::new();
        let sink = net.sink();
        let source = net.source();

        let cells: Vec<CabinetSlot> = match &self.restrict_to {
            Some(cells) => cells.iter().cloned().collect(),
            None => self
                .catalog
                .cabinets()
                .into_iter()
                .flat_map(|key| ShiftSlot::all().map(move |slot| key.at(slot)))
                .collect(),
        };
        for cell in cells {
            let id = net.add_node(FlowNode::CabinetShift(cell));
            net.add_edge(id, sink, 1, ArcKind::Plain);
        }

        for demand in &self.demands {
            let profile = demand.profile;
            let (doctor_node, doctor) = net.add_doctor(&profile.id);
            net.add_edge(source, doctor_node, i64::from(demand.quota), ArcKind::Plain);

            let pinned_slots: BTreeSet<ShiftSlot> = demand.pinned.iter().map(|c| c.slot).collect();
            for slot in ShiftSlot::all() {
                if demand.blocked.contains(&slot) && !pinned_slots.contains(&slot) {
                    continue;
                }
                let shift = net.add_node(FlowNode::DoctorShift(profile.id.clone(), slot));
                net.add_edge(doctor_node, shift, 1, ArcKind::Plain);
            }

            for (rank, location) in profile.preferred_locations.iter().enumerate() {
                let preference = Self::preference_cost(self.config, rank);
                for specialization in &profile.specializations {
                    for cabinet in self.catalog.cabinets_for(location, specialization) {
                        for slot in ShiftSlot::all() {
                            if demand.blocked.contains(&slot) {
                                continue;
                            }
                            let cell = CabinetSlot::new(location.clone(), cabinet, slot);
                            if demand.allowed.as_ref().is_some_and(|a| !a.contains(&cell)) {
                                continue;
                            }
                            Self::link(&mut net, doctor, &profile.id, &cell, preference);
                        }
                    }
                }
            }

            for cell in &demand.pinned {
                let rank = profile
                    .preference_rank(&cell.location)
                    .unwrap_or(profile.preferred_locations.len());
                let preference = Self::preference_cost(self.config, rank);
                Self::link(&mut net, doctor, &profile.id, cell, preference);
            }
        }

        net
    }

    /// Adds a DoctorShift→CabinetShift edge when both endpoints exist.
    fn link(net: &mut FlowNetwork, doctor: usize, doctor_id: &str, cell: &CabinetSlot, preference: f64) {
        let Some(to) = net.find(&FlowNode::CabinetShift(cell.clone())) else {
            return;
        };
        let Some(from) = net.find(&FlowNode::DoctorShift(doctor_id.to_string(), cell.slot)) else {
            return;
        };
        let Some(cabinet) = net.cabinet_index(&cell.key()) else {
            return;
        };
        net.add_edge(
            from,
            to,
            1,
            ArcKind::Assign {
                doctor,
                cabinet,
                cell: to,
                preference,
                forward: true,
            },
        );
    }
}
