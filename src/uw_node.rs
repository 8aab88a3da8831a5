use hashbrown::HashSet;
use serde::Serialize;

use crate::uw_interface::{NodeId, Position, FORWARD_ENERGY_COST, RANGE_ESCALATION_FACTOR};

/// A sensor node in the underwater network.
///
/// Position and id are fixed for the lifetime of a run. The signal range only
/// ever grows (handover escalation) and energy is not clamped at zero.
#[derive(Debug, Clone)]
pub struct UwNode {
    id: NodeId,
    position: Position,
    signal_range: f64,
    energy: f64,
    visited: bool,
    neighbors: HashSet<NodeId>,
}

impl UwNode {
    pub fn new(id: NodeId, position: Position, signal_range: f64, initial_energy: f64) -> Self {
        Self {
            id,
            position,
            signal_range,
            energy: initial_energy,
            visited: false,
            neighbors: HashSet::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn signal_range(&self) -> f64 {
        self.signal_range
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn neighbors(&self) -> &HashSet<NodeId> {
        &self.neighbors
    }

    pub fn distance_to(&self, other: &UwNode) -> f64 {
        self.position.distance(&other.position)
    }

    /// True if this node's own range covers the distance to `other`.
    ///
    /// Reachability is one-directional: only `self.signal_range` matters.
    pub fn is_in_range_of(&self, other: &UwNode) -> bool {
        self.distance_to(other) <= self.signal_range
    }

    pub(crate) fn add_neighbor(&mut self, neighbor: NodeId) {
        self.neighbors.insert(neighbor);
    }

    pub(crate) fn remove_neighbor(&mut self, neighbor: NodeId) -> bool {
        self.neighbors.remove(&neighbor)
    }

    /// Multiply the signal range by the escalation factor, returning the new range
    pub(crate) fn enhance_range(&mut self) -> f64 {
        self.signal_range *= RANGE_ESCALATION_FACTOR;
        self.signal_range
    }

    /// Charge one forward and mark the node as having carried the data
    pub(crate) fn record_forward(&mut self) {
        self.energy -= FORWARD_ENERGY_COST;
        self.visited = true;
    }

    pub fn snapshot(&self, role: NodeRole) -> NodeSnapshot {
        NodeSnapshot {
            id: self.id,
            position: self.position,
            energy: self.energy,
            signal_range: self.signal_range,
            visited: self.visited,
            role,
        }
    }
}

/// Role of a node in one transfer, used when rendering the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeRole {
    Source,
    Destination,
    Intermediate,
}

/// Per-node state handed to the presentation layer after a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub position: Position,
    pub energy: f64,
    pub signal_range: f64,
    pub visited: bool,
    pub role: NodeRole,
}
