use std::collections::BTreeMap;

use rand::Rng;

use crate::uw_error::UwError;
use crate::uw_interface::{NodeId, Position, TransmissionPath, HANDOVER_SEARCH_FACTOR};
use crate::uw_node::{NodeRole, NodeSnapshot, UwNode};

/// Registry of nodes plus the symmetric neighbor relation.
///
/// The network is the sole owner of node state; the forwarding engine only
/// addresses nodes by id. Nodes are kept id-ordered so that every scan
/// (candidate selection, snapshots, statistics) is deterministic.
#[derive(Debug, Clone, Default)]
pub struct UwNetwork {
    nodes: BTreeMap<NodeId, UwNode>,
}

impl UwNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scatter `node_count` nodes uniformly in a cube of side `area_size`.
    ///
    /// Ids run `1..=node_count`; every node starts with the same range and
    /// energy. No edges are created.
    pub fn scatter<R: Rng>(
        rng: &mut R,
        node_count: usize,
        area_size: f64,
        signal_range: f64,
        initial_energy: f64,
    ) -> Result<Self, UwError> {
        if !(area_size.is_finite() && area_size > 0.0) {
            return Err(UwError::InvalidConfig(format!(
                "area size must be finite and positive, got {}",
                area_size
            )));
        }

        let mut network = Self::new();
        for id in 1..=node_count as NodeId {
            let position = Position::new(
                rng.gen_range(0.0..area_size),
                rng.gen_range(0.0..area_size),
                rng.gen_range(0.0..area_size),
            );
            network.add_node(id, position, signal_range, initial_energy)?;
        }
        Ok(network)
    }

    pub fn add_node(
        &mut self,
        id: NodeId,
        position: Position,
        signal_range: f64,
        initial_energy: f64,
    ) -> Result<(), UwError> {
        if id == 0 {
            return Err(UwError::InvalidConfig("node ids start at 1".to_string()));
        }
        if !(signal_range.is_finite() && signal_range > 0.0) {
            return Err(UwError::InvalidConfig(format!(
                "node {} signal range must be finite and positive, got {}",
                id, signal_range
            )));
        }
        if !initial_energy.is_finite() {
            return Err(UwError::InvalidConfig(format!(
                "node {} initial energy must be finite, got {}",
                id, initial_energy
            )));
        }
        if self.nodes.contains_key(&id) {
            return Err(UwError::DuplicateNode(id));
        }

        self.nodes
            .insert(id, UwNode::new(id, position, signal_range, initial_energy));
        Ok(())
    }

    /// Connect two nodes in both directions. Self-edges are ignored.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), UwError> {
        self.ensure_known(a)?;
        self.ensure_known(b)?;
        if a == b {
            return Ok(());
        }

        self.node_mut(a)?.add_neighbor(b);
        self.node_mut(b)?.add_neighbor(a);
        Ok(())
    }

    /// Disconnect two nodes in both directions, returning whether an edge existed
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> Result<bool, UwError> {
        self.ensure_known(a)?;
        self.ensure_known(b)?;

        let removed_ab = self.node_mut(a)?.remove_neighbor(b);
        let removed_ba = self.node_mut(b)?.remove_neighbor(a);
        Ok(removed_ab || removed_ba)
    }

    /// Complete graph over all registered nodes
    pub fn connect_all(&mut self) {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for node in self.nodes.values_mut() {
            let own = node.id();
            for &other in &ids {
                if other != own {
                    node.add_neighbor(other);
                }
            }
        }
    }

    pub fn node(&self, id: NodeId) -> Result<&UwNode, UwError> {
        self.nodes.get(&id).ok_or(UwError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut UwNode, UwError> {
        self.nodes.get_mut(&id).ok_or(UwError::UnknownNode(id))
    }

    fn ensure_known(&self, id: NodeId) -> Result<(), UwError> {
        self.node(id).map(|_| ())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in ascending id order
    pub fn nodes(&self) -> impl Iterator<Item = &UwNode> {
        self.nodes.values()
    }

    pub fn distance(&self, a: NodeId, b: NodeId) -> Result<f64, UwError> {
        Ok(self.node(a)?.distance_to(self.node(b)?))
    }

    pub fn edge_exists(&self, a: NodeId, b: NodeId) -> Result<bool, UwError> {
        Ok(self.node(a)?.neighbors().contains(&b))
    }

    /// Greedy next-hop choice for `from` heading to `destination`.
    ///
    /// Candidates are neighbors whose own range reaches back to `from`, plus
    /// the destination whether or not it is reachable. Visited nodes are
    /// dropped and the closest remaining candidate wins; candidates are
    /// scanned in ascending id order and only a strictly closer one replaces
    /// the current best, so ties go to the smallest id.
    pub fn choose_next_hop(
        &self,
        from: NodeId,
        destination: NodeId,
    ) -> Result<Option<NodeId>, UwError> {
        let node = self.node(from)?;
        self.ensure_known(destination)?;

        let mut candidates: Vec<NodeId> = Vec::with_capacity(node.neighbors().len() + 1);
        for &neighbor_id in node.neighbors() {
            if self.node(neighbor_id)?.is_in_range_of(node) {
                candidates.push(neighbor_id);
            }
        }
        candidates.push(destination);
        candidates.sort_unstable();
        candidates.dedup();

        let mut best: Option<(NodeId, f64)> = None;
        for id in candidates {
            let candidate = self.node(id)?;
            if candidate.is_visited() {
                continue;
            }
            let distance = node.distance_to(candidate);
            match best {
                Some((_, best_distance)) if best_distance <= distance => {}
                _ => best = Some((id, distance)),
            }
        }

        Ok(best.map(|(id, _)| id))
    }

    /// Nodes that justify another handover escalation from `from`:
    /// unvisited, not `from`, not already on `path`, and within
    /// `HANDOVER_SEARCH_FACTOR` times the current range.
    pub fn handover_candidates(
        &self,
        from: NodeId,
        path: &TransmissionPath,
    ) -> Result<Vec<NodeId>, UwError> {
        let node = self.node(from)?;
        let radius = node.signal_range() * HANDOVER_SEARCH_FACTOR;

        Ok(self
            .nodes
            .values()
            .filter(|other| other.id() != from)
            .filter(|other| !other.is_visited())
            .filter(|other| !path.contains(other.id()))
            .filter(|other| node.distance_to(other) <= radius)
            .map(|other| other.id())
            .collect())
    }

    /// Per-node state for the presentation layer, in id order
    pub fn snapshot(&self, source: NodeId, destination: NodeId) -> Vec<NodeSnapshot> {
        self.nodes
            .values()
            .map(|node| {
                let role = if node.id() == source {
                    NodeRole::Source
                } else if node.id() == destination {
                    NodeRole::Destination
                } else {
                    NodeRole::Intermediate
                };
                node.snapshot(role)
            })
            .collect()
    }

    /// Remaining energy of every visited node other than the two endpoints
    pub fn visited_intermediates(&self, source: NodeId, destination: NodeId) -> Vec<(NodeId, f64)> {
        self.nodes
            .values()
            .filter(|node| node.id() != source && node.id() != destination && node.is_visited())
            .map(|node| (node.id(), node.energy()))
            .collect()
    }
}
