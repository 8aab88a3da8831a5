use serde::{Deserialize, Serialize};

// node ids are positive, assigned 1..=n by the network builder
pub type NodeId = u64;

// index of a forwarding step within one transfer (0 = source)
pub type HopIndex = u64;

/// Energy charged to a node for each hop it forwards
pub const FORWARD_ENERGY_COST: f64 = 5.0;

/// Propagation speed of sound in water (distance units per second)
pub const SPEED_OF_SOUND: f64 = 1500.0;

/// Factor applied to a node's signal range on every handover escalation
pub const RANGE_ESCALATION_FACTOR: f64 = 1.5;

/// Handover only escalates while some node lies within this multiple of the current range
pub const HANDOVER_SEARCH_FACTOR: f64 = 2.0;

pub const DEFAULT_SIGNAL_RANGE: f64 = 20.0;
pub const DEFAULT_INITIAL_ENERGY: f64 = 100.0;
pub const DEFAULT_AREA_SIZE: f64 = 100.0;
pub const DEFAULT_PAYLOAD: &str = "Underwater Data";

#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance between two points
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// One recorded forwarding step
#[derive(Copy, Clone, PartialEq, Debug, Serialize)]
pub struct Hop {
    pub from: NodeId,
    pub to: NodeId,
    pub distance: f64,
}

impl Hop {
    pub fn sentinel(source: NodeId) -> Self {
        Self {
            from: source,
            to: source,
            distance: 0.0,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.from == self.to
    }

    /// Simulated time for the signal to cover this hop
    pub fn propagation_delay(&self) -> f64 {
        self.distance / SPEED_OF_SOUND
    }
}

/// Append-only record of the hops taken by one transfer.
///
/// Always starts with the `(source, source, 0)` sentinel.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct TransmissionPath {
    hops: Vec<Hop>,
}

impl TransmissionPath {
    pub fn new(source: NodeId) -> Self {
        Self {
            hops: vec![Hop::sentinel(source)],
        }
    }

    pub fn push(&mut self, hop: Hop) {
        self.hops.push(hop);
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// Hops excluding the leading sentinel
    pub fn forwarded(&self) -> &[Hop] {
        &self.hops[1..]
    }

    pub fn source(&self) -> NodeId {
        self.hops[0].from
    }

    /// Node currently holding the data
    pub fn last_node(&self) -> NodeId {
        self.hops[self.hops.len() - 1].to
    }

    pub fn hop_count(&self) -> usize {
        self.hops.len() - 1
    }

    /// True if `node` appears at either end of any recorded hop
    pub fn contains(&self, node: NodeId) -> bool {
        self.hops.iter().any(|h| h.from == node || h.to == node)
    }

    /// Number of hops forwarded by `node`
    pub fn forwards_by(&self, node: NodeId) -> usize {
        self.forwarded().iter().filter(|h| h.from == node).count()
    }

    pub fn total_distance(&self) -> f64 {
        self.hops.iter().map(|h| h.distance).sum()
    }
}

// ============================================================================
// Event Logging System
// ============================================================================

/// Events emitted by the forwarding engine for debugging and analysis
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Data handed to the next hop
    HopForwarded {
        to: NodeId,
        distance: f64,
        energy_left: f64,
    },
    /// Signal range enhanced during handover
    RangeEnhanced {
        step: usize,
        from_range: f64,
        to_range: f64,
    },
    /// Retried selection still had no hop inside the enhanced range
    HandoverRetry {
        step: usize,
        candidate: Option<NodeId>,
    },
    /// No unvisited node left within the handover search radius
    HandoverExhausted {
        range: f64,
    },
    /// Every candidate (destination included) was already visited
    NoCandidates,
    /// Data reached the destination
    Delivered {
        hops: usize,
    },
}

/// Trait for consuming events from the forwarding engine
pub trait EventSink {
    fn log(&mut self, step: HopIndex, node: NodeId, event: Event);
}

/// No-op event sink for production use (zero overhead)
pub struct NoOpSink;

impl EventSink for NoOpSink {
    #[inline(always)]
    fn log(&mut self, _step: HopIndex, _node: NodeId, _event: Event) {}
}

/// Event sink that forwards events to the `log` facade when enabled.
///
/// Hop progress is logged at `info`, stalls at `warn`.
#[derive(Debug, Default)]
pub struct LogSink {
    enabled: bool,
    logged: usize,
}

impl LogSink {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, logged: 0 }
    }

    /// Number of events written to the log so far
    pub fn logged(&self) -> usize {
        self.logged
    }
}

impl EventSink for LogSink {
    fn log(&mut self, step: HopIndex, node: NodeId, event: Event) {
        if !self.enabled {
            return;
        }
        self.logged += 1;

        match event {
            Event::HopForwarded {
                to,
                distance,
                energy_left,
            } => {
                log::info!(
                    "{} node {}: forwarding data to node {}. distance: {:.2} energy: {:.1}",
                    step,
                    node,
                    to,
                    distance,
                    energy_left
                );
            }
            Event::RangeEnhanced {
                step: escalation,
                from_range,
                to_range,
            } => {
                log::info!(
                    "{} node {}: handover #{} signal range {:.2} -> {:.2}",
                    step,
                    node,
                    escalation,
                    from_range,
                    to_range
                );
            }
            Event::HandoverRetry {
                step: escalation,
                candidate,
            } => {
                log::info!(
                    "{} node {}: handover #{} still out of range (candidate {:?})",
                    step,
                    node,
                    escalation,
                    candidate
                );
            }
            Event::HandoverExhausted { range } => {
                log::warn!(
                    "{} node {}: no nearby nodes for handover at range {:.2}, transfer stopped",
                    step,
                    node,
                    range
                );
            }
            Event::NoCandidates => {
                log::warn!(
                    "{} node {}: no available neighbors, transfer stopped",
                    step,
                    node
                );
            }
            Event::Delivered { hops } => {
                log::info!("{} node {}: data reached destination after {} hops", step, node, hops);
            }
        }
    }
}

/// Event sink that keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<(HopIndex, NodeId, Event)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn escalations(&self) -> usize {
        self.events
            .iter()
            .filter(|(_, _, e)| matches!(e, Event::RangeEnhanced { .. }))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn log(&mut self, step: HopIndex, node: NodeId, event: Event) {
        self.events.push((step, node, event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_sink_only_counts_when_enabled() {
        let events = [
            Event::HopForwarded { to: 2, distance: 10.0, energy_left: 95.0 },
            Event::RangeEnhanced { step: 1, from_range: 20.0, to_range: 30.0 },
            Event::Delivered { hops: 1 },
        ];

        let mut quiet = LogSink::new(false);
        let mut loud = LogSink::new(true);
        for (i, event) in events.iter().enumerate() {
            quiet.log(i as HopIndex, 1, event.clone());
            loud.log(i as HopIndex, 1, event.clone());
        }

        assert_eq!(quiet.logged(), 0);
        assert_eq!(loud.logged(), 3);
    }

    #[test]
    fn test_position_distance() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 12.0);
        assert_eq!(a.distance(&b), 13.0);
        assert_eq!(b.distance(&a), 13.0);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_path_starts_with_sentinel() {
        let path = TransmissionPath::new(7);
        assert_eq!(path.hops(), &[Hop::sentinel(7)]);
        assert!(path.hops()[0].is_sentinel());
        assert_eq!(path.hop_count(), 0);
        assert_eq!(path.last_node(), 7);
        assert!(path.forwarded().is_empty());
    }

    #[test]
    fn test_path_membership_and_forwards() {
        let mut path = TransmissionPath::new(1);
        path.push(Hop { from: 1, to: 4, distance: 10.0 });
        path.push(Hop { from: 4, to: 9, distance: 5.0 });

        assert!(path.contains(1));
        assert!(path.contains(4));
        assert!(path.contains(9));
        assert!(!path.contains(2));
        assert_eq!(path.forwards_by(1), 1);
        assert_eq!(path.forwards_by(9), 0);
        assert_eq!(path.last_node(), 9);
        assert_eq!(path.total_distance(), 15.0);
    }

    #[test]
    fn test_propagation_delay() {
        let hop = Hop { from: 1, to: 2, distance: 1500.0 };
        assert_eq!(hop.propagation_delay(), 1.0);
        assert_eq!(Hop::sentinel(1).propagation_delay(), 0.0);
    }

    #[test]
    fn test_recording_sink_counts_escalations() {
        let mut sink = RecordingSink::new();
        sink.log(0, 1, Event::RangeEnhanced { step: 1, from_range: 20.0, to_range: 30.0 });
        sink.log(0, 1, Event::HandoverRetry { step: 1, candidate: Some(3) });
        sink.log(0, 1, Event::RangeEnhanced { step: 2, from_range: 30.0, to_range: 45.0 });
        assert_eq!(sink.escalations(), 2);
        assert_eq!(sink.events.len(), 3);
    }
}
