// Simulation driver: one source -> destination transfer per network.
//
// `run_transfer` walks the forwarding engine hop by hop over an existing
// network. `run_phase` builds a fresh random network of a given size, runs
// one transfer over it and extracts the statistics the presentation layer
// consumes.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::uw_error::UwError;
use crate::uw_handover::{forward, ForwardOutcome, HandoverConfig, StallReason};
use crate::uw_interface::{
    EventSink, NodeId, TransmissionPath, DEFAULT_AREA_SIZE, DEFAULT_INITIAL_ENERGY,
    DEFAULT_PAYLOAD, DEFAULT_SIGNAL_RANGE,
};
use crate::uw_network::UwNetwork;
use crate::uw_node::NodeSnapshot;

/// Geometry, energy and timing parameters for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Side of the cube nodes are scattered in (default: 100.0)
    pub area_size: f64,

    /// Initial signal range of every node (default: 20.0)
    pub signal_range: f64,

    /// Initial energy of every node (default: 100.0)
    pub initial_energy: f64,

    /// Extra simulated seconds charged per hop on top of propagation
    pub transmission_delay: f64,

    /// Really sleep the propagation delay of every hop (demo pacing)
    pub pace_propagation: bool,

    /// Payload carried from source to destination
    pub payload: String,

    /// Escalation limits for the handover loop
    pub handover: HandoverConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            area_size: DEFAULT_AREA_SIZE,
            signal_range: DEFAULT_SIGNAL_RANGE,
            initial_energy: DEFAULT_INITIAL_ENERGY,
            transmission_delay: 0.0,
            pace_propagation: false,
            payload: DEFAULT_PAYLOAD.to_string(),
            handover: HandoverConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), UwError> {
        if !(self.area_size.is_finite() && self.area_size > 0.0) {
            return Err(UwError::InvalidConfig(format!(
                "area_size must be finite and positive, got {}",
                self.area_size
            )));
        }
        if !(self.signal_range.is_finite() && self.signal_range > 0.0) {
            return Err(UwError::InvalidConfig(format!(
                "signal_range must be finite and positive, got {}",
                self.signal_range
            )));
        }
        if !self.initial_energy.is_finite() {
            return Err(UwError::InvalidConfig(format!(
                "initial_energy must be finite, got {}",
                self.initial_energy
            )));
        }
        if !(self.transmission_delay.is_finite() && self.transmission_delay >= 0.0) {
            return Err(UwError::InvalidConfig(format!(
                "transmission_delay must be finite and non-negative, got {}",
                self.transmission_delay
            )));
        }
        Ok(())
    }
}

/// How a transfer ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransferStatus {
    Delivered,
    Stalled { at: NodeId, reason: StallReason },
}

/// Outcome of one source -> destination transfer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferReport {
    pub source: NodeId,
    pub destination: NodeId,
    pub payload: String,
    pub path: TransmissionPath,
    pub status: TransferStatus,
    /// Sum of per-hop propagation and transmission delays (seconds)
    pub simulated_time: f64,
}

impl TransferReport {
    pub fn delivered(&self) -> bool {
        self.status == TransferStatus::Delivered
    }

    /// Turn a stalled transfer into `UwError::NoRoute`
    pub fn ensure_delivered(&self) -> Result<(), UwError> {
        match self.status {
            TransferStatus::Delivered => Ok(()),
            TransferStatus::Stalled { at, reason } => Err(UwError::NoRoute {
                stalled_at: at,
                reason,
            }),
        }
    }
}

/// Check that both endpoints are valid ids in `[1, node_count]` and distinct
pub fn validate_endpoints(
    node_count: usize,
    source: NodeId,
    destination: NodeId,
) -> Result<(), UwError> {
    for node in [source, destination] {
        if node == 0 || node > node_count as NodeId {
            return Err(UwError::InvalidEndpoint {
                node,
                reason: format!("must be within 1..={}", node_count),
            });
        }
    }
    if source == destination {
        return Err(UwError::InvalidEndpoint {
            node: source,
            reason: "source and destination are the same node".to_string(),
        });
    }
    Ok(())
}

/// Forward the configured payload from `source` until it is delivered or stalls.
///
/// The returned path always starts with the `(source, source, 0)` sentinel;
/// a stalled transfer returns the partial path.
pub fn run_transfer<S: EventSink>(
    network: &mut UwNetwork,
    source: NodeId,
    destination: NodeId,
    config: &SimulationConfig,
    sink: &mut S,
) -> Result<TransferReport, UwError> {
    network.node(source)?;
    network.node(destination)?;
    if source == destination {
        return Err(UwError::InvalidEndpoint {
            node: source,
            reason: "source and destination are the same node".to_string(),
        });
    }

    let mut path = TransmissionPath::new(source);
    let mut simulated_time = 0.0;
    let mut current = source;

    let status = loop {
        match forward(network, current, destination, &mut path, &config.handover, sink)? {
            ForwardOutcome::Delivered => {
                info!(
                    "node {}: data reached destination - '{}'",
                    current, config.payload
                );
                break TransferStatus::Delivered;
            }
            ForwardOutcome::Forwarded(hop) => {
                let delay = hop.propagation_delay();
                simulated_time += delay + config.transmission_delay;
                if config.pace_propagation {
                    std::thread::sleep(Duration::from_secs_f64(delay));
                }
                debug!(
                    "node {} -> node {}: {:.2} units, {:.4}s",
                    hop.from, hop.to, hop.distance, delay
                );
                current = hop.to;
            }
            ForwardOutcome::Stalled(reason) => {
                warn!("node {}: data transfer stopped ({:?})", current, reason);
                break TransferStatus::Stalled {
                    at: current,
                    reason,
                };
            }
        }
    };

    Ok(TransferReport {
        source,
        destination,
        payload: config.payload.clone(),
        path,
        status,
        simulated_time,
    })
}

/// Statistics for one phase (one network size)
#[derive(Debug, Clone, Serialize)]
pub struct PhaseResult {
    pub node_count: usize,
    /// Wall-clock time spent in the transfer (diagnostic only)
    pub elapsed: Duration,
    /// Summed remaining energy of visited nodes other than source and destination
    pub remaining_energy: f64,
    /// Remaining energy per visited intermediate node, in id order
    pub active_nodes: Vec<(NodeId, f64)>,
    pub transfer: TransferReport,
    pub nodes: Vec<NodeSnapshot>,
}

impl PhaseResult {
    pub fn active_node_count(&self) -> usize {
        self.active_nodes.len()
    }
}

/// Build a random network of `node_count` nodes and run one transfer over it.
///
/// The network is a complete graph plus the forced source-destination edge;
/// node placement is drawn from `seed`.
pub fn run_phase<S: EventSink>(
    node_count: usize,
    source: NodeId,
    destination: NodeId,
    config: &SimulationConfig,
    seed: [u8; 32],
    sink: &mut S,
) -> Result<PhaseResult, UwError> {
    config.validate()?;
    validate_endpoints(node_count, source, destination)?;

    let mut rng = StdRng::from_seed(seed);
    let mut network = UwNetwork::scatter(
        &mut rng,
        node_count,
        config.area_size,
        config.signal_range,
        config.initial_energy,
    )?;
    network.connect_all();

    info!("running simulation for {} nodes", node_count);
    let start = Instant::now();

    network.add_edge(source, destination)?;
    let transfer = run_transfer(&mut network, source, destination, config, sink)?;

    let elapsed = start.elapsed();
    info!(
        "{} nodes: {} hops in {:?} (simulated {:.4}s)",
        node_count,
        transfer.path.hop_count(),
        elapsed,
        transfer.simulated_time
    );

    let active_nodes = network.visited_intermediates(source, destination);
    for (id, energy) in &active_nodes {
        debug!("node {}: energy level {:.2}", id, energy);
    }
    let remaining_energy: f64 = active_nodes.iter().map(|(_, energy)| energy).sum();
    if !active_nodes.is_empty() {
        info!("total energy of active nodes: {:.2}", remaining_energy);
    }

    Ok(PhaseResult {
        node_count,
        elapsed,
        remaining_energy,
        active_nodes,
        transfer,
        nodes: network.snapshot(source, destination),
    })
}

/// Resolve an optional seed, drawing one from entropy when absent
pub fn resolve_seed(seed: Option<[u8; 32]>) -> [u8; 32] {
    seed.unwrap_or_else(|| {
        let mut seed = [0u8; 32];
        StdRng::from_entropy().fill_bytes(&mut seed);
        seed
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uw_interface::{Hop, NoOpSink, Position, FORWARD_ENERGY_COST};

    fn line(positions: &[(NodeId, f64, f64)]) -> UwNetwork {
        let mut network = UwNetwork::new();
        for &(id, x, range) in positions {
            network
                .add_node(id, Position::new(x, 0.0, 0.0), range, 100.0)
                .unwrap();
        }
        network
    }

    #[test]
    fn test_two_node_direct_delivery() {
        let mut network = line(&[(1, 0.0, 20.0), (2, 10.0, 20.0)]);
        network.add_edge(1, 2).unwrap();

        let report = run_transfer(&mut network, 1, 2, &SimulationConfig::default(), &mut NoOpSink).unwrap();

        assert!(report.delivered());
        assert_eq!(
            report.path.hops(),
            &[Hop::sentinel(1), Hop { from: 1, to: 2, distance: 10.0 }]
        );
        assert_eq!(network.node(1).unwrap().energy(), 95.0);
        assert_eq!(network.node(2).unwrap().energy(), 100.0);
        assert!(!network.node(2).unwrap().is_visited());
        assert_eq!(report.simulated_time, 10.0 / 1500.0);
        assert!(report.ensure_delivered().is_ok());
    }

    #[test]
    fn test_bridge_node_relays() {
        // node 1 and node 3 are 30 apart; node 2 sits halfway and covers both
        let mut network = line(&[(1, 0.0, 20.0), (2, 15.0, 20.0), (3, 30.0, 20.0)]);
        network.connect_all();

        let report = run_transfer(&mut network, 1, 3, &SimulationConfig::default(), &mut NoOpSink).unwrap();

        assert!(report.delivered());
        assert_eq!(
            report.path.forwarded(),
            &[
                Hop { from: 1, to: 2, distance: 15.0 },
                Hop { from: 2, to: 3, distance: 15.0 }
            ]
        );
        let bridge = network.node(2).unwrap();
        assert!(bridge.is_visited());
        assert_eq!(bridge.energy(), 95.0);
        assert_eq!(network.visited_intermediates(1, 3), vec![(2, 95.0)]);
    }

    #[test]
    fn test_isolated_destination_returns_partial_path() {
        let mut network = line(&[(1, 0.0, 20.0), (2, 10.0, 20.0), (3, 300.0, 20.0)]);
        network.add_edge(1, 2).unwrap();

        let report = run_transfer(&mut network, 1, 3, &SimulationConfig::default(), &mut NoOpSink).unwrap();

        assert!(!report.delivered());
        assert!(report.path.last_node() != 3);
        assert!(matches!(
            report.status,
            TransferStatus::Stalled { reason: StallReason::HandoverExhausted, .. }
        ));
        assert!(matches!(report.ensure_delivered(), Err(UwError::NoRoute { .. })));
    }

    #[test]
    fn test_transfer_rejects_bad_endpoints() {
        let mut network = line(&[(1, 0.0, 20.0), (2, 10.0, 20.0)]);
        let config = SimulationConfig::default();

        assert_eq!(
            run_transfer(&mut network, 1, 5, &config, &mut NoOpSink),
            Err(UwError::UnknownNode(5))
        );
        assert!(matches!(
            run_transfer(&mut network, 1, 1, &config, &mut NoOpSink),
            Err(UwError::InvalidEndpoint { node: 1, .. })
        ));
    }

    #[test]
    fn test_validate_endpoints_range() {
        assert!(validate_endpoints(150, 1, 150).is_ok());
        assert!(validate_endpoints(150, 0, 10).is_err());
        assert!(validate_endpoints(150, 10, 151).is_err());
        assert!(validate_endpoints(150, 7, 7).is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        config.signal_range = 0.0;
        assert!(matches!(config.validate(), Err(UwError::InvalidConfig(_))));
    }

    #[test]
    fn test_non_finite_config_rejected() {
        for config in [
            SimulationConfig { area_size: f64::INFINITY, ..Default::default() },
            SimulationConfig { area_size: f64::NAN, ..Default::default() },
            SimulationConfig { signal_range: f64::INFINITY, ..Default::default() },
            SimulationConfig { initial_energy: f64::NAN, ..Default::default() },
            SimulationConfig { initial_energy: f64::NEG_INFINITY, ..Default::default() },
            SimulationConfig { transmission_delay: f64::INFINITY, ..Default::default() },
        ] {
            assert!(matches!(config.validate(), Err(UwError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_phase_with_infinite_area_is_an_error() {
        let config = SimulationConfig {
            area_size: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            run_phase(10, 1, 10, &config, [0u8; 32], &mut NoOpSink),
            Err(UwError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_transmission_delay_adds_to_simulated_time() {
        let mut network = line(&[(1, 0.0, 20.0), (2, 15.0, 20.0), (3, 30.0, 20.0)]);
        network.connect_all();
        let config = SimulationConfig {
            transmission_delay: 1.0,
            ..Default::default()
        };

        let report = run_transfer(&mut network, 1, 3, &config, &mut NoOpSink).unwrap();
        let expected = 2.0 * (15.0 / 1500.0 + 1.0);
        assert!((report.simulated_time - expected).abs() < 1e-12);
    }

    #[test]
    fn test_phase_energy_accounting() {
        let config = SimulationConfig::default();
        let result = run_phase(150, 1, 42, &config, [7u8; 32], &mut NoOpSink).unwrap();

        assert_eq!(result.node_count, 150);
        assert_eq!(result.nodes.len(), 150);
        assert_eq!(result.transfer.path.hops()[0], Hop::sentinel(1));

        // every forwarder paid exactly once per hop it sent
        for snapshot in &result.nodes {
            let forwards = result.transfer.path.forwards_by(snapshot.id);
            if snapshot.id != 42 {
                assert_eq!(
                    snapshot.energy,
                    config.initial_energy - FORWARD_ENERGY_COST * forwards as f64
                );
            }
            assert_eq!(snapshot.visited, forwards > 0);
            assert!(snapshot.signal_range >= config.signal_range);
        }

        let summed: f64 = result.active_nodes.iter().map(|(_, e)| e).sum();
        assert_eq!(result.remaining_energy, summed);
        assert!(result.active_nodes.iter().all(|(id, _)| *id != 1 && *id != 42));
    }

    #[test]
    fn test_phase_is_reproducible_for_a_seed() {
        let config = SimulationConfig::default();
        let a = run_phase(250, 3, 9, &config, [1u8; 32], &mut NoOpSink).unwrap();
        let b = run_phase(250, 3, 9, &config, [1u8; 32], &mut NoOpSink).unwrap();

        assert_eq!(a.transfer.path, b.transfer.path);
        assert_eq!(a.transfer.status, b.transfer.status);
        assert_eq!(a.nodes, b.nodes);
        assert_eq!(a.remaining_energy, b.remaining_energy);
    }

    #[test]
    fn test_phase_rejects_out_of_range_endpoints() {
        let config = SimulationConfig::default();
        assert!(matches!(
            run_phase(10, 1, 11, &config, [0u8; 32], &mut NoOpSink),
            Err(UwError::InvalidEndpoint { node: 11, .. })
        ));
    }

    #[test]
    fn test_resolve_seed_keeps_explicit_seed() {
        assert_eq!(resolve_seed(Some([9u8; 32])), [9u8; 32]);
    }
}
