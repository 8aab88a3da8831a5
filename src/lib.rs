//! # uwRust - Underwater Sensor Network Handover Simulation
//!
//! Simulates multi-hop data relay in an underwater acoustic sensor network.
//! Nodes forward a message from a source to a destination using greedy
//! geographic routing; when the chosen next hop is out of reach, the holding
//! node widens its own signal range (handover) and retries.
//!
//! ## Core Components
//!
//! - **UwNode**: position, signal range, energy and forwarding state of a node
//! - **UwNetwork**: node registry, symmetric neighbor relation, next-hop selection
//! - **Handover engine**: per-node forward/escalate state machine (`uw_handover::forward`)
//! - **Simulation driver**: `run_transfer` over a network, `run_phase` over a fresh random one
//!
//! ## Usage
//!
//! ```no_run
//! use uw_rust::{run_phase, resolve_seed, LogSink, SimulationConfig};
//!
//! let config = SimulationConfig::default();
//! let result = run_phase(150, 1, 42, &config, resolve_seed(None), &mut LogSink::new(true))?;
//!
//! for hop in result.transfer.path.forwarded() {
//!     println!("{} -> {} ({:.2})", hop.from, hop.to, hop.distance);
//! }
//! println!("remaining energy of active nodes: {:.2}", result.remaining_energy);
//! # Ok::<(), uw_rust::UwError>(())
//! ```
//!
//! ## Simulation
//!
//! Batch runs over several network sizes live in the separate `simulator/`
//! directory (`scenario_runner` binary and the `phase_sim` example).

pub mod uw_error;
pub mod uw_handover;
pub mod uw_interface;
pub mod uw_network;
pub mod uw_node;
pub mod uw_simulation;

// Re-export commonly used types
pub use uw_error::UwError;
pub use uw_handover::{forward, ForwardOutcome, ForwardState, HandoverConfig, StallReason};
pub use uw_interface::{
    Event, EventSink, Hop, HopIndex, LogSink, NoOpSink, NodeId, Position, RecordingSink,
    TransmissionPath,
};
pub use uw_network::UwNetwork;
pub use uw_node::{NodeRole, NodeSnapshot, UwNode};
pub use uw_simulation::{
    resolve_seed, run_phase, run_transfer, validate_endpoints, PhaseResult, SimulationConfig,
    TransferReport, TransferStatus,
};
