// Forwarding and handover engine
//
// A node holding the data either delivers it (it is the destination), hands
// it to the greedy next hop when that hop lies inside its own range, or
// enters the handover loop: widen its range by RANGE_ESCALATION_FACTOR and
// retry selection for as long as some unvisited node lies within
// HANDOVER_SEARCH_FACTOR times the current range. The loop is bounded by
// HandoverConfig and reports UnboundedEscalation when the ceiling is hit.

use serde::{Deserialize, Serialize};

use crate::uw_error::UwError;
use crate::uw_interface::{
    Event, EventSink, Hop, HopIndex, NodeId, TransmissionPath, RANGE_ESCALATION_FACTOR,
};
use crate::uw_network::UwNetwork;

/// Limits on handover escalation for a single node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandoverConfig {
    /// Maximum number of range escalations one node may perform (default: 32)
    pub max_escalations: usize,

    /// Optional hard ceiling on any node's signal range
    pub max_signal_range: Option<f64>,
}

impl Default for HandoverConfig {
    fn default() -> Self {
        Self {
            max_escalations: 32,
            max_signal_range: None,
        }
    }
}

/// Why a transfer stopped short of the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StallReason {
    /// Next-hop selection found nothing, not even the destination
    NoCandidates,
    /// No unvisited node within the handover search radius
    HandoverExhausted,
}

/// States of the per-node forwarding machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForwardState {
    Forwarding,
    Enhancing { escalations: usize },
    Delivered,
    Stalled(StallReason),
}

/// Result of running the machine at one node
#[derive(Debug, Clone, PartialEq)]
pub enum ForwardOutcome {
    Delivered,
    Forwarded(Hop),
    Stalled(StallReason),
}

/// Run the forward/handover state machine at `node`.
///
/// On a successful forward the hop is appended to `path`, the node is charged
/// and marked visited, and the hop is returned so the caller can continue at
/// `hop.to`.
pub fn forward<S: EventSink>(
    network: &mut UwNetwork,
    node: NodeId,
    destination: NodeId,
    path: &mut TransmissionPath,
    config: &HandoverConfig,
    sink: &mut S,
) -> Result<ForwardOutcome, UwError> {
    let step = path.hop_count() as HopIndex;
    let mut state = ForwardState::Forwarding;

    loop {
        state = match state {
            ForwardState::Forwarding => {
                if node == destination {
                    ForwardState::Delivered
                } else {
                    match network.choose_next_hop(node, destination)? {
                        None => {
                            sink.log(step, node, Event::NoCandidates);
                            ForwardState::Stalled(StallReason::NoCandidates)
                        }
                        Some(next) => {
                            if let Some(hop) = try_direct(network, node, next, path, sink, step)? {
                                return Ok(ForwardOutcome::Forwarded(hop));
                            }
                            ForwardState::Enhancing { escalations: 0 }
                        }
                    }
                }
            }

            ForwardState::Enhancing { escalations } => {
                let current_range = network.node(node)?.signal_range();

                if network.handover_candidates(node, path)?.is_empty() {
                    sink.log(step, node, Event::HandoverExhausted { range: current_range });
                    ForwardState::Stalled(StallReason::HandoverExhausted)
                } else {
                    let over_ceiling = config
                        .max_signal_range
                        .map_or(false, |max| current_range * RANGE_ESCALATION_FACTOR > max);
                    if escalations >= config.max_escalations || over_ceiling {
                        return Err(UwError::UnboundedEscalation {
                            node,
                            steps: escalations,
                            range: current_range,
                        });
                    }

                    let escalations = escalations + 1;
                    let enhanced = network.node_mut(node)?.enhance_range();
                    sink.log(
                        step,
                        node,
                        Event::RangeEnhanced {
                            step: escalations,
                            from_range: current_range,
                            to_range: enhanced,
                        },
                    );

                    let candidate = network.choose_next_hop(node, destination)?;
                    if let Some(next) = candidate {
                        if let Some(hop) = try_direct(network, node, next, path, sink, step)? {
                            return Ok(ForwardOutcome::Forwarded(hop));
                        }
                    }
                    sink.log(
                        step,
                        node,
                        Event::HandoverRetry {
                            step: escalations,
                            candidate,
                        },
                    );
                    ForwardState::Enhancing { escalations }
                }
            }

            ForwardState::Delivered => {
                sink.log(
                    step,
                    node,
                    Event::Delivered {
                        hops: path.hop_count(),
                    },
                );
                return Ok(ForwardOutcome::Delivered);
            }

            ForwardState::Stalled(reason) => return Ok(ForwardOutcome::Stalled(reason)),
        };
    }
}

/// Forward to `next` if it lies inside the sender's current range
fn try_direct<S: EventSink>(
    network: &mut UwNetwork,
    node: NodeId,
    next: NodeId,
    path: &mut TransmissionPath,
    sink: &mut S,
    step: HopIndex,
) -> Result<Option<Hop>, UwError> {
    let distance = network.distance(node, next)?;
    let sender = network.node_mut(node)?;
    if distance > sender.signal_range() {
        return Ok(None);
    }

    sender.record_forward();
    let energy_left = sender.energy();

    let hop = Hop {
        from: node,
        to: next,
        distance,
    };
    path.push(hop);
    sink.log(
        step,
        node,
        Event::HopForwarded {
            to: next,
            distance,
            energy_left,
        },
    );
    Ok(Some(hop))
}
