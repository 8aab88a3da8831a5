use crate::uw_handover::StallReason;
use crate::uw_interface::NodeId;

/// Errors surfaced by the network model and the forwarding engine.
///
/// A stalled transfer is a normal outcome and is reported through
/// `TransferReport`; `NoRoute` only appears when a caller asks for
/// guaranteed delivery.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UwError {
    #[error("invalid endpoint {node}: {reason}")]
    InvalidEndpoint { node: NodeId, reason: String },

    #[error("node {0} not found")]
    UnknownNode(NodeId),

    #[error("node {0} already registered")]
    DuplicateNode(NodeId),

    #[error("no route: transfer stalled at node {stalled_at} ({reason:?})")]
    NoRoute {
        stalled_at: NodeId,
        reason: StallReason,
    },

    #[error("node {node} exceeded the escalation ceiling after {steps} steps (range {range:.2})")]
    UnboundedEscalation {
        node: NodeId,
        steps: usize,
        range: f64,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
