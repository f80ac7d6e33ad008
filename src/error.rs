use std::fmt;

use thiserror::Error;

use crate::graph::{EdgeId, NodeId};

/// Which end of an edge an anchor belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnchorEnd {
    Start,
    End,
}

impl fmt::Display for AnchorEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorEnd::Start => f.write_str("start"),
            AnchorEnd::End => f.write_str("end"),
        }
    }
}

/// Every variant is recoverable: the caller either keeps the previous path or
/// continues with degraded input.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("{end} anchor is unavailable; keeping the previous path")]
    MissingAnchor { end: AnchorEnd },

    #[error("node {node} has no bounding box and was left out of the obstacle set")]
    MissingObstacleData { node: NodeId },

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("unknown edge {0}")]
    UnknownEdge(EdgeId),

    #[error("invalid routing configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to serialize routing trace: {0}")]
    TraceSerialization(#[from] serde_json::Error),

    #[error("failed to install tracing subscriber: {0}")]
    TracingInit(String),
}

impl RoutingError {
    /// True when the host should leave the edge's current path untouched.
    pub fn keeps_previous_path(&self) -> bool {
        matches!(self, RoutingError::MissingAnchor { .. })
    }
}
