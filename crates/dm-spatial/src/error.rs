//! Spatial-subsystem error type.

use thiserror::Error;

use dm_core::NodeId;

/// Errors produced by `dm-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("road network has no nodes")]
    EmptyNetwork,
}

pub type SpatialResult<T> = Result<T, SpatialError>;
