//! Shared error type.
//!
//! Sub-crates define their own enums and wrap `DmError` as one variant where
//! they need to surface it.

use thiserror::Error;

use crate::{AgentId, PackageId};

/// Lookup failures shared by the sub-crates.
#[derive(Debug, Error)]
pub enum DmError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("package {0} not found")]
    PackageNotFound(PackageId),
}
