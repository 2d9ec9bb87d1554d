use dm_comm::CommError;
use dm_core::{AgentId, DmError, PackageId};
use dm_routing::RoutingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("package {0} is already scheduled")]
    DuplicatePackage(PackageId),

    #[error("{0} is not an explorer")]
    NotAnExplorer(AgentId),

    #[error(transparent)]
    Core(#[from] DmError),

    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("communication error: {0}")]
    Comm(#[from] CommError),
}

pub type SimResult<T> = Result<T, SimError>;
