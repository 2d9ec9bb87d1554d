use dm_core::AgentId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommError {
    #[error("endpoint {0} is already registered")]
    AlreadyRegistered(AgentId),

    #[error("endpoint {0} is not registered")]
    NotRegistered(AgentId),

    #[error("endpoint {id}: {reason}")]
    InvalidEndpoint { id: AgentId, reason: String },
}

pub type CommResult<T> = Result<T, CommError>;
