use dm_core::PackageId;
use thiserror::Error;

use crate::PackageState;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("package {package}: cannot {action} while {from}")]
    InvalidTransition {
        package: PackageId,
        from:    PackageState,
        action:  &'static str,
    },

    #[error("routing configuration error: {0}")]
    Config(String),

    #[error("duplicate package id {0} in manifest")]
    DuplicatePackage(PackageId),

    #[error("manifest parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RoutingResult<T> = Result<T, RoutingError>;
