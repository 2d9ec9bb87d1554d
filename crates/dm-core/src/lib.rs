//! `dm-core`: foundational types for the `delegate_mas` courier simulation.
//!
//! Every other `dm-*` crate depends on this one.  It has no `dm-*`
//! dependencies and only `rand` and `thiserror` externally (plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                 |
//! |------------|----------------------------------------------------------|
//! | [`ids`]    | `AgentId`, `PackageId`, `NodeId`, `EdgeId`               |
//! | [`geo`]    | `Point`, planar distance and range checks                |
//! | [`time`]   | `Tick`, `SimClock`, `SimConfig`                          |
//! | [`rng`]    | `AgentRng` (per-agent), `SimRng` (substrate / global)    |
//! | [`error`]  | `DmError`                                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::DmError;
pub use geo::Point;
pub use ids::{AgentId, EdgeId, NodeId, PackageId};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, SimConfig, Tick};
