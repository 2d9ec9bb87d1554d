//! `dm-spatial`: the road/cost collaborator consumed by pheromone
//! reinforcement.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder`           |
//! | [`cost`]    | `RoadModel` trait, `EuclideanRoad`, `NetworkRoad` (Dijkstra) |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                           |
//!
//! The routing core only ever sees `&dyn RoadModel`; tests substitute
//! fixed-cost fakes.

pub mod cost;
pub mod error;
pub mod network;


pub use cost::{EuclideanRoad, NetworkRoad, RoadModel};
pub use error::{SpatialError, SpatialResult};
pub use network::{RoadNetwork, RoadNetworkBuilder};
