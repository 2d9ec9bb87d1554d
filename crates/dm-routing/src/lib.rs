//! `dm-routing`: the Delegate MAS pheromone routing protocol.
//!
//! Package agents never plan routes centrally.  Each one periodically
//! advertises itself with a feasibility ant; agents whose delivery points
//! hear it learn "after my delivery, this pickup is reachable" and relay the
//! news while the hop budget lasts.  Explorers then send forward ants along
//! table-guided choices; at the turnaround point a forward ant becomes a
//! backward ant that retraces the path, reinforcing every table it passes.
//! Pheromones evaporate every tick, so stale routes fade unless
//! re-confirmed.
//!
//! # Crate layout
//!
//! | Module             | Contents                                                  |
//! |--------------------|-----------------------------------------------------------|
//! | [`path`]           | `Hop`, immutable `Path`                                   |
//! | [`path_table`]     | `PathTable`, `PathEntry`: decay, reinforcement, selection |
//! | [`reinforcement`]  | `ReinforcementPolicy` trait, `InverseCost`                |
//! | [`ant`]            | `Ant` and its three kinds, turn-back and retrace steps    |
//! | [`package`]        | `Package` lifecycle state machine                         |
//! | [`destination`]    | `PackageDestination` endpoint                             |
//! | [`agent`]          | `PackageAgent`                                            |
//! | [`explorer`]       | `Explorer`, `DiscoveredRoute`                             |
//! | [`context`]        | `RoutingContext` passed to every callback                 |
//! | [`config`]         | `RoutingConfig`                                           |
//! | [`loader`]         | CSV package manifest                                      |
//! | [`error`]          | `RoutingError`, `RoutingResult<T>`                        |
//!
//! # Termination
//!
//! Every relay or forward spends one hop of budget, so every message chain
//! an agent starts ends within a bounded number of sends.  Backward ants
//! shrink `path_to_do` by one hop per visit.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | `Serialize`/`Deserialize` on `RoutingConfig` and `Package`. |

pub mod agent;
pub mod ant;
pub mod config;
pub mod context;
pub mod destination;
pub mod error;
pub mod explorer;
pub mod loader;
pub mod package;
pub mod path;
pub mod path_table;
pub mod reinforcement;

#[cfg(test)]
mod tests;

pub use agent::PackageAgent;
pub use ant::{Ant, AntKind, BackwardAnt, FeasibilityAnt, ForwardAnt};
pub use config::RoutingConfig;
pub use context::RoutingContext;
pub use destination::PackageDestination;
pub use error::{RoutingError, RoutingResult};
pub use explorer::{DiscoveredRoute, Explorer};
pub use loader::{load_packages_csv, load_packages_reader};
pub use package::{Package, PackageState};
pub use path::{Hop, Path};
pub use path_table::{PathEntry, PathTable};
pub use reinforcement::{InverseCost, ReinforcementPolicy};
