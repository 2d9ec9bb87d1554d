//! `dm-sim`: tick scheduler for the delegate_mas courier simulation.
//!
//! # Two-phase tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ⓪ Evaporate : every package agent's path table (PackageAgent::begin_tick).
//!   ① Tick      : every actor, ascending AgentId:
//!                    PackageAgent::tick / Explorer::tick,
//!                    then drain the message queue to empty.
//!   ② After-tick: every actor, ascending AgentId:
//!                    PackageAgent::after_tick, then drain again.
//!   ③ Report    : TickReport to the observer.
//! ```
//!
//! Draining after each actor means every message chain that actor started
//! (feasibility relays, exploration hops) resolves before the next actor
//! runs.  Chains are bounded by hop budgets, so each drain terminates.
//!
//! Messages addressed to a package destination endpoint are handed to the
//! owning package agent.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dm_core::SimConfig;
//! use dm_routing::{RoutingConfig, load_packages_csv};
//! use dm_sim::{NoopObserver, SimBuilder};
//! use dm_spatial::EuclideanRoad;
//!
//! let packages = load_packages_csv(path)?;
//! let mut sim = SimBuilder::new(SimConfig::default(), RoutingConfig::default(), EuclideanRoad)
//!     .packages(packages)
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickReport};
pub use sim::Sim;
