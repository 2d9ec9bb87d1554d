//! Simulation observer trait for progress reporting and data collection.

use dm_comm::DeliveryStats;
use dm_core::Tick;

/// What happened during one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Package agents that ran their tick (not picked up) plus explorers.
    pub ticked:   usize,
    /// Message counters for the step.
    pub messages: DeliveryStats,
}

impl TickReport {
    /// Envelopes handed to a recipient.
    pub fn delivered(&self) -> u64 {
        self.messages.delivered
    }

    /// Broadcast copies lost to unreliability plus envelopes nobody could
    /// receive.
    pub fn dropped(&self) -> u64 {
        self.messages.dropped()
    }
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, report: &TickReport) {
///         if tick.0 % self.interval == 0 {
///             println!("tick {tick}: {} messages delivered", report.delivered());
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after both phases of a tick, once every message chain has
    /// resolved.
    fn on_tick_end(&mut self, _tick: Tick, _report: &TickReport) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
