//! Execution tracking for commands issued through a broadcast relay.
//!
//! The [`ExecutionController`] publishes one request, then follows the events echoed by
//! remote receivers until the command succeeds, fails or times out:
//!
//! ```text
//! relay ──► EventSink ──► queue ──► Execution ──► Dispatcher ──► ExecutionMachine
//!                           ▲                                         │ hooks
//! Scheduler (timers) ───────┘◄───────── arm timers / report progress ─┘
//! ```
//!
//! Everything after the queue runs on a single consumer; events and timer firings are
//! handled one at a time, in arrival order.

pub mod config;
pub use config::{DEFAULT_BROADCASTER_HOST, DEFAULT_BROADCASTER_PORT, RelayEndpoint};

pub mod error;
pub use error::ConfigError;

pub mod machine;
pub use machine::{
    Effect, ExecutionMachine, FailureCause, MachineError, MachineHooks, PendingRearm, Signal,
    Transition,
};

pub mod queue;
pub use queue::{Input, Step, TimerKind};

pub mod schedule;
pub use schedule::{Scheduler, TokioScheduler};

pub mod relay;
pub use relay::{Broadcaster, EventSink, RelayError};

pub mod progress;
pub use progress::{NoProgress, ProgressReporter, TeamCityProgress};

pub mod tracking;
pub use tracking::TrackingIdGenerator;

pub mod dispatch;
pub use dispatch::{Dispatcher, Disposition};

pub mod controller;
pub use controller::{
    Execution, ExecutionController, ExecutionSettings, InfoWatch, MIN_WAITING_TIMEOUT,
};

#[cfg(test)]
pub(crate) mod testing;
