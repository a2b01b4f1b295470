//! # haft_core - Shared Building Blocks
//!
//! Foundation types used across the Haft gameplay crates:
//!
//! - Runtime instance identifiers
//! - A synchronous observer signal for change notification
//! - Cancellable cooperative countdown timers
//!
//! Everything here assumes the single-threaded cooperative scheduling
//! model: all mutation happens on the main simulation step, and the only
//! suspension points are countdown waits resumed by the per-step clock.

pub mod id;
pub mod signal;
pub mod timer;

pub mod prelude {
    pub use crate::id::{InstanceId, InstanceIdGen};
    pub use crate::signal::{Signal, SubscriberId};
    pub use crate::timer::Countdown;
}

pub use prelude::*;
