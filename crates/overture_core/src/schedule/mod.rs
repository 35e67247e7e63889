//! # System Scheduling
//!
//! Systems are registered into [`Phase`]s before the main loop starts. Each
//! phase runs either sequentially on the caller's thread, or in parallel as
//! fork-joined batches of systems whose declared [`Access`] does not
//! conflict.

mod access;
mod phase;
mod scheduler;
mod system;

pub use access::{Access, WORLD_ACCESS};
pub use phase::Phase;
pub use scheduler::Scheduler;
pub use system::{FnSystem, System};
