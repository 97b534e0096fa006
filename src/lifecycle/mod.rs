//! Scheduler Lifecycle Module
//!
//! Coordinates startup, readiness and shutdown of the scheduling service.
//!
//! # Lifecycle Phases
//!
//! ```text
//! 1. Config validation (Config::complete)
//!    ↓
//! 2. Event recorder selection (discovery probe)
//!    ↓
//! 3. Scheduler core construction (SchedulerBuilder)
//!    ↓
//! 4. Event broadcaster start           ← best effort
//!    ↓
//! 5. Informer drivers + factory start
//!    ↓
//! 6. Cache sync wait                   ← bounded by the run context
//!    ↓
//! 7. Scheduler core run loop
//!    ↓
//! [Running...]
//!    ↓
//! 8. Shutdown token cancelled (SIGTERM/SIGINT or caller)
//!    ↓
//! 9. run() returns, drain() awaits background tasks
//! ```
//!
//! Every background task receives the same [`CancellationToken`] when it is
//! started; there is no per-task cancellation.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

mod coordinator;
mod readiness;
mod shutdown;

pub use coordinator::Scheduler;
pub use readiness::ReadinessHandler;
pub use shutdown::{ShutdownHandler, shutdown_signal};
