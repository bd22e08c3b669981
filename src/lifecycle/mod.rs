//! # System Lifecycle & Orchestration
//!
//! Starting, wiring and stopping the running kitchen.
//!
//! ## The KitchenSystem Pattern
//!
//! [`KitchenSystem`] is the conductor:
//!
//! 1. **Actor Creation** - build the kitchen actor around an in-memory store
//!    and hand out its [`KitchenClient`](crate::clients::KitchenClient)
//! 2. **Scheduling** - give a clone of that client to the
//!    [`ReassignmentScheduler`], which drives the stale and queue-drain
//!    sweeps on their own timers
//! 3. **Graceful Shutdown** - cancel the sweep loops, drop every client,
//!    and wait for the actor to drain its channel
//!
//! ## Why the Scheduler Goes Through the Client
//!
//! Sweeps are ordinary requests on the actor's channel. They can never
//! interleave with a staff or customer call halfway through, and no lock
//! around the engine state is needed.
//!
//! ## Observability
//!
//! [`setup_tracing`] initializes structured logging; see the [`tracing`]
//! module for what gets logged at which level.

pub mod kitchen_system;
pub mod scheduler;
pub mod tracing;

pub use kitchen_system::*;
pub use scheduler::*;
pub use tracing::*;
