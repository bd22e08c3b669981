//! # Brigade
//!
//! > **Order fulfillment for a restaurant kitchen, run by one actor.**
//!
//! Brigade tracks orders from the moment a seated table places them until
//! they are served or cancelled, and decides who cooks and who carries each
//! one. Chefs and waiters have a ceiling on how many tables they work at
//! once; when someone is full, the table waits in that person's FIFO queue
//! until capacity frees up.
//!
//! ## 🏗️ Design
//!
//! ### One Actor, One Owner
//! Every order, booking, staff record and queue lives inside a single
//! [`KitchenActor`](kitchen_actor::KitchenActor). It processes requests
//! sequentially, so a check like "does this chef have room?" and the
//! reservation that follows can never be split by a concurrent call. No
//! locks guard the state.
//!
//! ### Tables, Not Orders
//! Orders placed under the same booking share their chef and waiter. When
//! one order of a table is bound, every eligible sibling is bound with it,
//! and the whole table costs the staff member a single unit of capacity.
//!
//! ### Sweeps Are Just Requests
//! The [`ReassignmentScheduler`](lifecycle::ReassignmentScheduler) runs two
//! background sweeps on timers: stale unassigned orders get an automatic
//! chef, and queues of staff who have room again get drained. Each sweep is
//! one message to the actor, serialized with everything else.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`engine`])
//! The synchronous core: transitions, capacity ledger, queues, assignment
//! and sweeps, all on top of a [`Repository`](store::Repository).
//!
//! ### 2. The Actor ([`kitchen_actor`])
//! Wraps the engine in a Tokio task and a typed request protocol.
//!
//! ### 3. The Interface ([`clients`])
//! [`KitchenClient`](clients::KitchenClient) hides the channel behind one
//! async method per operation.
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! [`KitchenSystem`](lifecycle::KitchenSystem) spins up the actor and the
//! scheduler, and shuts both down cleanly.
//!
//! ### 5. Supporting Pieces
//! - [`model`]: orders, bookings, staff, menu items, queue entries
//! - [`store`]: the repository trait and its in-memory implementation
//! - [`config`]: TOML-loaded tunables
//! - [`clock`]: injectable time source
//! - [`mock`]: test helpers for code that talks to a client
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo with info logs
//! RUST_LOG=info cargo run
//!
//! # With a config file
//! BRIGADE_CONFIG=kitchen.toml RUST_LOG=info cargo run
//! ```

pub mod clients;
pub mod clock;
pub mod config;
pub mod engine;
pub mod kitchen_actor;
pub mod lifecycle;
pub mod mock;
pub mod model;
pub mod store;
