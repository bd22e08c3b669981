//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing_subscriber` formatter whose
//! level comes from `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Actor lifecycle**: kitchen actor start and shutdown, sweep loops
//!   starting and stopping
//! - **State changes** (`info`): orders created, staff assigned, capacity
//!   reserved and released, orders queued and activated, transitions
//! - **Payloads** (`debug`): every action and query the actor receives
//! - **Rejections** (`warn`): failed actions, busy staff, per-order sweep
//!   failures
//! - **Sweep failures** (`error`): a sweep that could not run at all
//!
//! Fields are structured (`order_id`, `staff_id`, `booking_id`, `role`), so
//! a single order can be followed with a filter on its id:
//!
//! ```text
//! INFO Order created order_id=order_4 booking_id=booking_2 items=2 total_cents=2860
//! WARN Chef at capacity, table queued order_id=order_4 staff_id=staff_3
//! INFO Capacity released staff_id=staff_3 load=0 capacity=1
//! INFO Chef assigned order_id=order_4 booking_id=booking_2 staff_id=staff_3 bound=1 auto=true
//! ```
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run              # state changes only
//! RUST_LOG=debug cargo run             # plus full payloads
//! RUST_LOG=brigade::engine=debug cargo run
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Structured fields carry the context
        .compact()
        .init();
}
