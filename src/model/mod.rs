//! Plain data records managed by the kitchen actor.
//!
//! Records reference each other by id only; every cross-record lookup goes
//! through the [`Repository`](crate::store::Repository).

pub mod booking;
pub mod menu;
pub mod order;
pub mod queue;
pub mod staff;

pub use booking::*;
pub use menu::*;
pub use order::*;
pub use queue::*;
pub use staff::*;
