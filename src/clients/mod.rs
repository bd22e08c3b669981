//! Typed async wrappers around the kitchen actor's request channel.

pub mod kitchen_client;

pub use kitchen_client::*;
