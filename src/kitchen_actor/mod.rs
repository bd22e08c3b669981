//! The kitchen actor: one task that owns every order, booking, staff record
//! and queue.

mod actions;
pub mod actor;
pub mod error;

pub use actions::*;
pub use actor::KitchenActor;
pub use error::*;

use std::sync::Arc;

use crate::clients::KitchenClient;
use crate::clock::Clock;
use crate::config::KitchenConfig;
use crate::engine::Kitchen;
use crate::store::MemoryStore;

/// Creates a new in-memory Kitchen actor and its client.
pub fn new(config: &KitchenConfig, clock: Arc<dyn Clock>) -> (KitchenActor<MemoryStore>, KitchenClient) {
    let kitchen = Kitchen::new(MemoryStore::new(), clock, config);
    KitchenActor::new(kitchen, config.channel_buffer)
}
