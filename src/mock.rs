//! # Mock Helpers
//!
//! Utilities for testing code that talks to a [`KitchenClient`] without
//! spawning the kitchen actor.
//!
//! [`create_mock_client`] returns a real client wired to a channel the test
//! holds. The test reads each request off that channel, asserts on it, and
//! answers through the request's responder, so success, engine errors and a
//! vanished actor can all be simulated deterministically.
//!
//! ```rust,ignore
//! let (client, mut receiver) = create_mock_client(10);
//! let task = tokio::spawn(async move { client.assign_chef(order, chef).await });
//!
//! let (action, responder) = expect_action(&mut receiver).await.unwrap();
//! assert!(matches!(action, KitchenAction::AssignChef { .. }));
//! responder.send(Err(EngineError::StaffBusy { staff: chef })).unwrap();
//! ```

use tokio::sync::mpsc;

use crate::clients::KitchenClient;
use crate::engine::{SweepKind, SweepReport};
use crate::kitchen_actor::{
    KitchenAction, KitchenActionResult, KitchenQuery, KitchenQueryResult, KitchenRequest, Response,
};

/// Creates a client and the receiver its requests arrive on.
pub fn create_mock_client(buffer_size: usize) -> (KitchenClient, mpsc::Receiver<KitchenRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (KitchenClient::new(sender), receiver)
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action(
    receiver: &mut mpsc::Receiver<KitchenRequest>,
) -> Option<(KitchenAction, Response<KitchenActionResult>)> {
    match receiver.recv().await {
        Some(KitchenRequest::Action { action, respond_to }) => Some((action, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Query request
pub async fn expect_query(
    receiver: &mut mpsc::Receiver<KitchenRequest>,
) -> Option<(KitchenQuery, Response<KitchenQueryResult>)> {
    match receiver.recv().await {
        Some(KitchenRequest::Query { query, respond_to }) => Some((query, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Sweep request
pub async fn expect_sweep(
    receiver: &mut mpsc::Receiver<KitchenRequest>,
) -> Option<(SweepKind, Response<SweepReport>)> {
    match receiver.recv().await {
        Some(KitchenRequest::Sweep { kind, respond_to }) => Some((kind, respond_to)),
        _ => None,
    }
}
