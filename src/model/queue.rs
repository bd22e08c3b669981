use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::model::{OrderId, Role, StaffId};

/// Which of the two assignment queues an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueRole {
    Chef,
    Waiter,
}

impl QueueRole {
    /// The staff role whose members own queues of this kind.
    pub fn staff_role(self) -> Role {
        match self {
            QueueRole::Chef => Role::Chef,
            QueueRole::Waiter => Role::Waiter,
        }
    }
}

impl Display for QueueRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueRole::Chef => f.write_str("chef"),
            QueueRole::Waiter => f.write_str("waiter"),
        }
    }
}

/// An order waiting for a staff member's capacity to free up.
///
/// `position` is one past the highest position in that staff member's queue
/// at insertion time. It only orders entries within one staff member's queue
/// and is not renumbered when entries leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    pub role: QueueRole,
    pub order_id: OrderId,
    pub staff_id: StaffId,
    pub position: u32,
    pub enqueued_at: DateTime<Utc>,
}
