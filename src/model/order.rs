//! Represents a customer order attached to a table booking.
//!
//! See [`crate::engine::lifecycle`] for the transitions that move an order
//! between [`OrderStatus`] values and stamp its timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::model::{BookingId, MenuItemId, StaffId};

/// Sales tax applied on top of the item subtotal.
pub const TAX_RATE_PERCENT: u64 = 10;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    /// Served and completed in one step.
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

/// One line of an order with its price frozen at order time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub menu_item_id: MenuItemId,
    pub name: String,
    pub quantity: u32,
    pub price_at_order_cents: u64,
}

impl OrderItem {
    pub fn line_total_cents(&self) -> u64 {
        self.price_at_order_cents
            .saturating_mul(u64::from(self.quantity))
    }
}

/// Subtotal plus tax for `items`, or `None` if any step overflows `u64`.
pub fn checked_gross_cents(items: &[OrderItem]) -> Option<u64> {
    let subtotal = items.iter().try_fold(0u64, |acc, item| {
        item.price_at_order_cents
            .checked_mul(u64::from(item.quantity))
            .and_then(|line| acc.checked_add(line))
    })?;
    let tax = subtotal.checked_mul(TAX_RATE_PERCENT)?.checked_add(50)? / 100;
    subtotal.checked_add(tax)
}

/// A requested line on a new order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemRequest {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
}

/// Payload for placing a new order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreate {
    pub booking_id: BookingId,
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub discount_cents: u64,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: StaffId,
    pub booking_id: BookingId,
    pub chef_id: Option<StaffId>,
    pub waiter_id: Option<StaffId>,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub auto_assigned: bool,
    pub discount_cents: u64,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub admin_notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub chef_assigned_at: Option<DateTime<Utc>>,
    pub waiter_assigned_at: Option<DateTime<Utc>>,
    pub preparation_started_at: Option<DateTime<Utc>>,
    pub ready_at: Option<DateTime<Utc>>,
    pub served_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,

    /// This order carries the chef's capacity unit for its table.
    #[serde(skip)]
    pub(crate) chef_hold: bool,
    /// This order carries the waiter's capacity unit for its table.
    #[serde(skip)]
    pub(crate) waiter_hold: bool,
}

impl Order {
    /// Creates a new PENDING order. Items must already carry their price
    /// snapshot.
    pub fn new(
        id: OrderId,
        customer_id: StaffId,
        booking_id: BookingId,
        items: Vec<OrderItem>,
        discount_cents: u64,
        payment_method: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            customer_id,
            booking_id,
            chef_id: None,
            waiter_id: None,
            items,
            status: OrderStatus::Pending,
            auto_assigned: false,
            discount_cents,
            payment_status: PaymentStatus::Pending,
            payment_method,
            admin_notes: None,
            created_at: now,
            chef_assigned_at: None,
            waiter_assigned_at: None,
            preparation_started_at: None,
            ready_at: None,
            served_at: None,
            completed_at: None,
            cancelled_at: None,
            chef_hold: false,
            waiter_hold: false,
        }
    }

    pub fn subtotal_cents(&self) -> u64 {
        self.items
            .iter()
            .map(OrderItem::line_total_cents)
            .fold(0, u64::saturating_add)
    }

    /// Tax on the subtotal, rounded half up to the cent.
    pub fn tax_cents(&self) -> u64 {
        self.subtotal_cents()
            .saturating_mul(TAX_RATE_PERCENT)
            .saturating_add(50)
            / 100
    }

    /// Subtotal plus tax minus discount, never below zero. Always derived
    /// from the items so it cannot drift.
    pub fn total_cents(&self) -> u64 {
        self.subtotal_cents()
            .saturating_add(self.tax_cents())
            .saturating_sub(self.discount_cents)
    }

    pub fn items_count(&self) -> usize {
        self.items.len()
    }

    pub fn holds_chef_capacity(&self) -> bool {
        self.chef_hold
    }

    pub fn holds_waiter_capacity(&self) -> bool {
        self.waiter_hold
    }

    /// The transition timestamps that are set, in lifecycle order.
    pub fn timeline(&self) -> Vec<(&'static str, DateTime<Utc>)> {
        [
            ("created", Some(self.created_at)),
            ("preparation_started", self.preparation_started_at),
            ("ready", self.ready_at),
            ("served", self.served_at),
            ("completed", self.completed_at),
            ("cancelled", self.cancelled_at),
        ]
        .into_iter()
        .filter_map(|(name, at)| at.map(|at| (name, at)))
        .collect()
    }
}
