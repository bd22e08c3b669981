//! # Record Storage
//!
//! The engine never holds references between records. Every cross-record
//! access (an order's booking, a booking's sibling orders, a chef's queue) is
//! an explicit query against a [`Repository`].
//!
//! Values go in and come out by value: callers load a record, change it, and
//! save it back. All of this happens inside the kitchen actor's message
//! handler, so a load/modify/save sequence is never interleaved with another
//! request.

pub mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};

use crate::model::{
    BookingId, BookingStatus, MenuItem, MenuItemId, Order, OrderId, OrderStatus, QueueEntry,
    QueueRole, Role, StaffId, StaffMember, TableBooking,
};

pub trait Repository: Send + 'static {
    // --- Staff ---
    fn next_staff_id(&mut self) -> StaffId;
    fn staff(&self, id: StaffId) -> Option<StaffMember>;
    fn save_staff(&mut self, staff: StaffMember);
    /// Members of one role, ordered by id.
    fn staff_by_role(&self, role: Role) -> Vec<StaffMember>;

    // --- Bookings ---
    fn next_booking_id(&mut self) -> BookingId;
    fn booking(&self, id: BookingId) -> Option<TableBooking>;
    fn save_booking(&mut self, booking: TableBooking);
    fn count_bookings_by_status(&self, status: BookingStatus) -> usize;

    // --- Menu ---
    fn next_menu_item_id(&mut self) -> MenuItemId;
    fn menu_item(&self, id: MenuItemId) -> Option<MenuItem>;
    fn save_menu_item(&mut self, item: MenuItem);

    // --- Orders ---
    fn next_order_id(&mut self) -> OrderId;
    fn order(&self, id: OrderId) -> Option<Order>;
    fn save_order(&mut self, order: Order);
    /// Every order, ordered by id.
    fn all_orders(&self) -> Vec<Order>;
    /// Orders sharing one table booking, ordered by id.
    fn orders_by_booking(&self, booking: BookingId) -> Vec<Order>;
    fn orders_by_status(&self, status: OrderStatus) -> Vec<Order>;
    fn orders_by_chef_and_status(&self, chef: StaffId, status: OrderStatus) -> Vec<Order>;
    fn orders_by_waiter(&self, waiter: StaffId) -> Vec<Order>;
    fn orders_by_customer(&self, customer: StaffId) -> Vec<Order>;
    /// PENDING orders without a chef created at or before `cutoff`, oldest
    /// first.
    fn stale_unchefed_orders(&self, cutoff: DateTime<Utc>) -> Vec<Order>;
    fn count_orders_by_status(&self, status: OrderStatus) -> usize;

    // --- Assignment queues ---
    fn queue_entry(&self, role: QueueRole, order: OrderId) -> Option<QueueEntry>;
    fn insert_queue_entry(&mut self, entry: QueueEntry);
    fn remove_queue_entry(&mut self, role: QueueRole, order: OrderId) -> Option<QueueEntry>;
    /// One staff member's queue in FIFO order.
    fn queue_for(&self, role: QueueRole, staff: StaffId) -> Vec<QueueEntry>;
    fn queue_len(&self, role: QueueRole, staff: StaffId) -> usize;
    fn max_queue_position(&self, role: QueueRole, staff: StaffId) -> Option<u32>;
    /// Staff members with at least one open entry, ordered by id.
    fn queued_staff(&self, role: QueueRole) -> Vec<StaffId>;
    fn queue_total(&self, role: QueueRole) -> usize;
}
