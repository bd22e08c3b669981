use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

use super::Repository;
use crate::model::{
    BookingId, BookingStatus, MenuItem, MenuItemId, Order, OrderId, OrderStatus, QueueEntry,
    QueueRole, Role, StaffId, StaffMember, TableBooking,
};

/// In-memory [`Repository`] backed by ordered maps.
///
/// Ids are handed out from per-entity counters starting at 1 and are never
/// reused.
#[derive(Debug)]
pub struct MemoryStore {
    staff: BTreeMap<StaffId, StaffMember>,
    bookings: BTreeMap<BookingId, TableBooking>,
    menu: BTreeMap<MenuItemId, MenuItem>,
    orders: BTreeMap<OrderId, Order>,
    queues: BTreeMap<(QueueRole, OrderId), QueueEntry>,
    next_staff_id: u32,
    next_booking_id: u32,
    next_menu_item_id: u32,
    next_order_id: u32,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            staff: BTreeMap::new(),
            bookings: BTreeMap::new(),
            menu: BTreeMap::new(),
            orders: BTreeMap::new(),
            queues: BTreeMap::new(),
            next_staff_id: 1,
            next_booking_id: 1,
            next_menu_item_id: 1,
            next_order_id: 1,
        }
    }

    fn orders_where(&self, predicate: impl Fn(&Order) -> bool) -> Vec<Order> {
        self.orders
            .values()
            .filter(|order| predicate(order))
            .cloned()
            .collect()
    }

    fn entries_for(&self, role: QueueRole, staff: StaffId) -> impl Iterator<Item = &QueueEntry> {
        self.queues
            .range((role, OrderId(0))..=(role, OrderId(u32::MAX)))
            .map(|(_, entry)| entry)
            .filter(move |entry| entry.staff_id == staff)
    }
}

fn bump(counter: &mut u32) -> u32 {
    let id = *counter;
    *counter += 1;
    id
}

impl Repository for MemoryStore {
    fn next_staff_id(&mut self) -> StaffId {
        StaffId(bump(&mut self.next_staff_id))
    }

    fn staff(&self, id: StaffId) -> Option<StaffMember> {
        self.staff.get(&id).cloned()
    }

    fn save_staff(&mut self, staff: StaffMember) {
        self.staff.insert(staff.id, staff);
    }

    fn staff_by_role(&self, role: Role) -> Vec<StaffMember> {
        self.staff
            .values()
            .filter(|member| member.role == role)
            .cloned()
            .collect()
    }

    fn next_booking_id(&mut self) -> BookingId {
        BookingId(bump(&mut self.next_booking_id))
    }

    fn booking(&self, id: BookingId) -> Option<TableBooking> {
        self.bookings.get(&id).cloned()
    }

    fn save_booking(&mut self, booking: TableBooking) {
        self.bookings.insert(booking.id, booking);
    }

    fn count_bookings_by_status(&self, status: BookingStatus) -> usize {
        self.bookings
            .values()
            .filter(|booking| booking.status == status)
            .count()
    }

    fn next_menu_item_id(&mut self) -> MenuItemId {
        MenuItemId(bump(&mut self.next_menu_item_id))
    }

    fn menu_item(&self, id: MenuItemId) -> Option<MenuItem> {
        self.menu.get(&id).cloned()
    }

    fn save_menu_item(&mut self, item: MenuItem) {
        self.menu.insert(item.id, item);
    }

    fn next_order_id(&mut self) -> OrderId {
        OrderId(bump(&mut self.next_order_id))
    }

    fn order(&self, id: OrderId) -> Option<Order> {
        self.orders.get(&id).cloned()
    }

    fn save_order(&mut self, order: Order) {
        self.orders.insert(order.id, order);
    }

    fn all_orders(&self) -> Vec<Order> {
        self.orders.values().cloned().collect()
    }

    fn orders_by_booking(&self, booking: BookingId) -> Vec<Order> {
        self.orders_where(|order| order.booking_id == booking)
    }

    fn orders_by_status(&self, status: OrderStatus) -> Vec<Order> {
        self.orders_where(|order| order.status == status)
    }

    fn orders_by_chef_and_status(&self, chef: StaffId, status: OrderStatus) -> Vec<Order> {
        self.orders_where(|order| order.chef_id == Some(chef) && order.status == status)
    }

    fn orders_by_waiter(&self, waiter: StaffId) -> Vec<Order> {
        self.orders_where(|order| order.waiter_id == Some(waiter))
    }

    fn orders_by_customer(&self, customer: StaffId) -> Vec<Order> {
        self.orders_where(|order| order.customer_id == customer)
    }

    fn stale_unchefed_orders(&self, cutoff: DateTime<Utc>) -> Vec<Order> {
        let mut stale = self.orders_where(|order| {
            order.status == OrderStatus::Pending
                && order.chef_id.is_none()
                && order.created_at <= cutoff
        });
        stale.sort_by_key(|order| (order.created_at, order.id));
        stale
    }

    fn count_orders_by_status(&self, status: OrderStatus) -> usize {
        self.orders
            .values()
            .filter(|order| order.status == status)
            .count()
    }

    fn queue_entry(&self, role: QueueRole, order: OrderId) -> Option<QueueEntry> {
        self.queues.get(&(role, order)).cloned()
    }

    fn insert_queue_entry(&mut self, entry: QueueEntry) {
        self.queues.insert((entry.role, entry.order_id), entry);
    }

    fn remove_queue_entry(&mut self, role: QueueRole, order: OrderId) -> Option<QueueEntry> {
        self.queues.remove(&(role, order))
    }

    fn queue_for(&self, role: QueueRole, staff: StaffId) -> Vec<QueueEntry> {
        let mut entries: Vec<QueueEntry> = self.entries_for(role, staff).cloned().collect();
        entries.sort_by_key(|entry| (entry.position, entry.enqueued_at, entry.order_id));
        entries
    }

    fn queue_len(&self, role: QueueRole, staff: StaffId) -> usize {
        self.entries_for(role, staff).count()
    }

    fn max_queue_position(&self, role: QueueRole, staff: StaffId) -> Option<u32> {
        self.entries_for(role, staff).map(|entry| entry.position).max()
    }

    fn queued_staff(&self, role: QueueRole) -> Vec<StaffId> {
        self.queues
            .values()
            .filter(|entry| entry.role == role)
            .map(|entry| entry.staff_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn queue_total(&self, role: QueueRole) -> usize {
        self.queues.keys().filter(|(r, _)| *r == role).count()
    }
}
