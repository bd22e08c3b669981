//! # Order Engine
//!
//! The synchronous core of the kitchen: order lifecycle, capacity ledger,
//! assignment queues, assignment algorithms and the two reassignment sweeps.
//!
//! [`Kitchen`] owns a [`Repository`] and a [`Clock`]. Every public method runs
//! to completion without awaiting, so when the kitchen actor calls one from its
//! message loop the whole operation (validation, sibling re-checks, capacity
//! changes, queue edits) is one uninterrupted unit of work.
//!
//! ## Layout
//!
//! | Module | Concern |
//! |--------|---------|
//! | [`ledger`] | `try_reserve` / `release` and capacity holds |
//! | [`queue`] | idempotent per-staff FIFO queues and their drains |
//! | [`lifecycle`] | status transitions and their guards |
//! | [`assignment`] | chef and waiter binding across a table |
//! | [`sweep`] | stale-order and queue-drain sweeps |
//! | [`views`] | role-grouped read accessors |

pub mod assignment;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod queue;
pub mod sweep;
pub mod views;

pub use error::EngineError;
pub use sweep::{SweepKind, SweepReport};
pub use views::AdminStats;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use crate::clock::Clock;
use crate::config::KitchenConfig;
use crate::model::{
    checked_gross_cents, BookingCreate, BookingId, BookingStatus, MenuItem, MenuItemCreate, MenuItemId, Order,
    OrderCreate, OrderId, OrderItem, QueueRole, Role, StaffCreate, StaffId, StaffMember,
    TableBooking,
};
use crate::store::Repository;

pub struct Kitchen<R: Repository> {
    repo: R,
    clock: Arc<dyn Clock>,
    stale_after: chrono::Duration,
    auto_assign_waiters: bool,
}

impl<R: Repository> Kitchen<R> {
    pub fn new(repo: R, clock: Arc<dyn Clock>, config: &KitchenConfig) -> Self {
        Self {
            repo,
            clock,
            stale_after: config.stale_after_chrono(),
            auto_assign_waiters: config.auto_assign_waiters,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // --- Lookups ---

    pub(crate) fn load_order(&self, id: OrderId) -> Result<Order, EngineError> {
        self.repo
            .order(id)
            .ok_or_else(|| EngineError::not_found("Order", id))
    }

    pub(crate) fn load_staff(&self, id: StaffId) -> Result<StaffMember, EngineError> {
        self.repo
            .staff(id)
            .ok_or_else(|| EngineError::not_found("Staff", id))
    }

    pub(crate) fn load_booking(&self, id: BookingId) -> Result<TableBooking, EngineError> {
        self.repo
            .booking(id)
            .ok_or_else(|| EngineError::not_found("Booking", id))
    }

    /// Loads a staff member and checks their role.
    pub(crate) fn load_staff_with_role(
        &self,
        id: StaffId,
        role: Role,
    ) -> Result<StaffMember, EngineError> {
        let staff = self.load_staff(id)?;
        if staff.role != role {
            return Err(EngineError::Validation(format!(
                "{} is a {}, not a {}",
                id, staff.role, role
            )));
        }
        Ok(staff)
    }

    // --- Registration ---

    pub fn register_staff(&mut self, params: StaffCreate) -> Result<StaffMember, EngineError> {
        // Validate before consuming an id.
        StaffMember::from_create(StaffId(0), params.clone())?;
        let id = self.repo.next_staff_id();
        let staff = StaffMember::from_create(id, params)?;
        info!(staff_id = %staff.id, role = %staff.role, capacity = staff.max_active_orders(), "Staff registered");
        self.repo.save_staff(staff.clone());
        Ok(staff)
    }

    /// Toggles the enabled flag. The load counter is left alone so that
    /// releases for orders already in flight still pair up. Re-enabled staff
    /// pick up their queue on the next queue-drain sweep.
    pub fn set_staff_enabled(
        &mut self,
        id: StaffId,
        enabled: bool,
    ) -> Result<StaffMember, EngineError> {
        let mut staff = self.load_staff(id)?;
        staff.enabled = enabled;
        self.repo.save_staff(staff.clone());
        info!(staff_id = %id, enabled, "Staff enabled flag changed");
        Ok(staff)
    }

    pub fn set_staff_availability(
        &mut self,
        id: StaffId,
        available: bool,
    ) -> Result<StaffMember, EngineError> {
        let mut staff = self.load_staff(id)?;
        staff.is_available = available;
        self.repo.save_staff(staff.clone());
        info!(staff_id = %id, available, "Staff availability changed");
        Ok(staff)
    }

    pub fn add_menu_item(&mut self, params: MenuItemCreate) -> Result<MenuItem, EngineError> {
        if params.name.trim().is_empty() {
            return Err(EngineError::Validation("menu item name must not be empty".into()));
        }
        let id = self.repo.next_menu_item_id();
        let item = MenuItem::new(id, params);
        info!(menu_item_id = %item.id, price_cents = item.price_cents, "Menu item added");
        self.repo.save_menu_item(item.clone());
        Ok(item)
    }

    pub fn set_menu_item_available(
        &mut self,
        id: MenuItemId,
        available: bool,
    ) -> Result<MenuItem, EngineError> {
        let mut item = self
            .repo
            .menu_item(id)
            .ok_or_else(|| EngineError::not_found("MenuItem", id))?;
        item.available = available;
        self.repo.save_menu_item(item.clone());
        Ok(item)
    }

    pub fn create_booking(&mut self, params: BookingCreate) -> Result<TableBooking, EngineError> {
        self.load_staff_with_role(params.customer_id, Role::Customer)?;
        if params.number_of_guests == 0 {
            return Err(EngineError::Validation(
                "a booking needs at least one guest".into(),
            ));
        }
        let id = self.repo.next_booking_id();
        let booking = TableBooking::new(id, params, self.now());
        info!(booking_id = %booking.id, table = booking.table_number, "Booking created");
        self.repo.save_booking(booking.clone());
        Ok(booking)
    }

    // --- Orders ---

    /// Places a new PENDING order on one of the customer's bookings.
    ///
    /// Item prices are copied from the menu at this point. If other orders on
    /// the same table already have a chef still working for them, or a waiter
    /// serving them, the new order joins that binding without reserving more
    /// capacity.
    pub fn create_order(
        &mut self,
        customer_id: StaffId,
        params: OrderCreate,
    ) -> Result<Order, EngineError> {
        self.load_staff_with_role(customer_id, Role::Customer)?;
        let mut booking = self.load_booking(params.booking_id)?;
        if booking.customer_id != customer_id {
            return Err(EngineError::NotAuthorized(format!(
                "{} does not belong to {}",
                booking.id, customer_id
            )));
        }
        if !booking.status.accepts_orders() {
            return Err(EngineError::Validation(format!(
                "{} is {:?} and cannot take orders",
                booking.id, booking.status
            )));
        }
        if params.items.is_empty() {
            return Err(EngineError::Validation("an order needs at least one item".into()));
        }

        let mut items = Vec::with_capacity(params.items.len());
        for line in &params.items {
            if line.quantity == 0 {
                return Err(EngineError::Validation(format!(
                    "quantity for {} must be at least 1",
                    line.menu_item_id
                )));
            }
            let menu_item = self
                .repo
                .menu_item(line.menu_item_id)
                .ok_or_else(|| EngineError::not_found("MenuItem", line.menu_item_id))?;
            if !menu_item.available {
                return Err(EngineError::Validation(format!(
                    "{} is not available",
                    menu_item.name
                )));
            }
            items.push(OrderItem {
                menu_item_id: menu_item.id,
                name: menu_item.name,
                quantity: line.quantity,
                price_at_order_cents: menu_item.price_cents,
            });
        }
        if checked_gross_cents(&items).is_none() {
            return Err(EngineError::Validation("order total is too large".into()));
        }

        let now = self.now();
        let id = self.repo.next_order_id();
        let mut order = Order::new(
            id,
            customer_id,
            booking.id,
            items,
            params.discount_cents,
            params.payment_method,
            now,
        );

        let siblings = self.repo.orders_by_booking(booking.id);
        if let Some(chef) = siblings
            .iter()
            .find(|o| ledger::in_chef_phase(o) && o.chef_id.is_some())
            .and_then(|o| o.chef_id)
        {
            order.chef_id = Some(chef);
            order.chef_assigned_at = Some(now);
        }
        let mut waiter_uncovered = None;
        if let Some(waiter) = siblings
            .iter()
            .find(|o| !o.status.is_terminal() && o.waiter_id.is_some())
            .and_then(|o| o.waiter_id)
        {
            order.waiter_id = Some(waiter);
            order.waiter_assigned_at = Some(now);
            let covered = siblings
                .iter()
                .any(|o| o.waiter_id == Some(waiter) && o.waiter_hold);
            if !covered {
                waiter_uncovered = Some(waiter);
            }
        }

        self.repo.save_order(order.clone());
        if let Some(waiter) = waiter_uncovered {
            self.enqueue_if_absent(QueueRole::Waiter, order.id, waiter)?;
        }

        if booking.status == BookingStatus::Confirmed {
            booking.set_status(BookingStatus::Active, now);
            self.repo.save_booking(booking.clone());
            info!(booking_id = %booking.id, "Booking activated");
        }

        info!(
            order_id = %order.id,
            booking_id = %order.booking_id,
            items = order.items_count(),
            total_cents = order.total_cents(),
            "Order created"
        );
        Ok(order)
    }

    pub fn update_order_notes(
        &mut self,
        order_id: OrderId,
        notes: Option<String>,
    ) -> Result<Order, EngineError> {
        let mut order = self.load_order(order_id)?;
        order.admin_notes = notes.filter(|n| !n.trim().is_empty());
        self.repo.save_order(order.clone());
        Ok(order)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for the engine's unit tests.

    use super::*;
    use crate::clock::ManualClock;
    use crate::model::{MenuItemCreate, OrderItemRequest};
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, TimeZone};

    pub struct Fixture {
        pub kitchen: Kitchen<MemoryStore>,
        pub clock: ManualClock,
        pub customer: StaffId,
        pub soup: MenuItemId,
    }

    impl Fixture {
        pub fn new() -> Self {
            let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap());
            let mut kitchen = Kitchen::new(
                MemoryStore::new(),
                Arc::new(clock.clone()),
                &KitchenConfig::default(),
            );
            let customer = kitchen
                .register_staff(StaffCreate::new("Ada", Role::Customer, 1))
                .unwrap()
                .id;
            let soup = kitchen
                .add_menu_item(MenuItemCreate {
                    name: "Soup".into(),
                    price_cents: 650,
                })
                .unwrap()
                .id;
            Self {
                kitchen,
                clock,
                customer,
                soup,
            }
        }

        pub fn staff(&mut self, name: &str, role: Role, capacity: u32) -> StaffId {
            self.kitchen
                .register_staff(StaffCreate::new(name, role, capacity))
                .unwrap()
                .id
        }

        pub fn booking(&mut self, table: u32) -> BookingId {
            self.kitchen
                .create_booking(BookingCreate {
                    customer_id: self.customer,
                    booking_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
                    time_slot: "19:00".into(),
                    table_number: table,
                    number_of_guests: 2,
                    special_requests: None,
                })
                .unwrap()
                .id
        }

        pub fn order(&mut self, booking: BookingId) -> OrderId {
            self.kitchen
                .create_order(
                    self.customer,
                    OrderCreate {
                        booking_id: booking,
                        items: vec![OrderItemRequest {
                            menu_item_id: self.soup,
                            quantity: 1,
                        }],
                        discount_cents: 0,
                        payment_method: None,
                    },
                )
                .unwrap()
                .id
        }

        pub fn load(&self, id: OrderId) -> Order {
            self.kitchen.load_order(id).unwrap()
        }

        pub fn load_staff(&self, id: StaffId) -> StaffMember {
            self.kitchen.load_staff(id).unwrap()
        }
    }
}
