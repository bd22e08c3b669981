//! Read accessors grouped by who asks for them.

use serde::Serialize;
use std::collections::BTreeMap;

use super::{EngineError, Kitchen};
use crate::model::{
    BookingId, BookingStatus, Order, OrderId, OrderStatus, QueueEntry, QueueRole, Role, StaffId,
    StaffMember, TableBooking,
};
use crate::store::Repository;

/// Dashboard counters for admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub orders_by_status: BTreeMap<String, usize>,
    pub completed_today: usize,
    pub enabled_chefs: usize,
    pub enabled_waiters: usize,
    pub active_bookings: usize,
    pub chef_queue_length: usize,
    pub waiter_queue_length: usize,
}

fn oldest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by_key(|o| (o.created_at, o.id));
    orders
}

impl<R: Repository> Kitchen<R> {
    pub fn order(&self, id: OrderId) -> Result<Order, EngineError> {
        self.load_order(id)
    }

    pub fn staff(&self, id: StaffId) -> Result<StaffMember, EngineError> {
        self.load_staff(id)
    }

    pub fn booking(&self, id: BookingId) -> Result<TableBooking, EngineError> {
        self.load_booking(id)
    }

    pub fn queue(&self, role: QueueRole, staff_id: StaffId) -> Result<Vec<QueueEntry>, EngineError> {
        self.load_staff_with_role(staff_id, role.staff_role())?;
        Ok(self.repo.queue_for(role, staff_id))
    }

    pub fn all_orders(&self) -> Vec<Order> {
        self.repo.all_orders()
    }

    /// Newest first.
    pub fn customer_orders(&self, customer_id: StaffId) -> Result<Vec<Order>, EngineError> {
        self.load_staff_with_role(customer_id, Role::Customer)?;
        let mut orders = self.repo.orders_by_customer(customer_id);
        orders.sort_by_key(|o| std::cmp::Reverse((o.created_at, o.id)));
        Ok(orders)
    }

    /// PENDING orders nobody has picked up yet, oldest first.
    pub fn pending_orders(&self) -> Vec<Order> {
        oldest_first(
            self.repo
                .orders_by_status(OrderStatus::Pending)
                .into_iter()
                .filter(|o| o.chef_id.is_none())
                .collect(),
        )
    }

    // --- Chef ---

    pub fn chef_new_orders(&self, chef_id: StaffId) -> Result<Vec<Order>, EngineError> {
        self.load_staff_with_role(chef_id, Role::Chef)?;
        Ok(oldest_first(
            self.repo.orders_by_chef_and_status(chef_id, OrderStatus::Pending),
        ))
    }

    pub fn chef_active_orders(&self, chef_id: StaffId) -> Result<Vec<Order>, EngineError> {
        self.load_staff_with_role(chef_id, Role::Chef)?;
        Ok(oldest_first(
            self.repo.orders_by_chef_and_status(chef_id, OrderStatus::Preparing),
        ))
    }

    /// COMPLETED orders of this chef whose completion falls on the clock's
    /// current UTC day.
    pub fn chef_completed_today(&self, chef_id: StaffId) -> Result<Vec<Order>, EngineError> {
        self.load_staff_with_role(chef_id, Role::Chef)?;
        let today = self.now().date_naive();
        Ok(self
            .repo
            .orders_by_chef_and_status(chef_id, OrderStatus::Completed)
            .into_iter()
            .filter(|o| o.completed_at.is_some_and(|at| at.date_naive() == today))
            .collect())
    }

    // --- Waiter ---

    pub fn waiter_ready_orders(&self, waiter_id: StaffId) -> Result<Vec<Order>, EngineError> {
        self.waiter_orders_where(waiter_id, |o| o.status == OrderStatus::Ready)
    }

    /// Everything still open for this waiter.
    pub fn waiter_assigned_orders(&self, waiter_id: StaffId) -> Result<Vec<Order>, EngineError> {
        self.waiter_orders_where(waiter_id, |o| !o.status.is_terminal())
    }

    /// Orders the kitchen has not finished yet.
    pub fn waiter_preparing_orders(&self, waiter_id: StaffId) -> Result<Vec<Order>, EngineError> {
        self.waiter_orders_where(waiter_id, |o| {
            matches!(o.status, OrderStatus::Pending | OrderStatus::Preparing)
        })
    }

    fn waiter_orders_where(
        &self,
        waiter_id: StaffId,
        predicate: impl Fn(&Order) -> bool,
    ) -> Result<Vec<Order>, EngineError> {
        self.load_staff_with_role(waiter_id, Role::Waiter)?;
        Ok(oldest_first(
            self.repo
                .orders_by_waiter(waiter_id)
                .into_iter()
                .filter(|o| predicate(o))
                .collect(),
        ))
    }

    // --- Admin ---

    pub fn admin_stats(&self) -> AdminStats {
        let today = self.now().date_naive();
        let orders_by_status = [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ]
        .into_iter()
        .map(|status| (status.to_string(), self.repo.count_orders_by_status(status)))
        .collect();

        let completed_today = self
            .repo
            .orders_by_status(OrderStatus::Completed)
            .iter()
            .filter(|o| o.completed_at.is_some_and(|at| at.date_naive() == today))
            .count();

        let enabled = |role| {
            self.repo
                .staff_by_role(role)
                .iter()
                .filter(|member| member.enabled)
                .count()
        };

        AdminStats {
            orders_by_status,
            completed_today,
            enabled_chefs: enabled(Role::Chef),
            enabled_waiters: enabled(Role::Waiter),
            active_bookings: self.repo.count_bookings_by_status(BookingStatus::Active),
            chef_queue_length: self.repo.queue_total(QueueRole::Chef),
            waiter_queue_length: self.repo.queue_total(QueueRole::Waiter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::Fixture;
    use chrono::Duration;

    #[test]
    fn test_chef_views_follow_status() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 3);
        let booking = fx.booking(1);
        let first = fx.order(booking);
        let second = fx.order(booking);
        fx.kitchen.assign_chef(first, chef).unwrap();
        fx.kitchen.start_preparation(first, chef).unwrap();

        let new: Vec<OrderId> = fx.kitchen.chef_new_orders(chef).unwrap().iter().map(|o| o.id).collect();
        let active: Vec<OrderId> = fx.kitchen.chef_active_orders(chef).unwrap().iter().map(|o| o.id).collect();
        assert_eq!(new, vec![second]);
        assert_eq!(active, vec![first]);
    }

    #[test]
    fn test_completed_today_uses_clock_day() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 3);
        let waiter = fx.staff("Walt", Role::Waiter, 3);
        let booking = fx.booking(1);
        let order = fx.order(booking);
        fx.kitchen.assign_staff(order, chef, Some(waiter)).unwrap();
        fx.kitchen.start_preparation(order, chef).unwrap();
        fx.kitchen.mark_ready(order, chef).unwrap();
        fx.kitchen.mark_served(order, waiter).unwrap();

        assert_eq!(fx.kitchen.chef_completed_today(chef).unwrap().len(), 1);
        assert_eq!(fx.kitchen.admin_stats().completed_today, 1);

        fx.clock.advance(Duration::days(1));
        assert!(fx.kitchen.chef_completed_today(chef).unwrap().is_empty());
    }

    #[test]
    fn test_customer_orders_newest_first() {
        let mut fx = Fixture::new();
        let booking = fx.booking(1);
        let older = fx.order(booking);
        fx.clock.advance(Duration::minutes(1));
        let newer = fx.order(booking);

        let ids: Vec<OrderId> = fx
            .kitchen
            .customer_orders(fx.customer)
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![newer, older]);
    }

    #[test]
    fn test_waiter_views_require_waiter_role() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 3);
        assert!(matches!(
            fx.kitchen.waiter_ready_orders(chef),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_admin_stats_counts() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 1);
        fx.staff("Colette", Role::Chef, 1);
        fx.staff("Walt", Role::Waiter, 1);
        let first_booking = fx.booking(1);
        let first = fx.order(first_booking);
        fx.kitchen.assign_chef(first, chef).unwrap();
        let second_booking = fx.booking(2);
        let second = fx.order(second_booking);
        let _ = fx.kitchen.assign_chef(second, chef);
        fx.kitchen.set_staff_enabled(chef, false).unwrap();

        let stats = fx.kitchen.admin_stats();

        assert_eq!(stats.orders_by_status["PENDING"], 2);
        assert_eq!(stats.enabled_chefs, 1);
        assert_eq!(stats.enabled_waiters, 1);
        assert_eq!(stats.active_bookings, 2);
        assert_eq!(stats.chef_queue_length, 1);
        assert_eq!(stats.waiter_queue_length, 0);
    }
}
