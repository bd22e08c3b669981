//! # Order Lifecycle
//!
//! ```text
//! PENDING ──chef──▶ PREPARING ──chef──▶ READY ──waiter──▶ COMPLETED
//!    │
//!    └──customer/admin──▶ CANCELLED
//! ```
//!
//! Serving an order completes it in the same step, stamping `served_at` and
//! `completed_at` together. Every other move is rejected with
//! [`EngineError::InvalidTransition`].
//!
//! Capacity is released through the holds described in [`super::ledger`]:
//! the chef's unit when an order becomes READY or is cancelled, the waiter's
//! when it completes or is cancelled. Staff transitions drain the freed
//! member's queue right away; a cancellation leaves that to the queue-drain
//! sweep.

use tracing::info;

use super::{EngineError, Kitchen};
use crate::model::{BookingId, BookingStatus, Order, OrderId, OrderStatus, QueueRole, Role, StaffId};
use crate::store::Repository;

fn guard(order: &Order, from: OrderStatus, to: OrderStatus) -> Result<(), EngineError> {
    if order.status != from {
        return Err(EngineError::InvalidTransition {
            current: order.status,
            requested: to,
        });
    }
    Ok(())
}

impl<R: Repository> Kitchen<R> {
    pub fn start_preparation(
        &mut self,
        order_id: OrderId,
        chef_id: StaffId,
    ) -> Result<Order, EngineError> {
        let mut order = self.load_order(order_id)?;
        ensure_chef(&order, chef_id)?;
        guard(&order, OrderStatus::Pending, OrderStatus::Preparing)?;

        order.status = OrderStatus::Preparing;
        order.preparation_started_at = Some(self.now());
        self.repo.save_order(order.clone());
        info!(order_id = %order_id, staff_id = %chef_id, "Preparation started");
        Ok(order)
    }

    /// PREPARING → READY. Frees the chef's unit for this table, then drains
    /// the chef's queue and, if this order was waiting on its waiter, the
    /// waiter's queue.
    pub fn mark_ready(&mut self, order_id: OrderId, chef_id: StaffId) -> Result<Order, EngineError> {
        let mut order = self.load_order(order_id)?;
        ensure_chef(&order, chef_id)?;
        guard(&order, OrderStatus::Preparing, OrderStatus::Ready)?;

        order.status = OrderStatus::Ready;
        order.ready_at = Some(self.now());
        self.release_chef_hold(&mut order)?;
        self.repo.save_order(order);
        info!(order_id = %order_id, staff_id = %chef_id, "Order ready");

        self.drain_queue(QueueRole::Chef, chef_id)?;
        self.drain_if_queued(QueueRole::Waiter, order_id)?;
        self.load_order(order_id)
    }

    /// READY → COMPLETED by the assigned waiter. An order with no waiter yet
    /// is taken by whichever waiter serves it.
    pub fn mark_served(
        &mut self,
        order_id: OrderId,
        waiter_id: StaffId,
    ) -> Result<Order, EngineError> {
        let mut order = self.load_order(order_id)?;
        match order.waiter_id {
            Some(assigned) if assigned == waiter_id => {}
            Some(assigned) => {
                return Err(EngineError::NotAuthorized(format!(
                    "{} is served by {}, not {}",
                    order_id, assigned, waiter_id
                )))
            }
            None => {
                let staff = self.load_staff(waiter_id)?;
                if staff.role != Role::Waiter {
                    return Err(EngineError::NotAuthorized(format!(
                        "{} is not a waiter",
                        waiter_id
                    )));
                }
            }
        }
        guard(&order, OrderStatus::Ready, OrderStatus::Completed)?;

        let now = self.now();
        if order.waiter_id.is_none() {
            order.waiter_id = Some(waiter_id);
            order.waiter_assigned_at = Some(now);
        }
        order.status = OrderStatus::Completed;
        order.served_at = Some(now);
        order.completed_at = Some(now);
        self.repo.remove_queue_entry(QueueRole::Waiter, order_id);
        self.repo.remove_queue_entry(QueueRole::Chef, order_id);
        self.release_waiter_hold(&mut order)?;
        // Normally already released at READY.
        self.release_chef_hold(&mut order)?;
        let booking_id = order.booking_id;
        self.repo.save_order(order);
        info!(order_id = %order_id, staff_id = %waiter_id, "Order served");

        self.complete_booking_if_done(booking_id)?;
        self.drain_queue(QueueRole::Waiter, waiter_id)?;
        self.load_order(order_id)
    }

    /// Cancels a PENDING order on behalf of the customer who placed it.
    pub fn cancel_order(
        &mut self,
        order_id: OrderId,
        customer_id: StaffId,
    ) -> Result<Order, EngineError> {
        let order = self.load_order(order_id)?;
        if order.customer_id != customer_id {
            return Err(EngineError::NotAuthorized(format!(
                "{} was not placed by {}",
                order_id, customer_id
            )));
        }
        self.cancel(order)
    }

    pub fn cancel_order_by_admin(
        &mut self,
        order_id: OrderId,
        admin_id: StaffId,
    ) -> Result<Order, EngineError> {
        let admin = self.load_staff(admin_id)?;
        if admin.role != Role::Admin {
            return Err(EngineError::NotAuthorized(format!(
                "{} is not an admin",
                admin_id
            )));
        }
        let order = self.load_order(order_id)?;
        self.cancel(order)
    }

    fn cancel(&mut self, mut order: Order) -> Result<Order, EngineError> {
        guard(&order, OrderStatus::Pending, OrderStatus::Cancelled)?;

        order.status = OrderStatus::Cancelled;
        order.cancelled_at = Some(self.now());
        self.repo.remove_queue_entry(QueueRole::Chef, order.id);
        self.repo.remove_queue_entry(QueueRole::Waiter, order.id);
        self.release_chef_hold(&mut order)?;
        self.release_waiter_hold(&mut order)?;
        self.repo.save_order(order.clone());
        info!(order_id = %order.id, "Order cancelled");

        self.complete_booking_if_done(order.booking_id)?;
        Ok(order)
    }

    /// Closes the booking once every order on it is COMPLETED or CANCELLED.
    fn complete_booking_if_done(&mut self, booking_id: BookingId) -> Result<(), EngineError> {
        let mut booking = self.load_booking(booking_id)?;
        if !booking.status.accepts_orders() {
            return Ok(());
        }
        let orders = self.repo.orders_by_booking(booking_id);
        if orders.is_empty() || !orders.iter().all(|o| o.status.is_terminal()) {
            return Ok(());
        }
        booking.set_status(BookingStatus::Completed, self.now());
        self.repo.save_booking(booking);
        info!(booking_id = %booking_id, orders = orders.len(), "Booking completed");
        Ok(())
    }
}

fn ensure_chef(order: &Order, chef_id: StaffId) -> Result<(), EngineError> {
    if order.chef_id != Some(chef_id) {
        return Err(EngineError::NotAuthorized(format!(
            "{} is not the chef on {}",
            chef_id, order.id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::Fixture;
    use chrono::Duration;

    #[test]
    fn test_full_lifecycle_stamps_ordered_timestamps() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 2);
        let waiter = fx.staff("Walt", Role::Waiter, 2);
        let booking = fx.booking(3);
        let order = fx.order(booking);
        fx.kitchen.assign_staff(order, chef, Some(waiter)).unwrap();

        fx.clock.advance(Duration::minutes(1));
        fx.kitchen.start_preparation(order, chef).unwrap();
        fx.clock.advance(Duration::minutes(10));
        fx.kitchen.mark_ready(order, chef).unwrap();
        fx.clock.advance(Duration::minutes(2));
        let done = fx.kitchen.mark_served(order, waiter).unwrap();

        assert_eq!(done.status, OrderStatus::Completed);
        assert_eq!(done.served_at, done.completed_at);
        let timeline = done.timeline();
        let names: Vec<&str> = timeline.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["created", "preparation_started", "ready", "served", "completed"]);
        assert!(timeline.windows(2).all(|pair| pair[0].1 <= pair[1].1));

        assert_eq!(fx.load_staff(chef).current_active_orders(), 0);
        assert_eq!(fx.load_staff(waiter).current_active_orders(), 0);
        assert_eq!(
            fx.kitchen.load_booking(booking).unwrap().status,
            BookingStatus::Completed
        );
    }

    #[test]
    fn test_only_assigned_chef_may_advance() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 2);
        let other = fx.staff("Colette", Role::Chef, 2);
        let booking = fx.booking(3);
        let order = fx.order(booking);
        fx.kitchen.assign_chef(order, chef).unwrap();

        assert!(matches!(
            fx.kitchen.start_preparation(order, other),
            Err(EngineError::NotAuthorized(_))
        ));
    }

    #[test]
    fn test_skipping_a_state_is_invalid_transition() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 2);
        let waiter = fx.staff("Walt", Role::Waiter, 2);
        let booking = fx.booking(3);
        let order = fx.order(booking);
        fx.kitchen.assign_staff(order, chef, Some(waiter)).unwrap();

        assert_eq!(
            fx.kitchen.mark_ready(order, chef),
            Err(EngineError::InvalidTransition {
                current: OrderStatus::Pending,
                requested: OrderStatus::Ready,
            })
        );
        assert_eq!(
            fx.kitchen.mark_served(order, waiter),
            Err(EngineError::InvalidTransition {
                current: OrderStatus::Pending,
                requested: OrderStatus::Completed,
            })
        );
    }

    #[test]
    fn test_cancel_releases_exactly_one_unit() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 3);
        let other_booking = fx.booking(1);
        let other = fx.order(other_booking);
        fx.kitchen.assign_chef(other, chef).unwrap();
        let booking = fx.booking(2);
        let order = fx.order(booking);
        fx.kitchen.assign_chef(order, chef).unwrap();
        assert_eq!(fx.load_staff(chef).current_active_orders(), 2);

        let cancelled = fx.kitchen.cancel_order(order, fx.customer).unwrap();

        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert!(cancelled.cancelled_at.is_some());
        assert_eq!(fx.load_staff(chef).current_active_orders(), 1);

        assert_eq!(
            fx.kitchen.cancel_order(order, fx.customer),
            Err(EngineError::InvalidTransition {
                current: OrderStatus::Cancelled,
                requested: OrderStatus::Cancelled,
            })
        );
        assert_eq!(fx.load_staff(chef).current_active_orders(), 1);
    }

    #[test]
    fn test_cancel_after_preparation_started_is_rejected() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 3);
        let booking = fx.booking(2);
        let order = fx.order(booking);
        fx.kitchen.assign_chef(order, chef).unwrap();
        fx.kitchen.start_preparation(order, chef).unwrap();

        assert!(matches!(
            fx.kitchen.cancel_order(order, fx.customer),
            Err(EngineError::InvalidTransition { .. })
        ));
        assert_eq!(fx.load_staff(chef).current_active_orders(), 1);
    }

    #[test]
    fn test_admin_cancel_requires_admin_role() {
        let mut fx = Fixture::new();
        let admin = fx.staff("Ada Admin", Role::Admin, 1);
        let chef = fx.staff("Remy", Role::Chef, 1);
        let booking = fx.booking(2);
        let order = fx.order(booking);

        assert!(matches!(
            fx.kitchen.cancel_order_by_admin(order, chef),
            Err(EngineError::NotAuthorized(_))
        ));
        let cancelled = fx.kitchen.cancel_order_by_admin(order, admin).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_customer_cannot_cancel_someone_elses_order() {
        let mut fx = Fixture::new();
        let stranger = fx.staff("Bob", Role::Customer, 1);
        let booking = fx.booking(2);
        let order = fx.order(booking);

        assert!(matches!(
            fx.kitchen.cancel_order(order, stranger),
            Err(EngineError::NotAuthorized(_))
        ));
    }

    #[test]
    fn test_serving_unassigned_order_binds_the_waiter() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 1);
        let waiter = fx.staff("Walt", Role::Waiter, 1);
        let booking = fx.booking(2);
        let order = fx.order(booking);
        fx.kitchen.assign_chef(order, chef).unwrap();
        fx.kitchen.start_preparation(order, chef).unwrap();
        fx.kitchen.mark_ready(order, chef).unwrap();

        let served = fx.kitchen.mark_served(order, waiter).unwrap();

        assert_eq!(served.waiter_id, Some(waiter));
        assert_eq!(fx.load_staff(waiter).current_active_orders(), 0);
    }

    #[test]
    fn test_ready_drains_chef_queue() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 1);
        let first_booking = fx.booking(1);
        let first = fx.order(first_booking);
        fx.kitchen.assign_chef(first, chef).unwrap();
        let second_booking = fx.booking(2);
        let second = fx.order(second_booking);
        let _ = fx.kitchen.assign_chef(second, chef);

        fx.kitchen.start_preparation(first, chef).unwrap();
        fx.kitchen.mark_ready(first, chef).unwrap();

        assert_eq!(fx.load(second).chef_id, Some(chef));
        assert_eq!(fx.load_staff(chef).current_active_orders(), 1);
        assert_eq!(fx.kitchen.repo.queue_len(QueueRole::Chef, chef), 0);
    }
}
