//! # Assignment Queues
//!
//! Each chef and each waiter has a FIFO of orders waiting for their capacity.
//! An order has at most one open entry per queue role, so enqueueing it again
//! is a no-op.
//!
//! The two queues mean different things:
//! - a chef-queue entry is an order with **no chef yet**; draining it binds
//!   the chef and reserves capacity.
//! - a waiter-queue entry is an order **already bound** to the waiter;
//!   draining it only reserves capacity.

use tracing::{debug, info};

use super::{EngineError, Kitchen};
use crate::model::{OrderId, OrderStatus, QueueEntry, QueueRole, StaffId};
use crate::store::Repository;

/// What one drain of one staff member's queue did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainOutcome {
    pub activated: usize,
    /// Entries dropped because their order no longer needed them.
    pub discarded: usize,
}

impl<R: Repository> Kitchen<R> {
    /// Adds `order` to `staff`'s queue unless it already has an entry for this
    /// role. Returns whether an entry was created.
    ///
    /// Positions continue after the highest open position for that staff
    /// member, so a later entry never sorts ahead of an earlier one.
    pub(crate) fn enqueue_if_absent(
        &mut self,
        role: QueueRole,
        order_id: OrderId,
        staff_id: StaffId,
    ) -> Result<bool, EngineError> {
        if let Some(existing) = self.repo.queue_entry(role, order_id) {
            debug!(
                order_id = %order_id,
                queued_for = %existing.staff_id,
                %role,
                "Already queued"
            );
            return Ok(false);
        }
        let position = self
            .repo
            .max_queue_position(role, staff_id)
            .map_or(1, |max| max + 1);
        let entry = QueueEntry {
            role,
            order_id,
            staff_id,
            position,
            enqueued_at: self.now(),
        };
        info!(order_id = %order_id, staff_id = %staff_id, %role, position, "Order queued");
        self.repo.insert_queue_entry(entry);
        Ok(true)
    }

    /// Activates entries from the front of `staff`'s queue while they have
    /// capacity.
    pub(crate) fn drain_queue(
        &mut self,
        role: QueueRole,
        staff_id: StaffId,
    ) -> Result<DrainOutcome, EngineError> {
        let mut outcome = DrainOutcome::default();
        loop {
            if !self.load_staff(staff_id)?.can_accept_order() {
                break;
            }
            let Some(entry) = self.repo.queue_for(role, staff_id).into_iter().next() else {
                break;
            };
            self.repo.remove_queue_entry(role, entry.order_id);

            let Some(order) = self.repo.order(entry.order_id) else {
                outcome.discarded += 1;
                continue;
            };

            let activated = match role {
                QueueRole::Chef => {
                    if order.status != OrderStatus::Pending || order.chef_id.is_some() {
                        false
                    } else {
                        self.bind_chef(order.id, staff_id, true)?;
                        true
                    }
                }
                QueueRole::Waiter => {
                    if order.status.is_terminal() || order.waiter_id != Some(staff_id) {
                        false
                    } else {
                        self.activate_waiter(order.id, staff_id)?
                    }
                }
            };

            if activated {
                info!(order_id = %order.id, staff_id = %staff_id, %role, "Queued order activated");
                outcome.activated += 1;
            } else {
                debug!(order_id = %order.id, staff_id = %staff_id, %role, status = %order.status, "Stale queue entry discarded");
                outcome.discarded += 1;
            }
        }
        Ok(outcome)
    }

    /// Drains `staff`'s queue only if `order_id` is waiting in it.
    pub(crate) fn drain_if_queued(
        &mut self,
        role: QueueRole,
        order_id: OrderId,
    ) -> Result<DrainOutcome, EngineError> {
        match self.repo.queue_entry(role, order_id) {
            Some(entry) => self.drain_queue(role, entry.staff_id),
            None => Ok(DrainOutcome::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::Fixture;
    use crate::model::Role;

    #[test]
    fn test_enqueue_is_idempotent() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 1);
        let booking = fx.booking(3);
        let order = fx.order(booking);

        assert!(fx.kitchen.enqueue_if_absent(QueueRole::Chef, order, chef).unwrap());
        assert!(!fx.kitchen.enqueue_if_absent(QueueRole::Chef, order, chef).unwrap());

        assert_eq!(fx.kitchen.repo.queue_len(QueueRole::Chef, chef), 1);
    }

    #[test]
    fn test_positions_keep_fifo_after_removals() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 1);
        let booking = fx.booking(3);
        let orders: Vec<OrderId> = (0..4).map(|_| fx.order(booking)).collect();

        for order in &orders[..3] {
            fx.kitchen.enqueue_if_absent(QueueRole::Chef, *order, chef).unwrap();
        }
        fx.kitchen.repo.remove_queue_entry(QueueRole::Chef, orders[0]);
        fx.kitchen.repo.remove_queue_entry(QueueRole::Chef, orders[1]);
        fx.kitchen.enqueue_if_absent(QueueRole::Chef, orders[3], chef).unwrap();

        let queue: Vec<OrderId> = fx
            .kitchen
            .repo
            .queue_for(QueueRole::Chef, chef)
            .into_iter()
            .map(|e| e.order_id)
            .collect();
        assert_eq!(queue, vec![orders[2], orders[3]]);
    }

    #[test]
    fn test_chef_drain_discards_orders_that_moved_on() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 1);
        let stale_booking = fx.booking(1);
        let stale = fx.order(stale_booking);
        let live_booking = fx.booking(2);
        let live = fx.order(live_booking);

        fx.kitchen.enqueue_if_absent(QueueRole::Chef, stale, chef).unwrap();
        fx.kitchen.enqueue_if_absent(QueueRole::Chef, live, chef).unwrap();
        let mut moved_on = fx.load(stale);
        moved_on.status = OrderStatus::Cancelled;
        fx.kitchen.repo.save_order(moved_on);

        let outcome = fx.kitchen.drain_queue(QueueRole::Chef, chef).unwrap();

        assert_eq!(outcome, DrainOutcome { activated: 1, discarded: 1 });
        assert_eq!(fx.load(live).chef_id, Some(chef));
        assert!(fx.load(live).auto_assigned);
        assert_eq!(fx.kitchen.repo.queue_len(QueueRole::Chef, chef), 0);
    }

    #[test]
    fn test_drain_stops_when_capacity_runs_out() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 1);
        let first_booking = fx.booking(1);
        let first = fx.order(first_booking);
        let second_booking = fx.booking(2);
        let second = fx.order(second_booking);
        fx.kitchen.enqueue_if_absent(QueueRole::Chef, first, chef).unwrap();
        fx.kitchen.enqueue_if_absent(QueueRole::Chef, second, chef).unwrap();

        let outcome = fx.kitchen.drain_queue(QueueRole::Chef, chef).unwrap();

        assert_eq!(outcome.activated, 1);
        assert_eq!(fx.load(first).chef_id, Some(chef));
        assert_eq!(fx.load(second).chef_id, None);
        assert_eq!(fx.kitchen.repo.queue_len(QueueRole::Chef, chef), 1);
    }
}
