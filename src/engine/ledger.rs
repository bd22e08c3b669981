//! # Capacity Ledger
//!
//! The only code that moves a staff member's `current_active_orders`.
//!
//! One assignment event reserves one unit, however many sibling orders it
//! binds. The unit is recorded as a *hold* on exactly one of those orders.
//! When the holding order leaves the staff member's active phase, the hold
//! moves to another sibling still bound to that member and still in the
//! phase; only when none is left does the unit go back to the ledger. That
//! makes every release pair with exactly one earlier reservation, and a
//! cancelled order can release at most once.
//!
//! Active phases:
//! - chef: `PENDING` or `PREPARING`
//! - waiter: any non-terminal status

use tracing::{debug, info};

use super::{EngineError, Kitchen};
use crate::model::{Order, OrderStatus, QueueRole, StaffId};
use crate::store::Repository;

pub(crate) fn in_chef_phase(order: &Order) -> bool {
    matches!(order.status, OrderStatus::Pending | OrderStatus::Preparing)
}

pub(crate) fn in_waiter_phase(order: &Order) -> bool {
    !order.status.is_terminal()
}

impl<R: Repository> Kitchen<R> {
    /// Takes one unit of capacity if the member can accept an order.
    pub(crate) fn try_reserve(&mut self, staff_id: StaffId) -> Result<bool, EngineError> {
        let mut staff = self.load_staff(staff_id)?;
        if !staff.can_accept_order() {
            debug!(staff_id = %staff_id, load = staff.current_active_orders(), "Reserve refused");
            return Ok(false);
        }
        staff.increment_active_orders();
        info!(
            staff_id = %staff_id,
            load = staff.current_active_orders(),
            capacity = staff.max_active_orders(),
            "Capacity reserved"
        );
        self.repo.save_staff(staff);
        Ok(true)
    }

    /// Gives one unit back, never going below zero.
    pub(crate) fn release(&mut self, staff_id: StaffId) -> Result<(), EngineError> {
        let mut staff = self.load_staff(staff_id)?;
        staff.decrement_active_orders();
        info!(
            staff_id = %staff_id,
            load = staff.current_active_orders(),
            capacity = staff.max_active_orders(),
            "Capacity released"
        );
        self.repo.save_staff(staff);
        Ok(())
    }

    /// Clears `order`'s chef hold, handing it to a sibling still in the chef
    /// phase or releasing the unit. The caller saves `order` afterwards and
    /// must already have moved it out of the phase.
    pub(crate) fn release_chef_hold(&mut self, order: &mut Order) -> Result<(), EngineError> {
        if !order.chef_hold {
            return Ok(());
        }
        order.chef_hold = false;
        let Some(chef) = order.chef_id else {
            return Ok(());
        };

        let heir = self
            .repo
            .orders_by_booking(order.booking_id)
            .into_iter()
            .find(|o| o.id != order.id && o.chef_id == Some(chef) && in_chef_phase(o) && !o.chef_hold);

        match heir {
            Some(mut heir) => {
                heir.chef_hold = true;
                debug!(from = %order.id, to = %heir.id, staff_id = %chef, "Chef hold transferred");
                self.repo.save_order(heir);
                Ok(())
            }
            None => self.release(chef),
        }
    }

    /// Waiter counterpart of [`Self::release_chef_hold`].
    pub(crate) fn release_waiter_hold(&mut self, order: &mut Order) -> Result<(), EngineError> {
        if !order.waiter_hold {
            return Ok(());
        }
        order.waiter_hold = false;
        let Some(waiter) = order.waiter_id else {
            return Ok(());
        };

        let heir = self
            .repo
            .orders_by_booking(order.booking_id)
            .into_iter()
            .find(|o| {
                o.id != order.id && o.waiter_id == Some(waiter) && in_waiter_phase(o) && !o.waiter_hold
            });

        match heir {
            Some(mut heir) => {
                heir.waiter_hold = true;
                // The heir is covered by the hold now.
                self.repo.remove_queue_entry(QueueRole::Waiter, heir.id);
                debug!(from = %order.id, to = %heir.id, staff_id = %waiter, "Waiter hold transferred");
                self.repo.save_order(heir);
                Ok(())
            }
            None => self.release(waiter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::Fixture;
    use crate::model::Role;

    #[test]
    fn test_try_reserve_stops_at_ceiling() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 2);

        assert!(fx.kitchen.try_reserve(chef).unwrap());
        assert!(fx.kitchen.try_reserve(chef).unwrap());
        assert!(!fx.kitchen.try_reserve(chef).unwrap());
        assert_eq!(fx.load_staff(chef).current_active_orders(), 2);
    }

    #[test]
    fn test_try_reserve_refuses_disabled_staff() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 2);
        fx.kitchen.set_staff_enabled(chef, false).unwrap();

        assert!(!fx.kitchen.try_reserve(chef).unwrap());
    }

    #[test]
    fn test_release_is_floored_at_zero() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 2);

        fx.kitchen.release(chef).unwrap();
        assert_eq!(fx.load_staff(chef).current_active_orders(), 0);
    }

    #[test]
    fn test_unknown_staff_is_not_found() {
        let mut fx = Fixture::new();
        let result = fx.kitchen.try_reserve(StaffId(42));
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }

    #[test]
    fn test_chef_hold_moves_to_sibling_before_release() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 2);
        let booking = fx.booking(3);
        let first = fx.order(booking);
        let second = fx.order(booking);
        fx.kitchen.assign_chef(first, chef).unwrap();
        assert_eq!(fx.load_staff(chef).current_active_orders(), 1);

        fx.kitchen.start_preparation(first, chef).unwrap();
        fx.kitchen.mark_ready(first, chef).unwrap();
        assert_eq!(fx.load_staff(chef).current_active_orders(), 1);
        assert!(fx.load(second).holds_chef_capacity());

        fx.kitchen.start_preparation(second, chef).unwrap();
        fx.kitchen.mark_ready(second, chef).unwrap();
        assert_eq!(fx.load_staff(chef).current_active_orders(), 0);
    }
}
