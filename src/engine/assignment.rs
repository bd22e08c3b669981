//! # Assignment Engine
//!
//! Staff are bound per **table**, not per order: assigning a chef or waiter
//! to one order binds every sibling on the same booking that does not have
//! one yet, and the whole batch costs one unit of capacity.
//!
//! The two roles behave differently when the member is full:
//!
//! | | chef | waiter |
//! |---|---|---|
//! | binding | deferred until the queue drains | happens immediately |
//! | capacity | reserved on binding | reserved when the queue drains |
//! | caller sees | `StaffBusy` | success |

use tracing::{info, warn};

use super::ledger::in_waiter_phase;
use super::{EngineError, Kitchen};
use crate::model::{Order, OrderId, OrderStatus, QueueRole, Role, StaffId};
use crate::store::Repository;

impl<R: Repository> Kitchen<R> {
    /// Binds `chef_id` to the order and its unchefed siblings.
    ///
    /// # Errors
    /// - `StaffBusy` if the chef has no free capacity. Every unchefed sibling
    ///   is put in the chef's queue first and nothing is bound.
    /// - `Validation` if the staff member is not an enabled chef, or the
    ///   order is past `PENDING` or already has a different chef.
    pub fn assign_chef(&mut self, order_id: OrderId, chef_id: StaffId) -> Result<Order, EngineError> {
        self.assign_chef_as(order_id, chef_id, false)
    }

    pub(crate) fn assign_chef_as(
        &mut self,
        order_id: OrderId,
        chef_id: StaffId,
        auto: bool,
    ) -> Result<Order, EngineError> {
        let chef = self.load_staff_with_role(chef_id, Role::Chef)?;
        if !chef.enabled {
            return Err(EngineError::Validation(format!("{} is disabled", chef_id)));
        }
        let order = self.load_order(order_id)?;
        match order.chef_id {
            Some(current) if current == chef_id => return Ok(order),
            Some(current) => {
                return Err(EngineError::Validation(format!(
                    "{} is already assigned to {}",
                    order_id, current
                )))
            }
            None => {}
        }
        if order.status != OrderStatus::Pending {
            return Err(EngineError::Validation(format!(
                "{} is {}; chefs are only assigned to PENDING orders",
                order_id, order.status
            )));
        }

        if !chef.can_accept_order() {
            for sibling in self.unchefed_siblings(&order) {
                self.enqueue_if_absent(QueueRole::Chef, sibling.id, chef_id)?;
            }
            warn!(order_id = %order_id, staff_id = %chef_id, "Chef at capacity, table queued");
            return Err(EngineError::StaffBusy { staff: chef_id });
        }

        self.bind_chef(order_id, chef_id, auto)?;
        self.load_order(order_id)
    }

    /// Reserves one unit and binds the chef to every unchefed PENDING order
    /// on the table. `order_id` carries the hold.
    pub(crate) fn bind_chef(
        &mut self,
        order_id: OrderId,
        chef_id: StaffId,
        auto: bool,
    ) -> Result<(), EngineError> {
        let order = self.load_order(order_id)?;
        if !self.try_reserve(chef_id)? {
            return Err(EngineError::StaffBusy { staff: chef_id });
        }
        let now = self.now();
        let mut bound = 0;
        for mut sibling in self.unchefed_siblings(&order) {
            sibling.chef_id = Some(chef_id);
            sibling.chef_assigned_at = Some(now);
            sibling.chef_hold = sibling.id == order_id;
            if auto {
                sibling.auto_assigned = true;
            }
            self.repo.remove_queue_entry(QueueRole::Chef, sibling.id);
            self.repo.save_order(sibling);
            bound += 1;
        }
        info!(
            order_id = %order_id,
            booking_id = %order.booking_id,
            staff_id = %chef_id,
            bound,
            auto,
            "Chef assigned"
        );
        Ok(())
    }

    /// Binds `waiter_id` to the order and its unwaitered siblings.
    ///
    /// A waiter at capacity still gets the binding; the bound orders wait in
    /// the waiter's queue for capacity and the call succeeds.
    ///
    /// # Errors
    /// `Validation` if the staff member is not an enabled, available waiter,
    /// or the order is finished or already has a different waiter.
    pub fn assign_waiter(
        &mut self,
        order_id: OrderId,
        waiter_id: StaffId,
    ) -> Result<Order, EngineError> {
        self.assign_waiter_as(order_id, waiter_id, false)
    }

    pub(crate) fn assign_waiter_as(
        &mut self,
        order_id: OrderId,
        waiter_id: StaffId,
        auto: bool,
    ) -> Result<Order, EngineError> {
        let waiter = self.load_staff_with_role(waiter_id, Role::Waiter)?;
        if !waiter.enabled || !waiter.is_available {
            return Err(EngineError::Validation(format!(
                "{} is not taking tables",
                waiter_id
            )));
        }
        let order = self.load_order(order_id)?;
        match order.waiter_id {
            Some(current) if current == waiter_id => return Ok(order),
            Some(current) => {
                return Err(EngineError::Validation(format!(
                    "{} is already assigned to {}",
                    order_id, current
                )))
            }
            None => {}
        }
        if order.status.is_terminal() {
            return Err(EngineError::Validation(format!(
                "{} is already {}",
                order_id, order.status
            )));
        }

        let now = self.now();
        let siblings = self.repo.orders_by_booking(order.booking_id);
        let covered = siblings
            .iter()
            .any(|o| o.waiter_id == Some(waiter_id) && o.waiter_hold);
        let mut bound = Vec::new();
        for mut sibling in siblings {
            if sibling.waiter_id.is_some() || !in_waiter_phase(&sibling) {
                continue;
            }
            sibling.waiter_id = Some(waiter_id);
            sibling.waiter_assigned_at = Some(now);
            if auto {
                sibling.auto_assigned = true;
            }
            bound.push(sibling.id);
            self.repo.save_order(sibling);
        }

        if covered {
            info!(order_id = %order_id, staff_id = %waiter_id, bound = bound.len(), "Waiter assigned under existing hold");
        } else if self.try_reserve(waiter_id)? {
            let mut holder = self.load_order(order_id)?;
            holder.waiter_hold = true;
            self.repo.save_order(holder);
            info!(order_id = %order_id, staff_id = %waiter_id, bound = bound.len(), auto, "Waiter assigned");
        } else {
            for id in &bound {
                self.enqueue_if_absent(QueueRole::Waiter, *id, waiter_id)?;
            }
            warn!(
                order_id = %order_id,
                staff_id = %waiter_id,
                bound = bound.len(),
                "Waiter at capacity, bound orders queued"
            );
        }

        self.load_order(order_id)
    }

    /// Reserves waiter capacity for a queued order that is already bound to
    /// the waiter. Returns `false` when the table is already covered by a
    /// hold or no capacity could be taken.
    pub(crate) fn activate_waiter(
        &mut self,
        order_id: OrderId,
        waiter_id: StaffId,
    ) -> Result<bool, EngineError> {
        let mut order = self.load_order(order_id)?;
        let siblings = self.repo.orders_by_booking(order.booking_id);
        if siblings
            .iter()
            .any(|o| o.waiter_id == Some(waiter_id) && o.waiter_hold)
        {
            return Ok(false);
        }
        if !self.try_reserve(waiter_id)? {
            self.enqueue_if_absent(QueueRole::Waiter, order_id, waiter_id)?;
            return Ok(false);
        }
        order.waiter_hold = true;
        self.repo.save_order(order);
        for sibling in siblings {
            if sibling.waiter_id == Some(waiter_id) && in_waiter_phase(&sibling) {
                self.repo.remove_queue_entry(QueueRole::Waiter, sibling.id);
            }
        }
        Ok(true)
    }

    /// Chef first, then the optional waiter. A busy chef stops the call
    /// before any waiter is bound.
    pub fn assign_staff(
        &mut self,
        order_id: OrderId,
        chef_id: StaffId,
        waiter_id: Option<StaffId>,
    ) -> Result<Order, EngineError> {
        let order = self.assign_chef(order_id, chef_id)?;
        match waiter_id {
            Some(waiter_id) => self.assign_waiter(order_id, waiter_id),
            None => Ok(order),
        }
    }

    fn unchefed_siblings(&self, order: &Order) -> Vec<Order> {
        self.repo
            .orders_by_booking(order.booking_id)
            .into_iter()
            .filter(|o| o.status == OrderStatus::Pending && o.chef_id.is_none())
            .collect()
    }
}
