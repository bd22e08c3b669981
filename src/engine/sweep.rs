//! # Reassignment Sweeps
//!
//! Two passes the scheduler runs on its own timers:
//!
//! - **Stale**: PENDING orders without a chef that are older than the
//!   staleness threshold, oldest first. Each gets the least-loaded chef that
//!   can take it, or goes into a chef queue. Waiters are handed out
//!   round-robin to orders that got a chef.
//! - **Queue drain**: every staff member with open queue entries gets their
//!   queue drained while they have capacity.
//!
//! One order failing is logged and counted, and the sweep moves on.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Display;
use tracing::{debug, info, warn};

use super::{EngineError, Kitchen};
use crate::model::{OrderId, QueueRole, Role, StaffId, StaffMember};
use crate::store::Repository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepKind {
    Stale,
    QueueDrain,
}

impl Display for SweepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepKind::Stale => f.write_str("stale"),
            SweepKind::QueueDrain => f.write_str("queue_drain"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub kind: SweepKind,
    /// Orders bound to a chef or waiter directly.
    pub assigned: usize,
    /// Orders parked in a queue instead.
    pub queued: usize,
    /// Queue entries turned into live assignments.
    pub activated: usize,
    /// Queue entries dropped because their order had moved on.
    pub discarded: usize,
    pub failed: usize,
}

impl SweepReport {
    pub fn new(kind: SweepKind) -> Self {
        Self {
            kind,
            assigned: 0,
            queued: 0,
            activated: 0,
            discarded: 0,
            failed: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assigned + self.queued + self.activated + self.discarded + self.failed == 0
    }
}

/// Cycles through waiters with free capacity, dropping each one as soon as
/// they fill up.
struct WaiterRotation {
    waiters: Vec<StaffId>,
    index: usize,
}

impl WaiterRotation {
    fn next(&self) -> Option<StaffId> {
        self.waiters.get(self.index).copied()
    }

    fn after_assignment(&mut self, still_has_room: bool) {
        if self.waiters.is_empty() {
            return;
        }
        if still_has_room {
            self.index = (self.index + 1) % self.waiters.len();
        } else {
            self.waiters.remove(self.index);
            self.index = 0;
        }
    }
}

fn least_loaded(mut staff: Vec<StaffMember>) -> Option<StaffId> {
    staff.sort_by_key(|member| (member.current_active_orders(), member.id));
    staff.first().map(|member| member.id)
}

impl<R: Repository> Kitchen<R> {
    pub fn run_sweep(&mut self, kind: SweepKind) -> SweepReport {
        match kind {
            SweepKind::Stale => self.sweep_stale_orders(),
            SweepKind::QueueDrain => self.sweep_queues(),
        }
    }

    pub fn sweep_stale_orders(&mut self) -> SweepReport {
        let mut report = SweepReport::new(SweepKind::Stale);
        // An absurd threshold means nothing is ever stale.
        let cutoff = self
            .now()
            .checked_sub_signed(self.stale_after)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let stale = self.repo.stale_unchefed_orders(cutoff);
        if stale.is_empty() {
            return report;
        }
        info!(count = stale.len(), "Stale orders found");

        let mut rotation = WaiterRotation {
            waiters: if self.auto_assign_waiters {
                self.repo
                    .staff_by_role(Role::Waiter)
                    .into_iter()
                    .filter(StaffMember::can_accept_order)
                    .map(|waiter| waiter.id)
                    .collect()
            } else {
                Vec::new()
            },
            index: 0,
        };

        for order in stale {
            // An earlier order on the same table may have bound this one.
            match self.repo.order(order.id) {
                Some(current) if current.chef_id.is_none() => {}
                _ => continue,
            }
            match self.auto_assign_chef(order.id) {
                Ok(true) => {
                    report.assigned += 1;
                    self.auto_assign_waiter(order.id, &mut rotation, &mut report);
                }
                Ok(false) => report.queued += 1,
                Err(e) => {
                    warn!(order_id = %order.id, error = %e, "Auto-assignment failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            assigned = report.assigned,
            queued = report.queued,
            failed = report.failed,
            "Stale sweep finished"
        );
        report
    }

    /// `Ok(true)` if a chef was bound, `Ok(false)` if the order was queued.
    fn auto_assign_chef(&mut self, order_id: OrderId) -> Result<bool, EngineError> {
        let chefs = self.repo.staff_by_role(Role::Chef);
        let open: Vec<StaffMember> = chefs
            .iter()
            .filter(|chef| chef.can_accept_order())
            .cloned()
            .collect();

        if let Some(chef) = least_loaded(open) {
            match self.assign_chef_as(order_id, chef, true) {
                Ok(_) => return Ok(true),
                Err(EngineError::StaffBusy { .. }) => return Ok(false),
                Err(e) => return Err(e),
            }
        }

        let enabled: Vec<StaffMember> = chefs.into_iter().filter(|chef| chef.enabled).collect();
        let chef = least_loaded(enabled).ok_or_else(|| {
            EngineError::Validation("no enabled chef to queue the order for".into())
        })?;
        self.enqueue_if_absent(QueueRole::Chef, order_id, chef)?;
        debug!(order_id = %order_id, staff_id = %chef, "No chef free, order queued");
        Ok(false)
    }

    fn auto_assign_waiter(
        &mut self,
        order_id: OrderId,
        rotation: &mut WaiterRotation,
        report: &mut SweepReport,
    ) {
        match self.repo.order(order_id) {
            Some(order) if order.waiter_id.is_none() => {}
            _ => return,
        }
        let Some(waiter) = rotation.next() else {
            return;
        };
        match self.assign_waiter_as(order_id, waiter, true) {
            Ok(_) => {
                let has_room = self
                    .repo
                    .staff(waiter)
                    .is_some_and(|w| w.can_accept_order());
                rotation.after_assignment(has_room);
            }
            Err(e) => {
                warn!(order_id = %order_id, staff_id = %waiter, error = %e, "Waiter auto-assignment failed");
                report.failed += 1;
                rotation.after_assignment(false);
            }
        }
    }

    pub fn sweep_queues(&mut self) -> SweepReport {
        let mut report = SweepReport::new(SweepKind::QueueDrain);
        for role in [QueueRole::Chef, QueueRole::Waiter] {
            for staff_id in self.repo.queued_staff(role) {
                match self.drain_queue(role, staff_id) {
                    Ok(outcome) => {
                        report.activated += outcome.activated;
                        report.discarded += outcome.discarded;
                    }
                    Err(e) => {
                        warn!(staff_id = %staff_id, %role, error = %e, "Queue drain failed");
                        report.failed += 1;
                    }
                }
            }
        }
        if !report.is_empty() {
            info!(
                activated = report.activated,
                discarded = report.discarded,
                failed = report.failed,
                "Queue drain finished"
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KitchenConfig;
    use crate::engine::testing::Fixture;
    use chrono::Duration;

    #[test]
    fn test_stale_sweep_ignores_fresh_orders() {
        let mut fx = Fixture::new();
        fx.staff("Remy", Role::Chef, 2);
        let booking = fx.booking(1);
        let order = fx.order(booking);
        fx.clock.advance(Duration::minutes(1));

        let report = fx.kitchen.sweep_stale_orders();

        assert!(report.is_empty());
        assert_eq!(fx.load(order).chef_id, None);
    }

    #[test]
    fn test_stale_sweep_survives_out_of_range_threshold() {
        let mut fx = Fixture::new();
        fx.staff("Remy", Role::Chef, 2);
        let booking = fx.booking(1);
        let order = fx.order(booking);
        let config = KitchenConfig::from_toml_str(r#"stale_after = "300000years""#).unwrap();
        fx.kitchen.stale_after = config.stale_after_chrono();
        fx.clock.advance(Duration::hours(2));

        let report = fx.kitchen.sweep_stale_orders();

        assert!(report.is_empty());
        assert_eq!(fx.load(order).chef_id, None);
    }

    #[test]
    fn test_stale_sweep_spreads_by_load() {
        let mut fx = Fixture::new();
        let big = fx.staff("Remy", Role::Chef, 2);
        let small = fx.staff("Colette", Role::Chef, 1);
        let orders: Vec<OrderId> = (1..=3)
            .map(|table| {
                let booking = fx.booking(table);
                let order = fx.order(booking);
                fx.clock.advance(Duration::seconds(1));
                order
            })
            .collect();
        fx.clock.advance(Duration::minutes(5));

        let report = fx.kitchen.sweep_stale_orders();

        assert_eq!(report.assigned, 3);
        assert_eq!(fx.load(orders[0]).chef_id, Some(big));
        assert_eq!(fx.load(orders[1]).chef_id, Some(small));
        assert_eq!(fx.load(orders[2]).chef_id, Some(big));
        assert!(orders.iter().all(|id| fx.load(*id).auto_assigned));
    }

    #[test]
    fn test_stale_sweep_queues_when_every_chef_is_full() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 1);
        let busy_booking = fx.booking(1);
        let busy = fx.order(busy_booking);
        fx.kitchen.assign_chef(busy, chef).unwrap();
        let booking = fx.booking(2);
        let order = fx.order(booking);
        fx.clock.advance(Duration::minutes(5));

        let report = fx.kitchen.sweep_stale_orders();
        assert_eq!(report.queued, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(fx.kitchen.repo.queue_len(QueueRole::Chef, chef), 1);

        // A second sweep keeps the single entry.
        fx.kitchen.sweep_stale_orders();
        assert_eq!(fx.kitchen.repo.queue_len(QueueRole::Chef, chef), 1);
        assert_eq!(fx.load(order).chef_id, None);
    }

    #[test]
    fn test_stale_sweep_without_chefs_counts_failure_and_continues() {
        let mut fx = Fixture::new();
        for table in 1..=2 {
            let booking = fx.booking(table);
            fx.order(booking);
        }
        fx.clock.advance(Duration::minutes(5));

        let report = fx.kitchen.sweep_stale_orders();

        assert_eq!(report.failed, 2);
    }

    #[test]
    fn test_waiters_rotate_and_drop_out_when_full() {
        let mut fx = Fixture::new();
        fx.staff("Remy", Role::Chef, 5);
        let w1 = fx.staff("Walt", Role::Waiter, 1);
        let w2 = fx.staff("Wanda", Role::Waiter, 5);
        let orders: Vec<OrderId> = (1..=3)
            .map(|table| {
                let booking = fx.booking(table);
                fx.order(booking)
            })
            .collect();
        fx.clock.advance(Duration::minutes(5));

        fx.kitchen.sweep_stale_orders();

        assert_eq!(fx.load(orders[0]).waiter_id, Some(w1));
        assert_eq!(fx.load(orders[1]).waiter_id, Some(w2));
        assert_eq!(fx.load(orders[2]).waiter_id, Some(w2));
        assert_eq!(fx.load_staff(w1).current_active_orders(), 1);
        assert_eq!(fx.load_staff(w2).current_active_orders(), 2);
    }

    #[test]
    fn test_queue_sweep_activates_freed_chef() {
        let mut fx = Fixture::new();
        let chef = fx.staff("Remy", Role::Chef, 1);
        let first_booking = fx.booking(1);
        let first = fx.order(first_booking);
        fx.kitchen.assign_chef(first, chef).unwrap();
        let booking = fx.booking(2);
        let order = fx.order(booking);
        let _ = fx.kitchen.assign_chef(order, chef);

        // Cancelling frees capacity without draining.
        fx.kitchen.cancel_order(first, fx.customer).unwrap();
        assert_eq!(fx.load(order).chef_id, None);

        let report = fx.kitchen.sweep_queues();

        assert_eq!(report.activated, 1);
        assert_eq!(fx.load(order).chef_id, Some(chef));
        assert_eq!(fx.load_staff(chef).current_active_orders(), 1);
    }
}
