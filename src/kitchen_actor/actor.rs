//! # Kitchen Actor
//!
//! The server half of the kitchen. It owns the [`Kitchen`] engine and the
//! receiving end of the request channel, and handles one request at a time.
//!
//! **Concurrency Model**:
//! Staff calls, customer calls and both scheduler sweeps all arrive on the
//! same channel. Because the loop finishes one request before reading the
//! next, every engine operation (its validation, sibling re-checks, capacity
//! changes and queue edits) runs as one unit with no other request in
//! between. No `Mutex` is needed around the store.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::actions::{
    KitchenAction, KitchenActionResult, KitchenQuery, KitchenQueryResult, KitchenRequest,
};
use crate::clients::KitchenClient;
use crate::engine::{EngineError, Kitchen};
use crate::store::Repository;

pub struct KitchenActor<R: Repository> {
    receiver: mpsc::Receiver<KitchenRequest>,
    kitchen: Kitchen<R>,
}

impl<R: Repository> KitchenActor<R> {
    /// Creates the actor around `kitchen` together with its client.
    ///
    /// `buffer_size` bounds the request channel; callers wait for room when
    /// it is full.
    pub fn new(kitchen: Kitchen<R>, buffer_size: usize) -> (Self, KitchenClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self { receiver, kitchen };
        (actor, KitchenClient::new(sender))
    }

    /// Processes requests until every client has been dropped.
    pub async fn run(mut self) {
        info!("Kitchen actor started");

        while let Some(request) = self.receiver.recv().await {
            match request {
                KitchenRequest::Action { action, respond_to } => {
                    debug!(?action, "Action");
                    let label = action_label(&action);
                    let result = self.handle_action(action);
                    match &result {
                        Ok(_) => debug!(action = label, "Action ok"),
                        Err(e) => warn!(action = label, error = %e, "Action failed"),
                    }
                    let _ = respond_to.send(result);
                }
                KitchenRequest::Query { query, respond_to } => {
                    debug!(?query, "Query");
                    let _ = respond_to.send(self.handle_query(query));
                }
                KitchenRequest::Sweep { kind, respond_to } => {
                    debug!(%kind, "Sweep");
                    let report = self.kitchen.run_sweep(kind);
                    let _ = respond_to.send(Ok(report));
                }
            }
        }

        let orders = self.kitchen.repository().all_orders().len();
        info!(orders, "Kitchen actor shutdown");
    }

    fn handle_action(&mut self, action: KitchenAction) -> Result<KitchenActionResult, EngineError> {
        use KitchenActionResult as Out;
        let k = &mut self.kitchen;
        match action {
            KitchenAction::RegisterStaff(params) => k.register_staff(params).map(Out::Staff),
            KitchenAction::SetStaffEnabled { staff_id, enabled } => {
                k.set_staff_enabled(staff_id, enabled).map(Out::Staff)
            }
            KitchenAction::SetStaffAvailability {
                staff_id,
                available,
            } => k.set_staff_availability(staff_id, available).map(Out::Staff),
            KitchenAction::AddMenuItem(params) => k.add_menu_item(params).map(Out::MenuItem),
            KitchenAction::SetMenuItemAvailable {
                menu_item_id,
                available,
            } => k
                .set_menu_item_available(menu_item_id, available)
                .map(Out::MenuItem),
            KitchenAction::CreateBooking(params) => k.create_booking(params).map(Out::Booking),
            KitchenAction::CreateOrder {
                customer_id,
                params,
            } => k.create_order(customer_id, params).map(Out::Order),
            KitchenAction::AssignChef { order_id, chef_id } => {
                k.assign_chef(order_id, chef_id).map(Out::Order)
            }
            KitchenAction::AssignWaiter {
                order_id,
                waiter_id,
            } => k.assign_waiter(order_id, waiter_id).map(Out::Order),
            KitchenAction::AssignStaff {
                order_id,
                chef_id,
                waiter_id,
            } => k.assign_staff(order_id, chef_id, waiter_id).map(Out::Order),
            KitchenAction::StartPreparation { order_id, chef_id } => {
                k.start_preparation(order_id, chef_id).map(Out::Order)
            }
            KitchenAction::MarkReady { order_id, chef_id } => {
                k.mark_ready(order_id, chef_id).map(Out::Order)
            }
            KitchenAction::MarkServed {
                order_id,
                waiter_id,
            } => k.mark_served(order_id, waiter_id).map(Out::Order),
            KitchenAction::CancelOrder {
                order_id,
                customer_id,
            } => k.cancel_order(order_id, customer_id).map(Out::Order),
            KitchenAction::CancelOrderByAdmin { order_id, admin_id } => {
                k.cancel_order_by_admin(order_id, admin_id).map(Out::Order)
            }
            KitchenAction::UpdateOrderNotes { order_id, notes } => {
                k.update_order_notes(order_id, notes).map(Out::Order)
            }
        }
    }

    fn handle_query(&self, query: KitchenQuery) -> Result<KitchenQueryResult, EngineError> {
        use KitchenQueryResult as Out;
        let k = &self.kitchen;
        match query {
            KitchenQuery::Order(id) => k.order(id).map(Out::Order),
            KitchenQuery::Staff(id) => k.staff(id).map(Out::Staff),
            KitchenQuery::Booking(id) => k.booking(id).map(Out::Booking),
            KitchenQuery::Queue { role, staff_id } => k.queue(role, staff_id).map(Out::Queue),
            KitchenQuery::AllOrders => Ok(Out::Orders(k.all_orders())),
            KitchenQuery::CustomerOrders(id) => k.customer_orders(id).map(Out::Orders),
            KitchenQuery::PendingOrders => Ok(Out::Orders(k.pending_orders())),
            KitchenQuery::ChefNewOrders(id) => k.chef_new_orders(id).map(Out::Orders),
            KitchenQuery::ChefActiveOrders(id) => k.chef_active_orders(id).map(Out::Orders),
            KitchenQuery::ChefCompletedToday(id) => k.chef_completed_today(id).map(Out::Orders),
            KitchenQuery::WaiterReadyOrders(id) => k.waiter_ready_orders(id).map(Out::Orders),
            KitchenQuery::WaiterAssignedOrders(id) => {
                k.waiter_assigned_orders(id).map(Out::Orders)
            }
            KitchenQuery::WaiterPreparingOrders(id) => {
                k.waiter_preparing_orders(id).map(Out::Orders)
            }
            KitchenQuery::AdminStats => Ok(Out::AdminStats(k.admin_stats())),
        }
    }
}

fn action_label(action: &KitchenAction) -> &'static str {
    match action {
        KitchenAction::RegisterStaff(_) => "register_staff",
        KitchenAction::SetStaffEnabled { .. } => "set_staff_enabled",
        KitchenAction::SetStaffAvailability { .. } => "set_staff_availability",
        KitchenAction::AddMenuItem(_) => "add_menu_item",
        KitchenAction::SetMenuItemAvailable { .. } => "set_menu_item_available",
        KitchenAction::CreateBooking(_) => "create_booking",
        KitchenAction::CreateOrder { .. } => "create_order",
        KitchenAction::AssignChef { .. } => "assign_chef",
        KitchenAction::AssignWaiter { .. } => "assign_waiter",
        KitchenAction::AssignStaff { .. } => "assign_staff",
        KitchenAction::StartPreparation { .. } => "start_preparation",
        KitchenAction::MarkReady { .. } => "mark_ready",
        KitchenAction::MarkServed { .. } => "mark_served",
        KitchenAction::CancelOrder { .. } => "cancel_order",
        KitchenAction::CancelOrderByAdmin { .. } => "cancel_order_by_admin",
        KitchenAction::UpdateOrderNotes { .. } => "update_order_notes",
    }
}
