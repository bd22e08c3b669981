//! # Kitchen Client
//!
//! Typed async API over the kitchen actor's channel. One method per engine
//! operation; each returns the record the engine produced or a
//! [`KitchenError`].
//!
//! ```rust,ignore
//! let order = client.create_order(customer, params).await?;
//! match client.assign_chef(order.id, chef).await {
//!     Ok(order) => info!(chef = ?order.chef_id, "bound"),
//!     Err(e) if matches!(e.engine(), Some(EngineError::StaffBusy { .. })) => {
//!         // queued; the next queue-drain sweep will pick it up
//!     }
//!     Err(e) => return Err(e),
//! }
//! ```

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use crate::engine::{AdminStats, SweepKind, SweepReport};
use crate::kitchen_actor::{
    KitchenAction, KitchenActionResult, KitchenError, KitchenQuery, KitchenQueryResult,
    KitchenRequest, Response,
};
use crate::lifecycle::SweepTarget;
use crate::model::{
    BookingCreate, BookingId, MenuItem, MenuItemCreate, MenuItemId, Order, OrderCreate, OrderId,
    QueueEntry, QueueRole, StaffCreate, StaffId, StaffMember, TableBooking,
};

/// Client for interacting with the Kitchen actor. Cheap to clone.
#[derive(Clone)]
pub struct KitchenClient {
    sender: mpsc::Sender<KitchenRequest>,
}

impl KitchenClient {
    pub fn new(sender: mpsc::Sender<KitchenRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> KitchenRequest,
    ) -> Result<T, KitchenError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|e| KitchenError::ActorCommunicationError(e.to_string()))?;
        let result = response
            .await
            .map_err(|e| KitchenError::ActorCommunicationError(e.to_string()))?;
        Ok(result?)
    }

    async fn action(&self, action: KitchenAction) -> Result<KitchenActionResult, KitchenError> {
        self.request(|respond_to| KitchenRequest::Action { action, respond_to })
            .await
    }

    async fn query(&self, query: KitchenQuery) -> Result<KitchenQueryResult, KitchenError> {
        self.request(|respond_to| KitchenRequest::Query { query, respond_to })
            .await
    }

    async fn order_action(&self, action: KitchenAction) -> Result<Order, KitchenError> {
        match self.action(action).await? {
            KitchenActionResult::Order(order) => Ok(order),
            _ => Err(KitchenError::UnexpectedResponse),
        }
    }

    async fn staff_action(&self, action: KitchenAction) -> Result<StaffMember, KitchenError> {
        match self.action(action).await? {
            KitchenActionResult::Staff(staff) => Ok(staff),
            _ => Err(KitchenError::UnexpectedResponse),
        }
    }

    async fn orders_query(&self, query: KitchenQuery) -> Result<Vec<Order>, KitchenError> {
        match self.query(query).await? {
            KitchenQueryResult::Orders(orders) => Ok(orders),
            _ => Err(KitchenError::UnexpectedResponse),
        }
    }

    // --- Setup ---

    #[instrument(skip(self))]
    pub async fn register_staff(&self, params: StaffCreate) -> Result<StaffMember, KitchenError> {
        self.staff_action(KitchenAction::RegisterStaff(params)).await
    }

    #[instrument(skip(self))]
    pub async fn set_staff_enabled(
        &self,
        staff_id: StaffId,
        enabled: bool,
    ) -> Result<StaffMember, KitchenError> {
        self.staff_action(KitchenAction::SetStaffEnabled { staff_id, enabled })
            .await
    }

    #[instrument(skip(self))]
    pub async fn set_staff_availability(
        &self,
        staff_id: StaffId,
        available: bool,
    ) -> Result<StaffMember, KitchenError> {
        self.staff_action(KitchenAction::SetStaffAvailability {
            staff_id,
            available,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn add_menu_item(&self, params: MenuItemCreate) -> Result<MenuItem, KitchenError> {
        match self.action(KitchenAction::AddMenuItem(params)).await? {
            KitchenActionResult::MenuItem(item) => Ok(item),
            _ => Err(KitchenError::UnexpectedResponse),
        }
    }

    #[instrument(skip(self))]
    pub async fn set_menu_item_available(
        &self,
        menu_item_id: MenuItemId,
        available: bool,
    ) -> Result<MenuItem, KitchenError> {
        match self
            .action(KitchenAction::SetMenuItemAvailable {
                menu_item_id,
                available,
            })
            .await?
        {
            KitchenActionResult::MenuItem(item) => Ok(item),
            _ => Err(KitchenError::UnexpectedResponse),
        }
    }

    #[instrument(skip(self))]
    pub async fn create_booking(&self, params: BookingCreate) -> Result<TableBooking, KitchenError> {
        match self.action(KitchenAction::CreateBooking(params)).await? {
            KitchenActionResult::Booking(booking) => Ok(booking),
            _ => Err(KitchenError::UnexpectedResponse),
        }
    }

    // --- Orders ---

    #[instrument(skip(self))]
    pub async fn create_order(
        &self,
        customer_id: StaffId,
        params: OrderCreate,
    ) -> Result<Order, KitchenError> {
        self.order_action(KitchenAction::CreateOrder {
            customer_id,
            params,
        })
        .await
    }

    /// Binds a chef to the order and its table. Fails with
    /// `EngineError::StaffBusy` (after queueing the table) when the chef is
    /// full.
    #[instrument(skip(self))]
    pub async fn assign_chef(&self, order_id: OrderId, chef_id: StaffId) -> Result<Order, KitchenError> {
        self.order_action(KitchenAction::AssignChef { order_id, chef_id })
            .await
    }

    /// Binds a waiter to the order and its table. Succeeds even when the
    /// waiter is full; the orders then wait in the waiter's queue.
    #[instrument(skip(self))]
    pub async fn assign_waiter(
        &self,
        order_id: OrderId,
        waiter_id: StaffId,
    ) -> Result<Order, KitchenError> {
        self.order_action(KitchenAction::AssignWaiter {
            order_id,
            waiter_id,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn assign_staff(
        &self,
        order_id: OrderId,
        chef_id: StaffId,
        waiter_id: Option<StaffId>,
    ) -> Result<Order, KitchenError> {
        self.order_action(KitchenAction::AssignStaff {
            order_id,
            chef_id,
            waiter_id,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn start_preparation(
        &self,
        order_id: OrderId,
        chef_id: StaffId,
    ) -> Result<Order, KitchenError> {
        self.order_action(KitchenAction::StartPreparation { order_id, chef_id })
            .await
    }

    #[instrument(skip(self))]
    pub async fn mark_ready(&self, order_id: OrderId, chef_id: StaffId) -> Result<Order, KitchenError> {
        self.order_action(KitchenAction::MarkReady { order_id, chef_id })
            .await
    }

    #[instrument(skip(self))]
    pub async fn mark_served(
        &self,
        order_id: OrderId,
        waiter_id: StaffId,
    ) -> Result<Order, KitchenError> {
        self.order_action(KitchenAction::MarkServed {
            order_id,
            waiter_id,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn cancel_order(
        &self,
        order_id: OrderId,
        customer_id: StaffId,
    ) -> Result<Order, KitchenError> {
        self.order_action(KitchenAction::CancelOrder {
            order_id,
            customer_id,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn cancel_order_by_admin(
        &self,
        order_id: OrderId,
        admin_id: StaffId,
    ) -> Result<Order, KitchenError> {
        self.order_action(KitchenAction::CancelOrderByAdmin { order_id, admin_id })
            .await
    }

    #[instrument(skip(self))]
    pub async fn update_order_notes(
        &self,
        order_id: OrderId,
        notes: Option<String>,
    ) -> Result<Order, KitchenError> {
        self.order_action(KitchenAction::UpdateOrderNotes { order_id, notes })
            .await
    }

    // --- Reads ---

    pub async fn order(&self, order_id: OrderId) -> Result<Order, KitchenError> {
        match self.query(KitchenQuery::Order(order_id)).await? {
            KitchenQueryResult::Order(order) => Ok(order),
            _ => Err(KitchenError::UnexpectedResponse),
        }
    }

    pub async fn staff(&self, staff_id: StaffId) -> Result<StaffMember, KitchenError> {
        match self.query(KitchenQuery::Staff(staff_id)).await? {
            KitchenQueryResult::Staff(staff) => Ok(staff),
            _ => Err(KitchenError::UnexpectedResponse),
        }
    }

    pub async fn booking(&self, booking_id: BookingId) -> Result<TableBooking, KitchenError> {
        match self.query(KitchenQuery::Booking(booking_id)).await? {
            KitchenQueryResult::Booking(booking) => Ok(booking),
            _ => Err(KitchenError::UnexpectedResponse),
        }
    }

    pub async fn queue(
        &self,
        role: QueueRole,
        staff_id: StaffId,
    ) -> Result<Vec<QueueEntry>, KitchenError> {
        match self.query(KitchenQuery::Queue { role, staff_id }).await? {
            KitchenQueryResult::Queue(entries) => Ok(entries),
            _ => Err(KitchenError::UnexpectedResponse),
        }
    }

    pub async fn all_orders(&self) -> Result<Vec<Order>, KitchenError> {
        self.orders_query(KitchenQuery::AllOrders).await
    }

    pub async fn customer_orders(&self, customer_id: StaffId) -> Result<Vec<Order>, KitchenError> {
        self.orders_query(KitchenQuery::CustomerOrders(customer_id))
            .await
    }

    pub async fn pending_orders(&self) -> Result<Vec<Order>, KitchenError> {
        self.orders_query(KitchenQuery::PendingOrders).await
    }

    pub async fn chef_new_orders(&self, chef_id: StaffId) -> Result<Vec<Order>, KitchenError> {
        self.orders_query(KitchenQuery::ChefNewOrders(chef_id)).await
    }

    pub async fn chef_active_orders(&self, chef_id: StaffId) -> Result<Vec<Order>, KitchenError> {
        self.orders_query(KitchenQuery::ChefActiveOrders(chef_id))
            .await
    }

    pub async fn chef_completed_today(&self, chef_id: StaffId) -> Result<Vec<Order>, KitchenError> {
        self.orders_query(KitchenQuery::ChefCompletedToday(chef_id))
            .await
    }

    pub async fn waiter_ready_orders(&self, waiter_id: StaffId) -> Result<Vec<Order>, KitchenError> {
        self.orders_query(KitchenQuery::WaiterReadyOrders(waiter_id))
            .await
    }

    pub async fn waiter_assigned_orders(
        &self,
        waiter_id: StaffId,
    ) -> Result<Vec<Order>, KitchenError> {
        self.orders_query(KitchenQuery::WaiterAssignedOrders(waiter_id))
            .await
    }

    pub async fn waiter_preparing_orders(
        &self,
        waiter_id: StaffId,
    ) -> Result<Vec<Order>, KitchenError> {
        self.orders_query(KitchenQuery::WaiterPreparingOrders(waiter_id))
            .await
    }

    pub async fn admin_stats(&self) -> Result<AdminStats, KitchenError> {
        match self.query(KitchenQuery::AdminStats).await? {
            KitchenQueryResult::AdminStats(stats) => Ok(stats),
            _ => Err(KitchenError::UnexpectedResponse),
        }
    }

    // --- Sweeps ---

    /// Runs one sweep inside the actor, in line with other requests.
    #[instrument(skip(self))]
    pub async fn run_sweep(&self, kind: SweepKind) -> Result<SweepReport, KitchenError> {
        self.request(|respond_to| KitchenRequest::Sweep { kind, respond_to })
            .await
    }
}

#[async_trait]
impl SweepTarget for KitchenClient {
    async fn sweep(&self, kind: SweepKind) -> Result<SweepReport, KitchenError> {
        self.run_sweep(kind).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use crate::mock::{create_mock_client, expect_action, expect_query, expect_sweep};
    use crate::model::{OrderStatus, Role};
    use chrono::Utc;

    fn sample_order(id: u32) -> Order {
        Order::new(
            OrderId(id),
            StaffId(1),
            BookingId(1),
            Vec::new(),
            0,
            None,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_assign_chef_sends_action_and_returns_order() {
        let (client, mut receiver) = create_mock_client(10);

        let task = tokio::spawn(async move { client.assign_chef(OrderId(7), StaffId(3)).await });

        let (action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        match action {
            KitchenAction::AssignChef { order_id, chef_id } => {
                assert_eq!(order_id, OrderId(7));
                assert_eq!(chef_id, StaffId(3));
            }
            other => panic!("Expected AssignChef, got {:?}", other),
        }
        let mut order = sample_order(7);
        order.chef_id = Some(StaffId(3));
        responder.send(Ok(KitchenActionResult::Order(order))).unwrap();

        let result = task.await.unwrap().unwrap();
        assert_eq!(result.chef_id, Some(StaffId(3)));
    }

    #[tokio::test]
    async fn test_engine_error_is_passed_through() {
        let (client, mut receiver) = create_mock_client(10);

        let task = tokio::spawn(async move { client.mark_ready(OrderId(1), StaffId(2)).await });

        let (_, responder) = expect_action(&mut receiver).await.unwrap();
        responder
            .send(Err(EngineError::InvalidTransition {
                current: OrderStatus::Pending,
                requested: OrderStatus::Ready,
            }))
            .unwrap();

        let result = task.await.unwrap();
        assert_eq!(
            result.unwrap_err().engine(),
            Some(&EngineError::InvalidTransition {
                current: OrderStatus::Pending,
                requested: OrderStatus::Ready,
            })
        );
    }

    #[tokio::test]
    async fn test_wrong_result_shape_is_unexpected_response() {
        let (client, mut receiver) = create_mock_client(10);

        let task = tokio::spawn(async move { client.order(OrderId(1)).await });

        let (query, responder) = expect_query(&mut receiver).await.unwrap();
        assert!(matches!(query, KitchenQuery::Order(OrderId(1))));
        responder.send(Ok(KitchenQueryResult::Orders(Vec::new()))).unwrap();

        assert_eq!(task.await.unwrap(), Err(KitchenError::UnexpectedResponse));
    }

    #[tokio::test]
    async fn test_dropped_responder_is_communication_error() {
        let (client, mut receiver) = create_mock_client(10);

        let task = tokio::spawn(async move {
            client
                .register_staff(StaffCreate::new("Remy", Role::Chef, 2))
                .await
        });

        let (_, responder) = expect_action(&mut receiver).await.unwrap();
        drop(responder);

        assert!(matches!(
            task.await.unwrap(),
            Err(KitchenError::ActorCommunicationError(_))
        ));
    }

    #[tokio::test]
    async fn test_closed_channel_is_communication_error() {
        let (client, receiver) = create_mock_client(10);
        drop(receiver);

        let result = client.pending_orders().await;
        assert!(matches!(result, Err(KitchenError::ActorCommunicationError(_))));
    }

    #[tokio::test]
    async fn test_sweep_target_forwards_kind() {
        let (client, mut receiver) = create_mock_client(10);

        let task = tokio::spawn(async move { client.sweep(SweepKind::QueueDrain).await });

        let (kind, responder) = expect_sweep(&mut receiver).await.unwrap();
        assert_eq!(kind, SweepKind::QueueDrain);
        responder.send(Ok(SweepReport::new(kind))).unwrap();

        let report = task.await.unwrap().unwrap();
        assert_eq!(report.kind, SweepKind::QueueDrain);
    }
}
