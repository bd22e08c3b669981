//! Messages understood by the kitchen actor.
//!
//! Mutations travel as [`KitchenAction`]s, reads as [`KitchenQuery`]s and
//! scheduler work as `Sweep`s. Each request carries its own oneshot
//! responder; the engine's error comes back through it unchanged.

use tokio::sync::oneshot;

use crate::engine::{AdminStats, EngineError, SweepKind, SweepReport};
use crate::model::{
    BookingCreate, BookingId, MenuItem, MenuItemCreate, MenuItemId, Order, OrderCreate, OrderId,
    QueueEntry, QueueRole, StaffCreate, StaffId, StaffMember, TableBooking,
};

pub type Response<T> = oneshot::Sender<Result<T, EngineError>>;

/// State-changing operations.
#[derive(Debug, Clone)]
pub enum KitchenAction {
    RegisterStaff(StaffCreate),
    SetStaffEnabled { staff_id: StaffId, enabled: bool },
    SetStaffAvailability { staff_id: StaffId, available: bool },
    AddMenuItem(MenuItemCreate),
    SetMenuItemAvailable { menu_item_id: MenuItemId, available: bool },
    CreateBooking(BookingCreate),
    CreateOrder { customer_id: StaffId, params: OrderCreate },
    AssignChef { order_id: OrderId, chef_id: StaffId },
    AssignWaiter { order_id: OrderId, waiter_id: StaffId },
    AssignStaff {
        order_id: OrderId,
        chef_id: StaffId,
        waiter_id: Option<StaffId>,
    },
    StartPreparation { order_id: OrderId, chef_id: StaffId },
    MarkReady { order_id: OrderId, chef_id: StaffId },
    MarkServed { order_id: OrderId, waiter_id: StaffId },
    CancelOrder { order_id: OrderId, customer_id: StaffId },
    CancelOrderByAdmin { order_id: OrderId, admin_id: StaffId },
    UpdateOrderNotes { order_id: OrderId, notes: Option<String> },
}

/// Results from KitchenActions, one variant per record type returned.
#[derive(Debug, Clone)]
pub enum KitchenActionResult {
    Staff(StaffMember),
    MenuItem(MenuItem),
    Booking(TableBooking),
    Order(Order),
}

/// Read-only requests.
#[derive(Debug, Clone)]
pub enum KitchenQuery {
    Order(OrderId),
    Staff(StaffId),
    Booking(BookingId),
    Queue { role: QueueRole, staff_id: StaffId },
    AllOrders,
    CustomerOrders(StaffId),
    PendingOrders,
    ChefNewOrders(StaffId),
    ChefActiveOrders(StaffId),
    ChefCompletedToday(StaffId),
    WaiterReadyOrders(StaffId),
    WaiterAssignedOrders(StaffId),
    WaiterPreparingOrders(StaffId),
    AdminStats,
}

#[derive(Debug, Clone)]
pub enum KitchenQueryResult {
    Order(Order),
    Orders(Vec<Order>),
    Staff(StaffMember),
    Booking(TableBooking),
    Queue(Vec<QueueEntry>),
    AdminStats(AdminStats),
}

#[derive(Debug)]
pub enum KitchenRequest {
    Action {
        action: KitchenAction,
        respond_to: Response<KitchenActionResult>,
    },
    Query {
        query: KitchenQuery,
        respond_to: Response<KitchenQueryResult>,
    },
    Sweep {
        kind: SweepKind,
        respond_to: Response<SweepReport>,
    },
}
