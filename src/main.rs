//! # Brigade Demo
//!
//! Walks one evening service through the kitchen:
//! 1.  Starting the [`KitchenSystem`].
//! 2.  Registering staff, a menu and a guest's table.
//! 3.  Placing orders, assigning a chef, and watching a second table queue
//!     behind a full chef until the queue-drain sweep promotes it.
//! 4.  Cooking, serving and closing out the table.

use brigade::config::{KitchenConfig, CONFIG_ENV_VAR};
use brigade::engine::SweepKind;
use brigade::lifecycle::{setup_tracing, KitchenSystem};
use brigade::model::{
    BookingCreate, MenuItemCreate, OrderCreate, OrderItemRequest, Role, StaffCreate,
};
use chrono::Utc;
use tracing::{info, warn, Instrument};

fn load_config() -> Result<KitchenConfig, String> {
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) => {
            info!(path = %path, "Loading kitchen config");
            KitchenConfig::load(&path).map_err(|e| e.to_string())
        }
        Err(_) => Ok(KitchenConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = load_config()?;
    info!("Starting kitchen");
    let system = KitchenSystem::new(config);
    let client = &system.client;

    let span = tracing::info_span!("staffing");
    let (chef, waiter, guest, other_guest) = async {
        let chef = client
            .register_staff(StaffCreate::new("Remy", Role::Chef, 1))
            .await?;
        let waiter = client
            .register_staff(StaffCreate::new("Colette", Role::Waiter, 2))
            .await?;
        let guest = client
            .register_staff(StaffCreate::new("Anton", Role::Customer, 1))
            .await?;
        let other_guest = client
            .register_staff(StaffCreate::new("Emile", Role::Customer, 1))
            .await?;
        Ok::<_, brigade::kitchen_actor::KitchenError>((chef, waiter, guest, other_guest))
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    let soup = client
        .add_menu_item(MenuItemCreate {
            name: "Ratatouille".to_string(),
            price_cents: 1450,
        })
        .await
        .map_err(|e| e.to_string())?;

    let today = Utc::now().date_naive();
    let mut tables = Vec::new();
    for (customer, table_number) in [(guest.id, 4), (other_guest.id, 7)] {
        let booking = client
            .create_booking(BookingCreate {
                customer_id: customer,
                booking_date: today,
                time_slot: "19:00".to_string(),
                table_number,
                number_of_guests: 2,
                special_requests: None,
            })
            .await
            .map_err(|e| e.to_string())?;
        let order = client
            .create_order(
                customer,
                OrderCreate {
                    booking_id: booking.id,
                    items: vec![OrderItemRequest {
                        menu_item_id: soup.id,
                        quantity: 2,
                    }],
                    discount_cents: 0,
                    payment_method: Some("card".to_string()),
                },
            )
            .await
            .map_err(|e| e.to_string())?;
        info!(order_id = %order.id, total_cents = order.total_cents(), "Order placed");
        tables.push(order);
    }

    let first = client
        .assign_staff(tables[0].id, chef.id, Some(waiter.id))
        .await
        .map_err(|e| e.to_string())?;
    info!(order_id = %first.id, "First table assigned");

    // Chef is full; the second table waits in the chef's queue.
    if let Err(e) = client.assign_chef(tables[1].id, chef.id).await {
        warn!(order_id = %tables[1].id, error = %e, "Second table queued");
    }

    let span = tracing::info_span!("service", order_id = %first.id);
    async {
        client.start_preparation(first.id, chef.id).await?;
        client.mark_ready(first.id, chef.id).await?;
        client.mark_served(first.id, waiter.id).await?;
        Ok::<_, brigade::kitchen_actor::KitchenError>(())
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    // Marking ready already freed the chef; a sweep finds nothing left over.
    let report = client
        .run_sweep(SweepKind::QueueDrain)
        .await
        .map_err(|e| e.to_string())?;
    info!(activated = report.activated, "Queue drain sweep ran");

    let second = client.order(tables[1].id).await.map_err(|e| e.to_string())?;
    info!(order_id = %second.id, chef = ?second.chef_id, status = %second.status, "Second table");

    let stats = client.admin_stats().await.map_err(|e| e.to_string())?;
    info!(?stats, "End of service");

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Kitchen closed");
    Ok(())
}
