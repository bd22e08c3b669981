use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::scheduler::ReassignmentScheduler;
use crate::clients::KitchenClient;
use crate::clock::{Clock, SystemClock};
use crate::config::KitchenConfig;

/// The running kitchen: the actor, its client, and the reassignment
/// scheduler.
///
/// # Example
///
/// ```ignore
/// let system = KitchenSystem::new(KitchenConfig::default());
///
/// let chef = system.client.register_staff(StaffCreate::new("Remy", Role::Chef, 3)).await?;
/// let order = system.client.create_order(customer.id, params).await?;
/// system.client.assign_chef(order.id, chef.id).await?;
///
/// system.shutdown().await?;
/// ```
pub struct KitchenSystem {
    /// Client for interacting with the Kitchen actor
    pub client: KitchenClient,

    scheduler: ReassignmentScheduler<KitchenClient>,
    shutdown_token: CancellationToken,
    actor_handle: JoinHandle<()>,
    scheduler_handles: Vec<JoinHandle<()>>,
}

impl KitchenSystem {
    pub fn new(config: KitchenConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Starts the system on an explicit clock.
    ///
    /// 1. Creates the kitchen actor and its client
    /// 2. Spawns the actor
    /// 3. Starts both sweep loops against a clone of the client
    pub fn with_clock(config: KitchenConfig, clock: Arc<dyn Clock>) -> Self {
        let (actor, client) = crate::kitchen_actor::new(&config, clock);
        let actor_handle = tokio::spawn(actor.run());

        let shutdown_token = CancellationToken::new();
        let scheduler = ReassignmentScheduler::new(client.clone(), &config, shutdown_token.clone());
        let scheduler_handles = scheduler.start();

        info!(
            stale_after = ?config.stale_after,
            stale_sweep_interval = ?config.stale_sweep_interval,
            queue_drain_interval = ?config.queue_drain_interval,
            "Kitchen system started"
        );

        Self {
            client,
            scheduler,
            shutdown_token,
            actor_handle,
            scheduler_handles,
        }
    }

    /// The scheduler driving the background sweeps. Use
    /// [`ReassignmentScheduler::trigger`] to run a sweep immediately.
    pub fn scheduler(&self) -> &ReassignmentScheduler<KitchenClient> {
        &self.scheduler
    }

    /// Stops the sweep loops, closes the actor's channel, and waits for every
    /// task to finish.
    ///
    /// Clones of [`Self::client`] held elsewhere keep the channel open; drop
    /// them first or this will wait for them.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down kitchen...");

        self.shutdown_token.cancel();
        for handle in self.scheduler_handles {
            if let Err(e) = handle.await {
                error!("Scheduler task failed: {:?}", e);
                return Err(format!("Scheduler task failed: {:?}", e));
            }
        }

        // The scheduler holds a client clone too.
        drop(self.scheduler);
        drop(self.client);

        if let Err(e) = self.actor_handle.await {
            error!("Kitchen actor failed: {:?}", e);
            return Err(format!("Kitchen actor failed: {:?}", e));
        }

        info!("Kitchen shutdown complete.");
        Ok(())
    }
}
