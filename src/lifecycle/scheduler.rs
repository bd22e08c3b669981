//! # Reassignment Scheduler
//!
//! Runs the stale-order sweep and the queue-drain sweep on independent
//! timers. Each sweep is a single request to the kitchen actor, so it is
//! serialized with staff and customer calls like any other operation.
//!
//! A loop awaits its sweep before waiting for the next tick, and a per-kind
//! guard makes a manual [`ReassignmentScheduler::trigger`] skip rather than
//! overlap a sweep of the same kind that is still running. Failures are
//! logged and the loop carries on with the next tick.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::KitchenConfig;
use crate::engine::{SweepKind, SweepReport};
use crate::kitchen_actor::KitchenError;

/// Something that can run a sweep. Implemented by
/// [`KitchenClient`](crate::clients::KitchenClient).
#[async_trait]
pub trait SweepTarget: Send + Sync + 'static {
    async fn sweep(&self, kind: SweepKind) -> Result<SweepReport, KitchenError>;
}

struct SweepRunner<T: SweepTarget> {
    target: T,
    stale_running: Mutex<()>,
    drain_running: Mutex<()>,
}

impl<T: SweepTarget> SweepRunner<T> {
    async fn run_once(&self, kind: SweepKind) -> Option<SweepReport> {
        let guard = match kind {
            SweepKind::Stale => &self.stale_running,
            SweepKind::QueueDrain => &self.drain_running,
        };
        let Ok(_running) = guard.try_lock() else {
            debug!(%kind, "Sweep already running, skipped");
            return None;
        };

        match self.target.sweep(kind).await {
            Ok(report) => {
                if report.is_empty() {
                    debug!(%kind, "Sweep found nothing to do");
                } else {
                    info!(
                        %kind,
                        assigned = report.assigned,
                        queued = report.queued,
                        activated = report.activated,
                        discarded = report.discarded,
                        failed = report.failed,
                        "Sweep complete"
                    );
                }
                Some(report)
            }
            Err(e) => {
                error!(%kind, error = %e, "Sweep failed");
                None
            }
        }
    }
}

pub struct ReassignmentScheduler<T: SweepTarget> {
    runner: Arc<SweepRunner<T>>,
    stale_sweep_interval: Duration,
    queue_drain_interval: Duration,
    shutdown: CancellationToken,
}

impl<T: SweepTarget> Clone for ReassignmentScheduler<T> {
    fn clone(&self) -> Self {
        Self {
            runner: self.runner.clone(),
            stale_sweep_interval: self.stale_sweep_interval,
            queue_drain_interval: self.queue_drain_interval,
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<T: SweepTarget> ReassignmentScheduler<T> {
    pub fn new(target: T, config: &KitchenConfig, shutdown: CancellationToken) -> Self {
        Self {
            runner: Arc::new(SweepRunner {
                target,
                stale_running: Mutex::new(()),
                drain_running: Mutex::new(()),
            }),
            stale_sweep_interval: config.stale_sweep_interval,
            queue_drain_interval: config.queue_drain_interval,
            shutdown,
        }
    }

    /// Spawns both sweep loops. They stop when the shutdown token is
    /// cancelled.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        [
            (SweepKind::Stale, self.stale_sweep_interval),
            (SweepKind::QueueDrain, self.queue_drain_interval),
        ]
        .into_iter()
        .map(|(kind, period)| {
            tokio::spawn(sweep_loop(
                self.runner.clone(),
                kind,
                period,
                self.shutdown.clone(),
            ))
        })
        .collect()
    }

    /// Runs one sweep now. Returns `None` if the same kind is already running
    /// or the sweep failed.
    pub async fn trigger(&self, kind: SweepKind) -> Option<SweepReport> {
        self.runner.run_once(kind).await
    }
}

async fn sweep_loop<T: SweepTarget>(
    runner: Arc<SweepRunner<T>>,
    kind: SweepKind,
    period: Duration,
    shutdown: CancellationToken,
) {
    let period = period.max(Duration::from_millis(1));
    info!(%kind, period = ?period, "Sweep loop started");

    // First sweep one full period after startup.
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                runner.run_once(kind).await;
            }
        }
    }

    info!(%kind, "Sweep loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct CountingTarget {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl SweepTarget for Arc<CountingTarget> {
        async fn sweep(&self, kind: SweepKind) -> Result<SweepReport, KitchenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(KitchenError::ActorCommunicationError("gone".into()))
            } else {
                Ok(SweepReport::new(kind))
            }
        }
    }

    struct BlockingTarget {
        release: Notify,
        started: Notify,
    }

    #[async_trait]
    impl SweepTarget for Arc<BlockingTarget> {
        async fn sweep(&self, kind: SweepKind) -> Result<SweepReport, KitchenError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(SweepReport::new(kind))
        }
    }

    fn fast_config() -> KitchenConfig {
        KitchenConfig {
            stale_sweep_interval: Duration::from_millis(10),
            queue_drain_interval: Duration::from_millis(10),
            ..KitchenConfig::default()
        }
    }

    #[tokio::test]
    async fn test_loops_survive_failing_sweeps() {
        let target = Arc::new(CountingTarget {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let shutdown = CancellationToken::new();
        let scheduler = ReassignmentScheduler::new(target.clone(), &fast_config(), shutdown.clone());

        let handles = scheduler.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
        for handle in handles {
            handle.await.unwrap();
        }

        // Both loops kept ticking after their first failure.
        assert!(target.calls.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test]
    async fn test_shutdown_stops_loops_before_first_tick() {
        let target = Arc::new(CountingTarget::default());
        let shutdown = CancellationToken::new();
        let scheduler =
            ReassignmentScheduler::new(target.clone(), &KitchenConfig::default(), shutdown.clone());

        let handles = scheduler.start();
        shutdown.cancel();
        for handle in handles {
            tokio::time::timeout(Duration::from_secs(1), handle)
                .await
                .expect("loop should stop promptly")
                .unwrap();
        }

        assert_eq!(target.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_trigger_skips_while_same_kind_running() {
        let target = Arc::new(BlockingTarget {
            release: Notify::new(),
            started: Notify::new(),
        });
        let scheduler = ReassignmentScheduler::new(
            target.clone(),
            &KitchenConfig::default(),
            CancellationToken::new(),
        );

        let first = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.trigger(SweepKind::Stale).await })
        };
        target.started.notified().await;

        assert!(scheduler.trigger(SweepKind::Stale).await.is_none());

        target.release.notify_one();
        let report = first.await.unwrap().expect("first sweep should finish");
        assert_eq!(report.kind, SweepKind::Stale);
    }
}
