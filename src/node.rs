use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::KitchenConfig;
use crate::dashboard::{serve_dashboard, DashboardState};
use crate::error::Result;
use crate::scheduler::Kitchen;

/// Kitchen shared between the tick loop and external callers.
///
/// Every mutation takes the write lock, so a tick is never interleaved with
/// order creation, cancellation or a pool resize.
pub type SharedKitchen = Arc<RwLock<Kitchen>>;

/// A running kitchen: the shared state plus the tasks that drive it.
pub struct Node {
    pub config: KitchenConfig,
    pub kitchen: SharedKitchen,
}

impl Node {
    pub fn new(config: KitchenConfig) -> Result<Self> {
        config.validate()?;
        let mut kitchen = Kitchen::with_max_bots(config.max_bots);
        kitchen.set_worker_count(config.initial_bots)?;
        Ok(Self {
            config,
            kitchen: Arc::new(RwLock::new(kitchen)),
        })
    }

    /// Handle to the shared kitchen for embedding callers.
    pub fn kitchen(&self) -> SharedKitchen {
        self.kitchen.clone()
    }

    /// Run the node until `shutdown` is cancelled.
    ///
    /// 1. Binds and spawns the dashboard, if configured
    /// 2. Runs the tick loop on the current task
    ///
    /// # Errors
    ///
    /// Returns an error if the dashboard address cannot be bound.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        if let Some(dashboard) = &self.config.dashboard {
            let listener = tokio::net::TcpListener::bind(dashboard.listen_addr).await?;
            let state = DashboardState {
                kitchen: self.kitchen.clone(),
            };
            let dashboard_shutdown = shutdown.clone();
            tokio::spawn(async move {
                serve_dashboard(listener, state, dashboard_shutdown).await;
            });
        }

        tracing::info!(
            tick_interval_ms = self.config.tick_interval_ms,
            bots = self.config.initial_bots,
            "Kitchen open"
        );

        Self::tick_loop(
            self.kitchen.clone(),
            Duration::from_millis(self.config.tick_interval_ms),
            shutdown,
        )
        .await;

        let stats = self.kitchen.read().await.stats();
        tracing::info!(
            ticks = stats.tick,
            pending = stats.pending,
            processing = stats.processing,
            completed = stats.completed,
            "Kitchen closed"
        );
        Ok(())
    }

    /// Tick the kitchen every `period` until `shutdown` fires.
    ///
    /// Ticks run one at a time. If a tick overruns its slot, the missed
    /// slots are dropped and the next tick waits for the following period
    /// boundary, so there is no catch-up burst.
    pub async fn tick_loop(kitchen: SharedKitchen, period: Duration, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick of an interval completes immediately.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    let report = kitchen.write().await.tick();
                    if !report.assigned.is_empty() || !report.completed.is_empty() {
                        tracing::debug!(
                            tick = report.tick,
                            assigned = report.assigned.len(),
                            completed = report.completed.len(),
                            "Tick"
                        );
                    }
                }
            }
        }
    }
}
