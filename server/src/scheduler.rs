//! Periodic replication.

use replication_engine::error::Result;
use replication_engine::{MetricsSender, ProductClient, ProductRepository, Service};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::Instrument;

/// Run one cycle inside its own tracing span.
///
/// The outcome has already been reported to the service's metrics sink when
/// this returns.
pub async fn run_cycle<C, R, M>(service: &Service<C, R, M>) -> Result<usize>
where
    C: ProductClient + Sync,
    R: ProductRepository + Sync,
    M: MetricsSender + Sync,
{
    let cycle_id = uuid::Uuid::new_v4();
    service
        .replicate()
        .instrument(tracing::info_span!("replication_cycle", %cycle_id))
        .await
}

/// Spawn a task that replicates every `period`, starting immediately.
///
/// Cycles never overlap within this task; a cycle that outlasts the period
/// causes the missed ticks to be skipped.
pub fn spawn<C, R, M>(service: Arc<Service<C, R, M>>, period: Duration) -> JoinHandle<()>
where
    C: ProductClient + Send + Sync + 'static,
    R: ProductRepository + Send + Sync + 'static,
    M: MetricsSender + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if let Ok(count) = run_cycle(service.as_ref()).await {
                tracing::debug!(count, next_in = ?period, "Scheduled replication done");
            }
        }
    })
}
