//! Replication metrics sink.
//!
//! Counts cycle outcomes and logs each one. A snapshot of the counters is
//! served on `GET /replication/status`.

use chrono::{DateTime, Utc};
use replication_engine::{Error, MetricsSender};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Outcome of the most recent cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Outcome {
    Success { count: usize },
    Failure { error: String },
}

/// The most recent outcome with the time it was reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastCycle {
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub successful_cycles: u64,
    pub failed_cycles: u64,
    pub products_replicated: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_cycle: Option<LastCycle>,
}

/// Thread-safe metrics sink for replication cycles.
#[derive(Debug, Default)]
pub struct ReplicationMetrics {
    successful_cycles: AtomicU64,
    failed_cycles: AtomicU64,
    products_replicated: AtomicU64,
    last_cycle: Mutex<Option<LastCycle>>,
}

impl ReplicationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            successful_cycles: self.successful_cycles.load(Ordering::Relaxed),
            failed_cycles: self.failed_cycles.load(Ordering::Relaxed),
            products_replicated: self.products_replicated.load(Ordering::Relaxed),
            last_cycle: self
                .last_cycle
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    fn record(&self, outcome: Outcome) {
        *self
            .last_cycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(LastCycle {
            finished_at: Utc::now(),
            outcome,
        });
    }
}

impl MetricsSender for ReplicationMetrics {
    fn report_success(&self, count: usize) {
        self.successful_cycles.fetch_add(1, Ordering::Relaxed);
        self.products_replicated
            .fetch_add(count as u64, Ordering::Relaxed);
        self.record(Outcome::Success { count });

        tracing::info!(count, "Replication cycle succeeded");
    }

    fn report_failure(&self, err: &Error) {
        self.failed_cycles.fetch_add(1, Ordering::Relaxed);
        self.record(Outcome::Failure {
            error: err.to_string(),
        });

        match err {
            // Upstream problems are expected from time to time
            Error::ClientRequestFailed(_) | Error::NoProducts => {
                tracing::warn!(error = %err, "Replication cycle failed")
            }
            Error::Lookup(_) | Error::Save(_) => {
                tracing::error!(error = %err, "Replication cycle failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replication_engine::StorageError;
    use serde_json::json;

    #[test]
    fn starts_empty() {
        let snapshot = ReplicationMetrics::new().snapshot();

        assert_eq!(snapshot.successful_cycles, 0);
        assert_eq!(snapshot.failed_cycles, 0);
        assert_eq!(snapshot.products_replicated, 0);
        assert_eq!(snapshot.last_cycle, None);
    }

    #[test]
    fn counts_outcomes() {
        let metrics = ReplicationMetrics::new();

        metrics.report_success(3);
        metrics.report_success(4);
        metrics.report_failure(&Error::Save(StorageError::Database("boom".into())));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.successful_cycles, 2);
        assert_eq!(snapshot.failed_cycles, 1);
        assert_eq!(snapshot.products_replicated, 7);
        assert_eq!(
            snapshot.last_cycle.unwrap().outcome,
            Outcome::Failure {
                error: "product save failed: database error: boom".into()
            }
        );
    }

    #[test]
    fn snapshot_serialization() {
        let metrics = ReplicationMetrics::new();
        metrics.report_success(2);

        let value = serde_json::to_value(metrics.snapshot()).unwrap();

        assert_eq!(value["successfulCycles"], json!(1));
        assert_eq!(value["productsReplicated"], json!(2));
        assert_eq!(value["lastCycle"]["status"], json!("success"));
        assert_eq!(value["lastCycle"]["count"], json!(2));
        assert!(value["lastCycle"]["finishedAt"].is_string());
    }
}
