//! Background delivery of application pushes to the CRM.
//!
//! Requests enqueue a [`CrmPush`] and return immediately. A single worker
//! drains the bounded queue and runs pushes concurrently up to a fixed limit,
//! each under a timeout. Outcomes only show up in logs and [`CrmMetrics`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, warn};

use super::CrmClient;
use crate::config::CrmConfig;
use crate::ids::ApplicationId;

/// One application to announce to the CRM.
#[derive(Debug, Clone)]
pub struct CrmPush {
    pub application_id: ApplicationId,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
}

/// Push counters.
#[derive(Debug, Default)]
pub struct CrmMetrics {
    enqueued: AtomicU64,
    dropped: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`CrmMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrmMetricsSnapshot {
    pub enqueued: u64,
    pub dropped: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl CrmMetrics {
    pub fn snapshot(&self) -> CrmMetricsSnapshot {
        CrmMetricsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Handle to the push queue. Cloning shares the queue and counters.
#[derive(Clone)]
pub struct CrmDispatcher {
    tx: mpsc::Sender<CrmPush>,
    metrics: Arc<CrmMetrics>,
}

impl CrmDispatcher {
    /// Start the worker on the current Tokio runtime.
    pub fn spawn(client: Arc<dyn CrmClient>, config: &CrmConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let metrics = Arc::new(CrmMetrics::default());
        tokio::spawn(run_worker(
            rx,
            client,
            Arc::new(Semaphore::new(config.max_concurrent_pushes.max(1))),
            config.push_timeout(),
            Arc::clone(&metrics),
        ));
        Self { tx, metrics }
    }

    /// Queue a push without waiting. Returns `false` when the push was dropped.
    pub fn enqueue(&self, push: CrmPush) -> bool {
        let application_id = push.application_id;
        match self.tx.try_send(push) {
            Ok(()) => {
                self.metrics.enqueued.fetch_add(1, Ordering::Relaxed);
                debug!(application_id = %application_id, "crm push queued");
                true
            }
            Err(e) => {
                self.metrics.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(application_id = %application_id, error = %e, "crm push dropped");
                false
            }
        }
    }

    pub fn metrics(&self) -> CrmMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Log the current counters and return them.
    pub fn report(&self) -> CrmMetricsSnapshot {
        let m = self.metrics.snapshot();
        info!(
            enqueued = m.enqueued,
            dropped = m.dropped,
            succeeded = m.succeeded,
            failed = m.failed,
            "crm push metrics"
        );
        m
    }

    /// Log the counters every `period`, skipping periods in which nothing changed.
    pub fn spawn_reporter(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            let mut last = CrmMetricsSnapshot::default();
            loop {
                ticker.tick().await;
                if dispatcher.metrics() != last {
                    last = dispatcher.report();
                }
            }
        })
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<CrmPush>,
    client: Arc<dyn CrmClient>,
    permits: Arc<Semaphore>,
    push_timeout: Duration,
    metrics: Arc<CrmMetrics>,
) {
    while let Some(push) = rx.recv().await {
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            break;
        };
        let client = Arc::clone(&client);
        let metrics = Arc::clone(&metrics);
        tokio::spawn(async move {
            let _permit = permit;
            deliver(client.as_ref(), push, push_timeout, &metrics).await;
        });
    }
    debug!("crm dispatcher stopped");
}

async fn deliver(
    client: &dyn CrmClient,
    push: CrmPush,
    push_timeout: Duration,
    metrics: &CrmMetrics,
) {
    let id = push.application_id;
    let attempt = client.push_application(
        id,
        &push.phone_number,
        &push.first_name,
        &push.last_name,
    );
    match tokio::time::timeout(push_timeout, attempt).await {
        Ok(Ok(result)) if result.success => {
            metrics.succeeded.fetch_add(1, Ordering::Relaxed);
            info!(
                application_id = %id,
                crm_ref = result.reference_id.as_deref().unwrap_or(""),
                "application pushed to crm"
            );
        }
        Ok(Ok(result)) => {
            metrics.failed.fetch_add(1, Ordering::Relaxed);
            warn!(
                application_id = %id,
                error = result.error.as_deref().unwrap_or("unknown"),
                "crm rejected application push"
            );
        }
        Ok(Err(e)) => {
            metrics.failed.fetch_add(1, Ordering::Relaxed);
            warn!(application_id = %id, error = %e, "crm push failed");
        }
        Err(_) => {
            metrics.failed.fetch_add(1, Ordering::Relaxed);
            warn!(application_id = %id, timeout_ms = push_timeout.as_millis() as u64, "crm push timed out");
        }
    }
}
