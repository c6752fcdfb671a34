//! Bounded fan-out for per-unit work such as persisting bulk rows.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// What happened to one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Persisted,
    /// Rejected by validation; the unit is dropped.
    Skipped(String),
    /// Validated but could not be written.
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub persisted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl PoolReport {
    pub fn total(&self) -> usize {
        self.persisted + self.skipped + self.failed
    }

    fn record(&mut self, outcome: &UnitOutcome) {
        match outcome {
            UnitOutcome::Persisted => self.persisted += 1,
            UnitOutcome::Skipped(_) => self.skipped += 1,
            UnitOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Run `work` over every item with at most `concurrency` units in flight.
///
/// Units complete in any order. Returns once every unit has reported; a unit whose
/// task panics is counted as failed.
pub async fn run_bounded<T, F, Fut>(concurrency: usize, items: Vec<T>, work: F) -> PoolReport
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = UnitOutcome> + Send + 'static,
{
    let expected = items.len();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let (results_tx, mut results_rx) = mpsc::channel::<UnitOutcome>(concurrency.max(1));
    let work = Arc::new(work);

    let dispatcher = tokio::spawn(async move {
        for item in items {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let tx = results_tx.clone();
            let work = work.clone();
            tokio::spawn(async move {
                let _permit = permit;
                let outcome = work(item).await;
                let _ = tx.send(outcome).await;
            });
        }
    });

    let mut report = PoolReport::default();
    while let Some(outcome) = results_rx.recv().await {
        report.record(&outcome);
    }

    if let Err(e) = dispatcher.await {
        tracing::error!(error = %e, "Worker pool dispatcher failed");
    }

    let missing = expected.saturating_sub(report.total());
    if missing > 0 {
        tracing::error!(missing = missing, "Worker pool units ended without reporting");
        report.failed += missing;
    }

    report
}
