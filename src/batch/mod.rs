//! Batch orchestrator.
//!
//! Runs the lookup pipeline over a roster of names:
//! 1. Each name is an independent resolve → refresh → fetch → aggregate
//! 2. At most `concurrency` lookups are in flight; a slot is refilled as
//!    soon as any lookup finishes
//! 3. Each failure is classified into a bucket, never propagated
//!
//! Cancelling stops new lookups from starting; in-flight ones finish and
//! the partial result comes back flagged `cancelled`.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{FailureKind, StatsError};
use crate::models::{BatchResult, PlayerHandle, Report};
use crate::pipeline::LookupPipeline;

/// Where a failed name is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Private,
    NotFound,
}

impl Bucket {
    /// Bucketing policy for failed lookups.
    ///
    /// A profile that resolved but could not be refreshed or fetched is
    /// listed with the unknown names: the user can act on neither from a
    /// batch report. Same for documents the aggregator could not read.
    pub fn for_failure(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Private => Bucket::Private,
            FailureKind::NotFound
            | FailureKind::RefreshFailed
            | FailureKind::Parse
            | FailureKind::NoNames
            | FailureKind::Image => Bucket::NotFound,
        }
    }
}

/// Drives the lookup pipeline over many names.
pub struct BatchOrchestrator {
    pipeline: LookupPipeline,
    concurrency: usize,
    cancel_token: Arc<RwLock<bool>>,
}

impl BatchOrchestrator {
    /// Create an orchestrator running at most `concurrency` lookups at once.
    pub fn new(pipeline: LookupPipeline, concurrency: usize) -> Self {
        Self {
            pipeline,
            concurrency: concurrency.max(1),
            cancel_token: Arc::new(RwLock::new(false)),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Request cancellation of the running batch, or of the next one if
    /// none is running yet.
    pub async fn cancel(&self) {
        *self.cancel_token.write().await = true;
    }

    async fn is_cancelled(&self) -> bool {
        *self.cancel_token.read().await
    }

    /// Look up every name and partition the outcomes.
    ///
    /// `succeeded` follows input order. Names are not deduplicated here.
    /// Per-name failures never fail the batch; a cancelled run returns the
    /// names that finished with `cancelled` set.
    pub async fn process_roster<I>(&self, names: I) -> BatchResult
    where
        I: IntoIterator<Item = String>,
    {
        let names: Vec<String> = names.into_iter().collect();
        let start = std::time::Instant::now();
        info!(
            "Processing roster of {} names ({} concurrent)",
            names.len(),
            self.concurrency
        );

        let mut outcomes: Vec<(usize, Option<(String, Result<Report, StatsError>)>)> =
            stream::iter(names.into_iter().enumerate())
                .map(|(index, name)| async move {
                    if self.is_cancelled().await {
                        return (index, None);
                    }
                    let outcome = self.pipeline.lookup(&name).await;
                    (index, Some((name, outcome)))
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;
        outcomes.sort_by_key(|(index, _)| *index);

        let mut result = BatchResult::new();
        for (_, outcome) in outcomes {
            match outcome {
                Some((name, outcome)) => classify(&mut result, name, outcome),
                None => result.cancelled = true,
            }
        }

        // Reset cancel token for the next run
        *self.cancel_token.write().await = false;

        if result.cancelled {
            warn!(
                "Batch cancelled with {} names processed in {:?}",
                result.total(),
                start.elapsed()
            );
        } else {
            info!(
                "Batch completed: {} found, {} private, {} not found in {:?}",
                result.succeeded.len(),
                result.private.len(),
                result.not_found.len(),
                start.elapsed()
            );
        }

        result
    }
}

fn classify(result: &mut BatchResult, name: String, outcome: Result<Report, StatsError>) {
    match outcome {
        Ok(report) => result.succeeded.push(report),
        Err(err) => {
            warn!("Lookup for {} failed: {}", name, err);
            let handle = PlayerHandle::new(name);
            match Bucket::for_failure(err.kind()) {
                Bucket::Private => result.private.insert(handle),
                Bucket::NotFound => result.not_found.insert(handle),
            };
        }
    }
}
