//! Batched rechecking of every open escalation.

use crate::error::Result;
use crate::escalation::EscalationProcessor;
use crate::metrics::ESCALATOR_METRICS;
use crate::state::EscalationStore;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Summary of one recheck run
#[derive(Debug, Clone, Default)]
pub struct RecheckOutcome {
    /// Escalations whose pass completed
    pub processed: usize,

    /// Escalations whose pass failed (isolated, never aborts the run)
    pub failed: usize,
}

/// Enumerates open escalations in bounded batches and dispatches one
/// independent evaluation task per escalation. Idempotent at the batch
/// level: de-duplication is delegated to the processor's watermark.
pub struct RecheckWorker {
    store: Arc<dyn EscalationStore>,
    processor: Arc<EscalationProcessor>,
    batch_size: usize,
}

impl RecheckWorker {
    pub fn new(store: Arc<dyn EscalationStore>, processor: Arc<EscalationProcessor>) -> Self {
        Self {
            store,
            processor,
            batch_size: 1000,
        }
    }

    /// Set the batch size (memory bound, not a correctness constraint)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Run one evaluation pass for every escalation whose alert is still
    /// open. A failing escalation is logged and counted; the rest of the
    /// batch proceeds.
    pub async fn schedule_all_open(&self) -> Result<RecheckOutcome> {
        let mut outcome = RecheckOutcome::default();
        let mut cursor = None;

        loop {
            let page = self
                .store
                .list_open_escalations(cursor, self.batch_size)
                .await?;

            if page.escalations.is_empty() {
                break;
            }

            debug!(
                batch = page.escalations.len(),
                "Dispatching escalation batch"
            );

            let handles: Vec<_> = page
                .escalations
                .iter()
                .map(|escalation| {
                    let processor = self.processor.clone();
                    let escalation_id = escalation.id;
                    tokio::spawn(async move { processor.process(&escalation_id).await })
                })
                .collect();

            for (escalation, handle) in page.escalations.iter().zip(join_all(handles).await) {
                match handle {
                    Ok(Ok(())) => outcome.processed += 1,
                    Ok(Err(e)) => {
                        outcome.failed += 1;
                        error!(
                            escalation_id = %escalation.id,
                            error = %e,
                            "Escalation pass failed during recheck"
                        );
                    }
                    Err(join_error) => {
                        outcome.failed += 1;
                        error!(
                            escalation_id = %escalation.id,
                            error = %join_error,
                            "Escalation task panicked during recheck"
                        );
                    }
                }
            }

            cursor = page.next_cursor;
            if cursor.is_none() {
                break;
            }
        }

        ESCALATOR_METRICS.record_recheck(
            outcome.failed == 0,
            outcome.processed + outcome.failed,
        );

        info!(
            processed = outcome.processed,
            failed = outcome.failed,
            "Recheck run completed"
        );

        Ok(outcome)
    }
}
