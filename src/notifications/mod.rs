//! Notification dispatch seam. The engine hands recipients to a dispatcher
//! and moves on; delivery mechanics (email, chat, paging providers) live
//! behind this trait and are never retried in-band.

use crate::error::Result;
use crate::models::{EscalationRule, PendingEscalation};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Dispatches an on-call page for a fired escalation rule
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify(
        &self,
        recipients: &[String],
        escalation: &PendingEscalation,
        rule: &EscalationRule,
    ) -> Result<()>;
}

/// Audit record of one dispatched page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub sent_at: DateTime<Utc>,
    pub escalation_id: Uuid,
    pub alert_id: Uuid,
    pub rule_id: Uuid,
    pub recipients: Vec<String>,
}

/// Dispatcher that logs pages and keeps an in-memory history. Used when no
/// real paging provider is wired in, and by tests to assert on what fired.
#[derive(Clone)]
pub struct RecordingDispatcher {
    history: Arc<RwLock<Vec<PageRecord>>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self {
            history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Full page history, oldest first
    pub fn history(&self) -> Vec<PageRecord> {
        self.history.read().clone()
    }

    /// Pages dispatched for one escalation
    pub fn pages_for(&self, escalation_id: &Uuid) -> Vec<PageRecord> {
        self.history
            .read()
            .iter()
            .filter(|record| record.escalation_id == *escalation_id)
            .cloned()
            .collect()
    }
}

impl Default for RecordingDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn notify(
        &self,
        recipients: &[String],
        escalation: &PendingEscalation,
        rule: &EscalationRule,
    ) -> Result<()> {
        tracing::info!(
            escalation_id = %escalation.id,
            alert_id = %escalation.alert_id,
            rule_id = %rule.id,
            recipients = recipients.len(),
            "Paging on-call recipients"
        );

        self.history.write().push(PageRecord {
            sent_at: Utc::now(),
            escalation_id: escalation.id,
            alert_id: escalation.alert_id,
            rule_id: rule.id,
            recipients: recipients.to_vec(),
        });

        Ok(())
    }
}
