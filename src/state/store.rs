use crate::error::Result;
use crate::models::{Alert, EscalationPolicy, PendingEscalation};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One page of a batched scan over open escalations
#[derive(Debug, Clone)]
pub struct EscalationPage {
    pub escalations: Vec<PendingEscalation>,

    /// Keyset cursor for the next page; None when the scan is exhausted
    pub next_cursor: Option<Uuid>,
}

/// Trait for escalation storage operations. Covers the three record types
/// the engine reads and writes; the backing implementation owns
/// transactional semantics.
#[async_trait]
pub trait EscalationStore: Send + Sync {
    /// Save an alert
    async fn save_alert(&self, alert: &Alert) -> Result<()>;

    /// Get an alert by ID
    async fn get_alert(&self, id: &Uuid) -> Result<Option<Alert>>;

    /// Update an alert
    async fn update_alert(&self, alert: &Alert) -> Result<()>;

    /// Save an escalation policy
    async fn save_policy(&self, policy: &EscalationPolicy) -> Result<()>;

    /// Get a policy by ID
    async fn get_policy(&self, id: &Uuid) -> Result<Option<EscalationPolicy>>;

    /// Save a pending escalation
    async fn save_escalation(&self, escalation: &PendingEscalation) -> Result<()>;

    /// Get a pending escalation by ID
    async fn get_escalation(&self, id: &Uuid) -> Result<Option<PendingEscalation>>;

    /// Get the pending escalation tracking a given alert, if any
    async fn get_escalation_for_alert(
        &self,
        alert_id: &Uuid,
    ) -> Result<Option<PendingEscalation>>;

    /// Advance an escalation's watermark to the given evaluation start time
    async fn touch_escalation(&self, id: &Uuid, at: DateTime<Utc>) -> Result<()>;

    /// Scan escalations whose alert is still open, in stable id order,
    /// starting after the cursor. Bounds memory for large fleets.
    async fn list_open_escalations(
        &self,
        cursor: Option<Uuid>,
        limit: usize,
    ) -> Result<EscalationPage>;
}
