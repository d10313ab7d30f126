use crate::error::{AppError, Result};
use crate::models::{Alert, Escalatable, EscalationPolicy, PendingEscalation};
use crate::state::{EscalationPage, EscalationStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory escalation store (for standalone deployments and testing)
#[derive(Clone)]
pub struct InMemoryStore {
    alerts: Arc<DashMap<Uuid, Alert>>,
    policies: Arc<DashMap<Uuid, EscalationPolicy>>,
    escalations: Arc<DashMap<Uuid, PendingEscalation>>,
    alert_index: Arc<DashMap<Uuid, Uuid>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            alerts: Arc::new(DashMap::new()),
            policies: Arc::new(DashMap::new()),
            escalations: Arc::new(DashMap::new()),
            alert_index: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EscalationStore for InMemoryStore {
    async fn save_alert(&self, alert: &Alert) -> Result<()> {
        self.alerts.insert(alert.id, alert.clone());
        tracing::debug!(alert_id = %alert.id, "Alert saved");
        Ok(())
    }

    async fn get_alert(&self, id: &Uuid) -> Result<Option<Alert>> {
        Ok(self.alerts.get(id).map(|entry| entry.clone()))
    }

    async fn update_alert(&self, alert: &Alert) -> Result<()> {
        if self.alerts.contains_key(&alert.id) {
            self.alerts.insert(alert.id, alert.clone());
            tracing::debug!(alert_id = %alert.id, "Alert updated");
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Alert {} not found", alert.id)))
        }
    }

    async fn save_policy(&self, policy: &EscalationPolicy) -> Result<()> {
        self.policies.insert(policy.id, policy.clone());
        tracing::debug!(policy_id = %policy.id, "Policy saved");
        Ok(())
    }

    async fn get_policy(&self, id: &Uuid) -> Result<Option<EscalationPolicy>> {
        Ok(self.policies.get(id).map(|entry| entry.clone()))
    }

    async fn save_escalation(&self, escalation: &PendingEscalation) -> Result<()> {
        self.escalations.insert(escalation.id, escalation.clone());
        self.alert_index.insert(escalation.alert_id, escalation.id);
        tracing::debug!(escalation_id = %escalation.id, "Escalation saved");
        Ok(())
    }

    async fn get_escalation(&self, id: &Uuid) -> Result<Option<PendingEscalation>> {
        Ok(self.escalations.get(id).map(|entry| entry.clone()))
    }

    async fn get_escalation_for_alert(
        &self,
        alert_id: &Uuid,
    ) -> Result<Option<PendingEscalation>> {
        let Some(escalation_id) = self.alert_index.get(alert_id).map(|entry| *entry) else {
            return Ok(None);
        };
        self.get_escalation(&escalation_id).await
    }

    async fn touch_escalation(&self, id: &Uuid, at: DateTime<Utc>) -> Result<()> {
        let mut escalation = self
            .escalations
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Escalation {} not found", id)))?;

        escalation.touch(at);
        tracing::debug!(escalation_id = %id, watermark = %at, "Escalation watermark advanced");
        Ok(())
    }

    async fn list_open_escalations(
        &self,
        cursor: Option<Uuid>,
        limit: usize,
    ) -> Result<EscalationPage> {
        let mut open: Vec<PendingEscalation> = self
            .escalations
            .iter()
            .filter(|entry| {
                self.alerts
                    .get(&entry.value().alert_id)
                    .map(|alert| alert.is_open())
                    .unwrap_or(false)
            })
            .map(|entry| entry.value().clone())
            .collect();

        // Stable keyset order so cursoring never skips or repeats
        open.sort_by_key(|escalation| escalation.id);

        let escalations: Vec<PendingEscalation> = open
            .into_iter()
            .filter(|escalation| cursor.map_or(true, |c| escalation.id > c))
            .take(limit)
            .collect();

        let next_cursor = if escalations.len() == limit {
            escalations.last().map(|escalation| escalation.id)
        } else {
            None
        };

        Ok(EscalationPage {
            escalations,
            next_cursor,
        })
    }
}
