use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One active escalation per alert. `created_at` is time-zero for the
/// elapsed clock; `updated_at` is the de-dup watermark advanced by the
/// orchestrator after each evaluation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingEscalation {
    pub id: Uuid,
    pub alert_id: Uuid,
    pub policy_id: Uuid,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PendingEscalation {
    pub fn new(alert_id: Uuid, policy_id: Uuid, project_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            alert_id,
            policy_id,
            project_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whole seconds elapsed since the escalation started
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_seconds()
    }

    /// Advance the watermark to the given evaluation start time
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}
