use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use super::status::{AlertStatus, Escalatable};

/// An alert under escalation management
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Alert {
    /// Unique alert identifier
    pub id: Uuid,

    /// Project this alert belongs to
    pub project_id: Uuid,

    /// Human-readable title
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    /// Alert source (monitoring system that raised it)
    #[validate(length(min = 1, max = 255))]
    pub source: String,

    /// Current lifecycle status
    pub status: AlertStatus,

    /// When the alert entered a resolved state, if it has
    pub ended_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Custom labels
    pub labels: HashMap<String, String>,
}

impl Alert {
    /// Create a new alert in the triggered state
    pub fn new(project_id: Uuid, title: String, source: String) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            project_id,
            title,
            source,
            status: AlertStatus::Triggered,
            ended_at: None,
            created_at: now,
            updated_at: now,
            labels: HashMap::new(),
        }
    }
}

impl Escalatable for Alert {
    fn status(&self) -> AlertStatus {
        self.status
    }

    fn set_status(&mut self, status: AlertStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    fn set_ended_at(&mut self, ended_at: Option<DateTime<Utc>>) {
        self.ended_at = ended_at;
    }
}
