use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::status::AlertStatus;

/// Escalation policy: an ordered collection of time-threshold rules
/// owned by a project
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EscalationPolicy {
    pub id: Uuid,
    pub project_id: Uuid,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub description: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Escalation rules; evaluation order is imposed by `sorted_rules`
    pub rules: Vec<EscalationRule>,
}

impl EscalationPolicy {
    pub fn new(project_id: Uuid, name: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            name,
            description,
            enabled: true,
            created_at: now,
            updated_at: now,
            rules: Vec::new(),
        }
    }

    pub fn with_rules(mut self, rules: Vec<EscalationRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Rules in evaluation order: ascending elapsed-time threshold, then
    /// ascending urgency as tie-break. Storage order is never relied on.
    pub fn sorted_rules(&self) -> Vec<EscalationRule> {
        let mut rules = self.rules.clone();
        rules.sort_by_key(|rule| (rule.elapsed_time_seconds, rule.status));
        rules
    }
}

/// A single time-threshold rule within a policy. Becomes eligible once the
/// escalation has been running for `elapsed_time_seconds`, unless the alert
/// has already reached or passed the rule's target urgency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationRule {
    pub id: Uuid,

    /// Target urgency threshold
    pub status: AlertStatus,

    /// Seconds after escalation creation at which this rule becomes eligible
    pub elapsed_time_seconds: i64,

    /// On-call schedule paged when this rule fires
    pub oncall_schedule_id: Uuid,
}

impl EscalationRule {
    pub fn new(status: AlertStatus, elapsed_time_seconds: i64, oncall_schedule_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            status,
            elapsed_time_seconds,
            oncall_schedule_id,
        }
    }
}
