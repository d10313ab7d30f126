//! On-call schedule resolution. The engine never owns rotation logic; it
//! asks a resolver who is currently on-call for a schedule, fresh on every
//! rule firing.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Resolves the set of users currently on-call for a schedule
#[async_trait]
pub trait ScheduleResolver: Send + Sync {
    async fn resolve_recipients(
        &self,
        project_id: &Uuid,
        schedule_id: &Uuid,
    ) -> Result<Vec<String>>;
}

/// Registry-backed resolver with fixed recipients per schedule. Stands in
/// for the real rotation service in standalone deployments and tests.
#[derive(Clone)]
pub struct StaticScheduleResolver {
    schedules: Arc<DashMap<Uuid, Vec<String>>>,
}

impl StaticScheduleResolver {
    pub fn new() -> Self {
        Self {
            schedules: Arc::new(DashMap::new()),
        }
    }

    /// Register the current on-call recipients for a schedule
    pub fn register_schedule(&self, schedule_id: Uuid, recipients: Vec<String>) {
        tracing::info!(
            schedule_id = %schedule_id,
            recipients = recipients.len(),
            "Registered on-call schedule"
        );
        self.schedules.insert(schedule_id, recipients);
    }
}

impl Default for StaticScheduleResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScheduleResolver for StaticScheduleResolver {
    async fn resolve_recipients(
        &self,
        _project_id: &Uuid,
        schedule_id: &Uuid,
    ) -> Result<Vec<String>> {
        self.schedules
            .get(schedule_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                AppError::ScheduleResolution(format!("Schedule {} not found", schedule_id))
            })
    }
}
