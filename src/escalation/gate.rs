use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Per-project feature gate for escalation policies. A disabled project is
/// a valid "nothing to do" state, not an error.
pub trait FeatureGate: Send + Sync {
    fn escalation_policies_enabled(&self, project_id: &Uuid) -> bool;
}

/// Gate with a process-wide default and per-project overrides
#[derive(Clone)]
pub struct StaticFeatureGate {
    default_enabled: bool,
    overrides: Arc<DashMap<Uuid, bool>>,
}

impl StaticFeatureGate {
    pub fn new(default_enabled: bool) -> Self {
        Self {
            default_enabled,
            overrides: Arc::new(DashMap::new()),
        }
    }

    pub fn set_project(&self, project_id: Uuid, enabled: bool) {
        self.overrides.insert(project_id, enabled);
    }
}

impl FeatureGate for StaticFeatureGate {
    fn escalation_policies_enabled(&self, project_id: &Uuid) -> bool {
        self.overrides
            .get(project_id)
            .map(|entry| *entry)
            .unwrap_or(self.default_enabled)
    }
}
