use crate::error::{AppError, Result};
use crate::escalation::gate::FeatureGate;
use crate::escalation::rules::RuleEvaluator;
use crate::metrics::ESCALATOR_METRICS;
use crate::models::{Alert, Escalatable, EscalationRule, PendingEscalation};
use crate::notifications::NotificationDispatcher;
use crate::oncall::ScheduleResolver;
use crate::state::EscalationStore;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use uuid::Uuid;

/// Drives one evaluation pass for a single escalation: loads the policy's
/// rules, fires the due subset, and advances the de-dup watermark.
///
/// `process` is serialized per escalation via an internal lock map; the
/// watermark read-then-write is never concurrent with another pass for the
/// same escalation. Different escalations run freely in parallel.
pub struct EscalationProcessor {
    store: Arc<dyn EscalationStore>,
    resolver: Arc<dyn ScheduleResolver>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    gate: Arc<dyn FeatureGate>,

    /// Per-escalation exclusive locks
    locks: DashMap<Uuid, Arc<tokio::sync::Mutex<()>>>,

    /// Bound on one pass's recipient lookups and notify calls
    pass_timeout: Duration,
}

impl EscalationProcessor {
    pub fn new(
        store: Arc<dyn EscalationStore>,
        resolver: Arc<dyn ScheduleResolver>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        gate: Arc<dyn FeatureGate>,
    ) -> Self {
        Self {
            store,
            resolver,
            dispatcher,
            gate,
            locks: DashMap::new(),
            pass_timeout: Duration::from_secs(30),
        }
    }

    /// Set the timeout bound for a single evaluation pass
    pub fn with_pass_timeout(mut self, pass_timeout: Duration) -> Self {
        self.pass_timeout = pass_timeout;
        self
    }

    /// Put an alert under escalation management. No-op guards: the alert
    /// must still be open, the policy must exist, be enabled and have at
    /// least one rule, and the alert must not already be escalating.
    pub async fn start_escalation(
        &self,
        alert: &Alert,
        policy_id: Uuid,
    ) -> Result<PendingEscalation> {
        if !alert.is_open() {
            return Err(AppError::Validation(format!(
                "Alert {} is not open",
                alert.id
            )));
        }

        if let Some(existing) = self.store.get_escalation_for_alert(&alert.id).await? {
            return Err(AppError::Validation(format!(
                "Alert {} already has escalation {}",
                alert.id, existing.id
            )));
        }

        let policy = self
            .store
            .get_policy(&policy_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Policy {} not found", policy_id)))?;

        if !policy.enabled {
            return Err(AppError::Validation(format!(
                "Policy {} is not enabled",
                policy_id
            )));
        }

        if policy.rules.is_empty() {
            return Err(AppError::Validation(
                "Escalation policy must have at least one rule".to_string(),
            ));
        }

        let escalation = PendingEscalation::new(alert.id, policy_id, alert.project_id);
        self.store.save_escalation(&escalation).await?;

        tracing::info!(
            escalation_id = %escalation.id,
            alert_id = %alert.id,
            policy_id = %policy_id,
            rules = policy.rules.len(),
            "Started escalation"
        );

        Ok(escalation)
    }

    /// Run one evaluation pass. On any failure the watermark stays where it
    /// was, so the next scheduled tick retries the same due rules.
    pub async fn process(&self, escalation_id: &Uuid) -> Result<()> {
        let lock = self
            .locks
            .entry(*escalation_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();
        let guard = lock.lock().await;

        let started = std::time::Instant::now();
        let result = self.run_pass(escalation_id).await;

        ESCALATOR_METRICS.record_pass(result.is_ok(), started.elapsed().as_secs_f64());

        if let Err(ref e) = result {
            tracing::error!(
                escalation_id = %escalation_id,
                error = %e,
                transient = e.is_transient(),
                "Escalation pass failed"
            );
        }

        drop(guard);
        // Drop the map entry once no other pass holds or awaits this lock;
        // strong count 2 means only the map and our local clone remain.
        self.locks
            .remove_if(escalation_id, |_, entry| Arc::strong_count(entry) == 2);

        result
    }

    async fn run_pass(&self, escalation_id: &Uuid) -> Result<()> {
        // The pass start time becomes the new watermark; every rule due at
        // or before this instant must fire within this pass.
        let pass_started_at = Utc::now();

        let escalation = self
            .store
            .get_escalation(escalation_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Escalation {} not found", escalation_id))
            })?;

        if !self
            .gate
            .escalation_policies_enabled(&escalation.project_id)
        {
            tracing::debug!(
                escalation_id = %escalation.id,
                project_id = %escalation.project_id,
                "Escalation policies disabled for project, skipping"
            );
            return Ok(());
        }

        let alert = self
            .store
            .get_alert(&escalation.alert_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Escalation {} references missing alert {}",
                    escalation.id, escalation.alert_id
                ))
            })?;

        let policy = self
            .store
            .get_policy(&escalation.policy_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Escalation {} references missing policy {}",
                    escalation.id, escalation.policy_id
                ))
            })?;

        if !policy.enabled {
            tracing::debug!(
                escalation_id = %escalation.id,
                policy_id = %policy.id,
                "Policy disabled, skipping"
            );
            return Ok(());
        }

        let due = RuleEvaluator::due_rules(
            &escalation,
            alert.status,
            &policy.sorted_rules(),
            pass_started_at,
        );

        if !due.is_empty() {
            tracing::info!(
                escalation_id = %escalation.id,
                alert_id = %alert.id,
                due_rules = due.len(),
                elapsed_secs = escalation.elapsed_seconds(pass_started_at),
                "Escalating alert"
            );

            timeout(self.pass_timeout, self.fire_rules(&escalation, &due))
                .await
                .map_err(|_| {
                    AppError::Timeout(format!(
                        "Escalation pass for {} exceeded {:?}",
                        escalation.id, self.pass_timeout
                    ))
                })??;
        }

        // Touch even when nothing fired so the watermark progresses on the
        // recheck cadence.
        self.store
            .touch_escalation(escalation_id, pass_started_at)
            .await?;

        Ok(())
    }

    /// Fire the due rules in order. The first failure aborts the pass; the
    /// untouched watermark makes the next tick retry the same rules.
    async fn fire_rules(
        &self,
        escalation: &PendingEscalation,
        rules: &[EscalationRule],
    ) -> Result<()> {
        for rule in rules {
            let recipients = self
                .resolver
                .resolve_recipients(&escalation.project_id, &rule.oncall_schedule_id)
                .await?;

            if recipients.is_empty() {
                tracing::warn!(
                    escalation_id = %escalation.id,
                    rule_id = %rule.id,
                    schedule_id = %rule.oncall_schedule_id,
                    "No on-call recipients for schedule, rule fires without paging"
                );
                continue;
            }

            self.dispatcher
                .notify(&recipients, escalation, rule)
                .await?;

            ESCALATOR_METRICS.record_rule_fired(recipients.len());

            tracing::info!(
                escalation_id = %escalation.id,
                rule_id = %rule.id,
                threshold_secs = rule.elapsed_time_seconds,
                recipients = recipients.len(),
                "Escalation rule fired"
            );
        }

        Ok(())
    }
}
