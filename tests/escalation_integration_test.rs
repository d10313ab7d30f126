use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use oncall_escalator::{
    error::{AppError, Result},
    escalation::{EscalationProcessor, StaticFeatureGate},
    models::{
        Alert, AlertStatus, Escalatable, EscalationPolicy, EscalationRule, PendingEscalation,
        StatusEvent,
    },
    notifications::{NotificationDispatcher, RecordingDispatcher},
    oncall::StaticScheduleResolver,
    scheduler::RecheckWorker,
    state::{EscalationStore, InMemoryStore},
};
use std::sync::Arc;
use tokio::time::Duration;
use uuid::Uuid;

struct Harness {
    store: Arc<InMemoryStore>,
    resolver: Arc<StaticScheduleResolver>,
    dispatcher: Arc<RecordingDispatcher>,
    processor: Arc<EscalationProcessor>,
}

fn harness() -> Harness {
    harness_with_dispatcher(Arc::new(RecordingDispatcher::new()))
}

fn harness_with_dispatcher(dispatcher: Arc<RecordingDispatcher>) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let resolver = Arc::new(StaticScheduleResolver::new());
    let processor = Arc::new(EscalationProcessor::new(
        store.clone(),
        resolver.clone(),
        dispatcher.clone(),
        Arc::new(StaticFeatureGate::new(true)),
    ));
    Harness {
        store,
        resolver,
        dispatcher,
        processor,
    }
}

/// Create an alert, a policy with the given rules, and an escalation whose
/// clock started `started_secs_ago` seconds in the past.
async fn seed_escalation(
    h: &Harness,
    rules: Vec<EscalationRule>,
    started_secs_ago: i64,
) -> (Alert, PendingEscalation) {
    let alert = Alert::new(
        Uuid::new_v4(),
        "Database replica lag".to_string(),
        "prometheus".to_string(),
    );
    let policy = EscalationPolicy::new(
        alert.project_id,
        "Production Escalation".to_string(),
        "Page primary, then engineering manager".to_string(),
    )
    .with_rules(rules);

    h.store.save_alert(&alert).await.unwrap();
    h.store.save_policy(&policy).await.unwrap();

    let mut escalation = PendingEscalation::new(alert.id, policy.id, alert.project_id);
    escalation.created_at = Utc::now() - ChronoDuration::seconds(started_secs_ago);
    escalation.updated_at = escalation.created_at;
    h.store.save_escalation(&escalation).await.unwrap();

    (alert, escalation)
}

fn registered_rule(h: &Harness, status: AlertStatus, elapsed: i64) -> EscalationRule {
    let schedule_id = Uuid::new_v4();
    h.resolver
        .register_schedule(schedule_id, vec!["oncall@example.com".to_string()]);
    EscalationRule::new(status, elapsed, schedule_id)
}

#[tokio::test]
async fn test_single_rule_fires_once_threshold_elapsed() {
    // One rule {acknowledged, 300s}; nothing at T0+299,
    // exactly one firing at T0+300
    let h = harness();
    let rule = registered_rule(&h, AlertStatus::Acknowledged, 300);

    let (_, before) = seed_escalation(&h, vec![rule.clone()], 299).await;
    h.processor.process(&before.id).await.unwrap();
    assert!(h.dispatcher.pages_for(&before.id).is_empty());

    let (_, at) = seed_escalation(&h, vec![rule], 300).await;
    h.processor.process(&at.id).await.unwrap();
    assert_eq!(h.dispatcher.pages_for(&at.id).len(), 1);
}

#[tokio::test]
async fn test_rule_suppressed_when_alert_already_acknowledged() {
    // Alert already acknowledged at evaluation time
    let h = harness();
    let rule = registered_rule(&h, AlertStatus::Acknowledged, 300);
    let (mut alert, escalation) = seed_escalation(&h, vec![rule], 300).await;

    alert.fire(StatusEvent::Acknowledge);
    h.store.update_alert(&alert).await.unwrap();

    h.processor.process(&escalation.id).await.unwrap();
    assert!(h.dispatcher.pages_for(&escalation.id).is_empty());
}

#[tokio::test]
async fn test_overdue_rules_fire_together_then_stay_quiet() {
    // Thresholds 60s and 300s evaluated once at T0+400; both
    // fire in one pass, then the advanced watermark suppresses everything
    let h = harness();
    let first = registered_rule(&h, AlertStatus::Acknowledged, 60);
    let second = registered_rule(&h, AlertStatus::Resolved, 300);
    let (_, escalation) = seed_escalation(&h, vec![second, first], 400).await;

    h.processor.process(&escalation.id).await.unwrap();

    let pages = h.dispatcher.pages_for(&escalation.id);
    assert_eq!(pages.len(), 2);

    // Deterministic firing order: ascending threshold
    let policy = h
        .store
        .get_policy(&escalation.policy_id)
        .await
        .unwrap()
        .unwrap();
    let sorted = policy.sorted_rules();
    assert_eq!(pages[0].rule_id, sorted[0].id);
    assert_eq!(pages[1].rule_id, sorted[1].id);

    h.processor.process(&escalation.id).await.unwrap();
    assert_eq!(h.dispatcher.pages_for(&escalation.id).len(), 2);
}

#[tokio::test]
async fn test_resolve_sets_and_retrigger_clears_ended_at() {
    // change_status_to(resolved) stamps now; re-trigger clears
    let mut alert = Alert::new(
        Uuid::new_v4(),
        "Flapping check".to_string(),
        "pingdom".to_string(),
    );

    let before = Utc::now();
    assert!(alert.change_status_to(AlertStatus::Resolved));
    let after = Utc::now();

    let ended = alert.ended_at.unwrap();
    assert!(ended >= before && ended <= after);

    assert!(alert.change_status_to(AlertStatus::Triggered));
    assert!(alert.ended_at.is_none());
    assert!(alert.is_open());
}

#[tokio::test]
async fn test_batch_isolation_and_idempotence() {
    // A broken escalation neither stops the batch nor causes the
    // healthy one to double-fire on the next run
    let h = harness();

    let rule = registered_rule(&h, AlertStatus::Acknowledged, 60);
    let (_, healthy) = seed_escalation(&h, vec![rule], 120).await;

    // Broken: rule points at a schedule the resolver does not know
    let broken_rule = EscalationRule::new(AlertStatus::Acknowledged, 60, Uuid::new_v4());
    let (_, broken) = seed_escalation(&h, vec![broken_rule], 120).await;

    let worker = RecheckWorker::new(h.store.clone(), h.processor.clone());

    let outcome = worker.schedule_all_open().await.unwrap();
    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.failed, 1);
    assert_eq!(h.dispatcher.pages_for(&healthy.id).len(), 1);
    assert!(h.dispatcher.pages_for(&broken.id).is_empty());

    // Second run: healthy stays at one page, broken fails again
    let outcome = worker.schedule_all_open().await.unwrap();
    assert_eq!(outcome.failed, 1);
    assert_eq!(h.dispatcher.pages_for(&healthy.id).len(), 1);
}

#[tokio::test]
async fn test_closed_alert_drops_out_of_rechecks() {
    let h = harness();
    let rule = registered_rule(&h, AlertStatus::Acknowledged, 60);
    let (mut alert, escalation) = seed_escalation(&h, vec![rule], 120).await;

    alert.fire(StatusEvent::Resolve);
    h.store.update_alert(&alert).await.unwrap();

    let worker = RecheckWorker::new(h.store.clone(), h.processor.clone());
    let outcome = worker.schedule_all_open().await.unwrap();

    assert_eq!(outcome.processed + outcome.failed, 0);
    assert!(h.dispatcher.pages_for(&escalation.id).is_empty());
}

/// Dispatcher that blocks long enough to trip the pass timeout
struct SlowDispatcher;

#[async_trait]
impl NotificationDispatcher for SlowDispatcher {
    async fn notify(
        &self,
        _recipients: &[String],
        _escalation: &PendingEscalation,
        _rule: &EscalationRule,
    ) -> Result<()> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(())
    }
}

#[tokio::test]
async fn test_timed_out_pass_leaves_watermark_for_retry() {
    let store = Arc::new(InMemoryStore::new());
    let resolver = Arc::new(StaticScheduleResolver::new());
    let processor = Arc::new(
        EscalationProcessor::new(
            store.clone(),
            resolver.clone(),
            Arc::new(SlowDispatcher),
            Arc::new(StaticFeatureGate::new(true)),
        )
        .with_pass_timeout(Duration::from_millis(20)),
    );

    let schedule_id = Uuid::new_v4();
    resolver.register_schedule(schedule_id, vec!["oncall@example.com".to_string()]);

    let alert = Alert::new(Uuid::new_v4(), "Slow pager".to_string(), "synthetic".to_string());
    let policy = EscalationPolicy::new(alert.project_id, "Slow".to_string(), String::new())
        .with_rules(vec![EscalationRule::new(
            AlertStatus::Acknowledged,
            60,
            schedule_id,
        )]);

    store.save_alert(&alert).await.unwrap();
    store.save_policy(&policy).await.unwrap();

    let mut escalation = PendingEscalation::new(alert.id, policy.id, alert.project_id);
    escalation.created_at = Utc::now() - ChronoDuration::seconds(120);
    escalation.updated_at = escalation.created_at;
    store.save_escalation(&escalation).await.unwrap();

    let result = processor.process(&escalation.id).await;
    assert!(matches!(result, Err(AppError::Timeout(_))));

    let reloaded = store.get_escalation(&escalation.id).await.unwrap().unwrap();
    assert_eq!(reloaded.updated_at, escalation.updated_at);
}

#[tokio::test]
async fn test_start_escalation_end_to_end() {
    let h = harness();
    let rule = registered_rule(&h, AlertStatus::Acknowledged, 0);

    let alert = Alert::new(
        Uuid::new_v4(),
        "Error budget burn".to_string(),
        "prometheus".to_string(),
    );
    let policy = EscalationPolicy::new(
        alert.project_id,
        "Immediate page".to_string(),
        String::new(),
    )
    .with_rules(vec![rule]);

    h.store.save_alert(&alert).await.unwrap();
    h.store.save_policy(&policy).await.unwrap();

    let escalation = h
        .processor
        .start_escalation(&alert, policy.id)
        .await
        .unwrap();

    // Zero-threshold rule fires on the very first pass
    h.processor.process(&escalation.id).await.unwrap();
    let pages = h.dispatcher.pages_for(&escalation.id);
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].recipients, vec!["oncall@example.com".to_string()]);
}
