//! Pure decision logic: which rules of a policy are due to fire now.

use chrono::{DateTime, Utc};

use crate::models::escalation::PendingEscalation;
use crate::models::policy::EscalationRule;
use crate::models::status::AlertStatus;

/// Evaluates a set of candidate rules against an escalation's clock and
/// watermark. Stateless; every call takes the evaluation time explicitly.
pub struct RuleEvaluator;

impl RuleEvaluator {
    /// Compute the subset of rules that must fire now, in deterministic
    /// order: ascending elapsed-time threshold, then ascending urgency.
    ///
    /// Callers must fire ALL returned rules within one pass before
    /// advancing the watermark; once `updated_at` moves past a rule's
    /// threshold that rule is considered handled and is suppressed on
    /// every later pass.
    pub fn due_rules(
        escalation: &PendingEscalation,
        alert_status: AlertStatus,
        rules: &[EscalationRule],
        now: DateTime<Utc>,
    ) -> Vec<EscalationRule> {
        let mut due: Vec<EscalationRule> = rules
            .iter()
            .filter(|rule| Self::is_due(escalation, alert_status, rule, now))
            .cloned()
            .collect();

        due.sort_by_key(|rule| (rule.elapsed_time_seconds, rule.status));
        due
    }

    /// A rule is due iff the alert has not yet reached the rule's target
    /// urgency, the threshold has elapsed (boundary inclusive), and the
    /// watermark has not already passed the threshold.
    fn is_due(
        escalation: &PendingEscalation,
        alert_status: AlertStatus,
        rule: &EscalationRule,
        now: DateTime<Utc>,
    ) -> bool {
        if rule.status <= alert_status {
            return false;
        }

        if escalation.elapsed_seconds(now) < rule.elapsed_time_seconds {
            return false;
        }

        // Second-truncated comparison: the watermark only counts as past a
        // threshold once it strictly exceeds created_at + threshold.
        escalation.updated_at.timestamp()
            <= escalation.created_at.timestamp() + rule.elapsed_time_seconds
    }
}
