//! Prometheus metrics for the escalation engine

use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram, Counter,
    CounterVec, Gauge, Histogram,
};

/// Escalation engine metrics collection
pub struct EscalatorMetrics {
    /// Evaluation passes by outcome
    pub passes_total: CounterVec,

    /// Rules fired across all passes
    pub rules_fired_total: Counter,

    /// Recipients paged across all fired rules
    pub recipients_paged_total: Counter,

    /// Evaluation pass duration in seconds
    pub pass_duration: Histogram,

    /// Open escalations seen by the last recheck
    pub open_escalations: Gauge,

    /// Recheck runs by outcome
    pub recheck_runs_total: CounterVec,
}

impl EscalatorMetrics {
    pub fn new() -> Self {
        Self {
            passes_total: register_counter_vec!(
                "escalator_passes_total",
                "Total number of escalation evaluation passes",
                &["result"]
            )
            .unwrap(),

            rules_fired_total: register_counter!(
                "escalator_rules_fired_total",
                "Total number of escalation rules fired"
            )
            .unwrap(),

            recipients_paged_total: register_counter!(
                "escalator_recipients_paged_total",
                "Total number of on-call recipients paged"
            )
            .unwrap(),

            pass_duration: register_histogram!(
                "escalator_pass_duration_seconds",
                "Escalation evaluation pass duration in seconds",
                vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0]
            )
            .unwrap(),

            open_escalations: register_gauge!(
                "escalator_open_escalations",
                "Number of open escalations seen by the last recheck"
            )
            .unwrap(),

            recheck_runs_total: register_counter_vec!(
                "escalator_recheck_runs_total",
                "Total number of scheduled recheck runs",
                &["result"]
            )
            .unwrap(),
        }
    }

    /// Record a completed evaluation pass
    pub fn record_pass(&self, success: bool, duration_secs: f64) {
        let result = if success { "success" } else { "failure" };
        self.passes_total.with_label_values(&[result]).inc();
        self.pass_duration.observe(duration_secs);
    }

    /// Record a fired rule and the recipients it paged
    pub fn record_rule_fired(&self, recipients: usize) {
        self.rules_fired_total.inc();
        self.recipients_paged_total.inc_by(recipients as f64);
    }

    /// Record a completed recheck run
    pub fn record_recheck(&self, success: bool, open_count: usize) {
        let result = if success { "success" } else { "failure" };
        self.recheck_runs_total.with_label_values(&[result]).inc();
        self.open_escalations.set(open_count as f64);
    }
}

impl Default for EscalatorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    /// Global escalation metrics instance
    pub static ref ESCALATOR_METRICS: EscalatorMetrics = EscalatorMetrics::new();
}

/// Initialize escalation metrics (idempotent)
pub fn init_metrics() {
    lazy_static::initialize(&ESCALATOR_METRICS);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        init_metrics();
        ESCALATOR_METRICS.record_pass(true, 0.05);
        ESCALATOR_METRICS.record_rule_fired(3);
        ESCALATOR_METRICS.record_recheck(true, 12);

        assert_eq!(ESCALATOR_METRICS.open_escalations.get(), 12.0);
        assert!(ESCALATOR_METRICS.rules_fired_total.get() >= 1.0);
    }
}
