use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumString};

/// Lifecycle status of an escalatable alert, ordered by urgency.
///
/// The discriminant doubles as the urgency rank: lower is more urgent.
/// `Triggered` demands immediate attention; `Ignored` is the least urgent
/// terminal state.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertStatus {
    Triggered = 0,
    Acknowledged = 1,
    Resolved = 2,
    Ignored = 3,
}

impl AlertStatus {
    /// Numeric urgency rank (lower is more urgent)
    pub fn urgency(&self) -> u8 {
        *self as u8
    }

    /// Whether this status counts as open (still under active escalation)
    pub fn is_open(&self) -> bool {
        matches!(self, AlertStatus::Triggered | AlertStatus::Acknowledged)
    }

    /// All statuses in urgency order
    pub fn all() -> [AlertStatus; 4] {
        [
            AlertStatus::Triggered,
            AlertStatus::Acknowledged,
            AlertStatus::Resolved,
            AlertStatus::Ignored,
        ]
    }
}

/// Status transition events. Every event is valid from every status
/// ("any -> X"); there are no illegal transitions to detect.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatusEvent {
    Trigger,
    Acknowledge,
    Resolve,
    Ignore,
}

/// Reverse lookup from target status to the event that reaches it.
/// Built once at startup; complete over all four statuses.
static EVENT_FOR_STATUS: Lazy<HashMap<AlertStatus, StatusEvent>> = Lazy::new(|| {
    HashMap::from([
        (AlertStatus::Triggered, StatusEvent::Trigger),
        (AlertStatus::Acknowledged, StatusEvent::Acknowledge),
        (AlertStatus::Resolved, StatusEvent::Resolve),
        (AlertStatus::Ignored, StatusEvent::Ignore),
    ])
});

impl StatusEvent {
    /// The status this event transitions to, from any starting status
    pub fn target_status(&self) -> AlertStatus {
        match self {
            StatusEvent::Trigger => AlertStatus::Triggered,
            StatusEvent::Acknowledge => AlertStatus::Acknowledged,
            StatusEvent::Resolve => AlertStatus::Resolved,
            StatusEvent::Ignore => AlertStatus::Ignored,
        }
    }

    /// The event that leads to the given status, if any
    pub fn leading_to(status: AlertStatus) -> Option<StatusEvent> {
        EVENT_FOR_STATUS.get(&status).copied()
    }
}

/// Capability for any alert-like entity that carries a status and an end
/// timestamp. Transition logic is provided; implementors only expose the
/// raw accessors.
///
/// Invariant maintained by every transition:
/// `ended_at().is_some() == (status() == AlertStatus::Resolved)`.
pub trait Escalatable {
    fn status(&self) -> AlertStatus;
    fn set_status(&mut self, status: AlertStatus);
    fn ended_at(&self) -> Option<DateTime<Utc>>;
    fn set_ended_at(&mut self, ended_at: Option<DateTime<Utc>>);

    /// Fire a transition event. Entering `Resolved` stamps `ended_at` with
    /// the current time; every other transition clears it.
    fn fire(&mut self, event: StatusEvent) {
        self.fire_at(event, None);
    }

    /// Fire a transition event with an explicit end time for `Resolve`.
    fn fire_at(&mut self, event: StatusEvent, end_time: Option<DateTime<Utc>>) {
        let target = event.target_status();
        self.set_status(target);

        if target == AlertStatus::Resolved {
            self.set_ended_at(Some(end_time.unwrap_or_else(Utc::now)));
        } else {
            self.set_ended_at(None);
        }
    }

    /// Look up the event that reaches the target status and fire it.
    /// Returns false when no event maps to the target.
    fn change_status_to(&mut self, target: AlertStatus) -> bool {
        match StatusEvent::leading_to(target) {
            Some(event) => {
                self.fire(event);
                true
            }
            None => false,
        }
    }

    /// Whether the entity is still open (triggered or acknowledged)
    fn is_open(&self) -> bool {
        self.status().is_open()
    }
}
