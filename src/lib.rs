//! Rule-based, time-threshold escalation engine for on-call alerting.
//!
//! Alerts carry a four-state urgency lifecycle (triggered, acknowledged,
//! resolved, ignored). An escalation policy is an ordered set of
//! time-threshold rules; once an alert is put under escalation management,
//! a periodic recheck fires every rule that has newly become due and pages
//! the on-call recipients for that rule's schedule. A per-escalation
//! watermark de-duplicates passes: a rule whose threshold the watermark has
//! passed is considered handled.
//!
//! Persistence, authn/authz, notification delivery and any web surface live
//! behind the trait seams in [`state`], [`oncall`], [`notifications`] and
//! [`escalation::gate`].

pub mod config;
pub mod error;
pub mod escalation;
pub mod metrics;
pub mod models;
pub mod notifications;
pub mod oncall;
pub mod scheduler;
pub mod state;

pub use config::Config;
pub use error::{AppError, Result};
