pub mod cron;
pub mod error;
pub mod worker;

pub use cron::RecheckScheduler;
pub use error::{SchedulerError, SchedulerResult};
pub use worker::{RecheckOutcome, RecheckWorker};
