pub mod gate;
pub mod process;
pub mod rules;

pub use gate::{FeatureGate, StaticFeatureGate};
pub use process::EscalationProcessor;
pub use rules::RuleEvaluator;
