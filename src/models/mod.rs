pub mod alert;
pub mod escalation;
pub mod policy;
pub mod status;

pub use alert::*;
pub use escalation::*;
pub use policy::*;
pub use status::*;
