//! PHI data models

pub mod category;
pub mod findings;
pub mod policy;

pub use category::{CategoryRegistry, PhiCategory};
pub use findings::FindingsMap;
pub use policy::HandlingPolicy;
