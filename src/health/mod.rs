pub mod classifier;
pub mod policy;

pub use classifier::{body_fat_status, bmi_status, DerivedValues, HealthClassifier};
pub use policy::{BmiPolicy, BodyFatPolicy, HealthStatus};
