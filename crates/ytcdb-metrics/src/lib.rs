pub mod corrector;
pub mod engine;
pub mod error;
pub mod validator;

pub use corrector::correct;
pub use engine::{compute, DerivedMetrics};
pub use error::MetricsError;
pub use validator::{validate, MissingFields};
