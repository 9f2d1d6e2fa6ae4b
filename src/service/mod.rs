//! Request validation for camp payloads.

mod validation;
pub use validation::{camp_rules, RequestValidator, ValidationRule};
