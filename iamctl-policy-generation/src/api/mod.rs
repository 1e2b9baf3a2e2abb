//! iamctl policy generation API

mod generate_policy;
pub mod model;
pub use generate_policy::{generate_iam_policy, generate_source, normalize_policy_file};
