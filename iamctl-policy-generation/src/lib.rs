//! Compiles IAM policy JSON documents into Rust source.
//!
//! The pipeline runs strictly in one direction:
//!
//! 1. [`parser`] decodes the JSON document, accepting `Action`/`Resource`
//!    written either as a string or as a list.
//! 2. [`normalize`] splits every multi-resource statement into
//!    single-resource statements, which is all the credential operator's
//!    `StatementEntry` can express.
//! 3. [`synthesis`] turns the normalized document into a typed literal tree
//!    and lowers it to a `syn` expression.
//! 4. [`template`] parses the skeleton and swaps its stub return value for
//!    that expression.
//! 5. [`render`] formats the result with `prettyplease` and writes it out.

pub mod api;
pub mod config;
mod errors;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod render;
pub mod synthesis;
pub mod template;

pub use api::model::{GeneratePolicyConfig, GenerationSummary, DEFAULT_PACKAGE};
pub use api::{generate_iam_policy, generate_source, normalize_policy_file};
pub use config::{CodegenConfig, SchemaNames};
pub use errors::{CodegenError, Result};
pub use model::{ConditionKeyValue, ConditionTree, FlexibleList, PolicyDocument, StatementSpec};
