//! In-memory model of an IAM policy document.
//!
//! The model is built once per generation run by [`crate::parser`], rewritten
//! by [`crate::normalize`] and consumed by [`crate::synthesis`].

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::errors::{CodegenError, Result};

/// Condition keys mapped to their (stringified) values, e.g. `aws:RequestTag/x -> "true"`.
///
/// Ordered so that synthesized source is identical across runs.
pub type ConditionKeyValue = BTreeMap<String, String>;

/// Condition operators (`Null`, `StringEquals`, ...) mapped to their key/value clauses.
pub type ConditionTree = BTreeMap<String, ConditionKeyValue>;

/// A parsed IAM policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    #[serde(rename = "Statement")]
    pub statements: Vec<StatementSpec>,
}

/// One access-grant rule of a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementSpec {
    #[serde(rename = "Effect")]
    pub effect: String,
    #[serde(rename = "Action")]
    pub actions: Vec<String>,
    #[serde(rename = "Resource", serialize_with = "serialize_resources")]
    pub resources: Vec<String>,
    /// `None` means unconditional, which is distinct from `Some` of an empty tree.
    #[serde(rename = "Condition", skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionTree>,
}

impl StatementSpec {
    /// Creates an unconditional statement.
    pub fn new(
        effect: impl Into<String>,
        actions: Vec<String>,
        resources: Vec<String>,
    ) -> Self {
        Self {
            effect: effect.into(),
            actions,
            resources,
            condition: None,
        }
    }

    /// Attach a condition tree to this statement.
    pub fn with_condition(mut self, condition: ConditionTree) -> Self {
        self.condition = Some(condition);
        self
    }

    /// The resource of a normalized statement.
    pub fn single_resource(&self) -> Option<&str> {
        match self.resources.as_slice() {
            [resource] => Some(resource.as_str()),
            _ => None,
        }
    }
}

/// A normalized statement holds exactly one resource, which is written back as a bare string.
fn serialize_resources<S>(resources: &[String], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match resources {
        [single] => serializer.serialize_str(single),
        many => many.serialize(serializer),
    }
}

/// Decoded form of a field that may be written either as a single string or as a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlexibleList {
    Scalar(String),
    Sequence(Vec<String>),
}

impl FlexibleList {
    const EXPECTED: &'static str = "string or list of strings";

    /// Decode a JSON value, rejecting every shape other than a string or a list of strings.
    pub fn from_value(field: &str, value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Ok(Self::Scalar(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    serde_json::Value::String(s) => Ok(s.clone()),
                    other => Err(CodegenError::invalid_field_type(
                        format!("{}[{}]", field, index),
                        "string",
                        other,
                    )),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::Sequence),
            other => Err(CodegenError::invalid_field_type(field, Self::EXPECTED, other)),
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Scalar(s) => vec![s],
            Self::Sequence(items) => items,
        }
    }
}
