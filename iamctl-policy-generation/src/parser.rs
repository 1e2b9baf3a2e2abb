//! Policy document parser.
//!
//! Decodes IAM policy JSON into a [`PolicyDocument`]. The document is first
//! read as a generic `serde_json::Value` so that malformed JSON surfaces as a
//! parse error while well-formed JSON with a wrongly shaped field surfaces as
//! [`CodegenError::InvalidFieldType`] naming the offending field.

use log::debug;
use serde_json::{Map, Value};
use std::path::Path;

use crate::errors::{CodegenError, Result};
use crate::model::{ConditionKeyValue, ConditionTree, FlexibleList, PolicyDocument, StatementSpec};

const VERSION: &str = "Version";
const STATEMENT: &str = "Statement";
const EFFECT: &str = "Effect";
const ACTION: &str = "Action";
const RESOURCE: &str = "Resource";
const CONDITION: &str = "Condition";
const SID: &str = "Sid";

/// Read and parse the policy document at `path`.
pub fn read_policy_document(path: impl AsRef<Path>) -> Result<PolicyDocument> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| CodegenError::io("read", path, e))?;
    debug!("Read {} bytes of policy JSON from {}", bytes.len(), path.display());
    parse_policy_document(&bytes)
}

/// Parse raw policy JSON.
pub fn parse_policy_document(bytes: &[u8]) -> Result<PolicyDocument> {
    let value: Value = serde_json::from_slice(bytes)?;
    let root = value
        .as_object()
        .ok_or_else(|| CodegenError::invalid_field_type("<document>", "object", &value))?;

    let version = required_string(root, VERSION, VERSION)?;

    let statements = match required(root, STATEMENT, STATEMENT)? {
        // A lone statement object is valid IAM grammar.
        Value::Object(entry) => vec![parse_statement(STATEMENT, entry)?],
        Value::Array(entries) => entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let path = format!("{}[{}]", STATEMENT, index);
                match entry {
                    Value::Object(entry) => parse_statement(&path, entry),
                    other => Err(CodegenError::invalid_field_type(path, "object", other)),
                }
            })
            .collect::<Result<Vec<_>>>()?,
        other => {
            return Err(CodegenError::invalid_field_type(
                STATEMENT,
                "object or list of objects",
                other,
            ))
        }
    };

    debug!("Parsed policy version {} with {} statements", version, statements.len());

    Ok(PolicyDocument {
        version,
        statements,
    })
}

fn parse_statement(path: &str, entry: &Map<String, Value>) -> Result<StatementSpec> {
    for key in entry.keys() {
        if ![SID, EFFECT, ACTION, RESOURCE, CONDITION].contains(&key.as_str()) {
            debug!("Ignoring unsupported key '{}' in {}", key, path);
        }
    }

    let effect = required_string(entry, EFFECT, &format!("{}.{}", path, EFFECT))?;

    let action_path = format!("{}.{}", path, ACTION);
    let actions = FlexibleList::from_value(&action_path, required(entry, ACTION, &action_path)?)?
        .into_vec();

    let resource_path = format!("{}.{}", path, RESOURCE);
    let resource_value = required(entry, RESOURCE, &resource_path)?;
    let resources = FlexibleList::from_value(&resource_path, resource_value)?.into_vec();
    if resources.is_empty() {
        return Err(CodegenError::invalid_field_type(
            resource_path,
            "at least one resource",
            resource_value,
        ));
    }

    let condition = match entry.get(CONDITION) {
        None | Some(Value::Null) => None,
        Some(value) => Some(parse_condition(&format!("{}.{}", path, CONDITION), value)?),
    };

    Ok(StatementSpec {
        effect,
        actions,
        resources,
        condition,
    })
}

fn parse_condition(path: &str, value: &Value) -> Result<ConditionTree> {
    let operators = value
        .as_object()
        .ok_or_else(|| CodegenError::invalid_field_type(path, "object", value))?;

    let mut tree = ConditionTree::new();
    for (operator, clauses) in operators {
        let operator_path = format!("{}.{}", path, operator);
        let clauses = clauses
            .as_object()
            .ok_or_else(|| CodegenError::invalid_field_type(&operator_path, "object", clauses))?;

        let mut key_values = ConditionKeyValue::new();
        for (key, value) in clauses {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(CodegenError::invalid_field_type(
                        format!("{}.{}", operator_path, key),
                        "string, number or boolean",
                        other,
                    ))
                }
            };
            key_values.insert(key.clone(), text);
        }
        tree.insert(operator.clone(), key_values);
    }

    Ok(tree)
}

fn required<'a>(object: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a Value> {
    object
        .get(key)
        .ok_or_else(|| CodegenError::parse(format!("missing field `{}`", path)))
}

fn required_string(object: &Map<String, Value>, key: &str, path: &str) -> Result<String> {
    match required(object, key, path)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(CodegenError::invalid_field_type(path, "string", other)),
    }
}
