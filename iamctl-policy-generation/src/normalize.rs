//! Statement normalization.
//!
//! The credential operator's `StatementEntry` carries a single resource
//! pattern, so every multi-resource statement is split into one statement per
//! resource before synthesis.

use log::debug;

use crate::model::{PolicyDocument, StatementSpec};

/// Split statements so that each one names at most one resource.
///
/// Statement order and per-statement resource order are preserved; effect,
/// actions and condition are cloned unchanged onto each split statement.
pub fn normalize_statements(statements: Vec<StatementSpec>) -> Vec<StatementSpec> {
    let expected: usize = statements.iter().map(|s| s.resources.len().max(1)).sum();
    let mut normalized = Vec::with_capacity(expected);

    for statement in statements {
        if statement.resources.len() <= 1 {
            normalized.push(statement);
            continue;
        }

        debug!(
            "Splitting {} statement with {} resources",
            statement.effect,
            statement.resources.len()
        );
        let StatementSpec {
            effect,
            actions,
            resources,
            condition,
        } = statement;
        normalized.extend(resources.into_iter().map(|resource| StatementSpec {
            effect: effect.clone(),
            actions: actions.clone(),
            resources: vec![resource],
            condition: condition.clone(),
        }));
    }

    normalized
}

/// Normalize every statement of a document.
pub fn normalize_document(document: PolicyDocument) -> PolicyDocument {
    PolicyDocument {
        version: document.version,
        statements: normalize_statements(document.statements),
    }
}
