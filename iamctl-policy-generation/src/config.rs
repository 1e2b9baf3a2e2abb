//! Generator configuration.
//!
//! Names of the downstream types and fields, and the skeleton source the
//! policy literal is inserted into. Defaults target the cloud credential
//! operator's `StatementEntry` schema; a TOML file can override any of them.

use serde::Deserialize;
use std::path::Path;

use crate::errors::{CodegenError, Result};

/// Skeleton bundled with the generator.
pub const DEFAULT_TEMPLATE: &str = include_str!("../resources/iam_policy.rs.tmpl");

/// Token in the skeleton replaced by the caller-supplied module name.
pub const DEFAULT_PACKAGE_PLACEHOLDER: &str = "__PACKAGE__";

/// Function whose placeholder return value is replaced by the policy literal.
pub const DEFAULT_STUB_FUNCTION: &str = "get_iam_policy";

/// Type paths and field identifiers of the schema the generated literal must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaNames {
    /// Outer type returned by the stub function.
    pub document_type: String,
    pub statement_type: String,
    pub condition_type: String,
    pub condition_key_value_type: String,
    pub version_field: String,
    pub statement_field: String,
    pub effect_field: String,
    pub action_field: String,
    pub resource_field: String,
    pub condition_field: String,
}

impl Default for SchemaNames {
    fn default() -> Self {
        Self {
            document_type: "IamPolicy".to_string(),
            statement_type: "cco::StatementEntry".to_string(),
            condition_type: "cco::IamPolicyCondition".to_string(),
            condition_key_value_type: "cco::IamPolicyConditionKeyValue".to_string(),
            version_field: "version".to_string(),
            statement_field: "statement".to_string(),
            effect_field: "effect".to_string(),
            action_field: "action".to_string(),
            resource_field: "resource".to_string(),
            condition_field: "policy_condition".to_string(),
        }
    }
}

impl SchemaNames {
    /// Load schema names from a TOML file. Missing keys keep their defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| CodegenError::io("read", path, e))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let names: Self = toml::from_str(text)
            .map_err(|e| CodegenError::invalid_config("schema", e.message().to_string()))?;
        names.validate()?;
        Ok(names)
    }

    /// Check that every type name is a Rust path and every field name an identifier.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("document_type", &self.document_type),
            ("statement_type", &self.statement_type),
            ("condition_type", &self.condition_type),
            ("condition_key_value_type", &self.condition_key_value_type),
        ] {
            parse_path(key, value)?;
        }
        for (key, value) in [
            ("version_field", &self.version_field),
            ("statement_field", &self.statement_field),
            ("effect_field", &self.effect_field),
            ("action_field", &self.action_field),
            ("resource_field", &self.resource_field),
            ("condition_field", &self.condition_field),
        ] {
            parse_ident(key, value)?;
        }
        Ok(())
    }
}

/// Type names are used in expression position (`Type::from(..)`, `Type { .. }`),
/// so generic arguments are rejected.
pub(crate) fn parse_path(key: &str, value: &str) -> Result<syn::Path> {
    let path = syn::parse_str::<syn::Path>(value)
        .map_err(|e| CodegenError::invalid_config(key, format!("`{}` is not a type path: {}", value, e)))?;
    if path.segments.iter().any(|segment| !segment.arguments.is_none()) {
        return Err(CodegenError::invalid_config(
            key,
            format!("`{}` must not carry generic arguments", value),
        ));
    }
    Ok(path)
}

pub(crate) fn parse_ident(key: &str, value: &str) -> Result<syn::Ident> {
    syn::parse_str::<syn::Ident>(value)
        .map_err(|e| CodegenError::invalid_config(key, format!("`{}` is not an identifier: {}", value, e)))
}

/// Everything the template instantiator needs besides the policy itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenConfig {
    pub template: String,
    pub package_placeholder: String,
    pub stub_function: String,
    pub schema: SchemaNames,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            package_placeholder: DEFAULT_PACKAGE_PLACEHOLDER.to_string(),
            stub_function: DEFAULT_STUB_FUNCTION.to_string(),
            schema: SchemaNames::default(),
        }
    }
}

impl CodegenConfig {
    /// Replace the bundled skeleton with the contents of `path`.
    pub fn with_template_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        self.template = std::fs::read_to_string(path).map_err(|e| CodegenError::io("read", path, e))?;
        Ok(self)
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_schema(mut self, schema: SchemaNames) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_stub_function(mut self, stub_function: impl Into<String>) -> Self {
        self.stub_function = stub_function.into();
        self
    }
}
