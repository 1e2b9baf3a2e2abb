//! Literal synthesis.
//!
//! Maps a normalized [`PolicyDocument`] onto a [`Literal`] tree whose composite
//! nodes carry the downstream nominal types, then lowers that tree to a
//! `syn::Expr` that constructs the same value in Rust source.

use proc_macro2::Span;
use quote::quote;
use syn::{parse_quote, Expr, Ident, LitStr, Path};

use crate::config::{parse_ident, parse_path, SchemaNames};
use crate::errors::{CodegenError, Result};
use crate::model::{ConditionKeyValue, ConditionTree, PolicyDocument, StatementSpec};

/// Generic literal-construction tree annotated with target types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// `"text".into()`
    Str(String),
    /// `Vec::from([a, b, ...])`
    Seq(Vec<Literal>),
    /// `Type::from([(key, value), ...])`; keys must be [`Literal::Str`].
    Map {
        ty: Path,
        entries: Vec<(Literal, Literal)>,
    },
    /// `Type { field: value, ... }`
    Struct {
        ty: Path,
        fields: Vec<(Ident, Literal)>,
    },
    /// `Some(value)`
    Present(Box<Literal>),
    /// `None`
    Absent,
}

impl Literal {
    /// Lower this literal into a Rust expression.
    pub fn to_expr(&self) -> Result<Expr> {
        let expr: Expr = match self {
            Self::Str(value) => {
                let lit = LitStr::new(value, Span::call_site());
                parse_quote!(#lit.into())
            }
            Self::Seq(items) => {
                let items = items.iter().map(Self::to_expr).collect::<Result<Vec<_>>>()?;
                // A macro body would be emitted as raw tokens by the formatter.
                parse_quote!(Vec::from([#(#items),*]))
            }
            Self::Map { ty, entries } => {
                let pairs = entries
                    .iter()
                    .map(|(key, value)| {
                        if !matches!(key, Self::Str(_)) {
                            return Err(CodegenError::UnsupportedType(format!(
                                "map key of `{}` must be a string, found {}",
                                quote!(#ty),
                                key.kind()
                            )));
                        }
                        let key = key.to_expr()?;
                        let value = value.to_expr()?;
                        Ok(quote!((#key, #value)))
                    })
                    .collect::<Result<Vec<_>>>()?;
                parse_quote!(#ty::from([#(#pairs),*]))
            }
            Self::Struct { ty, fields } => {
                let names = fields.iter().map(|(name, _)| name);
                let values = fields
                    .iter()
                    .map(|(_, value)| value.to_expr())
                    .collect::<Result<Vec<_>>>()?;
                parse_quote!(#ty { #(#names: #values),* })
            }
            Self::Present(inner) => {
                let inner = inner.to_expr()?;
                parse_quote!(Some(#inner))
            }
            Self::Absent => parse_quote!(None),
        };
        Ok(expr)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Seq(_) => "sequence",
            Self::Map { .. } => "map",
            Self::Struct { .. } => "struct",
            Self::Present(_) | Self::Absent => "option",
        }
    }
}

/// Builds [`Literal`] trees for a particular target schema.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    document_type: Path,
    statement_type: Path,
    condition_type: Path,
    condition_key_value_type: Path,
    version_field: Ident,
    statement_field: Ident,
    effect_field: Ident,
    action_field: Ident,
    resource_field: Ident,
    condition_field: Ident,
}

impl Synthesizer {
    pub fn new(schema: &SchemaNames) -> Result<Self> {
        Ok(Self {
            document_type: parse_path("document_type", &schema.document_type)?,
            statement_type: parse_path("statement_type", &schema.statement_type)?,
            condition_type: parse_path("condition_type", &schema.condition_type)?,
            condition_key_value_type: parse_path(
                "condition_key_value_type",
                &schema.condition_key_value_type,
            )?,
            version_field: parse_ident("version_field", &schema.version_field)?,
            statement_field: parse_ident("statement_field", &schema.statement_field)?,
            effect_field: parse_ident("effect_field", &schema.effect_field)?,
            action_field: parse_ident("action_field", &schema.action_field)?,
            resource_field: parse_ident("resource_field", &schema.resource_field)?,
            condition_field: parse_ident("condition_field", &schema.condition_field)?,
        })
    }

    /// `Document { version, statement: Vec::from([...]) }` for a normalized document.
    pub fn document(&self, document: &PolicyDocument) -> Result<Literal> {
        let statements = document
            .statements
            .iter()
            .map(|statement| self.statement(statement))
            .collect::<Result<Vec<_>>>()?;

        Ok(Literal::Struct {
            ty: self.document_type.clone(),
            fields: vec![
                (self.version_field.clone(), Literal::Str(document.version.clone())),
                (self.statement_field.clone(), Literal::Seq(statements)),
            ],
        })
    }

    /// Four-field statement literal. The statement must already be normalized.
    pub fn statement(&self, statement: &StatementSpec) -> Result<Literal> {
        let resource = statement.single_resource().ok_or_else(|| {
            CodegenError::UnsupportedType(format!(
                "statement with {} resources reached synthesis",
                statement.resources.len()
            ))
        })?;

        let condition = match &statement.condition {
            Some(tree) => Literal::Present(Box::new(self.condition(tree))),
            None => Literal::Absent,
        };

        Ok(Literal::Struct {
            ty: self.statement_type.clone(),
            fields: vec![
                (self.effect_field.clone(), Literal::Str(statement.effect.clone())),
                (
                    self.action_field.clone(),
                    Literal::Seq(statement.actions.iter().cloned().map(Literal::Str).collect()),
                ),
                (self.resource_field.clone(), Literal::Str(resource.to_string())),
                (self.condition_field.clone(), condition),
            ],
        })
    }

    /// Entries follow the tree's key order, so output is stable across runs.
    fn condition(&self, tree: &ConditionTree) -> Literal {
        Literal::Map {
            ty: self.condition_type.clone(),
            entries: tree
                .iter()
                .map(|(operator, clauses)| {
                    (Literal::Str(operator.clone()), self.condition_key_value(clauses))
                })
                .collect(),
        }
    }

    fn condition_key_value(&self, clauses: &ConditionKeyValue) -> Literal {
        Literal::Map {
            ty: self.condition_key_value_type.clone(),
            entries: clauses
                .iter()
                .map(|(key, value)| (Literal::Str(key.clone()), Literal::Str(value.clone())))
                .collect(),
        }
    }
}
