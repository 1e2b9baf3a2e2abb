//! Template instantiation.
//!
//! The skeleton is plain Rust source with a module-name placeholder and one
//! stub function returning an empty document (`IamPolicy::default()`). The
//! placeholder is substituted textually; the stub's return value is then
//! replaced on the parsed `syn::File`, so policy strings can never break the
//! surrounding syntax.

use log::{debug, warn};
use syn::visit_mut::{self, VisitMut};
use syn::{Block, Expr, ExprReturn, ImplItemFn, ItemFn, Path, ReturnType, Signature, Stmt, Type};

use crate::config::{parse_path, CodegenConfig};
use crate::errors::{CodegenError, Result};

/// Substitutes the package name into a skeleton and splices in the policy literal.
#[derive(Debug, Clone)]
pub struct TemplateInstantiator<'a> {
    config: &'a CodegenConfig,
}

impl<'a> TemplateInstantiator<'a> {
    pub fn new(config: &'a CodegenConfig) -> Self {
        Self { config }
    }

    /// Produce the skeleton's syntax tree with the stub return replaced by `literal`.
    pub fn instantiate(&self, package: &str, literal: Expr) -> Result<syn::File> {
        let file = self.parse_skeleton(package)?;
        let document_type = parse_path("document_type", &self.config.schema.document_type)?;
        replace_stub(file, &self.config.stub_function, &document_type, literal)
            .map(|replaced| replaced.file)
    }

    fn parse_skeleton(&self, package: &str) -> Result<syn::File> {
        let placeholder = &self.config.package_placeholder;
        if !placeholder.is_empty() && !self.config.template.contains(placeholder.as_str()) {
            debug!("Template has no '{}' placeholder; package '{}' unused", placeholder, package);
        }
        let source = if placeholder.is_empty() {
            self.config.template.clone()
        } else {
            self.config.template.replace(placeholder.as_str(), package)
        };

        syn::parse_file(&source).map_err(|e| {
            let start = e.span().start();
            CodegenError::Template(format!(
                "{} at line {} column {} (package `{}`)",
                e, start.line, start.column, package
            ))
        })
    }
}

/// Result of [`replace_stub`].
#[derive(Debug, Clone)]
pub struct ReplacedStub {
    pub file: syn::File,
    /// Placeholder returns found in the stub; only the first was replaced.
    pub stub_returns: usize,
}

/// Replace the first placeholder return inside `stub_function` with `literal`.
///
/// A placeholder is `Doc::default()`, `Default::default()` or `Doc {}` where
/// `Doc` is the function's declared return type and equals `document_type`.
pub fn replace_stub(
    mut file: syn::File,
    stub_function: &str,
    document_type: &Path,
    literal: Expr,
) -> Result<ReplacedStub> {
    let mut rewriter = StubRewriter {
        stub_function,
        document_type,
        replacement: Some(literal),
        matches: 0,
        in_stub: false,
    };
    rewriter.visit_file_mut(&mut file);

    let stub_returns = rewriter.matches;
    match stub_returns {
        0 => {
            return Err(CodegenError::StubNotFound {
                function: stub_function.to_string(),
                document_type: path_to_string(document_type),
            });
        }
        1 => debug!("Replaced stub return in `{}`", stub_function),
        n => warn!(
            "Found {} stub returns in `{}`; only the first was replaced",
            n, stub_function
        ),
    }
    Ok(ReplacedStub { file, stub_returns })
}

struct StubRewriter<'a> {
    stub_function: &'a str,
    document_type: &'a Path,
    replacement: Option<Expr>,
    matches: usize,
    in_stub: bool,
}

impl StubRewriter<'_> {
    fn is_stub_signature(&self, sig: &Signature) -> bool {
        if sig.ident != self.stub_function {
            return false;
        }
        match &sig.output {
            ReturnType::Type(_, ty) => match ty.as_ref() {
                Type::Path(type_path) => {
                    type_path.qself.is_none() && same_path(&type_path.path, self.document_type)
                }
                _ => false,
            },
            ReturnType::Default => false,
        }
    }

    fn rewrite_stub_body(&mut self, block: &mut Block) {
        // `return` expressions precede the tail expression in source order.
        visit_mut::visit_block_mut(self, block);
        if let Some(Stmt::Expr(tail, None)) = block.stmts.last_mut() {
            if is_placeholder(tail, self.document_type) {
                self.replace(tail);
            }
        }
    }

    fn replace(&mut self, target: &mut Expr) {
        self.matches += 1;
        if let Some(literal) = self.replacement.take() {
            *target = literal;
        }
    }

    fn enter(&mut self, sig: &Signature, block: &mut Block) {
        let is_stub = self.is_stub_signature(sig);
        let outer = std::mem::replace(&mut self.in_stub, is_stub);
        if is_stub {
            self.rewrite_stub_body(block);
        } else {
            visit_mut::visit_block_mut(self, block);
        }
        self.in_stub = outer;
    }
}

impl VisitMut for StubRewriter<'_> {
    fn visit_item_fn_mut(&mut self, item: &mut ItemFn) {
        self.enter(&item.sig, &mut item.block);
    }

    fn visit_impl_item_fn_mut(&mut self, item: &mut ImplItemFn) {
        self.enter(&item.sig, &mut item.block);
    }

    fn visit_expr_return_mut(&mut self, node: &mut ExprReturn) {
        if self.in_stub {
            if let Some(expr) = node.expr.as_deref_mut() {
                if is_placeholder(expr, self.document_type) {
                    self.replace(expr);
                    return;
                }
            }
        }
        visit_mut::visit_expr_return_mut(self, node);
    }
}

fn is_placeholder(expr: &Expr, document_type: &Path) -> bool {
    match expr {
        Expr::Call(call) if call.args.is_empty() => match call.func.as_ref() {
            Expr::Path(func) if func.qself.is_none() => {
                let segments: Vec<String> = func
                    .path
                    .segments
                    .iter()
                    .map(|s| s.ident.to_string())
                    .collect();
                let Some((last, receiver)) = segments.split_last() else {
                    return false;
                };
                let is_default_trait = receiver.len() == 1 && receiver[0] == "Default";
                last == "default"
                    && (is_default_trait || receiver == path_idents(document_type).as_slice())
            }
            _ => false,
        },
        Expr::Struct(lit) => {
            lit.qself.is_none()
                && lit.fields.is_empty()
                && lit.rest.is_none()
                && same_path(&lit.path, document_type)
        }
        _ => false,
    }
}

fn path_idents(path: &Path) -> Vec<String> {
    path.segments.iter().map(|s| s.ident.to_string()).collect()
}

fn same_path(a: &Path, b: &Path) -> bool {
    a.segments.iter().all(|s| s.arguments.is_none()) && path_idents(a) == path_idents(b)
}

fn path_to_string(path: &Path) -> String {
    path_idents(path).join("::")
}
