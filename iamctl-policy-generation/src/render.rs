//! Source rendering.
//!
//! Formats the instantiated syntax tree with `prettyplease` and writes it to
//! its destination through a temporary file in the same directory, so an
//! interrupted run never leaves a truncated output behind.

use log::debug;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::errors::{CodegenError, Result};

/// Render a syntax tree in the canonical formatting style.
///
/// Plain `//` comments and blank lines of a skeleton are not part of the
/// syntax tree and are lost; doc comments (`//!`, `///`) are kept.
pub fn render_source(file: &syn::File) -> String {
    prettyplease::unparse(file)
}

/// Replace the contents of `path` with `source`.
///
/// The text is written to a temporary sibling file and renamed over `path`.
pub fn write_source(path: impl AsRef<Path>, source: &str) -> Result<()> {
    let path = path.as_ref();
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(directory)
        .map_err(|e| CodegenError::io("create temporary file in", directory, e))?;
    temp.write_all(source.as_bytes())
        .map_err(|e| CodegenError::io("write", temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| CodegenError::io("sync", temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| CodegenError::io("replace", path, e.error))?;

    debug!("Wrote {} bytes to {}", source.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_is_canonical() {
        let file: syn::File = syn::parse_str(
            "pub fn get_iam_policy()->IamPolicy{IamPolicy{version:\"1\".into(),statement:vec![]}}",
        )
        .unwrap();
        let rendered = render_source(&file);
        assert!(rendered.contains("pub fn get_iam_policy() -> IamPolicy {\n"));
        assert!(rendered.ends_with("}\n"));

        let reparsed: syn::File = syn::parse_str(&rendered).unwrap();
        assert_eq!(render_source(&reparsed), rendered);
    }

    #[test]
    fn test_render_keeps_doc_comments_only() {
        let file: syn::File = syn::parse_str(
            "//! Generated policy.\n\n// scaffolding note\n/// The policy.\npub struct IamPolicy;\n",
        )
        .unwrap();
        let rendered = render_source(&file);
        assert!(rendered.contains("//! Generated policy."));
        assert!(rendered.contains("/// The policy."));
        assert!(!rendered.contains("scaffolding note"));
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("iam_policy.rs");
        std::fs::write(&path, "stale contents that are longer than the new ones").unwrap();

        write_source(&path, "fresh").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh");
        let leftovers = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temporary file should be renamed away");
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("iam_policy.rs");

        let err = write_source(&path, "fresh").unwrap_err();
        assert!(matches!(err, CodegenError::Io { .. }));
        assert!(!path.exists());
    }
}
