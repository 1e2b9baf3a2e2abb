use std::path::Path;

use log::{debug, info};

use crate::api::model::{GeneratePolicyConfig, GenerationSummary};
use crate::config::CodegenConfig;
use crate::errors::Result;
use crate::model::PolicyDocument;
use crate::normalize::normalize_document;
use crate::parser::{parse_policy_document, read_policy_document};
use crate::render::{render_source, write_source};
use crate::synthesis::Synthesizer;
use crate::template::TemplateInstantiator;

struct Compiled {
    source: String,
    input_statements: usize,
    normalized_statements: usize,
}

fn compile(document: PolicyDocument, package: &str, config: &CodegenConfig) -> Result<Compiled> {
    // Schema names are resolved first so configuration errors win over document errors.
    let synthesizer = Synthesizer::new(&config.schema)?;

    let input_statements = document.statements.len();
    let document = normalize_document(document);
    let normalized_statements = document.statements.len();
    debug!(
        "Normalized {} statements into {} single-resource statements",
        input_statements, normalized_statements
    );

    let literal = synthesizer.document(&document)?.to_expr()?;
    let file = TemplateInstantiator::new(config).instantiate(package, literal)?;

    Ok(Compiled {
        source: render_source(&file),
        input_statements,
        normalized_statements,
    })
}

/// Compile policy JSON into Rust source without touching the filesystem.
pub fn generate_source(input: &[u8], package: &str, config: &CodegenConfig) -> Result<String> {
    let document = parse_policy_document(input)?;
    compile(document, package, config).map(|compiled| compiled.source)
}

/// Read, compile and write one policy document.
///
/// Nothing is written unless every stage succeeds.
pub fn generate_iam_policy(config: &GeneratePolicyConfig) -> Result<GenerationSummary> {
    info!(
        "Generating IAM policy source from {} into {}",
        config.input_file.display(),
        config.output_file.display()
    );

    let document = read_policy_document(&config.input_file)?;
    let compiled = compile(document, &config.package, &config.codegen)?;
    write_source(&config.output_file, &compiled.source)?;

    let summary = GenerationSummary {
        input_statements: compiled.input_statements,
        normalized_statements: compiled.normalized_statements,
        bytes_written: compiled.source.len(),
    };
    info!(
        "Wrote {} statements ({} in input) to {}",
        summary.normalized_statements,
        summary.input_statements,
        config.output_file.display()
    );
    Ok(summary)
}

/// Read a policy document and return it with every statement split to a single resource.
pub fn normalize_policy_file(path: impl AsRef<Path>) -> Result<PolicyDocument> {
    read_policy_document(path).map(normalize_document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CodegenError;
    use tempfile::TempDir;

    const POLICY: &str = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":["ec2:CreateTags"],"Resource":["arn:a","arn:b"],"Condition":{"Null":{"k":"true"}}}]}"#;

    #[test]
    fn test_generate_iam_policy_writes_output() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("policy.json");
        let output = temp_dir.path().join("iam_policy.rs");
        std::fs::write(&input, POLICY).unwrap();

        let summary =
            generate_iam_policy(&GeneratePolicyConfig::new(&input, &output).with_package("awslbc")).unwrap();

        assert_eq!(summary.input_statements, 1);
        assert_eq!(summary.normalized_statements, 2);
        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written.len(), summary.bytes_written);
        assert!(written.contains("pub mod awslbc"));
    }

    #[test]
    fn test_failed_generation_leaves_output_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("policy.json");
        let output = temp_dir.path().join("iam_policy.rs");
        std::fs::write(&input, r#"{"Version":"1","Statement":[{"Effect":"Allow","Action":"a","Resource":{}}]}"#).unwrap();
        std::fs::write(&output, "previous").unwrap();

        let err = generate_iam_policy(&GeneratePolicyConfig::new(&input, &output)).unwrap_err();

        assert!(matches!(err, CodegenError::InvalidFieldType { .. }));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous");
    }

    #[test]
    fn test_missing_stub_aborts_before_writing() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("policy.json");
        let output = temp_dir.path().join("iam_policy.rs");
        std::fs::write(&input, POLICY).unwrap();

        let codegen = CodegenConfig::default().with_stub_function("policy");
        let err = generate_iam_policy(&GeneratePolicyConfig::new(&input, &output).with_codegen(codegen))
            .unwrap_err();

        assert!(matches!(err, CodegenError::StubNotFound { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_normalize_policy_file() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("policy.json");
        std::fs::write(&input, POLICY).unwrap();

        let document = normalize_policy_file(&input).unwrap();
        assert_eq!(document.statements.len(), 2);
        assert_eq!(document.statements[1].single_resource(), Some("arn:b"));
    }
}
