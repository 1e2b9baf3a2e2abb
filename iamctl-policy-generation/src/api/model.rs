//! Request and result types of the generation API.

use std::path::PathBuf;

use crate::config::CodegenConfig;

/// Module name substituted into the skeleton when none is given.
pub const DEFAULT_PACKAGE: &str = "iam_policy";

/// One generation run: policy JSON in, Rust source out.
#[derive(Debug, Clone)]
pub struct GeneratePolicyConfig {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    /// Module name substituted for the skeleton's package placeholder.
    pub package: String,
    pub codegen: CodegenConfig,
}

impl GeneratePolicyConfig {
    pub fn new(input_file: impl Into<PathBuf>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            input_file: input_file.into(),
            output_file: output_file.into(),
            package: DEFAULT_PACKAGE.to_string(),
            codegen: CodegenConfig::default(),
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_codegen(mut self, codegen: CodegenConfig) -> Self {
        self.codegen = codegen;
        self
    }
}

/// What a generation run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSummary {
    pub input_statements: usize,
    pub normalized_statements: usize,
    pub bytes_written: usize,
}
