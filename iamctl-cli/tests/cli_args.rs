use std::process::Command;

const POLICY: &str = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":["ec2:CreateTags"],"Resource":["arn:a","arn:b"],"Condition":{"Null":{"k":"true"}}}]}"#;

const INVALID_POLICY: &str = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":"a","Resource":{"Arn":"x"}}]}"#;

fn iamctl() -> Command {
    Command::new(env!("CARGO_BIN_EXE_iamctl"))
}

#[test]
fn help_lists_subcommands() {
    let out = iamctl().arg("--help").output().expect("failed to run --help");
    let s = String::from_utf8_lossy(&out.stdout);
    assert!(s.contains("genpolicy"), "help was: {}", s);
    assert!(s.contains("normalize"), "help was: {}", s);
}

#[test]
fn test_genpolicy_writes_module() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let input = temp_dir.path().join("iam-policy.json");
    let output = temp_dir.path().join("iam_policy.rs");
    std::fs::write(&input, POLICY).unwrap();

    let out = iamctl()
        .arg("genpolicy")
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["-p", "awsloadbalancercontroller"])
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run genpolicy");

    assert_eq!(
        out.status.code(),
        Some(0),
        "stderr was: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("bytes of Rust source"), "stderr was: {}", stderr);
    let source = std::fs::read_to_string(&output).unwrap();
    assert!(source.contains("pub mod awsloadbalancercontroller {"));
    assert!(source.contains("\"arn:a\""));
    assert!(source.contains("\"arn:b\""));
    assert!(syn::parse_file(&source).is_ok());
}

#[test]
fn test_genpolicy_requires_input_and_output() {
    let out = iamctl()
        .args(["genpolicy", "-o", "unused.rs"])
        .output()
        .expect("failed to run genpolicy");

    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("--input-file"), "stderr was: {}", stderr);
}

#[test]
fn test_genpolicy_invalid_policy_fails_without_output() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let input = temp_dir.path().join("iam-policy.json");
    let output = temp_dir.path().join("iam_policy.rs");
    std::fs::write(&input, INVALID_POLICY).unwrap();

    let out = iamctl()
        .arg("genpolicy")
        .arg("--input-file")
        .arg(&input)
        .arg("--output-file")
        .arg(&output)
        .output()
        .expect("failed to run genpolicy");

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Statement[0].Resource"), "stderr was: {}", stderr);
    assert!(!output.exists());
}

#[test]
fn test_genpolicy_missing_input_reports_path() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let input = temp_dir.path().join("absent.json");
    let output = temp_dir.path().join("iam_policy.rs");

    let out = iamctl()
        .arg("genpolicy")
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .output()
        .expect("failed to run genpolicy");

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("absent.json"), "stderr was: {}", stderr);
}

#[test]
fn test_genpolicy_with_schema_override() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let input = temp_dir.path().join("iam-policy.json");
    let output = temp_dir.path().join("iam_policy.rs");
    let schema = temp_dir.path().join("schema.toml");
    std::fs::write(&input, POLICY).unwrap();
    std::fs::write(&schema, "condition_field = \"condition\"\n").unwrap();

    let out = iamctl()
        .arg("genpolicy")
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--schema")
        .arg(&schema)
        .output()
        .expect("failed to run genpolicy");

    assert_eq!(out.status.code(), Some(0));
    let source = std::fs::read_to_string(&output).unwrap();
    assert!(source.contains("condition: Some("));
    assert!(source.contains("action: Vec::from([\"ec2:CreateTags\".into()]),"));
    assert!(!source.contains("policy_condition"));
}

#[test]
fn test_normalize_prints_single_resource_statements() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let input = temp_dir.path().join("iam-policy.json");
    std::fs::write(&input, POLICY).unwrap();

    let out = iamctl()
        .arg("normalize")
        .arg("-i")
        .arg(&input)
        .output()
        .expect("failed to run normalize");

    assert_eq!(out.status.code(), Some(0));
    let document: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let statements = document["Statement"].as_array().unwrap();
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0]["Resource"], "arn:a");
    assert_eq!(statements[1]["Resource"], "arn:b");
    assert_eq!(statements[1]["Condition"]["Null"]["k"], "true");
}
