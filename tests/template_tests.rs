//! Rendering tests for the shipped manifest template
//!
//! Review snapshot changes with `cargo insta review`.

use std::fs;

use codegen_harness::harness::template::{TemplateContext, TemplateRenderer, render_str};
use codegen_harness::version::PINNED_COMPILER_REVISION;

const TEMPLATE: &str = include_str!("../templates/Cargo.toml.template");

#[test]
fn test_manifest_template_snapshot() {
    let context = TemplateContext::new("double", PINNED_COMPILER_REVISION);
    let rendered = render_str("Cargo.toml", TEMPLATE, &context).unwrap();
    insta::assert_snapshot!(rendered, @r#"
    [package]
    name = "double"
    version = "0.1.0"
    edition = "2018"
    publish = false

    [dependencies.lavish]
    git = "https://github.com/lavish-lang/lavish-rs"
    rev = "51aa2bc653454931253c6a396dc160652e458566"
    "#);
}

/// Rendering into a manifest and reading it back yields both values verbatim
/// and no placeholder tokens.
#[test]
fn test_manifest_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let templates = dir.path().join("templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(templates.join("Cargo.toml.template"), TEMPLATE).unwrap();

    let out = dir.path().join("tmp/harness/double/Cargo.toml");
    let context = TemplateContext::new("double", "51aa2bc6");
    TemplateRenderer::new(&templates)
        .render_to_file("Cargo.toml", &context, &out)
        .unwrap();

    let manifest = fs::read_to_string(&out).unwrap();
    assert!(manifest.contains("name = \"double\""));
    assert!(manifest.contains("rev = \"51aa2bc6\""));
    assert!(!manifest.contains("{{"));
    assert!(!manifest.contains("}}"));
}

#[test]
fn test_shipped_template_only_uses_known_variables() {
    let context = TemplateContext::new("x", "y");
    assert!(render_str("Cargo.toml", TEMPLATE, &context).is_ok());
}
