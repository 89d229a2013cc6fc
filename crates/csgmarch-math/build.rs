//! Build script for csgmarch-math
//!
//! Reads formula specifications from TOML files and generates:
//! - Rust implementations (f64, scene space)
//! - WGSL shader code (f32, GPU side)
//! - Test cases
//! - Documentation

// Build scripts should fail loudly on malformed specs
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Deserialize;

// ============================================================================
// TOML Schema Definitions
// ============================================================================

#[derive(Debug, Deserialize)]
struct FormulaSpec {
    formula: FormulaInfo,
    codegen: CodegenTemplates,
}

#[derive(Debug, Deserialize)]
struct FormulaInfo {
    name: String,
    category: String,
    description: String,
    returns: ReturnInfo,
    params: Vec<ParamInfo>,
    steps: Vec<Step>,
    #[serde(default)]
    pitfalls: Vec<Pitfall>,
    tests: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
struct ParamInfo {
    name: String,
    #[serde(rename = "type")]
    param_type: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ReturnInfo {
    #[serde(rename = "type")]
    return_type: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct Step {
    name: String,
    expr: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct Pitfall {
    name: String,
    wrong: String,
    right: String,
    explanation: String,
}

/// A test vector. `args` are Rust expressions, passed to the generated
/// function in parameter order.
#[derive(Debug, Deserialize)]
struct TestCase {
    name: String,
    args: Vec<String>,
    expected: f64,
    tolerance: f64,
    description: String,
}

#[derive(Debug, Deserialize)]
struct CodegenTemplates {
    rust: TemplateInfo,
    wgsl: TemplateInfo,
    test: TemplateInfo,
}

#[derive(Debug, Deserialize)]
struct TemplateInfo {
    template: String,
}

// ============================================================================
// Code Generation
// ============================================================================

fn generate_param_docs(params: &[ParamInfo]) -> String {
    params
        .iter()
        .map(|p| format!("/// - `{}` ({}): {}", p.name, p.param_type, p.description))
        .collect::<Vec<_>>()
        .join("\n")
}

fn generate_step_docs(steps: &[Step]) -> String {
    steps
        .iter()
        .map(|s| format!("/// - `{}` = {} : {}", s.name, s.expr, s.description))
        .collect::<Vec<_>>()
        .join("\n")
}

fn generate_pitfall_docs(pitfalls: &[Pitfall]) -> String {
    if pitfalls.is_empty() {
        return "/// - none recorded".to_string();
    }
    pitfalls
        .iter()
        .map(|p| format!("/// - **{}**: Use `{}` not `{}`", p.name, p.right, p.wrong))
        .collect::<Vec<_>>()
        .join("\n")
}

fn generate_rust_code(spec: &FormulaSpec) -> String {
    let formula = &spec.formula;

    spec.codegen
        .rust
        .template
        .replace("{name}", &formula.name)
        .replace("{description}", &formula.description)
        .replace("{param_docs}", &generate_param_docs(&formula.params))
        .replace("{step_docs}", &generate_step_docs(&formula.steps))
        .replace("{pitfall_docs}", &generate_pitfall_docs(&formula.pitfalls))
}

fn generate_wgsl_code(spec: &FormulaSpec) -> String {
    let formula = &spec.formula;

    spec.codegen
        .wgsl
        .template
        .replace("{name}", &formula.name)
        .replace("{description}", &formula.description)
}

fn generate_test_code(spec: &FormulaSpec) -> String {
    let formula = &spec.formula;
    let template = &spec.codegen.test.template;

    formula
        .tests
        .iter()
        .map(|test| {
            assert_eq!(
                test.args.len(),
                formula.params.len(),
                "test `{}` of `{}` has the wrong number of args",
                test.name,
                formula.name
            );

            template
                .replace("{name}", &formula.name)
                .replace("{test_name}", &test.name)
                .replace("{args}", &test.args.join(", "))
                .replace("{expected}", &format!("{:?}", test.expected))
                .replace("{tolerance}", &format!("{:?}", test.tolerance))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn generate_markdown_docs(spec: &FormulaSpec) -> String {
    let formula = &spec.formula;

    let mut doc = String::new();

    writeln!(doc, "# {}\n", formula.name).unwrap();
    writeln!(doc, "{}\n", formula.description).unwrap();
    writeln!(doc, "**Category:** {}\n", formula.category).unwrap();

    doc.push_str("## Parameters\n\n");
    for param in &formula.params {
        writeln!(
            doc,
            "- `{}` ({}): {}",
            param.name, param.param_type, param.description
        )
        .unwrap();
    }

    doc.push_str("\n## Returns\n\n");
    writeln!(
        doc,
        "- `{}`: {}\n",
        formula.returns.return_type, formula.returns.description
    )
    .unwrap();

    doc.push_str("## Formula Steps\n\n");
    for step in &formula.steps {
        writeln!(doc, "1. **{}** = `{}`", step.name, step.expr).unwrap();
        writeln!(doc, "   - {}\n", step.description).unwrap();
    }

    if !formula.pitfalls.is_empty() {
        doc.push_str("## Pitfalls\n\n");
        for pitfall in &formula.pitfalls {
            writeln!(doc, "### {}\n", pitfall.name).unwrap();
            writeln!(doc, "- **Wrong:** `{}`", pitfall.wrong).unwrap();
            writeln!(doc, "- **Right:** `{}`\n", pitfall.right).unwrap();
            writeln!(doc, "{}\n", pitfall.explanation.trim()).unwrap();
        }
    }

    doc.push_str("## Test Vectors\n\n");
    doc.push_str("| Test | Args | Expected | Description |\n");
    doc.push_str("|------|------|----------|-------------|\n");
    for test in &formula.tests {
        writeln!(
            doc,
            "| {} | `{}` | {} | {} |",
            test.name,
            test.args.join(", "),
            test.expected,
            test.description
        )
        .unwrap();
    }

    doc
}

// ============================================================================
// Main Build Script
// ============================================================================

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let out_path = Path::new(&out_dir);

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let formulas_dir = Path::new(&manifest_dir).join("formulas");

    let mut rust_code = String::new();
    let mut wgsl_code = String::new();
    let mut test_code = String::new();
    let mut docs = String::new();
    let mut names = Vec::new();

    rust_code.push_str("// AUTO-GENERATED by build.rs from formula specs\n");
    rust_code.push_str("// DO NOT EDIT - modify the TOML files in formulas/ instead\n\n");
    rust_code.push_str("use glam::DVec3;\n\n");

    wgsl_code.push_str("// AUTO-GENERATED by build.rs from formula specs\n");
    wgsl_code.push_str("// DO NOT EDIT - modify the TOML files in formulas/ instead\n\n");

    test_code.push_str("// AUTO-GENERATED by build.rs from formula specs\n");
    test_code.push_str("// DO NOT EDIT - modify the TOML files in formulas/ instead\n\n");

    docs.push_str("# csgmarch Formula Reference\n\n");
    docs.push_str("*Auto-generated from formula specifications*\n\n");
    docs.push_str("---\n\n");

    let mut entries: Vec<_> = fs::read_dir(&formulas_dir)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", formulas_dir.display(), e))
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "toml"))
        .collect();

    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        println!("cargo:rerun-if-changed={}", path.display());

        let content = fs::read_to_string(&path).unwrap();
        let spec: FormulaSpec = toml::from_str(&content).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {}", path.display(), e);
        });

        names.push(spec.formula.name.clone());

        rust_code.push_str(&generate_rust_code(&spec));
        rust_code.push_str("\n\n");

        wgsl_code.push_str(&generate_wgsl_code(&spec));
        wgsl_code.push_str("\n\n");

        test_code.push_str(&generate_test_code(&spec));
        test_code.push_str("\n\n");

        docs.push_str(&generate_markdown_docs(&spec));
        docs.push_str("\n---\n\n");
    }

    // Name table so callers can check a shader carries every formula
    writeln!(
        rust_code,
        "/// Names of every generated formula, in file order\npub const FORMULA_NAMES: &[&str] = &[{}];",
        names
            .iter()
            .map(|n| format!("{:?}", n))
            .collect::<Vec<_>>()
            .join(", ")
    )
    .unwrap();

    fs::write(out_path.join("formulas.rs"), rust_code).unwrap();
    fs::write(out_path.join("formulas.wgsl"), wgsl_code).unwrap();
    fs::write(out_path.join("tests.rs"), test_code).unwrap();
    fs::write(out_path.join("FORMULAS.md"), docs).unwrap();

    println!("cargo:rerun-if-changed=formulas");
}
