//! Golden tests: compile rules described in JSON and check their rewrites.
//!
//! Each file in `tests/golden/` gives an alphabet and a list of rules. A rule
//! lists alternatives for `phi` and the contexts (an empty list means no
//! constraint), a replacement string, optional `RewriteOptions`, and input
//! strings with the complete set of expected outputs. `[BOS]` and `[EOS]`
//! are the boundary markers.
//!
//! Run: cargo test -p cdrewrite-rule --test golden

use std::path::PathBuf;

use cdrewrite_fst::rational::{ClosureType, closure, union_all};
use cdrewrite_fst::{SymbolTable, TropicalWeight, VectorFst};
use cdrewrite_rule::apply::rewrites_str;
use cdrewrite_rule::{RewriteOptions, RewriteRule};
use serde::Deserialize;

type Fst = VectorFst<TropicalWeight>;

#[derive(Debug, Deserialize)]
struct GoldenFile {
    sigma: String,
    rules: Vec<GoldenRule>,
}

#[derive(Debug, Deserialize)]
struct GoldenRule {
    name: String,
    phi: Vec<String>,
    psi: String,
    #[serde(default)]
    left: Vec<String>,
    #[serde(default)]
    right: Vec<String>,
    #[serde(default)]
    options: RewriteOptions,
    cases: Vec<GoldenCase>,
}

#[derive(Debug, Deserialize)]
struct GoldenCase {
    input: String,
    outputs: Vec<String>,
}

fn load_golden(filename: &str) -> GoldenFile {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/golden")
        .join(filename);
    let contents = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read golden file {}: {}", path.display(), e));
    serde_json::from_str(&contents)
        .unwrap_or_else(|e| panic!("failed to parse golden file {}: {}", path.display(), e))
}

/// Union of the alternatives; no alternatives means the empty string.
fn alternatives(symbols: &mut SymbolTable, strings: &[String]) -> Fst {
    if strings.is_empty() {
        return Fst::epsilon();
    }
    let fsts: Vec<Fst> = strings
        .iter()
        .map(|s| symbols.acceptor(s).unwrap())
        .collect();
    union_all(&fsts)
}

fn run_golden(filename: &str) {
    let golden = load_golden(filename);
    let mut symbols = SymbolTable::new();
    let bos = symbols.add_symbol("BOS");
    let eos = symbols.add_symbol("EOS");
    let mut sigma: Fst = Fst::from_alphabet(symbols.compile(&golden.sigma).unwrap());
    closure(&mut sigma, ClosureType::Star);

    let mut failures = Vec::new();
    for rule in &golden.rules {
        let options = rule.options.with_boundary_markers(bos, eos);
        let compiled = RewriteRule::new(
            alternatives(&mut symbols, &rule.phi),
            symbols.acceptor(&rule.psi).unwrap(),
            alternatives(&mut symbols, &rule.left),
            alternatives(&mut symbols, &rule.right),
        )
        .with_options(options)
        .compile(&sigma)
        .unwrap_or_else(|e| panic!("{}: compile failed: {e}", rule.name));

        for case in &rule.cases {
            let mut actual = rewrites_str(&case.input, &compiled, &mut symbols)
                .unwrap_or_else(|e| panic!("{}: {:?}: {e}", rule.name, case.input));
            actual.sort();
            let mut expected = case.outputs.clone();
            expected.sort();
            if actual != expected {
                failures.push(format!(
                    "{}: {:?} -> expected {:?}, got {:?}",
                    rule.name, case.input, expected, actual
                ));
            }
        }
    }
    assert!(failures.is_empty(), "golden mismatches:\n{}", failures.join("\n"));
}

#[test]
fn golden_latin() {
    run_golden("latin.json");
}

#[test]
fn golden_directions() {
    run_golden("directions.json");
}
