//! Layering guardrails for the harness manifests.
//!
//! Test-only crates (`tempfile`, `insta`, `proptest`) belong in
//! **dev-dependencies**, and the fuzzing runtime stays inside `fuzz/`. These
//! tests read the manifests as text and compare dependency tables.

const ROOT_MANIFEST: &str = include_str!("../Cargo.toml");
const FUZZ_MANIFEST: &str = include_str!("../fuzz/Cargo.toml");

const TEST_ONLY: &[&str] = &["tempfile", "insta", "proptest"];

/// Crate names declared in `[table]`, with comments stripped.
fn dependency_names<'a>(manifest: &'a str, table: &str) -> Vec<&'a str> {
    let header = format!("[{table}]");
    manifest
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .skip_while(|line| *line != header)
        .skip(1)
        .take_while(|line| !line.starts_with('['))
        .filter_map(|line| line.split_once('=').map(|(name, _)| name.trim()))
        .collect()
}

#[test]
fn test_only_crates_stay_in_dev_dependencies() {
    let runtime = dependency_names(ROOT_MANIFEST, "dependencies");
    let dev = dependency_names(ROOT_MANIFEST, "dev-dependencies");
    for name in TEST_ONLY {
        assert!(
            !runtime.contains(name),
            "`{name}` must not appear in [dependencies]; use [dev-dependencies] instead"
        );
        assert!(dev.contains(name), "`{name}` is missing from [dev-dependencies]");
    }
}

#[test]
fn fuzz_runtime_stays_out_of_the_harness() {
    let fuzz = dependency_names(FUZZ_MANIFEST, "dependencies");
    assert!(fuzz.contains(&"libfuzzer-sys"));
    assert!(fuzz.contains(&"codegen-harness"));

    for table in ["dependencies", "dev-dependencies"] {
        assert!(
            !dependency_names(ROOT_MANIFEST, table).contains(&"libfuzzer-sys"),
            "libfuzzer-sys belongs in fuzz/Cargo.toml, not [{table}]"
        );
    }
}

#[test]
fn dependency_scan_reads_one_table() {
    let manifest = "[package]\nname = \"x\"\n\n[dependencies]\nwalkdir = \"2\" # sorted walks\n# insta = \"1\"\n\n[dev-dependencies]\ninsta = \"1\"\n";
    assert_eq!(dependency_names(manifest, "dependencies"), ["walkdir"]);
    assert_eq!(dependency_names(manifest, "dev-dependencies"), ["insta"]);
    assert!(dependency_names(manifest, "build-dependencies").is_empty());
}
