// Integration tests for Pypeline

use assert_cmd::Command;
use predicates::prelude::*;
use pypeline::{
    assign_import_levels, persist, Config, DiagramGenerator, LevelStrategy, LoadWarning, Project,
    ProjectLoader, ProjectReport, PythonImporter,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixtures_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn create_loader() -> ProjectLoader {
    ProjectLoader::new(Config::default()).expect("Failed to create loader")
}

fn write_project(dir: &Path, files: &[(&str, &str)]) {
    for (name, contents) in files {
        fs::write(dir.join(name), contents).unwrap();
    }
}

fn names(project: &Project, ids: &[pypeline::FileId]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| project.file(*id))
        .map(|f| f.file_name.clone())
        .collect()
}

fn pypeline() -> Command {
    Command::cargo_bin("pypeline").unwrap()
}

// ============================================================================
// Import extraction
// ============================================================================

#[test]
fn test_extract_whole_and_partial_imports() {
    let dir = TempDir::new().unwrap();
    write_project(
        dir.path(),
        &[("main.py", "import os, sys as system\nfrom utils import load, save as store\n")],
    );

    let file = PythonImporter::new()
        .extract_imports(&dir.path().join("main.py"))
        .unwrap();

    assert_eq!(file.file_name, "main");
    assert_eq!(file.imports.len(), 3);
    assert_eq!(file.imports[0].target_name, "os");
    assert!(file.imports[0].entire_file);
    assert_eq!(file.imports[1].target_name, "sys");
    assert!(!file.imports[2].entire_file);
    assert_eq!(file.imports[2].target_name, "utils");
    assert_eq!(file.imports[2].imported_symbols, vec!["load", "save"]);
}

#[test]
fn test_extract_continuation_lines() {
    let scan = PythonImporter::new().extract_from_source("import a, \\\nb, c\n");
    let targets: Vec<&str> = scan.imports.iter().map(|i| i.target_name.as_str()).collect();
    assert_eq!(targets, vec!["a", "b", "c"]);
    assert!(scan.imports.iter().all(|i| i.entire_file));
}

#[test]
fn test_extract_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = PythonImporter::new().extract_imports(&dir.path().join("gone.py"));
    assert!(matches!(result, Err(pypeline::Error::Read { .. })));
}

// ============================================================================
// Opening a project
// ============================================================================

#[test]
fn test_open_fixture_project() {
    let loaded = create_loader().open(&fixtures_path("shop")).unwrap();
    let project = &loaded.project;

    assert_eq!(project.len(), 6);
    assert!(project.files()[0].is_general());
    assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);

    let heads = project.head_files();
    assert_eq!(names(project, &heads), vec!["main", "report"]);

    let pricing = project.file_by_name("pricing").unwrap();
    assert_eq!(
        names(project, &project.file(pricing).unwrap().imported_by),
        vec!["cart", "inventory"]
    );

    let inventory = project.file_by_name("inventory").unwrap();
    let symbols = &project.file(inventory).unwrap().imports[0].imported_symbols;
    assert_eq!(symbols, &vec!["price".to_string(), "discount".to_string()]);
}

#[test]
fn test_fixture_levels() {
    let loaded = create_loader().open(&fixtures_path("shop")).unwrap();
    let project = &loaded.project;
    let levels = assign_import_levels(project, LevelStrategy::BreadthFirst).unwrap();

    let level = |name: &str| levels.get(project.file_by_name(name).unwrap());
    assert_eq!(level("main"), Some(0));
    assert_eq!(level("report"), Some(0));
    assert_eq!(level("cart"), Some(1));
    assert_eq!(level("inventory"), Some(1));
    assert_eq!(level("pricing"), Some(2));
    assert_eq!(level("General"), None);
}

#[test]
fn test_chain_levels() {
    let dir = TempDir::new().unwrap();
    write_project(
        dir.path(),
        &[("a.py", "import b\n"), ("b.py", "import c\n"), ("c.py", "")],
    );

    let project = create_loader().open(dir.path()).unwrap().project;
    for strategy in [
        LevelStrategy::BreadthFirst,
        LevelStrategy::Legacy {
            max_visits_per_file: 8,
        },
    ] {
        let levels = assign_import_levels(&project, strategy).unwrap();
        let level = |name: &str| levels.get(project.file_by_name(name).unwrap());
        assert_eq!(level("a"), Some(0));
        assert_eq!(level("b"), Some(1));
        assert_eq!(level("c"), Some(2));
    }
}

#[test]
fn test_unresolved_import_stays_external() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), &[("main.py", "import numpy\n"), ("utils.py", "")]);

    let project = create_loader().open(dir.path()).unwrap().project;
    let main = project.file_by_name("main").unwrap();
    assert!(project.file(main).unwrap().imports[0].resolved.is_none());
    assert!(project.files().iter().all(|f| f.imported_by.is_empty()));
}

#[test]
fn test_link_is_idempotent() {
    let mut project = create_loader().open(&fixtures_path("shop")).unwrap().project;
    let before = project.files().to_vec();
    project.link();
    assert_eq!(project.files(), before.as_slice());
}

#[test]
fn test_head_files_exclude_general() {
    let loaded = create_loader().open(&fixtures_path("shop")).unwrap();
    for (id, file) in loaded.project.iter() {
        let expected = file.imported_by.is_empty() && file.file_name != "General";
        assert_eq!(file.is_head_file(), expected, "{:?}", id);
    }
}

#[test]
fn test_cycle_with_legacy_strategy() {
    let dir = TempDir::new().unwrap();
    write_project(
        dir.path(),
        &[("main.py", "import a\n"), ("a.py", "import b\n"), ("b.py", "import a\n")],
    );
    let project = create_loader().open(dir.path()).unwrap().project;

    let legacy = assign_import_levels(
        &project,
        LevelStrategy::Legacy {
            max_visits_per_file: 16,
        },
    );
    assert!(matches!(legacy, Err(pypeline::Error::Analysis(_))));

    let levels = assign_import_levels(&project, LevelStrategy::BreadthFirst).unwrap();
    assert_eq!(levels.get(project.file_by_name("b").unwrap()), Some(2));
}

#[test]
fn test_duplicate_names_in_recursive_scan() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("pkg")).unwrap();
    write_project(dir.path(), &[("main.py", "import utils\n"), ("utils.py", "")]);
    fs::write(dir.path().join("pkg").join("utils.py"), "").unwrap();

    let mut config = Config::default();
    config.scan.recursive = true;
    let loaded = ProjectLoader::new(config).unwrap().open(dir.path()).unwrap();

    assert!(loaded
        .warnings
        .iter()
        .any(|w| matches!(w, LoadWarning::DuplicateFileName { name, .. } if name == "utils")));
}

// ============================================================================
// Settings files
// ============================================================================

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    write_project(
        dir.path(),
        &[("main.py", "import utils\n"), ("utils.py", "import os\n")],
    );

    let loader = create_loader();
    let mut project = loader.open(dir.path()).unwrap().project;
    project.set_notes("main", "entry point").unwrap();
    project.add_todo("utils", "write tests").unwrap();

    let settings = persist::settings_path(dir.path(), loader.config());
    persist::save(&project, &settings).unwrap();
    let loaded = loader.load(&settings).unwrap();

    let tuples = |p: &Project| {
        let mut all: Vec<_> = p
            .files()
            .iter()
            .map(|f| (f.file_name.clone(), f.notes.clone(), f.to_dos.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    };
    assert_eq!(tuples(&loaded.project), tuples(&project));

    let utils = loaded.project.file_by_name("utils").unwrap();
    assert_eq!(
        names(&loaded.project, &loaded.project.file(utils).unwrap().imported_by),
        vec!["main"]
    );
}

// ============================================================================
// Output
// ============================================================================

#[test]
fn test_report_and_diagrams_for_fixture() {
    let loaded = create_loader().open(&fixtures_path("shop")).unwrap();
    let levels = assign_import_levels(&loaded.project, LevelStrategy::BreadthFirst).unwrap();

    let text = ProjectReport::new(&loaded.project, &levels, &loaded.warnings).to_text();
    assert!(text.contains("Head files: main, report"));
    assert!(text.contains("external: numpy"));

    let mermaid = DiagramGenerator::new().generate_mermaid(&loaded.project, &levels);
    assert!(mermaid.contains("pricing_4[\"pricing (level 2)\"]"));
    assert!(mermaid.contains("report_5 --> cart_1"));
}

// ============================================================================
// Command line
// ============================================================================

#[test]
fn test_cli_version() {
    pypeline()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("pypeline "));
}

#[test]
fn test_cli_open_text() {
    pypeline()
        .arg("open")
        .arg(fixtures_path("shop"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Level 2\n  pricing"));
}

#[test]
fn test_cli_open_mermaid() {
    pypeline()
        .args(["open", "--format", "mermaid"])
        .arg(fixtures_path("shop"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("graph LR"))
        .stdout(predicate::str::contains("main_3 --> cart_1"));
}

#[test]
fn test_cli_open_json() {
    let output = pypeline()
        .args(["open", "--format", "json"])
        .arg(fixtures_path("shop"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["max_level"], 2);
    assert_eq!(value["head_files"][1], "report");
}

#[test]
fn test_cli_rejects_unknown_format_and_strategy() {
    pypeline()
        .args(["open", "--format", "svg"])
        .arg(fixtures_path("shop"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown output format 'svg'"));

    pypeline()
        .args(["open", "--strategy", "dfs"])
        .arg(fixtures_path("shop"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown level strategy 'dfs'"));
}

#[test]
fn test_cli_open_missing_path() {
    pypeline()
        .args(["open", "/definitely/not/here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn test_cli_save_annotate_load() {
    let dir = TempDir::new().unwrap();
    write_project(
        dir.path(),
        &[("main.py", "import utils\n"), ("utils.py", "")],
    );
    let settings = dir.path().join("pypeline.json");

    pypeline()
        .arg("save")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 3 files"));
    assert!(settings.exists());

    pypeline()
        .arg("annotate")
        .arg(&settings)
        .args(["utils", "--notes", "helpers", "--todo", "split", "--todo", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[ ] 1: docs"));

    pypeline()
        .arg("annotate")
        .arg(&settings)
        .args(["utils", "--done", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] 0: split"));

    // Saving again keeps the annotations
    pypeline().arg("save").arg(dir.path()).assert().success();

    pypeline()
        .arg("load")
        .arg(&settings)
        .assert()
        .success()
        .stdout(predicate::str::contains("to-dos: 1 open, 1 done"));
}

#[test]
fn test_cli_load_from_another_directory() {
    let work = TempDir::new().unwrap();
    let proj = work.path().join("proj");
    fs::create_dir(&proj).unwrap();
    write_project(&proj, &[("main.py", "import utils\n"), ("utils.py", "")]);

    pypeline()
        .current_dir(work.path())
        .args(["save", "proj"])
        .assert()
        .success();

    pypeline()
        .current_dir(&proj)
        .args(["load", "pypeline.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("imported by: main"))
        .stdout(predicate::str::contains("Head files: main\n"))
        .stdout(predicate::str::contains("Warnings").not());
}

#[test]
fn test_cli_annotate_unknown_file() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), &[("main.py", "")]);

    pypeline().arg("save").arg(dir.path()).assert().success();
    pypeline()
        .arg("annotate")
        .arg(dir.path().join("pypeline.json"))
        .args(["nope", "--notes", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No file named 'nope'"));
}
