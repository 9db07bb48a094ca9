use std::fs;
use std::path::Path;

use harvest_map::{MappingError, MappingExt, MappingRepository, MappingSchema};
use harvest_model::EntityKind;
use tempfile::TempDir;

const ACTIVITY: &str = r#"
title:
  - fieldInPrimarySource: Projekttitel
    mappingRules:
      - rule: Use value as-is.
theme:
  - fieldInPrimarySource: Abteilung
    mappingRules:
      - forValues: ["Abt. 1"]
        setValues: ["theme/infectious-diseases"]
      - setValues: ["theme/public-health"]
"#;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write mapping file");
}

fn repo_with_files() -> (TempDir, MappingRepository) {
    let dir = TempDir::new().expect("create temp dir");
    write(dir.path(), "activity.yaml", ACTIVITY);
    write(dir.path(), "resource_disease.yml", "disease:\n");
    write(dir.path(), "notes.txt", "not a mapping");
    let repo = MappingRepository::new(dir.path());
    (dir, repo)
}

#[test]
fn lists_yaml_files_sorted_by_name() {
    let (_dir, repo) = repo_with_files();
    let names: Vec<String> = repo
        .list()
        .expect("list mappings")
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    assert_eq!(names, vec!["activity", "resource_disease"]);
}

#[test]
fn loads_mapping_against_kind_schema() {
    let (_dir, repo) = repo_with_files();
    let schema = MappingSchema::for_kind(EntityKind::Activity).require(["theme"]);
    let mapping = repo.load("activity", &schema).expect("load activity");

    let themes = mapping.resolve_concepts("theme", "Abt. 1");
    assert_eq!(themes[0].as_str(), "theme/infectious-diseases");
    let fallback = mapping.resolve_concepts("theme", "Abt. 9");
    assert_eq!(fallback[0].as_str(), "theme/public-health");
    assert!(mapping.defaults("title").is_empty());
}

#[test]
fn exists_checks_both_extensions() {
    let (_dir, repo) = repo_with_files();
    assert!(repo.exists("activity"));
    assert!(repo.exists("resource_disease"));
    assert!(!repo.exists("notes"));
}

#[test]
fn missing_file_is_an_io_error() {
    let (dir, repo) = repo_with_files();
    let error = repo
        .load("organization", &MappingSchema::open("organization"))
        .expect_err("file is absent");
    assert!(matches!(error, MappingError::Io { .. }));
    assert_eq!(error.path(), dir.path().join("organization.yaml"));

    let optional = repo
        .load_optional("organization", &MappingSchema::open("organization"))
        .expect("optional load");
    assert!(optional.is_none());
}

#[test]
fn load_all_uses_open_schemas() {
    let (_dir, repo) = repo_with_files();
    let all = repo.load_all().expect("load all");
    assert_eq!(all.len(), 2);
    assert_eq!(all["activity"].rule_count(), 3);
    assert!(all["resource_disease"].contains("disease"));
}

#[test]
fn broken_file_fails_load_all_with_its_path() {
    let (dir, repo) = repo_with_files();
    write(dir.path(), "broken.yaml", "title: [unclosed");
    let error = repo.load_all().expect_err("broken yaml");
    assert!(matches!(error, MappingError::Parse { .. }));
    assert_eq!(error.path(), dir.path().join("broken.yaml"));
}
