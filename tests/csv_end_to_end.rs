use charity_select::config::toml_config::TomlConfig;
use charity_select::core::RecordSource;
use charity_select::{
    CsvRecordSource, LocalStorage, Scope, SelectError, SelectionConstraints, SelectionEngine,
    SelectionRunner,
};
use std::fmt::Write as _;
use tempfile::TempDir;

fn write_candidates(dir: &TempDir, national: usize, regional_animals: usize, regional_other: usize) {
    let mut csv = String::from("id,name,region,category,scope\n");
    for i in 0..national {
        writeln!(csv, "nat-{i},National {i},,HEALTH,national").unwrap();
    }
    for i in 0..regional_animals {
        writeln!(csv, "pet-{i},Animal Rescue {i},Leeds,ANIMAL,regional").unwrap();
    }
    for i in 0..regional_other {
        writeln!(csv, "reg-{i},Local Arts {i},Leeds,ARTS,REGIONAL").unwrap();
    }
    writeln!(csv, "far-1,Far Away,York,ANIMAL,regional").unwrap();
    writeln!(csv, "draft-1,Draft Listing,Leeds,ANIMAL,").unwrap();
    std::fs::write(dir.path().join("charities.csv"), csv).unwrap();
}

fn write_profile(dir: &TempDir, has_pets: &str) {
    let csv = format!(
        "id,name,region,hasPets,hasChildren,isMarried,age\nuser-7,Robin,Leeds,{has_pets},no,yes,41\n"
    );
    std::fs::write(dir.path().join("profile.csv"), csv).unwrap();
}

fn runner(dir: &TempDir, constraints: SelectionConstraints) -> SelectionRunner<CsvRecordSource<LocalStorage>> {
    let storage = LocalStorage::new(dir.path().to_str().unwrap());
    let source = CsvRecordSource::new(storage, "charities.csv", "profile.csv");
    SelectionRunner::new(source, SelectionEngine::new(constraints).unwrap())
}

#[tokio::test]
async fn test_end_to_end_pet_owner_selection() {
    let dir = TempDir::new().unwrap();
    write_candidates(&dir, 9, 4, 17);
    write_profile(&dir, "true");

    let result = runner(&dir, SelectionConstraints::default()).run().await.unwrap();

    assert_eq!(result.len(), 12);
    assert!(result.count_category("ANIMAL") >= 4);
    assert!(result.count_scope(Scope::Regional) <= 5);
    assert!(!result.ids().contains(&"far-1"));
    assert!(!result.ids().contains(&"draft-1"));
    assert_eq!(result.summary.user_id, "user-7");
    assert_eq!(result.summary.regional_pool, 21);
    assert_eq!(result.summary.national_pool, 9);

    // Output lines are plain JSON objects.
    let lines = result.json_lines().unwrap();
    assert_eq!(lines.len(), 12);
    let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(value["id"], result.items[0].id.as_str());
    assert!(value["scope"] == "NATIONAL" || value["scope"] == "REGIONAL");
}

#[tokio::test]
async fn test_end_to_end_insufficient_supply() {
    let dir = TempDir::new().unwrap();
    write_candidates(&dir, 5, 2, 2);
    write_profile(&dir, "false");

    let err = runner(&dir, SelectionConstraints::default())
        .run()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SelectError::InsufficientSupply {
            required: 12,
            available: 9,
            ..
        }
    ));
}

#[tokio::test]
async fn test_end_to_end_missing_profile() {
    let dir = TempDir::new().unwrap();
    write_candidates(&dir, 12, 0, 0);

    let err = runner(&dir, SelectionConstraints::default())
        .run()
        .await
        .unwrap_err();
    match err {
        SelectError::SourceError { path, reason } => {
            assert!(path.ends_with("profile.csv"));
            assert_eq!(reason, "not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_end_to_end_with_configured_rule() {
    let dir = TempDir::new().unwrap();
    let mut csv = String::from("id,name,region,category,scope\n");
    for i in 0..10 {
        writeln!(csv, "nat-{i},National {i},,HEALTH,national").unwrap();
    }
    for i in 0..3 {
        writeln!(csv, "kid-{i},Kids {i},Leeds,CHILDREN,regional").unwrap();
    }
    std::fs::write(dir.path().join("charities.csv"), csv).unwrap();
    std::fs::write(
        dir.path().join("profile.csv"),
        "id,name,region,hasChildren\nuser-9,Jo,Leeds,yes\n",
    )
    .unwrap();

    let config = TomlConfig::from_toml_str(
        r#"
[selection]
total_count = 8
max_regional_count = 3
pet_owner_minimum = 0

[[rules]]
name = "parents"
attribute = "hasChildren"
category = "CHILDREN"
minimum = 3
"#,
    )
    .unwrap();

    let storage = LocalStorage::new(dir.path().to_str().unwrap());
    let source = CsvRecordSource::new(storage, "charities.csv", "profile.csv");
    let profile = source.load_profile().await.unwrap();
    assert!(profile.flag("hasChildren"));

    let engine = SelectionEngine::from_config(&config).unwrap();
    let result = SelectionRunner::new(source, engine).run().await.unwrap();

    assert_eq!(result.len(), 8);
    assert_eq!(result.count_category("CHILDREN"), 3);
    assert_eq!(result.summary.rules.len(), 1);
    assert_eq!(result.summary.rules[0].rule, "parents");
}
