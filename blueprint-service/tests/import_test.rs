//! Import resolution and merging tests

mod common;

use blueprint_core::aliases::AliasMap;
use blueprint_core::error::BlueprintError;
use blueprint_service::{parse, parse_from_file, Parser};
use common::{
    assert_error_code, make_file_with_name, make_yaml_file, yaml_with_imports,
    BASIC_APPLICATION_TEMPLATE, BASIC_INTERFACE_AND_PLUGIN, BASIC_TYPE,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn test_import_supplies_interface_plugin_and_type() -> Result<(), anyhow::Error> {
    let dir = TempDir::new()?;
    let imported = format!("{BASIC_INTERFACE_AND_PLUGIN}{BASIC_TYPE}");
    let dsl = format!(
        "{BASIC_APPLICATION_TEMPLATE}{}",
        yaml_with_imports(&dir, &[&imported])
    );

    let plan = parse(&dsl)?;
    assert_eq!(plan.nodes[0].operations["install"], "test_plugin");
    Ok(())
}

#[test]
fn test_imports_spread_across_files() -> Result<(), anyhow::Error> {
    let dir = TempDir::new()?;
    let dsl = format!(
        "{BASIC_APPLICATION_TEMPLATE}{}",
        yaml_with_imports(&dir, &[BASIC_INTERFACE_AND_PLUGIN, BASIC_TYPE])
    );

    let plan = parse(&dsl)?;
    assert_eq!(plan.nodes[0].operations["terminate"], "test_plugin");
    Ok(())
}

#[test]
fn test_transitive_imports() -> Result<(), anyhow::Error> {
    let dir = TempDir::new()?;
    let inner = make_yaml_file(&dir, BASIC_INTERFACE_AND_PLUGIN);
    let middle = format!("{BASIC_TYPE}\nimports:\n    -   {}\n", inner.display());
    let dsl = format!(
        "{BASIC_APPLICATION_TEMPLATE}{}",
        yaml_with_imports(&dir, &[&middle])
    );

    let plan = parse(&dsl)?;
    assert_eq!(plan.nodes[0].operations["install"], "test_plugin");
    Ok(())
}

#[test]
fn test_merge_conflict_on_duplicate_plugin() -> Result<(), anyhow::Error> {
    let dir = TempDir::new()?;
    let dsl = format!(
        "{BASIC_APPLICATION_TEMPLATE}{BASIC_INTERFACE_AND_PLUGIN}{BASIC_TYPE}{}",
        yaml_with_imports(&dir, &[BASIC_INTERFACE_AND_PLUGIN])
    );

    let err = assert_error_code(parse(&dsl), 4);
    assert!(err.to_string().contains("test_interface1") || err.to_string().contains("test_plugin"));
    Ok(())
}

#[test]
fn test_non_mergeable_top_level_key() -> Result<(), anyhow::Error> {
    let dir = TempDir::new()?;
    let dsl = format!(
        "{BASIC_APPLICATION_TEMPLATE}\ntypes:\n    test_type: {{}}\n{}",
        yaml_with_imports(&dir, &[BASIC_APPLICATION_TEMPLATE])
    );

    let err = assert_error_code(parse(&dsl), 3);
    match err {
        BlueprintError::NonMergeableKey { key } => assert_eq!(key, "application_template"),
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn test_circular_imports() -> Result<(), anyhow::Error> {
    let dir = TempDir::new()?;
    let x_path = dir.path().join("x.yaml");
    let y_path = dir.path().join("y.yaml");

    make_file_with_name(
        &dir,
        "x.yaml",
        &format!(
            "{BASIC_APPLICATION_TEMPLATE}\ntypes:\n    test_type: {{}}\nimports:\n    -   {}\n",
            y_path.display()
        ),
    );
    make_file_with_name(
        &dir,
        "y.yaml",
        &format!("imports:\n    -   {}\n", x_path.display()),
    );

    let err = assert_error_code(parse_from_file(&x_path), 8);
    match err {
        BlueprintError::CircularImports { cycle } => {
            assert_eq!(cycle.len(), 3);
            assert_eq!(cycle.first(), cycle.last());
            assert!(cycle[0].ends_with("x.yaml"));
            assert!(cycle[1].ends_with("y.yaml"));
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn test_import_not_found_reports_searched_locations() {
    let dsl = format!(
        "{BASIC_APPLICATION_TEMPLATE}\ntypes:\n    test_type: {{}}\nimports:\n    -   nowhere.yaml\n"
    );
    let err = assert_error_code(parse(&dsl), 13);
    match err {
        BlueprintError::ImportNotFound { reference, searched } => {
            assert_eq!(reference, "nowhere.yaml");
            assert!(!searched.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_relative_import_against_importing_file() -> Result<(), anyhow::Error> {
    let dir = TempDir::new()?;
    make_file_with_name(
        &dir,
        "fragments/shared.yaml",
        &format!("{BASIC_INTERFACE_AND_PLUGIN}{BASIC_TYPE}"),
    );
    let root = make_file_with_name(
        &dir,
        "root.yaml",
        &format!("{BASIC_APPLICATION_TEMPLATE}\nimports:\n    -   fragments/shared.yaml\n"),
    );

    let plan = parse_from_file(&root)?;
    assert_eq!(plan.nodes[0].operations["install"], "test_plugin");
    Ok(())
}

#[test]
fn test_alias_mapping_applies_to_imports() -> Result<(), anyhow::Error> {
    let dir = TempDir::new()?;
    let shared = make_yaml_file(&dir, &format!("{BASIC_INTERFACE_AND_PLUGIN}{BASIC_TYPE}"));

    let mut aliases = AliasMap::new();
    aliases.insert("shared_fragment", shared.display().to_string());

    let dsl = format!("{BASIC_APPLICATION_TEMPLATE}\nimports:\n    -   shared_fragment\n");
    let plan = Parser::with_aliases(aliases).parse_str(&dsl)?;
    assert_eq!(plan.nodes[0].operations["install"], "test_plugin");
    Ok(())
}

#[test]
fn test_same_file_by_equivalent_paths_merges_once() -> Result<(), anyhow::Error> {
    let dir = TempDir::new()?;
    let shared = make_file_with_name(
        &dir,
        "shared.yaml",
        &format!("{BASIC_INTERFACE_AND_PLUGIN}{BASIC_TYPE}"),
    );
    // the same file once absolute and once relative to the root document;
    // merging it twice would conflict on every mergeable section
    let root = make_file_with_name(
        &dir,
        "root.yaml",
        &format!(
            "{BASIC_APPLICATION_TEMPLATE}\nimports:\n    -   {}\n    -   shared.yaml\n",
            shared.display()
        ),
    );

    let plan = parse_from_file(&root)?;
    assert_eq!(plan.nodes[0].operations["install"], "test_plugin");
    Ok(())
}

#[test]
fn test_diamond_imports_merge_once() -> Result<(), anyhow::Error> {
    let dir = TempDir::new()?;
    let shared = make_yaml_file(&dir, &format!("{BASIC_INTERFACE_AND_PLUGIN}{BASIC_TYPE}"));
    let left = make_yaml_file(&dir, &format!("imports:\n    -   {}\n", shared.display()));
    let right = make_yaml_file(&dir, &format!("imports:\n    -   {}\n", shared.display()));
    let dsl = format!(
        "{BASIC_APPLICATION_TEMPLATE}\nimports:\n    -   {}\n    -   {}\n",
        left.display(),
        right.display()
    );

    let plan = parse(&dsl)?;
    assert_eq!(plan.nodes[0].operations["install"], "test_plugin");
    Ok(())
}

#[test]
fn test_import_order_is_immaterial_without_conflicts() -> Result<(), anyhow::Error> {
    let dir = TempDir::new()?;
    let first = make_yaml_file(&dir, BASIC_INTERFACE_AND_PLUGIN);
    let second = make_yaml_file(&dir, BASIC_TYPE);

    let forward = format!(
        "{BASIC_APPLICATION_TEMPLATE}\nimports:\n    -   {}\n    -   {}\n",
        first.display(),
        second.display()
    );
    let backward = format!(
        "{BASIC_APPLICATION_TEMPLATE}\nimports:\n    -   {}\n    -   {}\n",
        second.display(),
        first.display()
    );

    assert_eq!(parse(&forward)?, parse(&backward)?);
    Ok(())
}

#[test]
fn test_improper_imports_section_in_imported_file() -> Result<(), anyhow::Error> {
    let dir = TempDir::new()?;
    let broken = make_yaml_file(&dir, "imports:\n    nested: mapping\n");
    let dsl = format!(
        "{BASIC_APPLICATION_TEMPLATE}\ntypes:\n    test_type: {{}}\nimports:\n    -   {}\n",
        broken.display()
    );

    assert_error_code(parse(&dsl), 2);
    Ok(())
}

#[test]
fn test_improper_imports_section_in_root() {
    let dsl = format!("{BASIC_APPLICATION_TEMPLATE}\nimports: not_a_sequence\n");
    assert_error_code(parse(&dsl), 2);
}

#[test]
fn test_empty_imported_file() -> Result<(), anyhow::Error> {
    let dir = TempDir::new()?;
    let empty = make_yaml_file(&dir, "# intentionally empty\n");
    let dsl = format!(
        "{BASIC_APPLICATION_TEMPLATE}\ntypes:\n    test_type: {{}}\nimports:\n    -   {}\n",
        empty.display()
    );

    assert_error_code(parse(&dsl), 0);
    Ok(())
}

#[test]
fn test_parse_from_file_without_imports() -> Result<(), anyhow::Error> {
    let dir = TempDir::new()?;
    let root = make_yaml_file(
        &dir,
        &format!("{BASIC_APPLICATION_TEMPLATE}{BASIC_INTERFACE_AND_PLUGIN}{BASIC_TYPE}"),
    );

    let plan = parse_from_file(&root)?;
    assert_eq!(plan.nodes[0].id, "testApp.testNode");
    Ok(())
}

#[test]
fn test_missing_root_file() {
    assert_error_code(parse_from_file("/nonexistent/blueprint.yaml"), 13);
}
