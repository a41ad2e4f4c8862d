//! Shared fixtures and helpers for blueprint integration tests

// Not every test binary exercises every helper.
#![allow(dead_code)]

use blueprint_core::error::{BlueprintError, Result};
use blueprint_core::types::Plan;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

pub const BASIC_APPLICATION_TEMPLATE: &str = r#"
application_template:
    name: testApp
    topology:
        -   name: testNode
            type: test_type
            properties:
                key: "val"
"#;

pub const BASIC_INTERFACE_AND_PLUGIN: &str = r#"
interfaces:
    test_interface1:
        operations:
            -   "install"
            -   "terminate"

plugins:
    test_plugin:
        properties:
            interface: "test_interface1"
            url: "http://test_url.zip"
"#;

pub const BASIC_TYPE: &str = r"
types:
    test_type:
        interfaces:
            -   test_interface1
        properties:
            install_agent: 'false'
";

/// The basic template with an empty type, no interfaces involved
pub fn minimal_application_template() -> String {
    format!("{BASIC_APPLICATION_TEMPLATE}\ntypes:\n    test_type: {{}}\n")
}

/// The full fixture: template, interface, plugin and autowired type
pub fn application_template() -> String {
    format!("{BASIC_APPLICATION_TEMPLATE}{BASIC_INTERFACE_AND_PLUGIN}{BASIC_TYPE}")
}

static FILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Write content into the directory under a fresh unique name
pub fn make_yaml_file(dir: &TempDir, content: &str) -> PathBuf {
    let index = FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
    make_file_with_name(dir, &format!("tempfile{index}.yaml"), content)
}

/// Write content into the directory under the given name
pub fn make_file_with_name(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("fixture directory should be creatable");
    }
    std::fs::write(&path, content).expect("fixture file should be writable");
    path
}

/// Write each content to its own file and return an imports section
/// referencing them all
pub fn yaml_with_imports(dir: &TempDir, contents: &[&str]) -> String {
    let mut yaml = String::from("\nimports:");
    for content in contents {
        let path = make_yaml_file(dir, content);
        yaml.push_str(&format!("\n    -   {}", path.display()));
    }
    yaml
}

/// Assert that parsing failed with the expected error code
pub fn assert_error_code(result: Result<Plan>, code: i32) -> BlueprintError {
    match result {
        Ok(plan) => panic!("expected failure with code {code}, got a plan for {}", plan.name),
        Err(err) => {
            assert_eq!(err.code(), code, "unexpected error: {err}");
            err
        }
    }
}
