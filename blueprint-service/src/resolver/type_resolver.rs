//! Type derivation chain resolution
//!
//! A type's complete form is its own declaration merged over the complete
//! form of its `derived_from` parent: properties, workflows and policies
//! are shallow unions with the child winning per key, and interface lists
//! merge by interface name with replace-in-position-or-append semantics.

use blueprint_core::error::{BlueprintError, Result};
use blueprint_core::types::{InterfaceRef, TypeDef};
use indexmap::IndexMap;
use tracing::trace;

use super::overlay;
use crate::cycle::VisitPath;

/// Compute the complete form of a type, walking its derivation chain
///
/// # Errors
///
/// Returns a `BlueprintError` when the chain is cyclic or references an
/// undefined parent type.
pub fn complete_type(
    types: &IndexMap<String, TypeDef>,
    name: &str,
    decl: &TypeDef,
) -> Result<TypeDef> {
    let mut visited = VisitPath::new();
    visited.enter(name);
    complete_recursive(types, name, decl, &mut visited)
}

fn complete_recursive(
    types: &IndexMap<String, TypeDef>,
    name: &str,
    decl: &TypeDef,
    visited: &mut VisitPath,
) -> Result<TypeDef> {
    let mut current = decl.clone();
    let Some(parent_name) = current.derived_from.clone() else {
        return Ok(current);
    };
    if visited.contains(&parent_name) {
        return Err(BlueprintError::CircularDerivation {
            type_name: parent_name.clone(),
            cycle: visited.cycle_through(&parent_name),
        });
    }
    let parent_decl = types.get(&parent_name).ok_or_else(|| {
        BlueprintError::UndefinedParentType {
            parent: parent_name.clone(),
            type_name: name.to_string(),
        }
    })?;
    visited.enter(parent_name.clone());
    let parent = complete_recursive(types, &parent_name, parent_decl, visited)?;

    current.properties = overlay(&parent.properties, &current.properties);
    current.workflows = overlay(&parent.workflows, &current.workflows);
    current.policies = overlay(&parent.policies, &current.policies);
    current.interfaces = merge_interface_lists(&parent.interfaces, &current.interfaces);
    trace!(%name, parent = %parent_name, "merged derived type");
    Ok(current)
}

/// Merge a child's interface list over its parent's
///
/// Parent elements keep their positions; a child element replaces the
/// parent element of the same interface name, or is appended.
fn merge_interface_lists(parent: &[InterfaceRef], child: &[InterfaceRef]) -> Vec<InterfaceRef> {
    let mut merged = parent.to_vec();
    for element in child {
        if let Some(position) = merged.iter().position(|e| e.name() == element.name()) {
            merged[position] = element.clone();
        } else {
            merged.push(element.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_yaml::Value;

    fn types(yaml: &str) -> IndexMap<String, TypeDef> {
        serde_yaml::from_str(yaml).expect("fixture should parse")
    }

    #[test]
    fn test_plain_type_is_its_own_complete_form() {
        let types = types("t:\n  properties:\n    a: 1");
        let complete =
            complete_type(&types, "t", &types["t"]).expect("plain type should complete");
        assert_eq!(complete, types["t"]);
    }

    #[test]
    fn test_child_overrides_parent_properties() {
        let types = types(
            r"
parent:
  properties:
    a: 1
    b: 1
child:
  derived_from: parent
  properties:
    b: 2
    c: 3
",
        );
        let complete =
            complete_type(&types, "child", &types["child"]).expect("chain should complete");
        assert_eq!(complete.properties["a"], Value::from(1));
        assert_eq!(complete.properties["b"], Value::from(2));
        assert_eq!(complete.properties["c"], Value::from(3));
    }

    #[test]
    fn test_interfaces_replace_in_position_or_append() {
        let types = types(
            r"
parent:
  interfaces:
    - iface_a
    - iface_b
child:
  derived_from: parent
  interfaces:
    - iface_b: some_plugin
    - iface_c
",
        );
        let complete =
            complete_type(&types, "child", &types["child"]).expect("chain should complete");
        let names: Vec<&str> = complete.interfaces.iter().map(InterfaceRef::name).collect();
        assert_eq!(names, vec!["iface_a", "iface_b", "iface_c"]);
        assert_eq!(
            complete.interfaces[1].binding(),
            Some(("iface_b", "some_plugin"))
        );
    }

    #[test]
    fn test_undefined_parent() {
        let types = types("child:\n  derived_from: ghost");
        let err = complete_type(&types, "child", &types["child"])
            .expect_err("undefined parent should fail");
        assert_eq!(err.code(), 14);
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_circular_derivation_reports_full_cycle() {
        let types = types(
            r"
a:
  derived_from: b
b:
  derived_from: c
c:
  derived_from: a
",
        );
        let err =
            complete_type(&types, "a", &types["a"]).expect_err("cycle should be detected");
        assert_eq!(err.code(), 100);
        match err {
            BlueprintError::CircularDerivation { cycle, .. } => {
                assert_eq!(cycle, vec!["a", "b", "c", "a"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_derivation() {
        let types = types("t:\n  derived_from: t");
        let err = complete_type(&types, "t", &types["t"]).expect_err("self-cycle should fail");
        assert_eq!(err.code(), 100);
    }
}
