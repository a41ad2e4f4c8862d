//! Per-node plugin wiring and overlay merging
//!
//! Each topology node is resolved against its completed type: plugins are
//! wired to the type's interfaces (explicitly bound plugins are checked
//! for existence and interface conformance, implicit declarations are
//! autowired to the unique implementing plugin), operations are bound
//! under both qualified and unqualified names, and the node's property,
//! workflow and policy overrides are overlaid on the type's defaults.

use blueprint_core::aliases::AliasMap;
use blueprint_core::error::{BlueprintError, Result};
use blueprint_core::types::{
    Document, InterfaceRef, NodeDecl, NodePolicy, Plugin, ProcessedNode, ResolvedPolicyEvent,
    Value,
};
use indexmap::IndexMap;
use tracing::trace;

use super::{bodies, first_duplicate, overlay, type_resolver};

/// Reject topologies that declare the same node name twice
///
/// # Errors
///
/// Returns a `BlueprintError` naming the duplicated node.
pub fn validate_no_duplicate_nodes(topology: &[NodeDecl]) -> Result<()> {
    if let Some((name, count)) = first_duplicate(topology.iter().map(|node| node.name.as_str())) {
        return Err(BlueprintError::DuplicateNode { name, count });
    }
    Ok(())
}

/// Resolve one topology node into its processed form
///
/// # Errors
///
/// Returns a `BlueprintError` on unknown or cyclic types, plugin wiring
/// failures, unresolvable workflow bodies, or unsatisfied policy
/// references.
pub fn process_node(
    node: &NodeDecl,
    document: &Document,
    policies_events: &IndexMap<String, ResolvedPolicyEvent>,
    rules: &IndexMap<String, Value>,
    aliases: &AliasMap,
) -> Result<ProcessedNode> {
    let type_name = &node.node_type;
    let id = format!("{}.{}", document.application_template.name, node.name);

    let Some(type_decl) = document.types.get(type_name) else {
        return Err(BlueprintError::UnknownNodeType {
            type_name: type_name.clone(),
            existing: document.types.keys().cloned().collect(),
        });
    };
    let completed = type_resolver::complete_type(&document.types, type_name, type_decl)?;

    let mut plugins: IndexMap<String, Plugin> = IndexMap::new();
    let mut operations: IndexMap<String, Option<String>> = IndexMap::new();

    if !completed.interfaces.is_empty() {
        let Some(declared_plugins) = document.plugins.as_ref() else {
            return Err(BlueprintError::MissingPluginsSection);
        };
        if let Some((interface, _)) =
            first_duplicate(completed.interfaces.iter().map(InterfaceRef::name))
        {
            return Err(BlueprintError::DuplicateInterface {
                node: node.name.clone(),
                interface,
            });
        }

        for element in &completed.interfaces {
            let (interface_name, plugin_name) =
                if let Some((interface_name, plugin_name)) = element.binding() {
                    // explicit declaration
                    let Some(plugin) = declared_plugins.get(plugin_name) else {
                        return Err(BlueprintError::UndeclaredPlugin {
                            plugin: plugin_name.to_string(),
                            interface: interface_name.to_string(),
                            type_name: type_name.clone(),
                        });
                    };
                    if plugin.properties.interface != interface_name {
                        return Err(BlueprintError::PluginInterfaceMismatch {
                            type_name: type_name.clone(),
                            plugin: plugin_name.to_string(),
                            interface: interface_name.to_string(),
                        });
                    }
                    (interface_name.to_string(), plugin_name.to_string())
                } else {
                    // implicit declaration: autowire the unique implementor
                    let interface_name = element.name().to_string();
                    let plugin_name = autowire(declared_plugins, &interface_name, type_name)?;
                    trace!(interface = %interface_name, plugin = %plugin_name, "autowired");
                    (interface_name, plugin_name)
                };

            let Some(interface) = document.interfaces.get(&interface_name) else {
                return Err(BlueprintError::UndefinedInterface {
                    interface: interface_name,
                });
            };
            if let Some(plugin) = declared_plugins.get(&plugin_name) {
                plugins.insert(plugin_name.clone(), plugin.clone());
            }

            for operation in &interface.operations {
                if operations.contains_key(operation) {
                    // same bare name exposed twice: only qualified bindings survive
                    operations.insert(operation.clone(), None);
                } else {
                    operations.insert(operation.clone(), Some(plugin_name.clone()));
                }
                operations.insert(
                    format!("{interface_name}.{operation}"),
                    Some(plugin_name.clone()),
                );
            }
        }
    }

    let operations: IndexMap<String, String> = operations
        .into_iter()
        .filter_map(|(operation, plugin)| plugin.map(|plugin| (operation, plugin)))
        .collect();

    let properties = overlay(&completed.properties, &node.properties);
    let workflows =
        bodies::resolve_workflows(&overlay(&completed.workflows, &node.workflows), aliases)?;
    let policies = overlay(&completed.policies, &node.policies);
    validate_node_policies(&policies, &node.name, policies_events, rules)?;

    Ok(ProcessedNode {
        id,
        node_type: type_name.clone(),
        plugins,
        operations,
        properties,
        workflows,
        policies,
    })
}

/// Find the unique plugin implementing an interface
fn autowire(
    plugins: &IndexMap<String, Plugin>,
    interface_name: &str,
    type_name: &str,
) -> Result<String> {
    let mut matches: Vec<String> = plugins
        .iter()
        .filter(|(_, plugin)| plugin.properties.interface == interface_name)
        .map(|(name, _)| name.clone())
        .collect();

    if matches.is_empty() {
        return Err(BlueprintError::NoMatchingPlugin {
            interface: interface_name.to_string(),
            type_name: type_name.to_string(),
        });
    }
    if matches.len() > 1 {
        return Err(BlueprintError::AmbiguousAutowiring {
            interface: interface_name.to_string(),
            type_name: type_name.to_string(),
            matches,
        });
    }
    Ok(matches.remove(0))
}

/// Check that every node policy and rule type is defined at top level
fn validate_node_policies(
    policies: &IndexMap<String, NodePolicy>,
    node_name: &str,
    policies_events: &IndexMap<String, ResolvedPolicyEvent>,
    rules: &IndexMap<String, Value>,
) -> Result<()> {
    for (policy_name, policy) in policies {
        if !policies_events.contains_key(policy_name) {
            return Err(BlueprintError::UndefinedNodePolicy {
                node: node_name.to_string(),
                policy: policy_name.clone(),
            });
        }
        for rule in &policy.rules {
            if !rules.contains_key(&rule.rule_type) {
                return Err(BlueprintError::UndefinedNodeRule {
                    node: node_name.to_string(),
                    policy: policy_name.clone(),
                    rule: rule.rule_type.clone(),
                });
            }
        }
    }
    Ok(())
}
