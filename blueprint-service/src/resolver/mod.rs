//! Semantic resolution of the combined document
//!
//! Once the import merger and schema validator have produced a typed
//! [`Document`], this module resolves it into a [`Plan`]: type derivation
//! chains are linearized, nodes are wired to plugins and operations, and
//! workflow and policy bodies are resolved to text.

use blueprint_core::aliases::AliasMap;
use blueprint_core::error::Result;
use blueprint_core::types::{Document, Plan};
use indexmap::IndexMap;

/// Workflow and policy body resolution
pub mod bodies;

/// Per-node plugin wiring and overlay merging
pub mod node_processor;

/// Type derivation chain resolution
pub mod type_resolver;

/// Assemble the deployment plan for a combined, validated document
///
/// # Errors
///
/// Returns a `BlueprintError` on any semantic failure: duplicate nodes,
/// unknown or cyclic types, plugin wiring failures, unresolvable bodies,
/// or unsatisfied policy references.
pub fn assemble_plan(document: &Document, aliases: &AliasMap) -> Result<Plan> {
    let topology = &document.application_template.topology;
    node_processor::validate_no_duplicate_nodes(topology)?;

    let (policies_events, rules) = bodies::process_policies(document.policies.as_ref(), aliases)?;

    let nodes = topology
        .iter()
        .map(|node| node_processor::process_node(node, document, &policies_events, &rules, aliases))
        .collect::<Result<Vec<_>>>()?;

    let workflows = bodies::resolve_workflows(&document.workflows, aliases)?;
    let policies = nodes
        .iter()
        .filter(|node| !node.policies.is_empty())
        .map(|node| (node.id.clone(), node.policies.clone()))
        .collect();

    Ok(Plan {
        name: document.application_template.name.clone(),
        nodes,
        workflows,
        policies,
        policies_events,
        rules,
    })
}

/// Shallow map union: `base` overlaid by `over`, `over` winning per key
pub(crate) fn overlay<V: Clone>(
    base: &IndexMap<String, V>,
    over: &IndexMap<String, V>,
) -> IndexMap<String, V> {
    let mut merged = base.clone();
    for (key, value) in over {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// The lexicographically smallest duplicated name, with its occurrence count
pub(crate) fn first_duplicate<'a, I>(names: I) -> Option<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for name in names {
        *counts.entry(name).or_insert(0) += 1;
    }
    let mut duplicates: Vec<(&str, usize)> =
        counts.into_iter().filter(|(_, count)| *count > 1).collect();
    duplicates.sort_by_key(|(name, _)| *name);
    duplicates
        .first()
        .map(|(name, count)| ((*name).to_string(), *count))
}
