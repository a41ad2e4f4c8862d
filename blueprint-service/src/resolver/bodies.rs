//! Workflow and policy body resolution
//!
//! Bodies appear inline (`radial` for workflows, `policy` for policy
//! events) or as `{ref: path}`; a ref is alias-mapped and resolved to the
//! referenced file's text content.

use blueprint_core::aliases::AliasMap;
use blueprint_core::error::{BlueprintError, Result};
use blueprint_core::types::{
    PoliciesSection, PolicyBody, ResolvedPolicyEvent, Value, WorkflowBody,
};
use indexmap::IndexMap;
use std::fs;

/// Resolve a workflow body to its final text
///
/// # Errors
///
/// Returns a `BlueprintError` if a ref file cannot be read.
pub fn resolve_workflow(body: &WorkflowBody, aliases: &AliasMap) -> Result<String> {
    match body {
        WorkflowBody::Inline { radial } => Ok(radial.clone()),
        WorkflowBody::Ref { reference } => read_ref(reference, aliases),
    }
}

/// Resolve a policy body to its final text
///
/// # Errors
///
/// Returns a `BlueprintError` if a ref file cannot be read.
pub fn resolve_policy(body: &PolicyBody, aliases: &AliasMap) -> Result<String> {
    match body {
        PolicyBody::Inline { policy } => Ok(policy.clone()),
        PolicyBody::Ref { reference } => read_ref(reference, aliases),
    }
}

/// Resolve every workflow in a map to its final text
///
/// # Errors
///
/// Returns a `BlueprintError` if any ref file cannot be read.
pub fn resolve_workflows(
    workflows: &IndexMap<String, WorkflowBody>,
    aliases: &AliasMap,
) -> Result<IndexMap<String, String>> {
    workflows
        .iter()
        .map(|(name, body)| Ok((name.clone(), resolve_workflow(body, aliases)?)))
        .collect()
}

/// Split the top-level policies section into resolved events and rules
///
/// # Errors
///
/// Returns a `BlueprintError` if any policy ref file cannot be read.
pub fn process_policies(
    section: Option<&PoliciesSection>,
    aliases: &AliasMap,
) -> Result<(IndexMap<String, ResolvedPolicyEvent>, IndexMap<String, Value>)> {
    let Some(section) = section else {
        return Ok((IndexMap::new(), IndexMap::new()));
    };
    let mut events = IndexMap::new();
    for (name, event) in &section.types {
        events.insert(
            name.clone(),
            ResolvedPolicyEvent {
                message: event.message.clone(),
                policy: resolve_policy(&event.body, aliases)?,
            },
        );
    }
    Ok((events, section.rules.clone()))
}

fn read_ref(reference: &str, aliases: &AliasMap) -> Result<String> {
    let path = aliases.resolve(reference);
    fs::read_to_string(path).map_err(|_| BlueprintError::RefOpenFailed {
        path: path.to_string(),
    })
}
