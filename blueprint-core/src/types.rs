//! Type definitions for blueprint documents and deployment plans

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use serde_yaml::Value;

/// A blueprint document after import combination
///
/// The import merger operates on the generic YAML tree; once the combined
/// tree has passed schema validation it is decoded into this typed form for
/// semantic resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Import references; stripped by the import merger, so the combined
    /// document always carries an empty list here
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,

    /// The application template with its topology
    pub application_template: ApplicationTemplate,

    /// Named type declarations
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub types: IndexMap<String, TypeDef>,

    /// Named plugin declarations; presence of the section matters, since a
    /// type with interfaces demands it even when autowiring later fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<IndexMap<String, Plugin>>,

    /// Named interface declarations
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub interfaces: IndexMap<String, InterfaceDef>,

    /// Top-level workflows
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub workflows: IndexMap<String, WorkflowBody>,

    /// Top-level policy events and rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policies: Option<PoliciesSection>,
}

/// The application template: a name and an ordered topology
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApplicationTemplate {
    /// Application name; prefixes every node id in the plan
    pub name: String,

    /// Ordered node declarations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topology: Vec<NodeDecl>,
}

/// A single node declaration within a topology
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeDecl {
    /// Node name, unique within the topology
    pub name: String,

    /// Name of the type this node instantiates
    #[serde(rename = "type")]
    pub node_type: String,

    /// Property overrides applied over the resolved type's properties
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Value>,

    /// Workflow overrides applied over the resolved type's workflows
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub workflows: IndexMap<String, WorkflowBody>,

    /// Policy overrides applied over the resolved type's policies
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub policies: IndexMap<String, NodePolicy>,
}

/// A type declaration, possibly derived from another type
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TypeDef {
    /// Parent type in the derivation chain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<String>,

    /// Implemented interfaces, implicit (autowired) or explicitly bound
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<InterfaceRef>,

    /// Default properties
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Value>,

    /// Default workflows
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub workflows: IndexMap<String, WorkflowBody>,

    /// Default policies
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub policies: IndexMap<String, NodePolicy>,
}

/// An interface reference on a type
///
/// The string form requests autowiring; the mapping form binds the
/// interface to a named plugin. The mapping carries exactly one entry,
/// which the DSL schema enforces structurally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InterfaceRef {
    /// Implicit declaration: the unique implementing plugin is autowired
    Implicit(String),
    /// Explicit declaration: interface name mapped to a plugin name
    Explicit(IndexMap<String, String>),
}

impl InterfaceRef {
    /// The interface name this element refers to
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Implicit(name) => name,
            Self::Explicit(binding) => {
                binding.keys().next().map(String::as_str).unwrap_or_default()
            }
        }
    }

    /// The explicit (interface, plugin) pair, if this is an explicit binding
    #[must_use]
    pub fn binding(&self) -> Option<(&str, &str)> {
        match self {
            Self::Implicit(_) => None,
            Self::Explicit(binding) => {
                binding.iter().next().map(|(k, v)| (k.as_str(), v.as_str()))
            }
        }
    }
}

/// A plugin declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Plugin {
    /// Plugin properties; `interface` and `url` are required by the schema
    pub properties: PluginProperties,
}

/// The properties of a plugin declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PluginProperties {
    /// The interface this plugin implements
    pub interface: String,

    /// Where the plugin is fetched from
    pub url: String,

    /// Any further plugin-specific properties
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// An interface declaration: the operations it exposes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InterfaceDef {
    /// Ordered operation names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<String>,
}

/// A workflow body: inline radial text or a reference to a file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WorkflowBody {
    /// The body is the content of the referenced file
    Ref {
        /// File reference, subject to alias mapping
        #[serde(rename = "ref")]
        reference: String,
    },
    /// The body appears directly in the document
    Inline {
        /// Inline workflow text
        radial: String,
    },
}

/// A policy event body: inline text or a reference to a file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PolicyBody {
    /// The body is the content of the referenced file
    Ref {
        /// File reference, subject to alias mapping
        #[serde(rename = "ref")]
        reference: String,
    },
    /// The body appears directly in the document
    Inline {
        /// Inline policy text
        policy: String,
    },
}

/// The top-level policies section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PoliciesSection {
    /// Policy event declarations
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub types: IndexMap<String, PolicyEvent>,

    /// Opaque rule bodies
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub rules: IndexMap<String, Value>,
}

/// A policy event declaration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyEvent {
    /// Human-readable message attached to the event
    pub message: String,

    /// The policy body, inline or by reference
    #[serde(flatten)]
    pub body: PolicyBody,
}

/// A per-node policy: the rules it applies
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodePolicy {
    /// Rules applied under this policy
    pub rules: Vec<RuleRef>,
}

/// A rule application within a node policy
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuleRef {
    /// Name of a rule defined under the top-level `policies.rules`
    #[serde(rename = "type")]
    pub rule_type: String,

    /// Rule-specific parameters
    #[serde(flatten)]
    pub properties: IndexMap<String, Value>,
}

/// The fully resolved deployment plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Application name
    pub name: String,

    /// Processed nodes in the original topology order
    pub nodes: Vec<ProcessedNode>,

    /// Resolved top-level workflows
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub workflows: IndexMap<String, String>,

    /// Per-node policies keyed by node id, for nodes that carry any
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub policies: IndexMap<String, IndexMap<String, NodePolicy>>,

    /// Resolved policy events from the top-level policies section
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub policies_events: IndexMap<String, ResolvedPolicyEvent>,

    /// Rule bodies from the top-level policies section
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub rules: IndexMap<String, Value>,
}

/// A policy event with its body resolved to text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedPolicyEvent {
    /// Human-readable message attached to the event
    pub message: String,

    /// Resolved policy text
    pub policy: String,
}

/// A fully processed topology node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessedNode {
    /// Node id: `"{application_name}.{node_name}"`
    pub id: String,

    /// The declared type name
    #[serde(rename = "type")]
    pub node_type: String,

    /// Plugins wired to this node, keyed by plugin name
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub plugins: IndexMap<String, Plugin>,

    /// Operation-to-plugin bindings, qualified and unqualified
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub operations: IndexMap<String, String>,

    /// Merged properties (type defaults overlaid by node overrides)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Value>,

    /// Merged and resolved workflows
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub workflows: IndexMap<String, String>,

    /// Merged per-node policies
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub policies: IndexMap<String, NodePolicy>,
}
