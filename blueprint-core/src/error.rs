//! Error types for blueprint parsing and resolution
//!
//! Every failure of the pipeline is one variant of [`BlueprintError`]. Each
//! variant carries enough structured data (offending names, cycle paths,
//! searched locations) that a caller can build user-facing diagnostics
//! without re-parsing. The stable numeric code of each failure kind is
//! exposed through [`BlueprintError::code`]; codes below 3 denote format
//! errors (the document is syntactically or structurally malformed), the
//! rest denote logic errors (the document is well-formed but semantically
//! invalid).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for blueprint operations
#[derive(Error, Debug)]
pub enum BlueprintError {
    /// The document is not legal YAML
    #[error("failed to parse DSL: illegal yaml: {message}")]
    InvalidYaml {
        /// Error message from the YAML loader
        message: String,
        /// Location in the document if available
        location: Option<String>,
    },

    /// The document parsed to nothing
    #[error("failed to parse DSL: empty yaml")]
    EmptyDocument,

    /// The combined document does not match the DSL schema
    #[error("{message}; path to error: {path}")]
    SchemaViolation {
        /// Message from the schema engine
        message: String,
        /// Dotted path to the offending element
        path: String,
    },

    /// A file's `imports` section does not match the imports schema
    #[error("improper imports section in file {file}: {message}; path to error: {path}")]
    InvalidImportsSection {
        /// The file whose imports section is malformed
        file: String,
        /// Message from the schema engine
        message: String,
        /// Dotted path to the offending element
        path: String,
    },

    /// An imported document defines a top-level key that cannot be merged
    #[error("failed on import: non-mergeable field {key}")]
    NonMergeableKey {
        /// The offending top-level key
        key: String,
    },

    /// Two documents define the same key under a no-override section
    #[error("failed on import: could not merge {section} due to conflict on path {}", .path.join(" --> "))]
    MergeConflict {
        /// The mergeable top-level section
        section: String,
        /// Key path to the conflicting entry
        path: Vec<String>,
    },

    /// A type declares interfaces but the document has no plugins section
    #[error("must provide plugins section when providing interfaces section")]
    MissingPluginsSection,

    /// An explicitly bound plugin does not implement the declared interface
    #[error(
        "illegal explicit plugin declaration for type {type_name}: \
         the plugin {plugin} does not implement interface {interface}"
    )]
    PluginInterfaceMismatch {
        /// The type carrying the explicit declaration
        type_name: String,
        /// The bound plugin
        plugin: String,
        /// The declared interface
        interface: String,
    },

    /// A topology node references an undefined type
    #[error("could not locate node type: {type_name}; existing types: {}", join_or_none(.existing))]
    UnknownNodeType {
        /// The missing type name
        type_name: String,
        /// All defined type names
        existing: Vec<String>,
    },

    /// The import graph has a cycle along the active traversal path
    #[error("failed on import: circular imports detected: {}", .cycle.join(" --> "))]
    CircularImports {
        /// The traversal path, ending with the repeated import
        cycle: Vec<String>,
    },

    /// A type references an interface the document does not define
    #[error("missing interface {interface} definition")]
    UndefinedInterface {
        /// The missing interface name
        interface: String,
    },

    /// An explicitly bound plugin is not declared in the plugins section
    #[error(
        "missing definition for plugin {plugin} which is explicitly declared \
         to implement interface {interface} for type {type_name}"
    )]
    UndeclaredPlugin {
        /// The missing plugin
        plugin: String,
        /// The interface it was bound to
        interface: String,
        /// The type carrying the declaration
        type_name: String,
    },

    /// No plugin implements an implicitly declared interface
    #[error(
        "failed to find a plugin which implements interface {interface} \
         as implicitly declared for type {type_name}"
    )]
    NoMatchingPlugin {
        /// The interface with no implementation
        interface: String,
        /// The type carrying the declaration
        type_name: String,
    },

    /// More than one plugin implements an implicitly declared interface
    #[error(
        "ambiguous implicit declaration for interface {interface} implementation \
         under type {type_name}: found multiple matching plugins: ({})",
        .matches.join(",")
    )]
    AmbiguousAutowiring {
        /// The interface with several implementations
        interface: String,
        /// The type carrying the declaration
        type_name: String,
        /// All matching plugin names
        matches: Vec<String>,
    },

    /// An import reference could not be located on disk
    #[error("failed on import: unable to locate import file; searched in {searched:?}")]
    ImportNotFound {
        /// The reference as written (after alias mapping)
        reference: String,
        /// Every location that was tried
        searched: Vec<PathBuf>,
    },

    /// A located import file could not be opened or read
    #[error("failed on import: unable to open file {path}: {reason}")]
    ImportOpenFailed {
        /// The file that failed to open
        path: String,
        /// The underlying I/O failure
        reason: String,
    },

    /// A `derived_from` chain references an undefined type
    #[error(
        "missing definition for type {parent} which is declared as \
         derived by type {type_name}"
    )]
    UndefinedParentType {
        /// The missing parent type
        parent: String,
        /// The type deriving from it
        type_name: String,
    },

    /// A `ref` body points to a file that cannot be read
    #[error("failed on ref: unable to open file {path}")]
    RefOpenFailed {
        /// The file that failed to open (after alias mapping)
        path: String,
    },

    /// A node policy is not defined in the top-level policies section
    #[error("failed to parse node {node}: policy {policy} not defined")]
    UndefinedNodePolicy {
        /// The node carrying the policy
        node: String,
        /// The undefined policy name
        policy: String,
    },

    /// A node policy rule type is not defined in the top-level rules section
    #[error("failed to parse node {node}: rule {rule} under policy {policy} not defined")]
    UndefinedNodeRule {
        /// The node carrying the policy
        node: String,
        /// The policy carrying the rule
        policy: String,
        /// The undefined rule type
        rule: String,
    },

    /// The type derivation graph has a cycle
    #[error(
        "failed parsing type {type_name}, circular dependency detected: {}",
        .cycle.join(" --> ")
    )]
    CircularDerivation {
        /// The type at which the cycle closed
        type_name: String,
        /// The derivation path, ending with the repeated type
        cycle: Vec<String>,
    },

    /// Two topology nodes share a name
    #[error(
        "duplicate node definition detected: there are {count} nodes \
         with name {name} defined"
    )]
    DuplicateNode {
        /// The duplicated node name
        name: String,
        /// How many nodes carry it
        count: usize,
    },

    /// A node's interface list names the same interface twice
    #[error(
        "duplicate interface definition detected on node {node}: \
         interface {interface} has duplicate definition"
    )]
    DuplicateInterface {
        /// The node carrying the duplicate
        node: String,
        /// The duplicated interface name
        interface: String,
    },
}

/// Result type alias for blueprint operations
pub type Result<T> = std::result::Result<T, BlueprintError>;

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

impl BlueprintError {
    /// The stable numeric code of this failure kind
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidYaml { .. } => -1,
            Self::EmptyDocument => 0,
            Self::SchemaViolation { .. } => 1,
            Self::InvalidImportsSection { .. } => 2,
            Self::NonMergeableKey { .. } => 3,
            Self::MergeConflict { .. } => 4,
            Self::MissingPluginsSection => 5,
            Self::PluginInterfaceMismatch { .. } => 6,
            Self::UnknownNodeType { .. } => 7,
            Self::CircularImports { .. } => 8,
            Self::UndefinedInterface { .. } => 9,
            Self::UndeclaredPlugin { .. } => 10,
            Self::NoMatchingPlugin { .. } => 11,
            Self::AmbiguousAutowiring { .. } => 12,
            Self::ImportNotFound { .. } | Self::ImportOpenFailed { .. } => 13,
            Self::UndefinedParentType { .. } => 14,
            Self::RefOpenFailed { .. } => 15,
            Self::UndefinedNodePolicy { .. } => 16,
            Self::UndefinedNodeRule { .. } => 17,
            Self::CircularDerivation { .. } => 100,
            Self::DuplicateNode { .. } => 101,
            Self::DuplicateInterface { .. } => 102,
        }
    }

    /// Whether this is a format error (malformed document) rather than a
    /// logic error (well-formed but semantically invalid document)
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidYaml { .. }
                | Self::EmptyDocument
                | Self::SchemaViolation { .. }
                | Self::InvalidImportsSection { .. }
        )
    }

    /// Create an illegal-YAML error
    #[must_use]
    pub fn invalid_yaml(message: impl Into<String>) -> Self {
        Self::InvalidYaml {
            message: message.into(),
            location: None,
        }
    }

    /// Create a schema violation error
    #[must_use]
    pub fn schema_violation(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::SchemaViolation {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a merge conflict error
    #[must_use]
    pub fn merge_conflict(section: impl Into<String>, path: Vec<String>) -> Self {
        Self::MergeConflict {
            section: section.into(),
            path,
        }
    }

    /// Create an import-open error from an I/O failure
    #[must_use]
    pub fn import_open(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::ImportOpenFailed {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for BlueprintError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::InvalidYaml {
            message: err.to_string(),
            location: err
                .location()
                .map(|l| format!("line {}, column {}", l.line(), l.column())),
        }
    }
}
