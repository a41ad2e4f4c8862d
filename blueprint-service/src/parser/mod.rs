//! Document parsing pipeline
//!
//! Data flows strictly forward: raw text is loaded into a generic YAML
//! tree, imports are folded in, the combined tree is schema-validated and
//! decoded into the typed document model, and semantic resolution emits
//! the [`Plan`]. No stage mutates upstream state, and a single invocation
//! either returns a complete plan or fails with one
//! [`BlueprintError`](blueprint_core::BlueprintError).

use blueprint_core::aliases::AliasMap;
use blueprint_core::error::{BlueprintError, Result};
use blueprint_core::types::Plan;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::resolver;

/// Import closure construction and per-section merging
pub mod import_resolver;

/// Structural schema validation
pub mod schema_validator;

/// YAML front end
pub mod tree;

pub use import_resolver::ImportResolver;

/// Blueprint parser with an injected alias map
///
/// The default constructor re-reads the bundled alias map on every
/// invocation; [`Parser::with_aliases`] pins a caller-supplied map
/// instead.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    aliases: Option<AliasMap>,
}

impl Parser {
    /// Create a parser using the bundled default alias map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser using a caller-supplied alias map
    #[must_use]
    pub fn with_aliases(aliases: AliasMap) -> Self {
        Self {
            aliases: Some(aliases),
        }
    }

    /// Parse a blueprint document from text
    ///
    /// # Errors
    ///
    /// Returns a `BlueprintError` describing the first failure of the
    /// pipeline; no partial plan is ever returned.
    pub fn parse_str(&self, dsl: &str) -> Result<Plan> {
        self.run(dsl, None, &self.effective_aliases()?)
    }

    /// Parse a blueprint document from a file
    ///
    /// The path is alias-mapped before it is opened, and relative imports
    /// are located against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns a `BlueprintError` if the file cannot be read or the
    /// pipeline fails.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Plan> {
        let aliases = self.effective_aliases()?;
        let path = PathBuf::from(aliases.resolve(&path.as_ref().display().to_string()));
        let content = fs::read_to_string(&path)
            .map_err(|e| BlueprintError::import_open(path.display().to_string(), &e))?;
        self.run(&content, Some(&path), &aliases)
    }

    /// The bundled default map is re-read on every invocation unless a
    /// caller-supplied map is pinned.
    fn effective_aliases(&self) -> Result<AliasMap> {
        match &self.aliases {
            Some(map) => Ok(map.clone()),
            None => AliasMap::bundled(),
        }
    }

    fn run(&self, dsl: &str, path: Option<&Path>, aliases: &AliasMap) -> Result<Plan> {
        let root = tree::parse_tree(dsl)?;
        let combined = ImportResolver::new(aliases).combine(root, path)?;
        schema_validator::validate_document(&combined)?;
        let document = tree::decode_document(combined)?;
        debug!(
            application = %document.application_template.name,
            nodes = document.application_template.topology.len(),
            "combined document validated"
        );

        resolver::assemble_plan(&document, aliases)
    }
}

/// Parse a blueprint document from text with the default alias map
///
/// # Errors
///
/// Returns a `BlueprintError` describing the first failure of the
/// pipeline.
pub fn parse(dsl: &str) -> Result<Plan> {
    Parser::new().parse_str(dsl)
}

/// Parse a blueprint document from a file with the default alias map
///
/// # Errors
///
/// Returns a `BlueprintError` if the file cannot be read or the pipeline
/// fails.
pub fn parse_from_file(path: impl AsRef<Path>) -> Result<Plan> {
    Parser::new().parse_file(path)
}
