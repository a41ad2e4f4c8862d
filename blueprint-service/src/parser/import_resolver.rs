//! Import resolution for blueprint documents
//!
//! Builds the ordered closure of a document's transitive imports with
//! cycle detection on the active traversal path, then folds the parsed
//! trees into the combined document under per-section merge policies:
//! `interfaces`, `plugins` and `workflows` merge one level deep with no
//! overrides, `policies` merges one nested level deeper, and any other
//! already-present top-level key is a conflict. Each imported file is read
//! once; the merge pass reuses the trees collected during traversal.

use blueprint_core::aliases::AliasMap;
use blueprint_core::error::{BlueprintError, Result};
use indexmap::IndexSet;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::{schema_validator, tree};
use crate::cycle::VisitPath;

const IMPORTS: &str = "imports";

/// Import resolver for blueprint documents
pub struct ImportResolver<'a> {
    aliases: &'a AliasMap,
}

impl<'a> ImportResolver<'a> {
    /// Create a resolver using the given alias map
    #[must_use]
    pub fn new(aliases: &'a AliasMap) -> Self {
        Self { aliases }
    }

    /// Combine a document with its transitive imports
    ///
    /// The root tree is the merge base; every import in the closure is
    /// folded onto it in traversal order (each file before its own
    /// imports). The `imports` key is stripped from the result.
    ///
    /// # Errors
    ///
    /// Returns a `BlueprintError` on unlocatable or unreadable imports,
    /// circular imports, malformed imports sections, merge conflicts, and
    /// non-mergeable top-level keys.
    pub fn combine(&self, root: Value, root_path: Option<&Path>) -> Result<Value> {
        let mut combined = into_mapping(root, "document root")?;
        let imports_key = Value::from(IMPORTS);
        let Some(root_imports) = combined.get(&imports_key) else {
            return Ok(Value::Mapping(combined));
        };
        let root_label = root_path.map_or_else(|| "<string>".to_string(), |p| p.display().to_string());
        schema_validator::validate_imports(root_imports, &root_label)?;

        let mut walk = ImportWalk {
            aliases: self.aliases,
            seen: IndexSet::new(),
            active: VisitPath::new(),
            ordered: Vec::new(),
        };

        // The root participates in dedup and cycle detection when its path
        // is known, but is never folded onto itself. The caller has already
        // alias-mapped the root path.
        if let Some(path) = root_path {
            let canonical = canonical_or_self(path);
            walk.active.enter(canonical.display().to_string());
            walk.seen.insert(canonical);
        }

        walk.expand(&combined, root_path)?;
        debug!(imports = walk.ordered.len(), "collected import closure");

        for (path, imported) in walk.ordered {
            trace!(import = %path.display(), "merging import");
            merge_document(&mut combined, imported)?;
        }

        combined.remove(&imports_key);
        Ok(Value::Mapping(combined))
    }
}

/// One depth-first traversal of the import graph
struct ImportWalk<'a> {
    aliases: &'a AliasMap,
    /// Canonical paths already queued for merging (dedup set)
    seen: IndexSet<PathBuf>,
    /// Paths currently being expanded, for cycle detection
    active: VisitPath,
    /// Parsed trees in traversal order, each file before its own imports
    ordered: Vec<(PathBuf, Mapping)>,
}

impl ImportWalk<'_> {
    fn expand(&mut self, doc: &Mapping, current_path: Option<&Path>) -> Result<()> {
        let Some(imports) = doc.get(&Value::from(IMPORTS)) else {
            return Ok(());
        };
        let references: Vec<String> = serde_yaml::from_value(imports.clone()).map_err(|e| {
            BlueprintError::schema_violation(format!("imports section does not decode: {e}"), "")
        })?;

        for reference in references {
            let aliased = self.aliases.resolve(&reference);
            let located = locate(aliased, current_path)?;
            let canonical = canonical_or_self(&located);

            if self.seen.contains(&canonical) {
                let label = canonical.display().to_string();
                if self.active.contains(&label) {
                    return Err(BlueprintError::CircularImports {
                        cycle: self.active.cycle_through(&label),
                    });
                }
                // already merged through another path
                continue;
            }

            let imported = into_mapping(
                tree::read_tree(&located)?,
                &located.display().to_string(),
            )?;
            if let Some(nested) = imported.get(&Value::from(IMPORTS)) {
                schema_validator::validate_imports(nested, &located.display().to_string())?;
            }

            self.seen.insert(canonical.clone());
            self.ordered.push((canonical.clone(), imported.clone()));

            self.active.enter(canonical.display().to_string());
            self.expand(&imported, Some(&located))?;
            self.active.leave();
        }
        Ok(())
    }
}

/// Locate an import reference on disk
///
/// The reference is tried verbatim first, then relative to the directory
/// of the importing file.
fn locate(reference: &str, current_path: Option<&Path>) -> Result<PathBuf> {
    let candidate = PathBuf::from(reference);
    if candidate.exists() {
        return Ok(candidate);
    }
    let mut searched = vec![candidate];
    if let Some(current) = current_path {
        if let Some(dir) = current.parent() {
            let relative = dir.join(reference);
            if relative.exists() {
                return Ok(relative);
            }
            searched.push(relative);
        }
    }
    Err(BlueprintError::ImportNotFound {
        reference: reference.to_string(),
        searched,
    })
}

fn canonical_or_self(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn into_mapping(value: Value, context: &str) -> Result<Mapping> {
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(BlueprintError::schema_violation(
            format!("{context} must be a mapping"),
            "",
        )),
    }
}

/// Fold one imported document into the combined document
fn merge_document(combined: &mut Mapping, imported: Mapping) -> Result<()> {
    for (key, value) in imported {
        let Some(name) = key.as_str().map(str::to_string) else {
            return Err(BlueprintError::schema_violation(
                "top-level keys must be strings",
                "",
            ));
        };
        if name == IMPORTS {
            continue;
        }
        if !combined.contains_key(&key) {
            combined.insert(key, value);
            continue;
        }
        match name.as_str() {
            "interfaces" | "plugins" | "workflows" => {
                let target = combined
                    .get_mut(&key)
                    .and_then(Value::as_mapping_mut)
                    .ok_or_else(|| {
                        BlueprintError::schema_violation(format!("{name} must be a mapping"), "")
                    })?;
                let source = into_mapping(value, &name)?;
                merge_no_override(target, source, &name, &[])?;
            }
            "policies" => {
                let target = combined
                    .get_mut(&key)
                    .and_then(Value::as_mapping_mut)
                    .ok_or_else(|| {
                        BlueprintError::schema_violation("policies must be a mapping", "")
                    })?;
                let source = into_mapping(value, "policies")?;
                for (nested_key, nested_value) in source {
                    let Some(nested_name) = nested_key.as_str().map(str::to_string) else {
                        return Err(BlueprintError::schema_violation(
                            "policies keys must be strings",
                            "",
                        ));
                    };
                    if !target.contains_key(&nested_key) {
                        target.insert(nested_key, nested_value);
                        continue;
                    }
                    let nested_target = target
                        .get_mut(&nested_key)
                        .and_then(Value::as_mapping_mut)
                        .ok_or_else(|| {
                            BlueprintError::schema_violation(
                                format!("policies {nested_name} must be a mapping"),
                                "",
                            )
                        })?;
                    let nested_source =
                        into_mapping(nested_value, &format!("policies {nested_name}"))?;
                    merge_no_override(nested_target, nested_source, "policies", &[nested_name])?;
                }
            }
            _ => return Err(BlueprintError::NonMergeableKey { key: name }),
        }
    }
    Ok(())
}

/// Merge one level of mapping entries, failing on any duplicate key
fn merge_no_override(
    target: &mut Mapping,
    source: Mapping,
    section: &str,
    path: &[String],
) -> Result<()> {
    for (key, value) in source {
        if target.contains_key(&key) {
            let mut conflict = path.to_vec();
            conflict.push(key.as_str().unwrap_or_default().to_string());
            return Err(BlueprintError::merge_conflict(section, conflict));
        }
        target.insert(key, value);
    }
    Ok(())
}
