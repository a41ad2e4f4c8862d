//! Structural schema validation
//!
//! Two schemas are consulted: the full DSL schema, applied once to the
//! fully combined document, and the narrower imports schema, applied to
//! each file's `imports` section before its children are traversed.
//! Violations carry the engine's message and a dotted path to the
//! offending element.

use blueprint_core::error::{BlueprintError, Result};
use once_cell::sync::Lazy;
use serde_json::json;

/// Schema for a single file's `imports` section
static IMPORTS_SCHEMA: Lazy<serde_json::Value> = Lazy::new(|| {
    json!({
        "type": "array",
        "items": { "type": "string" }
    })
});

/// Schema for the fully combined document
static DSL_SCHEMA: Lazy<serde_json::Value> = Lazy::new(build_dsl_schema);

fn workflows_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "additionalProperties": {
            "type": "object",
            "oneOf": [
                { "required": ["radial"] },
                { "required": ["ref"] }
            ],
            "properties": {
                "radial": { "type": "string" },
                "ref": { "type": "string" }
            }
        }
    })
}

fn node_policies_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "additionalProperties": {
            "type": "object",
            "required": ["rules"],
            "properties": {
                "rules": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["type"],
                        "properties": {
                            "type": { "type": "string" }
                        }
                    }
                }
            }
        }
    })
}

fn build_dsl_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "required": ["application_template"],
        "properties": {
            "imports": IMPORTS_SCHEMA.clone(),
            "application_template": {
                "type": "object",
                "required": ["name", "topology"],
                "properties": {
                    "name": { "type": "string" },
                    "topology": {
                        "type": "array",
                        "minItems": 1,
                        "items": {
                            "type": "object",
                            "required": ["name", "type"],
                            "properties": {
                                "name": { "type": "string" },
                                "type": { "type": "string" },
                                "properties": { "type": "object" },
                                "workflows": workflows_schema(),
                                "policies": node_policies_schema()
                            }
                        }
                    }
                }
            },
            "types": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "properties": {
                        "derived_from": { "type": "string" },
                        "interfaces": {
                            "type": "array",
                            "items": {
                                "oneOf": [
                                    { "type": "string" },
                                    {
                                        "type": "object",
                                        "minProperties": 1,
                                        "maxProperties": 1,
                                        "additionalProperties": { "type": "string" }
                                    }
                                ]
                            }
                        },
                        "properties": { "type": "object" },
                        "workflows": workflows_schema(),
                        "policies": node_policies_schema()
                    }
                }
            },
            "plugins": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "required": ["properties"],
                    "properties": {
                        "properties": {
                            "type": "object",
                            "required": ["interface", "url"],
                            "properties": {
                                "interface": { "type": "string" },
                                "url": { "type": "string" }
                            }
                        }
                    }
                }
            },
            "interfaces": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "required": ["operations"],
                    "properties": {
                        "operations": {
                            "type": "array",
                            "items": { "type": "string" }
                        }
                    }
                }
            },
            "workflows": workflows_schema(),
            "policies": {
                "type": "object",
                "properties": {
                    "types": {
                        "type": "object",
                        "additionalProperties": {
                            "type": "object",
                            "required": ["message"],
                            "oneOf": [
                                { "required": ["policy"] },
                                { "required": ["ref"] }
                            ],
                            "properties": {
                                "message": { "type": "string" },
                                "policy": { "type": "string" },
                                "ref": { "type": "string" }
                            }
                        }
                    },
                    "rules": { "type": "object" }
                }
            }
        }
    })
}

/// Validate the combined document against the DSL schema
///
/// # Errors
///
/// Returns a `BlueprintError` with the engine's message and the dotted
/// path to the offending element when the document does not conform.
pub fn validate_document(tree: &serde_yaml::Value) -> Result<()> {
    let instance = to_json(tree)?;
    let validator = compile(&DSL_SCHEMA)?;
    if let Err(error) = validator.validate(&instance) {
        let path = dotted_path(&error.instance_path.to_string());
        return Err(BlueprintError::schema_violation(error.to_string(), path));
    }
    Ok(())
}

/// Validate one file's `imports` section against the imports schema
///
/// # Errors
///
/// Returns a `BlueprintError` naming the file when its imports section
/// does not conform.
pub fn validate_imports(imports: &serde_yaml::Value, file: &str) -> Result<()> {
    let instance = to_json(imports)?;
    let validator = compile(&IMPORTS_SCHEMA)?;
    if let Err(error) = validator.validate(&instance) {
        return Err(BlueprintError::InvalidImportsSection {
            file: file.to_string(),
            message: error.to_string(),
            path: dotted_path(&error.instance_path.to_string()),
        });
    }
    Ok(())
}

fn compile(schema: &serde_json::Value) -> Result<jsonschema::Validator> {
    jsonschema::validator_for(schema)
        .map_err(|e| BlueprintError::schema_violation(format!("schema did not compile: {e}"), ""))
}

fn to_json(tree: &serde_yaml::Value) -> Result<serde_json::Value> {
    serde_json::to_value(tree)
        .map_err(|e| BlueprintError::schema_violation(format!("document is not schema-checkable: {e}"), ""))
}

/// Convert a JSON-pointer instance path into the dotted form used in
/// diagnostics: `/application_template/topology/0` becomes
/// `application_template.topology.0`.
fn dotted_path(pointer: &str) -> String {
    pointer.trim_start_matches('/').replace('/', ".")
}
