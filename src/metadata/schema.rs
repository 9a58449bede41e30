//! Declarative schema validation for metadata documents.
//!
//! The schema is an external JSON Schema file fixed by run
//! configuration, compiled once per run. Documents arrive as YAML,
//! are converted to JSON values, and every structural violation is
//! reported as a message; an empty list means the document conforms.

use std::path::Path;

use jsonschema::Validator;
use serde_json::Value;

use crate::metadata::errors::{Error, Result};

pub struct SchemaValidator {
    validator: Validator,
    schema_name: String,
}

impl SchemaValidator {
    /// Load and compile the schema at `path`. The file may be JSON or
    /// YAML; either way it must describe a valid JSON Schema.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::schema_load(path, e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let schema: Value = match ext {
            "yaml" | "yml" => {
                let yaml: serde_yaml::Value = serde_yaml::from_str(&content)
                    .map_err(|e| Error::schema_load(path, format!("invalid YAML: {e}")))?;
                yaml_to_json_value(&yaml).map_err(|e| Error::schema_load(path, e))?
            }
            _ => serde_json::from_str(&content)
                .map_err(|e| Error::schema_load(path, format!("invalid JSON: {e}")))?,
        };

        let validator = jsonschema::validator_for(&schema)
            .map_err(|e| Error::schema_load(path, format!("schema does not compile: {e}")))?;

        Ok(Self {
            validator,
            schema_name: path.display().to_string(),
        })
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Check one parsed YAML document, returning every structural
    /// violation message. Read-only; never short-circuits.
    pub fn check(&self, document: &serde_yaml::Value) -> Vec<String> {
        let instance = match yaml_to_json_value(document) {
            Ok(value) => value,
            Err(reason) => return vec![format!("(root): {reason}")],
        };

        self.validator
            .iter_errors(&instance)
            .map(|err| {
                let at = err.instance_path.to_string();
                if at.is_empty() {
                    format!("(root): {err}")
                } else {
                    format!("{at}: {err}")
                }
            })
            .collect()
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`. Metadata
/// files use only the JSON-compatible subset of YAML; tags are ignored
/// and their inner value converted.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> std::result::Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: std::result::Result<Vec<Value>, String> =
                seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
