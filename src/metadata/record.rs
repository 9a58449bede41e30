//! Raw, uncoerced view of a metadata file.
//!
//! Every field value is kept as the literal text written in the file.
//! A YAML loader would fold `True` and `true` into the same boolean and
//! destroy exactly the detail the boolean-vocabulary and date-format
//! rules inspect, so the scalar scan here never coerces. Parseability
//! is gated separately: the orchestrator runs `serde_yaml` over the
//! document first and treats a parse failure as a fatal format
//! violation before this scan ever runs.

use std::collections::BTreeMap;
use std::path::Path;

/// One metadata file's top-level entries, values verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    fields: BTreeMap<String, String>,
}

impl MetadataRecord {
    /// Scan the document text for top-level `key: value` entries.
    ///
    /// Quoted scalars are unwrapped, inline comments stripped, and
    /// block scalars (`|` / `>`) joined from their indented lines.
    /// Keys whose value is nested (mapping or sequence) are recorded
    /// with an empty value so presence checks still see them.
    pub fn scan(content: &str) -> Self {
        let mut fields = BTreeMap::new();
        let mut lines = content.lines().peekable();

        while let Some(line) = lines.next() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            // Indented lines belong to the previous key.
            if line.starts_with(char::is_whitespace) {
                continue;
            }
            if trimmed == "---" || trimmed == "..." {
                continue;
            }
            let Some((key, rest)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_string();
            let value = rest.trim();

            if value.starts_with('|') || value.starts_with('>') {
                let folded = value.starts_with('>');
                let mut parts = Vec::new();
                while let Some(next) = lines.peek() {
                    if next.trim().is_empty() || next.starts_with(char::is_whitespace) {
                        parts.push(lines.next().unwrap_or_default().trim().to_string());
                    } else {
                        break;
                    }
                }
                let joined = if folded {
                    parts.join(" ")
                } else {
                    parts.join("\n")
                };
                fields.insert(key, joined.trim().to_string());
            } else {
                fields.insert(key, clean_scalar(value));
            }
        }

        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn model_abbr(&self) -> Option<&str> {
        self.get("model_abbr")
    }

    /// `team_abbr` as derived from `model_abbr`: everything before the
    /// first `-` separator. Not independently validated.
    pub fn team_abbr(&self) -> Option<&str> {
        self.model_abbr()
            .map(|abbr| abbr.split('-').next().unwrap_or(abbr))
    }

    pub fn designation(&self) -> Option<&str> {
        self.get("team_model_designation")
    }
}

/// Unwrap a quoted scalar or strip a trailing inline comment.
fn clean_scalar(raw: &str) -> String {
    let raw = raw.trim();
    for quote in ['"', '\''] {
        if let Some(rest) = raw.strip_prefix(quote) {
            if let Some(end) = rest.find(quote) {
                return rest[..end].to_string();
            }
        }
    }
    match raw.find(" #") {
        Some(end) => raw[..end].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// Extract the model identifier embedded in a metadata file name,
/// following the `metadata-<model_abbr>.txt` convention.
pub fn model_abbr_from_filename(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_prefix("metadata-")?.strip_suffix(".txt")?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}
