//! Per-file metadata checks and the batch orchestrator.
//!
//! Control flow per file: read → YAML parse (a parse failure is fatal
//! for the file) → raw record scan → schema validation → field rules →
//! designation cache → optional registry cross-check. The batch always
//! completes: every finding is reported, nothing here is process-fatal.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use derive_builder::Builder;

use crate::metadata::designation::{DesignationCache, PRIMARY_DESIGNATION};
use crate::metadata::errors::{Result, Violation};
use crate::metadata::record::MetadataRecord;
use crate::metadata::rules::{self, ExtensionRules, LicenseList};
use crate::metadata::schema::SchemaValidator;
use crate::registry::ModelRegistry;

/// The one hub repository for which the external registry cross-check
/// is active.
pub const REGISTRY_CHECK_HUB: &str = "reichlab/covid19-forecast-hub";

pub const DEFAULT_REGISTRY_PROJECT: &str = "COVID-19 Forecasts";

/// Prefix marking a message as originating from content validation.
const CONTENT_VALIDATION_PREFIX: &str = "Error when validating metadata content: ";

/// Run-scoped configuration, supplied by the surrounding pipeline.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ValidationConfig {
    /// Path to the declarative schema file.
    pub schema_path: PathBuf,
    /// Path to the accepted-licenses reference table.
    pub license_path: PathBuf,
    /// Which hub repository this run is scoped to, when known.
    #[builder(default)]
    pub hub_repository: Option<String>,
    /// Registry project holding this hub's registered models.
    #[builder(default = "DEFAULT_REGISTRY_PROJECT.to_string()")]
    pub registry_project: String,
    /// Opt-in extension rules, all off by default.
    #[builder(default)]
    pub extensions: ExtensionRules,
}

impl ValidationConfig {
    pub fn builder() -> ValidationConfigBuilder {
        ValidationConfigBuilder::default()
    }
}

/// Per-file result: either clean or a non-empty, ordered violation
/// list. Never partially constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    violations: Vec<Violation>,
}

impl ValidationOutcome {
    fn from_violations(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Human-readable messages, in the order the rules reported them.
    pub fn messages(&self) -> Vec<String> {
        self.violations
            .iter()
            .map(|v| format!("METADATA ERROR: {v}"))
            .collect()
    }
}

/// Aggregate over one batch of metadata files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Logical AND over all per-file outcomes.
    pub success: bool,
    /// One comment per file that passed.
    pub comments: Vec<String>,
    /// Ordered violation messages per file that failed.
    pub errors: BTreeMap<PathBuf, Vec<String>>,
}

/// Validates metadata files against the schema, field rules, and
/// cross-file consistency for one run.
pub struct MetadataValidator<'r> {
    config: ValidationConfig,
    schema: SchemaValidator,
    licenses: LicenseList,
    registry: Option<&'r dyn ModelRegistry>,
}

impl<'r> MetadataValidator<'r> {
    /// Load the schema and license table named by the config. Fails
    /// only on broken run configuration, never on bad metadata.
    pub fn new(
        config: ValidationConfig,
        registry: Option<&'r dyn ModelRegistry>,
    ) -> Result<Self> {
        let schema = SchemaValidator::from_path(&config.schema_path)?;
        let licenses = LicenseList::from_path(&config.license_path)?;
        Ok(Self {
            config,
            schema,
            licenses,
            registry,
        })
    }

    /// Validate every file in the batch, in the given order.
    ///
    /// The designation cache is created fresh here and shared across
    /// all files of this run only, so re-running the same batch always
    /// produces the same result.
    pub fn validate_batch(&self, files: &[PathBuf]) -> BatchResult {
        let mut cache = DesignationCache::new();
        let mut result = BatchResult {
            success: true,
            ..Default::default()
        };

        tracing::info!(
            files = files.len(),
            schema = self.schema.schema_name(),
            "checking metadata content"
        );
        for file in files {
            tracing::info!(file = %file.display(), "checking metadata content for file");
            let outcome = self.check_file(file, &mut cache);
            if outcome.is_ok() {
                tracing::info!(file = %file.display(), "content validated");
                result.comments.push(format!(
                    "✔️ {} passed (non-filename) content checks.",
                    file.display()
                ));
            } else {
                result.success = false;
                let messages: Vec<String> = outcome
                    .messages()
                    .into_iter()
                    .map(|m| format!("{CONTENT_VALIDATION_PREFIX}{m}"))
                    .collect();
                for message in &messages {
                    tracing::error!(file = %file.display(), "{message}");
                }
                result
                    .errors
                    .entry(file.clone())
                    .or_default()
                    .extend(messages);
            }
        }

        result
    }

    /// Validate one metadata file, mutating the shared designation
    /// cache for this run.
    pub fn check_file(&self, filepath: &Path, cache: &mut DesignationCache) -> ValidationOutcome {
        let mut violations = Vec::new();

        let content = match std::fs::read_to_string(filepath) {
            Ok(content) => content,
            Err(e) => {
                return ValidationOutcome::from_violations(vec![Violation::Format {
                    path: filepath.display().to_string(),
                    message: e.to_string(),
                }]);
            }
        };

        // Format gate: an unparseable document short-circuits every
        // other check for this file.
        let document: serde_yaml::Value = match serde_yaml::from_str(&content) {
            Ok(document) => document,
            Err(e) => {
                return ValidationOutcome::from_violations(vec![Violation::Format {
                    path: filepath.display().to_string(),
                    message: e.to_string(),
                }]);
            }
        };

        let record = MetadataRecord::scan(&content);

        violations.extend(self.schema.check(&document).into_iter().map(Violation::Schema));

        // Critical field: without model_abbr no further checks run.
        if record.model_abbr().is_none() {
            violations.push(Violation::MissingModelAbbr);
            return ValidationOutcome::from_violations(violations);
        }

        violations.extend(rules::apply(
            &record,
            filepath,
            &self.licenses,
            &self.config.extensions,
        ));

        if let (Some(team_abbr), Some(designation)) = (record.team_abbr(), record.designation()) {
            if let Some(violation) = cache.record(team_abbr, designation) {
                violations.push(violation);
            }
        }

        if self.registry_check_applies(&record) {
            if let Some(registry) = self.registry {
                if let Some(violation) = self.registry_cross_check(registry, &record) {
                    violations.push(violation);
                }
            }
        }

        ValidationOutcome::from_violations(violations)
    }

    fn registry_check_applies(&self, record: &MetadataRecord) -> bool {
        self.config.hub_repository.as_deref() == Some(REGISTRY_CHECK_HUB)
            && record.designation() == Some(PRIMARY_DESIGNATION)
    }

    /// Ask the registry for the team's registered models; a team that
    /// already has models, none of which match the declared name, has
    /// claimed a second primary. Any registry failure is reported for
    /// this file only.
    fn registry_cross_check(
        &self,
        registry: &dyn ModelRegistry,
        record: &MetadataRecord,
    ) -> Option<Violation> {
        let team_name = record.get("team_name")?;
        let model_name = record.get("model_name")?;

        match registry.team_models(&self.config.registry_project) {
            Ok(by_team) => {
                let registered = by_team.get(team_name)?;
                if !registered.is_empty() && !registered.iter().any(|n| n == model_name) {
                    let team = record.team_abbr().unwrap_or(team_name);
                    Some(Violation::DuplicatePrimary {
                        team: team.to_string(),
                    })
                } else {
                    None
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "registry cross-check did not complete");
                Some(Violation::RegistryUnavailable {
                    reason: e.to_string(),
                })
            }
        }
    }
}
