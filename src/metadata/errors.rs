//! Error types for metadata validation.
//!
//! Two distinct levels live here. [`Error`] is operational: broken run
//! configuration (unreadable schema, bad license table) that makes the
//! whole batch impossible. [`Violation`] is a reported finding about a
//! single metadata file; violations are collected into per-file
//! outcomes and never abort the batch.

use std::path::Path;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Operational failure that prevents a validation run. Per-file
/// problems, including unreadable files, are [`Violation`]s instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("schema load error for '{schema}': {reason}")]
    SchemaLoad { schema: String, reason: String },
    #[error("license table error for '{path}': {reason}")]
    LicenseTable { path: String, reason: String },
}

impl Error {
    pub fn schema_load(schema: &Path, reason: impl ToString) -> Self {
        Self::SchemaLoad {
            schema: schema.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn license_table(path: &Path, reason: impl ToString) -> Self {
        Self::LicenseTable {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A single finding reported against one metadata file.
///
/// `Display` yields the human-readable message shown in pull-request
/// feedback; the batch orchestrator adds the content-validation prefix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The file is not parseable as YAML. Fatal for the file.
    #[error(
        "metadata YAML format error for {path}.\n\
         Common fixes (if the parse error message is unclear):\n\
         * try converting all tabs to spaces\n\
         * try copying the example metadata file and following its formatting closely\n\
         Parse error message:\n{message}"
    )]
    Format { path: String, message: String },

    /// A structural violation reported by the schema validator.
    #[error("{0}")]
    Schema(String),

    /// `model_abbr` is absent. Fatal for the file.
    #[error("model_abbr key not present in the metadata file")]
    MissingModelAbbr,

    /// The file name does not match `metadata-<model_abbr>.txt`.
    #[error("file name does not follow the metadata-<model_abbr>.txt convention: {file}")]
    BadFilename { file: String },

    #[error(
        "model abbreviation in metadata inconsistent with file name: \
         model_abbr={in_metadata} as specified in metadata, \
         model name on file is: {in_filename}"
    )]
    AbbreviationMismatch {
        in_metadata: String,
        in_filename: String,
    },

    #[error("forecast_startdate {value} must be a date and should be in YYYY-MM-DD format")]
    BadStartDate { value: String },

    #[error("'{field}' field must be lowercase boolean (true, false) not '{value}'")]
    BadBoolean { field: String, value: String },

    #[error("'license' field must be in the 'license' column of the accepted-licenses table, got '{value}'")]
    UnacceptedLicense { value: String },

    /// A second "primary" designation for a team within one run, either
    /// locally observed or sourced from the external model registry.
    #[error("{team} has more than one model designated as \"primary\"")]
    DuplicatePrimary { team: String },

    /// The external registry cross-check could not complete. Recoverable;
    /// reported for the affected file only.
    #[error("model registry cross-check could not complete: {reason}")]
    RegistryUnavailable { reason: String },

    // Extension rules, off by default.
    #[error("missing required field '{field}'")]
    MissingRequiredField { field: String },

    #[error("methods is too many characters ({length} should be less than {limit})")]
    MethodsTooLong { length: usize, limit: usize },

    #[error("'team_url' field must be a full URL (https://www.example.com), got '{value}'")]
    BadTeamUrl { value: String },
}
