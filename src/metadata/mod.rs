//! Metadata content validation for forecast-hub pull requests.

pub mod designation;
pub mod errors;
pub mod record;
pub mod rules;
pub mod schema;
pub mod validate;

pub use designation::DesignationCache;
pub use errors::{Error, Result, Violation};
pub use record::MetadataRecord;
pub use rules::{ExtensionRules, LicenseList};
pub use schema::SchemaValidator;
pub use validate::{BatchResult, MetadataValidator, ValidationConfig, ValidationOutcome};
