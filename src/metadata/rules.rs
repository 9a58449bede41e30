//! Semantic field rules applied to one metadata record.
//!
//! Each rule is an independent predicate returning zero or one
//! violation; the checker runs them in a fixed order and accumulates
//! everything it finds. The fatal `model_abbr`-missing case is handled
//! by the orchestrator before this module is reached.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use url::Url;

use crate::metadata::errors::{Error, Result, Violation};
use crate::metadata::record::{MetadataRecord, model_abbr_from_filename};

/// Fields that, when present, must be exactly lowercase `true`/`false`.
pub const BOOLEAN_FIELDS: [&str; 4] = [
    "this_model_is_an_ensemble",
    "this_model_is_unconditional",
    "include_in_ensemble_and_visualization",
    "ensemble_of_hub_models",
];

/// Fields checked by the opt-in required-field rule.
pub const REQUIRED_FIELDS: [&str; 10] = [
    "team_name",
    "team_abbr",
    "model_name",
    "model_contributors",
    "model_abbr",
    "website_url",
    "license",
    "team_model_designation",
    "methods",
    "ensemble_of_hub_models",
];

pub const METHODS_CHAR_LIMIT: usize = 200;

/// Date formats accepted for `forecast_startdate`. Permissive on
/// notation, strict on the calendar: an impossible date fails in every
/// format.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Opt-in rules kept off by default to match observed hub behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionRules {
    pub required_fields: bool,
    pub methods_length: bool,
    pub team_url: bool,
}

/// Accepted license identifiers, loaded from the reference table.
#[derive(Debug, Clone)]
pub struct LicenseList {
    accepted: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
struct LicenseRow {
    license: String,
}

impl LicenseList {
    /// Load the `license` column of a CSV reference table.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut reader =
            csv::Reader::from_path(path).map_err(|e| Error::license_table(path, e))?;
        let mut accepted = BTreeSet::new();
        for row in reader.deserialize() {
            let row: LicenseRow = row.map_err(|e| Error::license_table(path, e))?;
            accepted.insert(row.license);
        }
        if accepted.is_empty() {
            return Err(Error::license_table(path, "no accepted licenses listed"));
        }
        Ok(Self { accepted })
    }

    pub fn is_accepted(&self, license: &str) -> bool {
        self.accepted.contains(license)
    }
}

/// Run every field rule against one record, in order, accumulating all
/// violations. Assumes `model_abbr` is present.
pub fn apply(
    record: &MetadataRecord,
    filepath: &Path,
    licenses: &LicenseList,
    extensions: &ExtensionRules,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    if let Some(v) = check_filename_consistency(record, filepath) {
        violations.push(v);
    }
    if let Some(v) = check_start_date(record) {
        violations.push(v);
    }
    violations.extend(check_boolean_fields(record));
    if let Some(v) = check_license(record, licenses) {
        violations.push(v);
    }

    if extensions.required_fields {
        violations.extend(check_required_fields(record));
    }
    if extensions.methods_length {
        if let Some(v) = check_methods_length(record) {
            violations.push(v);
        }
    }
    if extensions.team_url {
        if let Some(v) = check_team_url(record) {
            violations.push(v);
        }
    }

    violations
}

/// Rule 1: the identifier embedded in the file name must equal
/// `model_abbr`.
fn check_filename_consistency(record: &MetadataRecord, filepath: &Path) -> Option<Violation> {
    let model_abbr = record.model_abbr()?;
    match model_abbr_from_filename(filepath) {
        Some(on_file) if on_file == model_abbr => None,
        Some(on_file) => Some(Violation::AbbreviationMismatch {
            in_metadata: model_abbr.to_string(),
            in_filename: on_file,
        }),
        None => Some(Violation::BadFilename {
            file: filepath.display().to_string(),
        }),
    }
}

/// Rule 3: `forecast_startdate`, when present, must be a real calendar
/// date.
fn check_start_date(record: &MetadataRecord) -> Option<Violation> {
    let value = record.get("forecast_startdate")?;
    if parses_as_date(value) {
        None
    } else {
        Some(Violation::BadStartDate {
            value: value.to_string(),
        })
    }
}

fn parses_as_date(value: &str) -> bool {
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
}

/// Rule 4: boolean flags must be exactly lowercase `true`/`false`.
fn check_boolean_fields(record: &MetadataRecord) -> Vec<Violation> {
    BOOLEAN_FIELDS
        .iter()
        .copied()
        .filter_map(|field| {
            let value = record.get(field)?;
            if value == "true" || value == "false" {
                None
            } else {
                Some(Violation::BadBoolean {
                    field: field.to_string(),
                    value: value.to_string(),
                })
            }
        })
        .collect()
}

/// Rule 5: `license`, when present, must be in the accepted table.
fn check_license(record: &MetadataRecord, licenses: &LicenseList) -> Option<Violation> {
    let value = record.get("license")?;
    if licenses.is_accepted(value) {
        None
    } else {
        Some(Violation::UnacceptedLicense {
            value: value.to_string(),
        })
    }
}

fn check_required_fields(record: &MetadataRecord) -> Vec<Violation> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !record.contains(field))
        .map(|field| Violation::MissingRequiredField {
            field: field.to_string(),
        })
        .collect()
}

fn check_methods_length(record: &MetadataRecord) -> Option<Violation> {
    let methods = record.get("methods")?;
    let length = methods.chars().count();
    if length > METHODS_CHAR_LIMIT {
        Some(Violation::MethodsTooLong {
            length,
            limit: METHODS_CHAR_LIMIT,
        })
    } else {
        None
    }
}

fn check_team_url(record: &MetadataRecord) -> Option<Violation> {
    let value = record.get("team_url")?;
    let well_formed = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https" | "ftp" | "ftps"))
        .unwrap_or(false);
    if well_formed {
        None
    } else {
        Some(Violation::BadTeamUrl {
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn licenses() -> LicenseList {
        let mut table = tempfile::NamedTempFile::new().unwrap();
        writeln!(table, "license,name").unwrap();
        writeln!(table, "mit,MIT License").unwrap();
        writeln!(table, "cc-by-4.0,Creative Commons Attribution 4.0").unwrap();
        LicenseList::from_path(table.path()).unwrap()
    }

    fn metadata_path(abbr: &str) -> PathBuf {
        PathBuf::from(format!("models/{abbr}/metadata-{abbr}.txt"))
    }

    #[test]
    fn consistent_record_has_no_violations() {
        let record = MetadataRecord::scan(
            "model_abbr: teamx-model1\n\
             forecast_startdate: 2021-01-05\n\
             this_model_is_an_ensemble: true\n\
             license: mit\n",
        );
        let violations = apply(
            &record,
            &metadata_path("teamx-model1"),
            &licenses(),
            &ExtensionRules::default(),
        );
        assert!(violations.is_empty(), "unexpected: {violations:?}");
    }

    #[test]
    fn filename_mismatch_names_both_values() {
        let record = MetadataRecord::scan("model_abbr: bar\n");
        let violations = apply(
            &record,
            &metadata_path("foo"),
            &licenses(),
            &ExtensionRules::default(),
        );
        assert_eq!(
            violations,
            vec![Violation::AbbreviationMismatch {
                in_metadata: "bar".to_string(),
                in_filename: "foo".to_string(),
            }]
        );
    }

    #[test]
    fn impossible_calendar_date_is_flagged() {
        let record =
            MetadataRecord::scan("model_abbr: teamx-m\nforecast_startdate: 2021-13-40\n");
        let violations = apply(
            &record,
            &metadata_path("teamx-m"),
            &licenses(),
            &ExtensionRules::default(),
        );
        assert_eq!(
            violations,
            vec![Violation::BadStartDate {
                value: "2021-13-40".to_string()
            }]
        );
    }

    #[test]
    fn valid_date_passes_and_alternate_notation_is_tolerated() {
        for value in ["2021-01-05", "2021/01/05", "01/05/2021", "Jan 5, 2021"] {
            let record = MetadataRecord::scan(&format!(
                "model_abbr: teamx-m\nforecast_startdate: {value}\n"
            ));
            let violations = apply(
                &record,
                &metadata_path("teamx-m"),
                &licenses(),
                &ExtensionRules::default(),
            );
            assert!(violations.is_empty(), "{value} flagged: {violations:?}");
        }
    }

    #[test]
    fn capitalized_boolean_is_flagged() {
        let record =
            MetadataRecord::scan("model_abbr: teamx-m\nthis_model_is_an_ensemble: True\n");
        let violations = apply(
            &record,
            &metadata_path("teamx-m"),
            &licenses(),
            &ExtensionRules::default(),
        );
        assert_eq!(
            violations,
            vec![Violation::BadBoolean {
                field: "this_model_is_an_ensemble".to_string(),
                value: "True".to_string(),
            }]
        );
    }

    #[test]
    fn every_boolean_field_is_checked() {
        let record = MetadataRecord::scan(
            "model_abbr: teamx-m\n\
             this_model_is_an_ensemble: yes\n\
             ensemble_of_hub_models: FALSE\n\
             include_in_ensemble_and_visualization: true\n",
        );
        let violations = apply(
            &record,
            &metadata_path("teamx-m"),
            &licenses(),
            &ExtensionRules::default(),
        );
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn unlisted_license_is_flagged() {
        let record = MetadataRecord::scan("model_abbr: teamx-m\nlicense: GPL-9000\n");
        let violations = apply(
            &record,
            &metadata_path("teamx-m"),
            &licenses(),
            &ExtensionRules::default(),
        );
        assert_eq!(
            violations,
            vec![Violation::UnacceptedLicense {
                value: "GPL-9000".to_string()
            }]
        );
    }

    #[test]
    fn extension_rules_stay_inert_unless_enabled() {
        let record = MetadataRecord::scan("model_abbr: teamx-m\nteam_url: not-a-url\n");
        let path = metadata_path("teamx-m");

        let off = apply(&record, &path, &licenses(), &ExtensionRules::default());
        assert!(off.is_empty());

        let on = apply(
            &record,
            &path,
            &licenses(),
            &ExtensionRules {
                team_url: true,
                required_fields: true,
                methods_length: true,
            },
        );
        assert!(on.contains(&Violation::BadTeamUrl {
            value: "not-a-url".to_string()
        }));
        assert!(on.contains(&Violation::MissingRequiredField {
            field: "team_name".to_string()
        }));
    }

    #[test]
    fn methods_length_rule_counts_characters() {
        let record = MetadataRecord::scan(&format!(
            "model_abbr: teamx-m\nmethods: {}\n",
            "x".repeat(METHODS_CHAR_LIMIT + 1)
        ));
        let on = apply(
            &record,
            &metadata_path("teamx-m"),
            &licenses(),
            &ExtensionRules {
                methods_length: true,
                ..Default::default()
            },
        );
        assert_eq!(
            on,
            vec![Violation::MethodsTooLong {
                length: METHODS_CHAR_LIMIT + 1,
                limit: METHODS_CHAR_LIMIT,
            }]
        );
    }

    #[test]
    fn license_table_must_not_be_empty() {
        let mut table = tempfile::NamedTempFile::new().unwrap();
        writeln!(table, "license,name").unwrap();
        assert!(LicenseList::from_path(table.path()).is_err());
    }
}
