//! Content validation for forecast-hub metadata files.
//!
//! One step of a larger pull-request validation pipeline: given the
//! metadata files touched by a pull request, check each against a
//! declarative schema and a fixed set of semantic field rules, track
//! "primary" model designations across the batch, and optionally
//! cross-check against the external model registry. The surrounding
//! pipeline supplies the file list and renders the returned
//! [`metadata::BatchResult`] into pull-request feedback.

pub mod metadata;
pub mod registry;
