//! Per-run tracking of "primary" model designations.

use std::collections::BTreeSet;

use crate::metadata::errors::Violation;

pub const PRIMARY_DESIGNATION: &str = "primary";

/// Teams already observed with a "primary" designation in this run.
///
/// Constructed once per batch and threaded by `&mut` through every
/// per-file check. The first "primary" claim for a team is accepted;
/// every later claim by the same team in the same run is flagged, so
/// file order within the batch decides which file gets the violation.
#[derive(Debug, Default)]
pub struct DesignationCache {
    primary_teams: BTreeSet<String>,
}

impl DesignationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one file's designation for a team.
    ///
    /// Returns the duplicate-primary violation when the team already
    /// claimed "primary" earlier in this run; non-primary designations
    /// are a no-op.
    pub fn record(&mut self, team_abbr: &str, designation: &str) -> Option<Violation> {
        if designation != PRIMARY_DESIGNATION {
            return None;
        }
        if self.primary_teams.insert(team_abbr.to_string()) {
            None
        } else {
            Some(Violation::DuplicatePrimary {
                team: team_abbr.to_string(),
            })
        }
    }

    pub fn has_primary(&self, team_abbr: &str) -> bool {
        self.primary_teams.contains(team_abbr)
    }
}
