use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of one migration version.
/// Pending -> Success or Pending -> Failed; a successful rollback deletes the
/// record outright, so there is no reverse transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStatus {
    Pending,
    Success,
    Failed,
}

impl MigrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationStatus::Pending => "pending",
            MigrationStatus::Success => "success",
            MigrationStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(MigrationStatus::Pending),
            "success" => Some(MigrationStatus::Success),
            "failed" => Some(MigrationStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable record of one migration execution, keyed by version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub version: String,
    pub name: String,
    pub executed_at: DateTime<Utc>,
    pub status: MigrationStatus,
}

impl MigrationRecord {
    pub fn pending(version: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            name: name.into(),
            executed_at: Utc::now(),
            status: MigrationStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            MigrationStatus::Pending,
            MigrationStatus::Success,
            MigrationStatus::Failed,
        ] {
            assert_eq!(MigrationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MigrationStatus::parse("rolled_back"), None);
    }
}
