pub mod registry;
pub mod units;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::database::migration_records::MigrationStore;
use crate::database::models::{MigrationRecord, MigrationStatus};
use crate::database::StoreError;

/// One discrete, versioned schema/data transformation. The version string
/// must sort lexicographically in application order (zero-padded prefixes).
#[async_trait]
pub trait MigrationUnit: Send + Sync {
    fn version(&self) -> &str;

    fn name(&self) -> &str;

    async fn apply(&self) -> anyhow::Result<()>;

    /// Whether the unit exposes an inverse. Rolling back a unit without one
    /// is a no-op that reports "nothing to roll back".
    fn has_rollback(&self) -> bool {
        false
    }

    async fn rollback(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("migration {0} not found")]
    NotFound(String),

    #[error("migration {version} is not eligible for rollback (status: {status})")]
    InvalidState {
        version: String,
        status: MigrationStatus,
    },

    #[error("migration {version} failed: {source}")]
    ApplyFailure {
        version: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a rollback request that found an eligible record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackOutcome {
    RolledBack,
    /// The unit has no inverse; the record is retained
    NothingToRollBack,
}

/// Applies pending migration units against the store exactly once, in
/// ascending version order, recording the outcome of each run.
pub struct MigrationRunner<S> {
    store: S,
    units: Vec<Arc<dyn MigrationUnit>>,
}

impl<S: MigrationStore> MigrationRunner<S> {
    pub fn new(store: S, mut units: Vec<Arc<dyn MigrationUnit>>) -> Self {
        units.sort_by(|a, b| a.version().cmp(b.version()));
        Self { store, units }
    }

    /// Run every unit not yet marked success, strictly in order. A `pending`
    /// record is persisted before each apply so a crash mid-apply is
    /// distinguishable from a unit that was never attempted. The first
    /// failure marks its record `failed` and aborts the run; later units are
    /// not attempted.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        info!("Starting database migrations");

        if self.units.is_empty() {
            info!("No migration units registered");
            return Ok(());
        }

        let executed = self.store.successful_versions().await?;

        for unit in &self.units {
            let version = unit.version();
            if executed.contains(version) {
                info!("Migration {} already executed, skipping", version);
                continue;
            }

            info!("Running migration: {}", version);
            let record = MigrationRecord::pending(version, unit.name());
            self.store.insert(&record).await?;

            match unit.apply().await {
                Ok(()) => {
                    self.store
                        .set_status(version, MigrationStatus::Success)
                        .await?;
                    info!("Migration {} completed successfully", version);
                }
                Err(source) => {
                    error!("Migration {} failed: {}", version, source);
                    self.store
                        .set_status(version, MigrationStatus::Failed)
                        .await?;
                    return Err(MigrateError::ApplyFailure {
                        version: version.to_string(),
                        source,
                    });
                }
            }
        }

        info!("All migrations completed successfully");
        Ok(())
    }

    /// Roll back a single successfully-applied version. On success the record
    /// is deleted, so the version becomes eligible for re-application. Never
    /// cascades to other versions.
    pub async fn rollback(&self, version: &str) -> Result<RollbackOutcome, MigrateError> {
        let record = self
            .store
            .find(version)
            .await?
            .ok_or_else(|| MigrateError::NotFound(version.to_string()))?;

        if record.status != MigrationStatus::Success {
            return Err(MigrateError::InvalidState {
                version: version.to_string(),
                status: record.status,
            });
        }

        let unit = self
            .units
            .iter()
            .find(|unit| unit.version() == version)
            .ok_or_else(|| MigrateError::NotFound(version.to_string()))?;

        if !unit.has_rollback() {
            info!("No rollback defined for migration {}", version);
            return Ok(RollbackOutcome::NothingToRollBack);
        }

        info!("Rolling back migration: {}", version);
        unit.rollback()
            .await
            .map_err(|source| MigrateError::ApplyFailure {
                version: version.to_string(),
                source,
            })?;

        self.store.delete(version).await?;
        info!("Migration {} rolled back successfully", version);
        Ok(RollbackOutcome::RolledBack)
    }

    /// All migration records ascending by version, for diagnostic display
    pub async fn status(&self) -> Result<Vec<MigrationRecord>, MigrateError> {
        Ok(self.store.list().await?)
    }
}
