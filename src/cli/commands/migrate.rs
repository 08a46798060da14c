use clap::Subcommand;

use crate::cli::OutputFormat;
use crate::database::manager::DatabaseManager;
use crate::database::migration_records::PgMigrationStore;
use crate::migrate::{registry, MigrationRunner, RollbackOutcome};

#[derive(Subcommand)]
pub enum MigrateCommands {
    #[command(about = "Run all pending migrations")]
    Up,

    #[command(about = "Rollback a specific migration")]
    Down {
        #[arg(help = "Migration version to rollback")]
        version: String,
    },

    #[command(about = "Show migration status")]
    Status,
}

pub async fn handle(cmd: MigrateCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::pool().await?;
    let store = PgMigrationStore::new(pool.clone());
    store.ensure_table().await?;
    let runner = MigrationRunner::new(store, registry::registry(&pool));

    match cmd {
        MigrateCommands::Up => {
            runner.run_migrations().await?;
            println!("All migrations completed successfully!");
            Ok(())
        }
        MigrateCommands::Down { version } => {
            match runner.rollback(&version).await? {
                RollbackOutcome::RolledBack => {
                    println!("Migration {} rolled back successfully", version);
                }
                RollbackOutcome::NothingToRollBack => {
                    println!("No rollback function found for migration {}", version);
                }
            }
            Ok(())
        }
        MigrateCommands::Status => {
            let records = runner.status().await?;

            if let OutputFormat::Json = output_format {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }

            println!("\nMigration Status:");
            if records.is_empty() {
                println!("No migrations recorded.");
                return Ok(());
            }

            println!(
                "{:<32} {:<36} {:<8} {}",
                "Version", "Name", "Status", "Executed At"
            );
            for record in records {
                println!(
                    "{:<32} {:<36} {:<8} {}",
                    record.version,
                    record.name,
                    record.status,
                    record.executed_at.to_rfc3339()
                );
            }
            Ok(())
        }
    }
}
