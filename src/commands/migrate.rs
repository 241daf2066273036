//! Migrate command - schema management without starting the server.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

fn db_failure(step: &str) -> impl Fn(sea_orm::DbErr) -> AppError + '_ {
    move |e| AppError::internal(format!("{} failed: {}", step, e))
}

pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    // migrations are applied explicitly below
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(db_failure("Database connection"))?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await.map_err(db_failure("Migration"))?;
            tracing::info!("Schema is up to date");
        }
        MigrateAction::Down => {
            db.rollback_migration().await.map_err(db_failure("Rollback"))?;
            tracing::info!("Rolled back the latest migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await.map_err(db_failure("Status check"))?;
            for (name, applied) in status {
                println!("[{}] {}", if applied { "x" } else { " " }, name);
            }
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping all tables and re-applying migrations");
            db.fresh_migrations().await.map_err(db_failure("Fresh migration"))?;
            tracing::info!("Database rebuilt");
        }
    }

    Ok(())
}
