pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::{SeaOrmAccountStore, SeaOrmRoleStore};

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use migrator::Migrator;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./identity.db?mode=rwc")
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./identity.db?mode=rwc".to_string(),
        }
    }
}

impl DatabaseConfig {
    fn is_in_memory_sqlite(&self) -> bool {
        self.url.starts_with("sqlite::memory:") || self.url.contains("mode=memory")
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!(url = %config.url, "Connecting to database");
    let mut opts = ConnectOptions::new(config.url.clone());
    opts.sqlx_logging(false);
    // Every pooled connection to :memory: would see its own empty database.
    if config.is_in_memory_sqlite() {
        opts.max_connections(1);
    }
    let db = Database::connect(opts).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// Apply all pending migrations
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), sea_orm::DbErr> {
    Migrator::up(db, None).await?;
    info!("Database migrations applied");
    Ok(())
}
