//! SQLite connection pool and migration runner for the catalog service.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use catalog_kernel::settings::DatabaseSettings;
use catalog_kernel::Migration;

pub mod error;

pub use error::{DbError, DbResult};

const LEDGER_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS _catalog_migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    )
"#;

/// Handle over the shared connection pool.
///
/// Cloning is cheap; every clone points at the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool for the configured connection string.
    ///
    /// File databases are created on demand and run in WAL mode. In-memory
    /// databases are pinned to one connection kept alive for the pool's
    /// lifetime, since each SQLite connection to `:memory:` is its own database.
    pub async fn connect(settings: &DatabaseSettings) -> DbResult<Self> {
        tracing::info!(url = %settings.url, "connecting to database");

        let mut options =
            SqliteConnectOptions::from_str(&settings.url).map_err(|source| DbError::InvalidUrl {
                url: settings.url.clone(),
                source,
            })?;
        options = options.create_if_missing(true).foreign_keys(true);

        let in_memory = settings.is_in_memory();
        let max_connections = if in_memory { 1 } else { settings.max_connections };

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms));

        if in_memory {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(DbError::Connection)?;

        tracing::info!(max_connections, "database pool created");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply every migration not yet recorded in the ledger.
    ///
    /// Each migration runs in its own transaction together with its ledger
    /// row, so a failed migration leaves nothing behind and a repeated run is
    /// a no-op. Returns the number of migrations applied by this call.
    pub async fn run_migrations(&self, migrations: &[(String, Migration)]) -> DbResult<usize> {
        sqlx::query(LEDGER_DDL).execute(&self.pool).await?;

        let mut applied = 0;
        for (module, migration) in migrations {
            let already_applied: Option<i64> =
                sqlx::query_scalar("SELECT 1 FROM _catalog_migrations WHERE module = ?1 AND id = ?2")
                    .bind(module)
                    .bind(migration.id)
                    .fetch_optional(&self.pool)
                    .await?;

            if already_applied.is_some() {
                tracing::debug!(module = %module, migration = migration.id, "migration already applied");
                continue;
            }

            let wrap = |source| DbError::Migration {
                module: module.clone(),
                id: migration.id,
                source,
            };

            let mut tx = self.pool.begin().await?;
            sqlx::raw_sql(migration.up)
                .execute(&mut *tx)
                .await
                .map_err(wrap)?;
            sqlx::query("INSERT INTO _catalog_migrations (module, id) VALUES (?1, ?2)")
                .bind(module)
                .bind(migration.id)
                .execute(&mut *tx)
                .await
                .map_err(wrap)?;
            tx.commit().await?;

            tracing::info!(module = %module, migration = migration.id, "migration applied");
            applied += 1;
        }

        Ok(applied)
    }

    /// Returns true when the store answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub async fn close(&self) {
        tracing::info!("closing database connection pool");
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelf_migrations() -> Vec<(String, Migration)> {
        vec![(
            "shelves".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE IF NOT EXISTS shelves (id INTEGER PRIMARY KEY, label TEXT NOT NULL);",
            },
        )]
    }

    #[tokio::test]
    async fn test_in_memory_database_is_healthy() {
        let db = Database::connect(&DatabaseSettings::in_memory())
            .await
            .unwrap();

        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_invalid_url_is_reported() {
        let settings = DatabaseSettings {
            url: "sqlite://catalog.db?mode=sideways".to_string(),
            ..DatabaseSettings::in_memory()
        };

        let err = Database::connect(&settings).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_migrations_apply_once() {
        let db = Database::connect(&DatabaseSettings::in_memory())
            .await
            .unwrap();
        let migrations = shelf_migrations();

        assert_eq!(db.run_migrations(&migrations).await.unwrap(), 1);
        sqlx::query("INSERT INTO shelves (label) VALUES ('fiction')")
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(db.run_migrations(&migrations).await.unwrap(), 0);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shelves")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_failed_migration_is_not_recorded() {
        let db = Database::connect(&DatabaseSettings::in_memory())
            .await
            .unwrap();
        let broken = vec![(
            "shelves".to_string(),
            Migration {
                id: "001_broken",
                up: "CREATE TABLE shelves (;",
            },
        )];

        let err = db.run_migrations(&broken).await.unwrap_err();
        assert!(matches!(err, DbError::Migration { id: "001_broken", .. }));

        let recorded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _catalog_migrations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(recorded, 0);
    }
}
