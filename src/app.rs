//! Process bootstrap shared by the server binary and the CLI.

use anyhow::Context;
use catalog_db::Database;
use catalog_kernel::settings::Settings;
use catalog_kernel::{InitCtx, ModuleRegistry};

use crate::modules;

/// Connect to the store, register and initialize every module, then apply
/// pending migrations.
///
/// Safe to run on every start: already applied migrations are skipped.
pub async fn prepare(settings: &Settings) -> anyhow::Result<(Database, ModuleRegistry)> {
    let db = Database::connect(&settings.database)
        .await
        .context("failed to open database")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &db)?;

    let ctx = InitCtx { settings };
    registry.init_modules(&ctx).await?;

    let applied = db
        .run_migrations(&registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, "schema bootstrap complete");

    Ok((db, registry))
}

/// Apply migrations and exit. Returns the number of migrations applied.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let db = Database::connect(&settings.database)
        .await
        .context("failed to open database")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &db)?;

    let applied = db
        .run_migrations(&registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;

    db.close().await;
    Ok(applied)
}

/// Run the HTTP server until Ctrl-C or SIGTERM, then stop modules and close the pool.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let (db, registry) = prepare(&settings).await?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.start_modules(&ctx).await?;

    let served = catalog_http::start_server(&registry, &settings, shutdown_signal()).await;

    registry.stop_modules().await?;
    db.close().await;

    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
