//! Database initialiser for the Farmstead simulation.
//!
//! Applies migrations to the configured `PostgreSQL` database and seeds the
//! starter catalog (items, plants, villagers, shop listings, opening
//! orders). Seeding is idempotent: rerunning it inserts nothing new.
//!
//! # Startup Sequence
//!
//! 1. Parse arguments
//! 2. Load configuration, then initialize structured logging (tracing)
//! 3. With `--dump-schema`, write the schema SQL and stop
//! 4. Connect to `PostgreSQL` and run migrations
//! 5. With `--reset`, confirm and truncate every farm table
//! 6. Validate and seed the starter catalog

mod args;
mod error;

use std::io::{BufRead, Write};

use chrono::Utc;
use farmstead_core::{Catalog, FarmsteadConfig};
use farmstead_db::{CatalogStore, PostgresConfig, PostgresPool, SCHEMA_SQL};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::args::{Args, USAGE};
use crate::error::AdminError;

/// Application entry point for the admin tool.
///
/// # Errors
///
/// Returns an error if argument parsing, configuration, or any database
/// step fails.
#[tokio::main]
async fn main() -> Result<(), AdminError> {
    // 1. Parse arguments.
    let args = Args::parse(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    // 2. Load configuration; its logging level is the filter default.
    let config_found = args.config.exists();
    let mut config = if config_found {
        FarmsteadConfig::from_file(&args.config)?
    } else {
        FarmsteadConfig::parse("")?
    };
    if let Some(url) = &args.database_url {
        config.infrastructure.postgres_url.clone_from(url);
    }

    let default_level = if args.quiet {
        "warn"
    } else {
        config.logging.level.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(true)
        .init();

    info!("farmstead-admin starting");
    if !config_found {
        info!(path = %args.config.display(), "Config file not found, using defaults");
    }
    info!(
        starting_gold = config.economy.starting_gold,
        starting_plots = config.economy.starting_plots,
        max_connections = config.infrastructure.max_connections,
        "Configuration loaded"
    );

    // 3. Dump the schema instead of touching the database.
    if let Some(path) = &args.dump_schema {
        std::fs::write(path, SCHEMA_SQL)?;
        info!(path = %path.display(), "Schema written");
        return Ok(());
    }

    // 4. Connect and migrate.
    let pool = PostgresPool::connect(&PostgresConfig::from_infrastructure(
        &config.infrastructure,
    ))
    .await?;
    pool.run_migrations().await?;

    // 5. Reset on request.
    let catalog_store = CatalogStore::new(pool.pool());
    if args.reset {
        if !args.yes && !confirm_reset()? {
            warn!("Reset aborted");
            pool.close().await;
            return Ok(());
        }
        catalog_store.reset().await?;
    }

    // 6. Seed the starter catalog.
    let catalog = Catalog::starter(Utc::now());
    catalog.validate()?;
    let summary = catalog_store.seed(&catalog).await?;
    if summary.total() == 0 {
        info!("Catalog already seeded, nothing inserted");
    }

    pool.close().await;
    info!("farmstead-admin finished");
    Ok(())
}

/// Ask on the terminal before deleting every row.
fn confirm_reset() -> Result<bool, AdminError> {
    let mut stdout = std::io::stdout();
    write!(stdout, "Delete ALL farm data in the database? [y/N] ")?;
    stdout.flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
