//! jetsql-gen - typed table module generator

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use jetsql_gen::{load_schema_json, write_modules};
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "jetsql-gen")]
#[command(
    author,
    version,
    about = "Generate typed table modules from a database schema",
    long_about = None
)]
struct Cli {
    /// Database URL to introspect
    #[arg(
        short,
        long,
        env = "DATABASE_URL",
        conflicts_with = "schema_json",
        required_unless_present = "schema_json"
    )]
    database_url: Option<String>,

    /// Schema metadata as JSON, instead of a live database
    #[arg(short, long)]
    schema_json: Option<PathBuf>,

    /// Output directory for the generated modules
    #[arg(short, long, default_value = "src/schema")]
    out: PathBuf,

    /// Overwrite existing files
    #[arg(short, long)]
    force: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let schema = if let Some(path) = &cli.schema_json {
        info!("Reading schema from {}", path.display());
        load_schema_json(path).with_context(|| format!("loading {}", path.display()))?
    } else {
        let url = cli
            .database_url
            .as_deref()
            .context("either --database-url or --schema-json is required")?;
        info!("Introspecting {url}");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .with_context(|| format!("connecting to {url}"))?;
        let schema = jetsql_sqlite::introspect(&pool).await?;
        pool.close().await;
        schema
    };

    if schema.tables.is_empty() {
        info!("No tables found");
        return Ok(());
    }

    for path in write_modules(&cli.out, &schema, cli.force)? {
        info!("  {}", path.display());
    }
    Ok(())
}
