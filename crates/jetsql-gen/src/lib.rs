//! Generation of typed table modules from schema metadata.
//!
//! Schema metadata comes from a live SQLite database
//! ([`jetsql_sqlite::introspect`]) or from a JSON file in the
//! [`SchemaMeta`] format. Each table is written as one module of the
//! output directory, next to a `mod.rs` declaring them all.
//!
//! # CLI Usage
//!
//! ```bash
//! # From a live database
//! jetsql-gen --database-url sqlite:app.db --out src/schema
//!
//! # From exported metadata
//! jetsql-gen --schema-json schema.json --out src/schema --force
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use jetsql_core::codegen::{generate_schema, SchemaMeta};
use tracing::{debug, info};

/// Errors raised while loading metadata or writing modules.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Exec(#[from] jetsql_sqlite::ExecError),

    /// A generated file would overwrite an existing one.
    #[error("File already exists: {0} (use --force to overwrite)")]
    Exists(PathBuf),
}

pub type Result<T> = std::result::Result<T, GenError>;

/// Reads schema metadata from a JSON file.
///
/// # Errors
///
/// Returns [`GenError::Io`] or [`GenError::Json`].
pub fn load_schema_json(path: &Path) -> Result<SchemaMeta> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Writes one module per table plus `mod.rs` into `out`, creating it when
/// needed. Returns the written paths.
///
/// # Errors
///
/// Returns [`GenError::Exists`] before writing anything if a target file
/// exists and `force` is not set.
pub fn write_modules(out: &Path, schema: &SchemaMeta, force: bool) -> Result<Vec<PathBuf>> {
    let files = generate_schema(schema);
    if !force {
        if let Some(existing) = files
            .iter()
            .map(|f| out.join(&f.file_name))
            .find(|path| path.exists())
        {
            return Err(GenError::Exists(existing));
        }
    }
    fs::create_dir_all(out)?;
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = out.join(&file.file_name);
        debug!(path = %path.display(), bytes = file.content.len(), "Writing module");
        fs::write(&path, file.content)?;
        written.push(path);
    }
    info!(tables = schema.tables.len(), out = %out.display(), "Generated table modules");
    Ok(written)
}
