//! # jetsql-sqlite
//!
//! Runs `jetsql-core` statements on SQLite through `sqlx`.
//!
//! - [`Executor`] renders with the SQLite dialect, binds the arguments
//!   positionally and runs the statement on a [`SqlitePool`](sqlx::SqlitePool)
//! - an optional logging hook receives every executed statement, with and
//!   without its arguments inlined
//! - [`introspect`] reads table metadata for code generation
//!
//! ## Example
//!
//! ```rust,ignore
//! use jetsql_core::prelude::*;
//! use jetsql_sqlite::Executor;
//!
//! #[derive(sqlx::FromRow)]
//! struct Note {
//!     #[sqlx(rename = "notes.body")]
//!     body: String,
//! }
//!
//! let executor = Executor::new(pool).with_logger(|log| println!("{}", log.debug_sql));
//! let notes: Vec<Note> = executor
//!     .query_as(&notes.select(&notes.body).where_clause(notes.id.gt(10)))
//!     .await?;
//! ```

pub mod error;
mod executor;
mod introspect;

pub use error::{ExecError, Result};
pub use executor::{ExecResult, Executor, StatementLog};
pub use introspect::introspect;
