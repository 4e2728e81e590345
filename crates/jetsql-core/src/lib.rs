//! # jetsql-core
//!
//! Typed SQL statements compiled to dialect-correct text plus arguments.
//!
//! This crate provides:
//! - An expression model where operators are only offered for the kinds
//!   they make sense on, with every operator rendered inside parentheses
//! - Builders for SELECT, INSERT, UPDATE, DELETE, LOCK, WITH, set
//!   operations and raw statements
//! - MySQL, PostgreSQL and SQLite dialects, chosen at render time
//! - Source generation of typed table modules from schema metadata
//!
//! ## Building a statement
//!
//! ```rust
//! use jetsql_core::prelude::*;
//!
//! let users = Table::new(
//!     None,
//!     "users",
//!     &[("id", ExprKind::Integer), ("name", ExprKind::String)],
//! );
//! let id: Column<kind::Integer> = Column::new("users", "id");
//! let name: Column<kind::Text> = Column::new("users", "name");
//!
//! let stmt = users
//!     .select((&id, &name))
//!     .where_clause(name.like("a%").and(id.gt(10)))
//!     .limit(5);
//!
//! let (sql, args) = stmt.sql(&PostgresDialect::new()).unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT users.id AS \"users.id\",\n       \
//!      users.name AS \"users.name\"\n\
//!      FROM users\n\
//!      WHERE ((users.name LIKE $1) AND (users.id > $2))\n\
//!      LIMIT $3;"
//! );
//! assert_eq!(args.len(), 3);
//! ```
//!
//! ## Construction faults
//!
//! Statements that cannot be rendered fail with a [`BuildError`] instead of
//! producing SQL. UPDATE and DELETE without a WHERE clause are such faults:
//!
//! ```rust
//! use jetsql_core::prelude::*;
//!
//! let users = Table::new(None, "users", &[("id", ExprKind::Integer)]);
//! let err = users.delete().sql(&SqliteDialect::new()).unwrap_err();
//! assert_eq!(err.kind(), FaultKind::MissingClause);
//! ```

pub mod clause;
pub mod codegen;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod model;
pub mod render;
pub mod statement;
pub mod table;
pub mod value;

pub use dialect::{Dialect, MySqlDialect, PostgresDialect, SqliteDialect};
pub use error::{BuildError, FaultKind, Result};
pub use model::Model;
pub use statement::{AnyStatement, Statement};
pub use value::{SqlValue, ToSqlValue};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::clause::{Direction, LockStrength, NullsOrder, RowLock};
    pub use crate::dialect::{Dialect, MySqlDialect, PostgresDialect, SqliteDialect};
    pub use crate::error::{BuildError, FaultKind, Result};
    pub use crate::expr::func::{avg, count, count_star, max, min, sum};
    pub use crate::expr::{
        bool_lit, case, int, interval, kind, lit, raw, row, Expr, ExprKind, Expression,
    };
    pub use crate::model::Model;
    pub use crate::statement::{
        cte, except, intersect, raw_statement, select, union, union_all, with, with_recursive,
        Statement,
    };
    pub use crate::table::{
        values, Column, ColumnList, ReadableTable, SubqueryTable, Table, TableSource,
    };
    pub use crate::value::{SqlValue, ToSqlValue};
}
