//! Statement builders and the render entry points.
//!
//! Every statement is an owned builder value. Builder methods take `self`
//! and return `Self`; rendering borrows the statement and never changes it,
//! so a statement can be rendered any number of times, for any dialect.
//!
//! ```rust
//! use jetsql_core::dialect::{MySqlDialect, PostgresDialect};
//! use jetsql_core::expr::kind::Integer;
//! use jetsql_core::statement::{select, Statement};
//! use jetsql_core::table::Column;
//!
//! let id: Column<Integer> = Column::new("users", "id");
//! let stmt = select(&id).where_clause(id.eq(1));
//!
//! let (sql, args) = stmt.sql(&PostgresDialect::new()).unwrap();
//! assert_eq!(sql, "SELECT users.id AS \"users.id\"\nWHERE (users.id = $1);");
//! assert_eq!(args.len(), 1);
//!
//! let debug = stmt.debug_sql(&MySqlDialect::new()).unwrap();
//! assert_eq!(debug, "SELECT users.id AS \"users.id\"\nWHERE (users.id = 1);");
//! ```

mod delete;
mod insert;
mod lock;
mod raw;
mod select;
mod set_op;
mod update;
mod with;

pub use delete::DeleteStatement;
pub use insert::{InsertSource, InsertStatement};
pub use lock::{unlock_tables, LockStatement, TableLockMode, UnlockStatement};
pub use raw::{raw_statement, RawStatement};
pub use select::{select, Distinct, Fetch, SelectStatement};
pub use update::UpdateStatement;
pub use set_op::{
    except, except_all, intersect, intersect_all, union, union_all, SetOperation, SetOperator,
};
pub use with::{cte, with, with_recursive, Cte, CteRef, WithStatement};

use crate::clause::Projection;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::render::{SqlBuilder, WriteSql};
use crate::value::SqlValue;

/// A complete statement that can be rendered for a dialect.
pub trait Statement: WriteSql {
    /// Renders the statement with placeholders, returning the SQL text
    /// terminated by `;` and the bound arguments in placeholder order.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`](crate::BuildError) met while
    /// rendering. No partial SQL is returned.
    fn sql(&self, dialect: &dyn Dialect) -> Result<(String, Vec<SqlValue>)> {
        let mut b = SqlBuilder::new(dialect);
        self.write_sql(&mut b)?;
        b.write_char(';');
        Ok(b.finish())
    }

    /// Renders the statement with every argument inlined as a literal.
    ///
    /// Meant for logs and debugging; never execute the result.
    ///
    /// # Errors
    ///
    /// Same as [`Statement::sql`].
    fn debug_sql(&self, dialect: &dyn Dialect) -> Result<String> {
        let mut b = SqlBuilder::debug(dialect);
        self.write_sql(&mut b)?;
        b.write_char(';');
        Ok(b.finish().0)
    }
}

/// A row-producing statement: a SELECT or a set operation.
#[derive(Debug, Clone)]
pub enum Query {
    Select(Box<SelectStatement>),
    SetOp(Box<SetOperation>),
}

impl Query {
    /// The projection list; for set operations, that of the first branch.
    #[must_use]
    pub fn projections(&self) -> &[Projection] {
        match self {
            Self::Select(s) => s.projections(),
            Self::SetOp(s) => s.projections(),
        }
    }

    /// Whether the query carries clauses that bind tighter than a set
    /// operator (ORDER BY, LIMIT, ...), or is itself a set operation.
    pub(crate) fn has_tail(&self) -> bool {
        match self {
            Self::Select(s) => s.has_tail(),
            Self::SetOp(_) => true,
        }
    }
}

impl WriteSql for Query {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        match self {
            Self::Select(s) => s.write_sql(b),
            Self::SetOp(s) => s.write_sql(b),
        }
    }
}

impl Statement for Query {}

impl From<SelectStatement> for Query {
    fn from(stmt: SelectStatement) -> Self {
        Self::Select(Box::new(stmt))
    }
}

impl From<SetOperation> for Query {
    fn from(stmt: SetOperation) -> Self {
        Self::SetOp(Box::new(stmt))
    }
}

/// Any statement, for places that accept more than one kind (CTE bodies,
/// the body of a WITH statement).
#[derive(Debug, Clone)]
pub enum AnyStatement {
    Select(SelectStatement),
    SetOp(SetOperation),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    Lock(LockStatement),
    Unlock(UnlockStatement),
    With(Box<WithStatement>),
    Raw(RawStatement),
}

impl AnyStatement {
    /// Columns the statement produces: its projections or RETURNING list.
    #[must_use]
    pub fn projections(&self) -> &[Projection] {
        match self {
            Self::Select(s) => s.projections(),
            Self::SetOp(s) => s.projections(),
            Self::Insert(s) => s.returning_list(),
            Self::Update(s) => s.returning_list(),
            Self::Delete(s) => s.returning_list(),
            Self::With(s) => s.projections(),
            Self::Lock(_) | Self::Unlock(_) | Self::Raw(_) => &[],
        }
    }
}

impl WriteSql for AnyStatement {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        match self {
            Self::Select(s) => s.write_sql(b),
            Self::SetOp(s) => s.write_sql(b),
            Self::Insert(s) => s.write_sql(b),
            Self::Update(s) => s.write_sql(b),
            Self::Delete(s) => s.write_sql(b),
            Self::Lock(s) => s.write_sql(b),
            Self::Unlock(s) => s.write_sql(b),
            Self::With(s) => s.write_sql(b),
            Self::Raw(s) => s.write_sql(b),
        }
    }
}

impl Statement for AnyStatement {}

macro_rules! impl_any_statement_from {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(
            impl From<$ty> for AnyStatement {
                fn from(stmt: $ty) -> Self {
                    Self::$variant(stmt)
                }
            }
        )+
    };
}

impl_any_statement_from!(
    Select(SelectStatement),
    SetOp(SetOperation),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    Lock(LockStatement),
    Unlock(UnlockStatement),
    Raw(RawStatement),
);

impl From<WithStatement> for AnyStatement {
    fn from(stmt: WithStatement) -> Self {
        Self::With(Box::new(stmt))
    }
}

impl From<Query> for AnyStatement {
    fn from(query: Query) -> Self {
        match query {
            Query::Select(s) => Self::Select(*s),
            Query::SetOp(s) => Self::SetOp(*s),
        }
    }
}
