//! Clause fragments shared by the statement builders.
//!
//! Every clause implements [`WriteSql`](crate::render::WriteSql). Optional
//! clauses render nothing when empty; the statements decide where each
//! clause goes and whether it is mandatory.

mod assign;
mod conflict;
mod lock;
mod order;
mod projection;

pub use assign::{Assignment, IntoAssignments, IntoValues};
pub use conflict::{ConflictAction, OnConflict, OnDuplicateKeyUpdate};
pub use lock::{LockStrength, LockWait, RowLock};
pub use order::{Direction, IntoOrderBy, NullsOrder, OrderByItem};
pub use projection::{ExportedColumn, IntoProjections, Projection, ProjectionItem};
pub(crate) use projection::write_projections;

use crate::error::Result;
use crate::expr::Expression;
use crate::render::{SqlBuilder, WriteSql};

/// Writes `KEYWORD item, item, ...` on a new line, or nothing for an empty list.
pub(crate) fn write_list_clause<T: WriteSql>(
    b: &mut SqlBuilder<'_>,
    keyword: &str,
    items: &[T],
) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    b.new_line();
    b.write_str(keyword);
    b.write_char(' ');
    b.write_list(items, ", ", |b, item| item.write_sql(b))
}

/// Writes `KEYWORD expr` on a new line when `expr` is set.
pub(crate) fn write_optional_clause(
    b: &mut SqlBuilder<'_>,
    keyword: &str,
    expr: Option<&Expression>,
) -> Result<()> {
    let Some(expr) = expr else {
        return Ok(());
    };
    b.new_line();
    b.write_str(keyword);
    b.write_char(' ');
    expr.write_sql(b)
}

/// Writes a `RETURNING` list, failing on dialects without it.
pub(crate) fn write_returning(b: &mut SqlBuilder<'_>, returning: &[Projection]) -> Result<()> {
    if returning.is_empty() {
        return Ok(());
    }
    b.dialect().require(crate::dialect::Feature::Returning)?;
    b.new_line();
    b.write_str("RETURNING ");
    write_projections(b, returning)
}
