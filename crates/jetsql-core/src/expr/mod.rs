//! The expression model.
//!
//! [`Expression`] is the closed set of value-producing nodes. [`Expr<K>`]
//! wraps an expression with a zero-sized kind marker from [`kind`] so that
//! operations are only offered where they make sense: arithmetic on numeric
//! kinds, `AND`/`OR` on booleans, `LIKE` on text.
//!
//! Every operator renders inside its own parentheses, so no precedence table
//! is ever consulted:
//!
//! ```rust
//! use jetsql_core::dialect::PostgresDialect;
//! use jetsql_core::expr::int;
//! use jetsql_core::render::{SqlBuilder, WriteSql};
//!
//! let e = int(1).add(int(2)).mul(int(3)).eq(int(9));
//! let dialect = PostgresDialect::new();
//! let mut b = SqlBuilder::new(&dialect);
//! jetsql_core::expr::Expression::from(e).write_sql(&mut b).unwrap();
//! assert_eq!(b.as_str(), "((($1 + $2) * $3) = $4)");
//! ```

mod case;
pub mod func;
mod interval;
pub mod kind;
pub(crate) mod operator;
mod raw;
mod typed;
mod window;

pub use case::{case, case_of, Case, CaseExpr};
pub use func::{
    current_date, current_timestamp, default_value, exists, not_exists, null, row, star,
};
pub use interval::{interval, IntervalLiteral, IntervalUnit};
pub use operator::{binary_operator, Operator, OperatorForm};
pub use raw::{raw, Raw};
pub use typed::{
    bool_lit, date_str, int, lit, time_str, timestamp_str, AnyExpr, BlobExpr, BoolExpr, DateExpr,
    Expr, FloatExpr, IntExpr, IntervalExpr, LiteralValue, RowExpr, TextExpr, TimeExpr,
    TimestampExpr,
};
pub use window::{window, Frame, FrameBound, FrameUnits, WindowCall, WindowRef, WindowSpec};

use crate::error::{BuildError, Result};
use crate::render::{ColumnNames, SqlBuilder, WriteSql};
use crate::statement::Query;
use crate::value::{SqlValue, ToSqlValue};

pub use func::FunctionCall;

/// Category of value an expression produces.
///
/// Dialect overrides match on this exhaustively, so adding a category forces
/// every override to decide how to treat it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// Unknown or polymorphic (NULL, raw fragments, sub-queries).
    Any,
    Bool,
    Integer,
    Float,
    String,
    Blob,
    Date,
    Time,
    Timestamp,
    Interval,
    Row,
    Array,
}

/// A value-producing node.
#[derive(Debug, Clone)]
pub enum Expression {
    /// A bound value.
    Literal(Literal),
    /// A column reference.
    Column(ColumnRef),
    /// Prefix, postfix, binary or variadic operator.
    Operator(Operator),
    /// Function call.
    Function(FunctionCall),
    /// Raw SQL template with named arguments.
    Raw(Raw),
    /// `CAST(inner AS type)` or the dialect's equivalent.
    Cast(Cast),
    /// Row constructor `(a, b, ...)`.
    Row(Vec<Expression>),
    /// Parenthesized sub-query.
    Subquery(Box<Query>),
    /// Re-kinds the inner expression without emitting SQL.
    TypeWrap(TypeWrap),
    /// `CASE ... END`.
    Case(CaseExpr),
    /// Window function call `f(..) OVER (..)`.
    Over(WindowCall),
    /// `INTERVAL ...` literal.
    Interval(IntervalLiteral),
    /// SQL keyword emitted verbatim (`DEFAULT`, `*`, `CURRENT_DATE`, ...).
    Keyword(&'static str),
    /// Value proposed for insertion, referenced from an upsert action.
    Excluded(ColumnRef),
}

impl Expression {
    /// Returns the category of value this expression produces.
    #[must_use]
    pub fn kind(&self) -> ExprKind {
        match self {
            Self::Literal(l) => l.value.kind(),
            Self::Column(c) | Self::Excluded(c) => c.kind,
            Self::Operator(o) => o.kind(),
            Self::Function(f) => f.kind(),
            Self::Cast(c) => c.kind,
            Self::Row(_) => ExprKind::Row,
            Self::TypeWrap(t) => t.kind,
            Self::Case(c) => c.kind(),
            Self::Over(w) => w.kind(),
            Self::Interval(_) => ExprKind::Interval,
            Self::Raw(_) | Self::Subquery(_) | Self::Keyword(_) => ExprKind::Any,
        }
    }

    /// A literal bound as a plain argument.
    #[must_use]
    pub const fn value(value: SqlValue) -> Self {
        Self::Literal(Literal {
            value,
            typed: false,
        })
    }

    /// A literal rendered with its SQL type made explicit.
    #[must_use]
    pub const fn typed_value(value: SqlValue) -> Self {
        Self::Literal(Literal { value, typed: true })
    }

    /// Wraps a query as a sub-query expression.
    #[must_use]
    pub fn subquery(query: impl Into<Query>) -> Self {
        Self::Subquery(Box::new(query.into()))
    }
}

impl WriteSql for Expression {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        match self {
            Self::Literal(l) => {
                if l.typed {
                    b.dialect().write_typed_literal(b, &l.value)
                } else {
                    b.bind_argument(l.value.clone());
                    Ok(())
                }
            }
            Self::Column(c) => c.write_sql(b),
            Self::Operator(o) => o.write_sql(b),
            Self::Function(f) => f.write_sql(b),
            Self::Raw(r) => {
                b.write_char('(');
                r.write_template(b)?;
                b.write_char(')');
                Ok(())
            }
            Self::Cast(c) => b.dialect().write_cast(b, &c.inner, &c.target),
            Self::Row(items) => {
                if items.is_empty() {
                    return Err(BuildError::nil_operand("row constructor has no elements"));
                }
                b.write_char('(');
                b.write_list(items, ", ", |b, e| e.write_sql(b))?;
                b.write_char(')');
                Ok(())
            }
            Self::Subquery(q) => b.write_block(|b| q.write_sql(b)),
            Self::TypeWrap(t) => t.inner.write_sql(b),
            Self::Case(c) => c.write_sql(b),
            Self::Over(w) => w.write_sql(b),
            Self::Interval(i) => b.dialect().write_interval(b, i),
            Self::Keyword(k) => {
                b.write_str(k);
                Ok(())
            }
            Self::Excluded(c) => b.dialect().write_excluded(b, c),
        }
    }
}

impl From<SqlValue> for Expression {
    fn from(value: SqlValue) -> Self {
        Self::value(value)
    }
}

impl From<ColumnRef> for Expression {
    fn from(column: ColumnRef) -> Self {
        Self::Column(column)
    }
}

impl From<&ColumnRef> for Expression {
    fn from(column: &ColumnRef) -> Self {
        Self::Column(column.clone())
    }
}

impl From<Raw> for Expression {
    fn from(raw: Raw) -> Self {
        Self::Raw(raw)
    }
}

impl From<Query> for Expression {
    fn from(query: Query) -> Self {
        Self::subquery(query)
    }
}

impl From<&Expression> for Expression {
    fn from(e: &Expression) -> Self {
        e.clone()
    }
}

macro_rules! impl_expression_from_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Expression {
                fn from(value: $ty) -> Self {
                    Self::value(ToSqlValue::to_sql_value(value))
                }
            }
        )+
    };
}

impl_expression_from_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    &str,
    String,
    &String,
    Vec<u8>,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
);

impl<T: ToSqlValue> From<Option<T>> for Expression {
    fn from(value: Option<T>) -> Self {
        Self::value(value.to_sql_value())
    }
}

/// A bound value.
#[derive(Debug, Clone)]
pub struct Literal {
    value: SqlValue,
    typed: bool,
}

impl Literal {
    /// The bound value.
    #[must_use]
    pub const fn value(&self) -> &SqlValue {
        &self.value
    }

    /// Whether the SQL type is rendered explicitly.
    #[must_use]
    pub const fn is_typed(&self) -> bool {
        self.typed
    }
}

/// A reference to a column, optionally qualified by its table.
///
/// `alias` is the dotted `table.column` path emitted as the projection alias so
/// that row mappers can rebuild nested results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    table: Option<String>,
    name: String,
    alias: String,
    kind: ExprKind,
}

impl ColumnRef {
    /// A column qualified by `table`.
    #[must_use]
    pub fn new(table: &str, name: &str, kind: ExprKind) -> Self {
        Self {
            table: Some(String::from(table)),
            name: String::from(name),
            alias: format!("{table}.{name}"),
            kind,
        }
    }

    /// A column without table qualification.
    #[must_use]
    pub fn unqualified(name: &str, kind: ExprKind) -> Self {
        Self {
            table: None,
            name: String::from(name),
            alias: String::from(name),
            kind,
        }
    }

    /// Table name or alias qualifying this column.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Column name as written in SQL.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default projection alias.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Value category.
    #[must_use]
    pub const fn kind(&self) -> ExprKind {
        self.kind
    }

    /// The same column seen through a table alias.
    #[must_use]
    pub fn rebase(&self, table: &str) -> Self {
        Self::new(table, &self.name, self.kind)
    }

    /// The column as re-exported by a sub-query or CTE named `table`.
    ///
    /// The outer reference addresses the projected alias and keeps it, so
    /// `users.id` selected through `sub` renders `sub."users.id"` and still
    /// projects as `"users.id"`.
    #[must_use]
    pub fn exported(&self, table: &str) -> Self {
        Self {
            table: Some(String::from(table)),
            name: self.alias.clone(),
            alias: self.alias.clone(),
            kind: self.kind,
        }
    }

    /// A column of `table` named `name`, keeping `alias` as its projection alias.
    #[must_use]
    pub fn exported_as(table: &str, name: &str, alias: &str, kind: ExprKind) -> Self {
        Self {
            table: Some(String::from(table)),
            name: String::from(name),
            alias: String::from(alias),
            kind,
        }
    }
}

impl WriteSql for ColumnRef {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        match (b.column_names(), &self.table) {
            (ColumnNames::Alias, _) => {
                b.write_alias(&self.alias);
                return Ok(());
            }
            (ColumnNames::Full, Some(table)) => {
                b.write_identifier(table);
                b.write_char('.');
            }
            _ => {}
        }
        b.write_identifier(&self.name);
        Ok(())
    }
}

/// `CAST(inner AS target)`.
#[derive(Debug, Clone)]
pub struct Cast {
    inner: Box<Expression>,
    target: String,
    kind: ExprKind,
}

impl Cast {
    pub(crate) fn new(inner: Expression, target: &str, kind: ExprKind) -> Self {
        Self {
            inner: Box::new(inner),
            target: String::from(target),
            kind,
        }
    }

    /// SQL type text of the cast target.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Re-kinds an expression without changing its SQL.
#[derive(Debug, Clone)]
pub struct TypeWrap {
    inner: Box<Expression>,
    kind: ExprKind,
}

impl TypeWrap {
    pub(crate) fn new(inner: Expression, kind: ExprKind) -> Self {
        Self {
            inner: Box::new(inner),
            kind,
        }
    }

    /// The wrapped expression.
    #[must_use]
    pub fn inner(&self) -> &Expression {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, PostgresDialect};

    fn render_pg(e: impl Into<Expression>) -> (String, Vec<SqlValue>) {
        let dialect = PostgresDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        e.into().write_sql(&mut b).unwrap();
        b.finish()
    }

    #[test]
    fn test_column_rendering() {
        let col = ColumnRef::new("users", "id", ExprKind::Integer);
        assert_eq!(render_pg(col.clone()).0, "users.id");
        assert_eq!(col.alias(), "users.id");

        let exported = col.exported("sub");
        assert_eq!(render_pg(exported.clone()).0, "sub.\"users.id\"");
        assert_eq!(exported.alias(), "users.id");
    }

    #[test]
    fn test_short_names() {
        let col = ColumnRef::new("users", "name", ExprKind::String);
        let dialect = PostgresDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        b.with_short_names(|b| col.write_sql(b)).unwrap();
        assert_eq!(b.as_str(), "name");
    }

    #[test]
    fn test_alias_names() {
        let col = ColumnRef::new("users", "name", ExprKind::String);
        let dialect = MySqlDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        b.with_alias_names(|b| col.write_sql(b)).unwrap();
        assert_eq!(b.as_str(), "\"users.name\"");
    }

    #[test]
    fn test_reserved_column_is_quoted_per_dialect() {
        let col = ColumnRef::new("orders", "order", ExprKind::Integer);
        let dialect = MySqlDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        col.write_sql(&mut b).unwrap();
        assert_eq!(b.as_str(), "orders.`order`");
    }

    #[test]
    fn test_type_wrap_emits_inner_only() {
        let wrapped: Expr<kind::Integer> = Expr::wrap(raw("extract(year from now())"));
        assert_eq!(wrapped.kind(), ExprKind::Integer);
        assert_eq!(render_pg(wrapped).0, "(extract(year from now()))");
    }

    #[test]
    fn test_empty_row_is_nil_operand() {
        let dialect = PostgresDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        let err = Expression::Row(vec![]).write_sql(&mut b).unwrap_err();
        assert_eq!(err.kind(), crate::FaultKind::NilOperand);
    }
}
