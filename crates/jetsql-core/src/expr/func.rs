//! SQL functions and keyword expressions.

use super::kind::{self, Kind, Numeric};
use super::operator::{Operator, OperatorForm};
use super::typed::{AnyExpr, BoolExpr, Expr, FloatExpr, IntExpr, RowExpr, TextExpr};
use super::{ExprKind, Expression};
use crate::error::Result;
use crate::render::{SqlBuilder, WriteSql};
use crate::statement::Query;
use crate::value::SqlValue;

/// A call `NAME([DISTINCT] arg, ...)`.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    name: String,
    args: Vec<Expression>,
    distinct: bool,
    kind: ExprKind,
}

impl FunctionCall {
    /// Creates a call of `name` with `args`.
    #[must_use]
    pub fn new(name: &str, args: Vec<Expression>, kind: ExprKind) -> Self {
        Self {
            name: String::from(name),
            args,
            distinct: false,
            kind,
        }
    }

    /// Adds `DISTINCT` before the arguments.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn args(&self) -> &[Expression] {
        &self.args
    }

    #[must_use]
    pub const fn kind(&self) -> ExprKind {
        self.kind
    }
}

impl WriteSql for FunctionCall {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        if !self.distinct {
            if let Some(render) = b.dialect().operator_override(&self.name) {
                return render(b, &self.args);
            }
        }
        b.write_str(&self.name);
        b.write_char('(');
        if self.distinct {
            b.write_str("DISTINCT ");
        }
        b.write_list(&self.args, ", ", |b, e| e.write_sql(b))?;
        b.write_char(')');
        Ok(())
    }
}

fn collect<I, T>(items: I) -> Vec<Expression>
where
    I: IntoIterator<Item = T>,
    T: Into<Expression>,
{
    items.into_iter().map(Into::into).collect()
}

/// Calls an arbitrary function, kinding the result as `K`.
#[must_use]
pub fn call<K, I, T>(name: &str, args: I) -> Expr<K>
where
    K: Kind,
    I: IntoIterator<Item = T>,
    T: Into<Expression>,
{
    Expr::from_expression(Expression::Function(FunctionCall::new(
        name,
        collect(args),
        K::KIND,
    )))
}

fn call1<K: Kind>(name: &str, arg: impl Into<Expression>) -> Expr<K> {
    call(name, [arg.into()])
}

/// `COUNT(expr)`
#[must_use]
pub fn count(e: impl Into<Expression>) -> IntExpr {
    call1("COUNT", e)
}

/// `COUNT(*)`
#[must_use]
pub fn count_star() -> IntExpr {
    call1("COUNT", Expression::Keyword("*"))
}

/// `COUNT(DISTINCT expr)`
#[must_use]
pub fn count_distinct(e: impl Into<Expression>) -> IntExpr {
    Expr::from_expression(Expression::Function(
        FunctionCall::new("COUNT", vec![e.into()], ExprKind::Integer).distinct(),
    ))
}

#[must_use]
pub fn sum<K: Numeric>(e: &Expr<K>) -> Expr<K> {
    call1("SUM", e)
}

#[must_use]
pub fn avg<K: Numeric>(e: &Expr<K>) -> FloatExpr {
    call1("AVG", e)
}

#[must_use]
pub fn min<K: Kind>(e: &Expr<K>) -> Expr<K> {
    call1("MIN", e)
}

#[must_use]
pub fn max<K: Kind>(e: &Expr<K>) -> Expr<K> {
    call1("MAX", e)
}

#[must_use]
pub fn abs<K: Numeric>(e: &Expr<K>) -> Expr<K> {
    call1("ABS", e)
}

/// `ROUND(e, places)`
#[must_use]
pub fn round(e: &FloatExpr, places: i64) -> FloatExpr {
    call("ROUND", [Expression::from(e), Expression::from(places)])
}

#[must_use]
pub fn lower(e: &TextExpr) -> TextExpr {
    call1("LOWER", e)
}

#[must_use]
pub fn upper(e: &TextExpr) -> TextExpr {
    call1("UPPER", e)
}

/// Character length of a string.
#[must_use]
pub fn length(e: &TextExpr) -> IntExpr {
    call1("LENGTH", e)
}

/// `COALESCE(a, b, ...)`
#[must_use]
pub fn coalesce<K, I>(items: I) -> Expr<K>
where
    K: Kind,
    I: IntoIterator<Item = Expr<K>>,
{
    call("COALESCE", items)
}

/// `NULLIF(a, b)`
#[must_use]
pub fn nullif<K: Kind>(a: &Expr<K>, b: impl Into<Expr<K>>) -> Expr<K> {
    let b: Expr<K> = b.into();
    call("NULLIF", [Expression::from(a), b.into_expression()])
}

/// `GREATEST(a, b, ...)`, spelled `MAX` on SQLite.
#[must_use]
pub fn greatest<K, I>(items: I) -> Expr<K>
where
    K: Kind,
    I: IntoIterator<Item = Expr<K>>,
{
    call("GREATEST", items)
}

/// `LEAST(a, b, ...)`, spelled `MIN` on SQLite.
#[must_use]
pub fn least<K, I>(items: I) -> Expr<K>
where
    K: Kind,
    I: IntoIterator<Item = Expr<K>>,
{
    call("LEAST", items)
}

#[must_use]
pub fn row_number() -> IntExpr {
    call("ROW_NUMBER", Vec::<Expression>::new())
}

#[must_use]
pub fn rank() -> IntExpr {
    call("RANK", Vec::<Expression>::new())
}

#[must_use]
pub fn dense_rank() -> IntExpr {
    call("DENSE_RANK", Vec::<Expression>::new())
}

/// `LAG(e, offset)`
#[must_use]
pub fn lag<K: Kind>(e: &Expr<K>, offset: i64) -> Expr<K> {
    call("LAG", [Expression::from(e), Expression::from(offset)])
}

/// `LEAD(e, offset)`
#[must_use]
pub fn lead<K: Kind>(e: &Expr<K>, offset: i64) -> Expr<K> {
    call("LEAD", [Expression::from(e), Expression::from(offset)])
}

fn variadic(symbol: &'static str, items: Vec<Expression>) -> BoolExpr {
    Expr::from_expression(Expression::Operator(Operator::new(
        symbol,
        OperatorForm::Variadic,
        items,
        ExprKind::Bool,
    )))
}

/// `(a AND b AND ...)` in one flat group. An empty list fails at render time.
#[must_use]
pub fn and_all<I, T>(items: I) -> BoolExpr
where
    I: IntoIterator<Item = T>,
    T: Into<BoolExpr>,
{
    let items = items
        .into_iter()
        .map(|i| Into::<BoolExpr>::into(i).into_expression())
        .collect();
    variadic("AND", items)
}

/// `(a OR b OR ...)` in one flat group. An empty list fails at render time.
#[must_use]
pub fn or_any<I, T>(items: I) -> BoolExpr
where
    I: IntoIterator<Item = T>,
    T: Into<BoolExpr>,
{
    let items = items
        .into_iter()
        .map(|i| Into::<BoolExpr>::into(i).into_expression())
        .collect();
    variadic("OR", items)
}

fn prefix_query(symbol: &'static str, query: impl Into<Query>) -> BoolExpr {
    Expr::from_expression(Expression::Operator(Operator::new(
        symbol,
        OperatorForm::Prefix,
        vec![Expression::subquery(query)],
        ExprKind::Bool,
    )))
}

/// `(EXISTS (sub-query))`
#[must_use]
pub fn exists(query: impl Into<Query>) -> BoolExpr {
    prefix_query("EXISTS", query)
}

/// `(NOT EXISTS (sub-query))`
#[must_use]
pub fn not_exists(query: impl Into<Query>) -> BoolExpr {
    prefix_query("NOT EXISTS", query)
}

/// Row constructor `(a, b, ...)`.
#[must_use]
pub fn row<I, T>(items: I) -> RowExpr
where
    I: IntoIterator<Item = T>,
    T: Into<Expression>,
{
    Expr::from_expression(Expression::Row(collect(items)))
}

/// A bound SQL `NULL`, usable as any kind.
#[must_use]
pub fn null<K: Kind>() -> Expr<K> {
    Expr::from_expression(Expression::value(SqlValue::Null))
}

/// `*`
#[must_use]
pub fn star() -> AnyExpr {
    Expr::from_expression(Expression::Keyword("*"))
}

/// The `DEFAULT` keyword, for INSERT values and SET.
#[must_use]
pub fn default_value<K: Kind>() -> Expr<K> {
    Expr::from_expression(Expression::Keyword("DEFAULT"))
}

#[must_use]
pub fn current_date() -> Expr<kind::Date> {
    Expr::from_expression(Expression::Keyword("CURRENT_DATE"))
}

#[must_use]
pub fn current_timestamp() -> Expr<kind::Timestamp> {
    Expr::from_expression(Expression::Keyword("CURRENT_TIMESTAMP"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, PostgresDialect};
    use crate::expr::{int, lit};

    fn render(e: impl Into<Expression>) -> String {
        let dialect = PostgresDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        e.into().write_sql(&mut b).unwrap();
        b.finish().0
    }

    #[test]
    fn test_aggregates() {
        assert_eq!(render(count_star()), "COUNT(*)");
        assert_eq!(render(count_distinct(lit("a"))), "COUNT(DISTINCT $1)");
        assert_eq!(render(sum(&int(1))), "SUM($1)");
    }

    #[test]
    fn test_greatest_is_native_outside_sqlite() {
        let dialect = MySqlDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        Expression::from(greatest(vec![int(1), int(2)]))
            .write_sql(&mut b)
            .unwrap();
        assert_eq!(b.as_str(), "GREATEST(?, ?)");
    }

    #[test]
    fn test_coalesce_accepts_plain_values() {
        let e: IntExpr = coalesce([int(1).add(1), int(0)]);
        assert_eq!(render(e), "COALESCE(($1 + $2), $3)");
    }

    #[test]
    fn test_keywords() {
        assert_eq!(render(current_date()), "CURRENT_DATE");
        assert_eq!(render(default_value::<kind::Integer>()), "DEFAULT");
        assert_eq!(render(star()), "*");
    }

    #[test]
    fn test_row_constructor() {
        assert_eq!(render(row([int(1), int(2)])), "($1, $2)");
    }
}
