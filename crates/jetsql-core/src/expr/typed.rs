//! Kind-tagged expressions.

use std::marker::PhantomData;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use super::kind::{self, Kind, Numeric, Temporal};
use super::operator::{Operator, OperatorForm};
use super::window::{WindowCall, WindowRef, WindowSpec};
use super::{Cast, ExprKind, Expression, Raw, TypeWrap};
use crate::clause::{OrderByItem, Projection};
use crate::error::{BuildError, Result};
use crate::statement::Query;
use crate::value::{SqlValue, ToSqlValue};

/// An expression whose value category is known at compile time.
///
/// Methods borrow `self` and return new nodes, so columns and stored
/// expressions can be reused across statements.
#[derive(Debug, Clone)]
pub struct Expr<K> {
    inner: Expression,
    _kind: PhantomData<K>,
}

pub type AnyExpr = Expr<kind::Any>;
pub type BoolExpr = Expr<kind::Bool>;
pub type IntExpr = Expr<kind::Integer>;
pub type FloatExpr = Expr<kind::Float>;
pub type TextExpr = Expr<kind::Text>;
pub type BlobExpr = Expr<kind::Blob>;
pub type DateExpr = Expr<kind::Date>;
pub type TimeExpr = Expr<kind::Time>;
pub type TimestampExpr = Expr<kind::Timestamp>;
pub type IntervalExpr = Expr<kind::Interval>;
pub type RowExpr = Expr<kind::Row>;

impl<K: Kind> Expr<K> {
    pub(crate) const fn from_expression(inner: Expression) -> Self {
        Self {
            inner,
            _kind: PhantomData,
        }
    }

    /// Re-kinds any expression as `K` without changing the emitted SQL.
    #[must_use]
    pub fn wrap(e: impl Into<Expression>) -> Self {
        Self::from_expression(Expression::TypeWrap(TypeWrap::new(e.into(), K::KIND)))
    }

    /// The underlying untyped node.
    #[must_use]
    pub const fn as_expression(&self) -> &Expression {
        &self.inner
    }

    /// Consumes the wrapper, returning the untyped node.
    #[must_use]
    pub fn into_expression(self) -> Expression {
        self.inner
    }

    /// The value category of `K`.
    #[must_use]
    pub const fn kind(&self) -> ExprKind {
        K::KIND
    }

    fn binary<R: Kind>(&self, symbol: &'static str, rhs: Expression) -> Expr<R> {
        Expr::from_expression(Expression::Operator(Operator::binary(
            symbol,
            self.inner.clone(),
            rhs,
            R::KIND,
        )))
    }

    fn postfix(&self, symbol: &'static str) -> BoolExpr {
        Expr::from_expression(Expression::Operator(Operator::new(
            symbol,
            OperatorForm::Postfix,
            vec![self.inner.clone()],
            ExprKind::Bool,
        )))
    }

    fn membership<I, T>(&self, symbol: &'static str, items: I) -> BoolExpr
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        let mut operands = vec![self.inner.clone()];
        operands.extend(items.into_iter().map(|item| item.into().inner));
        Expr::from_expression(Expression::Operator(Operator::new(
            symbol,
            OperatorForm::In,
            operands,
            ExprKind::Bool,
        )))
    }

    fn range(&self, symbol: &'static str, low: Self, high: Self) -> BoolExpr {
        Expr::from_expression(Expression::Operator(Operator::new(
            symbol,
            OperatorForm::Between,
            vec![self.inner.clone(), low.inner, high.inner],
            ExprKind::Bool,
        )))
    }

    /// `(self = rhs)`
    #[must_use]
    pub fn eq(&self, rhs: impl Into<Self>) -> BoolExpr {
        self.binary("=", rhs.into().inner)
    }

    /// `(self != rhs)`
    #[must_use]
    pub fn not_eq(&self, rhs: impl Into<Self>) -> BoolExpr {
        self.binary("!=", rhs.into().inner)
    }

    /// `(self < rhs)`
    #[must_use]
    pub fn lt(&self, rhs: impl Into<Self>) -> BoolExpr {
        self.binary("<", rhs.into().inner)
    }

    /// `(self <= rhs)`
    #[must_use]
    pub fn lt_eq(&self, rhs: impl Into<Self>) -> BoolExpr {
        self.binary("<=", rhs.into().inner)
    }

    /// `(self > rhs)`
    #[must_use]
    pub fn gt(&self, rhs: impl Into<Self>) -> BoolExpr {
        self.binary(">", rhs.into().inner)
    }

    /// `(self >= rhs)`
    #[must_use]
    pub fn gt_eq(&self, rhs: impl Into<Self>) -> BoolExpr {
        self.binary(">=", rhs.into().inner)
    }

    /// Null-safe inequality.
    #[must_use]
    pub fn is_distinct_from(&self, rhs: impl Into<Self>) -> BoolExpr {
        self.binary("IS DISTINCT FROM", rhs.into().inner)
    }

    /// Null-safe equality.
    #[must_use]
    pub fn is_not_distinct_from(&self, rhs: impl Into<Self>) -> BoolExpr {
        self.binary("IS NOT DISTINCT FROM", rhs.into().inner)
    }

    #[must_use]
    pub fn is_null(&self) -> BoolExpr {
        self.postfix("IS NULL")
    }

    #[must_use]
    pub fn is_not_null(&self) -> BoolExpr {
        self.postfix("IS NOT NULL")
    }

    /// `(self IN (a, b, ...))`. An empty list fails at render time.
    #[must_use]
    pub fn in_list<I, T>(&self, items: I) -> BoolExpr
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        self.membership("IN", items)
    }

    /// `(self NOT IN (a, b, ...))`
    #[must_use]
    pub fn not_in_list<I, T>(&self, items: I) -> BoolExpr
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        self.membership("NOT IN", items)
    }

    /// `(self IN (sub-query))`
    #[must_use]
    pub fn in_query(&self, query: impl Into<Query>) -> BoolExpr {
        self.membership("IN", [Self::from_expression(Expression::subquery(query))])
    }

    /// `(self NOT IN (sub-query))`
    #[must_use]
    pub fn not_in_query(&self, query: impl Into<Query>) -> BoolExpr {
        self.membership("NOT IN", [Self::from_expression(Expression::subquery(query))])
    }

    /// `(self BETWEEN low AND high)`
    #[must_use]
    pub fn between(&self, low: impl Into<Self>, high: impl Into<Self>) -> BoolExpr {
        self.range("BETWEEN", low.into(), high.into())
    }

    /// `(self NOT BETWEEN low AND high)`
    #[must_use]
    pub fn not_between(&self, low: impl Into<Self>, high: impl Into<Self>) -> BoolExpr {
        self.range("NOT BETWEEN", low.into(), high.into())
    }

    /// Casts to the SQL type `target`, re-kinding the result as `T`.
    #[must_use]
    pub fn cast<T: Kind>(&self, target: &str) -> Expr<T> {
        Expr::from_expression(Expression::Cast(Cast::new(
            self.inner.clone(),
            target,
            T::KIND,
        )))
    }

    /// Projects this expression under `alias`.
    #[must_use]
    pub fn as_(&self, alias: &str) -> Projection {
        Projection::aliased(self.inner.clone(), alias)
    }

    #[must_use]
    pub fn asc(&self) -> OrderByItem {
        OrderByItem::asc(self.inner.clone())
    }

    #[must_use]
    pub fn desc(&self) -> OrderByItem {
        OrderByItem::desc(self.inner.clone())
    }

    /// `self OVER (spec)`
    #[must_use]
    pub fn over(&self, spec: WindowSpec) -> Self {
        Self::from_expression(Expression::Over(WindowCall::new(
            self.inner.clone(),
            WindowRef::Spec(spec),
            K::KIND,
        )))
    }

    /// `self OVER name`, referencing a window from the WINDOW clause.
    #[must_use]
    pub fn over_named(&self, name: &str) -> Self {
        Self::from_expression(Expression::Over(WindowCall::new(
            self.inner.clone(),
            WindowRef::Named(String::from(name)),
            K::KIND,
        )))
    }
}

impl<K: Numeric> Expr<K> {
    #[must_use]
    pub fn add(&self, rhs: impl Into<Self>) -> Self {
        self.binary("+", rhs.into().inner)
    }

    #[must_use]
    pub fn sub(&self, rhs: impl Into<Self>) -> Self {
        self.binary("-", rhs.into().inner)
    }

    #[must_use]
    pub fn mul(&self, rhs: impl Into<Self>) -> Self {
        self.binary("*", rhs.into().inner)
    }

    /// `(self / rhs)`; MySQL spells integer division `DIV`.
    #[must_use]
    pub fn div(&self, rhs: impl Into<Self>) -> Self {
        self.binary("/", rhs.into().inner)
    }

    /// `(self % rhs)`
    #[must_use]
    pub fn modulo(&self, rhs: impl Into<Self>) -> Self {
        self.binary("%", rhs.into().inner)
    }

    /// `(- self)`
    #[must_use]
    pub fn neg(&self) -> Self {
        Self::from_expression(Expression::Operator(Operator::new(
            "-",
            OperatorForm::Prefix,
            vec![self.inner.clone()],
            K::KIND,
        )))
    }
}

impl Expr<kind::Integer> {
    #[must_use]
    pub fn bit_and(&self, rhs: impl Into<Self>) -> Self {
        self.binary("&", rhs.into().inner)
    }

    #[must_use]
    pub fn bit_or(&self, rhs: impl Into<Self>) -> Self {
        self.binary("|", rhs.into().inner)
    }

    /// Bitwise exclusive or, spelled `#` natively.
    #[must_use]
    pub fn bit_xor(&self, rhs: impl Into<Self>) -> Self {
        self.binary("#", rhs.into().inner)
    }

    #[must_use]
    pub fn bit_not(&self) -> Self {
        Self::from_expression(Expression::Operator(Operator::new(
            "~",
            OperatorForm::Prefix,
            vec![self.inner.clone()],
            ExprKind::Integer,
        )))
    }

    #[must_use]
    pub fn shl(&self, rhs: impl Into<Self>) -> Self {
        self.binary("<<", rhs.into().inner)
    }

    #[must_use]
    pub fn shr(&self, rhs: impl Into<Self>) -> Self {
        self.binary(">>", rhs.into().inner)
    }
}

impl Expr<kind::Bool> {
    #[must_use]
    pub fn and(&self, rhs: impl Into<Self>) -> Self {
        self.binary("AND", rhs.into().inner)
    }

    #[must_use]
    pub fn or(&self, rhs: impl Into<Self>) -> Self {
        self.binary("OR", rhs.into().inner)
    }

    #[must_use]
    pub fn not(&self) -> Self {
        Self::from_expression(Expression::Operator(Operator::new(
            "NOT",
            OperatorForm::Prefix,
            vec![self.inner.clone()],
            ExprKind::Bool,
        )))
    }

    #[must_use]
    pub fn is_true(&self) -> Self {
        self.postfix("IS TRUE")
    }

    #[must_use]
    pub fn is_not_true(&self) -> Self {
        self.postfix("IS NOT TRUE")
    }

    #[must_use]
    pub fn is_false(&self) -> Self {
        self.postfix("IS FALSE")
    }

    #[must_use]
    pub fn is_not_false(&self) -> Self {
        self.postfix("IS NOT FALSE")
    }

    #[must_use]
    pub fn is_unknown(&self) -> Self {
        self.postfix("IS UNKNOWN")
    }
}

impl Expr<kind::Text> {
    /// `(self || rhs)`
    #[must_use]
    pub fn concat(&self, rhs: impl Into<Self>) -> Self {
        self.binary("||", rhs.into().inner)
    }

    #[must_use]
    pub fn like(&self, pattern: impl Into<Self>) -> BoolExpr {
        self.binary("LIKE", pattern.into().inner)
    }

    #[must_use]
    pub fn not_like(&self, pattern: impl Into<Self>) -> BoolExpr {
        self.binary("NOT LIKE", pattern.into().inner)
    }

    /// Regular expression match.
    ///
    /// Each dialect has its own spelling; SQLite has no case-insensitive
    /// form and fails at render time when `case_sensitive` is false.
    #[must_use]
    pub fn regexp_like(&self, pattern: impl Into<Self>, case_sensitive: bool) -> BoolExpr {
        let symbol = if case_sensitive {
            "REGEXP_LIKE"
        } else {
            "REGEXP_LIKE_CI"
        };
        self.binary(symbol, pattern.into().inner)
    }

    #[must_use]
    pub fn not_regexp_like(&self, pattern: impl Into<Self>, case_sensitive: bool) -> BoolExpr {
        let symbol = if case_sensitive {
            "NOT REGEXP_LIKE"
        } else {
            "NOT REGEXP_LIKE_CI"
        };
        self.binary(symbol, pattern.into().inner)
    }
}

impl<K: Temporal> Expr<K> {
    /// `(self + interval)`
    #[must_use]
    pub fn add_interval(&self, interval: &IntervalExpr) -> Self {
        self.binary("+", interval.inner.clone())
    }

    /// `(self - interval)`
    #[must_use]
    pub fn sub_interval(&self, interval: &IntervalExpr) -> Self {
        self.binary("-", interval.inner.clone())
    }
}

impl<K: Kind> From<Expr<K>> for Expression {
    fn from(e: Expr<K>) -> Self {
        e.inner
    }
}

impl<K: Kind> From<&Expr<K>> for Expression {
    fn from(e: &Expr<K>) -> Self {
        e.inner.clone()
    }
}

impl<K: Kind> From<&Expr<K>> for Expr<K> {
    fn from(e: &Expr<K>) -> Self {
        e.clone()
    }
}

impl<K: Kind> From<Raw> for Expr<K> {
    fn from(raw: Raw) -> Self {
        Self::wrap(raw)
    }
}

impl<K: Kind> From<Query> for Expr<K> {
    fn from(query: Query) -> Self {
        Self::wrap(Expression::subquery(query))
    }
}

/// Rust values that can appear as literals, and the kind they produce.
pub trait LiteralValue: ToSqlValue {
    type Kind: Kind;

    /// Whether the literal needs an explicit SQL type.
    const TYPED: bool = false;
}

macro_rules! impl_literal_value {
    ($kind:ty => $($ty:ty),+ $(,)?) => {
        $(
            impl LiteralValue for $ty {
                type Kind = $kind;
            }

            impl From<$ty> for Expr<$kind> {
                fn from(value: $ty) -> Self {
                    lit(value)
                }
            }
        )+
    };
}

impl_literal_value!(kind::Bool => bool);
impl_literal_value!(kind::Integer => i8, i16, i32, i64, u8, u16, u32);
impl_literal_value!(kind::Float => f32, f64);
impl_literal_value!(kind::Text => &str, String, &String);
impl_literal_value!(kind::Blob => Vec<u8>, &[u8]);

macro_rules! impl_temporal_literal {
    ($($ty:ty => $kind:ty),+ $(,)?) => {
        $(
            impl LiteralValue for $ty {
                type Kind = $kind;
                const TYPED: bool = true;
            }

            impl From<$ty> for Expr<$kind> {
                fn from(value: $ty) -> Self {
                    lit(value)
                }
            }
        )+
    };
}

impl_temporal_literal!(
    NaiveDate => kind::Date,
    NaiveTime => kind::Time,
    NaiveDateTime => kind::Timestamp,
);

impl<Tz: TimeZone> LiteralValue for DateTime<Tz> {
    type Kind = kind::Timestamp;
    const TYPED: bool = true;
}

impl<T: LiteralValue> LiteralValue for Option<T> {
    type Kind = T::Kind;
    const TYPED: bool = T::TYPED;
}

macro_rules! impl_float_from_int {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Expr<kind::Float> {
                fn from(value: $ty) -> Self {
                    Self::from_expression(Expression::value(value.to_sql_value()))
                }
            }
        )+
    };
}

impl_float_from_int!(i8, i16, i32, i64, u8, u16, u32);

/// A literal bound as an argument, kinded by its Rust type.
///
/// Dates, times and timestamps render with their SQL type made explicit.
#[must_use]
pub fn lit<T: LiteralValue>(value: T) -> Expr<T::Kind> {
    let value = value.to_sql_value();
    let inner = if T::TYPED {
        Expression::typed_value(value)
    } else {
        Expression::value(value)
    };
    Expr::from_expression(inner)
}

/// An integer literal.
#[must_use]
pub fn int(value: i64) -> IntExpr {
    lit(value)
}

/// A boolean literal.
#[must_use]
pub fn bool_lit(value: bool) -> BoolExpr {
    lit(value)
}

/// A date literal parsed from `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns [`BuildError::MalformedLiteral`] when `text` is not a valid date.
pub fn date_str(text: &str) -> Result<DateExpr> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(lit)
        .map_err(|e| BuildError::malformed("date", text, e.to_string()))
}

/// A time literal parsed from `HH:MM:SS[.fraction]`.
///
/// # Errors
///
/// Returns [`BuildError::MalformedLiteral`] when `text` is not a valid time.
pub fn time_str(text: &str) -> Result<TimeExpr> {
    NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
        .map(lit)
        .map_err(|e| BuildError::malformed("time", text, e.to_string()))
}

/// A timestamp literal.
///
/// Accepts RFC 3339 text with an offset, or `YYYY-MM-DD HH:MM:SS[.fraction]`
/// with either a space or `T` separator.
///
/// # Errors
///
/// Returns [`BuildError::MalformedLiteral`] when no format matches.
pub fn timestamp_str(text: &str) -> Result<TimestampExpr> {
    if let Ok(with_zone) = DateTime::parse_from_rfc3339(text) {
        return Ok(Expr::from_expression(Expression::typed_value(
            SqlValue::TimestampTz(with_zone),
        )));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(lit)
        .map_err(|e| BuildError::malformed("timestamp", text, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, PostgresDialect};
    use crate::render::{SqlBuilder, WriteSql};
    use crate::FaultKind;

    fn render(e: impl Into<Expression>) -> (String, Vec<SqlValue>) {
        let dialect = PostgresDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        e.into().write_sql(&mut b).unwrap();
        b.finish()
    }

    #[test]
    fn test_literal_kinds() {
        assert_eq!(lit(1).kind(), ExprKind::Integer);
        assert_eq!(lit(1.5).kind(), ExprKind::Float);
        assert_eq!(lit("x").kind(), ExprKind::String);
        assert_eq!(lit(vec![1_u8]).kind(), ExprKind::Blob);
        assert_eq!(lit(true).kind(), ExprKind::Bool);
    }

    #[test]
    fn test_arguments_follow_emission_order() {
        let e = int(1).add(2).mul(int(3).sub(4)).gt(5);
        let (sql, args) = render(e);
        assert_eq!(sql, "((($1 + $2) * ($3 - $4)) > $5)");
        assert_eq!(args, (1..=5).map(SqlValue::Int).collect::<Vec<_>>());
    }

    #[test]
    fn test_float_accepts_integer_operands() {
        let (sql, args) = render(lit(1.5).add(2));
        assert_eq!(sql, "($1 + $2)");
        assert_eq!(args, vec![SqlValue::Float(1.5), SqlValue::Int(2)]);
    }

    #[test]
    fn test_boolean_logic() {
        let e = int(1).eq(1).and(int(2).lt(3).or(bool_lit(false))).not();
        assert_eq!(render(e).0, "(NOT (($1 = $2) AND (($3 < $4) OR $5)))");
    }

    #[test]
    fn test_text_operators() {
        assert_eq!(render(lit("a").like("a%")).0, "($1 LIKE $2)");
        assert_eq!(render(lit("a").concat("b")).0, "($1 || $2)");
    }

    #[test]
    fn test_cast_rekinds() {
        let e = lit("42").cast::<kind::Integer>("INTEGER");
        assert_eq!(e.kind(), ExprKind::Integer);
        let dialect = MySqlDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        Expression::from(e).write_sql(&mut b).unwrap();
        assert_eq!(b.as_str(), "CAST(? AS INTEGER)");
    }

    #[test]
    fn test_date_str_parses_and_rejects() {
        let date = date_str("2024-02-29").unwrap();
        assert_eq!(render(date).0, "$1::date");
        let err = date_str("2023-02-29").unwrap_err();
        assert_eq!(err.kind(), FaultKind::MalformedLiteral);
    }

    #[test]
    fn test_time_and_timestamp_str() {
        assert!(time_str("10:30:00").is_ok());
        assert!(time_str("25:00:00").is_err());
        assert_eq!(render(timestamp_str("2024-01-01 10:00:00").unwrap()).0, "$1::timestamp");
        assert_eq!(
            render(timestamp_str("2024-01-01T10:00:00+02:00").unwrap()).0,
            "$1::timestamptz"
        );
        assert_eq!(
            timestamp_str("yesterday").unwrap_err().kind(),
            FaultKind::MalformedLiteral
        );
    }

    #[test]
    fn test_expressions_are_reusable() {
        let base = int(10);
        let first = base.add(1);
        let second = base.add(2);
        assert_eq!(render(first).1, vec![SqlValue::Int(10), SqlValue::Int(1)]);
        assert_eq!(render(second).1, vec![SqlValue::Int(10), SqlValue::Int(2)]);
    }
}
