use super::set_op::{SetOperation, SetOperator};
use super::Query;
use crate::clause::{
    self, IntoOrderBy, IntoProjections, IntoValues, OrderByItem, Projection, RowLock,
};
use crate::dialect::Feature;
use crate::error::{BuildError, Result};
use crate::expr::{BoolExpr, Expression, WindowSpec};
use crate::render::{SqlBuilder, WriteSql};
use crate::table::{FromItem, ReadableTable, SubqueryTable};
use crate::value::SqlValue;

/// `DISTINCT` variants of a SELECT.
#[derive(Debug, Clone, Default)]
pub enum Distinct {
    #[default]
    All,
    Distinct,
    /// PostgreSQL `DISTINCT ON (...)`.
    On(Vec<Expression>),
}

/// `FETCH FIRST n ROWS ONLY | WITH TIES`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fetch {
    pub count: i64,
    pub with_ties: bool,
}

/// A SELECT statement.
///
/// Clauses render in a fixed order regardless of the order the builder
/// methods were called in.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct SelectStatement {
    distinct: Distinct,
    projections: Vec<Projection>,
    from: Option<FromItem>,
    where_clause: Option<Expression>,
    group_by: Vec<Expression>,
    having: Option<Expression>,
    windows: Vec<(String, WindowSpec)>,
    order_by: Vec<OrderByItem>,
    limit: Option<i64>,
    offset: Option<i64>,
    fetch: Option<Fetch>,
    lock: Option<RowLock>,
}

/// `SELECT projections`
pub fn select(projections: impl IntoProjections) -> SelectStatement {
    SelectStatement::new(projections)
}

impl SelectStatement {
    pub fn new(projections: impl IntoProjections) -> Self {
        Self {
            projections: projections.into_projections(),
            ..Self::default()
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = Distinct::Distinct;
        self
    }

    /// `DISTINCT ON (exprs)`; PostgreSQL only.
    pub fn distinct_on(mut self, exprs: impl IntoValues) -> Self {
        self.distinct = Distinct::On(exprs.into_values());
        self
    }

    pub fn from(mut self, source: &impl ReadableTable) -> Self {
        self.from = Some(source.from_item());
        self
    }

    pub fn where_clause(mut self, predicate: impl Into<BoolExpr>) -> Self {
        self.where_clause = Some(predicate.into().into_expression());
        self
    }

    pub fn group_by(mut self, exprs: impl IntoValues) -> Self {
        self.group_by = exprs.into_values();
        self
    }

    pub fn having(mut self, predicate: impl Into<BoolExpr>) -> Self {
        self.having = Some(predicate.into().into_expression());
        self
    }

    /// Declares the named window `name`; repeated calls accumulate.
    pub fn window(mut self, name: &str, spec: WindowSpec) -> Self {
        self.windows.push((String::from(name), spec));
        self
    }

    pub fn order_by(mut self, items: impl IntoOrderBy) -> Self {
        self.order_by = items.into_order_by();
        self
    }

    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub const fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// `FETCH FIRST count ROWS ONLY`
    pub const fn fetch_first(mut self, count: i64) -> Self {
        self.fetch = Some(Fetch {
            count,
            with_ties: false,
        });
        self
    }

    /// `FETCH FIRST count ROWS WITH TIES`
    pub const fn fetch_first_with_ties(mut self, count: i64) -> Self {
        self.fetch = Some(Fetch {
            count,
            with_ties: true,
        });
        self
    }

    /// `FOR UPDATE` and friends, or `LOCK IN SHARE MODE`.
    pub fn row_lock(mut self, lock: RowLock) -> Self {
        self.lock = Some(lock);
        self
    }

    /// Uses this query as a FROM item named `alias`.
    pub fn as_table(self, alias: &str) -> SubqueryTable {
        SubqueryTable::new(self, alias)
    }

    pub fn union(self, other: impl Into<Query>) -> SetOperation {
        SetOperation::new(SetOperator::Union, false, vec![self.into(), other.into()])
    }

    pub fn union_all(self, other: impl Into<Query>) -> SetOperation {
        SetOperation::new(SetOperator::Union, true, vec![self.into(), other.into()])
    }

    pub fn intersect(self, other: impl Into<Query>) -> SetOperation {
        SetOperation::new(SetOperator::Intersect, false, vec![self.into(), other.into()])
    }

    pub fn except(self, other: impl Into<Query>) -> SetOperation {
        SetOperation::new(SetOperator::Except, false, vec![self.into(), other.into()])
    }

    #[must_use]
    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    pub(crate) const fn has_tail(&self) -> bool {
        !self.order_by.is_empty()
            || self.limit.is_some()
            || self.offset.is_some()
            || self.fetch.is_some()
            || self.lock.is_some()
    }

    fn write_head(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        if self.projections.is_empty() {
            return Err(BuildError::nil_operand("SELECT without projections"));
        }
        b.write_str("SELECT ");
        match &self.distinct {
            Distinct::All => {}
            Distinct::Distinct => b.write_str("DISTINCT "),
            Distinct::On(exprs) => {
                b.dialect().require(Feature::DistinctOn)?;
                if exprs.is_empty() {
                    return Err(BuildError::nil_operand("DISTINCT ON without expressions"));
                }
                b.write_str("DISTINCT ON (");
                b.write_list(exprs, ", ", |b, e| e.write_sql(b))?;
                b.write_str(") ");
            }
        }
        clause::write_projections(b, &self.projections)
    }

    fn write_windows(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        if self.windows.is_empty() {
            return Ok(());
        }
        b.new_line();
        b.write_str("WINDOW ");
        b.write_list(&self.windows, ", ", |b, (name, spec)| {
            b.write_identifier(name);
            b.write_str(" AS (");
            spec.write_sql(b)?;
            b.write_char(')');
            Ok(())
        })
    }

    fn write_fetch(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        let Some(fetch) = self.fetch else {
            return Ok(());
        };
        b.dialect().require(Feature::FetchFirst)?;
        if fetch.with_ties {
            b.dialect().require(Feature::WithTies)?;
        }
        b.new_line();
        b.write_str("FETCH FIRST ");
        b.bind_argument(SqlValue::Int(fetch.count));
        b.write_str(if fetch.with_ties {
            " ROWS WITH TIES"
        } else {
            " ROWS ONLY"
        });
        Ok(())
    }
}

/// Writes `LIMIT`/`OFFSET` for SELECT and set operations.
pub(crate) fn write_limit_offset(
    b: &mut SqlBuilder<'_>,
    limit: Option<i64>,
    offset: Option<i64>,
) {
    match (limit, offset) {
        (Some(limit), _) => {
            b.new_line();
            b.write_str("LIMIT ");
            b.bind_argument(SqlValue::Int(limit));
        }
        (None, Some(_)) => {
            if let Some(all) = b.dialect().offset_without_limit() {
                b.new_line();
                b.write_str("LIMIT ");
                b.write_str(all);
            }
        }
        (None, None) => {}
    }
    if let Some(offset) = offset {
        b.new_line();
        b.write_str("OFFSET ");
        b.bind_argument(SqlValue::Int(offset));
    }
}

impl WriteSql for SelectStatement {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        self.write_head(b)?;
        if let Some(from) = &self.from {
            b.new_line();
            b.write_str("FROM ");
            from.write_sql(b)?;
        }
        clause::write_optional_clause(b, "WHERE", self.where_clause.as_ref())?;
        clause::write_list_clause(b, "GROUP BY", &self.group_by)?;
        clause::write_optional_clause(b, "HAVING", self.having.as_ref())?;
        self.write_windows(b)?;
        clause::write_list_clause(b, "ORDER BY", &self.order_by)?;
        write_limit_offset(b, self.limit, self.offset);
        self.write_fetch(b)?;
        if let Some(lock) = &self.lock {
            b.new_line();
            lock.write_sql(b)?;
        }
        Ok(())
    }
}

impl super::Statement for SelectStatement {}

impl IntoValues for SelectStatement {
    fn into_values(self) -> Vec<Expression> {
        vec![Expression::subquery(self)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, PostgresDialect, SqliteDialect};
    use crate::expr::func::{count_star, row_number, sum};
    use crate::expr::kind::{Integer, Text};
    use crate::expr::window;
    use crate::statement::Statement;
    use crate::table::{Column, Table, TableSource};
    use crate::expr::ExprKind;
    use crate::FaultKind;

    struct Orders {
        table: Table,
        id: Column<Integer>,
        customer: Column<Text>,
        amount: Column<Integer>,
    }

    impl Orders {
        fn new() -> Self {
            Self {
                table: Table::new(
                    None,
                    "orders",
                    &[
                        ("id", ExprKind::Integer),
                        ("customer", ExprKind::String),
                        ("amount", ExprKind::Integer),
                    ],
                ),
                id: Column::new("orders", "id"),
                customer: Column::new("orders", "customer"),
                amount: Column::new("orders", "amount"),
            }
        }
    }

    impl TableSource for Orders {
        fn table(&self) -> &Table {
            &self.table
        }
    }

    #[test]
    fn test_clause_order() {
        let o = Orders::new();
        let stmt = o
            .select((&o.customer, sum(&o.amount).as_("total")))
            .order_by(o.customer.asc())
            .limit(10)
            .having(sum(&o.amount).gt(100))
            .group_by(&o.customer)
            .where_clause(o.amount.gt(0))
            .offset(5);
        let (sql, args) = stmt.sql(&PostgresDialect::new()).unwrap();
        assert_eq!(
            sql,
            "SELECT orders.customer AS \"orders.customer\",\n       \
             SUM(orders.amount) AS \"total\"\n\
             FROM orders\n\
             WHERE (orders.amount > $1)\n\
             GROUP BY orders.customer\n\
             HAVING (SUM(orders.amount) > $2)\n\
             ORDER BY orders.customer ASC\n\
             LIMIT $3\n\
             OFFSET $4;"
        );
        assert_eq!(
            args,
            vec![
                SqlValue::Int(0),
                SqlValue::Int(100),
                SqlValue::Int(10),
                SqlValue::Int(5)
            ]
        );
    }

    #[test]
    fn test_offset_without_limit() {
        let o = Orders::new();
        let stmt = o.select(&o.id).offset(3);
        assert!(stmt
            .debug_sql(&MySqlDialect::new())
            .unwrap()
            .ends_with("\nLIMIT 18446744073709551615\nOFFSET 3;"));
        assert!(stmt
            .debug_sql(&SqliteDialect::new())
            .unwrap()
            .ends_with("\nLIMIT -1\nOFFSET 3;"));
        assert!(stmt
            .debug_sql(&PostgresDialect::new())
            .unwrap()
            .ends_with("FROM orders\nOFFSET 3;"));
    }

    #[test]
    fn test_distinct_on_and_fetch_are_postgres_only() {
        let o = Orders::new();
        let stmt = o
            .select(&o.customer)
            .distinct_on(&o.customer)
            .fetch_first_with_ties(3)
            .order_by(o.customer.asc());
        let sql = stmt.debug_sql(&PostgresDialect::new()).unwrap();
        assert!(sql.starts_with("SELECT DISTINCT ON (orders.customer) orders.customer"));
        assert!(sql.ends_with("\nFETCH FIRST 3 ROWS WITH TIES;"));
        let err = stmt.sql(&MySqlDialect::new()).unwrap_err();
        assert_eq!(err.kind(), FaultKind::Unsupported);
    }

    #[test]
    fn test_named_window() {
        let o = Orders::new();
        let stmt = o
            .select(row_number().over_named("w").as_("n"))
            .window("w", window().partition_by([&o.customer]).order_by(o.id.desc()));
        let sql = stmt.debug_sql(&SqliteDialect::new()).unwrap();
        assert!(sql.contains("ROW_NUMBER() OVER w AS \"n\""));
        assert!(sql.ends_with(
            "\nWINDOW w AS (PARTITION BY orders.customer ORDER BY orders.id DESC);"
        ));
    }

    #[test]
    fn test_row_lock_goes_last() {
        let o = Orders::new();
        let stmt = o
            .select(count_star())
            .where_clause(o.id.eq(1))
            .row_lock(RowLock::update().nowait());
        let sql = stmt.debug_sql(&MySqlDialect::new()).unwrap();
        assert!(sql.ends_with("WHERE (orders.id = 1)\nFOR UPDATE NOWAIT;"));
        assert!(stmt.sql(&SqliteDialect::new()).is_err());
    }

    #[test]
    fn test_empty_projection_is_nil_operand() {
        let err = select(Vec::<Projection>::new())
            .sql(&PostgresDialect::new())
            .unwrap_err();
        assert_eq!(err.kind(), FaultKind::NilOperand);
    }
}
