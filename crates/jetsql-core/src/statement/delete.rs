use super::select::write_limit_offset;
use crate::clause::{self, IntoOrderBy, IntoProjections, OrderByItem, Projection};
use crate::dialect::Feature;
use crate::error::{BuildError, Result};
use crate::expr::{BoolExpr, Expression};
use crate::render::{SqlBuilder, WriteSql};
use crate::table::{FromItem, ReadableTable, Table};

/// A DELETE statement. Rendering fails without a WHERE clause.
#[derive(Debug, Clone)]
#[must_use]
pub struct DeleteStatement {
    table: Table,
    using: Option<FromItem>,
    where_clause: Option<Expression>,
    order_by: Vec<OrderByItem>,
    limit: Option<i64>,
    returning: Vec<Projection>,
}

impl DeleteStatement {
    pub const fn new(table: Table) -> Self {
        Self {
            table,
            using: None,
            where_clause: None,
            order_by: Vec::new(),
            limit: None,
            returning: Vec::new(),
        }
    }

    /// `USING other`; PostgreSQL only.
    pub fn using(mut self, source: &impl ReadableTable) -> Self {
        self.using = Some(source.from_item());
        self
    }

    pub fn where_clause(mut self, predicate: impl Into<BoolExpr>) -> Self {
        self.where_clause = Some(predicate.into().into_expression());
        self
    }

    /// MySQL only.
    pub fn order_by(mut self, items: impl IntoOrderBy) -> Self {
        self.order_by = items.into_order_by();
        self
    }

    /// MySQL only.
    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn returning(mut self, projections: impl IntoProjections) -> Self {
        self.returning = projections.into_projections();
        self
    }

    pub(crate) fn returning_list(&self) -> &[Projection] {
        &self.returning
    }
}

impl WriteSql for DeleteStatement {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        let Some(predicate) = &self.where_clause else {
            return Err(BuildError::MissingClause {
                statement: "DELETE",
                clause: "WHERE",
            });
        };
        b.write_str("DELETE FROM ");
        self.table.write_sql(b)?;
        if let Some(using) = &self.using {
            b.dialect().require(Feature::DeleteUsing)?;
            b.new_line();
            b.write_str("USING ");
            using.write_sql(b)?;
        }
        clause::write_optional_clause(b, "WHERE", Some(predicate))?;
        if !self.order_by.is_empty() || self.limit.is_some() {
            b.dialect().require(Feature::DeleteOrderLimit)?;
        }
        clause::write_list_clause(b, "ORDER BY", &self.order_by)?;
        write_limit_offset(b, self.limit, None);
        clause::write_returning(b, &self.returning)
    }
}

impl super::Statement for DeleteStatement {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, PostgresDialect, SqliteDialect};
    use crate::expr::kind::Integer;
    use crate::expr::ExprKind;
    use crate::statement::Statement;
    use crate::table::{Column, TableSource};
    use crate::FaultKind;

    fn items() -> Table {
        Table::new(None, "items", &[("id", ExprKind::Integer)])
    }

    fn id() -> Column<Integer> {
        Column::new("items", "id")
    }

    #[test]
    fn test_missing_where() {
        let err = items().delete().sql(&MySqlDialect::new()).unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingClause {
                statement: "DELETE",
                clause: "WHERE"
            }
        );
    }

    #[test]
    fn test_returning() {
        let stmt = items().delete().where_clause(id().lt(5)).returning(&id());
        assert_eq!(
            stmt.sql(&SqliteDialect::new()).unwrap().0,
            "DELETE FROM items\nWHERE (items.id < ?)\nRETURNING items.id AS \"items.id\";"
        );
    }

    #[test]
    fn test_order_limit_is_mysql_only() {
        let stmt = items()
            .delete()
            .where_clause(id().gt(0))
            .order_by(id().desc())
            .limit(10);
        assert_eq!(
            stmt.sql(&MySqlDialect::new()).unwrap().0,
            "DELETE FROM items\nWHERE (items.id > ?)\nORDER BY items.id DESC\nLIMIT ?;"
        );
        assert_eq!(
            stmt.sql(&PostgresDialect::new()).unwrap_err().kind(),
            FaultKind::Unsupported
        );
    }

    #[test]
    fn test_using() {
        let other = Table::new(None, "stale", &[("id", ExprKind::Integer)]);
        let stale: Column<Integer> = Column::new("stale", "id");
        let stmt = items().delete().using(&other).where_clause(id().eq(&stale));
        assert_eq!(
            stmt.sql(&PostgresDialect::new()).unwrap().0,
            "DELETE FROM items\nUSING stale\nWHERE (items.id = stale.id);"
        );
    }
}
