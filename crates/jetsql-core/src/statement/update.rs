use crate::clause::{self, Assignment, IntoAssignments, IntoProjections, IntoValues, Projection};
use crate::dialect::Feature;
use crate::error::{BuildError, Result};
use crate::expr::{BoolExpr, ColumnRef, Expression};
use crate::render::{SqlBuilder, WriteSql};
use crate::table::{Columns, FromItem, ReadableTable, Table};

/// An UPDATE statement. Rendering fails without a WHERE clause.
#[derive(Debug, Clone)]
#[must_use]
pub struct UpdateStatement {
    table: Table,
    columns: Vec<ColumnRef>,
    values: Option<Vec<Expression>>,
    assignments: Vec<Assignment>,
    from: Option<FromItem>,
    where_clause: Option<Expression>,
    returning: Vec<Projection>,
}

impl UpdateStatement {
    pub fn new(table: Table, columns: impl Columns) -> Self {
        Self {
            table,
            columns: columns.into_column_refs(),
            values: None,
            assignments: Vec::new(),
            from: None,
            where_clause: None,
            returning: Vec::new(),
        }
    }

    /// Values for the columns given to `update`, in order. A single
    /// sub-query may stand for all of them.
    pub fn set(mut self, values: impl IntoValues) -> Self {
        self.values = Some(values.into_values());
        self
    }

    /// Explicit `col = value` assignments; repeated calls accumulate.
    pub fn assign(mut self, assignments: impl IntoAssignments) -> Self {
        self.assignments.extend(assignments.into_assignments());
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

    pub fn returning(mut self, projections: impl IntoProjections) -> Self {
        self.returning = projections.into_projections();
        self
    }

    pub(crate) fn returning_list(&self) -> &[Projection] {
        &self.returning
    }

    fn write_set(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        let paired = self
            .values
            .as_ref()
            .map(|values| Assignment::new(self.columns.clone(), values.clone()));
        let set: Vec<&Assignment> = paired.iter().chain(&self.assignments).collect();
        if set.is_empty() {
            return Err(BuildError::MissingClause {
                statement: "UPDATE",
                clause: "SET",
            });
        }
        b.new_line();
        b.write_str("SET ");
        b.write_list(&set, ", ", |b, a| a.write_sql(b))
    }
}

impl WriteSql for UpdateStatement {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        let Some(predicate) = &self.where_clause else {
            return Err(BuildError::MissingClause {
                statement: "UPDATE",
                clause: "WHERE",
            });
        };
        b.write_str("UPDATE ");
        self.table.write_sql(b)?;
        self.write_set(b)?;
        if let Some(from) = &self.from {
            b.dialect().require(Feature::UpdateFrom)?;
            b.new_line();
            b.write_str("FROM ");
            from.write_sql(b)?;
        }
        clause::write_optional_clause(b, "WHERE", Some(predicate))?;
        clause::write_returning(b, &self.returning)
    }
}

impl super::Statement for UpdateStatement {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, PostgresDialect, SqliteDialect};
    use crate::expr::kind::{Integer, Text};
    use crate::expr::{bool_lit, ExprKind};
    use crate::statement::{select, Statement};
    use crate::table::{Column, TableSource};
    use crate::value::SqlValue;
    use crate::FaultKind;

    fn users() -> Table {
        Table::new(
            None,
            "users",
            &[
                ("id", ExprKind::Integer),
                ("name", ExprKind::String),
                ("age", ExprKind::Integer),
            ],
        )
    }

    fn id() -> Column<Integer> {
        Column::new("users", "id")
    }

    fn name() -> Column<Text> {
        Column::new("users", "name")
    }

    fn age() -> Column<Integer> {
        Column::new("users", "age")
    }

    #[test]
    fn test_missing_where() {
        let err = users()
            .update((&name(), &age()))
            .set(("bob", 30))
            .sql(&PostgresDialect::new())
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingClause {
                statement: "UPDATE",
                clause: "WHERE"
            }
        );
    }

    #[test]
    fn test_explicit_opt_out() {
        let stmt = users().update(&age()).set((1,)).where_clause(bool_lit(true));
        let (sql, args) = stmt.sql(&SqliteDialect::new()).unwrap();
        assert_eq!(sql, "UPDATE users\nSET age = ?\nWHERE ?;");
        assert_eq!(args, vec![SqlValue::Int(1), SqlValue::Bool(true)]);
    }

    #[test]
    fn test_row_assignment_per_dialect() {
        let stmt = users()
            .update((&name(), &age()))
            .set(("bob", 30))
            .where_clause(id().eq(7));
        assert_eq!(
            stmt.sql(&PostgresDialect::new()).unwrap().0,
            "UPDATE users\nSET (name, age) = ($1, $2)\nWHERE (users.id = $3);"
        );
        assert_eq!(
            stmt.sql(&MySqlDialect::new()).unwrap().0,
            "UPDATE users\nSET name = ?, age = ?\nWHERE (users.id = ?);"
        );
    }

    #[test]
    fn test_assignments_accumulate() {
        let stmt = users()
            .update(())
            .assign(name().set("ann"))
            .assign(age().set(age().add(1)))
            .where_clause(id().eq(1));
        assert_eq!(
            stmt.debug_sql(&PostgresDialect::new()).unwrap(),
            "UPDATE users\nSET name = 'ann', age = (users.age + 1)\nWHERE (users.id = 1);"
        );
    }

    #[test]
    fn test_subquery_set_and_from() {
        let other = Table::new(None, "staging", &[("age", ExprKind::Integer)]);
        let staged: Column<Integer> = Column::new("staging", "age");
        let stmt = users()
            .update(&age())
            .set(select(crate::expr::func::max(&staged)).from(&other))
            .where_clause(id().eq(1));
        let sql = stmt.debug_sql(&SqliteDialect::new()).unwrap();
        assert!(sql.starts_with("UPDATE users\nSET age = (\n    SELECT MAX(staging.age)"));

        let joined = users()
            .update(&age())
            .set(&staged)
            .from(&other)
            .where_clause(id().eq(1));
        assert!(joined.sql(&PostgresDialect::new()).is_ok());
        assert_eq!(
            joined.sql(&MySqlDialect::new()).unwrap_err().kind(),
            FaultKind::Unsupported
        );
    }

    #[test]
    fn test_missing_set() {
        let err = users()
            .update(&age())
            .where_clause(id().eq(1))
            .sql(&PostgresDialect::new())
            .unwrap_err();
        assert_eq!(err.kind(), FaultKind::MissingClause);
    }
}
