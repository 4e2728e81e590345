use super::AnyStatement;
use crate::clause::{ExportedColumn, Projection};
use crate::dialect::Feature;
use crate::error::{BuildError, Result};
use crate::expr::kind::Kind;
use crate::render::{SqlBuilder, WriteSql};
use crate::table::{exported_list, resolve_exported, Column, ColumnList, FromItem, ReadableTable};

/// A common table expression: `name [(cols)] AS [NOT] MATERIALIZED (body)`.
///
/// The same value is used both in the WITH list and as a FROM item. Columns
/// are resolved against the explicit column list when one is given, else
/// against the projections the body exports.
#[derive(Debug, Clone)]
#[must_use]
pub struct Cte {
    name: String,
    columns: Vec<String>,
    body: Option<Box<AnyStatement>>,
    materialized: Option<bool>,
    alias: Option<String>,
}

/// Starts a CTE called `name`; give it a body with [`Cte::as_`].
pub fn cte(name: &str) -> Cte {
    Cte {
        name: String::from(name),
        columns: Vec::new(),
        body: None,
        materialized: None,
        alias: None,
    }
}

impl Cte {
    /// Sets the statement the CTE stands for.
    pub fn as_(mut self, body: impl Into<AnyStatement>) -> Self {
        self.body = Some(Box::new(body.into()));
        self
    }

    /// Explicit column names, in projection order.
    pub fn columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = names.into_iter().map(Into::into).collect();
        self
    }

    pub const fn materialized(mut self) -> Self {
        self.materialized = Some(true);
        self
    }

    pub const fn not_materialized(mut self) -> Self {
        self.materialized = Some(false);
        self
    }

    /// The same CTE referenced under another name, e.g. for self joins.
    pub fn alias(&self, alias: &str) -> Self {
        Self {
            alias: Some(String::from(alias)),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    fn exported(&self) -> Vec<ExportedColumn> {
        self.body
            .as_ref()
            .map(|body| body.projections().iter().flat_map(Projection::exported).collect())
            .unwrap_or_default()
    }

    /// The reference to `column` as exported by the CTE body.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ShapeMismatch`] when the body does not export
    /// `column`.
    pub fn column_of<K: Kind>(&self, column: &Column<K>) -> Result<Column<K>> {
        self.column(column.column_ref().alias())
    }

    /// The reference to the column exported as `alias`, or named `alias` in
    /// the explicit column list.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ShapeMismatch`] when no such column exists.
    pub fn column<K: Kind>(&self, alias: &str) -> Result<Column<K>> {
        let exported = self.exported();
        if exported.is_empty() && self.columns.iter().any(|c| c == alias) {
            return Ok(Column::new(self.reference_name(), alias));
        }
        resolve_exported(self.reference_name(), &exported, &self.columns, alias)
            .map(Column::from_ref)
    }

    /// Every column the CTE exposes.
    #[must_use]
    pub fn all_columns(&self) -> ColumnList {
        exported_list(self.reference_name(), &self.exported(), &self.columns)
    }

    fn write_definition(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        let Some(body) = &self.body else {
            return Err(BuildError::nil_operand(format!(
                "CTE {} has no statement",
                self.name
            )));
        };
        b.write_identifier(&self.name);
        if !self.columns.is_empty() {
            b.write_str(" (");
            b.write_list(&self.columns, ", ", |b, c| {
                b.write_identifier(c);
                Ok(())
            })?;
            b.write_char(')');
        }
        b.write_str(" AS ");
        if let Some(materialized) = self.materialized {
            b.dialect().require(Feature::MaterializedCte)?;
            b.write_str(if materialized {
                "MATERIALIZED "
            } else {
                "NOT MATERIALIZED "
            });
        }
        b.write_block(|b| body.write_sql(b))
    }
}

impl ReadableTable for Cte {
    fn from_item(&self) -> FromItem {
        FromItem::Cte(CteRef {
            name: self.name.clone(),
            alias: self.alias.clone(),
        })
    }
}

/// A CTE referenced from a FROM clause: `name [AS alias]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CteRef {
    name: String,
    alias: Option<String>,
}

impl WriteSql for CteRef {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        b.write_identifier(&self.name);
        if let Some(alias) = &self.alias {
            b.write_str(" AS ");
            b.write_identifier(alias);
        }
        Ok(())
    }
}

/// `WITH [RECURSIVE] cte, ... body`
#[derive(Debug, Clone)]
#[must_use]
pub struct WithStatement {
    recursive: bool,
    ctes: Vec<Cte>,
    body: Option<Box<AnyStatement>>,
}

/// `WITH ctes ...`; finish with [`WithStatement::body`].
pub fn with(ctes: impl IntoIterator<Item = Cte>) -> WithStatement {
    WithStatement {
        recursive: false,
        ctes: ctes.into_iter().collect(),
        body: None,
    }
}

/// `WITH RECURSIVE ctes ...`
pub fn with_recursive(ctes: impl IntoIterator<Item = Cte>) -> WithStatement {
    WithStatement {
        recursive: true,
        ..with(ctes)
    }
}

impl WithStatement {
    /// The main statement.
    pub fn body(mut self, stmt: impl Into<AnyStatement>) -> Self {
        self.body = Some(Box::new(stmt.into()));
        self
    }

    #[must_use]
    pub fn projections(&self) -> &[Projection] {
        match &self.body {
            Some(body) => body.projections(),
            None => &[],
        }
    }
}

impl WriteSql for WithStatement {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        let Some(body) = &self.body else {
            return Err(BuildError::MissingClause {
                statement: "WITH",
                clause: "main statement",
            });
        };
        if self.ctes.is_empty() {
            return Err(BuildError::nil_operand("WITH without common table expressions"));
        }
        b.write_str(if self.recursive {
            "WITH RECURSIVE "
        } else {
            "WITH "
        });
        for (i, cte) in self.ctes.iter().enumerate() {
            if i > 0 {
                b.write_char(',');
                b.new_line();
            }
            cte.write_definition(b)?;
        }
        b.new_line();
        body.write_sql(b)
    }
}

impl super::Statement for WithStatement {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, PostgresDialect};
    use crate::expr::func::{count_star, sum};
    use crate::expr::kind::{Integer, Text};
    use crate::expr::ExprKind;
    use crate::statement::{select, union_all, Statement};
    use crate::table::{Table, TableSource};
    use crate::FaultKind;

    fn payments() -> Table {
        Table::new(
            None,
            "payment",
            &[("customer", ExprKind::String), ("amount", ExprKind::Integer)],
        )
    }

    fn customer() -> Column<Text> {
        Column::new("payment", "customer")
    }

    fn amount() -> Column<Integer> {
        Column::new("payment", "amount")
    }

    fn totals() -> Cte {
        cte("totals").as_(
            payments()
                .select((&customer(), sum(&amount()).as_("total")))
                .group_by(&customer()),
        )
    }

    #[test]
    fn test_cte_columns_keep_dotted_alias() {
        let totals = totals();
        let who = totals.column_of(&customer()).unwrap();
        assert_eq!(who.column_ref().table(), Some("totals"));
        assert_eq!(who.name(), "payment.customer");
        let total = totals.column::<Integer>("total").unwrap();

        let stmt = with([totals.clone()])
            .body(totals.select((&who, &total)).where_clause(total.gt(10)));
        let sql = stmt.debug_sql(&PostgresDialect::new()).unwrap();
        assert_eq!(
            sql,
            "WITH totals AS (\n    \
             SELECT payment.customer AS \"payment.customer\",\n           \
             SUM(payment.amount) AS \"total\"\n    \
             FROM payment\n    \
             GROUP BY payment.customer\n\
             )\n\
             SELECT totals.\"payment.customer\" AS \"payment.customer\",\n       \
             totals.total AS \"total\"\n\
             FROM totals\n\
             WHERE (totals.total > 10);"
        );
    }

    #[test]
    fn test_unknown_cte_column() {
        let email: Column<Text> = Column::new("payment", "email");
        assert_eq!(
            totals().column_of(&email).unwrap_err().kind(),
            FaultKind::ShapeMismatch
        );
    }

    #[test]
    fn test_aliased_cte_reference() {
        let t2 = totals().alias("t2");
        let who = t2.column_of(&customer()).unwrap();
        assert_eq!(who.column_ref().table(), Some("t2"));
        let stmt = with([totals()]).body(t2.select(count_star()));
        let sql = stmt.sql(&PostgresDialect::new()).unwrap().0;
        assert!(sql.ends_with("\nFROM totals AS t2;"));
    }

    #[test]
    fn test_recursive_with_explicit_columns() {
        let n: Column<Integer> = Column::unqualified("n");
        let numbers = cte("numbers").columns(["n"]);
        let step = numbers.column::<Integer>("n").unwrap();
        let body = union_all(
            select(crate::expr::int(1)),
            numbers.select(step.add(1)).where_clause(step.lt(5)),
        );
        let numbers = numbers.as_(body);
        let stmt = with_recursive([numbers.clone()]).body(numbers.select(&n));
        let sql = stmt.debug_sql(&MySqlDialect::new()).unwrap();
        assert!(sql.starts_with("WITH RECURSIVE numbers (n) AS (\n"));
        assert!(sql.ends_with("\nSELECT n\nFROM numbers;"));
    }

    #[test]
    fn test_cte_without_body() {
        let stmt = with([cte("empty")]).body(select(crate::expr::int(1)));
        assert_eq!(
            stmt.sql(&PostgresDialect::new()).unwrap_err().kind(),
            FaultKind::NilOperand
        );
    }

    #[test]
    fn test_materialized_is_checked() {
        let stmt = with([totals().materialized()]).body(totals().select(count_star()));
        assert!(stmt
            .sql(&PostgresDialect::new())
            .unwrap()
            .0
            .starts_with("WITH totals AS MATERIALIZED (\n"));
        assert_eq!(
            stmt.sql(&MySqlDialect::new()).unwrap_err().kind(),
            FaultKind::Unsupported
        );
    }
}
