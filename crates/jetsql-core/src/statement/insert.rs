use super::Query;
use crate::clause::{
    self, IntoAssignments, IntoProjections, IntoValues, OnConflict, OnDuplicateKeyUpdate,
    Projection,
};
use crate::error::{BuildError, Result};
use crate::expr::{ColumnRef, Expression};
use crate::model::Model;
use crate::render::{SqlBuilder, WriteSql};
use crate::table::{Columns, Table};

/// Where inserted rows come from.
#[derive(Debug, Clone)]
pub enum InsertSource {
    Values(Vec<Vec<Expression>>),
    Query(Box<Query>),
    DefaultValues,
}

/// An INSERT statement.
#[derive(Debug, Clone)]
#[must_use]
pub struct InsertStatement {
    table: Table,
    columns: Vec<ColumnRef>,
    source: InsertSource,
    on_conflict: OnConflict,
    on_duplicate_key: OnDuplicateKeyUpdate,
    returning: Vec<Projection>,
}

/// Width of `VALUES `, so continuation rows line up under the first.
const VALUES_INDENT: usize = 7;

impl InsertStatement {
    pub fn new(table: Table, columns: impl Columns) -> Self {
        Self {
            table,
            columns: columns.into_column_refs(),
            source: InsertSource::Values(Vec::new()),
            on_conflict: OnConflict::new(),
            on_duplicate_key: OnDuplicateKeyUpdate::default(),
            returning: Vec::new(),
        }
    }

    fn push_row(&mut self, row: Vec<Expression>) {
        match &mut self.source {
            InsertSource::Values(rows) => rows.push(row),
            InsertSource::Query(_) | InsertSource::DefaultValues => {
                self.source = InsertSource::Values(vec![row]);
            }
        }
    }

    /// Appends a row of values; repeated calls add rows.
    pub fn values(mut self, row: impl IntoValues) -> Self {
        self.push_row(row.into_values());
        self
    }

    /// Appends a row taken from `record`, one value per target column.
    ///
    /// Without an explicit column list every table column is a target.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ShapeMismatch`] when the record has no field for
    /// a target column, or is not a record at all.
    pub fn model(mut self, record: &impl Model) -> Result<Self> {
        if self.columns.is_empty() {
            self.columns = self.table.columns().to_vec();
        }
        let row = self
            .columns
            .iter()
            .map(|column| match record.field_value(column.name())? {
                Some(value) => Ok(Expression::value(value)),
                None => Err(BuildError::shape(format!(
                    "model has no field for column {}",
                    column.name()
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        self.push_row(row);
        Ok(self)
    }

    /// Appends one row per record.
    ///
    /// # Errors
    ///
    /// Same as [`InsertStatement::model`].
    pub fn models<'m, M, I>(self, records: I) -> Result<Self>
    where
        M: Model + 'm,
        I: IntoIterator<Item = &'m M>,
    {
        records
            .into_iter()
            .try_fold(self, |stmt, record| stmt.model(record))
    }

    /// `INSERT INTO t (cols) query`
    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.source = InsertSource::Query(Box::new(query.into()));
        self
    }

    /// `INSERT INTO t DEFAULT VALUES`
    pub fn default_values(mut self) -> Self {
        self.source = InsertSource::DefaultValues;
        self
    }

    pub fn on_conflict(mut self, on_conflict: OnConflict) -> Self {
        self.on_conflict = on_conflict;
        self
    }

    /// MySQL upsert; repeated calls accumulate assignments.
    pub fn on_duplicate_key_update(mut self, set: impl IntoAssignments) -> Self {
        self.on_duplicate_key = self.on_duplicate_key.push(set);
        self
    }

    pub fn returning(mut self, projections: impl IntoProjections) -> Self {
        self.returning = projections.into_projections();
        self
    }

    pub(crate) fn returning_list(&self) -> &[Projection] {
        &self.returning
    }

    fn write_rows(&self, b: &mut SqlBuilder<'_>, rows: &[Vec<Expression>]) -> Result<()> {
        let Some(first) = rows.first() else {
            return Err(BuildError::nil_operand("INSERT without VALUES"));
        };
        let width = if self.columns.is_empty() {
            first.len()
        } else {
            self.columns.len()
        };
        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            return Err(BuildError::shape(format!(
                "INSERT row has {} values for {width} columns",
                row.len()
            )));
        }
        b.new_line();
        b.write_str("VALUES ");
        b.increase_indent(VALUES_INDENT);
        let result = rows.iter().enumerate().try_for_each(|(i, row)| {
            if i > 0 {
                b.write_char(',');
                b.new_line();
            }
            b.write_char('(');
            b.write_list(row, ", ", |b, value| value.write_sql(b))?;
            b.write_char(')');
            Ok(())
        });
        b.decrease_indent(VALUES_INDENT);
        result
    }
}

impl WriteSql for InsertStatement {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        b.write_str("INSERT INTO ");
        self.table.write_sql(b)?;
        if !self.columns.is_empty() && !matches!(self.source, InsertSource::DefaultValues) {
            b.write_str(" (");
            b.with_short_names(|b| b.write_list(&self.columns, ", ", |b, c| c.write_sql(b)))?;
            b.write_char(')');
        }
        match &self.source {
            InsertSource::Values(rows) => self.write_rows(b, rows)?,
            InsertSource::Query(query) => {
                b.new_line();
                query.write_sql(b)?;
            }
            InsertSource::DefaultValues => {
                b.new_line();
                b.write_str("DEFAULT VALUES");
            }
        }
        self.on_conflict.write_sql(b)?;
        self.on_duplicate_key.write_sql(b)?;
        clause::write_returning(b, &self.returning)
    }
}

impl super::Statement for InsertStatement {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, PostgresDialect, SqliteDialect};
    use crate::expr::kind::{Integer, Text};
    use crate::expr::ExprKind;
    use crate::statement::{select, Statement};
    use crate::table::{Column, TableSource};
    use crate::value::SqlValue;
    use crate::FaultKind;
    use serde_json::json;

    fn links() -> Table {
        Table::new(
            None,
            "link",
            &[("id", ExprKind::Integer), ("url", ExprKind::String)],
        )
    }

    fn id() -> Column<Integer> {
        Column::new("link", "id")
    }

    fn url() -> Column<Text> {
        Column::new("link", "url")
    }

    #[test]
    fn test_multi_row_values() {
        let stmt = links()
            .insert((&id(), &url()))
            .values((1, "a"))
            .values((2, "b"));
        let (sql, args) = stmt.sql(&PostgresDialect::new()).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO link (id, url)\nVALUES ($1, $2),\n       ($3, $4);"
        );
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn test_ragged_row_is_shape_mismatch() {
        let stmt = links().insert((&id(), &url())).values((1,));
        let err = stmt.sql(&PostgresDialect::new()).unwrap_err();
        assert_eq!(err.kind(), FaultKind::ShapeMismatch);
    }

    #[test]
    fn test_model_rows() {
        let records = [json!({"id": 1, "url": "a"}), json!({"id": 2, "url": "b"})];
        let stmt = links().insert(()).models(&records).unwrap();
        let (sql, args) = stmt.sql(&SqliteDialect::new()).unwrap();
        assert!(sql.starts_with("INSERT INTO link (id, url)\nVALUES (?, ?),"));
        assert_eq!(args[2], SqlValue::Int(2));
    }

    #[test]
    fn test_model_missing_field() {
        let err = links()
            .insert((&id(), &url()))
            .model(&json!({"id": 1}))
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::ShapeMismatch {
                context: String::from("model has no field for column url")
            }
        );
    }

    #[test]
    fn test_insert_query_and_returning() {
        let stmt = links()
            .insert((&id(), &url()))
            .query(select((&id(), &url())).from(&links()))
            .returning(&id());
        let sql = stmt.debug_sql(&PostgresDialect::new()).unwrap();
        assert!(sql.starts_with("INSERT INTO link (id, url)\nSELECT link.id AS \"link.id\","));
        assert!(sql.ends_with("\nRETURNING link.id AS \"link.id\";"));
        assert!(stmt.sql(&MySqlDialect::new()).is_err());
    }

    #[test]
    fn test_default_values() {
        let stmt = links().insert(()).default_values();
        assert_eq!(
            stmt.sql(&SqliteDialect::new()).unwrap().0,
            "INSERT INTO link\nDEFAULT VALUES;"
        );
    }

    #[test]
    fn test_upserts() {
        let pg = links()
            .insert((&id(), &url()))
            .values((1, "a"))
            .on_conflict(OnConflict::columns(&id()).do_update(url().set(url().excluded())));
        assert!(pg
            .sql(&PostgresDialect::new())
            .unwrap()
            .0
            .ends_with("\nON CONFLICT (id) DO UPDATE\n    SET url = excluded.url;"));

        let my = links()
            .insert((&id(), &url()))
            .values((1, "a"))
            .on_duplicate_key_update(url().set(url().excluded()));
        assert!(my
            .sql(&MySqlDialect::new())
            .unwrap()
            .0
            .ends_with("\nON DUPLICATE KEY UPDATE url = VALUES(url);"));
    }
}
