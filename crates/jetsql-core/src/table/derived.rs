use crate::clause::{ExportedColumn, IntoValues};
use crate::dialect::Feature;
use crate::error::{BuildError, Result};
use crate::expr::kind::Kind;
use crate::expr::{ColumnRef, ExprKind, Expression};
use crate::render::{SqlBuilder, WriteSql};
use crate::statement::Query;

use super::column::{Column, ColumnList};

/// Resolves the column exported under `alias` as seen from `owner`.
///
/// With explicit `renamed` column names the column is addressed by its new
/// name and projects as `owner.name`; otherwise the dotted alias is kept.
pub(crate) fn resolve_exported(
    owner: &str,
    exported: &[ExportedColumn],
    renamed: &[String],
    alias: &str,
) -> Result<ColumnRef> {
    let position = exported
        .iter()
        .position(|c| c.alias == alias)
        .or_else(|| renamed.iter().position(|name| name == alias));
    let Some(index) = position else {
        return Err(BuildError::shape(format!(
            "column {alias:?} is not exported by {owner}"
        )));
    };
    let kind = exported.get(index).map_or(ExprKind::Any, |c| c.kind);
    match renamed.get(index) {
        Some(name) => Ok(ColumnRef::new(owner, name, kind)),
        None if renamed.is_empty() => Ok(ColumnRef::exported_as(owner, alias, alias, kind)),
        None => Err(BuildError::shape(format!(
            "{owner} names {} columns but exports {}",
            renamed.len(),
            exported.len()
        ))),
    }
}

/// Every exported column of `owner` as outer references.
pub(crate) fn exported_list(
    owner: &str,
    exported: &[ExportedColumn],
    renamed: &[String],
) -> ColumnList {
    let refs = exported
        .iter()
        .enumerate()
        .map(|(i, c)| match renamed.get(i) {
            Some(name) => ColumnRef::new(owner, name, c.kind),
            None => ColumnRef::exported_as(owner, &c.alias, &c.alias, c.kind),
        })
        .collect();
    ColumnList::new(refs)
}

/// Writes ` (c1, c2)` after a derived table alias.
fn write_column_aliases(b: &mut SqlBuilder<'_>, names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Ok(());
    }
    b.dialect().require(Feature::ValuesColumnAliases)?;
    b.write_str(" (");
    b.write_list(names, ", ", |b, name| {
        b.write_identifier(name);
        Ok(())
    })?;
    b.write_char(')');
    Ok(())
}

/// A sub-query used as a FROM item: `(query) AS alias`.
#[derive(Debug, Clone)]
#[must_use]
pub struct SubqueryTable {
    query: Box<Query>,
    alias: String,
    column_aliases: Vec<String>,
    lateral: bool,
}

impl SubqueryTable {
    pub fn new(query: impl Into<Query>, alias: &str) -> Self {
        Self {
            query: Box::new(query.into()),
            alias: String::from(alias),
            column_aliases: Vec::new(),
            lateral: false,
        }
    }

    /// Renames the exported columns, in projection order.
    pub fn columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_aliases = names.into_iter().map(Into::into).collect();
        self
    }

    /// `LATERAL (query) AS alias`
    pub const fn lateral(mut self) -> Self {
        self.lateral = true;
        self
    }

    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    fn exported(&self) -> Vec<ExportedColumn> {
        self.query
            .projections()
            .iter()
            .flat_map(crate::clause::Projection::exported)
            .collect()
    }

    /// The outer reference to `column` as projected by the sub-query.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ShapeMismatch`] when the sub-query does not
    /// project `column`.
    pub fn column_of<K: Kind>(&self, column: &Column<K>) -> Result<Column<K>> {
        self.column(column.column_ref().alias())
    }

    /// The outer reference to the column exported as `alias`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ShapeMismatch`] when nothing is exported under
    /// `alias`.
    pub fn column<K: Kind>(&self, alias: &str) -> Result<Column<K>> {
        resolve_exported(&self.alias, &self.exported(), &self.column_aliases, alias)
            .map(Column::from_ref)
    }

    /// Every exported column.
    #[must_use]
    pub fn all_columns(&self) -> ColumnList {
        exported_list(&self.alias, &self.exported(), &self.column_aliases)
    }
}

impl WriteSql for SubqueryTable {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        if self.lateral {
            b.dialect().require(Feature::Lateral)?;
            b.write_str("LATERAL ");
        }
        b.write_block(|b| self.query.write_sql(b))?;
        b.write_str(" AS ");
        b.write_identifier(&self.alias);
        write_column_aliases(b, &self.column_aliases)
    }
}

/// A VALUES list used as a FROM item: `(VALUES (..), (..)) AS alias (c1, c2)`.
#[derive(Debug, Clone)]
#[must_use]
pub struct ValuesTable {
    rows: Vec<Vec<Expression>>,
    alias: String,
    column_aliases: Vec<String>,
}

impl ValuesTable {
    pub const fn new(alias: String) -> Self {
        Self {
            rows: Vec::new(),
            alias,
            column_aliases: Vec::new(),
        }
    }

    /// Appends a row.
    pub fn row(mut self, values: impl IntoValues) -> Self {
        self.rows.push(values.into_values());
        self
    }

    /// Names the columns of the table.
    pub fn columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_aliases = names.into_iter().map(Into::into).collect();
        self
    }

    /// A typed reference to the column named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ShapeMismatch`] when no column is named `name`.
    pub fn column<K: Kind>(&self, name: &str) -> Result<Column<K>> {
        if self.column_aliases.iter().any(|c| c == name) {
            Ok(Column::new(&self.alias, name))
        } else {
            Err(BuildError::shape(format!(
                "VALUES table {} has no column {name:?}",
                self.alias
            )))
        }
    }
}

impl WriteSql for ValuesTable {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        let Some(first) = self.rows.first() else {
            return Err(BuildError::nil_operand("VALUES table without rows"));
        };
        if first.is_empty() {
            return Err(BuildError::nil_operand("VALUES row without values"));
        }
        if let Some(ragged) = self.rows.iter().find(|r| r.len() != first.len()) {
            return Err(BuildError::shape(format!(
                "VALUES rows have {} and {} values",
                first.len(),
                ragged.len()
            )));
        }
        let prefix = b.dialect().values_row_prefix();
        b.write_str("(VALUES ");
        b.write_list(&self.rows, ", ", |b, row| {
            b.write_str(prefix);
            b.write_char('(');
            b.write_list(row, ", ", |b, value| value.write_sql(b))?;
            b.write_char(')');
            Ok(())
        })?;
        b.write_str(") AS ");
        b.write_identifier(&self.alias);
        write_column_aliases(b, &self.column_aliases)
    }
}

/// Starts a VALUES table named `alias`.
pub fn values(alias: &str) -> ValuesTable {
    ValuesTable::new(String::from(alias))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, MySqlDialect, PostgresDialect, SqliteDialect};
    use crate::expr::kind::{Integer, Text};
    use crate::statement::SelectStatement;
    use crate::FaultKind;

    fn render(w: &impl WriteSql, dialect: &dyn Dialect) -> Result<(String, usize)> {
        let mut b = SqlBuilder::new(dialect);
        w.write_sql(&mut b)?;
        let (sql, args) = b.finish();
        Ok((sql, args.len()))
    }

    fn sub() -> SubqueryTable {
        let id = Column::<Integer>::new("users", "id");
        let name = Column::<Text>::new("users", "name");
        SelectStatement::new((&id, name.as_("label"))).as_table("sub")
    }

    #[test]
    fn test_subquery_exports_dotted_alias() {
        let id = Column::<Integer>::new("users", "id");
        let outer = sub().column_of(&id).unwrap();
        assert_eq!(outer.column_ref().table(), Some("sub"));
        assert_eq!(outer.name(), "users.id");
        assert_eq!(outer.column_ref().alias(), "users.id");

        let label = sub().column::<Text>("label").unwrap();
        assert_eq!(label.name(), "label");
    }

    #[test]
    fn test_unknown_column_is_shape_mismatch() {
        let email = Column::<Text>::new("users", "email");
        let err = sub().column_of(&email).unwrap_err();
        assert_eq!(err.kind(), FaultKind::ShapeMismatch);
    }

    #[test]
    fn test_renamed_columns() {
        let renamed = sub().columns(["uid", "label"]);
        let uid = renamed.column::<Integer>("uid").unwrap();
        assert_eq!(uid.column_ref().alias(), "sub.uid");
        assert_eq!(renamed.all_columns().len(), 2);
    }

    #[test]
    fn test_lateral_requires_capability() {
        let lateral = sub().lateral();
        let (sql, _) = render(&lateral, &PostgresDialect::new()).unwrap();
        assert!(sql.starts_with("LATERAL (\n    SELECT "));
        assert!(sql.ends_with("\n) AS sub"));
        let err = render(&lateral, &SqliteDialect::new()).unwrap_err();
        assert_eq!(err.kind(), FaultKind::Unsupported);
    }

    #[test]
    fn test_values_table() {
        let t = values("v").row((1, "a")).row((2, "b")).columns(["n", "s"]);
        assert_eq!(
            render(&t, &PostgresDialect::new()).unwrap(),
            (String::from("(VALUES ($1, $2), ($3, $4)) AS v (n, s)"), 4)
        );
        assert_eq!(
            render(&t, &MySqlDialect::new()).unwrap().0,
            "(VALUES ROW(?, ?), ROW(?, ?)) AS v (n, s)"
        );
        assert_eq!(t.column::<Integer>("n").unwrap().column_ref().alias(), "v.n");
    }

    #[test]
    fn test_values_faults() {
        let empty = values("v");
        assert_eq!(
            render(&empty, &PostgresDialect::new()).unwrap_err().kind(),
            FaultKind::NilOperand
        );
        let ragged = values("v").row((1, 2)).row((3,));
        assert_eq!(
            render(&ragged, &PostgresDialect::new()).unwrap_err().kind(),
            FaultKind::ShapeMismatch
        );
        let named = values("v").row((1,)).columns(["n"]);
        assert_eq!(
            render(&named, &SqliteDialect::new()).unwrap_err().kind(),
            FaultKind::Unsupported
        );
    }
}
