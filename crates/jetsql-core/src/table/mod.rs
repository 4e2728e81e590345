//! Tables and everything that can appear in a FROM clause.
//!
//! [`Table`] describes a base table. Anything implementing [`TableSource`]
//! (typically a struct produced by `#[derive(Table)]` or by the code
//! generator) gets the statement entry points, and every FROM item gets the
//! join builders through [`ReadableTable`].

mod column;
mod derived;

pub use column::{Column, ColumnList, Columns};
pub use derived::{values, SubqueryTable, ValuesTable};
pub(crate) use derived::{exported_list, resolve_exported};

use crate::clause::IntoProjections;
use crate::dialect::Feature;
use crate::error::{BuildError, Result};
use crate::expr::{BoolExpr, ColumnRef, ExprKind, Expression};
use crate::render::{SqlBuilder, WriteSql};
use crate::statement::{
    CteRef, DeleteStatement, InsertStatement, LockStatement, SelectStatement, UpdateStatement,
};

/// A base table: optional schema, name, optional alias and its columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    schema: Option<String>,
    name: String,
    alias: Option<String>,
    columns: Vec<ColumnRef>,
}

impl Table {
    /// Creates a table with the given column names and kinds.
    #[must_use]
    pub fn new(schema: Option<&str>, name: &str, columns: &[(&str, ExprKind)]) -> Self {
        Self {
            schema: schema.map(String::from),
            name: String::from(name),
            alias: None,
            columns: columns
                .iter()
                .map(|(column, kind)| ColumnRef::new(name, column, *kind))
                .collect(),
        }
    }

    /// The same table under `alias`; columns are re-qualified by the alias.
    #[must_use]
    pub fn as_(&self, alias: &str) -> Self {
        Self {
            alias: Some(String::from(alias)),
            columns: self.columns.iter().map(|c| c.rebase(alias)).collect(),
            ..self.clone()
        }
    }

    /// The same table in another schema.
    #[must_use]
    pub fn from_schema(&self, schema: &str) -> Self {
        Self {
            schema: Some(String::from(schema)),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Name columns are qualified with: the alias if set, else the table name.
    #[must_use]
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnRef] {
        &self.columns
    }
}

impl WriteSql for Table {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        if let Some(schema) = &self.schema {
            b.write_identifier(schema);
            b.write_char('.');
        }
        b.write_identifier(&self.name);
        if let Some(alias) = &self.alias {
            b.write_str(" AS ");
            b.write_identifier(alias);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// `left KIND JOIN right [ON condition]`
#[derive(Debug, Clone)]
pub struct Join {
    left: FromItem,
    right: FromItem,
    kind: JoinKind,
    on: Option<Expression>,
}

impl Join {
    /// Creates a join. Every kind except [`JoinKind::Cross`] needs `on`;
    /// a missing condition fails at render time.
    #[must_use]
    pub const fn new(
        left: FromItem,
        right: FromItem,
        kind: JoinKind,
        on: Option<Expression>,
    ) -> Self {
        Self {
            left,
            right,
            kind,
            on,
        }
    }
}

/// Width of `FROM `, so joined tables line up under the first one.
const JOIN_INDENT: usize = 5;

impl WriteSql for Join {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        if self.kind == JoinKind::Full {
            b.dialect().require(Feature::FullJoin)?;
        }
        if self.kind != JoinKind::Cross && self.on.is_none() {
            return Err(BuildError::nil_operand(format!(
                "{} without ON condition",
                self.kind.as_sql()
            )));
        }
        self.left.write_sql(b)?;
        b.increase_indent(JOIN_INDENT);
        b.new_line();
        b.write_str(self.kind.as_sql());
        b.write_char(' ');
        let result = self.right.write_sql(b).and_then(|()| match &self.on {
            Some(on) => {
                b.write_str(" ON ");
                on.write_sql(b)
            }
            None => Ok(()),
        });
        b.decrease_indent(JOIN_INDENT);
        result
    }
}

/// Anything that can appear in a FROM clause.
#[derive(Debug, Clone)]
pub enum FromItem {
    Table(Table),
    Join(Box<Join>),
    Subquery(SubqueryTable),
    Values(ValuesTable),
    Cte(CteRef),
}

impl WriteSql for FromItem {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        match self {
            Self::Table(t) => t.write_sql(b),
            Self::Join(j) => j.write_sql(b),
            Self::Subquery(s) => s.write_sql(b),
            Self::Values(v) => v.write_sql(b),
            Self::Cte(c) => c.write_sql(b),
        }
    }
}

impl From<Table> for FromItem {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl From<Join> for FromItem {
    fn from(join: Join) -> Self {
        Self::Join(Box::new(join))
    }
}

impl From<SubqueryTable> for FromItem {
    fn from(table: SubqueryTable) -> Self {
        Self::Subquery(table)
    }
}

impl From<ValuesTable> for FromItem {
    fn from(table: ValuesTable) -> Self {
        Self::Values(table)
    }
}

impl From<CteRef> for FromItem {
    fn from(cte: CteRef) -> Self {
        Self::Cte(cte)
    }
}

/// A FROM item that can be selected from and joined.
pub trait ReadableTable {
    /// This source as a FROM item.
    fn from_item(&self) -> FromItem;

    /// `SELECT projections FROM self`
    fn select(&self, projections: impl IntoProjections) -> SelectStatement
    where
        Self: Sized,
    {
        SelectStatement::new(projections).from(self)
    }

    fn inner_join(&self, other: &impl ReadableTable, on: impl Into<BoolExpr>) -> FromItem
    where
        Self: Sized,
    {
        join(self, other, JoinKind::Inner, Some(on.into().into_expression()))
    }

    fn left_join(&self, other: &impl ReadableTable, on: impl Into<BoolExpr>) -> FromItem
    where
        Self: Sized,
    {
        join(self, other, JoinKind::Left, Some(on.into().into_expression()))
    }

    fn right_join(&self, other: &impl ReadableTable, on: impl Into<BoolExpr>) -> FromItem
    where
        Self: Sized,
    {
        join(self, other, JoinKind::Right, Some(on.into().into_expression()))
    }

    fn full_join(&self, other: &impl ReadableTable, on: impl Into<BoolExpr>) -> FromItem
    where
        Self: Sized,
    {
        join(self, other, JoinKind::Full, Some(on.into().into_expression()))
    }

    fn cross_join(&self, other: &impl ReadableTable) -> FromItem
    where
        Self: Sized,
    {
        join(self, other, JoinKind::Cross, None)
    }
}

fn join(
    left: &impl ReadableTable,
    right: &impl ReadableTable,
    kind: JoinKind,
    on: Option<Expression>,
) -> FromItem {
    FromItem::from(Join::new(left.from_item(), right.from_item(), kind, on))
}

impl ReadableTable for FromItem {
    fn from_item(&self) -> FromItem {
        self.clone()
    }
}

impl ReadableTable for SubqueryTable {
    fn from_item(&self) -> FromItem {
        FromItem::Subquery(self.clone())
    }
}

impl ReadableTable for ValuesTable {
    fn from_item(&self) -> FromItem {
        FromItem::Values(self.clone())
    }
}

/// A base table with statement entry points.
pub trait TableSource {
    /// Table metadata.
    fn table(&self) -> &Table;

    /// Every column, in declaration order.
    fn all_columns(&self) -> ColumnList {
        ColumnList::new(self.table().columns().to_vec())
    }

    /// `INSERT INTO self (columns)`
    fn insert(&self, columns: impl Columns) -> InsertStatement
    where
        Self: Sized,
    {
        InsertStatement::new(self.table().clone(), columns)
    }

    /// `UPDATE self`; `columns` pair with the values given to `set`.
    fn update(&self, columns: impl Columns) -> UpdateStatement
    where
        Self: Sized,
    {
        UpdateStatement::new(self.table().clone(), columns)
    }

    /// `DELETE FROM self`
    fn delete(&self) -> DeleteStatement {
        DeleteStatement::new(self.table().clone())
    }

    /// `LOCK TABLE self`
    fn lock(&self) -> LockStatement {
        LockStatement::new(vec![self.table().clone()])
    }
}

impl TableSource for Table {
    fn table(&self) -> &Table {
        self
    }
}

impl<T: TableSource> ReadableTable for T {
    fn from_item(&self) -> FromItem {
        FromItem::Table(self.table().clone())
    }
}
