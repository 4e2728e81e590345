use crate::error::Result;
use crate::expr::kind::Kind;
use crate::expr::{ColumnRef, Expr, ExprKind, Expression};
use crate::render::{SqlBuilder, WriteSql};
use crate::table::{Column, ColumnList};

/// What a projection selects.
#[derive(Debug, Clone)]
pub enum ProjectionItem {
    /// A single column, aliased `"table.column"` unless renamed.
    Column(ColumnRef),
    /// Every column of a table, each with its default alias.
    AllColumns(Vec<ColumnRef>),
    /// Any other expression.
    Expr(Expression),
}

/// One entry of a SELECT list or RETURNING clause.
#[derive(Debug, Clone)]
pub struct Projection {
    item: ProjectionItem,
    alias: Option<String>,
}

/// A column a projection makes visible to an enclosing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedColumn {
    /// The projected alias, e.g. `users.id`.
    pub alias: String,
    pub kind: ExprKind,
}

impl Projection {
    /// Projects `e`, keeping column references addressable by their dotted alias.
    #[must_use]
    pub fn new(e: impl Into<Expression>) -> Self {
        let item = match e.into() {
            Expression::Column(column) => ProjectionItem::Column(column),
            other => ProjectionItem::Expr(other),
        };
        Self { item, alias: None }
    }

    /// Projects `e` under `alias`.
    #[must_use]
    pub fn aliased(e: impl Into<Expression>, alias: &str) -> Self {
        Self {
            alias: Some(String::from(alias)),
            ..Self::new(e)
        }
    }

    /// Projects every column in `columns`.
    #[must_use]
    pub const fn all(columns: Vec<ColumnRef>) -> Self {
        Self {
            item: ProjectionItem::AllColumns(columns),
            alias: None,
        }
    }

    #[must_use]
    pub const fn item(&self) -> &ProjectionItem {
        &self.item
    }

    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Columns an enclosing query can reference through this projection.
    ///
    /// Unaliased expressions other than columns export nothing.
    #[must_use]
    pub fn exported(&self) -> Vec<ExportedColumn> {
        match (&self.item, &self.alias) {
            (ProjectionItem::Column(column), Some(alias)) => vec![ExportedColumn {
                alias: alias.clone(),
                kind: column.kind(),
            }],
            (ProjectionItem::Expr(e), Some(alias)) => vec![ExportedColumn {
                alias: alias.clone(),
                kind: e.kind(),
            }],
            (ProjectionItem::Column(column), None) => vec![exported(column)],
            (ProjectionItem::AllColumns(columns), _) => columns.iter().map(exported).collect(),
            (ProjectionItem::Expr(_), None) => Vec::new(),
        }
    }
}

fn exported(column: &ColumnRef) -> ExportedColumn {
    ExportedColumn {
        alias: String::from(column.alias()),
        kind: column.kind(),
    }
}

fn write_column(b: &mut SqlBuilder<'_>, column: &ColumnRef, alias: Option<&str>) -> Result<()> {
    column.write_sql(b)?;
    match alias {
        Some(alias) => {
            b.write_str(" AS ");
            b.write_alias(alias);
        }
        None if column.table().is_some() => {
            b.write_str(" AS ");
            b.write_alias(column.alias());
        }
        None => {}
    }
    Ok(())
}

impl WriteSql for Projection {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        match &self.item {
            ProjectionItem::Column(column) => write_column(b, column, self.alias.as_deref()),
            ProjectionItem::AllColumns(columns) => {
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        b.write_char(',');
                        b.new_line();
                    }
                    write_column(b, column, None)?;
                }
                Ok(())
            }
            ProjectionItem::Expr(e) => {
                e.write_sql(b)?;
                if let Some(alias) = &self.alias {
                    b.write_str(" AS ");
                    b.write_alias(alias);
                }
                Ok(())
            }
        }
    }
}

/// Width of `SELECT `, so continuation lines align under the first item.
const LIST_INDENT: usize = 7;

/// Writes a projection list, one item per line.
pub(crate) fn write_projections(b: &mut SqlBuilder<'_>, items: &[Projection]) -> Result<()> {
    b.increase_indent(LIST_INDENT);
    let result = items.iter().enumerate().try_for_each(|(i, item)| {
        if i > 0 {
            b.write_char(',');
            b.new_line();
        }
        item.write_sql(b)
    });
    b.decrease_indent(LIST_INDENT);
    result
}

/// Values that can appear in a SELECT list or RETURNING clause.
///
/// Implemented for projections, typed expressions, columns, column lists and
/// tuples of these.
pub trait IntoProjections {
    fn into_projections(self) -> Vec<Projection>;
}

impl IntoProjections for Projection {
    fn into_projections(self) -> Vec<Projection> {
        vec![self]
    }
}

impl<K: Kind> IntoProjections for Expr<K> {
    fn into_projections(self) -> Vec<Projection> {
        vec![Projection::new(self)]
    }
}

impl<K: Kind> IntoProjections for &Expr<K> {
    fn into_projections(self) -> Vec<Projection> {
        vec![Projection::new(self)]
    }
}

impl<K: Kind> IntoProjections for Column<K> {
    fn into_projections(self) -> Vec<Projection> {
        vec![Projection::new(self.column_ref().clone())]
    }
}

impl<K: Kind> IntoProjections for &Column<K> {
    fn into_projections(self) -> Vec<Projection> {
        vec![Projection::new(self.column_ref().clone())]
    }
}

impl IntoProjections for ColumnList {
    fn into_projections(self) -> Vec<Projection> {
        vec![Projection::all(self.into_refs())]
    }
}

impl IntoProjections for &ColumnList {
    fn into_projections(self) -> Vec<Projection> {
        vec![Projection::all(self.refs().to_vec())]
    }
}

impl<T: IntoProjections> IntoProjections for Vec<T> {
    fn into_projections(self) -> Vec<Projection> {
        self.into_iter()
            .flat_map(IntoProjections::into_projections)
            .collect()
    }
}

macro_rules! impl_into_projections_tuple {
    ($($t:ident),+) => {
        impl<$($t: IntoProjections),+> IntoProjections for ($($t,)+) {
            #[allow(non_snake_case)]
            fn into_projections(self) -> Vec<Projection> {
                let ($($t,)+) = self;
                let mut out = Vec::new();
                $(out.extend($t.into_projections());)+
                out
            }
        }
    };
}

impl_into_projections_tuple!(A);
impl_into_projections_tuple!(A, B);
impl_into_projections_tuple!(A, B, C);
impl_into_projections_tuple!(A, B, C, D);
impl_into_projections_tuple!(A, B, C, D, E);
impl_into_projections_tuple!(A, B, C, D, E, F);
impl_into_projections_tuple!(A, B, C, D, E, F, G);
impl_into_projections_tuple!(A, B, C, D, E, F, G, H);
impl_into_projections_tuple!(A, B, C, D, E, F, G, H, I);
impl_into_projections_tuple!(A, B, C, D, E, F, G, H, I, J);
impl_into_projections_tuple!(A, B, C, D, E, F, G, H, I, J, L);
impl_into_projections_tuple!(A, B, C, D, E, F, G, H, I, J, L, M);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PostgresDialect;
    use crate::expr::{func, int};

    fn render(items: impl IntoProjections) -> String {
        let dialect = PostgresDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        write_projections(&mut b, &items.into_projections()).unwrap();
        b.finish().0
    }

    #[test]
    fn test_column_gets_dotted_alias() {
        let id = ColumnRef::new("users", "id", ExprKind::Integer);
        assert_eq!(render(Projection::new(id)), "users.id AS \"users.id\"");
    }

    #[test]
    fn test_expression_alias_and_layout() {
        let id = ColumnRef::new("users", "id", ExprKind::Integer);
        let sql = render((Projection::new(id), func::count_star().as_("total"), int(1)));
        assert_eq!(
            sql,
            "users.id AS \"users.id\",\n       COUNT(*) AS \"total\",\n       $1"
        );
    }

    #[test]
    fn test_exported_columns() {
        let id = ColumnRef::new("users", "id", ExprKind::Integer);
        let p = Projection::new(id);
        assert_eq!(
            p.exported(),
            vec![ExportedColumn {
                alias: String::from("users.id"),
                kind: ExprKind::Integer
            }]
        );
        assert!(Projection::new(int(1)).exported().is_empty());
        assert_eq!(int(1).as_("one").exported()[0].alias, "one");
    }
}
