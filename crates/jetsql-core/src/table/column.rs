use std::ops::Deref;

use crate::clause::Assignment;
use crate::expr::kind::Kind;
use crate::expr::{ColumnRef, Expr, Expression};

/// A typed column of a table, sub-query or CTE.
///
/// Dereferences to [`Expr<K>`], so every operator available for the kind is
/// available on the column itself:
///
/// ```rust
/// use jetsql_core::expr::kind::Integer;
/// use jetsql_core::table::Column;
///
/// let id: Column<Integer> = Column::new("users", "id");
/// let predicate = id.gt(10);
/// # let _ = predicate;
/// ```
#[derive(Debug, Clone)]
pub struct Column<K> {
    column: ColumnRef,
    expr: Expr<K>,
}

impl<K: Kind> Column<K> {
    /// A column `name` of `table`.
    #[must_use]
    pub fn new(table: &str, name: &str) -> Self {
        Self::from_ref(ColumnRef::new(table, name, K::KIND))
    }

    /// A column without table qualification.
    #[must_use]
    pub fn unqualified(name: &str) -> Self {
        Self::from_ref(ColumnRef::unqualified(name, K::KIND))
    }

    #[must_use]
    pub fn from_ref(column: ColumnRef) -> Self {
        let expr = Expr::from_expression(Expression::Column(column.clone()));
        Self { column, expr }
    }

    #[must_use]
    pub const fn column_ref(&self) -> &ColumnRef {
        &self.column
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.column.name()
    }

    /// The same column seen through a table alias.
    #[must_use]
    pub fn rebase(&self, table: &str) -> Self {
        Self::from_ref(self.column.rebase(table))
    }

    /// `col = value`, for UPDATE and upsert SET lists.
    #[must_use]
    pub fn set(&self, value: impl Into<Expr<K>>) -> Assignment {
        Assignment::new(
            vec![self.column.clone()],
            vec![value.into().into_expression()],
        )
    }

    /// The value proposed for insertion: `excluded.col`, or `VALUES(col)`
    /// on MySQL.
    #[must_use]
    pub fn excluded(&self) -> Expr<K> {
        Expr::from_expression(Expression::Excluded(self.column.clone()))
    }
}

impl<K> Deref for Column<K> {
    type Target = Expr<K>;

    fn deref(&self) -> &Expr<K> {
        &self.expr
    }
}

impl<K: Kind> From<Column<K>> for Expr<K> {
    fn from(column: Column<K>) -> Self {
        column.expr
    }
}

impl<K: Kind> From<&Column<K>> for Expr<K> {
    fn from(column: &Column<K>) -> Self {
        column.expr.clone()
    }
}

impl<K: Kind> From<Column<K>> for Expression {
    fn from(column: Column<K>) -> Self {
        Self::Column(column.column)
    }
}

impl<K: Kind> From<&Column<K>> for Expression {
    fn from(column: &Column<K>) -> Self {
        Self::Column(column.column.clone())
    }
}

/// An untyped list of columns, e.g. every column of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnList {
    refs: Vec<ColumnRef>,
}

impl ColumnList {
    #[must_use]
    pub const fn new(refs: Vec<ColumnRef>) -> Self {
        Self { refs }
    }

    #[must_use]
    pub fn refs(&self) -> &[ColumnRef] {
        &self.refs
    }

    #[must_use]
    pub fn into_refs(self) -> Vec<ColumnRef> {
        self.refs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// The list without `columns`, compared by name.
    #[must_use]
    pub fn except(&self, columns: impl Columns) -> Self {
        let excluded = columns.into_column_refs();
        Self {
            refs: self
                .refs
                .iter()
                .filter(|c| !excluded.iter().any(|e| e.name() == c.name()))
                .cloned()
                .collect(),
        }
    }
}

/// Values naming a list of target columns: INSERT column lists, UPDATE
/// targets and conflict targets.
pub trait Columns {
    fn into_column_refs(self) -> Vec<ColumnRef>;
}

impl Columns for () {
    fn into_column_refs(self) -> Vec<ColumnRef> {
        Vec::new()
    }
}

impl<K: Kind> Columns for Column<K> {
    fn into_column_refs(self) -> Vec<ColumnRef> {
        vec![self.column]
    }
}

impl<K: Kind> Columns for &Column<K> {
    fn into_column_refs(self) -> Vec<ColumnRef> {
        vec![self.column.clone()]
    }
}

impl Columns for ColumnList {
    fn into_column_refs(self) -> Vec<ColumnRef> {
        self.refs
    }
}

impl Columns for &ColumnList {
    fn into_column_refs(self) -> Vec<ColumnRef> {
        self.refs.clone()
    }
}

impl Columns for Vec<ColumnRef> {
    fn into_column_refs(self) -> Vec<ColumnRef> {
        self
    }
}

macro_rules! impl_columns_tuple {
    ($($t:ident),+) => {
        impl<$($t: Columns),+> Columns for ($($t,)+) {
            #[allow(non_snake_case)]
            fn into_column_refs(self) -> Vec<ColumnRef> {
                let ($($t,)+) = self;
                let mut out = Vec::new();
                $(out.extend($t.into_column_refs());)+
                out
            }
        }
    };
}

impl_columns_tuple!(A);
impl_columns_tuple!(A, B);
impl_columns_tuple!(A, B, C);
impl_columns_tuple!(A, B, C, D);
impl_columns_tuple!(A, B, C, D, E);
impl_columns_tuple!(A, B, C, D, E, F);
impl_columns_tuple!(A, B, C, D, E, F, G);
impl_columns_tuple!(A, B, C, D, E, F, G, H);
impl_columns_tuple!(A, B, C, D, E, F, G, H, I);
impl_columns_tuple!(A, B, C, D, E, F, G, H, I, J);
impl_columns_tuple!(A, B, C, D, E, F, G, H, I, J, L);
impl_columns_tuple!(A, B, C, D, E, F, G, H, I, J, L, M);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::kind::{Integer, Text};
    use crate::expr::ExprKind;

    #[test]
    fn test_column_derefs_to_expr() {
        let id: Column<Integer> = Column::new("users", "id");
        assert_eq!(id.kind(), ExprKind::Integer);
        let _ = id.eq(1).and(id.lt(10));
    }

    #[test]
    fn test_rebase() {
        let name: Column<Text> = Column::new("users", "name");
        let aliased = name.rebase("u");
        assert_eq!(aliased.column_ref().table(), Some("u"));
        assert_eq!(aliased.column_ref().alias(), "u.name");
    }

    #[test]
    fn test_except() {
        let id: Column<Integer> = Column::new("users", "id");
        let name: Column<Text> = Column::new("users", "name");
        let all = ColumnList::new(vec![id.column_ref().clone(), name.column_ref().clone()]);
        let mutable = all.except(&id);
        assert_eq!(mutable.len(), 1);
        assert_eq!(mutable.refs()[0].name(), "name");
    }

    #[test]
    fn test_tuple_columns() {
        let id: Column<Integer> = Column::new("users", "id");
        let name: Column<Text> = Column::new("users", "name");
        assert_eq!((&id, &name).into_column_refs().len(), 2);
    }
}
