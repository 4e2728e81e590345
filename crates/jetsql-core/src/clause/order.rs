use crate::dialect::Feature;
use crate::error::Result;
use crate::expr::kind::Kind;
use crate::expr::{Expr, Expression};
use crate::render::{SqlBuilder, WriteSql};
use crate::table::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

/// An ORDER BY entry.
#[derive(Debug, Clone)]
#[must_use]
pub struct OrderByItem {
    expr: Expression,
    direction: Option<Direction>,
    nulls: Option<NullsOrder>,
}

impl OrderByItem {
    /// Orders by `e` without an explicit direction.
    pub fn new(e: impl Into<Expression>) -> Self {
        Self {
            expr: e.into(),
            direction: None,
            nulls: None,
        }
    }

    pub fn asc(e: impl Into<Expression>) -> Self {
        Self {
            direction: Some(Direction::Asc),
            ..Self::new(e)
        }
    }

    pub fn desc(e: impl Into<Expression>) -> Self {
        Self {
            direction: Some(Direction::Desc),
            ..Self::new(e)
        }
    }

    /// Adds `NULLS FIRST`. Not every dialect accepts it.
    pub const fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullsOrder::First);
        self
    }

    /// Adds `NULLS LAST`. Not every dialect accepts it.
    pub const fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullsOrder::Last);
        self
    }
}

impl WriteSql for OrderByItem {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        self.expr.write_sql(b)?;
        match self.direction {
            Some(Direction::Asc) => b.write_str(" ASC"),
            Some(Direction::Desc) => b.write_str(" DESC"),
            None => {}
        }
        if let Some(nulls) = self.nulls {
            b.dialect().require(Feature::NullsOrdering)?;
            b.write_str(match nulls {
                NullsOrder::First => " NULLS FIRST",
                NullsOrder::Last => " NULLS LAST",
            });
        }
        Ok(())
    }
}

/// Values accepted by `order_by`.
pub trait IntoOrderBy {
    fn into_order_by(self) -> Vec<OrderByItem>;
}

impl IntoOrderBy for OrderByItem {
    fn into_order_by(self) -> Vec<OrderByItem> {
        vec![self]
    }
}

impl<K: Kind> IntoOrderBy for Expr<K> {
    fn into_order_by(self) -> Vec<OrderByItem> {
        vec![OrderByItem::new(self)]
    }
}

impl<K: Kind> IntoOrderBy for &Column<K> {
    fn into_order_by(self) -> Vec<OrderByItem> {
        vec![OrderByItem::new(self.column_ref().clone())]
    }
}

impl<T: IntoOrderBy> IntoOrderBy for Vec<T> {
    fn into_order_by(self) -> Vec<OrderByItem> {
        self.into_iter().flat_map(IntoOrderBy::into_order_by).collect()
    }
}

macro_rules! impl_into_order_by_tuple {
    ($($t:ident),+) => {
        impl<$($t: IntoOrderBy),+> IntoOrderBy for ($($t,)+) {
            #[allow(non_snake_case)]
            fn into_order_by(self) -> Vec<OrderByItem> {
                let ($($t,)+) = self;
                let mut out = Vec::new();
                $(out.extend($t.into_order_by());)+
                out
            }
        }
    };
}

impl_into_order_by_tuple!(A);
impl_into_order_by_tuple!(A, B);
impl_into_order_by_tuple!(A, B, C);
impl_into_order_by_tuple!(A, B, C, D);
impl_into_order_by_tuple!(A, B, C, D, E);
impl_into_order_by_tuple!(A, B, C, D, E, F);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, SqliteDialect};
    use crate::expr::int;
    use crate::FaultKind;

    #[test]
    fn test_nulls_ordering_checked_per_dialect() {
        let item = int(1).desc().nulls_last();
        let sqlite = SqliteDialect::new();
        let mut b = SqlBuilder::new(&sqlite);
        item.write_sql(&mut b).unwrap();
        assert_eq!(b.as_str(), "? DESC NULLS LAST");

        let mysql = MySqlDialect::new();
        let mut b = SqlBuilder::new(&mysql);
        let err = item.write_sql(&mut b).unwrap_err();
        assert_eq!(err.kind(), FaultKind::Unsupported);
    }

    #[test]
    fn test_tuple_order_by() {
        let items = (int(1).asc(), int(2)).into_order_by();
        assert_eq!(items.len(), 2);
    }
}
