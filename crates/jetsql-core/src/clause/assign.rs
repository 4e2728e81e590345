use crate::dialect::Feature;
use crate::error::{BuildError, Result};
use crate::expr::kind::Kind;
use crate::expr::{ColumnRef, Expr, Expression};
use crate::render::{SqlBuilder, WriteSql};
use crate::table::Column;

/// `col = value` or `(c1, c2) = (v1, v2)` in a SET list.
#[derive(Debug, Clone)]
pub struct Assignment {
    columns: Vec<ColumnRef>,
    values: Vec<Expression>,
}

impl Assignment {
    /// Pairs `columns` with `values`. A count mismatch fails at render time.
    #[must_use]
    pub const fn new(columns: Vec<ColumnRef>, values: Vec<Expression>) -> Self {
        Self { columns, values }
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnRef] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[Expression] {
        &self.values
    }
}

fn write_target(b: &mut SqlBuilder<'_>, column: &ColumnRef) -> Result<()> {
    b.with_short_names(|b| column.write_sql(b))
}

fn write_single(b: &mut SqlBuilder<'_>, column: &ColumnRef, value: &Expression) -> Result<()> {
    write_target(b, column)?;
    b.write_str(" = ");
    value.write_sql(b)
}

impl WriteSql for Assignment {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        match (self.columns.as_slice(), self.values.as_slice()) {
            ([], _) => Err(BuildError::nil_operand("SET without columns")),
            ([column], [value]) => write_single(b, column, value),
            (columns, [sub @ Expression::Subquery(_)]) if columns.len() > 1 => {
                b.dialect().require(Feature::RowAssignment)?;
                b.write_char('(');
                b.write_list(columns, ", ", write_target)?;
                b.write_str(") = ");
                sub.write_sql(b)
            }
            (columns, values) if columns.len() != values.len() => Err(BuildError::shape(format!(
                "SET lists {} columns but {} values",
                columns.len(),
                values.len()
            ))),
            (columns, values) if b.dialect().supports(Feature::RowAssignment) => {
                b.write_char('(');
                b.write_list(columns, ", ", write_target)?;
                b.write_str(") = (");
                b.write_list(values, ", ", |b, value| value.write_sql(b))?;
                b.write_char(')');
                Ok(())
            }
            (columns, values) => {
                for (i, (column, value)) in columns.iter().zip(values).enumerate() {
                    if i > 0 {
                        b.write_str(", ");
                    }
                    write_single(b, column, value)?;
                }
                Ok(())
            }
        }
    }
}

/// Values accepted where explicit assignments are expected.
pub trait IntoAssignments {
    fn into_assignments(self) -> Vec<Assignment>;
}

impl IntoAssignments for Assignment {
    fn into_assignments(self) -> Vec<Assignment> {
        vec![self]
    }
}

impl IntoAssignments for Vec<Assignment> {
    fn into_assignments(self) -> Vec<Assignment> {
        self
    }
}

macro_rules! impl_into_assignments_tuple {
    ($($t:ident),+) => {
        impl<$($t: IntoAssignments),+> IntoAssignments for ($($t,)+) {
            #[allow(non_snake_case)]
            fn into_assignments(self) -> Vec<Assignment> {
                let ($($t,)+) = self;
                let mut out = Vec::new();
                $(out.extend($t.into_assignments());)+
                out
            }
        }
    };
}

impl_into_assignments_tuple!(A);
impl_into_assignments_tuple!(A, B);
impl_into_assignments_tuple!(A, B, C);
impl_into_assignments_tuple!(A, B, C, D);
impl_into_assignments_tuple!(A, B, C, D, E);
impl_into_assignments_tuple!(A, B, C, D, E, F);
impl_into_assignments_tuple!(A, B, C, D, E, F, G);
impl_into_assignments_tuple!(A, B, C, D, E, F, G, H);

/// A list of expressions: a VALUES row, the right side of SET, a GROUP BY
/// list.
pub trait IntoValues {
    fn into_values(self) -> Vec<Expression>;
}

impl IntoValues for Vec<Expression> {
    fn into_values(self) -> Vec<Expression> {
        self
    }
}

impl<K: Kind> IntoValues for Expr<K> {
    fn into_values(self) -> Vec<Expression> {
        vec![self.into_expression()]
    }
}

impl<K: Kind> IntoValues for &Expr<K> {
    fn into_values(self) -> Vec<Expression> {
        vec![self.into()]
    }
}

impl<K: Kind> IntoValues for Column<K> {
    fn into_values(self) -> Vec<Expression> {
        vec![self.into()]
    }
}

impl<K: Kind> IntoValues for &Column<K> {
    fn into_values(self) -> Vec<Expression> {
        vec![self.into()]
    }
}

macro_rules! impl_into_values_tuple {
    ($($t:ident),+) => {
        impl<$($t: Into<Expression>),+> IntoValues for ($($t,)+) {
            #[allow(non_snake_case)]
            fn into_values(self) -> Vec<Expression> {
                let ($($t,)+) = self;
                vec![$($t.into()),+]
            }
        }
    };
}

impl_into_values_tuple!(A);
impl_into_values_tuple!(A, B);
impl_into_values_tuple!(A, B, C);
impl_into_values_tuple!(A, B, C, D);
impl_into_values_tuple!(A, B, C, D, E);
impl_into_values_tuple!(A, B, C, D, E, F);
impl_into_values_tuple!(A, B, C, D, E, F, G);
impl_into_values_tuple!(A, B, C, D, E, F, G, H);
impl_into_values_tuple!(A, B, C, D, E, F, G, H, I);
impl_into_values_tuple!(A, B, C, D, E, F, G, H, I, J);
impl_into_values_tuple!(A, B, C, D, E, F, G, H, I, J, L);
impl_into_values_tuple!(A, B, C, D, E, F, G, H, I, J, L, M);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, MySqlDialect, PostgresDialect};
    use crate::expr::ExprKind;
    use crate::FaultKind;

    fn cols() -> Vec<ColumnRef> {
        vec![
            ColumnRef::new("users", "name", ExprKind::String),
            ColumnRef::new("users", "age", ExprKind::Integer),
        ]
    }

    fn render(a: &Assignment, dialect: &dyn Dialect) -> Result<String> {
        let mut b = SqlBuilder::new(dialect);
        a.write_sql(&mut b)?;
        Ok(b.finish().0)
    }

    #[test]
    fn test_row_assignment() {
        let a = Assignment::new(cols(), ("bob", 30).into_values());
        assert_eq!(
            render(&a, &PostgresDialect::new()).unwrap(),
            "(name, age) = ($1, $2)"
        );
    }

    #[test]
    fn test_mysql_expands_row_assignment() {
        let a = Assignment::new(cols(), ("bob", 30).into_values());
        assert_eq!(
            render(&a, &MySqlDialect::new()).unwrap(),
            "name = ?, age = ?"
        );
    }

    #[test]
    fn test_count_mismatch() {
        let a = Assignment::new(cols(), ("bob",).into_values());
        let err = render(&a, &PostgresDialect::new()).unwrap_err();
        assert_eq!(err.kind(), FaultKind::ShapeMismatch);
    }
}
