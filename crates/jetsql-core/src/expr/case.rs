use std::marker::PhantomData;

use super::kind::Kind;
use super::typed::Expr;
use super::{ExprKind, Expression};
use crate::error::{BuildError, Result};
use crate::render::{SqlBuilder, WriteSql};

/// `CASE [operand] WHEN .. THEN .. [ELSE ..] END`
#[derive(Debug, Clone)]
pub struct CaseExpr {
    operand: Option<Box<Expression>>,
    whens: Vec<(Expression, Expression)>,
    otherwise: Option<Box<Expression>>,
    kind: ExprKind,
}

impl CaseExpr {
    #[must_use]
    pub const fn kind(&self) -> ExprKind {
        self.kind
    }
}

impl WriteSql for CaseExpr {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        if self.whens.is_empty() {
            return Err(BuildError::nil_operand("CASE without WHEN"));
        }
        b.write_str("(CASE");
        if let Some(operand) = &self.operand {
            b.write_char(' ');
            operand.write_sql(b)?;
        }
        for (condition, result) in &self.whens {
            b.write_str(" WHEN ");
            condition.write_sql(b)?;
            b.write_str(" THEN ");
            result.write_sql(b)?;
        }
        if let Some(otherwise) = &self.otherwise {
            b.write_str(" ELSE ");
            otherwise.write_sql(b)?;
        }
        b.write_str(" END)");
        Ok(())
    }
}

/// Typed CASE builder producing an `Expr<K>`.
#[derive(Debug, Clone)]
#[must_use]
pub struct Case<K> {
    node: CaseExpr,
    _kind: PhantomData<K>,
}

/// Searched CASE: each WHEN is a boolean condition.
pub fn case<K: Kind>() -> Case<K> {
    Case {
        node: CaseExpr {
            operand: None,
            whens: Vec::new(),
            otherwise: None,
            kind: K::KIND,
        },
        _kind: PhantomData,
    }
}

/// Simple CASE: each WHEN is compared with `operand`.
pub fn case_of<K: Kind>(operand: impl Into<Expression>) -> Case<K> {
    let mut builder = case();
    builder.node.operand = Some(Box::new(operand.into()));
    builder
}

impl<K: Kind> Case<K> {
    pub fn when(mut self, condition: impl Into<Expression>, then: impl Into<Expr<K>>) -> Self {
        self.node
            .whens
            .push((condition.into(), then.into().into_expression()));
        self
    }

    pub fn otherwise(mut self, value: impl Into<Expr<K>>) -> Self {
        self.node.otherwise = Some(Box::new(value.into().into_expression()));
        self
    }

    /// Finishes the builder.
    pub fn end(self) -> Expr<K> {
        Expr::from_expression(Expression::Case(self.node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PostgresDialect;
    use crate::expr::kind::Text;
    use crate::expr::{int, lit};
    use crate::FaultKind;

    fn render(e: impl Into<Expression>) -> Result<String> {
        let dialect = PostgresDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        e.into().write_sql(&mut b)?;
        Ok(b.finish().0)
    }

    #[test]
    fn test_searched_case() {
        let e = case::<Text>()
            .when(int(1).gt(0), "positive")
            .otherwise("other")
            .end();
        assert_eq!(
            render(e).unwrap(),
            "(CASE WHEN ($1 > $2) THEN $3 ELSE $4 END)"
        );
    }

    #[test]
    fn test_simple_case() {
        let e = case_of::<Text>(int(1)).when(int(1), lit("one")).end();
        assert_eq!(render(e).unwrap(), "(CASE $1 WHEN $2 THEN $3 END)");
    }

    #[test]
    fn test_case_without_when() {
        let err = render(case::<Text>().otherwise("x").end()).unwrap_err();
        assert_eq!(err.kind(), FaultKind::NilOperand);
    }
}
