//! Operator nodes and the generic operator renderer.

use super::kind::Kind;
use super::typed::Expr;
use super::{ExprKind, Expression};
use crate::error::{BuildError, Result};
use crate::render::{SqlBuilder, WriteSql};

/// How an operator is laid out around its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorForm {
    /// `(OP x)`
    Prefix,
    /// `(x OP)`
    Postfix,
    /// `(a OP b)`
    Binary,
    /// `(a OP b OP c ...)`
    Variadic,
    /// `(x OP lo AND hi)`
    Between,
    /// `(x OP (a, b, ...))` or `(x OP (subquery))`
    In,
}

/// An operator applied to operands.
#[derive(Debug, Clone)]
pub struct Operator {
    symbol: &'static str,
    form: OperatorForm,
    operands: Vec<Expression>,
    kind: ExprKind,
}

impl Operator {
    /// Creates an operator node.
    #[must_use]
    pub fn new(
        symbol: &'static str,
        form: OperatorForm,
        operands: Vec<Expression>,
        kind: ExprKind,
    ) -> Self {
        Self {
            symbol,
            form,
            operands,
            kind,
        }
    }

    /// `(lhs symbol rhs)`.
    #[must_use]
    pub fn binary(symbol: &'static str, lhs: Expression, rhs: Expression, kind: ExprKind) -> Self {
        Self::new(symbol, OperatorForm::Binary, vec![lhs, rhs], kind)
    }

    /// Operator symbol, also the key for dialect overrides.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        self.symbol
    }

    /// Layout of the operator.
    #[must_use]
    pub const fn form(&self) -> OperatorForm {
        self.form
    }

    /// Operands in order.
    #[must_use]
    pub fn operands(&self) -> &[Expression] {
        &self.operands
    }

    /// Kind of the result.
    #[must_use]
    pub const fn kind(&self) -> ExprKind {
        self.kind
    }
}

impl WriteSql for Operator {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        if let Some(render) = b.dialect().operator_override(self.symbol) {
            return render(b, &self.operands);
        }
        match self.form {
            OperatorForm::Prefix => {
                let [operand] = self.operands.as_slice() else {
                    return Err(arity(self.symbol, "one operand"));
                };
                b.write_char('(');
                b.write_str(self.symbol);
                b.write_char(' ');
                operand.write_sql(b)?;
                b.write_char(')');
                Ok(())
            }
            OperatorForm::Postfix => {
                let [operand] = self.operands.as_slice() else {
                    return Err(arity(self.symbol, "one operand"));
                };
                b.write_char('(');
                operand.write_sql(b)?;
                b.write_char(' ');
                b.write_str(self.symbol);
                b.write_char(')');
                Ok(())
            }
            OperatorForm::Binary => {
                let (lhs, rhs) = binary_operands(self.symbol, &self.operands)?;
                write_binary(b, lhs, self.symbol, rhs)
            }
            OperatorForm::Variadic => {
                if self.operands.is_empty() {
                    return Err(arity(self.symbol, "at least one operand"));
                }
                let separator = format!(" {} ", self.symbol);
                b.write_char('(');
                b.write_list(&self.operands, &separator, |b, e| e.write_sql(b))?;
                b.write_char(')');
                Ok(())
            }
            OperatorForm::Between => {
                let [operand, low, high] = self.operands.as_slice() else {
                    return Err(arity(self.symbol, "an operand and two bounds"));
                };
                b.write_char('(');
                operand.write_sql(b)?;
                b.write_char(' ');
                b.write_str(self.symbol);
                b.write_char(' ');
                low.write_sql(b)?;
                b.write_str(" AND ");
                high.write_sql(b)?;
                b.write_char(')');
                Ok(())
            }
            OperatorForm::In => {
                let Some((operand, list)) = self.operands.split_first() else {
                    return Err(arity(self.symbol, "an operand"));
                };
                if list.is_empty() {
                    return Err(BuildError::nil_operand(format!(
                        "`{}` list is empty",
                        self.symbol
                    )));
                }
                b.write_char('(');
                operand.write_sql(b)?;
                b.write_char(' ');
                b.write_str(self.symbol);
                b.write_char(' ');
                if let [sub @ Expression::Subquery(_)] = list {
                    sub.write_sql(b)?;
                } else {
                    b.write_char('(');
                    b.write_list(list, ", ", |b, e| e.write_sql(b))?;
                    b.write_char(')');
                }
                b.write_char(')');
                Ok(())
            }
        }
    }
}

fn arity(symbol: &str, expected: &str) -> BuildError {
    BuildError::nil_operand(format!("operator `{symbol}` expects {expected}"))
}

/// Splits operands of a binary operator.
pub(crate) fn binary_operands<'a>(
    symbol: &str,
    operands: &'a [Expression],
) -> Result<(&'a Expression, &'a Expression)> {
    match operands {
        [lhs, rhs] => Ok((lhs, rhs)),
        _ => Err(arity(symbol, "two operands")),
    }
}

/// Writes `(lhs symbol rhs)`.
pub(crate) fn write_binary(
    b: &mut SqlBuilder<'_>,
    lhs: &Expression,
    symbol: &str,
    rhs: &Expression,
) -> Result<()> {
    b.write_char('(');
    lhs.write_sql(b)?;
    b.write_char(' ');
    b.write_str(symbol);
    b.write_char(' ');
    rhs.write_sql(b)?;
    b.write_char(')');
    Ok(())
}

/// Writes `name(arg, ...)`.
pub(crate) fn write_call(b: &mut SqlBuilder<'_>, name: &str, args: &[Expression]) -> Result<()> {
    b.write_str(name);
    b.write_char('(');
    b.write_list(args, ", ", |b, e| e.write_sql(b))?;
    b.write_char(')');
    Ok(())
}

/// Applies an arbitrary binary operator, e.g. PostgreSQL's `@>`.
///
/// The result is rendered `(lhs symbol rhs)` unless the dialect overrides
/// `symbol`.
#[must_use]
pub fn binary_operator<K: Kind>(
    lhs: impl Into<Expression>,
    symbol: &'static str,
    rhs: impl Into<Expression>,
) -> Expr<K> {
    Expr::from_expression(Expression::Operator(Operator::binary(
        symbol,
        lhs.into(),
        rhs.into(),
        K::KIND,
    )))
}
