use super::{Dialect, Feature, OverrideFn};
use crate::error::{BuildError, Result};
use crate::expr::operator::{binary_operands, write_binary, write_call};
use crate::expr::{ColumnRef, ExprKind, Expression};
use crate::render::{SqlBuilder, WriteSql};
use crate::statement::{LockStatement, TableLockMode};

/// MySQL dialect (8.0 and later).
///
/// - Identifiers are quoted with backticks, aliases with double quotes.
/// - Placeholders are `?`.
/// - `IS [NOT] DISTINCT FROM` is spelled with the null-safe `<=>` operator.
/// - Integer division renders as `DIV`, string concatenation as `CONCAT(..)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

const RESERVED: &[&str] = &[
    "ACCESSIBLE", "ANALYZE", "DATABASE", "DATABASES", "DIV", "DUAL", "FETCH", "GROUPS",
    "HIGH_PRIORITY", "INDEX", "INTERVAL", "KEY", "KEYS", "LATERAL", "LOCK", "MOD", "OFFSET",
    "OVER", "RANK", "READ", "REGEXP", "RLIKE", "ROW", "ROWS", "SCHEMA", "SEPARATOR", "SHOW",
    "STRAIGHT_JOIN", "UNLOCK", "USAGE", "WINDOW", "WRITE", "XOR", "ZEROFILL",
];

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn reserved_words(&self) -> &'static [&'static str] {
        RESERVED
    }

    fn operator_override(&self, symbol: &str) -> Option<OverrideFn> {
        match symbol {
            "IS DISTINCT FROM" => Some(is_distinct_from),
            "IS NOT DISTINCT FROM" => Some(is_not_distinct_from),
            "#" => Some(bit_xor),
            "||" => Some(concat),
            "/" => Some(division),
            "REGEXP_LIKE" => Some(regexp_like),
            "REGEXP_LIKE_CI" => Some(regexp_like_ci),
            "NOT REGEXP_LIKE" => Some(not_regexp_like),
            "NOT REGEXP_LIKE_CI" => Some(not_regexp_like_ci),
            _ => None,
        }
    }

    fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::OnDuplicateKeyUpdate
            | Feature::LockInShareMode
            | Feature::Lateral
            | Feature::ValuesColumnAliases
            | Feature::ParenthesizedSetOperands
            | Feature::DeleteOrderLimit
            | Feature::Interval
            | Feature::LockTable
            | Feature::UnlockTables
            | Feature::CaseInsensitiveRegex => true,
            Feature::RowLock(strength) => strength.is_standard(),
            Feature::LockMode(mode) => matches!(mode, TableLockMode::Read | TableLockMode::Write),
            Feature::Returning
            | Feature::OnConflict
            | Feature::OnConflictConstraint
            | Feature::DistinctOn
            | Feature::FetchFirst
            | Feature::WithTies
            | Feature::NullsOrdering
            | Feature::FullJoin
            | Feature::RowAssignment
            | Feature::MaterializedCte
            | Feature::UpdateFrom
            | Feature::DeleteUsing => false,
        }
    }

    fn write_excluded(&self, b: &mut SqlBuilder<'_>, column: &ColumnRef) -> Result<()> {
        b.write_str("VALUES(");
        b.write_identifier(column.name());
        b.write_char(')');
        Ok(())
    }

    fn offset_without_limit(&self) -> Option<&'static str> {
        Some("18446744073709551615")
    }

    fn values_row_prefix(&self) -> &'static str {
        "ROW"
    }

    fn write_lock_statement(&self, b: &mut SqlBuilder<'_>, stmt: &LockStatement) -> Result<()> {
        let Some(mode) = stmt.mode() else {
            return Err(BuildError::MissingClause {
                statement: "LOCK",
                clause: "READ/WRITE",
            });
        };
        self.require(Feature::LockMode(mode))?;
        if stmt.is_nowait() {
            return Err(BuildError::shape("MySQL LOCK TABLES has no NOWAIT option"));
        }
        b.write_str("LOCK TABLES ");
        b.write_list(stmt.tables(), ", ", |b, table| {
            table.write_sql(b)?;
            b.write_char(' ');
            b.write_str(mode.as_sql());
            Ok(())
        })
    }

    fn write_unlock_statement(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        b.write_str("UNLOCK TABLES");
        Ok(())
    }
}

fn is_distinct_from(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    let (lhs, rhs) = binary_operands("IS DISTINCT FROM", operands)?;
    b.write_str("(NOT ");
    write_binary(b, lhs, "<=>", rhs)?;
    b.write_char(')');
    Ok(())
}

fn is_not_distinct_from(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    let (lhs, rhs) = binary_operands("IS NOT DISTINCT FROM", operands)?;
    write_binary(b, lhs, "<=>", rhs)
}

fn bit_xor(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    let (lhs, rhs) = binary_operands("#", operands)?;
    write_binary(b, lhs, "^", rhs)
}

fn concat(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    write_call(b, "CONCAT", operands)
}

const fn is_integral(kind: ExprKind) -> bool {
    match kind {
        ExprKind::Integer => true,
        ExprKind::Any
        | ExprKind::Bool
        | ExprKind::Float
        | ExprKind::String
        | ExprKind::Blob
        | ExprKind::Date
        | ExprKind::Time
        | ExprKind::Timestamp
        | ExprKind::Interval
        | ExprKind::Row
        | ExprKind::Array => false,
    }
}

/// `/` always yields a decimal in MySQL; integer operands divide with `DIV`.
fn division(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    let (lhs, rhs) = binary_operands("/", operands)?;
    let symbol = if is_integral(lhs.kind()) && is_integral(rhs.kind()) {
        "DIV"
    } else {
        "/"
    };
    write_binary(b, lhs, symbol, rhs)
}

fn write_regexp_like(
    b: &mut SqlBuilder<'_>,
    operands: &[Expression],
    negate: bool,
    match_type: &str,
) -> Result<()> {
    let (lhs, rhs) = binary_operands("REGEXP_LIKE", operands)?;
    if negate {
        b.write_str("(NOT ");
    }
    b.write_str("REGEXP_LIKE(");
    lhs.write_sql(b)?;
    b.write_str(", ");
    rhs.write_sql(b)?;
    b.write_str(", '");
    b.write_str(match_type);
    b.write_str("')");
    if negate {
        b.write_char(')');
    }
    Ok(())
}

fn regexp_like(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    write_regexp_like(b, operands, false, "c")
}

fn regexp_like_ci(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    write_regexp_like(b, operands, false, "i")
}

fn not_regexp_like(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    write_regexp_like(b, operands, true, "c")
}

fn not_regexp_like_ci(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    write_regexp_like(b, operands, true, "i")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{int, lit};

    fn render(e: &Expression) -> (String, usize) {
        let dialect = MySqlDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        e.write_sql(&mut b).unwrap();
        let (sql, args) = b.finish();
        (sql, args.len())
    }

    #[test]
    fn test_integer_division_uses_div() {
        let e = int(7).div(int(2));
        assert_eq!(render(&e.into()).0, "(? DIV ?)");
    }

    #[test]
    fn test_float_division_keeps_slash() {
        let e = lit(7.5).div(lit(2.0));
        assert_eq!(render(&e.into()).0, "(? / ?)");
    }

    #[test]
    fn test_is_distinct_from() {
        let e = int(1).is_distinct_from(int(2));
        assert_eq!(render(&e.into()).0, "(NOT (? <=> ?))");
        let e = int(1).is_not_distinct_from(int(2));
        assert_eq!(render(&e.into()).0, "(? <=> ?)");
    }

    #[test]
    fn test_xor_and_concat() {
        let e = int(1).bit_xor(int(2));
        assert_eq!(render(&e.into()).0, "(? ^ ?)");
        let e = lit("a").concat(lit("b"));
        assert_eq!(render(&e.into()), (String::from("CONCAT(?, ?)"), 2));
    }

    #[test]
    fn test_regexp_like() {
        let e = lit("abc").regexp_like(lit("^a"), false);
        assert_eq!(render(&e.into()).0, "REGEXP_LIKE(?, ?, 'i')");
        let e = lit("abc").not_regexp_like(lit("^a"), true);
        assert_eq!(render(&e.into()).0, "(NOT REGEXP_LIKE(?, ?, 'c'))");
    }
}
