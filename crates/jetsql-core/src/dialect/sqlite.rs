use super::{Dialect, Feature, OverrideFn};
use crate::error::{BuildError, Result};
use crate::expr::operator::{binary_operands, write_binary, write_call};
use crate::expr::{Expression, IntervalLiteral};
use crate::render::SqlBuilder;
use crate::value::SqlValue;

/// SQLite dialect (3.35 and later).
///
/// - Identifiers and aliases are quoted with double quotes.
/// - Placeholders are `?`.
/// - `IS [NOT] DISTINCT FROM` is spelled `IS NOT` / `IS`.
/// - Bitwise XOR is emulated as `(~(a & b)) & (a | b)`.
/// - Temporal literals go through `DATE()`, `TIME()` and `DATETIME()`.
/// - Compound-select operands are never parenthesized.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

const RESERVED: &[&str] = &[
    "ABORT", "ACTION", "AFTER", "ATTACH", "AUTOINCREMENT", "BEFORE", "BEGIN", "CASCADE",
    "CAST", "COLLATE", "COMMIT", "CONFLICT", "DATABASE", "DEFERRABLE", "DETACH", "EACH",
    "END", "ESCAPE", "EXCLUSIVE", "EXPLAIN", "FAIL", "GLOB", "IF", "IGNORE", "IMMEDIATE",
    "INDEX", "INDEXED", "INSTEAD", "ISNULL", "MATCH", "NATURAL", "NO", "NOTNULL", "OF",
    "OFFSET", "PLAN", "PRAGMA", "QUERY", "RAISE", "RECURSIVE", "REGEXP", "REINDEX",
    "RELEASE", "RENAME", "REPLACE", "RESTRICT", "ROLLBACK", "ROW", "SAVEPOINT", "TEMP",
    "TEMPORARY", "TRANSACTION", "TRIGGER", "VACUUM", "VIEW", "VIRTUAL", "WITHOUT",
];

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn reserved_words(&self) -> &'static [&'static str] {
        RESERVED
    }

    fn operator_override(&self, symbol: &str) -> Option<OverrideFn> {
        match symbol {
            "IS DISTINCT FROM" => Some(is_not),
            "IS NOT DISTINCT FROM" => Some(is),
            "#" => Some(bit_xor),
            "REGEXP_LIKE" => Some(regexp),
            "NOT REGEXP_LIKE" => Some(not_regexp),
            "REGEXP_LIKE_CI" | "NOT REGEXP_LIKE_CI" => Some(regexp_case_insensitive),
            "GREATEST" => Some(greatest),
            "LEAST" => Some(least),
            _ => None,
        }
    }

    fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::Returning
            | Feature::OnConflict
            | Feature::NullsOrdering
            | Feature::FullJoin
            | Feature::RowAssignment
            | Feature::MaterializedCte
            | Feature::UpdateFrom => true,
            Feature::OnConflictConstraint
            | Feature::OnDuplicateKeyUpdate
            | Feature::DistinctOn
            | Feature::FetchFirst
            | Feature::WithTies
            | Feature::RowLock(_)
            | Feature::LockInShareMode
            | Feature::Lateral
            | Feature::ValuesColumnAliases
            | Feature::ParenthesizedSetOperands
            | Feature::DeleteUsing
            | Feature::DeleteOrderLimit
            | Feature::Interval
            | Feature::LockTable
            | Feature::LockMode(_)
            | Feature::UnlockTables
            | Feature::CaseInsensitiveRegex => false,
        }
    }

    fn write_typed_literal(&self, b: &mut SqlBuilder<'_>, value: &SqlValue) -> Result<()> {
        let function = match value {
            SqlValue::Date(_) => "DATE",
            SqlValue::Time(_) => "TIME",
            SqlValue::Timestamp(_) | SqlValue::TimestampTz(_) => "DATETIME",
            _ => {
                b.bind_argument(value.clone());
                return Ok(());
            }
        };
        b.write_str(function);
        b.write_char('(');
        b.bind_argument(value.clone());
        b.write_char(')');
        Ok(())
    }

    fn write_interval(&self, b: &mut SqlBuilder<'_>, interval: &IntervalLiteral) -> Result<()> {
        let _ = (b, interval);
        self.require(Feature::Interval)
    }

    fn offset_without_limit(&self) -> Option<&'static str> {
        Some("-1")
    }
}

fn is_not(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    let (lhs, rhs) = binary_operands("IS DISTINCT FROM", operands)?;
    write_binary(b, lhs, "IS NOT", rhs)
}

fn is(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    let (lhs, rhs) = binary_operands("IS NOT DISTINCT FROM", operands)?;
    write_binary(b, lhs, "IS", rhs)
}

/// SQLite has no XOR operator: `a # b` becomes `(~(a & b)) & (a | b)`.
fn bit_xor(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    let (lhs, rhs) = binary_operands("#", operands)?;
    b.write_str("((~");
    write_binary(b, lhs, "&", rhs)?;
    b.write_str(") & ");
    write_binary(b, lhs, "|", rhs)?;
    b.write_char(')');
    Ok(())
}

fn regexp(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    let (lhs, rhs) = binary_operands("REGEXP", operands)?;
    write_binary(b, lhs, "REGEXP", rhs)
}

fn not_regexp(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    let (lhs, rhs) = binary_operands("NOT REGEXP", operands)?;
    write_binary(b, lhs, "NOT REGEXP", rhs)
}

fn regexp_case_insensitive(b: &mut SqlBuilder<'_>, _operands: &[Expression]) -> Result<()> {
    Err(BuildError::Unsupported {
        dialect: b.dialect().name(),
        feature: Feature::CaseInsensitiveRegex,
    })
}

fn greatest(b: &mut SqlBuilder<'_>, args: &[Expression]) -> Result<()> {
    write_call(b, "MAX", args)
}

fn least(b: &mut SqlBuilder<'_>, args: &[Expression]) -> Result<()> {
    write_call(b, "MIN", args)
}
