use super::{Dialect, Feature, OverrideFn};
use crate::error::{BuildError, Result};
use crate::expr::operator::{binary_operands, write_binary};
use crate::expr::{Expression, IntervalLiteral, IntervalUnit};
use crate::render::{SqlBuilder, WriteSql};
use crate::statement::{LockStatement, TableLockMode};
use crate::value::{hex, quote_text, SqlValue};

/// PostgreSQL dialect.
///
/// - Identifiers and aliases are quoted with double quotes.
/// - Placeholders are numbered: `$1`, `$2`, ...
/// - Casts use the `::type` shorthand.
/// - Regular expressions use `~`, `~*`, `!~` and `!~*`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

const RESERVED: &[&str] = &[
    "ANALYSE", "ANALYZE", "ANY", "ARRAY", "ASYMMETRIC", "BOTH", "CAST", "COLLATE",
    "CURRENT_CATALOG", "CURRENT_ROLE", "CURRENT_USER", "DEFERRABLE", "DO", "END", "FETCH",
    "GRANT", "ILIKE", "INITIALLY", "LATERAL", "LEADING", "LOCALTIME", "LOCALTIMESTAMP",
    "OFFSET", "ONLY", "PLACING", "RETURNING", "SESSION_USER", "SOME", "SYMMETRIC", "TRAILING",
    "USER", "VARIADIC", "WINDOW",
];

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn reserved_words(&self) -> &'static [&'static str] {
        RESERVED
    }

    fn argument_placeholder(&self, ordinal: usize) -> String {
        format!("${ordinal}")
    }

    fn operator_override(&self, symbol: &str) -> Option<OverrideFn> {
        match symbol {
            "REGEXP_LIKE" => Some(regexp_match),
            "REGEXP_LIKE_CI" => Some(regexp_match_ci),
            "NOT REGEXP_LIKE" => Some(not_regexp_match),
            "NOT REGEXP_LIKE_CI" => Some(not_regexp_match_ci),
            _ => None,
        }
    }

    fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::Returning
            | Feature::OnConflict
            | Feature::OnConflictConstraint
            | Feature::DistinctOn
            | Feature::FetchFirst
            | Feature::WithTies
            | Feature::NullsOrdering
            | Feature::RowLock(_)
            | Feature::FullJoin
            | Feature::Lateral
            | Feature::RowAssignment
            | Feature::MaterializedCte
            | Feature::ValuesColumnAliases
            | Feature::ParenthesizedSetOperands
            | Feature::UpdateFrom
            | Feature::DeleteUsing
            | Feature::Interval
            | Feature::LockTable
            | Feature::CaseInsensitiveRegex => true,
            Feature::LockMode(mode) => !matches!(mode, TableLockMode::Read | TableLockMode::Write),
            Feature::OnDuplicateKeyUpdate
            | Feature::LockInShareMode
            | Feature::DeleteOrderLimit
            | Feature::UnlockTables => false,
        }
    }

    fn inline_value(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Blob(bytes) => format!("'\\x{}'::bytea", hex(bytes)),
            other => other.to_sql_inline(),
        }
    }

    fn write_cast(&self, b: &mut SqlBuilder<'_>, inner: &Expression, target: &str) -> Result<()> {
        inner.write_sql(b)?;
        b.write_str("::");
        b.write_str(&target.to_ascii_lowercase());
        Ok(())
    }

    fn write_typed_literal(&self, b: &mut SqlBuilder<'_>, value: &SqlValue) -> Result<()> {
        let target = match value {
            SqlValue::Date(_) => "date",
            SqlValue::Time(_) => "time",
            SqlValue::Timestamp(_) => "timestamp",
            SqlValue::TimestampTz(_) => "timestamptz",
            _ => {
                b.bind_argument(value.clone());
                return Ok(());
            }
        };
        b.bind_argument(value.clone());
        b.write_str("::");
        b.write_str(target);
        Ok(())
    }

    fn write_interval(&self, b: &mut SqlBuilder<'_>, interval: &IntervalLiteral) -> Result<()> {
        let unit = interval.unit();
        b.write_str("INTERVAL ");
        if let Some(fields) = postgres_fields(unit) {
            b.write_str(&quote_text(interval.value()));
            b.write_char(' ');
            b.write_str(fields);
            return Ok(());
        }
        if unit == IntervalUnit::Quarter {
            return Err(BuildError::malformed(
                "interval",
                interval.value(),
                "postgres intervals have no QUARTER unit",
            ));
        }
        b.write_str(&quote_text(&format!("{} {}", interval.value(), unit.as_sql())));
        Ok(())
    }

    fn write_lock_statement(&self, b: &mut SqlBuilder<'_>, stmt: &LockStatement) -> Result<()> {
        b.write_str("LOCK TABLE ");
        b.write_list(stmt.tables(), ", ", |b, table| table.write_sql(b))?;
        if let Some(mode) = stmt.mode() {
            self.require(Feature::LockMode(mode))?;
            b.write_str(" IN ");
            b.write_str(mode.as_sql());
            b.write_str(" MODE");
        }
        if stmt.is_nowait() {
            b.write_str(" NOWAIT");
        }
        Ok(())
    }
}

/// Interval field qualifiers for compound units.
const fn postgres_fields(unit: IntervalUnit) -> Option<&'static str> {
    match unit {
        IntervalUnit::YearMonth => Some("YEAR TO MONTH"),
        IntervalUnit::DayHour => Some("DAY TO HOUR"),
        IntervalUnit::DayMinute => Some("DAY TO MINUTE"),
        IntervalUnit::DaySecond | IntervalUnit::DayMicrosecond => Some("DAY TO SECOND"),
        IntervalUnit::HourMinute => Some("HOUR TO MINUTE"),
        IntervalUnit::HourSecond | IntervalUnit::HourMicrosecond => Some("HOUR TO SECOND"),
        IntervalUnit::MinuteSecond | IntervalUnit::MinuteMicrosecond => Some("MINUTE TO SECOND"),
        IntervalUnit::SecondMicrosecond => Some("SECOND"),
        IntervalUnit::Microsecond
        | IntervalUnit::Second
        | IntervalUnit::Minute
        | IntervalUnit::Hour
        | IntervalUnit::Day
        | IntervalUnit::Week
        | IntervalUnit::Month
        | IntervalUnit::Quarter
        | IntervalUnit::Year => None,
    }
}

fn regexp_match(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    let (lhs, rhs) = binary_operands("~", operands)?;
    write_binary(b, lhs, "~", rhs)
}

fn regexp_match_ci(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    let (lhs, rhs) = binary_operands("~*", operands)?;
    write_binary(b, lhs, "~*", rhs)
}

fn not_regexp_match(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    let (lhs, rhs) = binary_operands("!~", operands)?;
    write_binary(b, lhs, "!~", rhs)
}

fn not_regexp_match_ci(b: &mut SqlBuilder<'_>, operands: &[Expression]) -> Result<()> {
    let (lhs, rhs) = binary_operands("!~*", operands)?;
    write_binary(b, lhs, "!~*", rhs)
}
