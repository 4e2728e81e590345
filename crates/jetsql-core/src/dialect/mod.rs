//! SQL Dialect support.
//!
//! Different databases spell the same tree differently: quoting, placeholders,
//! a handful of operators and whole clauses. A [`Dialect`] is an immutable value
//! passed to every render call; nothing about it is global.

mod mysql;
mod postgres;
mod sqlite;

use std::fmt;

pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::clause::LockStrength;
use crate::error::{BuildError, Result};
use crate::expr::{ColumnRef, Expression, IntervalLiteral};
use crate::render::{SqlBuilder, WriteSql};
use crate::statement::{LockStatement, TableLockMode};
use crate::value::SqlValue;

/// Renders an operator or function call in place of the generic renderer.
///
/// Receives the operands (or call arguments) in order.
pub type OverrideFn = fn(&mut SqlBuilder<'_>, &[Expression]) -> Result<()>;

/// Constructs whose availability differs between dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Returning,
    OnConflict,
    OnConflictConstraint,
    OnDuplicateKeyUpdate,
    DistinctOn,
    FetchFirst,
    WithTies,
    NullsOrdering,
    RowLock(LockStrength),
    LockInShareMode,
    FullJoin,
    Lateral,
    RowAssignment,
    MaterializedCte,
    ValuesColumnAliases,
    ParenthesizedSetOperands,
    UpdateFrom,
    DeleteUsing,
    DeleteOrderLimit,
    Interval,
    LockTable,
    LockMode(TableLockMode),
    UnlockTables,
    CaseInsensitiveRegex,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Returning => f.write_str("RETURNING"),
            Self::OnConflict => f.write_str("ON CONFLICT"),
            Self::OnConflictConstraint => f.write_str("ON CONFLICT ON CONSTRAINT"),
            Self::OnDuplicateKeyUpdate => f.write_str("ON DUPLICATE KEY UPDATE"),
            Self::DistinctOn => f.write_str("DISTINCT ON"),
            Self::FetchFirst => f.write_str("FETCH FIRST"),
            Self::WithTies => f.write_str("FETCH FIRST ... WITH TIES"),
            Self::NullsOrdering => f.write_str("NULLS FIRST/LAST"),
            Self::RowLock(strength) => write!(f, "FOR {}", strength.as_sql()),
            Self::LockInShareMode => f.write_str("LOCK IN SHARE MODE"),
            Self::FullJoin => f.write_str("FULL JOIN"),
            Self::Lateral => f.write_str("LATERAL"),
            Self::RowAssignment => f.write_str("row-value SET"),
            Self::MaterializedCte => f.write_str("MATERIALIZED CTE hints"),
            Self::ValuesColumnAliases => f.write_str("column aliases on derived tables"),
            Self::ParenthesizedSetOperands => f.write_str("parenthesized set operands"),
            Self::UpdateFrom => f.write_str("UPDATE ... FROM"),
            Self::DeleteUsing => f.write_str("DELETE ... USING"),
            Self::DeleteOrderLimit => f.write_str("DELETE ... ORDER BY/LIMIT"),
            Self::Interval => f.write_str("INTERVAL literals"),
            Self::LockTable => f.write_str("LOCK TABLE"),
            Self::LockMode(mode) => write!(f, "lock mode {}", mode.as_sql()),
            Self::UnlockTables => f.write_str("UNLOCK TABLES"),
            Self::CaseInsensitiveRegex => f.write_str("case-insensitive REGEXP"),
        }
    }
}

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns the quote character used around column aliases.
    fn alias_quote(&self) -> char {
        '"'
    }

    /// Upper-case words, beyond [`COMMON_RESERVED`], that must be quoted when
    /// used as identifiers.
    fn reserved_words(&self) -> &'static [&'static str];

    /// Returns the placeholder for the 1-based argument `ordinal`.
    fn argument_placeholder(&self, ordinal: usize) -> String {
        let _ = ordinal;
        String::from("?")
    }

    /// Returns a renderer for `symbol` when this dialect spells it differently.
    fn operator_override(&self, symbol: &str) -> Option<OverrideFn> {
        let _ = symbol;
        None
    }

    /// Returns whether the dialect can express `feature`.
    fn supports(&self, feature: Feature) -> bool;

    /// Fails with [`BuildError::Unsupported`] unless `feature` is supported.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Unsupported`] naming this dialect.
    fn require(&self, feature: Feature) -> Result<()> {
        if self.supports(feature) {
            Ok(())
        } else {
            Err(BuildError::Unsupported {
                dialect: self.name(),
                feature,
            })
        }
    }

    /// Returns whether `word` is reserved in this dialect.
    fn is_reserved(&self, word: &str) -> bool {
        reserved_in(self.reserved_words(), word)
    }

    /// Quotes an identifier if necessary.
    fn quote_identifier(&self, name: &str) -> String {
        if is_plain_identifier(name) && !self.is_reserved(name) {
            return String::from(name);
        }
        let quote = self.identifier_quote();
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(quote);
        for c in name.chars() {
            if c == quote {
                quoted.push(quote);
            }
            quoted.push(c);
        }
        quoted.push(quote);
        quoted
    }

    /// Inline representation of a value for debug rendering.
    fn inline_value(&self, value: &SqlValue) -> String {
        value.to_sql_inline()
    }

    /// Writes `CAST(inner AS target)`.
    ///
    /// # Errors
    ///
    /// Propagates errors from rendering `inner`.
    fn write_cast(&self, b: &mut SqlBuilder<'_>, inner: &Expression, target: &str) -> Result<()> {
        b.write_str("CAST(");
        inner.write_sql(b)?;
        b.write_str(" AS ");
        b.write_str(target);
        b.write_char(')');
        Ok(())
    }

    /// Writes a literal whose SQL type must be explicit (dates, times, timestamps).
    ///
    /// # Errors
    ///
    /// Dialects that cannot express the literal return an error.
    fn write_typed_literal(&self, b: &mut SqlBuilder<'_>, value: &SqlValue) -> Result<()> {
        let target = match value {
            SqlValue::Date(_) => "DATE",
            SqlValue::Time(_) => "TIME",
            SqlValue::Timestamp(_) | SqlValue::TimestampTz(_) => "DATETIME",
            _ => {
                b.bind_argument(value.clone());
                return Ok(());
            }
        };
        b.write_str("CAST(");
        b.bind_argument(value.clone());
        b.write_str(" AS ");
        b.write_str(target);
        b.write_char(')');
        Ok(())
    }

    /// Writes an interval literal.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Unsupported`] or [`BuildError::MalformedLiteral`]
    /// when the dialect cannot express the interval.
    fn write_interval(&self, b: &mut SqlBuilder<'_>, interval: &IntervalLiteral) -> Result<()> {
        b.write_str("INTERVAL ");
        if interval.unit().is_compound() {
            b.write_str(&crate::value::quote_text(interval.value()));
        } else {
            b.write_str(interval.value());
        }
        b.write_char(' ');
        b.write_str(interval.unit().as_sql());
        Ok(())
    }

    /// Writes a reference to the value proposed for insertion in an upsert.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn write_excluded(&self, b: &mut SqlBuilder<'_>, column: &ColumnRef) -> Result<()> {
        b.write_str("excluded.");
        b.write_identifier(column.name());
        Ok(())
    }

    /// The `LIMIT` text emitted when only `OFFSET` was set, if the dialect
    /// cannot render `OFFSET` alone.
    fn offset_without_limit(&self) -> Option<&'static str> {
        None
    }

    /// Keyword placed before each row of a VALUES table.
    fn values_row_prefix(&self) -> &'static str {
        ""
    }

    /// Writes a table-level LOCK statement.
    ///
    /// # Errors
    ///
    /// The default implementation reports [`Feature::LockTable`] as unsupported.
    fn write_lock_statement(&self, b: &mut SqlBuilder<'_>, stmt: &LockStatement) -> Result<()> {
        let _ = (b, stmt);
        self.require(Feature::LockTable)
    }

    /// Writes an UNLOCK statement.
    ///
    /// # Errors
    ///
    /// The default implementation reports [`Feature::UnlockTables`] as unsupported.
    fn write_unlock_statement(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        let _ = b;
        self.require(Feature::UnlockTables)
    }
}

/// Lower-case ASCII identifiers that never need quoting.
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Words reserved by every supported dialect.
pub const COMMON_RESERVED: &[&str] = &[
    "ALL", "ALTER", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN",
    "CONSTRAINT", "CREATE", "CROSS", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP",
    "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "EXCEPT", "EXISTS", "FALSE",
    "FOR", "FOREIGN", "FROM", "FULL", "GROUP", "HAVING", "IN", "INNER", "INSERT",
    "INTERSECT", "INTO", "IS", "JOIN", "LEFT", "LIKE", "LIMIT", "NOT", "NULL", "ON", "OR",
    "ORDER", "OUTER", "PRIMARY", "REFERENCES", "RIGHT", "SELECT", "SET", "TABLE", "THEN",
    "TO", "TRUE", "UNION", "UNIQUE", "UPDATE", "USING", "VALUES", "WHEN", "WHERE", "WITH",
];

/// Returns `true` when `word` is in the common list or in `extra`.
pub(crate) fn reserved_in(extra: &[&str], word: &str) -> bool {
    COMMON_RESERVED
        .iter()
        .chain(extra.iter())
        .any(|w| w.eq_ignore_ascii_case(word))
}
