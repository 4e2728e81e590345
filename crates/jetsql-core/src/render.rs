//! The render context threaded through every node.
//!
//! A [`SqlBuilder`] is created fresh for each `sql()` / `debug_sql()` call,
//! walked once over the statement tree and then consumed with
//! [`SqlBuilder::finish`].

use crate::dialect::Dialect;
use crate::error::Result;
use crate::value::SqlValue;

/// Width of one indentation step for nested statements.
pub const INDENT: usize = 4;

/// A node that can write itself into a [`SqlBuilder`].
pub trait WriteSql {
    /// Appends this node's SQL and binds its arguments.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`](crate::BuildError) when the node cannot be
    /// rendered for the builder's dialect.
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()>;
}

/// How column references are spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnNames {
    /// `table.column`
    Full,
    /// `column`
    Short,
    /// The quoted projection alias, `"table.column"`.
    Alias,
}

/// Mutable rendering state: output text, collected arguments and layout.
pub struct SqlBuilder<'d> {
    dialect: &'d dyn Dialect,
    sql: String,
    args: Vec<SqlValue>,
    indent: usize,
    debug: bool,
    names: ColumnNames,
}

impl<'d> SqlBuilder<'d> {
    /// Creates a context that emits placeholders and collects arguments.
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            sql: String::with_capacity(256),
            args: Vec::new(),
            indent: 0,
            debug: false,
            names: ColumnNames::Full,
        }
    }

    /// Creates a context that inlines values as SQL literals.
    #[must_use]
    pub fn debug(dialect: &'d dyn Dialect) -> Self {
        Self {
            debug: true,
            ..Self::new(dialect)
        }
    }

    /// Returns the dialect this context renders for.
    #[must_use]
    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    /// Returns `true` when values are inlined instead of bound.
    #[must_use]
    pub const fn is_debug(&self) -> bool {
        self.debug
    }

    /// Returns `true` when column references render without their table.
    #[must_use]
    pub const fn short_names(&self) -> bool {
        matches!(self.names, ColumnNames::Short)
    }

    #[must_use]
    pub const fn column_names(&self) -> ColumnNames {
        self.names
    }

    /// Number of arguments bound so far.
    #[must_use]
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Text rendered so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.sql
    }

    /// Appends text literally.
    pub fn write_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    /// Appends a single character.
    pub fn write_char(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Appends an identifier, quoting it when the dialect requires.
    pub fn write_identifier(&mut self, name: &str) {
        let quoted = self.dialect.quote_identifier(name);
        self.sql.push_str(&quoted);
    }

    /// Appends an alias, always quoted with the dialect's alias quote.
    pub fn write_alias(&mut self, alias: &str) {
        let quote = self.dialect.alias_quote();
        self.sql.push(quote);
        for c in alias.chars() {
            if c == quote {
                self.sql.push(quote);
            }
            self.sql.push(c);
        }
        self.sql.push(quote);
    }

    /// Binds a value.
    ///
    /// Emits the dialect placeholder for the next ordinal and records the
    /// value, or inlines the value in debug mode.
    pub fn bind_argument(&mut self, value: SqlValue) {
        if self.debug {
            let inline = self.dialect.inline_value(&value);
            self.sql.push_str(&inline);
        } else {
            self.args.push(value);
            let placeholder = self.dialect.argument_placeholder(self.args.len());
            self.sql.push_str(&placeholder);
        }
    }

    /// Starts a new line at the current indentation.
    pub fn new_line(&mut self) {
        self.sql.push('\n');
        for _ in 0..self.indent {
            self.sql.push(' ');
        }
    }

    /// Increases indentation by `n` columns.
    pub fn increase_indent(&mut self, n: usize) {
        self.indent += n;
    }

    /// Decreases indentation by `n` columns.
    pub fn decrease_indent(&mut self, n: usize) {
        self.indent = self.indent.saturating_sub(n);
    }

    /// Runs `f` with column references rendered without their table.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns.
    pub fn with_short_names<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.with_column_names(ColumnNames::Short, f)
    }

    /// Runs `f` with column references rendered in full.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns.
    pub fn with_full_names<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.with_column_names(ColumnNames::Full, f)
    }

    /// Runs `f` with column references rendered as their projection alias.
    /// Output columns of a set operation can only be named this way.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns.
    pub fn with_alias_names<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.with_column_names(ColumnNames::Alias, f)
    }

    fn with_column_names<F>(&mut self, names: ColumnNames, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let previous = self.names;
        self.names = names;
        let result = f(self);
        self.names = previous;
        result
    }

    /// Renders `f` as an indented block wrapped in parentheses.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns.
    pub fn write_block<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.write_char('(');
        self.increase_indent(INDENT);
        self.new_line();
        let result = self.with_full_names(f);
        self.decrease_indent(INDENT);
        result?;
        self.new_line();
        self.write_char(')');
        Ok(())
    }

    /// Writes `items` separated by `separator`, rendering each with `f`.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error from `f`.
    pub fn write_list<T, F>(&mut self, items: &[T], separator: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&mut Self, &T) -> Result<()>,
    {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(separator);
            }
            f(self, item)?;
        }
        Ok(())
    }

    /// Consumes the context, returning the SQL text and bound arguments.
    #[must_use]
    pub fn finish(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, PostgresDialect};

    #[test]
    fn test_bind_argument_numbers_placeholders() {
        let dialect = PostgresDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        b.bind_argument(SqlValue::Int(1));
        b.write_str(", ");
        b.bind_argument(SqlValue::Text(String::from("a")));
        let (sql, args) = b.finish();
        assert_eq!(sql, "$1, $2");
        assert_eq!(args, vec![SqlValue::Int(1), SqlValue::Text(String::from("a"))]);
    }

    #[test]
    fn test_debug_inlines_values() {
        let dialect = MySqlDialect::new();
        let mut b = SqlBuilder::debug(&dialect);
        b.bind_argument(SqlValue::Text(String::from("it's")));
        let (sql, args) = b.finish();
        assert_eq!(sql, "'it''s'");
        assert!(args.is_empty());
    }

    #[test]
    fn test_alias_quote_escaping() {
        let dialect = PostgresDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        b.write_alias("a\"b");
        assert_eq!(b.as_str(), "\"a\"\"b\"");
    }

    #[test]
    fn test_block_indentation() {
        let dialect = PostgresDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        b.write_block(|b| {
            b.write_str("SELECT 1");
            b.new_line();
            b.write_str("FROM t");
            Ok(())
        })
        .unwrap();
        assert_eq!(b.as_str(), "(\n    SELECT 1\n    FROM t\n)");
    }

    #[test]
    fn test_short_names_scope_restores() {
        let dialect = PostgresDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        b.with_short_names(|b| {
            assert!(b.short_names());
            Ok(())
        })
        .unwrap();
        assert!(!b.short_names());
    }
}
