use crate::error::Result;
use crate::expr::{raw, Raw};
use crate::render::{SqlBuilder, WriteSql};
use crate::value::ToSqlValue;

/// A whole statement written by hand, with named arguments.
///
/// Unlike a [`Raw`] expression it renders without surrounding parentheses.
#[derive(Debug, Clone)]
#[must_use]
pub struct RawStatement {
    raw: Raw,
}

/// Starts a raw statement from `template`.
pub fn raw_statement(template: impl Into<String>) -> RawStatement {
    RawStatement::new(raw(template))
}

impl RawStatement {
    pub const fn new(raw: Raw) -> Self {
        Self { raw }
    }

    /// Binds `value` to `name`.
    pub fn arg(self, name: &str, value: impl ToSqlValue) -> Self {
        Self::new(self.raw.arg(name, value))
    }

    pub fn args<I, N, V>(self, args: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: ToSqlValue,
    {
        Self::new(self.raw.args(args))
    }
}

impl WriteSql for RawStatement {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        self.raw.write_template(b)
    }
}

impl super::Statement for RawStatement {}
