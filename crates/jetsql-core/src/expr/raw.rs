//! Raw SQL fragments with named arguments.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{BuildError, Result};
use crate::render::SqlBuilder;
use crate::value::{SqlValue, ToSqlValue};

const SIGILS: [char; 3] = [':', '#', '@'];

/// A raw SQL template with named arguments.
///
/// Placeholders are `:name`, `#name` or `@name`. Each occurrence binds its
/// value again, so `":a + :a"` produces two arguments. Text inside quotes and
/// the `::` cast operator are left alone.
///
/// An unknown `:name` is an error. `#name` and `@name` tokens without a value
/// are copied verbatim, which keeps MySQL session variables working.
#[derive(Debug, Clone, Default)]
pub struct Raw {
    template: String,
    args: BTreeMap<String, SqlValue>,
}

/// Creates a raw fragment.
#[must_use]
pub fn raw(template: impl Into<String>) -> Raw {
    Raw {
        template: template.into(),
        args: BTreeMap::new(),
    }
}

fn strip_sigil(name: &str) -> &str {
    name.strip_prefix(SIGILS).unwrap_or(name)
}

/// Quoted text and `::` casts match without captures and are skipped.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'[^']*(?:'|$)|"[^"]*(?:"|$)|`[^`]*(?:`|$)|::|([:#@])([A-Za-z_][A-Za-z0-9_]*)"#)
        .expect("Invalid placeholder regex")
});

impl Raw {
    /// Binds `value` to `name`. The name may carry its sigil.
    #[must_use]
    pub fn arg(mut self, name: &str, value: impl ToSqlValue) -> Self {
        self.args
            .insert(String::from(strip_sigil(name)), value.to_sql_value());
        self
    }

    /// Binds several named values at once.
    #[must_use]
    pub fn args<I, N, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: ToSqlValue,
    {
        for (name, value) in args {
            self.args
                .insert(String::from(strip_sigil(name.as_ref())), value.to_sql_value());
        }
        self
    }

    /// The template text.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Writes the template, replacing each placeholder occurrence with a
    /// fresh argument.
    pub(crate) fn write_template(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        let text = self.template.as_str();
        let mut start = 0;
        for caps in PLACEHOLDER.captures_iter(text) {
            let (Some(token), Some(sigil), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            match self.args.get(name.as_str()) {
                Some(value) => {
                    b.write_str(&text[start..token.start()]);
                    b.bind_argument(value.clone());
                    start = token.end();
                }
                None if sigil.as_str() == ":" => {
                    return Err(BuildError::UnresolvedArgument {
                        name: String::from(name.as_str()),
                    });
                }
                None => {}
            }
        }
        b.write_str(&text[start..]);
        Ok(())
    }
}
