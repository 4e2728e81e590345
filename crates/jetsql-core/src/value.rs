//! SQL values bound as statement arguments.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::expr::ExprKind;

/// A value carried in a statement's argument list.
///
/// Values are bound positionally by the driver. They are only inlined into
/// SQL text by debug rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Date and time without zone.
    Timestamp(NaiveDateTime),
    /// Date and time with a UTC offset.
    TimestampTz(DateTime<FixedOffset>),
}

impl SqlValue {
    /// Returns the generic inline SQL representation (escaped).
    ///
    /// Dialects may override this through [`Dialect::inline_value`]. Prefer
    /// bound arguments; inlining is meant for debug output.
    ///
    /// [`Dialect::inline_value`]: crate::dialect::Dialect::inline_value
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => quote_text(s),
            Self::Blob(b) => format!("X'{}'", hex(b)),
            Self::Date(d) => quote_text(&d.format("%Y-%m-%d").to_string()),
            Self::Time(t) => quote_text(&t.format("%H:%M:%S%.f").to_string()),
            Self::Timestamp(ts) => quote_text(&ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
            Self::TimestampTz(ts) => {
                quote_text(&ts.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string())
            }
        }
    }

    /// Returns the expression category of this value.
    #[must_use]
    pub const fn kind(&self) -> ExprKind {
        match self {
            Self::Null => ExprKind::Any,
            Self::Bool(_) => ExprKind::Bool,
            Self::Int(_) => ExprKind::Integer,
            Self::Float(_) => ExprKind::Float,
            Self::Text(_) => ExprKind::String,
            Self::Blob(_) => ExprKind::Blob,
            Self::Date(_) => ExprKind::Date,
            Self::Time(_) => ExprKind::Time,
            Self::Timestamp(_) | Self::TimestampTz(_) => ExprKind::Timestamp,
        }
    }

    /// Returns `true` for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Wraps text in single quotes, doubling embedded quotes.
pub(crate) fn quote_text(s: &str) -> String {
    let escaped = s.replace('\'', "''");
    format!("'{escaped}'")
}

/// Upper-case hex encoding of a byte slice.
pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02X}")).collect()
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

macro_rules! impl_to_sql_value_int {
    ($($ty:ty),+) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )+
    };
}

impl_to_sql_value_int!(i32, i16, i8, u32, u16, u8);

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for &String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl ToSqlValue for NaiveDate {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Date(self)
    }
}

impl ToSqlValue for NaiveTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Time(self)
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Timestamp(self)
    }
}

impl<Tz: TimeZone> ToSqlValue for DateTime<Tz> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::TimestampTz(self.fixed_offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_scalars() {
        assert_eq!(SqlValue::Null.to_sql_inline(), "NULL");
        assert_eq!(SqlValue::Bool(false).to_sql_inline(), "FALSE");
        assert_eq!(SqlValue::Int(-7).to_sql_inline(), "-7");
        assert_eq!(SqlValue::Blob(vec![0xDE, 0xAD]).to_sql_inline(), "X'DEAD'");
    }

    #[test]
    fn test_inline_text_doubles_quotes() {
        assert_eq!(
            SqlValue::Text(String::from("it's")).to_sql_inline(),
            "'it''s'"
        );
        let hostile = SqlValue::Text(String::from("x'); DELETE FROM film; --"));
        assert_eq!(hostile.to_sql_inline(), "'x''); DELETE FROM film; --'");
    }

    #[test]
    fn test_sql_value_inline_temporal() {
        let date = NaiveDate::from_ymd_opt(2011, 2, 2).unwrap();
        assert_eq!(SqlValue::Date(date).to_sql_inline(), "'2011-02-02'");

        let time = NaiveTime::from_hms_opt(10, 20, 30).unwrap();
        assert_eq!(SqlValue::Time(time).to_sql_inline(), "'10:20:30'");

        let ts = date.and_time(time);
        assert_eq!(
            SqlValue::Timestamp(ts).to_sql_inline(),
            "'2011-02-02 10:20:30'"
        );

        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let tz = offset.from_local_datetime(&ts).unwrap();
        assert_eq!(
            SqlValue::TimestampTz(tz).to_sql_inline(),
            "'2011-02-02 10:20:30+02:00'"
        );
    }

    #[test]
    fn test_conversions() {
        assert_eq!(7_u16.to_sql_value(), SqlValue::Int(7));
        assert_eq!(0.5_f32.to_sql_value(), SqlValue::Float(0.5));
        assert_eq!(Some("rated").to_sql_value(), SqlValue::Text(String::from("rated")));
        assert_eq!(None::<NaiveDate>.to_sql_value(), SqlValue::Null);
        assert_eq!(vec![1_u8].to_sql_value(), SqlValue::Blob(vec![1]));
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(SqlValue::Int(1).kind(), ExprKind::Integer);
        assert_eq!(SqlValue::Null.kind(), ExprKind::Any);
        assert_eq!(
            SqlValue::Text(String::from("a")).kind(),
            ExprKind::String
        );
    }
}
