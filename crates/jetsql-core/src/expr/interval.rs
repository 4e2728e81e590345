//! `INTERVAL` literals.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::typed::{Expr, IntervalExpr};
use super::Expression;
use crate::error::{BuildError, Result};

/// Units an interval literal may be expressed in.
///
/// Compound units (`DayHour`, `YearMonth`, ...) take a quoted value made of
/// several fields, e.g. `'2-3'` for `YEAR_MONTH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    Microsecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
    SecondMicrosecond,
    MinuteMicrosecond,
    MinuteSecond,
    HourMicrosecond,
    HourSecond,
    HourMinute,
    DayMicrosecond,
    DaySecond,
    DayMinute,
    DayHour,
    YearMonth,
}

impl IntervalUnit {
    const ALL: [Self; 20] = [
        Self::Microsecond,
        Self::Second,
        Self::Minute,
        Self::Hour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Quarter,
        Self::Year,
        Self::SecondMicrosecond,
        Self::MinuteMicrosecond,
        Self::MinuteSecond,
        Self::HourMicrosecond,
        Self::HourSecond,
        Self::HourMinute,
        Self::DayMicrosecond,
        Self::DaySecond,
        Self::DayMinute,
        Self::DayHour,
        Self::YearMonth,
    ];

    /// Returns the unit keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Microsecond => "MICROSECOND",
            Self::Second => "SECOND",
            Self::Minute => "MINUTE",
            Self::Hour => "HOUR",
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Quarter => "QUARTER",
            Self::Year => "YEAR",
            Self::SecondMicrosecond => "SECOND_MICROSECOND",
            Self::MinuteMicrosecond => "MINUTE_MICROSECOND",
            Self::MinuteSecond => "MINUTE_SECOND",
            Self::HourMicrosecond => "HOUR_MICROSECOND",
            Self::HourSecond => "HOUR_SECOND",
            Self::HourMinute => "HOUR_MINUTE",
            Self::DayMicrosecond => "DAY_MICROSECOND",
            Self::DaySecond => "DAY_SECOND",
            Self::DayMinute => "DAY_MINUTE",
            Self::DayHour => "DAY_HOUR",
            Self::YearMonth => "YEAR_MONTH",
        }
    }

    /// Whether the unit spans more than one field.
    #[must_use]
    pub const fn is_compound(self) -> bool {
        !matches!(
            self,
            Self::Microsecond
                | Self::Second
                | Self::Minute
                | Self::Hour
                | Self::Day
                | Self::Week
                | Self::Month
                | Self::Quarter
                | Self::Year
        )
    }

    /// Pattern the value text must match.
    const fn pattern(self) -> &'static str {
        match self {
            Self::Second | Self::Microsecond => r"^[+-]?\d+(\.\d+)?$",
            Self::Minute
            | Self::Hour
            | Self::Day
            | Self::Week
            | Self::Month
            | Self::Quarter
            | Self::Year => r"^[+-]?\d+$",
            Self::SecondMicrosecond => r"^[+-]?\d+\.\d+$",
            Self::MinuteMicrosecond => r"^[+-]?\d+:\d+\.\d+$",
            Self::MinuteSecond | Self::HourMinute => r"^[+-]?\d+:\d+$",
            Self::HourMicrosecond => r"^[+-]?\d+:\d+:\d+\.\d+$",
            Self::HourSecond => r"^[+-]?\d+:\d+:\d+$",
            Self::DayMicrosecond => r"^[+-]?\d+ \d+:\d+:\d+\.\d+$",
            Self::DaySecond => r"^[+-]?\d+ \d+:\d+:\d+$",
            Self::DayMinute => r"^[+-]?\d+ \d+:\d+$",
            Self::DayHour => r"^[+-]?\d+ \d+$",
            Self::YearMonth => r"^[+-]?\d+-\d+$",
        }
    }
}

/// Value patterns, compiled once per unit.
static PATTERNS: LazyLock<HashMap<IntervalUnit, Regex>> = LazyLock::new(|| {
    IntervalUnit::ALL
        .into_iter()
        .filter_map(|unit| Regex::new(unit.pattern()).ok().map(|re| (unit, re)))
        .collect()
});

/// A validated interval value and its unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalLiteral {
    value: String,
    unit: IntervalUnit,
}

impl IntervalLiteral {
    /// Value text as validated, without quotes.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub const fn unit(&self) -> IntervalUnit {
        self.unit
    }
}

/// Builds an interval literal after checking `value` against the format of
/// `unit` (`"2-3"` for [`IntervalUnit::YearMonth`], `"1 12"` for
/// [`IntervalUnit::DayHour`], a plain number for simple units).
///
/// # Errors
///
/// Returns [`BuildError::MalformedLiteral`] when the value does not match.
pub fn interval(value: &str, unit: IntervalUnit) -> Result<IntervalExpr> {
    let value = value.trim();
    let Some(pattern) = PATTERNS.get(&unit) else {
        return Err(BuildError::malformed(
            "interval",
            value,
            format!("no value format for {}", unit.as_sql()),
        ));
    };
    if !pattern.is_match(value) {
        return Err(BuildError::malformed(
            "interval",
            value,
            format!("expected {} format", unit.as_sql()),
        ));
    }
    Ok(Expr::from_expression(Expression::Interval(IntervalLiteral {
        value: String::from(value),
        unit,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MySqlDialect;
    use crate::render::{SqlBuilder, WriteSql};
    use crate::FaultKind;

    fn render_mysql(e: IntervalExpr) -> String {
        let dialect = MySqlDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        Expression::from(e).write_sql(&mut b).unwrap();
        b.finish().0
    }

    #[test]
    fn test_simple_unit() {
        let e = interval("1", IntervalUnit::Day).unwrap();
        assert_eq!(render_mysql(e), "INTERVAL 1 DAY");
    }

    #[test]
    fn test_compound_unit_is_quoted() {
        let e = interval("2-3", IntervalUnit::YearMonth).unwrap();
        assert_eq!(render_mysql(e), "INTERVAL '2-3' YEAR_MONTH");
        let e = interval("1 10:30:00.5", IntervalUnit::DayMicrosecond).unwrap();
        assert_eq!(render_mysql(e), "INTERVAL '1 10:30:00.5' DAY_MICROSECOND");
    }

    #[test]
    fn test_every_unit_has_a_pattern() {
        assert_eq!(PATTERNS.len(), IntervalUnit::ALL.len());
        for unit in IntervalUnit::ALL {
            assert!(PATTERNS.contains_key(&unit), "{unit:?}");
        }
    }

    #[test]
    fn test_malformed_values() {
        for (value, unit) in [
            ("1 day", IntervalUnit::Day),
            ("2:3", IntervalUnit::YearMonth),
            ("1.5", IntervalUnit::Hour),
            ("", IntervalUnit::Second),
            ("1; DROP TABLE x", IntervalUnit::Minute),
        ] {
            let err = interval(value, unit).unwrap_err();
            assert_eq!(err.kind(), FaultKind::MalformedLiteral, "{value}");
        }
    }

    #[test]
    fn test_temporal_arithmetic() {
        let ts = crate::expr::timestamp_str("2024-01-01 00:00:00").unwrap();
        let e = ts.add_interval(&interval("7", IntervalUnit::Day).unwrap());
        let dialect = MySqlDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        Expression::from(e).write_sql(&mut b).unwrap();
        assert_eq!(b.as_str(), "(CAST(? AS DATETIME) + INTERVAL 7 DAY)");
    }
}
