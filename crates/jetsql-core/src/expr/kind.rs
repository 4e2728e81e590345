//! Zero-sized markers naming the kind of a typed expression.

use std::fmt::Debug;

use super::ExprKind;

/// Marker for the value category of an [`Expr`](super::Expr).
pub trait Kind: Copy + Debug + Send + Sync + 'static {
    /// The runtime category this marker stands for.
    const KIND: ExprKind;
}

/// Kinds that support arithmetic.
pub trait Numeric: Kind {}

/// Kinds that can be shifted by an interval.
pub trait Temporal: Kind {}

macro_rules! kind_marker {
    ($($(#[$doc:meta])* $name:ident => $kind:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name;

            impl Kind for $name {
                const KIND: ExprKind = ExprKind::$kind;
            }
        )+
    };
}

kind_marker!(
    /// Boolean expressions.
    Bool => Bool,
    /// Integer expressions.
    Integer => Integer,
    /// Floating point and decimal expressions.
    Float => Float,
    /// Character string expressions.
    Text => String,
    /// Binary string expressions.
    Blob => Blob,
    /// Calendar dates.
    Date => Date,
    /// Times of day.
    Time => Time,
    /// Timestamps, with or without zone.
    Timestamp => Timestamp,
    /// Intervals.
    Interval => Interval,
    /// Row values.
    Row => Row,
    /// Arrays.
    Array => Array,
    /// Expressions of unknown kind.
    Any => Any,
);

impl Numeric for Integer {}
impl Numeric for Float {}

impl Temporal for Date {}
impl Temporal for Time {}
impl Temporal for Timestamp {}
