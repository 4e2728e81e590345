//! Window specifications and `OVER` calls.

use super::{ExprKind, Expression};
use crate::clause::{IntoOrderBy, OrderByItem};
use crate::error::Result;
use crate::render::{SqlBuilder, WriteSql};

/// Frame unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUnits {
    Rows,
    Range,
    Groups,
}

impl FrameUnits {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::Rows => "ROWS",
            Self::Range => "RANGE",
            Self::Groups => "GROUPS",
        }
    }
}

/// One end of a window frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(u64),
    CurrentRow,
    Following(u64),
    UnboundedFollowing,
}

impl FrameBound {
    fn write(self, b: &mut SqlBuilder<'_>) {
        match self {
            Self::UnboundedPreceding => b.write_str("UNBOUNDED PRECEDING"),
            Self::Preceding(n) => b.write_str(&format!("{n} PRECEDING")),
            Self::CurrentRow => b.write_str("CURRENT ROW"),
            Self::Following(n) => b.write_str(&format!("{n} FOLLOWING")),
            Self::UnboundedFollowing => b.write_str("UNBOUNDED FOLLOWING"),
        }
    }
}

/// `ROWS|RANGE|GROUPS [BETWEEN] start [AND end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub units: FrameUnits,
    pub start: FrameBound,
    pub end: Option<FrameBound>,
}

/// A window definition: base window, partitioning, ordering and frame.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct WindowSpec {
    base: Option<String>,
    partition_by: Vec<Expression>,
    order_by: Vec<OrderByItem>,
    frame: Option<Frame>,
}

/// Starts an empty window specification.
pub fn window() -> WindowSpec {
    WindowSpec::default()
}

impl WindowSpec {
    /// Extends the named window `name`.
    pub fn base(mut self, name: &str) -> Self {
        self.base = Some(String::from(name));
        self
    }

    pub fn partition_by<I, T>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Expression>,
    {
        self.partition_by.extend(items.into_iter().map(Into::into));
        self
    }

    pub fn order_by(mut self, items: impl IntoOrderBy) -> Self {
        self.order_by.extend(items.into_order_by());
        self
    }

    pub fn frame(mut self, units: FrameUnits, start: FrameBound, end: Option<FrameBound>) -> Self {
        self.frame = Some(Frame { units, start, end });
        self
    }

    /// `ROWS BETWEEN start AND end`
    pub fn rows(self, start: FrameBound, end: FrameBound) -> Self {
        self.frame(FrameUnits::Rows, start, Some(end))
    }

    /// `RANGE BETWEEN start AND end`
    pub fn range(self, start: FrameBound, end: FrameBound) -> Self {
        self.frame(FrameUnits::Range, start, Some(end))
    }

    /// `GROUPS BETWEEN start AND end`
    pub fn groups(self, start: FrameBound, end: FrameBound) -> Self {
        self.frame(FrameUnits::Groups, start, Some(end))
    }
}

impl WriteSql for WindowSpec {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        let mut first = true;
        let mut separate = |b: &mut SqlBuilder<'_>| {
            if !first {
                b.write_char(' ');
            }
            first = false;
        };
        if let Some(base) = &self.base {
            separate(b);
            b.write_identifier(base);
        }
        if !self.partition_by.is_empty() {
            separate(b);
            b.write_str("PARTITION BY ");
            b.write_list(&self.partition_by, ", ", |b, e| e.write_sql(b))?;
        }
        if !self.order_by.is_empty() {
            separate(b);
            b.write_str("ORDER BY ");
            b.write_list(&self.order_by, ", ", |b, item| item.write_sql(b))?;
        }
        if let Some(frame) = self.frame {
            separate(b);
            b.write_str(frame.units.as_sql());
            b.write_char(' ');
            if let Some(end) = frame.end {
                b.write_str("BETWEEN ");
                frame.start.write(b);
                b.write_str(" AND ");
                end.write(b);
            } else {
                frame.start.write(b);
            }
        }
        Ok(())
    }
}

/// Where an `OVER` clause gets its window from.
#[derive(Debug, Clone)]
pub enum WindowRef {
    /// `OVER name`
    Named(String),
    /// `OVER (spec)`
    Spec(WindowSpec),
}

/// `func OVER window`
#[derive(Debug, Clone)]
pub struct WindowCall {
    func: Box<Expression>,
    window: WindowRef,
    kind: ExprKind,
}

impl WindowCall {
    pub(crate) fn new(func: Expression, window: WindowRef, kind: ExprKind) -> Self {
        Self {
            func: Box::new(func),
            window,
            kind,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ExprKind {
        self.kind
    }
}

impl WriteSql for WindowCall {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        self.func.write_sql(b)?;
        b.write_str(" OVER ");
        match &self.window {
            WindowRef::Named(name) => {
                b.write_identifier(name);
                Ok(())
            }
            WindowRef::Spec(spec) => {
                b.write_char('(');
                spec.write_sql(b)?;
                b.write_char(')');
                Ok(())
            }
        }
    }
}
