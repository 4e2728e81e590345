//! Construction faults raised while building or rendering statements.

use std::fmt;

use thiserror::Error;

use crate::dialect::Feature;

/// Errors raised while building or rendering a statement.
///
/// Every variant is a construction fault: the statement is wrong before any
/// database sees it. Rendering stops at the first fault and no partial SQL is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A clause the statement cannot be rendered without is absent.
    #[error("{statement} statement requires a {clause} clause")]
    MissingClause {
        /// Statement kind (`UPDATE`, `DELETE`, ...).
        statement: &'static str,
        /// The absent clause.
        clause: &'static str,
    },

    /// An operator, join or CTE is missing an operand.
    #[error("missing operand: {context}")]
    NilOperand {
        /// What was being rendered.
        context: String,
    },

    /// Columns and values do not line up.
    #[error("shape mismatch: {context}")]
    ShapeMismatch {
        /// Description of the mismatch.
        context: String,
    },

    /// A literal string does not match the format its type requires.
    #[error("malformed {kind} literal {value:?}: {reason}")]
    MalformedLiteral {
        /// Literal type (`interval`, `date`, ...).
        kind: &'static str,
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A raw fragment references a name that has no value.
    #[error("named argument `{name}` has no value")]
    UnresolvedArgument {
        /// The unresolved name, without its sigil.
        name: String,
    },

    /// The dialect cannot express the requested construct.
    #[error("{dialect} does not support {feature}")]
    Unsupported {
        /// Dialect name.
        dialect: &'static str,
        /// The missing capability.
        feature: Feature,
    },
}

/// Discriminant of a [`BuildError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    MissingClause,
    NilOperand,
    ShapeMismatch,
    MalformedLiteral,
    UnresolvedArgument,
    Unsupported,
}

impl BuildError {
    /// Returns the fault category.
    #[must_use]
    pub const fn kind(&self) -> FaultKind {
        match self {
            Self::MissingClause { .. } => FaultKind::MissingClause,
            Self::NilOperand { .. } => FaultKind::NilOperand,
            Self::ShapeMismatch { .. } => FaultKind::ShapeMismatch,
            Self::MalformedLiteral { .. } => FaultKind::MalformedLiteral,
            Self::UnresolvedArgument { .. } => FaultKind::UnresolvedArgument,
            Self::Unsupported { .. } => FaultKind::Unsupported,
        }
    }

    pub(crate) fn nil_operand(context: impl fmt::Display) -> Self {
        Self::NilOperand {
            context: context.to_string(),
        }
    }

    pub(crate) fn shape(context: impl fmt::Display) -> Self {
        Self::ShapeMismatch {
            context: context.to_string(),
        }
    }

    pub(crate) fn malformed(
        kind: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedLiteral {
            kind,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for statement construction and rendering.
pub type Result<T> = std::result::Result<T, BuildError>;
