use super::assign::{Assignment, IntoAssignments};
use crate::dialect::Feature;
use crate::error::Result;
use crate::expr::{BoolExpr, ColumnRef, Expression};
use crate::render::{SqlBuilder, WriteSql};
use crate::table::Columns;

/// What happens to a conflicting row.
#[derive(Debug, Clone)]
pub enum ConflictAction {
    DoNothing,
    DoUpdate {
        set: Vec<Assignment>,
        filter: Option<Expression>,
    },
}

/// `ON CONFLICT [target] DO NOTHING | DO UPDATE SET ... [WHERE ...]`
///
/// Renders nothing until an action is chosen.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct OnConflict {
    columns: Vec<ColumnRef>,
    constraint: Option<String>,
    target_filter: Option<Expression>,
    action: Option<ConflictAction>,
}

impl OnConflict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conflict target columns.
    pub fn columns(columns: impl Columns) -> Self {
        Self {
            columns: columns.into_column_refs(),
            ..Self::default()
        }
    }

    /// `ON CONSTRAINT name`, PostgreSQL only.
    pub fn on_constraint(name: &str) -> Self {
        Self {
            constraint: Some(String::from(name)),
            ..Self::default()
        }
    }

    /// Predicate for partial unique indexes: `(cols) WHERE ...`.
    pub fn where_clause(mut self, predicate: impl Into<BoolExpr>) -> Self {
        self.target_filter = Some(predicate.into().into_expression());
        self
    }

    pub fn do_nothing(mut self) -> Self {
        self.action = Some(ConflictAction::DoNothing);
        self
    }

    /// `DO UPDATE SET ...`; repeated calls accumulate assignments.
    pub fn do_update(mut self, set: impl IntoAssignments) -> Self {
        let mut assignments = set.into_assignments();
        match &mut self.action {
            Some(ConflictAction::DoUpdate { set, .. }) => set.append(&mut assignments),
            _ => {
                self.action = Some(ConflictAction::DoUpdate {
                    set: assignments,
                    filter: None,
                });
            }
        }
        self
    }

    /// `WHERE` on the update action.
    pub fn do_update_where(mut self, predicate: impl Into<BoolExpr>) -> Self {
        let predicate = predicate.into().into_expression();
        match &mut self.action {
            Some(ConflictAction::DoUpdate { filter, .. }) => *filter = Some(predicate),
            _ => {
                self.action = Some(ConflictAction::DoUpdate {
                    set: Vec::new(),
                    filter: Some(predicate),
                });
            }
        }
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.action.is_none()
    }
}

impl WriteSql for OnConflict {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        let Some(action) = &self.action else {
            return Ok(());
        };
        b.dialect().require(Feature::OnConflict)?;
        b.new_line();
        b.write_str("ON CONFLICT");
        if !self.columns.is_empty() {
            b.write_str(" (");
            b.with_short_names(|b| b.write_list(&self.columns, ", ", |b, c| c.write_sql(b)))?;
            b.write_char(')');
        }
        if let Some(constraint) = &self.constraint {
            b.dialect().require(Feature::OnConflictConstraint)?;
            b.write_str(" ON CONSTRAINT ");
            b.write_identifier(constraint);
        }
        if let Some(filter) = &self.target_filter {
            b.write_str(" WHERE ");
            filter.write_sql(b)?;
        }
        match action {
            ConflictAction::DoNothing => {
                b.write_str(" DO NOTHING");
                Ok(())
            }
            ConflictAction::DoUpdate { set, filter } => {
                if set.is_empty() {
                    return Err(crate::error::BuildError::nil_operand(
                        "ON CONFLICT DO UPDATE without assignments",
                    ));
                }
                b.write_str(" DO UPDATE");
                b.increase_indent(crate::render::INDENT);
                b.new_line();
                b.write_str("SET ");
                let result = b
                    .write_list(set, ", ", |b, a| a.write_sql(b))
                    .and_then(|()| match filter {
                        Some(filter) => {
                            b.new_line();
                            b.write_str("WHERE ");
                            filter.write_sql(b)
                        }
                        None => Ok(()),
                    });
                b.decrease_indent(crate::render::INDENT);
                result
            }
        }
    }
}

/// MySQL `ON DUPLICATE KEY UPDATE ...`. Renders nothing when empty.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct OnDuplicateKeyUpdate {
    set: Vec<Assignment>,
}

impl OnDuplicateKeyUpdate {
    pub fn new(set: impl IntoAssignments) -> Self {
        Self {
            set: set.into_assignments(),
        }
    }

    pub fn push(mut self, set: impl IntoAssignments) -> Self {
        self.set.extend(set.into_assignments());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

impl WriteSql for OnDuplicateKeyUpdate {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        if self.set.is_empty() {
            return Ok(());
        }
        b.dialect().require(Feature::OnDuplicateKeyUpdate)?;
        b.new_line();
        b.write_str("ON DUPLICATE KEY UPDATE ");
        b.write_list(&self.set, ", ", |b, a| a.write_sql(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, MySqlDialect, PostgresDialect, SqliteDialect};
    use crate::expr::{ExprKind, Expression};
    use crate::FaultKind;

    fn id() -> ColumnRef {
        ColumnRef::new("users", "id", ExprKind::Integer)
    }

    fn name() -> ColumnRef {
        ColumnRef::new("users", "name", ExprKind::String)
    }

    fn render(w: &impl WriteSql, dialect: &dyn Dialect) -> Result<String> {
        let mut b = SqlBuilder::new(dialect);
        w.write_sql(&mut b)?;
        Ok(b.finish().0)
    }

    fn set_name_excluded() -> Assignment {
        Assignment::new(vec![name()], vec![Expression::Excluded(name())])
    }

    #[test]
    fn test_no_action_renders_nothing() {
        let c = OnConflict::columns(vec![id()]);
        assert_eq!(render(&c, &PostgresDialect::new()).unwrap(), "");
    }

    #[test]
    fn test_do_nothing() {
        let c = OnConflict::columns(vec![id()]).do_nothing();
        assert_eq!(
            render(&c, &SqliteDialect::new()).unwrap(),
            "\nON CONFLICT (id) DO NOTHING"
        );
    }

    #[test]
    fn test_do_update() {
        let c = OnConflict::columns(vec![id()]).do_update(set_name_excluded());
        assert_eq!(
            render(&c, &PostgresDialect::new()).unwrap(),
            "\nON CONFLICT (id) DO UPDATE\n    SET name = excluded.name"
        );
    }

    #[test]
    fn test_constraint_is_postgres_only() {
        let c = OnConflict::on_constraint("users_pkey").do_nothing();
        assert!(render(&c, &PostgresDialect::new()).is_ok());
        let err = render(&c, &SqliteDialect::new()).unwrap_err();
        assert_eq!(err.kind(), FaultKind::Unsupported);
    }

    #[test]
    fn test_on_duplicate_key_update() {
        let d = OnDuplicateKeyUpdate::new(set_name_excluded());
        assert_eq!(
            render(&d, &MySqlDialect::new()).unwrap(),
            "\nON DUPLICATE KEY UPDATE name = VALUES(name)"
        );
        assert!(render(&d, &PostgresDialect::new()).is_err());
    }
}
