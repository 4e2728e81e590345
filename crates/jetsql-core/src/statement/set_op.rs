use super::select::write_limit_offset;
use super::Query;
use crate::clause::{self, IntoOrderBy, OrderByItem, Projection};
use crate::dialect::Feature;
use crate::error::{BuildError, Result};
use crate::render::{SqlBuilder, WriteSql};
use crate::table::SubqueryTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    Intersect,
    Except,
}

impl SetOperator {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        }
    }
}

/// `branch UNION [ALL] branch ...` with its own ORDER BY / LIMIT / OFFSET.
#[derive(Debug, Clone)]
#[must_use]
pub struct SetOperation {
    operator: SetOperator,
    all: bool,
    branches: Vec<Query>,
    order_by: Vec<OrderByItem>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SetOperation {
    pub const fn new(operator: SetOperator, all: bool, branches: Vec<Query>) -> Self {
        Self {
            operator,
            all,
            branches,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Appends another branch under the same operator.
    pub fn branch(mut self, query: impl Into<Query>) -> Self {
        self.branches.push(query.into());
        self
    }

    pub fn order_by(mut self, items: impl IntoOrderBy) -> Self {
        self.order_by = items.into_order_by();
        self
    }

    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub const fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn as_table(self, alias: &str) -> SubqueryTable {
        SubqueryTable::new(self, alias)
    }

    #[must_use]
    pub fn projections(&self) -> &[Projection] {
        match self.branches.first() {
            Some(first) => first.projections(),
            None => &[],
        }
    }

    fn write_branch(b: &mut SqlBuilder<'_>, branch: &Query) -> Result<()> {
        if b.dialect().supports(Feature::ParenthesizedSetOperands) {
            return b.write_block(|b| branch.write_sql(b));
        }
        if branch.has_tail() {
            b.dialect().require(Feature::ParenthesizedSetOperands)?;
        }
        branch.write_sql(b)
    }
}

impl WriteSql for SetOperation {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        if self.branches.len() < 2 {
            return Err(BuildError::nil_operand(format!(
                "{} needs at least two queries",
                self.operator.as_sql()
            )));
        }
        for (i, branch) in self.branches.iter().enumerate() {
            if i > 0 {
                b.new_line();
                b.write_str(self.operator.as_sql());
                if self.all {
                    b.write_str(" ALL");
                }
                b.new_line();
            }
            Self::write_branch(b, branch)?;
        }
        b.with_alias_names(|b| clause::write_list_clause(b, "ORDER BY", &self.order_by))?;
        write_limit_offset(b, self.limit, self.offset);
        Ok(())
    }
}

impl super::Statement for SetOperation {}

macro_rules! set_operation_fn {
    ($($(#[$doc:meta])* $name:ident => $operator:ident, $all:literal;)+) => {
        $(
            $(#[$doc])*
            pub fn $name(lhs: impl Into<Query>, rhs: impl Into<Query>) -> SetOperation {
                SetOperation::new(SetOperator::$operator, $all, vec![lhs.into(), rhs.into()])
            }
        )+
    };
}

set_operation_fn!(
    /// `lhs UNION rhs`
    union => Union, false;
    /// `lhs UNION ALL rhs`
    union_all => Union, true;
    /// `lhs INTERSECT rhs`
    intersect => Intersect, false;
    /// `lhs INTERSECT ALL rhs`
    intersect_all => Intersect, true;
    /// `lhs EXCEPT rhs`
    except => Except, false;
    /// `lhs EXCEPT ALL rhs`
    except_all => Except, true;
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{PostgresDialect, SqliteDialect};
    use crate::expr::kind::Integer;
    use crate::statement::{select, Statement};
    use crate::table::Column;
    use crate::value::SqlValue;
    use crate::FaultKind;

    fn id(table: &str) -> Column<Integer> {
        Column::new(table, "id")
    }

    #[test]
    fn test_union_limit_wraps_branches() {
        let stmt = union(select(&id("a")), select(&id("b"))).limit(1);
        let (sql, args) = stmt.sql(&PostgresDialect::new()).unwrap();
        assert_eq!(
            sql,
            "(\n    SELECT a.id AS \"a.id\"\n)\nUNION\n(\n    SELECT b.id AS \"b.id\"\n)\nLIMIT $1;"
        );
        assert_eq!(args, vec![SqlValue::Int(1)]);
    }

    #[test]
    fn test_order_by_names_output_columns() {
        let stmt = union(select(&id("a")), select(&id("b")))
            .order_by(id("a").desc())
            .limit(2);
        let (sql, args) = stmt.sql(&PostgresDialect::new()).unwrap();
        assert!(sql.ends_with(")\nORDER BY \"a.id\" DESC\nLIMIT $1;"), "{sql}");
        assert_eq!(args, vec![SqlValue::Int(2)]);

        let sqlite = stmt.debug_sql(&SqliteDialect::new()).unwrap();
        assert!(sqlite.ends_with("\nORDER BY \"a.id\" DESC\nLIMIT 2;"), "{sqlite}");
    }

    #[test]
    fn test_sqlite_renders_bare_branches() {
        let stmt = union_all(select(&id("a")), select(&id("b")));
        assert_eq!(
            stmt.sql(&SqliteDialect::new()).unwrap().0,
            "SELECT a.id AS \"a.id\"\nUNION ALL\nSELECT b.id AS \"b.id\";"
        );
    }

    #[test]
    fn test_sqlite_rejects_branch_with_limit() {
        let stmt = except(select(&id("a")).limit(3), select(&id("b")));
        let err = stmt.sql(&SqliteDialect::new()).unwrap_err();
        assert_eq!(err.kind(), FaultKind::Unsupported);
    }

    #[test]
    fn test_projections_come_from_first_branch() {
        let stmt = select(&id("a")).intersect(select(&id("b")));
        assert_eq!(stmt.projections().len(), 1);
        let sub = stmt.as_table("s");
        assert_eq!(sub.column_of(&id("a")).unwrap().name(), "a.id");
    }

    #[test]
    fn test_single_branch_is_nil_operand() {
        let stmt = SetOperation::new(SetOperator::Union, false, vec![select(&id("a")).into()]);
        let err = stmt.sql(&PostgresDialect::new()).unwrap_err();
        assert_eq!(err.kind(), FaultKind::NilOperand);
    }
}
