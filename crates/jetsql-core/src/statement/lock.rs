use crate::error::Result;
use crate::render::{SqlBuilder, WriteSql};
use crate::table::{Table, TableSource};

/// Table lock modes of PostgreSQL `LOCK TABLE` and MySQL `LOCK TABLES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableLockMode {
    AccessShare,
    RowShare,
    RowExclusive,
    ShareUpdateExclusive,
    Share,
    ShareRowExclusive,
    Exclusive,
    AccessExclusive,
    /// MySQL `READ`.
    Read,
    /// MySQL `WRITE`.
    Write,
}

impl TableLockMode {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::AccessShare => "ACCESS SHARE",
            Self::RowShare => "ROW SHARE",
            Self::RowExclusive => "ROW EXCLUSIVE",
            Self::ShareUpdateExclusive => "SHARE UPDATE EXCLUSIVE",
            Self::Share => "SHARE",
            Self::ShareRowExclusive => "SHARE ROW EXCLUSIVE",
            Self::Exclusive => "EXCLUSIVE",
            Self::AccessExclusive => "ACCESS EXCLUSIVE",
            Self::Read => "READ",
            Self::Write => "WRITE",
        }
    }
}

/// A table-level lock statement. The dialect decides the spelling.
#[derive(Debug, Clone)]
#[must_use]
pub struct LockStatement {
    tables: Vec<Table>,
    mode: Option<TableLockMode>,
    nowait: bool,
}

impl LockStatement {
    pub const fn new(tables: Vec<Table>) -> Self {
        Self {
            tables,
            mode: None,
            nowait: false,
        }
    }

    /// Adds another table to lock.
    pub fn and(mut self, table: &impl TableSource) -> Self {
        self.tables.push(table.table().clone());
        self
    }

    pub const fn in_mode(mut self, mode: TableLockMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub const fn nowait(mut self) -> Self {
        self.nowait = true;
        self
    }

    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    #[must_use]
    pub const fn mode(&self) -> Option<TableLockMode> {
        self.mode
    }

    #[must_use]
    pub const fn is_nowait(&self) -> bool {
        self.nowait
    }
}

impl WriteSql for LockStatement {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        b.dialect().write_lock_statement(b, self)
    }
}

impl super::Statement for LockStatement {}

/// MySQL `UNLOCK TABLES`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlockStatement;

#[must_use]
pub const fn unlock_tables() -> UnlockStatement {
    UnlockStatement
}

impl WriteSql for UnlockStatement {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        b.dialect().write_unlock_statement(b)
    }
}

impl super::Statement for UnlockStatement {}
