use crate::dialect::Feature;
use crate::error::Result;
use crate::render::{SqlBuilder, WriteSql};

/// Row lock strength of a `FOR ...` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockStrength {
    Update,
    NoKeyUpdate,
    Share,
    KeyShare,
}

impl LockStrength {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Update => "UPDATE",
            Self::NoKeyUpdate => "NO KEY UPDATE",
            Self::Share => "SHARE",
            Self::KeyShare => "KEY SHARE",
        }
    }

    /// `UPDATE` and `SHARE`, the strengths MySQL also understands.
    #[must_use]
    pub const fn is_standard(self) -> bool {
        matches!(self, Self::Update | Self::Share)
    }
}

/// What to do when a row is already locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockWait {
    #[default]
    Wait,
    NoWait,
    SkipLocked,
}

/// `FOR <strength> [OF t, ...] [NOWAIT | SKIP LOCKED]`, or MySQL's legacy
/// `LOCK IN SHARE MODE`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct RowLock {
    strength: Option<LockStrength>,
    of: Vec<String>,
    wait: LockWait,
}

impl RowLock {
    pub const fn new(strength: LockStrength) -> Self {
        Self {
            strength: Some(strength),
            of: Vec::new(),
            wait: LockWait::Wait,
        }
    }

    /// `FOR UPDATE`
    pub const fn update() -> Self {
        Self::new(LockStrength::Update)
    }

    /// `FOR NO KEY UPDATE`
    pub const fn no_key_update() -> Self {
        Self::new(LockStrength::NoKeyUpdate)
    }

    /// `FOR SHARE`
    pub const fn share() -> Self {
        Self::new(LockStrength::Share)
    }

    /// `FOR KEY SHARE`
    pub const fn key_share() -> Self {
        Self::new(LockStrength::KeyShare)
    }

    /// MySQL `LOCK IN SHARE MODE`.
    pub const fn in_share_mode() -> Self {
        Self {
            strength: None,
            of: Vec::new(),
            wait: LockWait::Wait,
        }
    }

    /// Restricts the lock to the named tables or aliases.
    pub fn of<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.of.extend(tables.into_iter().map(Into::into));
        self
    }

    pub const fn nowait(mut self) -> Self {
        self.wait = LockWait::NoWait;
        self
    }

    pub const fn skip_locked(mut self) -> Self {
        self.wait = LockWait::SkipLocked;
        self
    }
}

impl WriteSql for RowLock {
    fn write_sql(&self, b: &mut SqlBuilder<'_>) -> Result<()> {
        let Some(strength) = self.strength else {
            b.dialect().require(Feature::LockInShareMode)?;
            b.write_str("LOCK IN SHARE MODE");
            return Ok(());
        };
        b.dialect().require(Feature::RowLock(strength))?;
        b.write_str("FOR ");
        b.write_str(strength.as_sql());
        if !self.of.is_empty() {
            b.write_str(" OF ");
            b.write_list(&self.of, ", ", |b, table| {
                b.write_identifier(table);
                Ok(())
            })?;
        }
        match self.wait {
            LockWait::Wait => {}
            LockWait::NoWait => b.write_str(" NOWAIT"),
            LockWait::SkipLocked => b.write_str(" SKIP LOCKED"),
        }
        Ok(())
    }
}
