//! Account role, status, and the status transition table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account permission level.
///
/// Wire format: `"USER"` / `"ADMIN"`. New accounts are always `User`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Parse a wire value, ignoring case. Returns `None` for unknown values.
    pub fn parse(v: &str) -> Option<Self> {
        if v.eq_ignore_ascii_case("USER") {
            Some(Self::User)
        } else if v.eq_ignore_ascii_case("ADMIN") {
            Some(Self::Admin)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

/// Account lifecycle status.
///
/// Wire format: `"ACTIVE"` / `"SUSPENDED"` / `"DELETED"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    Active,
    Suspended,
    Deleted,
}

impl AccountStatus {
    pub fn parse(v: &str) -> Option<Self> {
        match v.to_ascii_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "SUSPENDED" => Some(Self::Suspended),
            "DELETED" => Some(Self::Deleted),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::Deleted => "DELETED",
        }
    }
}

/// A requested status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Activate,
    /// `until: None` suspends indefinitely.
    Suspend { until: Option<DateTime<Utc>> },
    Delete,
}

impl StatusChange {
    /// Build a change from a target status. `until` only matters for `Suspended`.
    pub fn new(status: AccountStatus, until: Option<DateTime<Utc>>) -> Self {
        match status {
            AccountStatus::Active => Self::Activate,
            AccountStatus::Suspended => Self::Suspend { until },
            AccountStatus::Deleted => Self::Delete,
        }
    }

    pub fn target(self) -> AccountStatus {
        match self {
            Self::Activate => AccountStatus::Active,
            Self::Suspend { .. } => AccountStatus::Suspended,
            Self::Delete => AccountStatus::Deleted,
        }
    }
}

/// The status-related columns of an account, moved as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    pub status: AccountStatus,
    pub suspended_until: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Outcome of checking an account's status during login, after the password matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginGate {
    Allow,
    /// Suspension has lapsed: the account must be moved back to `Active` before issuing a token.
    Reactivate,
    Deleted,
    Suspended { until: Option<DateTime<Utc>> },
}

impl Lifecycle {
    pub fn active() -> Self {
        Self {
            status: AccountStatus::Active,
            suspended_until: None,
            deleted_at: None,
        }
    }

    /// Apply a transition. `now` is only consulted when the account has no deletion time yet.
    ///
    /// | change | status | suspended_until | deleted_at |
    /// |---|---|---|---|
    /// | `Activate` | `ACTIVE` | cleared | cleared |
    /// | `Suspend { until }` | `SUSPENDED` | `until` | cleared |
    /// | `Delete` | `DELETED` | cleared | kept if set, else `now` |
    pub fn apply(self, change: StatusChange, now: DateTime<Utc>) -> Self {
        match change {
            StatusChange::Activate => Self::active(),
            StatusChange::Suspend { until } => Self {
                status: AccountStatus::Suspended,
                suspended_until: until,
                deleted_at: None,
            },
            StatusChange::Delete => Self {
                status: AccountStatus::Deleted,
                suspended_until: None,
                deleted_at: Some(self.deleted_at.unwrap_or(now)),
            },
        }
    }

    pub fn login_gate(&self, now: DateTime<Utc>) -> LoginGate {
        match self.status {
            AccountStatus::Active => LoginGate::Allow,
            AccountStatus::Deleted => LoginGate::Deleted,
            AccountStatus::Suspended => match self.suspended_until {
                Some(until) if until <= now => LoginGate::Reactivate,
                until => LoginGate::Suspended { until },
            },
        }
    }

    /// Checks the column invariants for the current status.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            AccountStatus::Active => self.suspended_until.is_none() && self.deleted_at.is_none(),
            AccountStatus::Suspended => self.deleted_at.is_none(),
            AccountStatus::Deleted => self.deleted_at.is_some() && self.suspended_until.is_none(),
        }
    }
}
