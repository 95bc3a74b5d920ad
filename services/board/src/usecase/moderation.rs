use chrono::{DateTime, Utc};

use anoy_domain::account::{Role, StatusChange};
use anoy_domain::normalize::normalize;
use anoy_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{AccountRepository, ModerationScope, ModerationStore};
use crate::domain::types::{Account, CascadeSummary};
use crate::error::BoardServiceError;

// ── SetStatus ────────────────────────────────────────────────────────────────

pub struct SetStatusUseCase<S: ModerationStore> {
    pub store: S,
}

impl<S: ModerationStore> SetStatusUseCase<S> {
    pub async fn execute(&self, account_id: i64, change: StatusChange) -> Result<(), BoardServiceError> {
        let now = Utc::now();
        let mut scope = self.store.begin().await?;
        let account = scope
            .lock_account(account_id)
            .await?
            .ok_or(BoardServiceError::UserNotFound)?;

        let next = account.lifecycle.apply(change, now);
        scope.write_lifecycle(account_id, &next).await?;
        scope.commit().await?;

        tracing::info!(
            account_id,
            from = account.lifecycle.status.as_str(),
            to = next.status.as_str(),
            "account status changed"
        );
        Ok(())
    }
}

// ── SetRole ──────────────────────────────────────────────────────────────────

pub struct SetRoleUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> SetRoleUseCase<A> {
    pub async fn execute(&self, account_id: i64, role: Role) -> Result<(), BoardServiceError> {
        if !self.accounts.update_role(account_id, role).await? {
            return Err(BoardServiceError::UserNotFound);
        }
        tracing::info!(account_id, role = role.as_str(), "account role changed");
        Ok(())
    }
}

// ── RemoveAccount ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// The account's deletion time; unchanged when it was already deleted.
    pub deleted_at: DateTime<Utc>,
    pub cascaded: CascadeSummary,
}

pub struct RemoveAccountUseCase<S: ModerationStore> {
    pub store: S,
}

impl<S: ModerationStore> RemoveAccountUseCase<S> {
    /// Mark the account `DELETED` and soft-delete its posts and every comment
    /// under them, all with one timestamp and in one transaction.
    pub async fn execute(&self, account_id: i64) -> Result<RemovalOutcome, BoardServiceError> {
        let now = Utc::now();
        let mut scope = self.store.begin().await?;

        let account = scope
            .lock_account(account_id)
            .await?
            .ok_or(BoardServiceError::UserNotFound)?;
        let next = account.lifecycle.apply(StatusChange::Delete, now);
        scope.write_lifecycle(account_id, &next).await?;

        // Comments under an already-deleted post still get cascaded.
        let post_ids: Vec<i64> = scope
            .find_posts_by_owner(account_id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        let cascaded = scope
            .soft_delete_posts_and_comments_cascaded(&post_ids, now)
            .await?;

        scope.commit().await?;

        tracing::info!(
            account_id,
            posts = cascaded.posts,
            comments = cascaded.comments,
            "account removed"
        );
        Ok(RemovalOutcome {
            deleted_at: next.deleted_at.unwrap_or(now),
            cascaded,
        })
    }
}

// ── ListAccounts ─────────────────────────────────────────────────────────────

pub struct ListAccountsUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> ListAccountsUseCase<A> {
    pub async fn execute(
        &self,
        query: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Account>, BoardServiceError> {
        let query = query.and_then(normalize);
        self.accounts
            .search(query.as_deref(), page.clamped())
            .await
    }
}
