use std::sync::Arc;

use anyhow::Context as _;
use chrono::Utc;

use anoy_auth_types::token::{SessionClaims, TokenCodec};
use anoy_domain::account::{LoginGate, Role};
use anoy_domain::normalize::normalize;

use crate::domain::repository::AccountRepository;
use crate::domain::types::Account;
use crate::error::BoardServiceError;
use crate::password::PasswordHashing;

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub token: String,
    pub expires_at: u64,
    pub activity_id: String,
    pub role: Role,
}

fn rejection(gate: LoginGate, account: &Account) -> BoardServiceError {
    let account_id = account.id;
    match gate {
        LoginGate::Deleted => {
            tracing::info!(account_id, reason = "deleted", "login rejected");
            BoardServiceError::AccountDeleted
        }
        LoginGate::Suspended { until } => {
            tracing::info!(account_id, reason = "suspended", "login rejected");
            BoardServiceError::AccountSuspended { until }
        }
        // Only reached when a lapsed suspension could not be lifted.
        LoginGate::Allow | LoginGate::Reactivate => {
            tracing::info!(account_id, reason = "suspended", "login rejected");
            BoardServiceError::AccountSuspended {
                until: account.lifecycle.suspended_until,
            }
        }
    }
}

pub struct LoginUseCase<A: AccountRepository> {
    pub accounts: A,
    pub hashing: PasswordHashing,
    pub codec: Arc<TokenCodec>,
}

impl<A: AccountRepository> LoginUseCase<A> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, BoardServiceError> {
        let email =
            normalize(&input.email).ok_or(BoardServiceError::InvalidInput("email is required"))?;

        let Some(account) = self.accounts.find_by_email(&email).await? else {
            // Same hashing cost as a wrong password.
            self.hashing.verify_dummy(input.password).await?;
            tracing::info!(reason = "unknown_email", "login rejected");
            return Err(BoardServiceError::AccountNotFound);
        };

        let matches = self
            .hashing
            .verify(input.password, account.password_hash.clone())
            .await?;
        if !matches {
            tracing::info!(account_id = account.id, reason = "bad_password", "login rejected");
            return Err(BoardServiceError::BadCredentials);
        }

        // Status is only revealed to callers who know the password.
        let now = Utc::now();
        let account = match account.lifecycle.login_gate(now) {
            LoginGate::Allow => account,
            LoginGate::Reactivate => {
                if self.accounts.reactivate(account.id, now).await? {
                    tracing::info!(account_id = account.id, "suspension lapsed, account reactivated");
                    account
                } else {
                    // The row changed since it was read; gate on what is stored now.
                    let current = self
                        .accounts
                        .find_by_id(account.id)
                        .await?
                        .ok_or(BoardServiceError::AccountNotFound)?;
                    match current.lifecycle.login_gate(now) {
                        LoginGate::Allow => current,
                        gate => return Err(rejection(gate, &current)),
                    }
                }
            }
            gate => return Err(rejection(gate, &account)),
        };

        let issued = self
            .codec
            .issue(
                &account.email,
                &SessionClaims {
                    activity_id: account.activity_id.clone(),
                    role: account.role,
                },
            )
            .context("issue session token")?;

        Ok(LoginOutput {
            token: issued.token,
            expires_at: issued.expires_at,
            activity_id: account.activity_id,
            role: account.role,
        })
    }
}
