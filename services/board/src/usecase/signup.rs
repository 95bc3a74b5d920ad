use chrono::Utc;

use anoy_domain::account::Role;
use anoy_domain::normalize::{normalize, normalize_activity_id};

use crate::domain::repository::{AccountRepository, VerificationRepository};
use crate::domain::types::NewAccount;
use crate::error::BoardServiceError;
use crate::password::PasswordHashing;

pub struct SignupInput {
    pub email: String,
    pub password: String,
    pub activity_id: String,
}

pub struct SignupUseCase<A: AccountRepository, V: VerificationRepository> {
    pub accounts: A,
    pub verifications: V,
    pub hashing: PasswordHashing,
    pub verification_enabled: bool,
}

impl<A: AccountRepository, V: VerificationRepository> SignupUseCase<A, V> {
    pub async fn execute(&self, input: SignupInput) -> Result<i64, BoardServiceError> {
        let email =
            normalize(&input.email).ok_or(BoardServiceError::InvalidInput("email is required"))?;
        let activity_id = normalize_activity_id(&input.activity_id)?;
        if input.password.trim().is_empty() {
            return Err(BoardServiceError::InvalidInput("password is required"));
        }

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(BoardServiceError::EmailAlreadyRegistered);
        }
        if self.accounts.activity_id_exists(&activity_id).await? {
            return Err(BoardServiceError::ActivityIdTaken);
        }

        if self.verification_enabled {
            // Recency is judged now, not at verify time.
            self.verifications
                .find(&email)
                .await?
                .ok_or(BoardServiceError::VerificationRequired)?
                .check_consumable(Utc::now())?;
        }

        let password_hash = self.hashing.hash(input.password).await?;
        let account = self
            .accounts
            .create(
                &NewAccount {
                    email,
                    activity_id,
                    password_hash,
                    role: Role::User,
                    created_at: Utc::now(),
                },
                self.verification_enabled,
            )
            .await?;

        tracing::info!(account_id = account.id, "account registered");
        Ok(account.id)
    }
}
