use chrono::Utc;
use rand::RngExt;

use anoy_domain::normalize::normalize;

use crate::domain::repository::{Mailer, VerificationRepository};
use crate::domain::types::VerificationRecord;
use crate::error::BoardServiceError;

pub const VERIFICATION_MAIL_SUBJECT: &str = "[anoy] Email verification code";

/// Uniform 6-digit code, zero-padded.
fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:06}")
}

fn verification_mail_body(code: &str) -> String {
    format!("Verification code: {code}\nValid for 1 hour.")
}

// ── SendVerificationCode ─────────────────────────────────────────────────────

pub struct SendCodeUseCase<V: VerificationRepository, M: Mailer> {
    pub verifications: V,
    pub mailer: M,
    pub enabled: bool,
}

impl<V: VerificationRepository, M: Mailer> SendCodeUseCase<V, M> {
    /// Returns `false` without doing anything when verification is switched off.
    ///
    /// The record is written before the mail goes out, so a delivery failure
    /// leaves a live code the user never saw; sending again overwrites it.
    pub async fn execute(&self, email: &str) -> Result<bool, BoardServiceError> {
        if !self.enabled {
            tracing::debug!("email verification disabled, not sending code");
            return Ok(false);
        }
        let email = normalize(email).ok_or(BoardServiceError::InvalidInput("email is required"))?;

        let code = generate_code();
        let record = VerificationRecord::issue(email, code, Utc::now());
        self.verifications.upsert(&record).await?;

        self.mailer
            .send(
                &record.email,
                VERIFICATION_MAIL_SUBJECT,
                &verification_mail_body(&record.code),
            )
            .await?;
        Ok(true)
    }
}

// ── VerifyCode ───────────────────────────────────────────────────────────────

pub struct VerifyCodeUseCase<V: VerificationRepository> {
    pub verifications: V,
}

impl<V: VerificationRepository> VerifyCodeUseCase<V> {
    /// Stamps `verified_at` only on an exact, unexpired match. Every other
    /// outcome returns `false` and writes nothing. Attempts are not counted.
    pub async fn execute(&self, email: &str, code: &str) -> Result<bool, BoardServiceError> {
        let Some(email) = normalize(email) else {
            return Ok(false);
        };
        let code = code.trim();
        if code.is_empty() {
            return Ok(false);
        }

        let Some(record) = self.verifications.find(&email).await? else {
            return Ok(false);
        };
        let now = Utc::now();
        if !record.accepts(code, now) {
            return Ok(false);
        }

        // A resend between the read and this write replaces the code; the
        // conditional stamp then matches nothing.
        let stamped = self.verifications.mark_verified(&email, code, now).await?;
        if !stamped {
            tracing::info!("verification record replaced during verify");
        }
        Ok(stamped)
    }
}
