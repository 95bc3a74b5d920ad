use anoy_domain::normalize::normalize_activity_id;

use crate::domain::repository::AccountRepository;
use crate::error::BoardServiceError;

pub struct CheckActivityIdUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> CheckActivityIdUseCase<A> {
    /// `false` for anything signup would reject (blank or over-long), and for taken ids.
    pub async fn execute(&self, raw: &str) -> Result<bool, BoardServiceError> {
        let Ok(activity_id) = normalize_activity_id(raw) else {
            return Ok(false);
        };
        let taken = self.accounts.activity_id_exists(&activity_id).await?;
        Ok(!taken)
    }
}
