//! Argon2id password hashing.
//!
//! Hashing is CPU-bound, so both operations run on the blocking pool.

use std::sync::Arc;

use anyhow::Context as _;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};
use tokio::sync::OnceCell;

const DUMMY_PASSWORD: &str = "anoy-dummy-password";

#[derive(Debug, Clone)]
pub struct PasswordHashing {
    params: Params,
    /// Hash checked when there is no stored hash to check against. Built on
    /// first use with the same cost parameters as real hashes.
    dummy: Arc<OnceCell<String>>,
}

impl Default for PasswordHashing {
    fn default() -> Self {
        Self {
            params: Params::default(),
            dummy: Arc::default(),
        }
    }
}

impl PasswordHashing {
    /// Custom cost parameters: memory in KiB, iterations, lanes.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> anyhow::Result<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {e}"))?;
        Ok(Self {
            params,
            dummy: Arc::default(),
        })
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    /// Hash with a fresh random salt, returning a PHC string.
    pub async fn hash(&self, password: String) -> anyhow::Result<String> {
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Self::argon2(params)
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
                .map_err(|e| anyhow::anyhow!("hash password: {e}"))
        })
        .await
        .context("join password hashing task")?
    }

    /// Check `password` against a stored PHC string. Cost parameters come from
    /// the stored hash, so hashes made under older settings still verify.
    ///
    /// A stored value that does not parse is an error, not a mismatch.
    pub async fn verify(&self, password: String, stored: String) -> anyhow::Result<bool> {
        tokio::task::spawn_blocking(move || -> anyhow::Result<bool> {
            let parsed = PasswordHash::new(&stored)
                .map_err(|e| anyhow::anyhow!("parse stored password hash: {e}"))?;
            Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await
        .context("join password verification task")?
    }

    /// Run a full verification against the dummy hash and discard the result,
    /// so a lookup miss costs as much as a wrong password.
    pub async fn verify_dummy(&self, password: String) -> anyhow::Result<()> {
        let dummy = self
            .dummy
            .get_or_try_init(|| self.hash(DUMMY_PASSWORD.to_owned()))
            .await?
            .clone();
        self.verify(password, dummy).await?;
        Ok(())
    }

    /// Whether the dummy hash has been built yet.
    pub fn dummy_ready(&self) -> bool {
        self.dummy.initialized()
    }
}
