use serde::Deserialize;

use anoy_core::config::Config;

/// Board service configuration loaded from environment variables.
#[derive(Deserialize)]
pub struct BoardConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HS256 signing secret. Standard base64 is decoded first; otherwise the raw
    /// UTF-8 bytes are used. Must yield at least 32 bytes.
    pub jwt_secret: String,
    /// Session token lifetime in seconds (default 86400). Env var: `JWT_EXPIRATION_SECS`.
    #[serde(default = "default_jwt_expiration_secs")]
    pub jwt_expiration_secs: u64,
    /// Require a verified email before signup (default true).
    #[serde(default = "default_email_verification_enabled")]
    pub email_verification_enabled: bool,
    /// Comma-separated browser origins allowed by CORS.
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,
    /// TCP port to listen on (default 3114). Env var: `BOARD_PORT`.
    #[serde(default = "default_board_port")]
    pub board_port: u16,
    /// HTTP endpoint of the transactional mail API. Unset means sends fail.
    #[serde(default)]
    pub mail_api_url: Option<String>,
    #[serde(default)]
    pub mail_api_key: Option<String>,
    #[serde(default = "default_mail_from")]
    pub mail_from: String,
}

impl Config for BoardConfig {}

fn default_jwt_expiration_secs() -> u64 {
    86_400
}

fn default_email_verification_enabled() -> bool {
    true
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_owned()]
}

fn default_board_port() -> u16 {
    3114
}

fn default_mail_from() -> String {
    "no-reply@anoy.local".to_owned()
}

impl std::fmt::Debug for BoardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field(
                "email_verification_enabled",
                &self.email_verification_enabled,
            )
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("board_port", &self.board_port)
            .field("mail_api_url", &self.mail_api_url)
            .field("mail_from", &self.mail_from)
            .finish_non_exhaustive()
    }
}
