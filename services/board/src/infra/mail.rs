use std::time::Duration;

use anyhow::Context as _;
use reqwest::Client;
use serde::Serialize;

use crate::domain::repository::Mailer;
use crate::error::BoardServiceError;

const MAIL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct MailAddress<'a> {
    email: &'a str,
}

/// Transactional-mail request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MailRequest<'a> {
    sender: MailAddress<'a>,
    to: [MailAddress<'a>; 1],
    subject: &'a str,
    text_content: &'a str,
}

/// Posts plain-text mail to a JSON relay API.
///
/// Without an endpoint configured every send fails, so signup with
/// verification enabled cannot silently skip the mail step.
#[derive(Clone)]
pub struct HttpMailer {
    client: Client,
    endpoint: Option<String>,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(
        endpoint: Option<String>,
        api_key: Option<String>,
        from: String,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(MAIL_TIMEOUT)
            .build()
            .context("build mail http client")?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            from,
        })
    }
}

impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), BoardServiceError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| BoardServiceError::MailDelivery(anyhow::anyhow!("MAIL_API_URL is not set")))?;

        let mut request = self.client.post(endpoint).json(&MailRequest {
            sender: MailAddress { email: &self.from },
            to: [MailAddress { email: to }],
            subject,
            text_content: body,
        });
        if let Some(key) = &self.api_key {
            request = request.header("api-key", key);
        }

        let response = request
            .send()
            .await
            .context("send mail request")
            .map_err(BoardServiceError::MailDelivery)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BoardServiceError::MailDelivery(anyhow::anyhow!(
                "mail relay responded with {status}"
            )));
        }

        tracing::info!(subject, "mail sent");
        Ok(())
    }
}
