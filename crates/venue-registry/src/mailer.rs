use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::telemetry::MASS_EMAIL_MESSAGES;

/// Hands single messages to a transactional email provider. Delivery, retries and
/// bounces are the provider's business.
#[async_trait]
pub trait MailProvider: Send + Sync + 'static {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;
}

#[derive(Serialize)]
struct ProviderMessage<'a> { from: &'a str, to: [&'a str; 1], subject: &'a str, html: &'a str }

/// JSON-over-HTTPS provider (`POST {endpoint}` with bearer auth, one message per request).
#[derive(Debug, Clone)]
pub struct HttpMailProvider { client: reqwest::Client, endpoint: String, api_key: String, from: String }

impl HttpMailProvider {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, from: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, endpoint: endpoint.into(), api_key: api_key.into(), from: from.into() })
    }
}

#[async_trait]
impl MailProvider for HttpMailProvider {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let msg = ProviderMessage { from: &self.from, to: [to], subject, html };
        let resp = self.client.post(&self.endpoint).bearer_auth(&self.api_key).json(&msg).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            anyhow::bail!("provider returned {status}: {snippet}");
        }
        Ok(())
    }
}

/// Used when no provider is configured: accepts every message and logs it.
#[derive(Debug, Clone, Default)]
pub struct LogMailProvider;

#[async_trait]
impl MailProvider for LogMailProvider {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        info!(%to, %subject, html_len=html.len(), "mail.log_only");
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct MassEmailReport { pub sent: usize, pub failed: Vec<String> }

/// Send one message per recipient with at most `concurrency` in flight. Failures are
/// collected, never retried.
pub async fn send_mass(provider: &dyn MailProvider, recipients: &[String], subject: &str, html: &str, concurrency: usize) -> MassEmailReport {
    let results: Vec<(String, anyhow::Result<()>)> = stream::iter(recipients.iter().cloned())
        .map(|to| async move {
            let res = provider.send(&to, subject, html).await;
            (to, res)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;
    let mut report = MassEmailReport::default();
    for (to, res) in results {
        match res {
            Ok(()) => { report.sent += 1; MASS_EMAIL_MESSAGES.with_label_values(&["sent"]).inc(); }
            Err(e) => {
                warn!(%to, error=%e, "mail.send_failed");
                MASS_EMAIL_MESSAGES.with_label_values(&["failed"]).inc();
                report.failed.push(to);
            }
        }
    }
    report
}
