use crate::config::EmailApiConfig;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq)]
pub enum EmailBody {
    /// Rendered by the email provider from a template stored there
    Template { key: String, data: Value },
    Html(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body: EmailBody,
}

#[async_trait::async_trait]
pub trait IEmailTransport: Send + Sync {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
}

impl<'a> SendEmailRequest<'a> {
    fn new(from: &'a str, message: &'a EmailMessage) -> Self {
        let (template, data, html) = match &message.body {
            EmailBody::Template { key, data } => (Some(key.as_str()), Some(data), None),
            EmailBody::Html(html) => (None, None, Some(html.as_str())),
        };
        Self {
            from,
            to: &message.to,
            subject: &message.subject,
            template,
            data,
            html,
        }
    }
}

/// Sends emails through the transactional email API
pub struct HttpEmailTransport {
    client: Client,
    config: EmailApiConfig,
}

impl HttpEmailTransport {
    pub fn new(config: EmailApiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }
}

#[async_trait::async_trait]
impl IEmailTransport for HttpEmailTransport {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        let body = SendEmailRequest::new(&self.config.from, &message);
        self.client
            .post(format!("{}/send", self.config.url.trim_end_matches('/')))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Unable to reach the email API: {:?}", e);
                e
            })?
            .error_for_status()?;
        Ok(())
    }
}

/// Only logs the emails. Used when no email API is configured.
pub struct LogEmailTransport {}

#[async_trait::async_trait]
impl IEmailTransport for LogEmailTransport {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        info!(
            "Email API not configured, skipping email `{}` to {:?}",
            message.subject, message.to
        );
        Ok(())
    }
}
