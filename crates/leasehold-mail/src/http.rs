//! Reqwest-backed client for the hosted email function.
//!
//! The function accepts `{ "to", "subject", "html" }` as JSON and answers
//! with any 2xx status on success. Nothing is retried here; a failure is
//! reported to the caller as-is.

use std::time::Duration;

use leasehold_core::dispatch::{EmailDispatcher, EmailMessage};
use leasehold_core::error::LeaseholdResult;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::config::MailConfig;
use crate::error::DispatchError;

/// Longest response body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

pub struct HttpEmailDispatcher {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpEmailDispatcher {
    pub fn new(config: &MailConfig) -> Result<Self, DispatchError> {
        let endpoint = Url::parse(&config.function_url)
            .map_err(|e| DispatchError::Config(format!("function_url: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    async fn post(&self, message: &EmailMessage) -> Result<(), DispatchError> {
        let mut request = self.client.post(self.endpoint.clone()).json(message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(DispatchError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl EmailDispatcher for HttpEmailDispatcher {
    async fn send(&self, message: EmailMessage) -> LeaseholdResult<()> {
        debug!(subject = %message.subject, "Dispatching email");
        self.post(&message).await.map_err(|e| {
            warn!(error = %e, "Email dispatch failed");
            e.into()
        })
    }
}
