//! Transactional email API client.
//!
//! Posts plain-text messages as `{from, to, subject, text}` JSON to a single
//! endpoint with a bearer token. Any provider with that shape works.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::EmailConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Token cannot be used as a header value.
    #[error("invalid API token: {0}")]
    InvalidToken(String),
}

/// One outgoing plain-text message.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Client for the transactional email endpoint.
#[derive(Clone)]
pub struct EmailClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl EmailClient {
    /// Create a new email client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let mut headers = HeaderMap::new();

        let mut auth_value =
            HeaderValue::from_str(&format!("Bearer {}", config.api_token.expose_secret()))
                .map_err(|e| EmailError::InvalidToken(e.to_string()))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.api_url.clone(),
        })
    }

    /// Send one message.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API answers with a non-2xx status.
    pub async fn send(&self, message: &OutgoingEmail) -> Result<(), EmailError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(message)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
