//! Token acquisition from the provider-specific auth endpoint.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

use crate::constants::{EQUITIES_FORMAT_HEADER_VALUE, SDK_ID};
use crate::error::{Error, Result};
use crate::types::enums::Provider;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Acquires a short-lived session token from a provider's auth endpoint.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    provider: Provider,
    access_key: String,
    is_public_key: bool,
    delayed: bool,
}

impl AuthClient {
    /// Construct a client for the given provider and credential.
    ///
    /// `is_public_key` selects `Authorization: Public {key}` header auth
    /// instead of the `?api_key=` query-string form. `delayed` requests the
    /// server-side delayed feed even when the key is entitled to realtime.
    pub fn new(
        provider: Provider,
        access_key: impl Into<String>,
        is_public_key: bool,
        delayed: bool,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            provider,
            access_key: access_key.into(),
            is_public_key,
            delayed,
        })
    }

    /// Acquire a token. Returns [`Error::AuthFailed`] on `401` (fatal — the
    /// caller should not retry through the backoff driver); any other
    /// non-success status or transport error is a transient
    /// [`Error::Http`]-shaped failure the backoff driver should retry.
    pub async fn acquire_token(&self) -> Result<String> {
        let mut url = self.provider.auth_url();
        if !self.is_public_key {
            url = format!("{url}?api_key={}", self.access_key);
        }
        if self.delayed {
            let sep = if url.contains('?') { '&' } else { '?' };
            url = format!("{url}{sep}delayed=true");
        }

        tracing::debug!(%url, public_key = self.is_public_key, delayed = self.delayed, "acquiring session token");

        let mut req = self.http.get(&url).headers(self.common_headers());
        if self.is_public_key {
            let value = HeaderValue::from_str(&format!("Public {}", self.access_key))
                .map_err(|_| Error::Config("access key contains invalid header characters".into()))?;
            req = req.header(reqwest::header::AUTHORIZATION, value);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status.as_u16() == 401 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::AuthFailed(body));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "auth endpoint returned non-success status");
            return Err(Error::HttpStatus { status, body });
        }

        let token = resp.text().await?;
        Ok(token.trim().to_owned())
    }

    fn common_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(
            "Client-Information",
            HeaderValue::from_static(SDK_ID),
        );
        headers.insert(
            "UseNewEquitiesFormat",
            HeaderValue::from_static(EQUITIES_FORMAT_HEADER_VALUE),
        );
        headers
    }
}
