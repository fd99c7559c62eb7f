//! Shared plumbing for the JSON-over-HTTP service clients.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Request timeout applied to every outbound call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A service answered with a non-2xx status.
#[derive(Debug, thiserror::Error)]
#[error("{what}: HTTP {status}: {body}")]
pub struct HttpStatusError {
    pub what: String,
    pub status: StatusCode,
    pub body: String,
}

impl HttpStatusError {
    /// The service refused the request itself, so sending it again unchanged
    /// will not succeed. Timeouts, conflicts and rate limits are not refusals.
    pub fn is_rejection(&self) -> bool {
        self.status.is_client_error()
            && !matches!(
                self.status,
                StatusCode::REQUEST_TIMEOUT | StatusCode::CONFLICT | StatusCode::TOO_MANY_REQUESTS
            )
    }
}

/// Build a client with the standard timeout.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("failed to build HTTP client")
}

/// Join a base URL and a path without doubling or dropping the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Send a request and return the response if it is a 2xx.
///
/// Any other status becomes an [`HttpStatusError`] carrying the response body.
pub async fn send(request: RequestBuilder, what: &str) -> Result<Response> {
    let response = request
        .send()
        .await
        .with_context(|| format!("{what}: request failed"))?;

    let status = response.status();
    debug!(%status, what, "http response");
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(HttpStatusError {
            what: what.to_string(),
            status,
            body,
        }
        .into());
    }
    Ok(response)
}

/// Send a request and decode a 2xx JSON body.
pub async fn send_json<T: DeserializeOwned>(request: RequestBuilder, what: &str) -> Result<T> {
    send(request, what)
        .await?
        .json::<T>()
        .await
        .with_context(|| format!("{what}: invalid response body"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalises_slashes() {
        assert_eq!(join_url("http://h:9000/", "/api/recipes"), "http://h:9000/api/recipes");
        assert_eq!(join_url("http://h/v2", "carts"), "http://h/v2/carts");
    }

    fn status_error(code: u16) -> HttpStatusError {
        HttpStatusError {
            what: "checkout".into(),
            status: StatusCode::from_u16(code).unwrap(),
            body: String::new(),
        }
    }

    #[test]
    fn only_definitive_client_errors_are_rejections() {
        assert!(status_error(400).is_rejection());
        assert!(status_error(422).is_rejection());
        assert!(!status_error(408).is_rejection());
        assert!(!status_error(409).is_rejection());
        assert!(!status_error(429).is_rejection());
        assert!(!status_error(502).is_rejection());
        assert!(!status_error(504).is_rejection());
    }

    #[test]
    fn status_error_message_names_the_call() {
        let err = HttpStatusError {
            what: "create cart".into(),
            status: StatusCode::BAD_GATEWAY,
            body: "upstream".into(),
        };
        assert_eq!(err.to_string(), "create cart: HTTP 502 Bad Gateway: upstream");
    }
}
