// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::ApiConfig;

/// Backoff settings for transient request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each further one
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &ApiConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// GET `url` with `query` and decode the JSON body.
///
/// Timeouts, connection failures, HTTP 429 and 5xx are retried per
/// `retry`; any other non-success status fails immediately.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &Url,
    query: &[(&str, String)],
    retry: RetryPolicy,
) -> Result<T> {
    let mut attempt = 0;
    loop {
        match try_get_json(client, url, query).await {
            Ok(body) => return Ok(body),
            Err(e) if e.is_transient() && attempt < retry.max_retries => {
                let delay = retry.delay(attempt);
                log::warn!("Request to {} failed: {}. Retrying in {:?}", url, e, delay);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn try_get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &Url,
    query: &[(&str, String)],
) -> Result<T> {
    log::debug!("GET {} {:?}", url, query);
    let response = client.get(url.clone()).query(query).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::fetch(url.as_str(), status));
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_doubles() {
        let retry = RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_millis(500),
        };
        assert_eq!(retry.delay(0), Duration::from_millis(500));
        assert_eq!(retry.delay(1), Duration::from_millis(1000));
        assert_eq!(retry.delay(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_retry_from_config() {
        let retry = RetryPolicy::from_config(&ApiConfig::default());
        assert_eq!(retry.max_retries, 3);
        assert_eq!(retry.backoff, Duration::from_millis(500));
    }

    #[test]
    fn test_create_client() {
        assert!(create_async_client(&ApiConfig::default()).is_ok());
    }

    mod over_http {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::time::Duration;

        use serde_json::Value;
        use url::Url;

        use crate::error::{AppError, Result};
        use crate::models::ApiConfig;
        use crate::utils::http::{RetryPolicy, create_async_client, get_json};
        use crate::utils::test_server::TestServer;

        fn retry(max_retries: u32) -> RetryPolicy {
            RetryPolicy {
                max_retries,
                backoff: Duration::from_millis(1),
            }
        }

        /// Serve `failures` responses with `status`, then a JSON body.
        async fn failing_then_ok(status: u16, failures: usize) -> TestServer {
            let calls = Arc::new(AtomicUsize::new(0));
            TestServer::start(move |_| {
                if calls.fetch_add(1, Ordering::SeqCst) < failures {
                    (status, "{}".to_string())
                } else {
                    (200, r#"{"ok": true}"#.to_string())
                }
            })
            .await
        }

        async fn get(server: &TestServer, retry: RetryPolicy) -> Result<Value> {
            let client = create_async_client(&ApiConfig::default()).unwrap();
            let url = Url::parse(&format!("{}/vacancies", server.base_url)).unwrap();
            get_json(&client, &url, &[("text", "rust".to_string())], retry).await
        }

        #[tokio::test]
        async fn test_transient_status_is_retried() {
            let server = failing_then_ok(503, 1).await;

            let body = get(&server, retry(3)).await.unwrap();
            assert_eq!(body["ok"], true);
            assert_eq!(server.requests().len(), 2);
        }

        #[tokio::test]
        async fn test_not_found_is_not_retried() {
            let server = failing_then_ok(404, 1).await;

            let result = get(&server, retry(3)).await;
            assert!(matches!(result, Err(AppError::Fetch { status: 404, .. })));
            assert_eq!(server.requests().len(), 1);
        }

        #[tokio::test]
        async fn test_retries_are_bounded() {
            let server = failing_then_ok(503, usize::MAX).await;

            let result = get(&server, retry(2)).await;
            assert!(matches!(result, Err(AppError::Fetch { status: 503, .. })));
            assert_eq!(server.requests().len(), 3);
        }

        #[tokio::test]
        async fn test_sends_user_agent_and_query() {
            let server = failing_then_ok(200, 0).await;

            get(&server, retry(0)).await.unwrap();
            let requests = server.requests();
            assert_eq!(requests[0].path, "/vacancies");
            assert_eq!(requests[0].query["text"], "rust");
            assert_eq!(requests[0].headers["user-agent"], "HH-User-Agent");
        }
    }
}
