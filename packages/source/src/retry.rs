//! HTTP retry helpers for transient errors.
//!
//! All upstream fetchers should use [`send_json`] instead of calling
//! `reqwest::RequestBuilder::send()` directly. This ensures every HTTP
//! request gets automatic retry with short backoff for transient
//! failures (timeouts, connection resets, server errors, rate limiting).
//!
//! # Usage
//!
//! ```ignore
//! use crate::retry;
//!
//! // Simple GET → JSON
//! let body = retry::send_json(|| client.get(&url)).await?;
//!
//! // GET with query params
//! let body = retry::send_json(|| client.get(&url).query(&params)).await?;
//! ```

use std::time::Duration;

use crate::SourceError;

/// Maximum number of retry attempts for transient HTTP errors
/// (connection failures, timeouts, rate limiting, server errors).
///
/// Assessments are interactive, so the budget is small: with backoff of
/// 500ms then 1s the total extra wait before giving up is 1.5 seconds.
const MAX_RETRIES: u32 = 2;

/// Delay before the first retry.
const BASE_DELAY: Duration = Duration::from_millis(500);

/// Upper bound on the backoff delay.
const MAX_DELAY: Duration = Duration::from_secs(1);

/// The backoff delay before retry number `attempt` (1-based).
#[must_use]
pub fn backoff_delay(attempt: u32) -> Duration {
    (BASE_DELAY * 2_u32.saturating_pow(attempt.saturating_sub(1))).min(MAX_DELAY)
}

/// Sends an HTTP request and parses the response body as JSON.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (since builders are consumed by
/// `.send()`). This allows retrying any request shape — GET, POST,
/// with headers, query params, etc.
///
/// Retries up to [`MAX_RETRIES`] times with backoff on connection
/// errors, timeouts, HTTP 429, and HTTP 5xx. Does **not** retry other
/// HTTP 4xx — these are permanent.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails after all retries, the
/// server returns a non-retryable status code, or the response body
/// cannot be parsed as JSON.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(build_request: F) -> Result<serde_json::Value, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, MAX_RETRIES).await?;
    Ok(response.json::<serde_json::Value>().await?)
}

/// Core retry loop.
///
/// Sends the request built by `build_request`, retrying on transient
/// errors up to `max_retries` times with backoff. Returns the
/// successful [`reqwest::Response`] (status 2xx or 3xx).
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    max_retries: u32,
) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_error: Option<SourceError> = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = backoff_delay(attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    last_error = Some(SourceError::Http(e));
                    continue;
                }
                return Err(SourceError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                // 429 Too Many Requests — always retry
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    if attempt < max_retries {
                        log::warn!("  HTTP 429 (rate limited)");
                        last_error = Some(SourceError::Malformed {
                            message: format!("HTTP {status}"),
                        });
                        continue;
                    }
                    return Err(SourceError::Malformed {
                        message: format!("HTTP {status} after {max_retries} retries"),
                    });
                }

                // 5xx Server Error — retry
                if status.is_server_error() {
                    if attempt < max_retries {
                        log::warn!("  HTTP {status} (server error)");
                        last_error = Some(SourceError::Malformed {
                            message: format!("HTTP {status}"),
                        });
                        continue;
                    }
                    return Err(SourceError::Malformed {
                        message: format!("HTTP {status} after {max_retries} retries"),
                    });
                }

                // 4xx Client Error (not 429) — permanent, don't retry
                if status.is_client_error() {
                    return Err(SourceError::Malformed {
                        message: format!("HTTP {status}"),
                    });
                }

                return Ok(response);
            }
        }
    }

    // Should be unreachable, but in case the loop exits without returning:
    Err(last_error.unwrap_or_else(|| SourceError::Malformed {
        message: "request failed after all retries".to_string(),
    }))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serves the given raw HTTP responses on a loopback port, one
    /// connection per response, then stops listening.
    async fn serve_responses(responses: Vec<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for response in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                let mut head = [0_u8; 1024];
                let _ = stream.read(&mut head).await;
                stream.write_all(response.as_bytes()).await.unwrap();
            }
        });

        format!("http://{addr}")
    }

    #[test]
    fn backoff_doubles_then_caps() {
        assert_eq!(backoff_delay(1), Duration::from_millis(500));
        assert_eq!(backoff_delay(2), Duration::from_secs(1));
        assert_eq!(backoff_delay(3), Duration::from_secs(1));
        assert_eq!(backoff_delay(10), Duration::from_secs(1));
    }

    #[test]
    fn backoff_tolerates_zero_attempt() {
        assert_eq!(backoff_delay(0), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn transient_status_is_retried_until_success() {
        let url = serve_responses(vec![
            "HTTP/1.1 500 Internal Server Error\r\nconnection: close\r\ncontent-length: 0\r\n\r\n",
            "HTTP/1.1 200 OK\r\nconnection: close\r\ncontent-type: application/json\r\ncontent-length: 15\r\n\r\n{\"status\":\"ok\"}",
        ])
        .await;

        let client = reqwest::Client::new();
        let body = send_json(|| client.get(&url)).await.unwrap();

        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let url = serve_responses(vec![
            "HTTP/1.1 404 Not Found\r\nconnection: close\r\ncontent-length: 0\r\n\r\n",
        ])
        .await;

        let client = reqwest::Client::new();
        let err = send_json(|| client.get(&url)).await.unwrap_err();

        // A retry would hit the closed listener and surface as an HTTP
        // error instead of the terminal 404.
        assert!(matches!(err, SourceError::Malformed { .. }));
    }
}
