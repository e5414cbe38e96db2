//! Retrying JSON requests.
//!
//! Every provider call goes through [`send_json`]. Timeouts, dropped
//! connections, HTTP 429 and HTTP 5xx are retried with exponential backoff;
//! any other 4xx fails at once.

use std::time::Duration;

use reqwest::StatusCode;

use crate::GeocodeError;

/// Attempts after the first one. Waits 2s, 4s, then 8s.
const MAX_RETRIES: u32 = 3;

/// How one response status is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Accept,
    Retry,
    Fail,
}

fn verdict(status: StatusCode) -> Verdict {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Verdict::Retry
    } else if status.is_client_error() {
        Verdict::Fail
    } else {
        Verdict::Accept
    }
}

const fn backoff(retry: u32) -> Duration {
    Duration::from_secs(1 << retry)
}

fn status_error(status: StatusCode) -> GeocodeError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        GeocodeError::RateLimited
    } else {
        GeocodeError::Parse {
            message: format!("HTTP {status}"),
        }
    }
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
}

/// Sends the request built by `build_request` and parses the body as JSON.
///
/// `build_request` runs once per attempt because a
/// [`reqwest::RequestBuilder`] is consumed by `send`.
///
/// # Errors
///
/// * [`GeocodeError::RateLimited`] if the provider still answers 429 after
///   the last retry.
/// * [`GeocodeError::Http`] on a transport failure that outlasts the
///   retries, or one that is not transient.
/// * [`GeocodeError::Parse`] on another error status or a non-JSON body.
pub async fn send_json<F>(build_request: F) -> Result<serde_json::Value, GeocodeError>
where
    F: Fn() -> reqwest::RequestBuilder + Send + Sync,
{
    let mut retry = 0;
    let response = loop {
        let error = match build_request().send().await {
            Ok(response) => match verdict(response.status()) {
                Verdict::Accept => break response,
                Verdict::Fail => return Err(status_error(response.status())),
                Verdict::Retry => status_error(response.status()),
            },
            Err(e) if is_transient(&e) => GeocodeError::Http(e),
            Err(e) => return Err(GeocodeError::Http(e)),
        };

        if retry == MAX_RETRIES {
            return Err(error);
        }
        retry += 1;
        let delay = backoff(retry);
        log::warn!("Geocoding request failed ({error}), retry {retry}/{MAX_RETRIES} in {delay:?}");
        tokio::time::sleep(delay).await;
    };

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| GeocodeError::Parse {
        message: format!("Invalid JSON body: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_and_server_errors_are_retried() {
        assert_eq!(verdict(StatusCode::TOO_MANY_REQUESTS), Verdict::Retry);
        assert_eq!(verdict(StatusCode::BAD_GATEWAY), Verdict::Retry);
        assert_eq!(verdict(StatusCode::FORBIDDEN), Verdict::Fail);
        assert_eq!(verdict(StatusCode::OK), Verdict::Accept);
    }

    #[test]
    fn backoff_doubles() {
        let waits: Vec<u64> = (1..=MAX_RETRIES).map(|r| backoff(r).as_secs()).collect();
        assert_eq!(waits, [2, 4, 8]);
    }

    #[test]
    fn throttling_maps_to_rate_limited() {
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS),
            GeocodeError::RateLimited
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR),
            GeocodeError::Parse { message } if message.contains("500")
        ));
    }
}
