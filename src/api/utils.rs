use super::types::ErrorBody;
use crate::error::{LiveroomError, Result};
use crate::ui::{toast, MessageSeverity};
use rand::Rng;
use std::future::Future;
use std::time::Duration;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Retries after the first attempt. Only requests that never got an answer
/// (timeouts, refused connections) are retried.
pub const MAX_RETRIES: u32 = 2;
const FIRST_BACKOFF: Duration = Duration::from_millis(500);
const MAX_JITTER: f64 = 0.3;

pub async fn check_response_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!(
            status = %status,
            error = %error_text,
            "API request failed"
        );
        return Err(api_error(status.as_u16(), &error_text));
    }
    Ok(response)
}

/// Build an API error, preferring the backend's `detail` string over the raw body.
pub fn api_error(status: u16, body: &str) -> LiveroomError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message())
        .unwrap_or_else(|_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "request failed".to_string()
            } else {
                trimmed.to_string()
            }
        });
    LiveroomError::Api { status, detail }
}

pub fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

/// Pause before retry number `retry` (1-based): the first backoff doubled per
/// earlier retry, stretched by up to 30% so clients do not retry in lockstep.
pub fn backoff_delay(retry: u32) -> Duration {
    let base = FIRST_BACKOFF * 2u32.saturating_pow(retry.saturating_sub(1));
    base.mul_f64(1.0 + rand::rng().random_range(0.0..MAX_JITTER))
}

fn describe(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "timed out"
    } else if error.is_connect() {
        "unreachable"
    } else {
        "failed"
    }
}

/// Send a backend request, retrying while the backend cannot be reached.
pub async fn with_retries<F, Fut, T>(service_name: &str, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, reqwest::Error>>,
{
    let mut retry = 0;
    loop {
        let error = match operation().await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };

        if retry < MAX_RETRIES && is_retryable_error(&error) {
            retry += 1;
            let delay = backoff_delay(retry);
            tracing::warn!(
                service = service_name,
                retry,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Backend request {}, retrying",
                describe(&error)
            );
            toast(
                MessageSeverity::Warning,
                format!(
                    "{} {}, retrying in {:.1}s ({}/{})",
                    service_name,
                    describe(&error),
                    delay.as_secs_f64(),
                    retry,
                    MAX_RETRIES
                ),
            );
            tokio::time::sleep(delay).await;
            continue;
        }

        let attempts = retry + 1;
        tracing::error!(service = service_name, attempts, error = %error, "Backend request failed");
        return Err(LiveroomError::NetworkError(format!(
            "{} request {} after {} attempt{}: {}",
            service_name,
            describe(&error),
            attempts,
            if attempts == 1 { "" } else { "s" },
            error
        )));
    }
}
