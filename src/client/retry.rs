//! Retry policy and response classification.

use std::time::Duration;

use crate::config::Config;
use crate::error::{Result, WeapmError};
use crate::model::ApiEnvelope;

use super::transport::RawResponse;

/// Bounded retries with linear backoff: retry `n` waits `n * backoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_retries, config.retry_backoff)
    }

    /// Total number of attempts including the first one.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before `attempt` (0-based). The first attempt never waits.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

/// What a status code means for the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Read the envelope.
    Proceed,
    /// Server-side or throttling; try again.
    Transient,
    /// Caller's fault; give up.
    Rejected,
}

pub fn classify_status(status: u16) -> StatusClass {
    match status {
        429 => StatusClass::Transient,
        s if s >= 500 => StatusClass::Transient,
        400..=499 => StatusClass::Rejected,
        _ => StatusClass::Proceed,
    }
}

/// Turn one raw response into an envelope or the matching error.
pub fn interpret(response: RawResponse) -> Result<ApiEnvelope> {
    match classify_status(response.status) {
        StatusClass::Transient => {
            return Err(WeapmError::Server {
                status: response.status,
                body: response.text(),
            });
        }
        StatusClass::Rejected => {
            return Err(WeapmError::Client {
                status: response.status,
                body: response.text(),
            });
        }
        StatusClass::Proceed => {}
    }

    let envelope: ApiEnvelope = serde_json::from_slice(&response.body).map_err(|e| {
        WeapmError::Decode(format!("{e} (body: {})", snippet(&response.text(), 200)))
    })?;

    if envelope.code != 0 {
        return Err(WeapmError::Api {
            code: envelope.code,
            message: envelope.message().to_string(),
        });
    }
    Ok(envelope)
}

fn snippet(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_linear_in_attempt() {
        let p = RetryPolicy::new(3, Duration::from_millis(500));
        assert_eq!(p.attempts(), 4);
        assert_eq!(p.delay_for(0), Duration::ZERO);
        assert_eq!(p.delay_for(1), Duration::from_millis(500));
        assert_eq!(p.delay_for(3), Duration::from_millis(1500));
    }

    #[test]
    fn status_classes() {
        assert_eq!(classify_status(200), StatusClass::Proceed);
        assert_eq!(classify_status(204), StatusClass::Proceed);
        assert_eq!(classify_status(400), StatusClass::Rejected);
        assert_eq!(classify_status(404), StatusClass::Rejected);
        assert_eq!(classify_status(429), StatusClass::Transient);
        assert_eq!(classify_status(500), StatusClass::Transient);
        assert_eq!(classify_status(504), StatusClass::Transient);
    }

    #[test]
    fn business_code_surfaces_as_api_error() {
        let err = interpret(RawResponse::new(
            200,
            r#"{"code":1001,"message":"cluster not found"}"#,
        ))
        .unwrap_err();
        match err {
            WeapmError::Api { code, message } => {
                assert_eq!(code, 1001);
                assert_eq!(message, "cluster not found");
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn non_json_body_is_decode_error() {
        let err = interpret(RawResponse::new(200, "<html>oops</html>")).unwrap_err();
        assert!(matches!(err, WeapmError::Decode(ref m) if m.contains("<html>oops</html>")));
    }

    #[test]
    fn client_error_keeps_body() {
        let err = interpret(RawResponse::new(401, "unauthorized")).unwrap_err();
        assert!(matches!(
            err,
            WeapmError::Client { status: 401, ref body } if body == "unauthorized"
        ));
    }

    #[test]
    fn snippet_truncates_long_bodies() {
        let long = "x".repeat(300);
        let s = snippet(&long, 200);
        assert_eq!(s.chars().count(), 201);
        assert!(s.ends_with('…'));
    }
}
