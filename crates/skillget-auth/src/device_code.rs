//! Device-code login against the skill registry.
//!
//! # Flow Overview
//!
//! 1. The client asks the registry for a device code (`POST /auth/device`).
//! 2. The registry returns a `user_code` and `verification_uri`.
//! 3. The user visits the URI and enters the code in their browser.
//! 4. The client polls `POST /auth/device/token` until the user completes
//!    auth, the code expires, or the user declines.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

/// Poll interval used when the registry does not send one.
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Added to the interval whenever the registry answers `slow_down`.
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Response from the device authorization endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCodeResponse {
    /// The device verification code.
    pub device_code: String,

    /// The end-user verification code to display to the user.
    pub user_code: String,

    /// The URI the user should visit to enter the code.
    pub verification_uri: String,

    /// Optional complete URI with the user code pre-filled.
    #[serde(default)]
    pub verification_uri_complete: Option<String>,

    /// Lifetime of the device_code and user_code in seconds.
    pub expires_in: u64,

    /// The minimum polling interval in seconds.
    #[serde(default = "default_interval")]
    pub interval: u64,
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

impl DeviceCodeResponse {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(if self.interval == 0 {
            DEFAULT_INTERVAL_SECS
        } else {
            self.interval
        })
    }

    pub fn expires_after(&self) -> Duration {
        Duration::from_secs(self.expires_in)
    }
}

/// The account a token was issued for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthUser {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub trust_tier: Option<String>,
}

/// A completed login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: AuthUser,
}

/// Registry response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// What one poll of the token endpoint told us.
#[derive(Debug)]
enum PollOutcome {
    Authorized(AuthSession),
    Pending,
    SlowDown,
    Expired,
    Denied,
    Other(String),
}

// ---------------------------------------------------------------------------
// Device code flow
// ---------------------------------------------------------------------------

/// Drives the registry's device authorization flow.
pub struct DeviceCodeFlow {
    /// `<apiUrl>/api/v1`
    base_url: String,
    client: reqwest::Client,
    slow_down_step: Duration,
}

impl DeviceCodeFlow {
    /// Create a flow against the registry at `api_url`.
    pub fn new(api_url: &str) -> Self {
        Self {
            base_url: format!("{}/api/v1", api_url.trim_end_matches('/')),
            client: reqwest::Client::builder()
                .user_agent(concat!("skill-get/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            slow_down_step: SLOW_DOWN_STEP,
        }
    }

    #[cfg(test)]
    fn with_slow_down_step(mut self, step: Duration) -> Self {
        self.slow_down_step = step;
        self
    }

    /// Request a device code from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Network`] on transport failure, or
    /// [`AuthError::FlowFailed`] if the registry returns an error.
    pub async fn request_device_code(&self) -> Result<DeviceCodeResponse> {
        let url = format!("{}/auth/device", self.base_url);
        tracing::debug!(url = %url, "requesting device code");

        let response = self
            .client
            .post(&url)
            .header("X-Client", "skill-get")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let envelope: Envelope<DeviceCodeResponse> =
            serde_json::from_str(&body).map_err(|_| AuthError::FlowFailed {
                reason: format!("unexpected response: HTTP {status}: {body}"),
            })?;

        if !status.is_success() {
            return Err(AuthError::FlowFailed {
                reason: envelope
                    .message
                    .or(envelope.error)
                    .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16())),
            });
        }

        envelope.data.ok_or_else(|| AuthError::FlowFailed {
            reason: "device code response missing data".to_string(),
        })
    }

    /// Poll until the user completes authorization.
    ///
    /// Polls every `interval` (growing on `slow_down`) and gives up once
    /// `timeout` has elapsed.  Transport failures and unrecognised error
    /// codes are logged and polling continues.
    ///
    /// # Errors
    ///
    /// [`AuthError::Expired`] or [`AuthError::Denied`] when the registry ends
    /// the flow, [`AuthError::TimedOut`] when the deadline passes.
    pub async fn poll_for_token(
        &self,
        device_code: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<AuthSession> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut current_interval = interval;

        tracing::debug!(
            interval_ms = current_interval.as_millis() as u64,
            timeout_secs = timeout.as_secs(),
            "polling for device code token"
        );

        loop {
            // Sleep before polling (first poll also waits).
            tokio::time::sleep(current_interval).await;

            if tokio::time::Instant::now() >= deadline {
                return Err(AuthError::TimedOut {
                    timeout_secs: timeout.as_secs(),
                });
            }

            match self.poll_once(device_code).await {
                Ok(PollOutcome::Authorized(session)) => {
                    tracing::info!(username = %session.user.username, "device code flow completed");
                    return Ok(session);
                }
                Ok(PollOutcome::Pending) => {
                    tracing::trace!("authorization pending, will retry");
                }
                Ok(PollOutcome::SlowDown) => {
                    current_interval += self.slow_down_step;
                    tracing::debug!(
                        new_interval_ms = current_interval.as_millis() as u64,
                        "slow_down received, increasing poll interval"
                    );
                }
                Ok(PollOutcome::Expired) => return Err(AuthError::Expired),
                Ok(PollOutcome::Denied) => return Err(AuthError::Denied),
                Ok(PollOutcome::Other(code)) => {
                    tracing::debug!(code = %code, "unexpected poll response, will retry");
                }
                Err(e) => {
                    tracing::debug!(error = %e, "poll request failed, will retry");
                }
            }
        }
    }

    /// Run the whole flow for a code already shown to the user.
    pub async fn wait_for_approval(&self, device: &DeviceCodeResponse) -> Result<AuthSession> {
        self.poll_for_token(
            &device.device_code,
            device.poll_interval(),
            device.expires_after(),
        )
        .await
    }

    async fn poll_once(&self, device_code: &str) -> Result<PollOutcome> {
        let url = format!("{}/auth/device/token", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("X-Client", "skill-get")
            .json(&serde_json::json!({ "device_code": device_code }))
            .send()
            .await?;

        let body = response.text().await?;
        let envelope: Envelope<AuthSession> = serde_json::from_str(&body)?;
        Ok(classify(envelope))
    }
}

fn classify(envelope: Envelope<AuthSession>) -> PollOutcome {
    if let Some(code) = envelope.error {
        return match code.as_str() {
            "authorization_pending" => PollOutcome::Pending,
            "slow_down" => PollOutcome::SlowDown,
            "expired_token" => PollOutcome::Expired,
            "access_denied" => PollOutcome::Denied,
            _ => PollOutcome::Other(code),
        };
    }
    match envelope.data {
        Some(session) => PollOutcome::Authorized(session),
        None => PollOutcome::Other("empty response".to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
