//! Session lookup boundary.
//!
//! DESIGN
//! ======
//! The core never creates, mutates, or destroys sessions; it only asks the
//! identity backend "is there a current session?". The answer is nullable
//! and the guard consults presence only. [`SessionProvider`] is the seam:
//! the shipped implementation speaks HTTP to `/api/auth/me`, tests plug in
//! programmable mocks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// SESSION
// =============================================================================

/// Externally-owned session handle. Presence of a value is the only
/// property the navigation guard observes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique user identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Errors produced by session lookups.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The `SESSION_API_BASE_URL` environment variable is not set.
    #[error("missing session backend config: env var {var} not set")]
    MissingBaseUrl { var: String },

    /// The HTTP request to the identity backend failed.
    #[error("session request failed: {0}")]
    Request(String),

    /// The identity backend returned an unexpected status.
    #[error("session response error: status {status}")]
    Backend { status: u16 },

    /// The session response body could not be deserialized.
    #[error("session response parse failed: {0}")]
    Parse(String),
}

// =============================================================================
// PROVIDER TRAIT
// =============================================================================

/// Source of the current session, one lookup per navigation attempt.
#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync {
    /// Retrieve the current session, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the backend is unreachable or answers
    /// with something other than a session / a definitive "no session".
    async fn current_session(&self) -> Result<Option<Session>, SessionError>;
}

// =============================================================================
// HTTP PROVIDER
// =============================================================================

const BASE_URL_VAR: &str = "SESSION_API_BASE_URL";
const ME_ENDPOINT: &str = "/api/auth/me";

/// How a `/api/auth/me` status code maps onto the nullable session answer.
#[derive(Debug, PartialEq, Eq)]
enum StatusClass {
    /// 2xx: the body carries the session.
    Authenticated,
    /// 401/403: definitively no session.
    Anonymous,
    /// Anything else: the lookup itself failed.
    Failed,
}

fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Authenticated,
        401 | 403 => StatusClass::Anonymous,
        _ => StatusClass::Failed,
    }
}

/// Session provider backed by the identity backend's `GET /api/auth/me`.
pub struct HttpSessionProvider {
    client: reqwest::Client,
    me_url: String,
}

impl HttpSessionProvider {
    /// Build a provider for the given backend base URL.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError::Request`] if the HTTP client cannot be
    /// constructed.
    pub fn new(base_url: &str) -> Result<Self, SessionError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SessionError::Request(e.to_string()))?;
        Ok(Self { client, me_url: me_url(base_url) })
    }

    /// Build a provider from environment variables.
    ///
    /// - `SESSION_API_BASE_URL`: backend base URL, e.g. `https://loja.example`
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError::MissingBaseUrl`] if the variable is absent.
    pub fn from_env() -> Result<Self, SessionError> {
        let base_url = std::env::var(BASE_URL_VAR)
            .map_err(|_| SessionError::MissingBaseUrl { var: BASE_URL_VAR.to_owned() })?;
        Self::new(&base_url)
    }
}

fn me_url(base_url: &str) -> String {
    format!("{}{ME_ENDPOINT}", base_url.trim_end_matches('/'))
}

#[async_trait::async_trait]
impl SessionProvider for HttpSessionProvider {
    async fn current_session(&self) -> Result<Option<Session>, SessionError> {
        let resp = self
            .client
            .get(&self.me_url)
            .send()
            .await
            .map_err(|e| SessionError::Request(e.to_string()))?;

        let status = resp.status().as_u16();
        match classify_status(status) {
            StatusClass::Authenticated => {
                let session = resp
                    .json::<Session>()
                    .await
                    .map_err(|e| SessionError::Parse(e.to_string()))?;
                Ok(Some(session))
            }
            StatusClass::Anonymous => Ok(None),
            StatusClass::Failed => Err(SessionError::Backend { status }),
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
