//! Navigation guard.
//!
//! DESIGN
//! ======
//! Every guarded navigation attempt pays exactly one session lookup (alias
//! routes decide without one). The lookup is bounded by a timeout and any
//! failure degrades to "no session", so a broken identity backend can never
//! open an authenticated view. Attempts are numbered by an epoch counter;
//! an evaluation that resumes after a newer attempt has started reports
//! [`Decision::Superseded`] instead of committing a stale decision.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::routes::{LANDING_PATH, LOGIN_PATH, Route, RouteTable, RouteTarget, View};
use crate::session::{Session, SessionProvider};

const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5_000;
const MAX_REDIRECT_HOPS: usize = 8;

// =============================================================================
// CONFIG
// =============================================================================

/// Guard tuning, read from the environment.
#[derive(Clone, Copy, Debug)]
pub struct GuardConfig {
    /// Upper bound on a single session lookup; hitting it fails closed.
    pub lookup_timeout: Duration,
}

impl GuardConfig {
    /// Build a config from environment variables.
    ///
    /// - `SESSION_LOOKUP_TIMEOUT_MS`: lookup timeout in milliseconds
    ///   (default 5000)
    #[must_use]
    pub fn from_env() -> Self {
        let timeout_ms = env_parse("SESSION_LOOKUP_TIMEOUT_MS", DEFAULT_LOOKUP_TIMEOUT_MS);
        Self { lookup_timeout: Duration::from_millis(timeout_ms) }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// DECISIONS
// =============================================================================

/// Outcome of guarding a single navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The transition may commit.
    Proceed,
    /// The transition must land on the given path instead.
    Redirect(String),
    /// A newer navigation attempt started while this one was suspended on
    /// the session lookup; discard this evaluation.
    Superseded,
}

/// Outcome of a full navigation: resolution plus guarding, redirects
/// followed to their final view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The view to render, and the path it was reached at.
    Rendered { view: View, path: String },
    /// No declared route matched.
    NotFound { path: String },
    /// The attempt was overtaken by a newer one.
    Superseded,
}

// =============================================================================
// GUARD
// =============================================================================

/// Decides whether navigation attempts proceed or redirect, consulting the
/// session backend once per guarded attempt.
pub struct NavigationGuard {
    table: RouteTable,
    provider: Arc<dyn SessionProvider>,
    config: GuardConfig,
    epoch: AtomicU64,
}

impl NavigationGuard {
    /// Build a guard with config read from the environment.
    #[must_use]
    pub fn new(table: RouteTable, provider: Arc<dyn SessionProvider>) -> Self {
        Self::with_config(table, provider, GuardConfig::from_env())
    }

    /// Build a guard with an explicit config.
    #[must_use]
    pub fn with_config(table: RouteTable, provider: Arc<dyn SessionProvider>, config: GuardConfig) -> Self {
        Self { table, provider, config, epoch: AtomicU64::new(0) }
    }

    /// The route table this guard serves.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Guard one navigation attempt onto `target`, coming from `from`.
    pub async fn guard(&self, target: &Route, from: Option<&str>) -> Decision {
        let attempt = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let requires_auth = match target.target {
            // Alias routes decide without consulting the session.
            RouteTarget::Redirect { to } => {
                tracing::debug!(path = target.path, from = from.unwrap_or("-"), to, "redirect alias");
                return Decision::Redirect(to.to_owned());
            }
            RouteTarget::View { requires_auth, .. } => requires_auth,
        };

        let session = self.lookup_session().await;

        if self.epoch.load(Ordering::SeqCst) != attempt {
            tracing::debug!(path = target.path, "navigation superseded");
            return Decision::Superseded;
        }

        let decision = decide(target.path, requires_auth, session.is_some());
        tracing::debug!(path = target.path, from = from.unwrap_or("-"), ?decision, "navigation guarded");
        decision
    }

    /// Resolve `path` and guard it, following redirect decisions to the
    /// final view. Unmatched paths surface as [`Navigation::NotFound`].
    pub async fn navigate(&self, path: &str, from: Option<&str>) -> Navigation {
        let mut path = path.to_owned();
        for _ in 0..MAX_REDIRECT_HOPS {
            let Some(route) = self.table.resolve(&path) else {
                tracing::debug!(%path, "route not found");
                return Navigation::NotFound { path };
            };
            let route = *route;

            match self.guard(&route, from).await {
                Decision::Superseded => return Navigation::Superseded,
                Decision::Redirect(to) => path = to,
                Decision::Proceed => match route.target {
                    RouteTarget::View { view, .. } => return Navigation::Rendered { view, path },
                    RouteTarget::Redirect { to } => path = to.to_owned(),
                },
            }
        }
        // Unreachable with the canonical table; only a miswired custom
        // table can cycle.
        tracing::error!(%path, "redirect limit exceeded");
        Navigation::NotFound { path }
    }

    /// Fetch the current session, bounded by the configured timeout.
    /// Lookup errors and timeouts are treated as "no session".
    async fn lookup_session(&self) -> Option<Session> {
        match tokio::time::timeout(self.config.lookup_timeout, self.provider.current_session()).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "session lookup failed; treating as unauthenticated");
                None
            }
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.config.lookup_timeout,
                    "session lookup timed out; treating as unauthenticated"
                );
                None
            }
        }
    }
}

/// Pure decision kernel: auth-gated views bounce unauthenticated visitors
/// to login; authenticated visitors never land back on the login form.
fn decide(path: &str, requires_auth: bool, authenticated: bool) -> Decision {
    if requires_auth && !authenticated {
        return Decision::Redirect(LOGIN_PATH.to_owned());
    }
    if path == LOGIN_PATH && authenticated {
        return Decision::Redirect(LANDING_PATH.to_owned());
    }
    Decision::Proceed
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
