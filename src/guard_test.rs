use std::collections::VecDeque;
use std::sync::Mutex;

use uuid::Uuid;

use super::*;
use crate::session::SessionError;

// =============================================================
// Mock provider
// =============================================================

#[derive(Clone, Copy)]
enum MockReply {
    Authenticated,
    Anonymous,
    Fail,
}

struct MockProvider {
    reply: MockReply,
    /// Per-call delays, consumed front to back; empty means no delay.
    delays: Mutex<VecDeque<Duration>>,
    calls: AtomicU64,
}

impl MockProvider {
    fn new(reply: MockReply) -> Arc<Self> {
        Self::with_delays(reply, [])
    }

    fn with_delays(reply: MockReply, delays: impl IntoIterator<Item = Duration>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delays: Mutex::new(delays.into_iter().collect()),
            calls: AtomicU64::new(0),
        })
    }

    fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SessionProvider for MockProvider {
    async fn current_session(&self) -> Result<Option<Session>, SessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.reply {
            MockReply::Authenticated => Ok(Some(Session { id: Uuid::new_v4(), name: "Ana".into() })),
            MockReply::Anonymous => Ok(None),
            MockReply::Fail => Err(SessionError::Backend { status: 503 }),
        }
    }
}

fn guard_with(provider: Arc<MockProvider>) -> NavigationGuard {
    NavigationGuard::with_config(
        RouteTable::canonical(),
        provider,
        GuardConfig { lookup_timeout: Duration::from_millis(100) },
    )
}

fn route(guard: &NavigationGuard, path: &str) -> Route {
    *guard.table().resolve(path).expect("declared path should resolve")
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

// =============================================================
// Guard decisions
// =============================================================

#[tokio::test]
async fn auth_routes_redirect_to_login_without_session() {
    let guard = guard_with(MockProvider::new(MockReply::Anonymous));
    for path in [LANDING_PATH, "/produtos/lista", "/carrinho", "/clientePedidos"] {
        let decision = guard.guard(&route(&guard, path), None).await;
        assert_eq!(decision, Decision::Redirect(LOGIN_PATH.to_owned()), "path {path}");
    }
}

#[tokio::test]
async fn auth_routes_proceed_with_session() {
    let guard = guard_with(MockProvider::new(MockReply::Authenticated));
    for path in [LANDING_PATH, "/produtos/lista", "/carrinho", "/clientePedidos"] {
        let decision = guard.guard(&route(&guard, path), Some(LOGIN_PATH)).await;
        assert_eq!(decision, Decision::Proceed, "path {path}");
    }
}

#[tokio::test]
async fn login_proceeds_without_session() {
    let guard = guard_with(MockProvider::new(MockReply::Anonymous));
    let decision = guard.guard(&route(&guard, LOGIN_PATH), None).await;
    assert_eq!(decision, Decision::Proceed);
}

#[tokio::test]
async fn login_with_session_redirects_to_landing() {
    let guard = guard_with(MockProvider::new(MockReply::Authenticated));
    let decision = guard.guard(&route(&guard, LOGIN_PATH), None).await;
    assert_eq!(decision, Decision::Redirect(LANDING_PATH.to_owned()));
}

#[tokio::test]
async fn root_alias_decides_without_session_lookup() {
    let provider = MockProvider::new(MockReply::Authenticated);
    let guard = guard_with(provider.clone());
    let decision = guard.guard(&route(&guard, "/"), None).await;
    assert_eq!(decision, Decision::Redirect(LOGIN_PATH.to_owned()));
    assert_eq!(provider.calls(), 0);
}

// =============================================================
// Fail-closed degradation
// =============================================================

#[tokio::test]
async fn lookup_failure_fails_closed_on_auth_routes() {
    let guard = guard_with(MockProvider::new(MockReply::Fail));
    let decision = guard.guard(&route(&guard, "/carrinho"), None).await;
    assert_eq!(decision, Decision::Redirect(LOGIN_PATH.to_owned()));
}

#[tokio::test]
async fn lookup_failure_still_allows_login() {
    let guard = guard_with(MockProvider::new(MockReply::Fail));
    let decision = guard.guard(&route(&guard, LOGIN_PATH), None).await;
    assert_eq!(decision, Decision::Proceed);
}

#[tokio::test(start_paused = true)]
async fn lookup_timeout_fails_closed() {
    let provider = MockProvider::with_delays(MockReply::Authenticated, [ms(10_000)]);
    let guard = guard_with(provider);
    let decision = guard.guard(&route(&guard, "/carrinho"), None).await;
    assert_eq!(decision, Decision::Redirect(LOGIN_PATH.to_owned()));
}

// =============================================================
// Supersession
// =============================================================

#[tokio::test(start_paused = true)]
async fn slow_evaluation_overtaken_by_newer_attempt_is_superseded() {
    let provider = MockProvider::with_delays(MockReply::Authenticated, [ms(50), ms(0)]);
    let guard = guard_with(provider);
    let carrinho = route(&guard, "/carrinho");

    let (first, second) = tokio::join!(guard.guard(&carrinho, None), async {
        // Start the second attempt while the first is suspended on its lookup.
        tokio::time::sleep(ms(10)).await;
        guard.guard(&carrinho, None).await
    });

    assert_eq!(first, Decision::Superseded);
    assert_eq!(second, Decision::Proceed);
}

#[tokio::test]
async fn sequential_attempts_are_not_superseded() {
    let guard = guard_with(MockProvider::new(MockReply::Authenticated));
    let carrinho = route(&guard, "/carrinho");
    assert_eq!(guard.guard(&carrinho, None).await, Decision::Proceed);
    assert_eq!(guard.guard(&carrinho, None).await, Decision::Proceed);
}

// =============================================================
// Full navigation
// =============================================================

#[tokio::test]
async fn navigate_root_unauthenticated_lands_on_login() {
    let guard = guard_with(MockProvider::new(MockReply::Anonymous));
    let nav = guard.navigate("/", None).await;
    assert_eq!(nav, Navigation::Rendered { view: View::Login, path: LOGIN_PATH.to_owned() });
}

#[tokio::test]
async fn navigate_root_authenticated_lands_on_inicio() {
    let guard = guard_with(MockProvider::new(MockReply::Authenticated));
    let nav = guard.navigate("/", None).await;
    assert_eq!(nav, Navigation::Rendered { view: View::Inicio, path: LANDING_PATH.to_owned() });
}

#[tokio::test]
async fn navigate_auth_view_with_session() {
    let provider = MockProvider::new(MockReply::Authenticated);
    let guard = guard_with(provider.clone());
    let nav = guard.navigate("/carrinho", Some("/produtos/lista")).await;
    assert_eq!(nav, Navigation::Rendered { view: View::Carrinho, path: "/carrinho".to_owned() });
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn navigate_unknown_path_is_not_found() {
    let guard = guard_with(MockProvider::new(MockReply::Authenticated));
    let nav = guard.navigate("/checkout", None).await;
    assert_eq!(nav, Navigation::NotFound { path: "/checkout".to_owned() });
}

#[tokio::test]
async fn navigate_bails_out_of_alias_cycles() {
    let table = RouteTable::new(vec![
        Route { path: "/a", target: RouteTarget::Redirect { to: "/b" } },
        Route { path: "/b", target: RouteTarget::Redirect { to: "/a" } },
    ]);
    let guard = NavigationGuard::with_config(
        table,
        MockProvider::new(MockReply::Anonymous),
        GuardConfig { lookup_timeout: ms(100) },
    );
    assert!(matches!(guard.navigate("/a", None).await, Navigation::NotFound { .. }));
}

// =============================================================
// Config
// =============================================================

#[test]
fn default_config_uses_five_second_timeout() {
    // SESSION_LOOKUP_TIMEOUT_MS is not set in the test environment.
    let config = GuardConfig::from_env();
    assert_eq!(config.lookup_timeout, Duration::from_millis(DEFAULT_LOOKUP_TIMEOUT_MS));
}
