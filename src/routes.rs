//! Route table and path resolution.
//!
//! DESIGN
//! ======
//! Routes are declared once at application start and never mutated. A route
//! either names a view (with an auth flag consulted by the guard) or is a
//! bare redirect alias, which is how the storefront maps `/` onto `/login`.
//! Resolution is pure string matching; session state is the guard's concern.

/// Path of the login view; unauthenticated navigations redirect here.
pub const LOGIN_PATH: &str = "/login";

/// Path of the authenticated landing view.
pub const LANDING_PATH: &str = "/InicioApp";

// =============================================================================
// VIEWS
// =============================================================================

/// Identifier of a renderable view. Opaque to the guard beyond identity;
/// the rendering layer maps each variant to an actual component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    /// Login form.
    Login,
    /// Authenticated landing page.
    Inicio,
    /// Product listing.
    ProdutosLista,
    /// Shopping cart.
    Carrinho,
    /// Order history for the current client.
    ClientePedidos,
}

// =============================================================================
// ROUTES
// =============================================================================

/// What a matched path leads to: a view, or another path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteTarget {
    /// A renderable view, gated by `requires_auth`.
    View {
        view: View,
        requires_auth: bool,
    },
    /// An alias that immediately redirects to another declared path.
    Redirect { to: &'static str },
}

/// A single path-to-target mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub target: RouteTarget,
}

/// Ordered, immutable route list. First match wins on path equality.
#[derive(Clone, Debug)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build a table from an ordered route list.
    #[must_use]
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The canonical storefront table: `/` aliases the login page, every
    /// view past login requires an authenticated session.
    #[must_use]
    pub fn canonical() -> Self {
        Self::new(vec![
            Route { path: "/", target: RouteTarget::Redirect { to: LOGIN_PATH } },
            Route {
                path: LOGIN_PATH,
                target: RouteTarget::View { view: View::Login, requires_auth: false },
            },
            Route {
                path: LANDING_PATH,
                target: RouteTarget::View { view: View::Inicio, requires_auth: true },
            },
            Route {
                path: "/produtos/lista",
                target: RouteTarget::View { view: View::ProdutosLista, requires_auth: true },
            },
            Route {
                path: "/carrinho",
                target: RouteTarget::View { view: View::Carrinho, requires_auth: true },
            },
            Route {
                path: "/clientePedidos",
                target: RouteTarget::View { view: View::ClientePedidos, requires_auth: true },
            },
        ])
    }

    /// Resolve a path by exact match, in declaration order.
    ///
    /// `None` is the explicit not-found outcome; there is no fallthrough.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.path == path)
    }

    /// All declared routes, in declaration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
