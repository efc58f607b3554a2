//! # lojinha
//!
//! Client-side core of the storefront SPA: the auth-gated navigation guard
//! and the shared shopping-cart store. Rendering components and the session
//! backend are external collaborators; the only network-shaped boundary is
//! the asynchronous "current session" lookup.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`routes`] | Declarative route table and path resolution |
//! | [`guard`] | Navigation guard: proceed/redirect decisions per attempt |
//! | [`session`] | Session lookup boundary and the HTTP-backed provider |
//! | [`cart`] | Shared in-memory cart store (add/update/remove/items) |

pub mod cart;
pub mod guard;
pub mod routes;
pub mod session;

pub use cart::{CartError, CartItem, CartStore};
pub use guard::{Decision, GuardConfig, Navigation, NavigationGuard};
pub use routes::{Route, RouteTable, RouteTarget, View};
pub use session::{HttpSessionProvider, Session, SessionError, SessionProvider};
