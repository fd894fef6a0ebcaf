//! Shared test infrastructure.
//!
//! Builds the same actix `App` the server binary runs (session
//! middleware, route guard, seeded directory) entirely in memory, and
//! provides sign-in helpers that drive the real login flow (CSRF token,
//! form post, session cookie capture).

use std::sync::OnceLock;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::BoxBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, Error, middleware, test, web};

use payng::auth::cache::AbilityCache;
use payng::auth::password;
use payng::auth::rate_limit::RateLimiter;
use payng::directory::Directory;
use payng::{auth, routes};

// ============================================================================
// DEMO ACCOUNTS
// ============================================================================

pub const DEMO_PASSWORD: &str = "payng123";

pub const PARENT_EMAIL: &str = "parent@demo.payng.app";
pub const GUARDIAN_EMAIL: &str = "guardian@demo.payng.app";
pub const STUDENT_EMAIL: &str = "student@demo.payng.app";
pub const INSTITUTION_ADMIN_EMAIL: &str = "admin@harmony.payng.app";
pub const SUPER_ADMIN_EMAIL: &str = "root@payng.app";
pub const SUPPORT_EMAIL: &str = "support@payng.app";
pub const SUPPORT_LEAD_EMAIL: &str = "support.lead@payng.app";
pub const FINANCE_EMAIL: &str = "finance@payng.app";
pub const MERCHANT_EMAIL: &str = "merchant@payng.app";

/// The application as the test harness sees it: every response body boxed
/// so the service type is nameable across helpers.
pub trait TestApp: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {}
impl<S> TestApp for S where S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {}

/// One argon2 hash for the whole test binary; hashing is deliberately slow.
fn demo_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| password::hash_password(DEMO_PASSWORD).expect("Failed to hash demo password"))
}

// ============================================================================
// APP SETUP
// ============================================================================

/// Build the full application as the server binary wires it.
pub async fn init_app() -> impl TestApp {
    let directory = web::Data::new(Directory::seed(demo_hash()));
    let abilities = web::Data::new(AbilityCache::new());
    let limiter = web::Data::new(RateLimiter::new());

    let session_mw = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

    test::init_service(
        App::new()
            .wrap(middleware::from_fn(auth::middleware::route_guard))
            .wrap(session_mw)
            .app_data(directory)
            .app_data(abilities)
            .app_data(limiter)
            .configure(routes::configure)
            // Outermost: normalize every body type for the helpers above.
            .wrap_fn(|req, srv| {
                let fut = srv.call(req);
                async move { fut.await.map(|res| res.map_into_boxed_body()) }
            }),
    )
    .await
}

// ============================================================================
// SESSION HELPERS
// ============================================================================

/// Cookies and CSRF token for a signed-in (or anonymous) browser session.
pub struct TestSession {
    pub cookies: Vec<Cookie<'static>>,
    pub csrf_token: String,
}

impl TestSession {
    /// Attach the session cookies to a request.
    pub fn apply(&self, mut req: test::TestRequest) -> test::TestRequest {
        for cookie in &self.cookies {
            req = req.cookie(cookie.clone());
        }
        req
    }

    /// Attach cookies plus the CSRF header used by mutating endpoints.
    pub fn apply_mutating(&self, req: test::TestRequest) -> test::TestRequest {
        self.apply(req)
            .insert_header(("X-CSRF-Token", self.csrf_token.clone()))
    }

    /// Fold a response's `Set-Cookie` headers into the jar.
    pub fn absorb_cookies(&mut self, resp: &ServiceResponse<BoxBody>) {
        for cookie in resp.response().cookies() {
            let cookie = cookie.into_owned();
            self.cookies.retain(|existing| existing.name() != cookie.name());
            self.cookies.push(cookie);
        }
    }
}

/// Fetch the login page for an anonymous session: CSRF token + cookie.
pub async fn anonymous_session(app: &impl TestApp) -> TestSession {
    let resp = test::call_service(app, test::TestRequest::get().uri("/login").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let mut session = TestSession { cookies: Vec::new(), csrf_token: String::new() };
    session.absorb_cookies(&resp);

    let body: serde_json::Value = test::read_body_json(resp).await;
    session.csrf_token = body["csrf_token"]
        .as_str()
        .expect("login page returns a csrf token")
        .to_string();
    session
}

/// Drive the real login flow for a demo account.
pub async fn sign_in(app: &impl TestApp, email: &str) -> TestSession {
    let mut session = anonymous_session(app).await;

    let form = [
        ("email", email),
        ("password", DEMO_PASSWORD),
        ("csrf_token", session.csrf_token.as_str()),
    ];
    let req = session
        .apply(test::TestRequest::post().uri("/login"))
        .set_form(form)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER, "login for {email} should redirect");
    session.absorb_cookies(&resp);
    session
}

/// GET a path with the session attached and parse the JSON body.
pub async fn get_json(app: &impl TestApp, session: &TestSession, path: &str) -> serde_json::Value {
    let req = session.apply(test::TestRequest::get().uri(path)).to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
    test::read_body_json(resp).await
}

/// Location header of a redirect response.
pub fn location(resp: &ServiceResponse<BoxBody>) -> &str {
    resp.headers()
        .get("Location")
        .and_then(|value| value.to_str().ok())
        .expect("redirect carries a Location header")
}
