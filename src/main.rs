use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use payng::auth::cache::AbilityCache;
use payng::auth::rate_limit::RateLimiter;
use payng::auth::{self, password};
use payng::directory::Directory;
use payng::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Seed the demo directory; every demo account shares one password.
    let demo_password = std::env::var("DEMO_PASSWORD").unwrap_or_else(|_| "payng123".to_string());
    let demo_hash = password::hash_password(&demo_password)
        .expect("Failed to hash demo password");
    let directory = web::Data::new(Directory::seed(&demo_hash));

    // Session encryption key — load from SESSION_KEY env var for persistent sessions across restarts
    let secret_key = match std::env::var("SESSION_KEY") {
        Ok(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Ok(val) => {
            log::warn!(
                "SESSION_KEY too short ({} bytes, need 64+) — generating random key",
                val.len()
            );
            Key::generate()
        }
        Err(_) => {
            log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let abilities = web::Data::new(AbilityCache::new());
    let limiter = web::Data::new(RateLimiter::new());

    log::info!("Starting server at http://127.0.0.1:8080");

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            // Route guard runs inside the session middleware so the role is
            // resolved before any decision is made.
            .wrap(middleware::from_fn(auth::middleware::route_guard))
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(directory.clone())
            .app_data(abilities.clone())
            .app_data(limiter.clone())
            .configure(routes::configure)
    })
    .bind("127.0.0.1:8080")?
    .run()
    .await
}
