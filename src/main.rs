// SPDX-License-Identifier: MIT

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use polyglot_server::{
    api::router,
    config::AppConfig,
    identity::IdentityClient,
    state::{AppState, AuthConfig},
    storage::SocialDb,
};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AppConfig::from_env().expect("failed to load configuration");

    let db = SocialDb::open(&config.data_dir.join("polyglot.redb"))
        .expect("failed to open the embedded database");

    let identity = if IdentityClient::is_configured() {
        Some(IdentityClient::from_env().expect("failed to build identity-sync client"))
    } else {
        info!("CHAT_API_URL/CHAT_API_KEY not set, chat identity sync disabled");
        None
    };

    let state = AppState::new(
        db,
        identity,
        AuthConfig {
            jwt_secret: config.jwt_secret.clone(),
            secure_cookies: config.secure_cookies,
        },
    );
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("failed to parse bind address");

    info!("Polyglot server listening on http://{addr} (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    info!("shutdown signal received");
}
