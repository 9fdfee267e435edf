use axum::{
    routing::{get, post},
    Router,
};
use grither_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware, routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    if config.session_secret_is_dev_default() {
        tracing::warn!(
            "SESSION_SECRET is not set; session tokens are signed with the development-only default. Never run a trusted deployment this way."
        );
    }

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    match &config.app_url {
        Some(app_url) => {
            let target = format!("{}/tg/{}", app_url, config.webhook_secret);
            if let Err(e) = app_state.bot_api.ensure_webhook(&target).await {
                tracing::warn!("Could not check Telegram webhook status: {:?}", e);
            }
        }
        None => info!("APP_URL is not set yet; skipping Telegram webhook registration"),
    }

    let public_api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/health", get(routes::health::health))
        .route("/api/twa/auth", post(routes::auth::twa_auth))
        .route("/api/twa/seen", post(routes::logs::twa_seen))
        .route("/api/logs", post(routes::logs::ingest_log))
        .route("/api/content/:slug", get(routes::content::get_content))
        .route(
            "/tg/:secret",
            get(routes::telegram::webhook_probe).post(routes::telegram::handle_webhook),
        );

    let session_api = Router::new()
        .route("/api/whoami", get(routes::auth::whoami))
        .route("/api/messages/send", post(routes::messages::send_message))
        .route("/api/messages/inbox", get(routes::messages::inbox))
        .layer(axum::middleware::from_fn(
            middleware::auth::require_session,
        ));

    let app = public_api
        .merge(session_api)
        .with_state(app_state)
        .layer(middleware::cors::frontend_cors(&config.frontend_origins))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
