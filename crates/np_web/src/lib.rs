use axum::{
    routing::{get, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/news", get(handlers::search_news))
        .route(
            "/api/session",
            get(handlers::get_session).post(handlers::login).delete(handlers::logout),
        )
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/dashboard/search", axum::routing::post(handlers::search_dashboard))
        .route("/api/payouts", get(handlers::get_payouts))
        .route("/api/analytics/authors", get(handlers::get_author_analytics))
        .route("/api/rates", get(handlers::get_rates))
        .route("/api/rates/:category", put(handlers::update_rate))
        .route("/api/export/:format", get(handlers::export_report))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, addr: SocketAddr) -> np_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}
