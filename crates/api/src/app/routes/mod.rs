use axum::Router;

pub mod billing;
pub mod config;
pub mod system;

/// All domain routers, mounted by area.
pub fn router() -> Router {
    Router::new()
        .nest("/billing", billing::router())
        .nest("/config", config::router())
}
