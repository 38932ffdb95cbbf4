use std::sync::Arc;

use comanda_api::app::services::AppServices;

#[tokio::main]
async fn main() {
    comanda_observability::init();

    let billing_url = std::env::var("BILLING_API_URL").unwrap_or_else(|_| {
        tracing::warn!("BILLING_API_URL not set; using local dev default");
        "http://127.0.0.1:3000/api".to_string()
    });

    let services = Arc::new(AppServices::from_url(&billing_url));
    let app = comanda_api::app::build_app(services);

    let addr =
        std::env::var("COMANDA_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
