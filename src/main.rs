use finsight_api::config;
use finsight_api::handlers;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = config::config();
    tracing::info!("Starting Finsight API in {:?} mode", config.environment);

    tracing_subscriber::fmt::init();

    let app = handlers::app();

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("Finsight API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
