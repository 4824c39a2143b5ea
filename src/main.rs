use census_api_rust::{config, server};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Census API in {:?} mode", config.environment);

    // Allow tests or deployments to override port via env
    let port = std::env::var("CENSUS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    if let Err(e) = server::serve(port).await {
        eprintln!("server error: {}", e);
        std::process::exit(1);
    }
}
