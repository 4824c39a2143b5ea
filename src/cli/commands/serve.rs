use crate::server;

pub async fn handle(port: u16) -> anyhow::Result<()> {
    let config = crate::config::config();
    tracing::info!("Starting Census API in {:?} mode", config.environment);

    server::serve(port).await?;
    Ok(())
}
