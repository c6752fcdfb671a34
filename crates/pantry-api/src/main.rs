use pantry_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (stores, channel, routes)
    let (state, router) = pantry_api::setup::initialize_app(config.clone()).await?;

    // Start the server; returns after graceful shutdown
    pantry_api::setup::server::start_server(&config, router).await?;

    pantry_api::setup::server::shutdown_state(&state).await;

    Ok(())
}
