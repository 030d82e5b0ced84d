use domain::memory::{InMemoryConversations, InMemoryMessages};
use log::*;
use service::{config::Config, logging::Logger};
use std::sync::Arc;
use web::AppState;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
    }

    info!("Starting up chat hub in {} mode...", config.runtime_env());

    let conversations = Arc::new(InMemoryConversations::new());
    if let Some(seed_file) = config.seed_file() {
        if let Err(e) = domain::seed::load_file(seed_file, &conversations).await {
            error!("Failed to load seed file {}: {e}", seed_file.display());
            std::process::exit(1);
        }
    } else {
        warn!("No seed file configured; no conversations exist until one is loaded");
    }

    let app_state = match AppState::from_config(
        config,
        conversations,
        Arc::new(InMemoryMessages::new()),
    ) {
        Ok(app_state) => app_state,
        Err(e) => {
            error!("Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = web::init_server(app_state).await {
        error!("Server exited with error: {e}");
        std::process::exit(1);
    }
}
