use dotenvy::dotenv;
use medicart::{
    api::{self, AppState},
    config::{self, database},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = config::load_app_config()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;
    info!("Successfully processed application configuration.");

    // 4. Connect and create tables
    let db = database::create_connection(&app_config.database.url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Serve the API
    api::serve(AppState::new(db, app_config))
        .await
        .inspect_err(|e| error!("Server error: {}", e))
}
