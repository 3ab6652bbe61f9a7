use dotenvy::dotenv;
use links_menu_bot::bot::runner::run_bot;
use links_menu_bot::config::Settings;
use links_menu_bot::logging::{init_logging, RedactionPatterns};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Initialize redaction patterns early (before logging)
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);

    init_logging(patterns);

    info!("Starting links menu bot...");

    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_bot(settings).await {
        error!("Bot terminated with error: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

/// Read settings from the environment and report what the bot will offer
fn load_settings() -> Result<Arc<Settings>, config::ConfigError> {
    let settings = Settings::new()?;
    info!(
        language = ?settings.bot_language,
        ai_support = settings.ai_enabled(),
        custom_links = settings.social_links.is_some(),
        "Configuration loaded."
    );
    Ok(Arc::new(settings))
}
