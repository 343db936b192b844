use project_advisor::config::AdvisorConfig;
use project_advisor::error::Result;
use project_advisor::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AdvisorConfig::from_env()?;

    eprintln!("🧭 Project Advisor v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Recommendation API: {}", config.client.endpoint);
    eprintln!("   Max questions: {}", config.conversation.max_steps);
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!("   Wizard API: http://0.0.0.0:{}/api/advisor/state", config.port);

    server::run(config).await?;
    Ok(())
}
