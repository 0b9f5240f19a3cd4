use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use teamchat::config::Config;
use teamchat::llm::LangflowClient;
use teamchat::routes;
use teamchat::state::AppState;
use teamchat::{db, llm::LlmGateway};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "-help" || arg == "--help") {
        println!("Usage: teamchat [OPTIONS]");
        println!("Options:");
        println!("  -config <path>  Path to configuration file (default: ./etc/teamchat.toml)");
        println!("  -help, --help   Print this help message");
        return Ok(());
    }

    let config_path = args
        .iter()
        .skip_while(|arg| arg.as_str() != "-config")
        .nth(1)
        .map(|s| s.to_string())
        .unwrap_or_else(|| "./etc/teamchat.toml".to_string());

    // Load configuration first (before logging init)
    let config = Config::load(&config_path).unwrap_or_else(|e| {
        eprintln!("Could not load config file: {}, using defaults", e);
        Config::default()
    });

    // Initialize logging
    // Priority: RUST_LOG env var > config file > default "info"
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    fmt::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    info!("Starting Teamchat server...");
    info!("Loading configuration from: {}", config_path);

    // Initialize database connection
    let db = db::init_database(&config.database).await.map_err(|e| {
        tracing::error!("Database initialization failed: {}", e);
        anyhow::anyhow!("Database initialization failed: {}", e)
    })?;

    // Upstream LLM gateway
    let gateway: Arc<dyn LlmGateway> = Arc::new(LangflowClient::new(
        config.llm.endpoint.clone(),
        config.llm.timeout_secs,
    ));
    info!("LLM gateway configured for {}", config.llm.endpoint);

    // Create application state and router
    let addr_str = config.addr.clone();
    let state = AppState::new(db, config, gateway);
    let app = routes::create_router(state);

    // Parse address
    let addr: SocketAddr = addr_str.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid address '{}', using default 0.0.0.0:4000", addr_str);
        "0.0.0.0:4000".parse().unwrap()
    });

    info!("Server listening on {}", addr);

    // Start server
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
