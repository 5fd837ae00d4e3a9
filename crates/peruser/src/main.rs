use anyhow::{Context, Result};
use peruser::{Server, ServerConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const CONFIG_ENV: &str = "PERUSER_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // First argument wins over the environment; neither means defaults.
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok());

    let config = match &config_path {
        Some(path) => ServerConfig::load(path).with_context(|| format!("loading {path}"))?,
        None => ServerConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log filter")?;
    fmt().with_env_filter(filter).init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = config_path.as_deref().unwrap_or("<defaults>"),
        "starting peruser"
    );

    let server = Server::build(config).await.context("startup failed")?;
    server.run().await?;
    Ok(())
}
