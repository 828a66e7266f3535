//! Queue worker binary: consumes tailoring jobs from the durable input
//! queue and publishes results. One message in flight at a time; horizontal
//! scaling means running more worker processes, not more in-flight messages.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use llm_service::config::Config;
use llm_service::llm_client::ModelClient;
use llm_service::queue;
use llm_service::tailoring::TailorService;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.rust_log.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "LLM worker starting v{} (model: {})",
        env!("CARGO_PKG_VERSION"),
        config.model
    );

    let client = ModelClient::new(config.client_config());
    let service = TailorService::new(client);

    queue::run(&config.amqp_url, &service).await?;

    Ok(())
}
