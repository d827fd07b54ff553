// Engine main entry point
use clap::Parser;
use engine::config::settings::EngineSettings;
use engine::data::market_data::{spawn_market_data_poller, MarketDataStore};
use engine::gateways::{InMemoryPresetStore, PresetGateway, StaticTokenAuth, YahooChartClient};
use engine::services::pricing_service::MyPricingEngine;
use engine::services::PricingEngineServer;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::transport::Server;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "engine")]
#[command(about = "Fuel pricing calculator engine (gRPC)")]
struct Args {
    /// JSON configuration file
    #[arg(long, env = "FUEL_ENGINE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let settings = EngineSettings::load(args.config.as_deref())?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("Starting Fuel Pricing Engine...");
    let addr: SocketAddr = settings.listen_addr().parse()?;
    info!("Engine will listen on {}", addr);

    let auth = StaticTokenAuth::new(settings.auth.tokens.clone());
    if auth.is_empty() {
        warn!("No auth tokens configured; every request will be rejected");
    }

    let presets: Arc<dyn PresetGateway> = match &settings.presets.path {
        Some(path) => Arc::new(InMemoryPresetStore::with_persistence(path).await?),
        None => Arc::new(InMemoryPresetStore::new()),
    };

    let market_data_store = Arc::new(RwLock::new(MarketDataStore::new()));
    let _poller = if settings.market_data.enabled {
        let client = YahooChartClient::new(
            settings.market_data.base_url.clone(),
            settings.market_data.request_timeout(),
        )?;
        info!(
            interval_secs = settings.market_data.refresh_interval_secs,
            "Starting reference price poller"
        );
        Some(spawn_market_data_poller(
            Arc::new(client),
            market_data_store.clone(),
            settings.market_data.refresh_interval(),
        ))
    } else {
        info!("Reference price polling disabled");
        None
    };

    let pricing_engine = MyPricingEngine::new(
        Arc::new(auth),
        presets,
        market_data_store,
        settings.calculator.clone(),
    );

    Server::builder()
        .add_service(PricingEngineServer::new(pricing_engine))
        .serve(addr)
        .await?;

    Ok(())
}
