use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use comci_gateway::clock::SystemClock;
use comci_gateway::config::{GatewayConfig, ProviderSource};
use comci_gateway::gateway::Gateway;
use comci_gateway::provider::{FixtureProvider, RemoteConfig, RemoteProvider, TimetableProvider};
use comci_gateway::web::{AppState, create_router, enabled_endpoints};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::from_env()?;
    let provider = build_provider(&config)?;

    let gateway = Gateway::new(provider, Arc::new(SystemClock), &config);
    let state = AppState::new(gateway, config.endpoints);
    let endpoints = enabled_endpoints(&state);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    info!(addr = %listener.local_addr()?, host = %config.host, "comci-api listening");
    info!(
        endpoints = %endpoints.join(" "),
        timeout = ?config.provider_timeout,
        key_tolerance = ?config.key_tolerance,
        weekend_short_circuit = config.weekend_short_circuit,
        "gateway configured"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn build_provider(
    config: &GatewayConfig,
) -> Result<Arc<dyn TimetableProvider>, Box<dyn std::error::Error>> {
    let provider: Arc<dyn TimetableProvider> = match config.require_provider()? {
        ProviderSource::Remote(url) => {
            let remote = RemoteProvider::new(
                RemoteConfig::new(url.as_str()).with_timeout(config.provider_timeout_secs()),
            )?;
            info!(base_url = remote.base_url(), "using remote provider");
            Arc::new(remote)
        }
        ProviderSource::Fixture(path) => {
            let fixture = FixtureProvider::load(path)?;
            info!(
                path = %path.display(),
                schools = fixture.school_count(),
                "using fixture provider"
            );
            Arc::new(fixture)
        }
    };
    Ok(provider)
}
