use crate::relay::RelayStore;
use crate::services::portmap::PortMapService;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub bind_address: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            log_json: false,
        }
    }
}

impl Config {
    /// Loads defaults overridden by `RELAYMAP_*` environment variables,
    /// e.g. `RELAYMAP_BIND_ADDRESS=127.0.0.1:9000`.
    pub fn load() -> anyhow::Result<Self> {
        let defaults = Config::default();

        let config = config::Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("log_json", defaults.log_json)?
            .add_source(config::Environment::with_prefix("RELAYMAP").try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub relay: Arc<RelayStore>,
    pub portmap_service: PortMapService,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_store(config, Arc::new(RelayStore::new()))
    }

    /// Builds state around an existing store, e.g. one shared with an
    /// in-process forwarding engine.
    pub fn with_store(config: Config, relay: Arc<RelayStore>) -> Self {
        let portmap_service = PortMapService::new(relay.clone());

        Self {
            config,
            relay,
            portmap_service,
        }
    }
}
