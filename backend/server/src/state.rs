use std::sync::Arc;

use reqwest::Client;

use super::config::Config;

pub struct AppState {
    pub config: Config,
    pub http: Client,
}

impl AppState {
    /// One shared client across requests, connections get pooled. Every
    /// reconciliation run still re-authenticates and re-fetches the
    /// directory on its own.
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            config,
            http: Client::new(),
        })
    }
}
