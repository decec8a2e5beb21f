use std::sync::Arc;
use tokio::sync::Mutex;
use weatherblock_core::{Config, WeatherService};

/// Server state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Mutated by the credential admin endpoints and persisted back to disk.
    pub config: Arc<Mutex<Config>>,
    pub service: Arc<WeatherService>,
}

impl AppState {
    pub fn new(config: Config, service: WeatherService) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
            service: Arc::new(service),
        }
    }
}
