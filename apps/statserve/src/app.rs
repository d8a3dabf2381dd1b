use crate::config::Config;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub version: &'static str,
    pub config: Config,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: Config) -> SharedState {
        Arc::new(AppState {
            version: env!("CARGO_PKG_VERSION"),
            config,
        })
    }
}
