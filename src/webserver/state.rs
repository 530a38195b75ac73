/// Shared application state for the webserver
///
/// Constructed once at startup and passed to every route handler; holds the
/// database handle, the local cache and the configuration.
use std::sync::Arc;

use crate::cache::LocalCache;
use crate::config::AppConfig;
use crate::database::Database;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Database,
    pub cache: LocalCache,
}

impl AppState {
    pub fn new(config: AppConfig, db: Database, cache: LocalCache) -> Self {
        Self {
            config: Arc::new(config),
            db,
            cache,
        }
    }
}
