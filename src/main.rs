use std::sync::Arc;

use ytb_title::cache::LocalCache;
use ytb_title::config::AppConfig;
use ytb_title::database::Database;
use ytb_title::logger::{self, LogTag};
use ytb_title::webserver::{self, state::AppState};

#[tokio::main]
async fn main() {
    let config = AppConfig::load();

    if let Err(e) = logger::init(&config.log_dir) {
        eprintln!("failed to initialize logger: {}", e);
        std::process::exit(1);
    }

    logger::info(
        LogTag::System,
        &format!("starting up, database at {}", config.database_path.display()),
    );

    let db = match Database::open(&config.database_path) {
        Ok(db) => db,
        Err(e) => {
            logger::error(LogTag::System, &format!("failed to open database: {}", e));
            std::process::exit(1);
        }
    };

    let cache = LocalCache::new(config.gc_interval);
    let state = Arc::new(AppState::new(config, db, cache));

    if let Err(e) = webserver::start_server(state).await {
        logger::error(LogTag::System, &format!("webserver failed: {}", e));
        std::process::exit(1);
    }
}
