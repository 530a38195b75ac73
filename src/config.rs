/// Application configuration
///
/// Loaded once at startup from environment variables, with a `.env` file as
/// optional source. Every knob has a default so the binary runs with zero
/// configuration.
use std::path::PathBuf;
use std::time::Duration;

/// IP restriction mode for the webserver gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpRestrictionMode {
    /// Reject addresses on the blacklist, allow everything else
    Blacklist,
    /// Allow only addresses on the whitelist
    Whitelist,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind host for the webserver
    pub host: String,

    /// Bind port for the webserver
    pub port: u16,

    /// SQLite database file path
    pub database_path: PathBuf,

    /// Time-to-live for cached channel/tag payloads
    pub cache_ttl: Duration,

    /// Interval between background cache reclamation scans
    pub gc_interval: Duration,

    /// IP restriction mode
    pub ip_restriction_mode: IpRestrictionMode,

    /// Rejected addresses in blacklist mode
    pub ip_blacklist: Vec<String>,

    /// Allowed addresses in whitelist mode
    pub ip_whitelist: Vec<String>,

    /// Directory for dated log files
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50000,
            database_path: PathBuf::from("data/ytb_title.db"),
            cache_ttl: Duration::from_secs(600),
            gc_interval: Duration::from_secs(600),
            ip_restriction_mode: IpRestrictionMode::Blacklist,
            ip_blacklist: Vec::new(),
            ip_whitelist: vec!["127.0.0.1".to_string()],
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment (and `.env` when present)
    pub fn load() -> Self {
        dotenv::dotenv().ok();

        let defaults = Self::default();
        Self {
            host: env_string("HOST", &defaults.host),
            port: env_parse("PORT", defaults.port),
            database_path: PathBuf::from(env_string(
                "DATABASE_PATH",
                &defaults.database_path.to_string_lossy(),
            )),
            cache_ttl: Duration::from_secs(env_parse("CACHE_TTL_SECS", 600)),
            gc_interval: Duration::from_secs(env_parse("CACHE_GC_INTERVAL_SECS", 600)),
            ip_restriction_mode: match env_string("IP_RESTRICTION_MODE", "blacklist").as_str() {
                "whitelist" => IpRestrictionMode::Whitelist,
                _ => IpRestrictionMode::Blacklist,
            },
            ip_blacklist: env_list("IP_BLACKLIST"),
            ip_whitelist: {
                let list = env_list("IP_WHITELIST");
                if list.is_empty() {
                    defaults.ip_whitelist.clone()
                } else {
                    list
                }
            },
            log_dir: PathBuf::from(env_string(
                "LOG_DIR",
                &defaults.log_dir.to_string_lossy(),
            )),
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Comma-separated list, empty entries dropped
fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
