use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Medcita";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:4000";
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 3600;
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 3600;

const ENV_BIND_ADDR: &str = "MEDCITA_BIND_ADDR";
const ENV_DB_PATH: &str = "MEDCITA_DB_PATH";
const ENV_JWT_SECRET: &str = "MEDCITA_JWT_SECRET";
const ENV_ACCESS_TTL: &str = "MEDCITA_ACCESS_TOKEN_TTL_SECS";
const ENV_REFRESH_TTL: &str = "MEDCITA_REFRESH_TOKEN_TTL_SECS";
const ENV_LOG: &str = "MEDCITA_LOG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid value: {value}")]
    Invalid { var: &'static str, value: String },
    #[error("Cannot determine home directory; set MEDCITA_DB_PATH")]
    NoHomeDir,
}

/// Get the application data directory
/// ~/Medcita/ on all platforms
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_NAME))
}

/// Default tracing filter when neither `RUST_LOG` nor `MEDCITA_LOG` is set.
pub fn default_log_filter() -> &'static str {
    "info,medcita_lib=debug"
}

/// Filter for the tracing subscriber, installed before [`AppConfig`] loads
/// so configuration warnings are not lost. `RUST_LOG` still wins.
pub fn log_filter_from_env() -> String {
    std::env::var(ENV_LOG)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default_log_filter().to_string())
}

/// Runtime configuration, read once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    pub log_filter: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("db_path", &self.db_path)
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("log_filter", &self.log_filter)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_addr = get(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = match raw_addr.trim().parse() {
            Ok(addr) => addr,
            Err(_) => {
                return Err(ConfigError::Invalid {
                    var: ENV_BIND_ADDR,
                    value: raw_addr,
                })
            }
        };

        let db_path = match get(ENV_DB_PATH) {
            Some(value) => PathBuf::from(value),
            None => app_data_dir()
                .ok_or(ConfigError::NoHomeDir)?
                .join("medcita.db"),
        };

        let jwt_secret = match get(ENV_JWT_SECRET) {
            Some(secret) => secret,
            None => {
                tracing::warn!(
                    "{ENV_JWT_SECRET} not set; using a random secret, tokens will not survive a restart"
                );
                crate::auth::generate_token()
            }
        };

        let access_token_ttl_secs = ttl(get(ENV_ACCESS_TTL), ENV_ACCESS_TTL, DEFAULT_ACCESS_TOKEN_TTL_SECS)?;
        let refresh_token_ttl_secs = ttl(get(ENV_REFRESH_TTL), ENV_REFRESH_TTL, DEFAULT_REFRESH_TOKEN_TTL_SECS)?;

        Ok(Self {
            bind_addr,
            db_path,
            jwt_secret,
            access_token_ttl_secs,
            refresh_token_ttl_secs,
            log_filter: get(ENV_LOG).unwrap_or_else(|| default_log_filter().to_string()),
        })
    }
}

fn ttl(value: Option<String>, var: &'static str, default: i64) -> Result<i64, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::Invalid { var, value: raw }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config_from(&[(ENV_DB_PATH, "/tmp/medcita.db")]).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.access_token_ttl_secs, 3600);
        assert_eq!(config.refresh_token_ttl_secs, 604800);
        assert_eq!(config.log_filter, "info,medcita_lib=debug");
        assert!(!config.jwt_secret.is_empty());
    }

    #[test]
    fn explicit_values_win() {
        let config = config_from(&[
            (ENV_BIND_ADDR, "0.0.0.0:8080"),
            (ENV_DB_PATH, "/data/app.db"),
            (ENV_JWT_SECRET, "s3cret"),
            (ENV_ACCESS_TTL, "60"),
            (ENV_LOG, "debug"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.db_path, PathBuf::from("/data/app.db"));
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.access_token_ttl_secs, 60);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(matches!(
            config_from(&[(ENV_BIND_ADDR, "not-an-addr")]),
            Err(ConfigError::Invalid { var: ENV_BIND_ADDR, .. })
        ));
        assert!(matches!(
            config_from(&[(ENV_DB_PATH, "/tmp/x.db"), (ENV_ACCESS_TTL, "-5")]),
            Err(ConfigError::Invalid { var: ENV_ACCESS_TTL, .. })
        ));
        assert!(matches!(
            config_from(&[(ENV_DB_PATH, "/tmp/x.db"), (ENV_REFRESH_TTL, "soon")]),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn random_secret_differs_per_load() {
        let a = config_from(&[(ENV_DB_PATH, "/tmp/x.db")]).unwrap();
        let b = config_from(&[(ENV_DB_PATH, "/tmp/x.db")]).unwrap();
        assert_ne!(a.jwt_secret, b.jwt_secret);
    }

    #[test]
    fn app_data_dir_under_home() {
        if let (Some(dir), Some(home)) = (app_data_dir(), dirs::home_dir()) {
            assert!(dir.starts_with(home));
            assert!(dir.ends_with("Medcita"));
        }
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
