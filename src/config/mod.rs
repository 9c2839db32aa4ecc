use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the server and the terminal client
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// SQLite connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    /// Port the REST API listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL the terminal client talks to
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,

    /// Whether the request routes demand a bearer session token
    #[serde(default = "default_require_session")]
    pub require_session: bool,
}

fn default_database_url() -> String {
    "sqlite://ti_services.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_port() -> u16 {
    4000
}

fn default_api_url() -> String {
    "http://localhost:4000".to_string()
}

fn default_session_ttl_hours() -> i64 {
    8
}

fn default_require_session() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            database_max_connections: default_max_connections(),
            port: default_port(),
            api_url: default_api_url(),
            session_ttl_hours: default_session_ttl_hours(),
            require_session: default_require_session(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables from a `.env` file are loaded first when the file exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Configuration backed by a private in-memory database
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            ..Self::default()
        }
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    let config = Config::load()?;

    tracing::debug!(database_url = %config.database_url, port = config.port, "configuration loaded");

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.port, 4000);
        assert_eq!(config.api_url, "http://localhost:4000");
        assert_eq!(config.session_ttl(), chrono::Duration::hours(8));
        assert!(config.require_session);
    }

    #[test]
    fn deserializes_from_partial_environment() {
        let vars = vec![
            ("PORT".to_string(), "8081".to_string()),
            ("REQUIRE_SESSION".to_string(), "false".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.port, 8081);
        assert!(!config.require_session);
        assert_eq!(config.database_url(), "sqlite://ti_services.db");
    }

    #[test]
    fn in_memory_uses_single_connection() {
        let config = Config::in_memory();
        assert_eq!(config.database_url(), "sqlite::memory:");
        assert_eq!(config.database_max_connections, 1);
    }
}
