use std::time::Duration;

use secrecy::{Secret, SecretString};

/// Application configuration loaded from environment variables (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `postgres://..` or `sqlite:..`. May carry a password.
    pub database_url: Secret<String>,
    pub db_max_connections: u32,
    /// Raw comma-separated `YOUTUBE_API_KEYS`. Parsed by `KeyRotator::from_csv`.
    pub youtube_api_keys: SecretString,
    pub search_query: String,
    pub youtube_api_base_url: String,
    pub youtube_timeout: Duration,
    pub fetch_interval: Duration,
    pub ingestion_enabled: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = match var("DATABASE_URL") {
            Some(url) => url,
            None => postgres_url_from_parts(&var)?,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&var, "PORT", 8000)?,
            database_url: Secret::new(database_url),
            db_max_connections: parse(&var, "DB_MAX_CONNECTIONS", 10)?,
            youtube_api_keys: SecretString::new(var("YOUTUBE_API_KEYS").unwrap_or_default()),
            search_query: var("SEARCH_QUERY").unwrap_or_else(|| "cricket".to_string()),
            youtube_api_base_url: var("YOUTUBE_API_BASE_URL")
                .unwrap_or_else(|| "https://www.googleapis.com/youtube/v3".to_string()),
            youtube_timeout: Duration::from_secs(parse(&var, "YOUTUBE_TIMEOUT_SECS", 15)?),
            fetch_interval: Duration::from_secs(parse(&var, "FETCH_INTERVAL_SECS", 10)?),
            ingestion_enabled: parse(&var, "INGESTION_ENABLED", true)?,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn postgres_url_from_parts<F>(var: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let user = var("POSTGRES_USER").ok_or(ConfigError::Missing("DATABASE_URL or POSTGRES_USER"))?;
    let password = var("POSTGRES_PASSWORD").unwrap_or_default();
    let host = var("POSTGRES_HOST").unwrap_or_else(|| "localhost".to_string());
    let port: u16 = parse(var, "POSTGRES_PORT", 5432)?;
    let db = var("POSTGRES_DB").ok_or(ConfigError::Missing("POSTGRES_DB"))?;

    Ok(format!("postgres://{user}:{password}@{host}:{port}/{db}"))
}
