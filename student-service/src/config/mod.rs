use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct StudentConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub request_timeout_secs: u64,
    /// When set, spans are exported over OTLP to this endpoint.
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
    pub collection: String,
}

impl StudentConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(StudentConfig {
            common: common_config,
            mongodb: MongoConfig {
                url: get_env("MONGODB_URL", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("college"), is_prod)?,
                collection: get_env("MONGODB_COLLECTION", Some("students"), is_prod)?,
            },
            request_timeout_secs: get_env("REQUEST_TIMEOUT_SECS", Some("30"), is_prod)?
                .parse()
                .map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "REQUEST_TIMEOUT_SECS must be a whole number of seconds: {}",
                        e
                    ))
                })?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    lookup(key, default, is_prod, |k| env::var(k).ok())
}

fn lookup(
    key: &str,
    default: Option<&str>,
    is_prod: bool,
    source: impl Fn(&str) -> Option<String>,
) -> Result<String, AppError> {
    match source(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
