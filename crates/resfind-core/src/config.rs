use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let upstream_api_key = require("RESFIND_UPSTREAM_API_KEY")?;

    let env = parse_environment(&or_default("RESFIND_ENV", "development"));

    let bind_addr = parse_addr("RESFIND_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("RESFIND_LOG_LEVEL", "info");
    let taxonomy_path = PathBuf::from(or_default(
        "RESFIND_TAXONOMY_PATH",
        "./config/taxonomy.yaml",
    ));
    let zip_table_path = PathBuf::from(or_default(
        "RESFIND_ZIP_TABLE_PATH",
        "./data/zipcodes.csv",
    ));

    let upstream_base_url = or_default(
        "RESFIND_UPSTREAM_BASE_URL",
        "https://api.211.org/resources/v2/search/",
    );
    let upstream_api_key_header = or_default("RESFIND_UPSTREAM_API_KEY_HEADER", "Api-Key");
    let upstream_timeout_secs = parse_u64("RESFIND_UPSTREAM_TIMEOUT_SECS", "10")?;
    if upstream_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "RESFIND_UPSTREAM_TIMEOUT_SECS".to_string(),
            reason: "timeout must be at least one second".to_string(),
        });
    }
    let upstream_user_agent = or_default(
        "RESFIND_UPSTREAM_USER_AGENT",
        "resfind/0.1 (resource-directory)",
    );
    let search_radius_miles = parse_u32("RESFIND_SEARCH_RADIUS_MILES", "25")?;
    let location_mode = or_default("RESFIND_LOCATION_MODE", "Within");
    let search_rate_limit_per_min = parse_u32("RESFIND_SEARCH_RATE_LIMIT_PER_MIN", "120")?;
    if search_rate_limit_per_min == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "RESFIND_SEARCH_RATE_LIMIT_PER_MIN".to_string(),
            reason: "rate limit must be at least one search per minute".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        taxonomy_path,
        zip_table_path,
        upstream_base_url,
        upstream_api_key,
        upstream_api_key_header,
        upstream_timeout_secs,
        upstream_user_agent,
        search_radius_miles,
        location_mode,
        search_rate_limit_per_min,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
