use crate::app_config::{
    AppConfig, Environment, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, DEFAULT_USER_AGENT,
};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty values count as unset so `.env` templates with blank keys behave.
    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|value| !value.trim().is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        match parse_u64(var, default)? {
            0 => Err(invalid(var, "must be greater than zero".to_string())),
            value => Ok(value),
        }
    };

    let database_url = optional("DATABASE_URL");
    let env = parse_environment(&or_default("STORELENS_ENV", "development"))?;

    let bind_addr = or_default("STORELENS_BIND_ADDR", "0.0.0.0:8000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("STORELENS_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("STORELENS_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("STORELENS_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("STORELENS_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(invalid(
            "STORELENS_DB_MIN_CONNECTIONS",
            format!("{db_min_connections} exceeds max connections {db_max_connections}"),
        ));
    }
    let db_acquire_timeout_secs = parse_u64("STORELENS_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs =
        parse_positive_u64("STORELENS_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_page_timeout_secs =
        parse_positive_u64("STORELENS_SCRAPER_PAGE_TIMEOUT_SECS", "20")?;
    let scraper_user_agent = or_default("STORELENS_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_item_concurrency = or_default("STORELENS_SCRAPER_ITEM_CONCURRENCY", "4")
        .parse::<usize>()
        .map_err(|e| invalid("STORELENS_SCRAPER_ITEM_CONCURRENCY", e.to_string()))?
        .max(1);

    let unit_timeout_secs = parse_positive_u64("STORELENS_UNIT_TIMEOUT_SECS", "120")?;
    let analysis_timeout_secs = parse_positive_u64("STORELENS_ANALYSIS_TIMEOUT_SECS", "300")?;
    let cache_max_age_hours = parse_u64("STORELENS_CACHE_MAX_AGE_HOURS", "24")?;

    let google_api_key = optional("GOOGLE_API_KEY");
    let llm_model = or_default("STORELENS_LLM_MODEL", DEFAULT_LLM_MODEL);
    let llm_base_url = or_default("STORELENS_LLM_BASE_URL", DEFAULT_LLM_BASE_URL)
        .trim_end_matches('/')
        .to_string();

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_page_timeout_secs,
        scraper_user_agent,
        scraper_item_concurrency,
        unit_timeout_secs,
        analysis_timeout_secs,
        cache_max_age_hours,
        google_api_key,
        llm_model,
        llm_base_url,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STORELENS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
