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
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected true/false, got '{other}'"),
            }),
        }
    };

    // Thresholds are probabilities; reject anything outside [0, 1] at load
    // time rather than letting a bad value silently filter out every article.
    let parse_unit_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("must be in [0, 1], got {value}"),
            });
        }
        Ok(value)
    };

    let database_url = require("DATABASE_URL")?;
    let inference_url = require("ESGLENS_INFERENCE_URL")?;
    let env = parse_environment(&or_default("ESGLENS_ENV", "development"));
    let log_level = or_default("ESGLENS_LOG_LEVEL", "info");
    let organizations_path = PathBuf::from(or_default(
        "ESGLENS_ORGANIZATIONS_PATH",
        "./config/organizations.yaml",
    ));
    let search_base_url = or_default("ESGLENS_SEARCH_BASE_URL", "https://news.google.com");

    let cycle_interval_secs = parse_u64("ESGLENS_CYCLE_INTERVAL_SECS", "3600")?;
    let max_fetch_threads = parse_usize("ESGLENS_MAX_FETCH_THREADS", "4")?;
    let use_accelerator = parse_bool("ESGLENS_USE_ACCELERATOR", "false")?;
    let accelerator_memory_gb_per_worker =
        parse_u64("ESGLENS_ACCELERATOR_MEMORY_GB_PER_WORKER", "3")?;
    let relevancy_threshold = parse_unit_f64("ESGLENS_RELEVANCY_THRESHOLD", "0.3")?;
    let indicator_membership_threshold =
        parse_unit_f64("ESGLENS_INDICATOR_MEMBERSHIP_THRESHOLD", "0.5")?;
    let scrape_full_articles = parse_bool("ESGLENS_SCRAPE_FULL_ARTICLES", "false")?;
    let fetch_timeout_secs = parse_u64("ESGLENS_FETCH_TIMEOUT_SECS", "30")?;

    let db_max_connections = parse_u32("ESGLENS_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("ESGLENS_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("ESGLENS_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        organizations_path,
        search_base_url,
        inference_url,
        cycle_interval_secs,
        max_fetch_threads,
        use_accelerator,
        accelerator_memory_gb_per_worker,
        relevancy_threshold,
        indicator_membership_threshold,
        scrape_full_articles,
        fetch_timeout_secs,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
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
