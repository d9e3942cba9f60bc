use crate::app_config::AppConfig;
use crate::ConfigError;

/// Chrome 108 on Windows 10, matching the rest of the static header profile
/// the scraper sends.
pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse. Every variable has a
/// default, so a bare environment is valid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup
/// function. The parsing logic is decoupled from the real environment so it
/// can be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

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

    let request_timeout_secs = parse_u64("CLGRAB_REQUEST_TIMEOUT_SECS", "30")?;
    let retry_attempts = parse_u32("CLGRAB_RETRY_ATTEMPTS", "5")?;
    let retry_delay_secs = parse_u64("CLGRAB_RETRY_DELAY_SECS", "5")?;
    let detail_concurrency = parse_usize("CLGRAB_DETAIL_CONCURRENCY", "1")?;
    if detail_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CLGRAB_DETAIL_CONCURRENCY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let deadline_secs = match lookup("CLGRAB_DEADLINE_SECS") {
        Ok(raw) => Some(raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: "CLGRAB_DEADLINE_SECS".to_string(),
            reason: e.to_string(),
        })?),
        Err(_) => None,
    };

    let user_agent = or_default("CLGRAB_USER_AGENT", DEFAULT_USER_AGENT);
    let region = or_default("CLGRAB_REGION", "us");
    let output_dir = PathBuf::from(or_default("CLGRAB_OUTPUT_DIR", "."));

    Ok(AppConfig {
        request_timeout_secs,
        retry_attempts,
        retry_delay_secs,
        detail_concurrency,
        deadline_secs,
        user_agent,
        region,
        output_dir,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_app_config_defaults_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.retry_attempts, 5);
        assert_eq!(cfg.retry_delay_secs, 5);
        assert_eq!(cfg.detail_concurrency, 1);
        assert_eq!(cfg.deadline_secs, None);
        assert_eq!(cfg.region, "us");
        assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn build_app_config_reads_overrides() {
        let mut map = HashMap::new();
        map.insert("CLGRAB_RETRY_ATTEMPTS", "2");
        map.insert("CLGRAB_DETAIL_CONCURRENCY", "8");
        map.insert("CLGRAB_DEADLINE_SECS", "600");
        map.insert("CLGRAB_REGION", "ca");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.retry_attempts, 2);
        assert_eq!(cfg.detail_concurrency, 8);
        assert_eq!(cfg.deadline_secs, Some(600));
        assert_eq!(cfg.region, "ca");
    }

    #[test]
    fn build_app_config_rejects_unparseable_number() {
        let mut map = HashMap::new();
        map.insert("CLGRAB_RETRY_ATTEMPTS", "five");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CLGRAB_RETRY_ATTEMPTS"),
            "expected InvalidEnvVar(CLGRAB_RETRY_ATTEMPTS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_zero_concurrency() {
        let mut map = HashMap::new();
        map.insert("CLGRAB_DETAIL_CONCURRENCY", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CLGRAB_DETAIL_CONCURRENCY"),
            "expected InvalidEnvVar(CLGRAB_DETAIL_CONCURRENCY), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_bad_deadline() {
        let mut map = HashMap::new();
        map.insert("CLGRAB_DEADLINE_SECS", "soon");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CLGRAB_DEADLINE_SECS"),
            "expected InvalidEnvVar(CLGRAB_DEADLINE_SECS), got: {result:?}"
        );
    }
}
