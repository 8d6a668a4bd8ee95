use std::time::Duration;

/// Default upstream for identity lookups.
pub const DEFAULT_TALENT_BASE_URL: &str = "https://api.talentprotocol.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Server-held Talent Protocol key. `None` is not a startup failure:
    /// every lookup answers with a configuration error instead.
    pub talent_api_key: Option<String>,
    pub talent_base_url: String,
    pub talent_timeout_secs: u64,
    /// Sustained requests per second allowed per client IP.
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_vars(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Talent API Base URL: {}", config.talent_base_url);
        tracing::debug!("Talent API timeout: {}s", config.talent_timeout_secs);
        tracing::debug!("Server Port: {}", config.port);
        if config.talent_api_key.is_none() {
            tracing::warn!(
                "TALENT_PROTOCOL_API_KEY is not set; lookups will fail with a configuration error"
            );
        }

        Ok(config)
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// `from_env` passes the process environment; tests pass a closure over a
    /// fixed map so they never mutate global state.
    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            port: lookup("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            talent_api_key: lookup("TALENT_PROTOCOL_API_KEY")
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            talent_base_url: lookup("TALENT_API_BASE_URL")
                .filter(|url| !url.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("TALENT_API_BASE_URL must start with http:// or https://");
                    }
                    Ok(url.trim_end_matches('/').to_string())
                })
                .transpose()?
                .unwrap_or_else(|| DEFAULT_TALENT_BASE_URL.to_string()),
            talent_timeout_secs: lookup("TALENT_API_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".to_string())
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    anyhow::anyhow!("TALENT_API_TIMEOUT_SECS must be a positive number of seconds")
                })?,
            rate_limit_per_second: lookup("RATE_LIMIT_PER_SECOND")
                .unwrap_or_else(|| "10".to_string())
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow::anyhow!("RATE_LIMIT_PER_SECOND must be a positive number"))?,
            rate_limit_burst: lookup("RATE_LIMIT_BURST")
                .unwrap_or_else(|| "20".to_string())
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow::anyhow!("RATE_LIMIT_BURST must be a positive number"))?,
        };

        Ok(config)
    }

    pub fn talent_timeout(&self) -> Duration {
        Duration::from_secs(self.talent_timeout_secs)
    }

    /// Time for the rate limiter to add back one request, derived from the
    /// per-second rate. Rates above 1000/s clamp to one request per millisecond.
    pub fn rate_limit_replenish_interval(&self) -> Duration {
        Duration::from_millis((1000 / self.rate_limit_per_second.max(1)).max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.talent_api_key, None);
        assert_eq!(config.talent_base_url, DEFAULT_TALENT_BASE_URL);
        assert_eq!(config.talent_timeout(), Duration::from_secs(30));
        assert_eq!(config.rate_limit_per_second, 10);
        assert_eq!(config.rate_limit_burst, 20);
    }

    #[test]
    fn test_blank_api_key_counts_as_unset() {
        let config = config_from(&[("TALENT_PROTOCOL_API_KEY", "   ")]).unwrap();
        assert!(config.talent_api_key.is_none());

        let config = config_from(&[("TALENT_PROTOCOL_API_KEY", " secret ")]).unwrap();
        assert_eq!(config.talent_api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_base_url_is_validated_and_trimmed() {
        let config = config_from(&[("TALENT_API_BASE_URL", "http://localhost:9999/")]).unwrap();
        assert_eq!(config.talent_base_url, "http://localhost:9999");

        assert!(config_from(&[("TALENT_API_BASE_URL", "ftp://talent")]).is_err());
    }

    #[test]
    fn test_rate_limit_is_converted_to_replenish_interval() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.rate_limit_replenish_interval(), Duration::from_millis(100));

        let config = config_from(&[("RATE_LIMIT_PER_SECOND", "1")]).unwrap();
        assert_eq!(config.rate_limit_replenish_interval(), Duration::from_secs(1));

        let config = config_from(&[("RATE_LIMIT_PER_SECOND", "5000")]).unwrap();
        assert_eq!(config.rate_limit_replenish_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_malformed_numbers_are_rejected() {
        assert!(config_from(&[("PORT", "not-a-port")]).is_err());
        assert!(config_from(&[("PORT", "70000")]).is_err());
        assert!(config_from(&[("TALENT_API_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("RATE_LIMIT_BURST", "-1")]).is_err());
    }
}
