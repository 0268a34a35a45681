use crate::errors::AppError;
use crate::models::Persona;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Base URL of the outreach backend. Missing values are reported per call.
    pub backend_base_url: Option<String>,
    /// API key sent to the backend. Missing values are reported per call.
    pub backend_api_key: Option<String>,
    pub default_persona: Persona,
    pub persona_state_path: Option<PathBuf>,
    /// Interval of the inbox refresh loop; `None` disables it.
    pub inbox_refresh_interval: Option<Duration>,
    pub backend_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            backend_base_url: None,
            backend_api_key: None,
            default_persona: Persona::Sales,
            persona_state_path: None,
            inbox_refresh_interval: Some(Duration::from_secs(30)),
            backend_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            backend_base_url: std::env::var("BACKEND_API_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| {
                    let url = url.trim().trim_end_matches('/').to_string();
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("BACKEND_API_URL must start with http:// or https://");
                    }
                    url::Url::parse(&url)
                        .map_err(|e| anyhow::anyhow!("BACKEND_API_URL is not a valid URL: {}", e))?;
                    Ok(url)
                })
                .transpose()?,
            backend_api_key: std::env::var("BACKEND_API_KEY")
                .ok()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            default_persona: std::env::var("DEFAULT_PERSONA")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|p| p.parse::<Persona>().map_err(|e| anyhow::anyhow!(e)))
                .transpose()?
                .unwrap_or_default(),
            persona_state_path: std::env::var("PERSONA_STATE_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            inbox_refresh_interval: match std::env::var("INBOX_REFRESH_SECS") {
                Ok(raw) => {
                    let secs: u64 = raw.trim().parse().map_err(|_| {
                        anyhow::anyhow!("INBOX_REFRESH_SECS must be a non-negative integer")
                    })?;
                    (secs > 0).then(|| Duration::from_secs(secs))
                }
                Err(_) => Some(Duration::from_secs(30)),
            },
            backend_timeout: std::env::var("BACKEND_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .trim()
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| anyhow::anyhow!("BACKEND_TIMEOUT_SECS must be a positive integer"))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        match config.backend_base_url {
            Some(ref url) => tracing::debug!("Backend URL: {}", url),
            None => tracing::warn!("BACKEND_API_URL is not set, backend calls will fail"),
        }
        if config.backend_api_key.is_none() {
            tracing::warn!("BACKEND_API_KEY is not set, backend calls will fail");
        }
        tracing::debug!("Default persona: {}", config.default_persona);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Returns the backend base URL and API key, or the configuration error
    /// every backend-bound operation reports when either is missing.
    pub fn backend_credentials(&self) -> Result<(&str, &str), AppError> {
        let base_url = self.backend_base_url.as_deref().ok_or_else(|| {
            AppError::Configuration("Backend API URL is not configured (BACKEND_API_URL)".into())
        })?;
        let api_key = self.backend_api_key.as_deref().ok_or_else(|| {
            AppError::Configuration("Backend API key is not configured (BACKEND_API_KEY)".into())
        })?;
        Ok((base_url, api_key))
    }
}
