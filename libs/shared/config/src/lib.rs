use std::env;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub directory_url: String,
    pub directory_api_key: String,
    pub jwt_secret: String,
    pub upstream_timeout_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            directory_url: env::var("DIRECTORY_URL")
                .unwrap_or_else(|_| {
                    warn!("DIRECTORY_URL not set, using empty value");
                    String::new()
                }),
            directory_api_key: env::var("DIRECTORY_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("DIRECTORY_API_KEY not set, using empty value");
                    String::new()
                }),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            upstream_timeout_ms: env::var("UPSTREAM_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5_000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.directory_url.is_empty()
            && !self.directory_api_key.is_empty()
            && !self.jwt_secret.is_empty()
    }

    /// Bound applied to every call into an external collaborator.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }
}
