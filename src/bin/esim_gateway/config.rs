//! Server configuration module

use clap::Parser;
use esim_gateway::PollPolicy;
use std::fmt;
use std::time::Duration;

/// eSIM gateway configuration
#[derive(Parser)]
#[command(name = "esim-gateway", about = "eSIM provisioning gateway", long_about = None)]
pub struct ServerConfig {
    /// Server host address
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// BNESIM API base URL
    #[arg(long, env = "BNESIM_BASE_URL")]
    pub bnesim_base_url: String,

    /// BNESIM operator API key
    #[arg(long, env = "BNESIM_API_KEY", hide_env_values = true)]
    pub bnesim_api_key: String,

    /// BNESIM operator API secret
    #[arg(long, env = "BNESIM_API_SECRET", hide_env_values = true)]
    pub bnesim_api_secret: String,

    /// Product used when a request names none
    #[arg(long, env = "BNESIM_DEFAULT_PRODUCT_ID")]
    pub default_product_id: Option<String>,

    /// Status checks per activation transaction
    #[arg(
        long,
        env = "BNESIM_POLL_ATTEMPTS",
        default_value = "10",
        value_parser = clap::value_parser!(u32).range(1..=120)
    )]
    pub poll_attempts: u32,

    /// Pause between two status checks, in milliseconds
    #[arg(long, env = "BNESIM_POLL_INTERVAL_MS", default_value = "2000")]
    pub poll_interval_ms: u64,

    /// Timeout of one provider call, in seconds
    #[arg(
        long,
        env = "BNESIM_REQUEST_TIMEOUT_SECS",
        default_value = "20",
        value_parser = clap::value_parser!(u64).range(15..=30)
    )]
    pub request_timeout_secs: u64,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("bnesim_base_url", &self.bnesim_base_url)
            .field("bnesim_api_key", &"[REDACTED]")
            .field("bnesim_api_secret", &"[REDACTED]")
            .field("default_product_id", &self.default_product_id)
            .field("poll_attempts", &self.poll_attempts)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            self.poll_attempts,
            Duration::from_millis(self.poll_interval_ms),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
