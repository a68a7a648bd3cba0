//! Runtime configuration shared by the binaries.

use clap::Args;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-pro";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DATA_PATH: &str = "DataCoSupplyChainDataset.csv";

/// Settings for the hosted advisory model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryConfig {
    /// Credential for the hosted model; without one every question is answered
    /// from the local rules.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AdvisoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Advisory flags, flattened into each binary's argument parser
#[derive(Args, Debug, Clone)]
pub struct AdvisoryArgs {
    /// API key for the hosted model
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Hosted model name
    #[arg(long, env = "CONTROL_TOWER_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the model API
    #[arg(long, env = "CONTROL_TOWER_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Seconds to wait for the model before answering locally
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl From<AdvisoryArgs> for AdvisoryConfig {
    fn from(args: AdvisoryArgs) -> Self {
        Self {
            api_key: args.api_key.filter(|k| !k.trim().is_empty()),
            model: args.model,
            base_url: args.api_base.trim_end_matches('/').to_string(),
            timeout_seconds: args.timeout_secs,
        }
    }
}

/// Install the global tracing subscriber (`RUST_LOG`, default `info`)
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        advisory: AdvisoryArgs,
    }

    #[test]
    fn test_blank_key_is_none() {
        let cli = TestCli::parse_from([
            "test",
            "--api-key",
            "  ",
            "--api-base",
            "http://localhost:9/",
        ]);
        let config = AdvisoryConfig::from(cli.advisory);

        assert_eq!(config.api_key, None);
        assert_eq!(config.base_url, "http://localhost:9");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
