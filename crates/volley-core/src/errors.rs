//! Typed run errors. The CLI maps these onto its exit-code contract
//! (config errors vs. infra errors that abort before any iteration).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config file not found: {path}")]
    MissingConfig { path: String },

    #[error("config error: {detail}")]
    ConfigParse { detail: String },

    #[error("token endpoint returned status {status}: {detail}")]
    TokenFetch { status: u16, detail: String },

    #[error("network error: {detail}")]
    Network { detail: String },

    #[error("provider rate limit (status {status})")]
    ProviderRateLimit { status: u16 },

    #[error("request timed out: {detail}")]
    ProviderTimeout { detail: String },

    #[error("provider server error (status {status})")]
    ProviderServer { status: u16 },

    #[error("no scenario matched draw {draw}")]
    ScenarioSelection { draw: f64 },

    #[error("io error: {detail}")]
    Io { detail: String },

    #[error("{detail}")]
    Other { detail: String },
}

impl RunError {
    pub fn config_parse(detail: impl Into<String>) -> Self {
        Self::ConfigParse {
            detail: detail.into(),
        }
    }

    /// Classifies a non-success status from the token endpoint. Rate
    /// limits and provider outages get their own variants; anything
    /// else (bad credentials, bad scope) is a plain token failure.
    pub fn from_token_status(status: u16, detail: String) -> Self {
        match status {
            429 => Self::ProviderRateLimit { status },
            500..=599 => Self::ProviderServer { status },
            _ => Self::TokenFetch { status, detail },
        }
    }

    /// Classifies a reqwest failure into the timeout/network buckets.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ProviderTimeout {
                detail: err.to_string(),
            }
        } else {
            Self::Network {
                detail: err.to_string(),
            }
        }
    }

    /// True for failures that happen before any iteration can run
    /// (setup-phase failures get a dedicated exit code in the CLI).
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            Self::TokenFetch { .. }
                | Self::Network { .. }
                | Self::ProviderTimeout { .. }
                | Self::ProviderServer { .. }
                | Self::ProviderRateLimit { .. }
        )
    }

    pub fn is_config_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingConfig { .. } | Self::ConfigParse { .. }
        )
    }
}

impl From<std::io::Error> for RunError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            detail: err.to_string(),
        }
    }
}
