use shared::error::ApiError;
use thiserror::Error;

/// Why a product store call failed. Callers treat every variant the same way
/// (state unchanged, failure logged); the split only matters for diagnostics.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid product store url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("product store unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("product store rejected request with status {status}: {}", error.message)]
    Status { status: u16, error: ApiError },
    #[error("malformed product store response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidBaseUrl { .. } => "config",
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
        }
    }
}
