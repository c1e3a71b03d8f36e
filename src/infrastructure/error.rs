use thiserror::Error;

/// Failure of a collection or wallet provider call
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode provider response: {0}")]
    Decode(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Failure of a name resolver call
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid resolver endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("name resolver RPC failed: {0}")]
    Rpc(String),
    #[error("failed to decode resolver response: {0}")]
    Decode(String),
    #[error("invalid name: {0}")]
    InvalidName(String),
}
