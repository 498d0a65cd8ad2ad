//! Bridge client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bridge API error: {0}")]
    Api(String),

    #[error("Send failed: {0}")]
    SendFailed(String),
}
