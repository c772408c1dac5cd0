use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfoError {
    #[error("info request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Info request returned non-ok code {code} ({reason})")]
    Status { code: u16, reason: String },
}
