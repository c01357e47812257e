use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid margin value: {0}")]
    InvalidMargin(String),
}
