/// Errors raised while accepting or exporting a pulse-series map
#[derive(Debug, thiserror::Error)]
pub enum PulseMapError {
    /// The boundary value could not be interpreted as a pulse-series map
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error from the Arrow library while building column buffers
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),
}

impl From<serde_json::Error> for PulseMapError {
    fn from(err: serde_json::Error) -> Self {
        PulseMapError::InvalidInput(format!("malformed JSON: {}", err))
    }
}
