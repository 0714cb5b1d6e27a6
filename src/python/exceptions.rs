//! Python exception types for pulseprep
//!
//! Maps Rust error types to appropriate Python exceptions.

use pyo3::create_exception;
use pyo3::exceptions::{PyException, PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::config::ConfigError;
use crate::features::FeatureError;
use crate::pulses::PulseMapError;

// Define custom exception hierarchy
create_exception!(
    pulseprep,
    PulseprepException,
    PyException,
    "Base exception for all pulseprep errors."
);
create_exception!(
    pulseprep,
    InvalidInputError,
    PyValueError,
    "The supplied object is not a valid pulse-series map."
);
create_exception!(
    pulseprep,
    FeatureExtractionError,
    PulseprepException,
    "Feature extraction failed."
);

/// Convert PulseMapError to Python exception
impl From<PulseMapError> for PyErr {
    fn from(err: PulseMapError) -> Self {
        match &err {
            PulseMapError::InvalidInput(_) => InvalidInputError::new_err(err.to_string()),
            PulseMapError::ArrowError(_) => PulseprepException::new_err(err.to_string()),
        }
    }
}

/// Convert FeatureError to Python exception
impl From<FeatureError> for PyErr {
    fn from(err: FeatureError) -> Self {
        match &err {
            FeatureError::InvalidConfig(_) => PyValueError::new_err(err.to_string()),
            _ => FeatureExtractionError::new_err(err.to_string()),
        }
    }
}

/// Convert ConfigError to Python exception
impl From<ConfigError> for PyErr {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::IoError { .. } => PyIOError::new_err(err.to_string()),
            ConfigError::ParseError(_) => PyValueError::new_err(err.to_string()),
            ConfigError::InvalidFeatures(inner) => inner.into(),
        }
    }
}

/// Build an InvalidInputError for a boundary value that has the wrong shape
pub(crate) fn invalid_input(message: impl Into<String>) -> PyErr {
    InvalidInputError::new_err(message.into())
}
