//! Python bindings for pulseprep
//!
//! This module provides Python bindings via PyO3 so the restructuring step can
//! be called directly from a Python processing chain.
//!
//! # Example
//!
//! ```python
//! import pulseprep
//!
//! pulses = {(36, 10, 0): [(1.2, 10050.0), (0.8, 10320.0)]}
//! charges, times, dom_times, dom_charges = pulseprep.restructure_pulsemap(pulses)
//!
//! arrays = pulseprep.restructure_pulsemap_arrays(pulses)
//! arrays.charges  # numpy.ndarray[float64]
//! ```

pub(crate) mod exceptions;
mod features;
mod restructure;

#[cfg(test)]
mod tests;

use pyo3::prelude::*;

/// Initialize the pulseprep Python module
#[pymodule]
fn pulseprep(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Initialize logging bridge to Python's logging module
    pyo3_log::init();

    // Register exception types
    m.add("PulseprepException", py.get_type_bound::<exceptions::PulseprepException>())?;
    m.add("InvalidInputError", py.get_type_bound::<exceptions::InvalidInputError>())?;
    m.add(
        "FeatureExtractionError",
        py.get_type_bound::<exceptions::FeatureExtractionError>(),
    )?;

    // Register data types
    m.add_class::<restructure::PyPulseArrays>()?;

    // Register module-level functions
    m.add_function(wrap_pyfunction!(restructure::restructure_pulsemap, m)?)?;
    m.add_function(wrap_pyfunction!(restructure::restructure_pulsemap_arrays, m)?)?;
    m.add_function(wrap_pyfunction!(features::extract_features, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
