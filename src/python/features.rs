use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::restructure::{extract_pulse_map, restructure_released, BoundaryMap};
use crate::config::Config;
use crate::features::{FeatureConfig, FeatureExtractor};

/// Extract per-sensor DNN input features from a pulse-series map.
///
/// Args:
///     pulse_map: Mapping of sensor key to pulses
///     config_toml: Optional TOML text with a `[features]` table; defaults apply
///         when omitted
///
/// Returns:
///     (global_time_offset, {key: (values, indices)}) for every sensor that had
///     pulses inside the feature window
#[pyfunction]
#[pyo3(signature = (pulse_map, config_toml=None))]
pub fn extract_features<'py>(
    py: Python<'py>,
    pulse_map: &Bound<'py, PyAny>,
    config_toml: Option<&str>,
) -> PyResult<(f64, Bound<'py, PyDict>)> {
    let config = match config_toml {
        Some(text) => Config::from_str(text)?.features,
        None => FeatureConfig::default(),
    };
    let extractor = FeatureExtractor::new(config)?;

    let BoundaryMap { keys, map } = extract_pulse_map(pulse_map)?;
    let pulses = restructure_released(py, &map);
    let features = py.allow_threads(|| extractor.extract_restructured(&pulses))?;

    let result = PyDict::new_bound(py);
    for (index, binned) in &features.sensors {
        if let Some(key) = keys.get(*index) {
            let values = PyList::new_bound(py, &binned.values);
            let indices = PyList::new_bound(py, &binned.indices);
            result.set_item(key, (values, indices))?;
        }
    }

    Ok((features.global_time_offset, result))
}
