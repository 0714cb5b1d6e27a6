use numpy::IntoPyArray;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList, PySet};

use super::exceptions::invalid_input;
use crate::pulses::{restructure, PulseRecord, PulseSeriesMap, RestructuredPulses};

/// A pulse-series map pulled across the boundary.
///
/// Sensors are keyed by their position in the Python map's iteration order, so
/// restructuring visits them in exactly that order and the original key objects
/// can be attached to the output afterwards.
pub(crate) struct BoundaryMap<'py> {
    pub(crate) keys: Vec<Bound<'py, PyAny>>,
    pub(crate) map: PulseSeriesMap<usize>,
}

fn extract_number(value: PyResult<Bound<'_, PyAny>>, what: &str, path: &str) -> PyResult<f64> {
    value
        .and_then(|v| v.extract::<f64>())
        .map_err(|_| invalid_input(format!("{}: {} must be a number", path, what)))
}

fn dict_field<'py>(
    dict: &Bound<'py, PyDict>,
    name: &str,
    path: &str,
) -> PyResult<Bound<'py, PyAny>> {
    dict.get_item(name)?
        .ok_or_else(|| invalid_input(format!("{}: missing '{}'", path, name)))
}

fn extract_pulse(pulse: &Bound<'_, PyAny>, path: &str) -> PyResult<PulseRecord> {
    // Detector pulse objects expose charge and time as attributes
    if pulse.hasattr("charge")? && pulse.hasattr("time")? {
        let charge = extract_number(pulse.getattr("charge"), "charge", path)?;
        let time = extract_number(pulse.getattr("time"), "time", path)?;
        // only a missing or None width defaults to zero
        let width = match pulse.getattr("width") {
            Ok(w) if !w.is_none() => extract_number(Ok(w), "width", path)?,
            _ => 0.0,
        };
        return Ok(PulseRecord {
            charge,
            time,
            width,
            flags: 0,
        });
    }

    if let Ok(dict) = pulse.downcast::<PyDict>() {
        let charge = extract_number(dict_field(dict, "charge", path), "charge", path)?;
        let time = extract_number(dict_field(dict, "time", path), "time", path)?;
        return Ok(PulseRecord::new(charge, time));
    }

    let (charge, time): (f64, f64) = pulse.extract().map_err(|_| {
        invalid_input(format!(
            "{}: expected a pulse object, dict or (charge, time) pair, got {}",
            path,
            pulse.get_type()
        ))
    })?;
    Ok(PulseRecord::new(charge, time))
}

/// Validate an arbitrary Python object as a pulse-series map.
///
/// Anything exposing `items()` that yields `(key, iterable of pulses)` pairs is
/// accepted, which covers `dict` as well as detector-framework map types.
pub(crate) fn extract_pulse_map<'py>(obj: &Bound<'py, PyAny>) -> PyResult<BoundaryMap<'py>> {
    let not_a_map = || {
        invalid_input(format!(
            "expected a pulse-series map, got {}",
            obj.get_type()
        ))
    };

    if !obj.hasattr("items").unwrap_or(false) {
        return Err(not_a_map());
    }
    let items = obj.call_method0("items").map_err(|_| not_a_map())?;

    let mut keys = Vec::new();
    let seen = PySet::empty_bound(obj.py())?;
    let mut map = PulseSeriesMap::new();

    for (index, item) in items.iter().map_err(|_| not_a_map())?.enumerate() {
        let (key, series): (Bound<'py, PyAny>, Bound<'py, PyAny>) = item?
            .extract()
            .map_err(|_| {
                invalid_input(format!("entry {}: expected a (key, pulses) pair", index))
            })?;

        let path = format!("entry {} ({})", index, key);
        let repeated = seen
            .contains(&key)
            .map_err(|_| invalid_input(format!("{}: sensor key is not hashable", path)))?;
        if repeated {
            return Err(invalid_input(format!("{}: duplicate sensor key", path)));
        }
        seen.add(&key)?;

        let pulses = series
            .iter()
            .map_err(|_| invalid_input(format!("{}: pulses must be iterable", path)))?
            .enumerate()
            .map(|(i, pulse)| {
                pulse.and_then(|p| extract_pulse(&p, &format!("{}[{}]", path, i)))
            })
            .collect::<PyResult<Vec<_>>>()?;

        map.insert(index, pulses);
        keys.push(key);
    }

    Ok(BoundaryMap { keys, map })
}

pub(crate) fn restructure_released(
    py: Python<'_>,
    map: &PulseSeriesMap<usize>,
) -> RestructuredPulses<usize> {
    py.allow_threads(|| restructure(map))
}

type PulseMapTuple<'py> = (
    Bound<'py, PyList>,
    Bound<'py, PyList>,
    Bound<'py, PyDict>,
    Bound<'py, PyDict>,
);

/// Restructure a pulse-series map into (charges, times, dom_times, dom_charges).
///
/// Returns two flat lists and two dicts keyed by the original sensor keys.
/// Raises InvalidInputError if the object is not a pulse-series map.
#[pyfunction]
pub fn restructure_pulsemap<'py>(
    py: Python<'py>,
    pulse_map: &Bound<'py, PyAny>,
) -> PyResult<PulseMapTuple<'py>> {
    let BoundaryMap { keys, map } = extract_pulse_map(pulse_map)?;
    let output = restructure_released(py, &map);

    let dom_times = PyDict::new_bound(py);
    let dom_charges = PyDict::new_bound(py);
    for (index, key) in keys.iter().enumerate() {
        if let Some(times) = output.per_sensor_times.get(&index) {
            dom_times.set_item(key, PyList::new_bound(py, times))?;
        }
        if let Some(charges) = output.per_sensor_charges.get(&index) {
            dom_charges.set_item(key, PyList::new_bound(py, charges))?;
        }
    }

    Ok((
        PyList::new_bound(py, &output.flat_charges),
        PyList::new_bound(py, &output.flat_times),
        dom_times,
        dom_charges,
    ))
}

/// Restructured pulses as NumPy arrays
#[pyclass(name = "PulseArrays")]
pub struct PyPulseArrays {
    charges: PyObject,
    times: PyObject,
    sensor_index: PyObject,
    keys: Vec<PyObject>,
}

#[pymethods]
impl PyPulseArrays {
    /// Flat charge array (float64)
    #[getter]
    fn charges(&self, py: Python<'_>) -> PyObject {
        self.charges.clone_ref(py)
    }

    /// Flat time array (float64), aligned with charges
    #[getter]
    fn times(&self, py: Python<'_>) -> PyObject {
        self.times.clone_ref(py)
    }

    /// For every pulse, the index of its sensor in `keys` (uint32)
    #[getter]
    fn sensor_index(&self, py: Python<'_>) -> PyObject {
        self.sensor_index.clone_ref(py)
    }

    /// Sensor keys in map order
    #[getter]
    fn keys(&self, py: Python<'_>) -> Vec<PyObject> {
        self.keys.iter().map(|k| k.clone_ref(py)).collect()
    }

    fn __len__(&self, py: Python<'_>) -> PyResult<usize> {
        self.charges.bind(py).len()
    }

    fn __repr__(&self, py: Python<'_>) -> String {
        format!(
            "PulseArrays(sensors={}, pulses={})",
            self.keys.len(),
            self.charges.bind(py).len().unwrap_or(0)
        )
    }
}

/// Restructure a pulse-series map into flat NumPy arrays.
///
/// Raises InvalidInputError if the object is not a pulse-series map.
#[pyfunction]
pub fn restructure_pulsemap_arrays(
    py: Python<'_>,
    pulse_map: &Bound<'_, PyAny>,
) -> PyResult<PyPulseArrays> {
    let BoundaryMap { keys, map } = extract_pulse_map(pulse_map)?;
    let output = restructure_released(py, &map);
    let sensor_index = output.sensor_index_array()?.values().to_vec();

    Ok(PyPulseArrays {
        charges: output.flat_charges.into_pyarray_bound(py).into_any().unbind(),
        times: output.flat_times.into_pyarray_bound(py).into_any().unbind(),
        sensor_index: sensor_index.into_pyarray_bound(py).into_any().unbind(),
        keys: keys.into_iter().map(Bound::unbind).collect(),
    })
}
