use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::exceptions::InvalidInputError;
use super::restructure::{extract_pulse_map, restructure_pulsemap};

const HELPERS: &str = r#"
class Pairs:
    def __init__(self, pairs):
        self.pairs = pairs

    def items(self):
        return list(self.pairs)

class Pulse:
    def __init__(self, charge, time, width=None):
        self.charge = charge
        self.time = time
        self.width = width
"#;

fn helpers(py: Python<'_>) -> Bound<'_, PyModule> {
    PyModule::from_code_bound(py, HELPERS, "helpers.py", "helpers").unwrap()
}

fn single_pulse_map<'py>(py: Python<'py>, pulse: Bound<'py, PyAny>) -> Bound<'py, PyDict> {
    let map = PyDict::new_bound(py);
    map.set_item((1, 1, 0), PyList::new_bound(py, [pulse])).unwrap();
    map
}

#[test]
fn test_dict_order_preserved() {
    pyo3::prepare_freethreaded_python();
    Python::with_gil(|py| {
        let source = "{(2, 1, 0): [(1.0, 5.0)], (1, 1, 0): [(2.0, 6.0), (3.0, 7.0)]}";
        let map = py.eval_bound(source, None, None).unwrap();

        let (charges, times, dom_times, dom_charges) = restructure_pulsemap(py, &map).unwrap();

        assert_eq!(charges.extract::<Vec<f64>>().unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(times.extract::<Vec<f64>>().unwrap(), vec![5.0, 6.0, 7.0]);
        assert_eq!(dom_times.len(), 2);
        let first = dom_charges.get_item((1, 1, 0)).unwrap().unwrap();
        assert_eq!(first.extract::<Vec<f64>>().unwrap(), vec![2.0, 3.0]);
    });
}

#[test]
fn test_repeated_key_from_items_rejected() {
    pyo3::prepare_freethreaded_python();
    Python::with_gil(|py| {
        let pairs = helpers(py).getattr("Pairs").unwrap();
        let entries = py
            .eval_bound("[((1, 1, 0), [(1.0, 10.0)]), ((1, 1, 0), [(2.0, 20.0)])]", None, None)
            .unwrap();
        let map = pairs.call1((entries,)).unwrap();

        let err = restructure_pulsemap(py, &map).unwrap_err();

        assert!(err.is_instance_of::<InvalidInputError>(py));
        assert!(err.to_string().contains("duplicate sensor key"), "{}", err);
    });
}

#[test]
fn test_distinct_keys_from_items_accepted() {
    pyo3::prepare_freethreaded_python();
    Python::with_gil(|py| {
        let pairs = helpers(py).getattr("Pairs").unwrap();
        let entries = py
            .eval_bound("[((1, 1, 0), [(1.0, 10.0)]), ((1, 2, 0), [(2.0, 20.0)])]", None, None)
            .unwrap();
        let map = pairs.call1((entries,)).unwrap();

        let boundary = extract_pulse_map(&map).unwrap();
        assert_eq!(boundary.keys.len(), 2);
        assert_eq!(boundary.map.total_pulses(), 2);
    });
}

#[test]
fn test_non_numeric_width_rejected() {
    pyo3::prepare_freethreaded_python();
    Python::with_gil(|py| {
        let pulse_type = helpers(py).getattr("Pulse").unwrap();
        let pulse = pulse_type.call1((1.0, 10.0, "wide")).unwrap();
        let map = single_pulse_map(py, pulse);

        let err = extract_pulse_map(&map).err().unwrap();

        assert!(err.is_instance_of::<InvalidInputError>(py));
        assert!(err.to_string().contains("width"), "{}", err);
    });
}

#[test]
fn test_width_attribute() {
    pyo3::prepare_freethreaded_python();
    Python::with_gil(|py| {
        let pulse_type = helpers(py).getattr("Pulse").unwrap();

        let with_width = pulse_type.call1((1.0, 10.0, 2.5)).unwrap();
        let boundary = extract_pulse_map(&single_pulse_map(py, with_width)).unwrap();
        assert_eq!(boundary.map.get(&0).unwrap()[0].width, 2.5);

        let without_width = pulse_type.call1((1.0, 10.0)).unwrap();
        let boundary = extract_pulse_map(&single_pulse_map(py, without_width)).unwrap();
        assert_eq!(boundary.map.get(&0).unwrap()[0].width, 0.0);
    });
}

#[test]
fn test_non_mapping_rejected() {
    pyo3::prepare_freethreaded_python();
    Python::with_gil(|py| {
        let value = py.eval_bound("[1, 2, 3]", None, None).unwrap();
        let err = restructure_pulsemap(py, &value).unwrap_err();
        assert!(err.is_instance_of::<InvalidInputError>(py));
    });
}
