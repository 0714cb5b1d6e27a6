use std::collections::BTreeMap;
use std::ops::Range;

use log::debug;

use super::types::PulseSeriesMap;

/// Flat and per-sensor views of the charges and times in a pulse-series map.
///
/// `flat_charges[i]` and `flat_times[i]` always describe the same pulse. The
/// flat arrays are the per-sensor arrays concatenated in key order.
#[derive(Debug, Clone, PartialEq)]
pub struct RestructuredPulses<K> {
    /// All charges, sensor by sensor, in pulse order
    pub flat_charges: Vec<f64>,
    /// All times, aligned index-for-index with `flat_charges`
    pub flat_times: Vec<f64>,
    /// Pulse times of each sensor
    pub per_sensor_times: BTreeMap<K, Vec<f64>>,
    /// Pulse charges of each sensor
    pub per_sensor_charges: BTreeMap<K, Vec<f64>>,
}

/// Positional form of [`RestructuredPulses`]: charges, times, per-sensor times,
/// per-sensor charges.
pub type RestructuredTuple<K> = (
    Vec<f64>,
    Vec<f64>,
    BTreeMap<K, Vec<f64>>,
    BTreeMap<K, Vec<f64>>,
);

impl<K: Ord> Default for RestructuredPulses<K> {
    fn default() -> Self {
        Self {
            flat_charges: Vec::new(),
            flat_times: Vec::new(),
            per_sensor_times: BTreeMap::new(),
            per_sensor_charges: BTreeMap::new(),
        }
    }
}

impl<K: Ord> RestructuredPulses<K> {
    /// Total number of pulses in the flat arrays
    pub fn total_pulses(&self) -> usize {
        self.flat_charges.len()
    }

    /// Number of sensors present
    pub fn sensor_count(&self) -> usize {
        self.per_sensor_charges.len()
    }

    /// True if no sensors were present in the input
    pub fn is_empty(&self) -> bool {
        self.per_sensor_charges.is_empty()
    }

    /// Index range of each sensor's pulses inside the flat arrays
    pub fn sensor_ranges(&self) -> impl Iterator<Item = (&K, Range<usize>)> {
        let mut start = 0;
        self.per_sensor_charges.iter().map(move |(key, charges)| {
            let range = start..start + charges.len();
            start = range.end;
            (key, range)
        })
    }

    /// Split into the four-element positional form
    pub fn into_tuple(self) -> RestructuredTuple<K> {
        (
            self.flat_charges,
            self.flat_times,
            self.per_sensor_times,
            self.per_sensor_charges,
        )
    }
}

/// Converts pulse-series maps into flat and per-sensor scalar arrays.
///
/// Stateless: each call allocates a fresh result that shares nothing with the
/// input map.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulseMapRestructurer;

impl PulseMapRestructurer {
    /// Create a restructurer
    pub fn new() -> Self {
        Self
    }

    /// Restructure `pulse_map`, visiting sensors in key order and pulses in
    /// recorded order
    pub fn restructure<K: Ord + Clone>(
        &self,
        pulse_map: &PulseSeriesMap<K>,
    ) -> RestructuredPulses<K> {
        let total = pulse_map.total_pulses();
        let mut output = RestructuredPulses {
            flat_charges: Vec::with_capacity(total),
            flat_times: Vec::with_capacity(total),
            per_sensor_times: BTreeMap::new(),
            per_sensor_charges: BTreeMap::new(),
        };

        for (key, pulses) in pulse_map.iter() {
            let sensor_charges: Vec<f64> = pulses.iter().map(|p| p.charge).collect();
            let sensor_times: Vec<f64> = pulses.iter().map(|p| p.time).collect();

            output.flat_charges.extend_from_slice(&sensor_charges);
            output.flat_times.extend_from_slice(&sensor_times);
            output.per_sensor_charges.insert(key.clone(), sensor_charges);
            output.per_sensor_times.insert(key.clone(), sensor_times);
        }

        debug!(
            "Restructured pulse map: {} sensors, {} pulses",
            output.sensor_count(),
            output.total_pulses()
        );

        output
    }
}

/// Restructure a pulse-series map with the default [`PulseMapRestructurer`]
pub fn restructure<K: Ord + Clone>(pulse_map: &PulseSeriesMap<K>) -> RestructuredPulses<K> {
    PulseMapRestructurer::new().restructure(pulse_map)
}
