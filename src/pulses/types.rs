use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PulseMapError;

/// A single detected pulse at a sensor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PulseRecord {
    /// Pulse charge in photoelectrons
    pub charge: f64,
    /// Pulse leading-edge time in nanoseconds
    pub time: f64,
    /// Pulse width in nanoseconds (carried through, never read by restructuring)
    #[serde(default)]
    pub width: f64,
    /// Detector-specific flag bits
    #[serde(default)]
    pub flags: u8,
}

impl PulseRecord {
    /// Create a pulse with zero width and no flags
    pub fn new(charge: f64, time: f64) -> Self {
        Self {
            charge,
            time,
            width: 0.0,
            flags: 0,
        }
    }
}

/// Identifier of an optical sensor: string, module on string, PMT in module.
///
/// Ordering is lexicographic over `(string, om, pmt)`, which is also the
/// iteration order of a [`PulseSeriesMap`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SensorKey {
    /// String (cable) number
    pub string: i32,
    /// Optical module number on the string
    pub om: u32,
    /// PMT number within the module
    #[serde(default)]
    pub pmt: u8,
}

impl SensorKey {
    /// Create a sensor key
    pub fn new(string: i32, om: u32, pmt: u8) -> Self {
        Self { string, om, pmt }
    }
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OMKey({},{},{})", self.string, self.om, self.pmt)
    }
}

impl SensorKey {
    /// Parses `"string,om,pmt"`, `"string,om"` or `"OMKey(string,om,pmt)"`.
    pub(crate) fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix("OMKey(")
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(trimmed);

        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 2 && parts.len() != 3 {
            return None;
        }

        let string = parts[0].parse::<i32>().ok()?;
        let om = parts[1].parse::<u32>().ok()?;
        let pmt = match parts.get(2) {
            Some(p) => p.parse::<u8>().ok()?,
            None => 0,
        };

        Some(Self { string, om, pmt })
    }
}

impl FromStr for SensorKey {
    type Err = PulseMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| PulseMapError::InvalidInput(format!("invalid sensor key '{}'", s)))
    }
}

/// Mapping from sensor to its time-ordered pulses.
///
/// Backed by a `BTreeMap`, so iteration visits sensors in ascending key order.
/// Pulse order within a sensor is insertion order and is never changed.
#[derive(Debug, Clone, PartialEq)]
pub struct PulseSeriesMap<K = SensorKey> {
    series: BTreeMap<K, Vec<PulseRecord>>,
}

impl<K: Ord> Default for PulseSeriesMap<K> {
    fn default() -> Self {
        Self {
            series: BTreeMap::new(),
        }
    }
}

impl<K: Ord> PulseSeriesMap<K> {
    /// Create an empty pulse-series map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the pulses of a sensor, returning the previous series if any
    pub fn insert(&mut self, key: K, pulses: Vec<PulseRecord>) -> Option<Vec<PulseRecord>> {
        self.series.insert(key, pulses)
    }

    /// Append a single pulse to a sensor's series
    pub fn push(&mut self, key: K, pulse: PulseRecord) {
        self.series.entry(key).or_default().push(pulse);
    }

    /// Pulses recorded at `key`
    pub fn get(&self, key: &K) -> Option<&[PulseRecord]> {
        self.series.get(key).map(Vec::as_slice)
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &K) -> bool {
        self.series.contains_key(key)
    }

    /// Number of sensors in the map
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// True if the map has no sensors
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of pulses across all sensors
    pub fn total_pulses(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    /// Iterate over `(sensor, pulses)` in key order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[PulseRecord])> {
        self.series.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Iterate over sensor keys in order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.series.keys()
    }
}

impl<K: Ord> FromIterator<(K, Vec<PulseRecord>)> for PulseSeriesMap<K> {
    fn from_iter<I: IntoIterator<Item = (K, Vec<PulseRecord>)>>(iter: I) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}

impl<K: Ord> From<BTreeMap<K, Vec<PulseRecord>>> for PulseSeriesMap<K> {
    fn from(series: BTreeMap<K, Vec<PulseRecord>>) -> Self {
        Self { series }
    }
}

impl<K> IntoIterator for PulseSeriesMap<K> {
    type Item = (K, Vec<PulseRecord>);
    type IntoIter = btree_map::IntoIter<K, Vec<PulseRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.into_iter()
    }
}
