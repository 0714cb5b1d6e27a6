use std::collections::BTreeMap;
use std::fmt;

use log::{debug, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::FeatureConfig;
use super::error::FeatureError;
use super::formats::{BinnedValues, SensorPulses};
use crate::pulses::{PulseMapRestructurer, PulseSeriesMap, RestructuredPulses};

/// Bounds on sensor keys accepted by feature extraction
#[cfg(feature = "parallel")]
pub trait SensorId: Ord + Clone + fmt::Debug + Send + Sync {}
#[cfg(feature = "parallel")]
impl<T: Ord + Clone + fmt::Debug + Send + Sync> SensorId for T {}

/// Bounds on sensor keys accepted by feature extraction
#[cfg(not(feature = "parallel"))]
pub trait SensorId: Ord + Clone + fmt::Debug {}
#[cfg(not(feature = "parallel"))]
impl<T: Ord + Clone + fmt::Debug> SensorId for T {}

/// Features of one event
#[derive(Debug, Clone, PartialEq)]
pub struct EventFeatures<K> {
    /// Offset subtracted from every pulse time of the event
    pub global_time_offset: f64,
    /// Sparse feature vector of each sensor that had usable pulses
    pub sensors: BTreeMap<K, BinnedValues>,
}

impl<K: Ord> EventFeatures<K> {
    /// Dense `(sensor, values)` rows of `num_bins` values each, in key order
    pub fn dense_rows(&self, num_bins: usize) -> Vec<(&K, Vec<f64>)> {
        self.sensors
            .iter()
            .map(|(key, binned)| (key, binned.to_dense(num_bins)))
            .collect()
    }
}

/// Turns pulse-series maps into per-sensor feature vectors
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: FeatureConfig,
    restructurer: PulseMapRestructurer,
}

impl FeatureExtractor {
    /// Create an extractor, validating `config`
    pub fn new(config: FeatureConfig) -> Result<Self, FeatureError> {
        config.validate()?;
        Ok(Self {
            config,
            restructurer: PulseMapRestructurer::new(),
        })
    }

    /// The active configuration
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Restructure `pulse_map` and extract features for each sensor
    pub fn extract<K: SensorId>(
        &self,
        pulse_map: &PulseSeriesMap<K>,
    ) -> Result<EventFeatures<K>, FeatureError> {
        let pulses = self.restructurer.restructure(pulse_map);
        self.extract_restructured(&pulses)
    }

    /// Extract features from an already restructured pulse map.
    ///
    /// Sensors left without pulses (either empty in the input or after
    /// clipping) are skipped; any other failure aborts the event.
    pub fn extract_restructured<K: SensorId>(
        &self,
        pulses: &RestructuredPulses<K>,
    ) -> Result<EventFeatures<K>, FeatureError> {
        let method = self.config.relative_time_method;
        let global_time_offset = method.global_offset(pulses, &self.config)?;

        let sensors: Vec<(&K, &Vec<f64>, &Vec<f64>)> = pulses
            .per_sensor_charges
            .iter()
            .filter_map(|(key, charges)| {
                pulses
                    .per_sensor_times
                    .get(key)
                    .map(|times| (key, charges, times))
            })
            .collect();

        #[cfg(feature = "parallel")]
        let computed: Vec<(K, Option<BinnedValues>)> = sensors
            .into_par_iter()
            .map(|(key, charges, times)| {
                self.sensor_features(key, charges, times, global_time_offset)
            })
            .collect::<Result<_, _>>()?;

        #[cfg(not(feature = "parallel"))]
        let computed: Vec<(K, Option<BinnedValues>)> = sensors
            .into_iter()
            .map(|(key, charges, times)| {
                self.sensor_features(key, charges, times, global_time_offset)
            })
            .collect::<Result<_, _>>()?;

        let sensors: BTreeMap<K, BinnedValues> = computed
            .into_iter()
            .filter_map(|(key, binned)| binned.map(|b| (key, b)))
            .collect();

        debug!(
            "Extracted {:?} features for {} of {} sensors (global offset {:.1} ns)",
            self.config.data_format,
            sensors.len(),
            pulses.sensor_count(),
            global_time_offset
        );

        Ok(EventFeatures {
            global_time_offset,
            sensors,
        })
    }

    fn sensor_features<K: SensorId>(
        &self,
        key: &K,
        charges: &[f64],
        times: &[f64],
        global_time_offset: f64,
    ) -> Result<(K, Option<BinnedValues>), FeatureError> {
        let wrap = |source: FeatureError| FeatureError::Sensor {
            sensor: format!("{:?}", key),
            source: Box::new(source),
        };

        if charges.is_empty() {
            warn!("Skipping sensor {:?}: no pulses", key);
            return Ok((key.clone(), None));
        }

        let local_time_offset = self.config.relative_time_method.local_offset(times);
        let total_offset = global_time_offset + local_time_offset;
        let rel_times: Vec<f64> = times.iter().map(|t| t - total_offset).collect();

        let sensor =
            SensorPulses::new(charges, &rel_times, global_time_offset, local_time_offset)
                .map_err(wrap)?;

        match self.config.data_format.compute(&sensor, &self.config) {
            Ok(binned) => Ok((key.clone(), Some(binned))),
            Err(FeatureError::EmptySeries) => {
                warn!("Skipping sensor {:?}: no pulses inside the feature window", key);
                Ok((key.clone(), None))
            }
            Err(e) => Err(wrap(e)),
        }
    }
}

/// Restructure `pulse_map` and extract its features under `config`
pub fn extract_event_features<K: SensorId>(
    pulse_map: &PulseSeriesMap<K>,
    config: &FeatureConfig,
) -> Result<EventFeatures<K>, FeatureError> {
    FeatureExtractor::new(config.clone())?.extract(pulse_map)
}
