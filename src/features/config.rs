use serde::{Deserialize, Serialize};

use super::error::FeatureError;

/// Number of values produced by [`DataFormat::PulseSummaryClipped`]
pub const PULSE_SUMMARY_LEN: usize = 9;

/// Per-sensor feature layout fed to the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    /// Charge histogram over `time_bins`
    ChargeBins,
    /// First pulse time and total offset, followed by the charge histogram
    ChargeBinsAndTimes,
    /// Total charge followed by charge-weighted time quantiles
    ChargeWeightedTimeQuantiles,
    /// Nine summary values from pulses within [-5000, 14000] ns
    #[default]
    PulseSummaryClipped,
}

/// How pulse times are made relative before feature extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeTimeMethod {
    /// Use absolute times
    #[default]
    None,
    /// Subtract each sensor's own first pulse time
    FirstLightAtDom,
    /// Subtract a charge-weighted quantile of all pulse times in the event
    WaveformQuantile,
}

/// Feature extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Layout of the per-sensor values
    pub data_format: DataFormat,

    /// Expected number of bins per sensor; checked against `data_format` if set
    pub num_bins: Option<usize>,

    /// Histogram bin edges in ns, strictly increasing
    pub time_bins: Vec<f64>,

    /// Charge quantiles for `charge_weighted_time_quantiles`, each in [0, 1]
    pub time_quantiles: Vec<f64>,

    /// Reference time subtracted from pulse times
    pub relative_time_method: RelativeTimeMethod,

    /// Quantile used by `RelativeTimeMethod::WaveformQuantile`
    pub waveform_quantile: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            data_format: DataFormat::default(),
            num_bins: None,
            time_bins: Vec::new(),
            time_quantiles: vec![0.1, 0.2, 0.5, 0.8],
            relative_time_method: RelativeTimeMethod::default(),
            waveform_quantile: 0.1,
        }
    }
}

impl FeatureConfig {
    /// Charge histogram over uniform bins from `start` to `stop` ns
    pub fn charge_bins(start: f64, stop: f64, num_bins: usize) -> Self {
        let width = (stop - start) / num_bins as f64;
        Self {
            data_format: DataFormat::ChargeBins,
            time_bins: (0..=num_bins).map(|i| start + i as f64 * width).collect(),
            ..Default::default()
        }
    }

    /// Charge-weighted time quantiles
    pub fn time_quantiles(quantiles: Vec<f64>) -> Self {
        Self {
            data_format: DataFormat::ChargeWeightedTimeQuantiles,
            time_quantiles: quantiles,
            ..Default::default()
        }
    }

    /// Number of values each sensor contributes under the configured format
    pub fn bins_per_sensor(&self) -> usize {
        let histogram_bins = self.time_bins.len().saturating_sub(1);
        match self.data_format {
            DataFormat::ChargeBins => histogram_bins,
            DataFormat::ChargeBinsAndTimes => histogram_bins + 2,
            DataFormat::ChargeWeightedTimeQuantiles => self.time_quantiles.len() + 1,
            DataFormat::PulseSummaryClipped => PULSE_SUMMARY_LEN,
        }
    }

    /// Check the settings needed by the configured format and time method
    pub fn validate(&self) -> Result<(), FeatureError> {
        match self.data_format {
            DataFormat::ChargeBins | DataFormat::ChargeBinsAndTimes => {
                if self.time_bins.len() < 2 {
                    return Err(FeatureError::InvalidConfig(format!(
                        "{:?} needs at least two time_bins edges, got {}",
                        self.data_format,
                        self.time_bins.len()
                    )));
                }
                if self.time_bins.iter().any(|e| !e.is_finite()) {
                    return Err(FeatureError::InvalidConfig(
                        "time_bins must be finite".to_string(),
                    ));
                }
                if self.time_bins.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(FeatureError::InvalidConfig(
                        "time_bins must be strictly increasing".to_string(),
                    ));
                }
            }
            DataFormat::ChargeWeightedTimeQuantiles => {
                if self.time_quantiles.is_empty() {
                    return Err(FeatureError::InvalidConfig(
                        "time_quantiles must not be empty".to_string(),
                    ));
                }
                if let Some(q) = self.time_quantiles.iter().find(|q| !(0.0..=1.0).contains(*q)) {
                    return Err(FeatureError::InvalidConfig(format!(
                        "time quantile {} outside [0, 1]",
                        q
                    )));
                }
            }
            DataFormat::PulseSummaryClipped => {}
        }

        if self.relative_time_method == RelativeTimeMethod::WaveformQuantile
            && !(0.0..=1.0).contains(&self.waveform_quantile)
        {
            return Err(FeatureError::InvalidConfig(format!(
                "waveform_quantile {} outside [0, 1]",
                self.waveform_quantile
            )));
        }

        if let Some(num_bins) = self.num_bins {
            let expected = self.bins_per_sensor();
            if num_bins != expected {
                return Err(FeatureError::InvalidConfig(format!(
                    "num_bins is {} but {:?} produces {} bins",
                    num_bins, self.data_format, expected
                )));
            }
        }

        Ok(())
    }
}
