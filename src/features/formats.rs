use serde::{Deserialize, Serialize};

use super::config::{DataFormat, FeatureConfig, PULSE_SUMMARY_LEN};
use super::error::FeatureError;
use super::stats::{weighted_histogram, weighted_mean, weighted_quantile, weighted_std};

/// Pulses outside this relative-time window are ignored by the clipped summary
pub const CLIP_WINDOW_NS: (f64, f64) = (-5000.0, 14000.0);

const QUANTILE_EPSILON: f64 = 1e-6;

/// Sparse per-sensor feature vector: non-zero bin values and their indices
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BinnedValues {
    /// Bin values
    pub values: Vec<f64>,
    /// Bin index of each value
    pub indices: Vec<usize>,
}

impl BinnedValues {
    fn push(&mut self, index: usize, value: f64) {
        self.indices.push(index);
        self.values.push(value);
    }

    /// Number of stored bins
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no bins are stored
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Expand into a dense vector of `num_bins` values; indices beyond
    /// `num_bins` are ignored
    pub fn to_dense(&self, num_bins: usize) -> Vec<f64> {
        let mut dense = vec![0.0; num_bins];
        for (&i, &v) in self.indices.iter().zip(&self.values) {
            if let Some(slot) = dense.get_mut(i) {
                *slot = v;
            }
        }
        dense
    }
}

/// Pulses of one sensor, with times already relative to
/// `global_time_offset + local_time_offset`
#[derive(Debug, Clone, Copy)]
pub struct SensorPulses<'a> {
    /// Pulse charges
    pub charges: &'a [f64],
    /// Pulse times relative to the total offset
    pub rel_times: &'a [f64],
    /// Offset shared by all sensors of the event
    pub global_time_offset: f64,
    /// Offset specific to this sensor
    pub local_time_offset: f64,
}

impl<'a> SensorPulses<'a> {
    /// Pair up charges and relative times, checking lengths agree
    pub fn new(
        charges: &'a [f64],
        rel_times: &'a [f64],
        global_time_offset: f64,
        local_time_offset: f64,
    ) -> Result<Self, FeatureError> {
        if charges.len() != rel_times.len() {
            return Err(FeatureError::LengthMismatch {
                charges: charges.len(),
                times: rel_times.len(),
            });
        }
        Ok(Self {
            charges,
            rel_times,
            global_time_offset,
            local_time_offset,
        })
    }

    fn total_time_offset(&self) -> f64 {
        self.global_time_offset + self.local_time_offset
    }
}

impl DataFormat {
    /// Compute this format's values for one sensor
    pub fn compute(
        &self,
        pulses: &SensorPulses<'_>,
        config: &FeatureConfig,
    ) -> Result<BinnedValues, FeatureError> {
        match self {
            DataFormat::ChargeBins => Ok(charge_bins(pulses, config, 0)),
            DataFormat::ChargeBinsAndTimes => charge_bins_and_times(pulses, config),
            DataFormat::ChargeWeightedTimeQuantiles => {
                charge_weighted_time_quantiles(pulses, config)
            }
            DataFormat::PulseSummaryClipped => pulse_summary_clipped(pulses),
        }
    }
}

fn charge_bins(
    pulses: &SensorPulses<'_>,
    config: &FeatureConfig,
    index_offset: usize,
) -> BinnedValues {
    let hist = weighted_histogram(pulses.rel_times, pulses.charges, &config.time_bins);

    let mut out = BinnedValues::default();
    for (i, charge) in hist.into_iter().enumerate() {
        if charge != 0.0 {
            out.push(i + index_offset, charge);
        }
    }
    out
}

fn charge_bins_and_times(
    pulses: &SensorPulses<'_>,
    config: &FeatureConfig,
) -> Result<BinnedValues, FeatureError> {
    let first = *pulses.rel_times.first().ok_or(FeatureError::EmptySeries)?;
    let total_time_offset = pulses.total_time_offset();

    let mut out = BinnedValues::default();
    out.push(0, first + total_time_offset);
    out.push(1, total_time_offset);

    let hist = charge_bins(pulses, config, 2);
    out.indices.extend(hist.indices);
    out.values.extend(hist.values);
    Ok(out)
}

fn charge_weighted_time_quantiles(
    pulses: &SensorPulses<'_>,
    config: &FeatureConfig,
) -> Result<BinnedValues, FeatureError> {
    if pulses.charges.is_empty() {
        return Err(FeatureError::EmptySeries);
    }

    let total_charge: f64 = pulses.charges.iter().sum();
    if total_charge == 0.0 {
        return Err(FeatureError::ZeroCharge);
    }

    // cumulative charge in recorded pulse order, not sorted by time
    let cumulative: Vec<f64> = pulses
        .charges
        .iter()
        .scan(0.0, |acc, &q| {
            *acc += q;
            Some(*acc / total_charge)
        })
        .collect();

    let mut out = BinnedValues::default();
    out.push(0, total_charge);

    for (i, &q) in config.time_quantiles.iter().enumerate() {
        let pos = cumulative
            .iter()
            .position(|&c| c >= q - QUANTILE_EPSILON)
            .unwrap_or(cumulative.len() - 1);
        out.push(i + 1, pulses.rel_times[pos]);
    }

    Ok(out)
}

fn pulse_summary_clipped(pulses: &SensorPulses<'_>) -> Result<BinnedValues, FeatureError> {
    let (lower, upper) = CLIP_WINDOW_NS;
    let (times, charges): (Vec<f64>, Vec<f64>) = pulses
        .rel_times
        .iter()
        .zip(pulses.charges)
        .filter(|&(&t, _)| t >= lower && t <= upper)
        .map(|(&t, &q)| (t, q))
        .unzip();

    let (first, last) = match (times.first(), times.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(FeatureError::EmptySeries),
    };

    let charge_sum: f64 = charges.iter().sum();
    let charge_within = |window: f64| -> f64 {
        times
            .iter()
            .zip(&charges)
            .filter(|&(&t, _)| t - first < window)
            .map(|(_, &q)| q)
            .sum()
    };

    let mean = weighted_mean(&times, &charges).ok_or(FeatureError::ZeroCharge)?;
    let std = weighted_std(&times, &charges).ok_or(FeatureError::ZeroCharge)?;
    let quantile20 = weighted_quantile(&times, &charges, 0.2).ok_or(FeatureError::ZeroCharge)?;
    let quantile50 = weighted_quantile(&times, &charges, 0.5).ok_or(FeatureError::ZeroCharge)?;

    let values = vec![
        charge_sum,
        charge_within(500.0),
        charge_within(100.0),
        first,
        quantile20,
        quantile50,
        last,
        mean,
        std,
    ];
    debug_assert_eq!(values.len(), PULSE_SUMMARY_LEN);

    Ok(BinnedValues {
        indices: (0..values.len()).collect(),
        values,
    })
}
