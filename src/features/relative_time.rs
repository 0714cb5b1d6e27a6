use super::config::{FeatureConfig, RelativeTimeMethod};
use super::error::FeatureError;
use super::stats::weighted_quantile;
use crate::pulses::RestructuredPulses;

impl RelativeTimeMethod {
    /// Offset shared by every sensor of the event, from the flat arrays
    pub fn global_offset<K: Ord>(
        &self,
        pulses: &RestructuredPulses<K>,
        config: &FeatureConfig,
    ) -> Result<f64, FeatureError> {
        match self {
            RelativeTimeMethod::None | RelativeTimeMethod::FirstLightAtDom => Ok(0.0),
            RelativeTimeMethod::WaveformQuantile => {
                if pulses.flat_times.is_empty() {
                    return Ok(0.0);
                }
                weighted_quantile(
                    &pulses.flat_times,
                    &pulses.flat_charges,
                    config.waveform_quantile,
                )
                .ok_or(FeatureError::ZeroCharge)
            }
        }
    }

    /// Offset for one sensor given its pulse times in recorded order
    pub fn local_offset(&self, sensor_times: &[f64]) -> f64 {
        match self {
            RelativeTimeMethod::FirstLightAtDom => sensor_times.first().copied().unwrap_or(0.0),
            RelativeTimeMethod::None | RelativeTimeMethod::WaveformQuantile => 0.0,
        }
    }
}
