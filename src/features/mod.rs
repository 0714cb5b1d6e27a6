//! # Feature extraction
//!
//! Builds the per-sensor input vectors of the reconstruction network from a
//! restructured pulse map. Each sensor's pulses are made relative to a reference
//! time ([`RelativeTimeMethod`]) and summarised according to a [`DataFormat`]
//! into a sparse [`BinnedValues`] vector.
//!
//! ```rust
//! use pulseprep::features::{extract_event_features, FeatureConfig};
//! use pulseprep::pulses::{PulseRecord, PulseSeriesMap, SensorKey};
//!
//! let mut map = PulseSeriesMap::new();
//! map.push(SensorKey::new(36, 10, 0), PulseRecord::new(1.2, 10_050.0));
//! map.push(SensorKey::new(36, 10, 0), PulseRecord::new(0.8, 10_320.0));
//!
//! let config = FeatureConfig::charge_bins(9_000.0, 15_000.0, 6);
//! let features = extract_event_features(&map, &config)?;
//! let binned = &features.sensors[&SensorKey::new(36, 10, 0)];
//! assert_eq!(binned.indices, vec![1]);
//! # Ok::<(), pulseprep::features::FeatureError>(())
//! ```

mod config;
mod error;
mod event;
mod formats;
mod relative_time;
pub mod stats;


pub use config::{DataFormat, FeatureConfig, RelativeTimeMethod, PULSE_SUMMARY_LEN};
pub use error::FeatureError;
pub use event::{extract_event_features, EventFeatures, FeatureExtractor, SensorId};
pub use formats::{BinnedValues, SensorPulses, CLIP_WINDOW_NS};
