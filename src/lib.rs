//! # pulseprep - Pulse-Series Restructuring for DNN Reconstruction
//!
//! `pulseprep` turns a detector event's pulse-series map (sensor key to a
//! time-ordered list of pulses) into the flat and per-sensor arrays consumed by
//! the feature extraction of a learned reconstruction model.
//!
//! ## Key Features
//!
//! - **Restructuring**: One pass over the map yields flat charge and time arrays
//!   aligned index-for-index, plus per-sensor charge and time arrays.
//!
//! - **Validated Boundary**: Loosely-typed input (JSON, or Python objects with the
//!   `python` feature) is checked in full before any work is done; malformed
//!   input is rejected with an `InvalidInput` error.
//!
//! - **Typed Buffers**: Restructured pulses export to Arrow arrays and record
//!   batches for zero-copy hand-off to numerical code.
//!
//! - **Feature Extraction**: Charge histograms, charge-weighted time quantiles
//!   and clipped pulse summaries per sensor, configured from TOML.
//!
//! ## Quick Start
//!
//! ```rust
//! use pulseprep::pulses::{restructure, PulseRecord, PulseSeriesMap, SensorKey};
//!
//! let mut map = PulseSeriesMap::new();
//! map.insert(
//!     SensorKey::new(1, 1, 0),
//!     vec![PulseRecord::new(1.0, 10.0), PulseRecord::new(2.0, 20.0)],
//! );
//! map.insert(SensorKey::new(1, 2, 0), vec![PulseRecord::new(3.0, 30.0)]);
//!
//! let output = restructure(&map);
//! assert_eq!(output.flat_charges, vec![1.0, 2.0, 3.0]);
//! assert_eq!(output.flat_times, vec![10.0, 20.0, 30.0]);
//! assert_eq!(output.per_sensor_charges[&SensorKey::new(1, 1, 0)], vec![1.0, 2.0]);
//! ```
//!
//! ## From JSON
//!
//! ```rust
//! use pulseprep::pulses::restructure_value;
//!
//! let value = serde_json::json!({"1,1,0": [[1.0, 10.0]], "1,2,0": [[3.0, 30.0]]});
//! let output = restructure_value(&value)?;
//! assert_eq!(output.total_pulses(), 2);
//!
//! assert!(restructure_value(&serde_json::json!([1, 2, 3])).is_err());
//! # Ok::<(), pulseprep::pulses::PulseMapError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`pulses`]: Data model, restructuring, boundary validation, Arrow export
//! - [`features`]: Per-sensor feature formats and relative-time methods
//! - [`config`]: TOML configuration

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod features;
pub mod pulses;

// Python bindings module (only compiled with the "python" feature)
#[cfg(feature = "python")]
mod python;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{Config, ConfigError};
    pub use crate::features::{
        extract_event_features, BinnedValues, DataFormat, EventFeatures, FeatureConfig,
        FeatureError, FeatureExtractor, RelativeTimeMethod,
    };
    pub use crate::pulses::{
        restructure, restructure_value, PulseMapError, PulseMapRestructurer, PulseRecord,
        PulseSeriesMap, RestructuredPulses, SensorKey,
    };
}
