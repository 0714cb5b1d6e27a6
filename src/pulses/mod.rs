//! # Pulse-series maps
//!
//! Data model for per-sensor pulse series and the restructuring step that turns
//! them into flat and per-sensor scalar arrays.
//!
//! ## Layout
//!
//! For a map `{A: [(1.0, 10.0), (2.0, 20.0)], B: [(3.0, 30.0)]}` the
//! restructured output is:
//!
//! ```text
//! flat_charges       = [1.0, 2.0, 3.0]
//! flat_times         = [10.0, 20.0, 30.0]
//! per_sensor_charges = {A: [1.0, 2.0], B: [3.0]}
//! per_sensor_times   = {A: [10.0, 20.0], B: [30.0]}
//! ```
//!
//! Sensors are visited in key order and pulses keep their recorded order, so the
//! flat arrays are always the per-sensor arrays concatenated in key order.

mod boundary;
mod columns;
mod error;
mod restructure;
mod types;

#[cfg(test)]
mod tests;

pub use boundary::restructure_value;
pub use columns::{column_names, create_keyed_pulse_schema, create_pulse_schema};
pub use error::PulseMapError;
pub use restructure::{restructure, PulseMapRestructurer, RestructuredPulses, RestructuredTuple};
pub use types::{PulseRecord, PulseSeriesMap, SensorKey};
