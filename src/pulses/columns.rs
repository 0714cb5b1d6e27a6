//! Typed column buffers for restructured pulses.
//!
//! Downstream numerical code usually wants contiguous `f64` buffers rather than
//! nested collections. These helpers expose the flat arrays of a
//! [`RestructuredPulses`] as Arrow arrays and record batches, using the "long"
//! layout: one row per pulse, with the sensor repeated on every row.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int32Array, UInt32Array, UInt8Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaBuilder};
use arrow::record_batch::RecordBatch;

use super::error::PulseMapError;
use super::restructure::RestructuredPulses;
use super::types::SensorKey;

/// Column names as constants for type safety
pub mod column_names {
    /// Position of the pulse's sensor in key order
    pub const SENSOR_INDEX: &str = "sensor_index";
    /// String number of the sensor
    pub const STRING: &str = "string";
    /// Optical module number of the sensor
    pub const OM: &str = "om";
    /// PMT number of the sensor
    pub const PMT: &str = "pmt";
    /// Pulse charge in photoelectrons
    pub const CHARGE: &str = "charge";
    /// Pulse time in nanoseconds
    pub const TIME: &str = "time";
}

fn field_with_unit(name: &str, data_type: DataType, unit: &str) -> Field {
    let mut metadata = HashMap::new();
    metadata.insert("unit".to_string(), unit.to_string());
    Field::new(name, data_type, false).with_metadata(metadata)
}

fn pulse_value_fields(builder: &mut SchemaBuilder) {
    builder.push(field_with_unit(column_names::CHARGE, DataType::Float64, "PE"));
    builder.push(field_with_unit(column_names::TIME, DataType::Float64, "ns"));
}

/// Schema with a generic sensor index column
pub fn create_pulse_schema() -> Schema {
    let mut builder = SchemaBuilder::new();
    builder.push(Field::new(column_names::SENSOR_INDEX, DataType::UInt32, false));
    pulse_value_fields(&mut builder);
    builder.finish()
}

/// Schema with the sensor key spelled out as string/om/pmt columns
pub fn create_keyed_pulse_schema() -> Schema {
    let mut builder = SchemaBuilder::new();
    builder.push(Field::new(column_names::STRING, DataType::Int32, false));
    builder.push(Field::new(column_names::OM, DataType::UInt32, false));
    builder.push(Field::new(column_names::PMT, DataType::UInt8, false));
    pulse_value_fields(&mut builder);
    builder.finish()
}

impl<K: Ord> RestructuredPulses<K> {
    /// Flat charges as an Arrow array
    pub fn charge_array(&self) -> Float64Array {
        Float64Array::from(self.flat_charges.clone())
    }

    /// Flat times as an Arrow array
    pub fn time_array(&self) -> Float64Array {
        Float64Array::from(self.flat_times.clone())
    }

    /// For every pulse, the position of its sensor in key order
    pub fn sensor_index_array(&self) -> Result<UInt32Array, PulseMapError> {
        let mut indices = Vec::with_capacity(self.total_pulses());
        for (i, (_, range)) in self.sensor_ranges().enumerate() {
            let index = u32::try_from(i).map_err(|_| {
                PulseMapError::InvalidInput(format!("sensor count {} exceeds u32 range", i))
            })?;
            indices.extend(std::iter::repeat(index).take(range.len()));
        }
        Ok(UInt32Array::from(indices))
    }

    /// One row per pulse: sensor index, charge, time
    pub fn to_record_batch(&self) -> Result<RecordBatch, PulseMapError> {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(self.sensor_index_array()?),
            Arc::new(self.charge_array()),
            Arc::new(self.time_array()),
        ];
        Ok(RecordBatch::try_new(Arc::new(create_pulse_schema()), arrays)?)
    }
}

impl RestructuredPulses<SensorKey> {
    /// One row per pulse: string, om, pmt, charge, time
    pub fn to_keyed_record_batch(&self) -> Result<RecordBatch, PulseMapError> {
        let total = self.total_pulses();
        let mut strings = Vec::with_capacity(total);
        let mut oms = Vec::with_capacity(total);
        let mut pmts = Vec::with_capacity(total);

        for (key, range) in self.sensor_ranges() {
            let n = range.len();
            strings.extend(std::iter::repeat(key.string).take(n));
            oms.extend(std::iter::repeat(key.om).take(n));
            pmts.extend(std::iter::repeat(key.pmt).take(n));
        }

        let arrays: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(strings)),
            Arc::new(UInt32Array::from(oms)),
            Arc::new(UInt8Array::from(pmts)),
            Arc::new(self.charge_array()),
            Arc::new(self.time_array()),
        ];
        Ok(RecordBatch::try_new(Arc::new(create_keyed_pulse_schema()), arrays)?)
    }
}
