//! Conversion of loosely-typed input into a validated [`PulseSeriesMap`].
//!
//! Two JSON layouts are accepted:
//!
//! ```text
//! {"1,10,0": [{"charge": 1.0, "time": 10.0}, [2.0, 20.0]], ...}
//! [{"key": {"string": 1, "om": 10, "pmt": 0}, "pulses": [...]}, ...]
//! ```
//!
//! A pulse is either an object with numeric `charge` and `time` (plus optional
//! `width` and `flags`) or a two-element `[charge, time]` array. The whole value
//! is validated before anything is restructured.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value};

use super::error::PulseMapError;
use super::restructure::{restructure, RestructuredPulses};
use super::types::{PulseRecord, PulseSeriesMap, SensorKey};

fn invalid(path: &str, message: impl std::fmt::Display) -> PulseMapError {
    PulseMapError::InvalidInput(format!("{}: {}", path, message))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn number_field(obj: &Map<String, Value>, field: &str, path: &str) -> Result<f64, PulseMapError> {
    match obj.get(field) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| invalid(path, format!("'{}' is not representable as f64", field))),
        Some(other) => Err(invalid(
            path,
            format!("'{}' must be a number, got {}", field, type_name(other)),
        )),
        None => Err(invalid(path, format!("missing '{}'", field))),
    }
}

fn parse_pulse(value: &Value, path: &str) -> Result<PulseRecord, PulseMapError> {
    match value {
        Value::Object(obj) => {
            let charge = number_field(obj, "charge", path)?;
            let time = number_field(obj, "time", path)?;
            let width = match obj.get("width") {
                None | Some(Value::Null) => 0.0,
                Some(_) => number_field(obj, "width", path)?,
            };
            let flags = match obj.get("flags") {
                None | Some(Value::Null) => 0,
                Some(v) => v
                    .as_u64()
                    .and_then(|f| u8::try_from(f).ok())
                    .ok_or_else(|| invalid(path, "'flags' must be an integer in 0..=255"))?,
            };
            Ok(PulseRecord {
                charge,
                time,
                width,
                flags,
            })
        }
        Value::Array(items) if items.len() == 2 => {
            let charge = items[0]
                .as_f64()
                .ok_or_else(|| invalid(path, "charge must be a number"))?;
            let time = items[1]
                .as_f64()
                .ok_or_else(|| invalid(path, "time must be a number"))?;
            Ok(PulseRecord::new(charge, time))
        }
        Value::Array(items) => Err(invalid(
            path,
            format!("pulse array must have 2 elements, got {}", items.len()),
        )),
        other => Err(invalid(
            path,
            format!("expected pulse object or [charge, time], got {}", type_name(other)),
        )),
    }
}

fn parse_series(value: &Value, path: &str) -> Result<Vec<PulseRecord>, PulseMapError> {
    let items = value.as_array().ok_or_else(|| {
        invalid(path, format!("expected array of pulses, got {}", type_name(value)))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_pulse(item, &format!("{}[{}]", path, i)))
        .collect()
}

fn parse_key(value: &Value, path: &str) -> Result<SensorKey, PulseMapError> {
    match value {
        Value::String(s) => {
            SensorKey::parse(s)
                .ok_or_else(|| invalid(path, format!("invalid sensor key '{}'", s)))
        }
        Value::Object(_) => {
            serde_json::from_value(value.clone())
                .map_err(|e| invalid(path, format!("invalid sensor key: {}", e)))
        }
        Value::Array(parts) if parts.len() == 2 || parts.len() == 3 => {
            let int = |i: usize| parts.get(i).and_then(Value::as_i64);
            let string = int(0)
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| invalid(path, "string must be a 32-bit integer"))?;
            let om = int(1)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| invalid(path, "om must be a non-negative integer"))?;
            let pmt = match parts.get(2) {
                Some(_) => int(2)
                    .and_then(|v| u8::try_from(v).ok())
                    .ok_or_else(|| invalid(path, "pmt must be an integer in 0..=255"))?,
                None => 0,
            };
            Ok(SensorKey::new(string, om, pmt))
        }
        other => Err(invalid(
            path,
            format!("expected sensor key, got {}", type_name(other)),
        )),
    }
}

fn insert_unique(
    map: &mut PulseSeriesMap<SensorKey>,
    key: SensorKey,
    pulses: Vec<PulseRecord>,
    path: &str,
) -> Result<(), PulseMapError> {
    if map.contains_key(&key) {
        return Err(invalid(path, format!("duplicate sensor key {}", key)));
    }
    map.insert(key, pulses);
    Ok(())
}

/// Top-level layout of JSON text, read before object keys are merged.
///
/// `serde_json::Value` keeps only the last of repeated object keys, so text
/// input is walked entry by entry to let repeated keys reach [`insert_unique`].
enum RawLayout {
    Object(Vec<(String, Value)>),
    Entries(Vec<Value>),
    Other(&'static str),
}

struct RawLayoutVisitor;

impl<'de> Visitor<'de> for RawLayoutVisitor {
    type Value = RawLayout;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a pulse-series map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawLayout, A::Error> {
        let mut entries = Vec::new();
        while let Some(entry) = access.next_entry::<String, Value>()? {
            entries.push(entry);
        }
        Ok(RawLayout::Object(entries))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<RawLayout, A::Error> {
        let mut entries = Vec::new();
        while let Some(entry) = access.next_element::<Value>()? {
            entries.push(entry);
        }
        Ok(RawLayout::Entries(entries))
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawLayout, E> {
        Ok(RawLayout::Other("null"))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<RawLayout, E> {
        Ok(RawLayout::Other("bool"))
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<RawLayout, E> {
        Ok(RawLayout::Other("number"))
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<RawLayout, E> {
        Ok(RawLayout::Other("number"))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<RawLayout, E> {
        Ok(RawLayout::Other("number"))
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<RawLayout, E> {
        Ok(RawLayout::Other("string"))
    }
}

impl<'de> Deserialize<'de> for RawLayout {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawLayoutVisitor)
    }
}

fn from_object_entries<'a>(
    entries: impl Iterator<Item = (&'a String, &'a Value)>,
) -> Result<PulseSeriesMap<SensorKey>, PulseMapError> {
    let mut map = PulseSeriesMap::new();
    for (raw_key, series) in entries {
        let path = format!("$[{:?}]", raw_key);
        let key = SensorKey::parse(raw_key)
            .ok_or_else(|| invalid(&path, format!("invalid sensor key '{}'", raw_key)))?;
        let pulses = parse_series(series, &path)?;
        insert_unique(&mut map, key, pulses, &path)?;
    }
    Ok(map)
}

fn from_entry_array(entries: &[Value]) -> Result<PulseSeriesMap<SensorKey>, PulseMapError> {
    let mut map = PulseSeriesMap::new();
    for (i, entry) in entries.iter().enumerate() {
        let path = format!("$[{}]", i);
        let obj = entry.as_object().ok_or_else(|| {
            let got = type_name(entry);
            invalid(&path, format!("expected {{key, pulses}} entry, got {}", got))
        })?;
        let key = obj
            .get("key")
            .ok_or_else(|| invalid(&path, "missing 'key'"))
            .and_then(|k| parse_key(k, &format!("{}.key", path)))?;
        let series = obj
            .get("pulses")
            .ok_or_else(|| invalid(&path, "missing 'pulses'"))?;
        let pulses = parse_series(series, &format!("{}.pulses", path))?;
        insert_unique(&mut map, key, pulses, &path)?;
    }
    Ok(map)
}

fn not_a_map(type_name: &str) -> PulseMapError {
    invalid("$", format!("expected pulse-series map, got {}", type_name))
}

impl PulseSeriesMap<SensorKey> {
    /// Validate and convert a JSON value into a pulse-series map.
    ///
    /// Fails with [`PulseMapError::InvalidInput`] naming the offending element
    /// if the value has any other shape.
    pub fn from_json_value(value: &Value) -> Result<Self, PulseMapError> {
        match value {
            Value::Object(entries) => from_object_entries(entries.iter()),
            Value::Array(entries) => from_entry_array(entries),
            other => Err(not_a_map(type_name(other))),
        }
    }

    /// Parse JSON text and validate it as a pulse-series map.
    ///
    /// Unlike [`Self::from_json_value`], a sensor key repeated verbatim in the
    /// text is seen and rejected.
    pub fn from_json_str(s: &str) -> Result<Self, PulseMapError> {
        let raw: RawLayout = serde_json::from_str(s)?;
        Self::from_raw_layout(raw)
    }

    /// Parse JSON bytes and validate them as a pulse-series map
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, PulseMapError> {
        let raw: RawLayout = serde_json::from_slice(bytes)?;
        Self::from_raw_layout(raw)
    }

    fn from_raw_layout(raw: RawLayout) -> Result<Self, PulseMapError> {
        match raw {
            RawLayout::Object(entries) => {
                from_object_entries(entries.iter().map(|(k, v)| (k, v)))
            }
            RawLayout::Entries(entries) => from_entry_array(&entries),
            RawLayout::Other(type_name) => Err(not_a_map(type_name)),
        }
    }

    /// Serialize to the `[{key, pulses}]` layout accepted by [`Self::from_json_value`]
    pub fn to_json_value(&self) -> Value {
        let entries = self
            .iter()
            .map(|(key, pulses)| {
                serde_json::json!({
                    "key": key,
                    "pulses": pulses,
                })
            })
            .collect();
        Value::Array(entries)
    }
}

/// Validate an opaque JSON value and restructure it.
///
/// No partial output is produced: validation of the whole value happens before
/// the traversal starts.
pub fn restructure_value(value: &Value) -> Result<RestructuredPulses<SensorKey>, PulseMapError> {
    let map = PulseSeriesMap::from_json_value(value)?;
    Ok(restructure(&map))
}
