use super::*;
use arrow::array::{Array, Float64Array, UInt32Array};
use serde_json::json;

fn key(om: u32) -> SensorKey {
    SensorKey::new(1, om, 0)
}

fn two_sensor_map() -> PulseSeriesMap {
    let mut map = PulseSeriesMap::new();
    map.insert(
        key(1),
        vec![PulseRecord::new(1.0, 10.0), PulseRecord::new(2.0, 20.0)],
    );
    map.insert(key(2), vec![PulseRecord::new(3.0, 30.0)]);
    map
}

#[test]
fn test_restructure_two_sensors() {
    let output = restructure(&two_sensor_map());

    assert_eq!(output.flat_charges, vec![1.0, 2.0, 3.0]);
    assert_eq!(output.flat_times, vec![10.0, 20.0, 30.0]);
    assert_eq!(output.per_sensor_charges[&key(1)], vec![1.0, 2.0]);
    assert_eq!(output.per_sensor_charges[&key(2)], vec![3.0]);
    assert_eq!(output.per_sensor_times[&key(1)], vec![10.0, 20.0]);
    assert_eq!(output.per_sensor_times[&key(2)], vec![30.0]);
}

#[test]
fn test_restructure_single_pulse_sensor() {
    let mut map = PulseSeriesMap::new();
    map.push(SensorKey::new(7, 42, 0), PulseRecord::new(5.5, 100.0));

    let (charges, times, dom_times, dom_charges) = restructure(&map).into_tuple();

    assert_eq!(charges, vec![5.5]);
    assert_eq!(times, vec![100.0]);
    assert_eq!(dom_charges[&SensorKey::new(7, 42, 0)], vec![5.5]);
    assert_eq!(dom_times[&SensorKey::new(7, 42, 0)], vec![100.0]);
}

#[test]
fn test_restructure_empty_map() {
    let output = restructure(&PulseSeriesMap::<SensorKey>::new());

    assert!(output.is_empty());
    assert!(output.flat_charges.is_empty());
    assert!(output.flat_times.is_empty());
    assert!(output.per_sensor_charges.is_empty());
    assert!(output.per_sensor_times.is_empty());
    assert_eq!(output, RestructuredPulses::default());
}

#[test]
fn test_sensor_without_pulses_is_kept() {
    let mut map = two_sensor_map();
    map.insert(key(3), Vec::new());

    let output = restructure(&map);

    assert_eq!(output.sensor_count(), 3);
    assert_eq!(output.total_pulses(), 3);
    assert!(output.per_sensor_charges[&key(3)].is_empty());
    assert!(output.per_sensor_times[&key(3)].is_empty());
}

#[test]
fn test_sensors_visited_in_key_order() {
    let mut map = PulseSeriesMap::new();
    map.insert(SensorKey::new(2, 1, 0), vec![PulseRecord::new(20.0, 2.0)]);
    map.insert(SensorKey::new(1, 60, 0), vec![PulseRecord::new(10.0, 1.0)]);
    map.insert(SensorKey::new(1, 5, 0), vec![PulseRecord::new(5.0, 0.5)]);

    let output = restructure(&map);

    assert_eq!(output.flat_charges, vec![5.0, 10.0, 20.0]);
    assert_eq!(output.flat_times, vec![0.5, 1.0, 2.0]);
}

#[test]
fn test_pulse_order_not_sorted() {
    // Output keeps recorded order even when times are not monotonic.
    let mut map = PulseSeriesMap::new();
    map.insert(
        key(1),
        vec![PulseRecord::new(1.0, 30.0), PulseRecord::new(2.0, 10.0)],
    );

    let output = restructure(&map);
    assert_eq!(output.flat_times, vec![30.0, 10.0]);
}

#[test]
fn test_output_independent_of_input() {
    let map = two_sensor_map();
    let output = restructure(&map);
    drop(map);

    assert_eq!(output.total_pulses(), 3);
}

#[test]
fn test_generic_key_type() {
    let map: PulseSeriesMap<&str> = [
        ("b", vec![PulseRecord::new(3.0, 30.0)]),
        (
            "a",
            vec![PulseRecord::new(1.0, 10.0), PulseRecord::new(2.0, 20.0)],
        ),
    ]
    .into_iter()
    .collect();

    let output = PulseMapRestructurer::new().restructure(&map);

    assert_eq!(output.flat_charges, vec![1.0, 2.0, 3.0]);
    assert_eq!(output.per_sensor_times["b"], vec![30.0]);
}

#[test]
fn test_sensor_ranges() {
    let mut map = two_sensor_map();
    map.insert(key(3), Vec::new());
    let output = restructure(&map);

    let ranges: Vec<_> = output.sensor_ranges().map(|(k, r)| (*k, r)).collect();
    assert_eq!(ranges, vec![(key(1), 0..2), (key(2), 2..3), (key(3), 3..3)]);
}

#[test]
fn test_sensor_key_parse() {
    assert_eq!("1,10,0".parse::<SensorKey>().unwrap(), SensorKey::new(1, 10, 0));
    assert_eq!("86, 60".parse::<SensorKey>().unwrap(), SensorKey::new(86, 60, 0));
    assert_eq!(
        "OMKey(-3,2,1)".parse::<SensorKey>().unwrap(),
        SensorKey::new(-3, 2, 1)
    );
    assert!("1".parse::<SensorKey>().is_err());
    assert!("a,b,c".parse::<SensorKey>().is_err());
    assert!("1,2,300".parse::<SensorKey>().is_err());
}

#[test]
fn test_sensor_key_display_roundtrip() {
    let k = SensorKey::new(12, 34, 1);
    assert_eq!(k.to_string(), "OMKey(12,34,1)");
    assert_eq!(k.to_string().parse::<SensorKey>().unwrap(), k);
}

#[test]
fn test_from_json_object_layout() {
    let value = json!({
        "1,2,0": [{"charge": 1.0, "time": 10.0}, [2.0, 20.0]],
        "1,1": [{"charge": 0.5, "time": 5.0, "width": 3.0, "flags": 2}]
    });

    let map = PulseSeriesMap::from_json_value(&value).unwrap();

    assert_eq!(map.len(), 2);
    assert_eq!(map.total_pulses(), 3);
    let first = map.get(&key(1)).unwrap();
    assert_eq!(first[0].width, 3.0);
    assert_eq!(first[0].flags, 2);
    assert_eq!(map.get(&key(2)).unwrap()[1], PulseRecord::new(2.0, 20.0));
}

#[test]
fn test_from_json_entry_layout() {
    let value = json!([
        {"key": {"string": 1, "om": 2, "pmt": 0}, "pulses": [[3.0, 30.0]]},
        {"key": [1, 1], "pulses": [[1.0, 10.0], [2.0, 20.0]]},
        {"key": "OMKey(1,3,0)", "pulses": []}
    ]);

    let output = restructure_value(&value).unwrap();

    assert_eq!(output.flat_charges, vec![1.0, 2.0, 3.0]);
    assert_eq!(output.sensor_count(), 3);
}

#[test]
fn test_json_roundtrip_through_entry_layout() {
    let map = two_sensor_map();
    let value = map.to_json_value();
    assert_eq!(PulseSeriesMap::from_json_value(&value).unwrap(), map);
}

#[test]
fn test_invalid_input_rejected() {
    let cases = vec![
        json!(42),
        json!("pulses"),
        json!({"1,1,0": 3.0}),
        json!({"1,1,0": [{"charge": "big", "time": 1.0}]}),
        json!({"1,1,0": [{"time": 1.0}]}),
        json!({"1,1,0": [[1.0, 2.0, 3.0]]}),
        json!({"not-a-key": []}),
        json!([{"pulses": []}]),
        json!([{"key": [1, 1], "pulses": []}, {"key": "1,1,0", "pulses": []}]),
        json!([{
            "key": {"string": 1, "om": 1},
            "pulses": [{"charge": 1.0, "time": 1.0, "flags": 999}]
        }]),
    ];

    for value in cases {
        let err = restructure_value(&value).unwrap_err();
        assert!(
            matches!(err, PulseMapError::InvalidInput(_)),
            "expected InvalidInput for {}, got {:?}",
            value,
            err
        );
    }
}

#[test]
fn test_repeated_key_in_json_text_rejected() {
    // `json!` cannot build an object with a repeated key, so go through text
    let text = r#"{"1,1,0": [[1.0, 10.0]], "1,1,0": [[2.0, 20.0], [3.0, 30.0]]}"#;

    let err = PulseSeriesMap::from_json_str(text).unwrap_err();
    match err {
        PulseMapError::InvalidInput(message) => {
            assert!(message.contains("duplicate sensor key"), "{}", message)
        }
        other => panic!("expected InvalidInput, got {:?}", other),
    }

    assert!(PulseSeriesMap::from_json_slice(text.as_bytes()).is_err());
}

#[test]
fn test_json_text_layouts() {
    let object = r#"{"1,2,0": [[3.0, 30.0]], "OMKey(1,1,0)": [{"charge": 1.0, "time": 10.0}]}"#;
    let map = PulseSeriesMap::from_json_str(object).unwrap();
    assert_eq!(restructure(&map).flat_charges, vec![1.0, 3.0]);

    let entries = r#"[{"key": [1, 2], "pulses": [[3.0, 30.0]]}, {"key": "1,1", "pulses": []}]"#;
    let map = PulseSeriesMap::from_json_slice(entries.as_bytes()).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.total_pulses(), 1);

    let err = PulseSeriesMap::from_json_str("42").unwrap_err();
    assert!(err.to_string().contains("expected pulse-series map, got number"), "{}", err);
}

#[test]
fn test_invalid_input_names_location() {
    let value = json!({"1,1,0": [[1.0, 2.0], {"charge": 1.0}]});
    let err = PulseSeriesMap::from_json_value(&value).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("[1]"), "{}", message);
    assert!(message.contains("time"), "{}", message);
}

#[test]
fn test_malformed_json_text() {
    let err = PulseSeriesMap::from_json_str("{\"1,1,0\": [").unwrap_err();
    assert!(matches!(err, PulseMapError::InvalidInput(_)));
}

#[test]
fn test_record_batch_export() {
    let output = restructure(&two_sensor_map());
    let batch = output.to_record_batch().unwrap();

    assert_eq!(batch.num_rows(), 3);
    assert_eq!(batch.num_columns(), 3);

    let sensor_index = batch
        .column(0)
        .as_any()
        .downcast_ref::<UInt32Array>()
        .unwrap();
    assert_eq!(sensor_index.values().to_vec(), vec![0, 0, 1]);

    let charge = batch
        .column_by_name(column_names::CHARGE)
        .unwrap()
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert_eq!(charge.values().to_vec(), vec![1.0, 2.0, 3.0]);
    assert_eq!(charge.null_count(), 0);
}

#[test]
fn test_keyed_record_batch_export() {
    let output = restructure(&two_sensor_map());
    let batch = output.to_keyed_record_batch().unwrap();

    assert_eq!(batch.num_rows(), 3);
    assert_eq!(batch.schema().fields().len(), 5);
    assert_eq!(
        batch.schema().field(4).metadata().get("unit").map(String::as_str),
        Some("ns")
    );
}

#[test]
fn test_record_batch_empty() {
    let output = restructure(&PulseSeriesMap::<SensorKey>::new());
    let batch = output.to_record_batch().unwrap();
    assert_eq!(batch.num_rows(), 0);
}
