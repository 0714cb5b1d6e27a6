#![no_main]

use libfuzzer_sys::fuzz_target;
use pulseprep::pulses::{restructure, PulseSeriesMap};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must either be rejected as invalid input or produce a
    // map whose restructured arrays are consistent - never a panic.
    if let Ok(map) = PulseSeriesMap::from_json_slice(data) {
        let output = restructure(&map);
        assert_eq!(output.flat_charges.len(), output.flat_times.len());
        assert_eq!(output.flat_charges.len(), map.total_pulses());
        assert_eq!(output.sensor_count(), map.len());
    }
});
