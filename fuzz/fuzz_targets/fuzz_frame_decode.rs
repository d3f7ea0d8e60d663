//! Fuzz target: AHT20 frame decode and payload construction.
//!
//! Drives arbitrary bytes through `decode_frame` + `build_payload` and
//! asserts the decode is total (never panics, always in physical range)
//! and the payload never exceeds its bounded buffer.
//!
//! cargo fuzz run fuzz_frame_decode

#![no_main]

use hygrolink::app::measurement::{build_payload, FailurePolicy, PAYLOAD_CAP};
use hygrolink::sensors::aht20::decode_frame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 6 {
        return;
    }
    let mut frame = [0u8; 6];
    frame.copy_from_slice(&data[..6]);

    let m = decode_frame(&frame);
    assert!((-50.0..=150.0).contains(&m.temperature_c));
    assert!((0.0..=100.0).contains(&m.humidity_pct));

    for policy in [FailurePolicy::SentinelOnly, FailurePolicy::NonPositive] {
        let payload = build_payload(&m, policy);
        assert!(!payload.is_empty());
        assert!(payload.len() <= PAYLOAD_CAP);
    }
});
