#![no_main]

use libfuzzer_sys::fuzz_target;
use sedd_core::{ChangeDetector, DetectorPhase, SeddConfig, SpectralDriftDetector};

fn config_from(header: &[u8]) -> SeddConfig {
    SeddConfig {
        bit_width: 4 + u32::from(header[0] % 29),
        window_size: 32 << (header[1] % 6),
        magnitude: 0.01 + f64::from(header[2]) / 255.0 * 0.99,
    }
}

/// Map one byte to an input value, biased toward the expected 0/1 outcomes
/// but also covering out-of-contract values.
fn value_from(byte: u8) -> f64 {
    match byte % 16 {
        0..=6 => 0.0,
        7..=13 => 1.0,
        14 => f64::from(byte) - 128.0,
        _ => match byte >> 4 {
            0 => f64::NAN,
            1 => f64::INFINITY,
            2 => f64::NEG_INFINITY,
            _ => f64::from(byte) / 255.0,
        },
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let (header, stream) = data.split_at(3);
    let config = config_from(header);
    let Ok(mut detector) = SpectralDriftDetector::new(config) else {
        return;
    };

    let mut prev_drift = false;
    for &byte in stream {
        if byte == 0xff {
            detector.reset();
            assert!(!detector.change_detected());
            assert_eq!(detector.upper_bound(), 0.0);
            continue;
        }

        detector.push(value_from(byte));

        let upper = detector.upper_bound();
        let lower = detector.lower_bound();
        assert!(lower <= upper);
        assert!((0.0..1.0).contains(&upper));
        assert!(detector.window_len() <= config.window_size);
        if detector.drift_detected() {
            assert!(upper - lower >= config.magnitude);
            assert_eq!(detector.phase(), DetectorPhase::Sliding);
        }
        if prev_drift {
            assert!(!detector.drift_detected());
        }
        prev_drift = detector.drift_detected();
    }

    let snapshot = detector.snapshot();
    assert_eq!(snapshot.samples_seen, detector.samples_seen());
    assert!(snapshot.last_entropy.is_none_or(f64::is_finite));
});
