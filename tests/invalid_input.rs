//! Malformed input against the global engine.
//!
//! Kept in its own test binary so nothing else touches the global engine's
//! counters.

use libpostal_parser::{parse_address_bytes, Engine, ParseOptions};

#[test]
fn test_invalid_encoding_never_reaches_libpostal() {
    let inputs: [&[u8]; 3] = [
        b"781 Franklin Ave \xc3",
        b"\xff\xfe Brooklyn",
        b"Rue de la Paix \x80 Paris",
    ];

    for input in inputs {
        let components = parse_address_bytes(input, &ParseOptions::default()).unwrap();
        assert!(components.is_empty());
    }

    let engine = Engine::global();
    let stats = engine.stats();
    assert_eq!(stats.rejected_inputs, 3);
    assert_eq!(stats.native_parses, 0);
    assert_eq!(stats.setup_calls, 0);
    assert!(!engine.is_initialized());
}
