#![no_main]
use libfuzzer_sys::fuzz_target;
use lz4bridge::block::{decompress_known_size, decompress_safe};

// Arbitrary bytes must decode or fail cleanly, never read or write out of
// bounds, for any destination size.
fuzz_target!(|data: &[u8]| {
    for cap in [0usize, 1, 4096, data.len(), data.len().saturating_mul(255).min(1 << 20)] {
        let mut dst = vec![0u8; cap];
        if let Ok(n) = decompress_safe(data, &mut dst) {
            assert!(n <= cap);
        }
        if let Ok(consumed) = decompress_known_size(data, &mut dst) {
            assert!(consumed <= data.len());
        }
    }
});
