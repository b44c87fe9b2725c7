// Integration tests for src/handle.rs: handle validation across the boundary.

use std::sync::{Arc, Barrier};
use std::thread;

use lz4bridge::bridge::{self, Hash32Handle, Hash64Handle, CompressionHandle};
use lz4bridge::handle::{Registry, Resource};
use lz4bridge::{BridgeError, ErrorKind, Handle};

struct Token(u64);

static TOKENS: Registry<Token> = Registry::new();

impl Resource for Token {
    const KIND: u8 = 0x51;
    const NAME: &'static str = "token";

    fn registry() -> &'static Registry<Self> {
        &TOKENS
    }
}

#[test]
fn zero_is_never_a_handle() {
    let err = Hash32Handle::from_raw(0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn raw_handles_are_positive_and_round_trip() {
    let h = bridge::hash32_init(0).unwrap();
    let raw = h.into_raw();
    assert!(raw > 0);
    assert_eq!(Hash32Handle::from_raw(raw).unwrap(), h);
    bridge::hash32_free(h).unwrap();
}

#[test]
fn foreign_kind_is_rejected() {
    let h = bridge::hash32_init(0).unwrap();
    let err = Hash64Handle::from_raw(h.into_raw()).unwrap_err();
    assert!(matches!(err, BridgeError::InvalidState(_)));
    let err = CompressionHandle::from_raw(h.into_raw()).unwrap_err();
    assert!(matches!(err, BridgeError::InvalidState(_)));
    bridge::hash32_free(h).unwrap();
}

#[test]
fn double_free_is_invalid_state() {
    let h = bridge::hash64_init(5).unwrap();
    bridge::hash64_free(h).unwrap();
    assert!(matches!(bridge::hash64_free(h), Err(BridgeError::InvalidState(_))));
    assert!(matches!(bridge::hash64_digest(h), Err(BridgeError::InvalidState(_))));
}

#[test]
fn forged_index_is_stale() {
    let h = Handle::<Token>::from_raw(((Token::KIND as i64) << 56) | (1 << 32) | 0xFFFF).unwrap();
    assert!(matches!(TOKENS.checkout(h), Err(BridgeError::InvalidState(_))));
}

#[test]
fn slot_reuse_bumps_generation() {
    let first = TOKENS.insert(Token(1)).unwrap();
    TOKENS.remove(first).unwrap();
    let second = TOKENS.insert(Token(2)).unwrap();
    assert_ne!(first.into_raw(), second.into_raw());
    assert!(TOKENS.checkout(first).is_err());
    assert_eq!(TOKENS.remove(second).unwrap().0, 2);
}

#[test]
fn distinct_handles_are_usable_from_many_threads() {
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let workers: Vec<_> = (0..threads as u64)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let h = TOKENS.insert(Token(i)).unwrap();
                barrier.wait();
                for _ in 0..1000 {
                    TOKENS.checkout(h).unwrap().0 += 1;
                }
                TOKENS.remove(h).unwrap().0
            })
        })
        .collect();
    let mut totals: Vec<u64> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    totals.sort_unstable();
    assert_eq!(totals, (1000..1000 + threads as u64).collect::<Vec<_>>());
}
