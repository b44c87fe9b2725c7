// Integration tests for src/bridge/hash.rs: hash handles and one-shot calls.

use lz4bridge::bridge::{
    hash32, hash32_digest, hash32_free, hash32_init, hash32_reset, hash32_update, hash64,
    hash64_digest, hash64_free, hash64_init, hash64_reset, hash64_update,
};
use lz4bridge::{ByteArray, ErrorKind, LogicalBuffer};

#[test]
fn one_shot_vectors() {
    let abc = LogicalBuffer::from(&b"xxabcxx"[..]);
    assert_eq!(hash32(&abc, 2, 3, 0).unwrap(), 0x32D1_53FF);
    assert_eq!(hash64(&abc, 2, 3, 0).unwrap(), 0x44BC_2CF5_AD77_0999);
    assert_eq!(hash32(&abc, 0, 0, 0).unwrap(), 0x02CC_5D05);
}

#[test]
fn incremental_equals_one_shot() {
    let data: Vec<u8> = (0..5000u32).map(|i| (i ^ (i >> 3)) as u8).collect();
    let array = ByteArray::from(data.clone());
    let buf = LogicalBuffer::from(&array);

    let h32 = hash32_init(123).unwrap();
    let h64 = hash64_init(123).unwrap();
    for (off, len) in [(0, 1), (1, 16), (17, 1000), (1017, 3983)] {
        hash32_update(h32, &buf, off, len).unwrap();
        hash64_update(h64, &buf, off, len).unwrap();
    }
    assert_eq!(hash32_digest(h32).unwrap(), hash32(&buf, 0, 5000, 123).unwrap());
    assert_eq!(hash64_digest(h64).unwrap(), hash64(&buf, 0, 5000, 123).unwrap());
    assert_eq!(array.pin_count(), 0);
    hash32_free(h32).unwrap();
    hash64_free(h64).unwrap();
}

#[test]
fn digest_can_be_taken_mid_stream() {
    let h = hash32_init(0).unwrap();
    hash32_update(h, &LogicalBuffer::from(&b"ab"[..]), 0, 2).unwrap();
    let partial = hash32_digest(h).unwrap();
    assert_eq!(partial, hash32_digest(h).unwrap());
    hash32_update(h, &LogicalBuffer::from(&b"c"[..]), 0, 1).unwrap();
    assert_eq!(hash32_digest(h).unwrap(), 0x32D1_53FF);
    hash32_free(h).unwrap();
}

#[test]
fn reset_returns_to_seeded_state() {
    let h = hash64_init(9).unwrap();
    let fresh = hash64_digest(h).unwrap();
    hash64_update(h, &LogicalBuffer::from(&b"noise"[..]), 0, 5).unwrap();
    assert_ne!(hash64_digest(h).unwrap(), fresh);
    hash64_reset(h).unwrap();
    assert_eq!(hash64_digest(h).unwrap(), fresh);
    hash64_free(h).unwrap();

    let h = hash32_init(9).unwrap();
    hash32_update(h, &LogicalBuffer::from(&b"noise"[..]), 0, 5).unwrap();
    hash32_reset(h).unwrap();
    assert_eq!(hash32_digest(h).unwrap(), hash32(&LogicalBuffer::from(&b""[..]), 0, 0, 9).unwrap());
    hash32_free(h).unwrap();
}

#[test]
fn update_out_of_range_keeps_state() {
    let h = hash32_init(0).unwrap();
    hash32_update(h, &LogicalBuffer::from(&b"ab"[..]), 0, 2).unwrap();
    let err = hash32_update(h, &LogicalBuffer::from(&b"c"[..]), 0, 2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    hash32_update(h, &LogicalBuffer::from(&b"c"[..]), 0, 1).unwrap();
    assert_eq!(hash32_digest(h).unwrap(), 0x32D1_53FF);
    hash32_free(h).unwrap();
}

#[test]
fn use_after_free_is_invalid_state() {
    let h = hash32_init(0).unwrap();
    hash32_free(h).unwrap();
    let err = hash32_update(h, &LogicalBuffer::from(&b"x"[..]), 0, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(hash32_reset(h).unwrap_err().kind(), ErrorKind::InvalidState);
}
