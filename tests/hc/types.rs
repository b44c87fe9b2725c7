// Integration tests for src/hc/types.rs: level normalisation and table.

use lz4bridge::hc::types::{level_params, normalize_level, LZ4HC_CLEVEL_DEFAULT, LZ4HC_CLEVEL_MAX};

#[test]
fn levels_below_one_mean_default() {
    for level in [i32::MIN, -1, 0] {
        assert_eq!(normalize_level(level), LZ4HC_CLEVEL_DEFAULT);
    }
}

#[test]
fn levels_above_max_are_clamped() {
    assert_eq!(normalize_level(13), LZ4HC_CLEVEL_MAX);
    assert_eq!(normalize_level(i32::MAX), LZ4HC_CLEVEL_MAX);
}

#[test]
fn in_range_levels_pass_through() {
    for level in 1..=12 {
        assert_eq!(normalize_level(level), level);
    }
}

#[test]
fn search_effort_grows_up_to_default() {
    for level in 2..LZ4HC_CLEVEL_DEFAULT {
        assert!(level_params(level).nb_searches <= level_params(level + 1).nb_searches);
    }
    assert!(level_params(LZ4HC_CLEVEL_MAX).target_length > level_params(LZ4HC_CLEVEL_DEFAULT).target_length);
}
