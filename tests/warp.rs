use gaitsync::data::warp::*;

const S: [f64; 4] = [0.0, 1.0, 2.0, 3.0];
const T: [f64; 4] = [0.0, 2.0, 4.0, 6.0];

fn grid(start: f64, end: f64, n: usize) -> Vec<f64> {
    (0..=n)
        .map(|i| start + (end - start) * i as f64 / n as f64)
        .collect()
}

#[test]
fn halfway_through_first_bracket() {
    assert_eq!(warp(0.5, &S, &T).unwrap(), 1.0);
}

#[test]
fn identity_when_timelines_match() {
    let s = [0.3, 1.1, 1.9, 3.4];
    for t in grid(0.3, 3.4, 50) {
        let w = warp(t, &s, &s).unwrap();
        assert!((w - t).abs() < 1e-12, "warp({}) = {}", t, w);
    }
}

#[test]
fn control_points_map_exactly() {
    let s = [0.754, 1.754, 2.754];
    let t = [0.379, 0.879, 1.379];
    for i in 0..s.len() {
        assert_eq!(warp(s[i], &s, &t).unwrap(), t[i]);
    }
}

#[test]
fn monotonic_non_decreasing() {
    let s = [0.0, 0.7, 1.9, 2.2, 4.0];
    let t = [0.5, 0.6, 2.0, 3.5, 3.6];
    let samples: Vec<f64> = grid(0.0, 4.0, 400)
        .into_iter()
        .map(|x| warp(x, &s, &t).unwrap())
        .collect();
    for pair in samples.windows(2) {
        assert!(pair[0] <= pair[1], "{} > {}", pair[0], pair[1]);
    }
}

#[test]
fn round_trip_returns_to_start() {
    let s = [0.754, 1.754, 2.754];
    let t = [0.604, 1.404, 2.204];
    for x in grid(0.754, 2.754, 64) {
        let there = warp(x, &s, &t).unwrap();
        let back = warp(there, &t, &s).unwrap();
        assert!((back - x).abs() < 1e-9, "{} -> {} -> {}", x, there, back);
    }
}

#[test]
fn out_of_domain_is_an_error_but_clamped_is_total() {
    assert!(matches!(
        warp(3.5, &S, &T),
        Err(WarpError::OutOfDomain { .. })
    ));
    assert_eq!(warp_clamped(3.5, &S, &T), Some(6.0));
    assert_eq!(warp_clamped(-1.0, &S, &T), Some(0.0));
    assert_eq!(warp_clamped(f64::NAN, &S, &T), Some(0.0));
}

#[test]
fn short_sets_are_rejected() {
    assert!(matches!(
        warp(0.0, &[0.0], &T),
        Err(WarpError::TooFewSyncFrames { source_len: 1, target_len: 4 })
    ));
    assert_eq!(warp_clamped(0.5, &S, &[1.0]), None);
    assert_eq!(warp_clamped(0.5, &[], &T), None);
}

#[test]
fn clamped_uses_common_length() {
    // Source has more boundaries than the target: only the first two pairs count.
    let s = [0.0, 1.0, 2.0, 3.0];
    let t = [10.0, 12.0];
    assert_eq!(warp_clamped(0.5, &s, &t), Some(11.0));
    assert_eq!(warp_clamped(2.5, &s, &t), Some(12.0));
    assert!(matches!(
        warp(2.5, &s, &t),
        Err(WarpError::BracketOutOfRange { index: 2, target_len: 2 })
    ));
}
