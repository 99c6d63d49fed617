use std::f64::consts::TAU;

use gaitsync::data::kinematics::*;
use gaitsync::data::trajectory::{Sample, TrajectoryStore};
use nalgebra::Point3;

/// Samples whose vertical displacement channel equals `dy` (first sample has none).
fn from_vertical_displacement(times: &[f64], dy: &[f64]) -> Vec<Sample> {
    let mut y = 0.0;
    let mut out = vec![Sample::new(0, times[0], Point3::new(0.0, y, 0.0))];
    for i in 1..times.len() {
        y += dy[i - 1];
        out.push(Sample::new(i as i64, times[i], Point3::new(i as f64 * 0.01, y, 0.0)));
    }
    out
}

#[test]
fn valleys_only_in_ascending_order() {
    let dy = [1.0, 3.0, 1.0, -2.0, 0.0, 2.0, 1.0, -1.0, 0.0, 1.0];
    let times: Vec<f64> = (0..=dy.len()).map(|i| i as f64).collect();
    let mut samples = from_vertical_displacement(&times, &dy);
    compute_kinematics(&mut samples, 1.0 / 120.0, MagnitudeMode::Euclidean);

    let frames = extract_sync_frames(&samples);
    // dy valleys sit at t=4 (-2) and t=8 (-1); apexes at t=2 and t=6 are skipped.
    assert_eq!(frames, vec![4.0, 8.0]);
}

#[test]
fn sine_valleys_within_one_sample_period() {
    let dt = 0.01;
    let n = 300;
    let times: Vec<f64> = (0..=n).map(|i| i as f64 * dt).collect();
    let dy: Vec<f64> = times[1..].iter().map(|t| (TAU * t).sin()).collect();
    let mut samples = from_vertical_displacement(&times, &dy);
    compute_kinematics(&mut samples, dt, MagnitudeMode::Euclidean);

    let frames = extract_sync_frames(&samples);
    let minima = [0.75, 1.75, 2.75];
    assert_eq!(frames.len(), minima.len(), "frames: {:?}", frames);
    for (got, want) in frames.iter().zip(minima) {
        assert!((got - want).abs() <= dt + 1e-9, "{} vs {}", got, want);
    }
    for pair in frames.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn legacy_magnitude_does_not_change_sync_frames() {
    let dt = 1.0 / 120.0;
    let times: Vec<f64> = (0..=360).map(|i| i as f64 * dt).collect();
    let dy: Vec<f64> = times[1..].iter().map(|t| (TAU * t).sin() * 0.02).collect();

    let mut euclid = from_vertical_displacement(&times, &dy);
    let mut legacy = euclid.clone();
    compute_kinematics(&mut euclid, dt, MagnitudeMode::Euclidean);
    compute_kinematics(&mut legacy, dt, MagnitudeMode::Legacy);

    assert_eq!(extract_sync_frames(&euclid), extract_sync_frames(&legacy));
    // Velocities differ once the displacement has a sizeable x component.
    let i = 30;
    assert!((euclid[i].velocity.norm() - dt).abs() < 1e-12);
    assert!((legacy[i].velocity - euclid[i].velocity).norm() > 1e-6);
}

#[test]
fn zero_displacement_gives_zero_velocity() {
    let mut samples = vec![
        Sample::new(0, 0.0, Point3::new(1.0, 1.0, 1.0)),
        Sample::new(1, 0.1, Point3::new(1.0, 1.0, 1.0)),
    ];
    compute_kinematics(&mut samples, 0.1, MagnitudeMode::Legacy);
    assert_eq!(samples[1].velocity, nalgebra::Vector3::zeros());
}

#[test]
fn incomplete_scan_returns_partial_result() {
    // Rises, falls, never rises again: apex found, valley search runs off the end.
    let dy = [1.0, 2.0, 1.0, 0.0, -1.0];
    let times: Vec<f64> = (0..=dy.len()).map(|i| i as f64).collect();
    let mut samples = from_vertical_displacement(&times, &dy);
    compute_kinematics(&mut samples, 1.0, MagnitudeMode::Euclidean);
    assert!(extract_sync_frames(&samples).is_empty());

    assert!(extract_sync_frames(&[]).is_empty());
    assert!(extract_sync_frames(&samples[..1]).is_empty());
}

#[test]
fn store_extracts_once_after_first_loop() {
    let dt = 0.01;
    let mut store = TrajectoryStore::new();
    let mut y = 0.0;
    for i in 0..=300 {
        let t = i as f64 * dt;
        if i > 0 {
            y += (TAU * t).sin();
        }
        store.record(i, t, Point3::new(0.0, y, 0.0));
    }
    assert!(store.sync_frames().is_none());
    assert!(!store.ensure_sync_frames(dt, MagnitudeMode::Euclidean));

    store.complete_cycle();
    assert!(store.ensure_sync_frames(dt, MagnitudeMode::Euclidean));
    assert_eq!(store.usable_sync_frames().map(|s| s.len()), Some(3));
    assert_eq!(store.vertical_displacement().len(), store.len() - 1);
}
