//! Kinematics pass and gait-phase boundary ("sync frame") extraction.
//!
//! The extractor walks the vertical displacement channel pair by pair,
//! alternating between looking for an apex (value starts falling) and a
//! valley (value starts rising). Each valley closes a gait phase and its
//! timestamp becomes a sync frame.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::data::trajectory::Sample;

/// How the velocity normalisation computes a vector's magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeMode {
    /// `sqrt(x² + y² + z²)`.
    #[default]
    Euclidean,
    /// `sqrt(x²) + y² + z²`, kept for parity with recordings made by older tooling.
    /// Only `velocity` is affected; extraction reads `displacement`.
    Legacy,
}

impl MagnitudeMode {
    pub fn magnitude(self, v: &Vector3<f64>) -> f64 {
        match self {
            MagnitudeMode::Euclidean => v.norm(),
            MagnitudeMode::Legacy => (v.x * v.x).sqrt() + v.y * v.y + v.z * v.z,
        }
    }
}

/// Fill `displacement` and `velocity` for every sample after the first.
///
/// `velocity[i]` is the unit direction of `displacement[i]` scaled by
/// `time_step`. A zero displacement gives a zero velocity.
pub fn compute_kinematics(samples: &mut [Sample], time_step: f64, mode: MagnitudeMode) {
    for i in 1..samples.len() {
        let displacement = samples[i].position - samples[i - 1].position;
        let magnitude = mode.magnitude(&displacement);
        let velocity = if magnitude > f64::EPSILON {
            displacement / magnitude * time_step
        } else {
            Vector3::zeros()
        };
        let s = &mut samples[i];
        s.displacement = displacement;
        s.velocity = velocity;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Search {
    Apex,
    Valley,
}

/// First pair `(i, i + 1)` with `i >= from` satisfying `pred(prev, cur)`.
///
/// Returns the index of the earlier sample of the pair.
fn find_pair<F>(samples: &[Sample], from: usize, pred: F) -> Option<usize>
where
    F: Fn(f64, f64) -> bool,
{
    if samples.len() < 2 {
        return None;
    }
    (from..samples.len() - 1)
        .find(|&i| pred(samples[i].displacement.y, samples[i + 1].displacement.y))
}

/// Extract the ordered valley timestamps of the vertical displacement channel.
///
/// Scanning starts at sample 1 (sample 0 has no displacement). A scan that
/// runs off the end returns what was collected so far, which may be empty
/// or hold a single boundary; callers treat fewer than two as not usable.
pub fn extract_sync_frames(samples: &[Sample]) -> Vec<f64> {
    let mut sync_frames = Vec::new();
    let mut pos = 1usize;
    let mut mode = Search::Apex;

    loop {
        match mode {
            Search::Apex => {
                let Some(i) = find_pair(samples, pos, |prev, cur| cur < prev) else {
                    break;
                };
                pos = i;
                mode = Search::Valley;
            }
            Search::Valley => {
                let Some(i) = find_pair(samples, pos, |prev, cur| prev < cur) else {
                    break;
                };
                sync_frames.push(samples[i].time);
                pos = i;
                mode = Search::Apex;
            }
        }
    }

    sync_frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn with_dy(values: &[f64]) -> Vec<Sample> {
        values
            .iter()
            .enumerate()
            .map(|(i, &dy)| {
                let mut s = Sample::new(i as i64, i as f64 * 0.5, Point3::origin());
                s.displacement = Vector3::new(0.0, dy, 0.0);
                s
            })
            .collect()
    }

    #[test]
    fn legacy_magnitude_differs_from_euclidean() {
        let v = Vector3::new(3.0, 4.0, 0.0);
        assert!((MagnitudeMode::Euclidean.magnitude(&v) - 5.0).abs() < 1e-12);
        assert!((MagnitudeMode::Legacy.magnitude(&v) - 19.0).abs() < 1e-12);
    }

    #[test]
    fn kinematics_fills_displacement_and_velocity() {
        let mut samples = vec![
            Sample::new(0, 0.0, Point3::new(0.0, 0.0, 0.0)),
            Sample::new(1, 0.1, Point3::new(0.0, 2.0, 0.0)),
            Sample::new(2, 0.2, Point3::new(0.0, 2.0, 0.0)),
        ];
        compute_kinematics(&mut samples, 0.5, MagnitudeMode::Euclidean);
        assert_eq!(samples[0].displacement, Vector3::zeros());
        assert_eq!(samples[1].displacement, Vector3::new(0.0, 2.0, 0.0));
        assert!((samples[1].velocity.y - 0.5).abs() < 1e-12);
        assert_eq!(samples[2].velocity, Vector3::zeros());
    }

    #[test]
    fn valleys_only() {
        // index:     0    1    2    3    4    5    6    7    8
        let s = with_dy(&[0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, -1.0, 0.5]);
        let frames = extract_sync_frames(&s);
        // valleys at index 4 and 8
        assert_eq!(frames, vec![2.0, 4.0]);
    }

    #[test]
    fn unclosed_search_returns_partial() {
        let s = with_dy(&[0.0, 3.0, 2.0, 1.0]);
        assert!(extract_sync_frames(&s).is_empty());
        assert!(extract_sync_frames(&[]).is_empty());
        assert!(extract_sync_frames(&with_dy(&[0.0])).is_empty());
    }

    #[test]
    fn plateaus_are_not_inflections() {
        let s = with_dy(&[0.0, 1.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(extract_sync_frames(&s), vec![2.0]);
    }
}
