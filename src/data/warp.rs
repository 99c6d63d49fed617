//! Piecewise-linear time remapping between two sync-frame timelines.
//!
//! The i-th boundary of the source timeline is paired with the i-th boundary
//! of the target timeline; time between two boundaries is mapped linearly.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WarpError {
    #[error("need at least 2 sync frames (source has {source_len}, target has {target_len})")]
    TooFewSyncFrames { source_len: usize, target_len: usize },

    #[error("time {time} is outside the source range [{start}, {end}]")]
    OutOfDomain { time: f64, start: f64, end: f64 },

    #[error("bracket {index} has no matching boundary pair in a target of {target_len} sync frames")]
    BracketOutOfRange { index: usize, target_len: usize },
}

/// Index `i` with `frames[i] <= time < frames[i + 1]`.
///
/// `None` when `time` lies outside `[frames[0], frames[last]]` or fewer than
/// two frames exist. `time == frames[last]` maps to the final bracket.
pub fn bracket_index(time: f64, frames: &[f64]) -> Option<usize> {
    if frames.len() < 2 {
        return None;
    }
    let last = frames.len() - 1;
    if !(time >= frames[0] && time <= frames[last]) {
        return None;
    }
    let at_or_below = frames.partition_point(|&f| f <= time);
    Some((at_or_below - 1).min(last - 1))
}

/// Map `time` on the `source` timeline to the equivalent time on `target`.
pub fn warp(time: f64, source: &[f64], target: &[f64]) -> Result<f64, WarpError> {
    if source.len() < 2 || target.len() < 2 {
        return Err(WarpError::TooFewSyncFrames {
            source_len: source.len(),
            target_len: target.len(),
        });
    }
    let i = bracket_index(time, source).ok_or(WarpError::OutOfDomain {
        time,
        start: source[0],
        end: source[source.len() - 1],
    })?;
    if i + 1 >= target.len() {
        return Err(WarpError::BracketOutOfRange {
            index: i,
            target_len: target.len(),
        });
    }

    // control points map exactly
    if time == source[i + 1] {
        return Ok(target[i + 1]);
    }
    let span = source[i + 1] - source[i];
    if span <= 0.0 {
        return Ok(target[i]);
    }
    let ratio = (target[i + 1] - target[i]) / span;
    Ok(target[i] + (time - source[i]) * ratio)
}

/// Total version of [`warp`] used during playback.
///
/// Both timelines are cut to their common length and `time` is clamped into
/// the source range. Returns `None` only when fewer than two common
/// boundaries exist, in which case the caller holds the character still.
pub fn warp_clamped(time: f64, source: &[f64], target: &[f64]) -> Option<f64> {
    let common = source.len().min(target.len());
    if common < 2 {
        return None;
    }
    let source = &source[..common];
    let target = &target[..common];
    let t = if time.is_nan() {
        source[0]
    } else {
        time.clamp(source[0], source[common - 1])
    };
    warp(t, source, target).ok()
}
