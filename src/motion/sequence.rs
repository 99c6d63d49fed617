//! Looped playback of a pre-baked motion clip.

use std::collections::HashMap;

use crate::error::{SyncError, SyncResult};
use crate::motion::{BoneSegment, MotionSource, PhaseObservable};

/// Bone segments for every frame of a clip, sampled at a fixed rate.
#[derive(Debug, Clone, Default)]
pub struct MotionSequence {
    pub name: String,
    pub frame_rate: f64,
    bone_names: Vec<String>,
    bone_index: HashMap<String, usize>,
    /// `frames[f][b]` is bone `b` at frame `f`.
    frames: Vec<Vec<BoneSegment>>,
}

impl MotionSequence {
    pub fn new<S: Into<String>>(name: S, frame_rate: f64, bone_names: Vec<String>) -> SyncResult<Self> {
        if !(frame_rate > 0.0) {
            return Err(SyncError::Config(format!(
                "frame rate must be positive, got {}",
                frame_rate
            )));
        }
        let bone_index = bone_names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Ok(Self {
            name: name.into(),
            frame_rate,
            bone_names,
            bone_index,
            frames: Vec::new(),
        })
    }

    /// Append one frame; it must hold one segment per declared bone.
    pub fn push_frame(&mut self, bones: Vec<BoneSegment>) -> SyncResult<()> {
        if bones.len() != self.bone_names.len() {
            return Err(SyncError::Config(format!(
                "frame {} of '{}' has {} bones, expected {}",
                self.frames.len(),
                self.name,
                bones.len(),
                self.bone_names.len()
            )));
        }
        self.frames.push(bones);
        Ok(())
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn bone_names(&self) -> &[String] {
        &self.bone_names
    }

    /// Clip length in seconds.
    pub fn duration(&self) -> f64 {
        self.frames.len() as f64 / self.frame_rate
    }

    pub fn bone(&self, frame: usize, name: &str) -> Option<BoneSegment> {
        let b = *self.bone_index.get(name)?;
        self.frames.get(frame).and_then(|f| f.get(b)).copied()
    }
}

/// Slack on frame selection so an accumulated clock that lands a hair below
/// a frame boundary still selects that frame.
const FRAME_EPSILON: f64 = 1e-6;

/// Plays a [`MotionSequence`] in an endless loop.
///
/// Global time is folded into the clip duration; the frame is chosen by
/// truncation, the same way the clip's own controller would pick it.
#[derive(Debug, Clone)]
pub struct SequencePlayer {
    sequence: MotionSequence,
    sequence_time: f64,
    sequence_frame: i64,
}

impl SequencePlayer {
    pub fn new(sequence: MotionSequence) -> Self {
        Self {
            sequence,
            sequence_time: 0.0,
            sequence_frame: 0,
        }
    }

    pub fn sequence(&self) -> &MotionSequence {
        &self.sequence
    }

    /// Fold `time` into `[0, duration)` and select the frame.
    fn locate(&self, time: f64) -> (f64, i64) {
        let n = self.sequence.num_frames();
        let duration = self.sequence.duration();
        if n == 0 || !(duration > 0.0) || !time.is_finite() {
            return (0.0, 0);
        }
        let cycles = (time / duration).floor();
        let mut local = time - duration * cycles;
        if local >= duration || local < 0.0 {
            local = 0.0;
        }
        let frame = ((n as f64 * local / duration + FRAME_EPSILON) as i64).clamp(0, n as i64 - 1);
        (local, frame)
    }
}

impl PhaseObservable for SequencePlayer {
    fn local_time(&self) -> f64 {
        self.sequence_time
    }

    fn local_frame(&self) -> i64 {
        self.sequence_frame
    }
}

impl MotionSource for SequencePlayer {
    fn update(&mut self, time: f64) {
        let (local, frame) = self.locate(time);
        self.sequence_time = local;
        self.sequence_frame = frame;
    }

    fn tracked_point(&self, name: &str) -> Option<BoneSegment> {
        self.sequence.bone(self.sequence_frame as usize, name)
    }

    fn describe(&self) -> String {
        format!(
            "{} ({} frames @ {:.0} fps)",
            self.sequence.name,
            self.sequence.num_frames(),
            self.sequence.frame_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn clip(frames: usize) -> MotionSequence {
        let mut seq = MotionSequence::new("clip", 10.0, vec!["Toe".to_string()]).unwrap();
        for f in 0..frames {
            let y = f as f64;
            seq.push_frame(vec![BoneSegment::new(Point3::origin(), Point3::new(0.0, y, 0.0))])
                .unwrap();
        }
        seq
    }

    #[test]
    fn time_folds_into_clip() {
        let mut player = SequencePlayer::new(clip(10));
        player.update(0.35);
        assert_eq!(player.local_frame(), 3);
        assert!((player.local_time() - 0.35).abs() < 1e-12);

        player.update(1.25);
        assert_eq!(player.local_frame(), 2);
        assert!((player.local_time() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn frame_decreases_on_wrap() {
        let mut player = SequencePlayer::new(clip(10));
        player.update(0.95);
        let before = player.local_frame();
        player.update(1.02);
        assert!(player.local_frame() < before);
    }

    #[test]
    fn unknown_bone_is_none() {
        let mut player = SequencePlayer::new(clip(4));
        player.update(0.1);
        assert!(player.tracked_point("LeftToeBase").is_none());
        assert_eq!(player.tracked_point("Toe").map(|b| b.end.y), Some(1.0));
    }

    #[test]
    fn rejects_bad_frames() {
        let mut seq = MotionSequence::new("clip", 30.0, vec!["A".into(), "B".into()]).unwrap();
        let seg = BoneSegment::new(Point3::origin(), Point3::origin());
        assert!(seq.push_frame(vec![seg]).is_err());
        assert!(MotionSequence::new("bad", 0.0, vec![]).is_err());
    }
}
