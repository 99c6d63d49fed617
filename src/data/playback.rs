//! Process-wide playback state owned by the engine.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::characters::{CharacterId, CharacterSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Sampling every character at a fixed step until enough data exists.
    #[default]
    Collecting,
    /// Reference runs on the wall clock, everyone else is phase-warped onto it.
    Warping,
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackMode::Collecting => write!(f, "collecting"),
            PlaybackMode::Warping => write!(f, "warping"),
        }
    }
}

/// Which characters must finish a loop before playback switches to warping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatingPolicy {
    /// Every loaded character has extracted its sync frames.
    #[default]
    AllCharacters,
    /// Every character other than the reference has extracted its sync frames.
    AllExceptReference,
    /// One named character has extracted its sync frames.
    Character(CharacterId),
}

impl GatingPolicy {
    /// Evaluate the gate. A store passes once it is closed and its sync frames exist.
    pub fn is_satisfied(&self, characters: &CharacterSet, reference: Option<&CharacterId>) -> bool {
        let done = |id: &CharacterId| {
            characters
                .get(id)
                .map(|c| c.store.is_closed() && c.store.sync_frames().is_some())
                .unwrap_or(false)
        };
        match self {
            GatingPolicy::AllCharacters => {
                !characters.is_empty() && characters.ids().iter().all(done)
            }
            GatingPolicy::AllExceptReference => {
                let others: Vec<&CharacterId> = characters
                    .ids()
                    .iter()
                    .filter(|id| Some(*id) != reference)
                    .collect();
                if others.is_empty() {
                    reference.map(done).unwrap_or(false)
                } else {
                    others.into_iter().all(done)
                }
            }
            GatingPolicy::Character(id) => done(id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaybackState {
    pub mode: PlaybackMode,
    /// Reference clock (seconds).
    pub elapsed_time: f64,
    /// Multiplier applied to wall-clock increments while warping.
    pub time_warp: f64,
    /// Last clip frame seen per character, for loop detection.
    last_frames: HashMap<CharacterId, i64>,
}

impl PlaybackState {
    pub fn new(time_warp: f64) -> Self {
        Self {
            mode: PlaybackMode::Collecting,
            elapsed_time: 0.0,
            time_warp,
            last_frames: HashMap::new(),
        }
    }

    /// Record the character's current clip frame.
    ///
    /// Returns `true` when the frame went backwards, i.e. the clip looped.
    pub fn observe_frame(&mut self, id: &CharacterId, frame: i64) -> bool {
        match self.last_frames.insert(id.clone(), frame) {
            Some(prev) => frame < prev,
            None => false,
        }
    }

    pub fn forget_frames(&mut self) {
        self.last_frames.clear();
    }
}
