use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::trajectory::TrajectoryStore;
use crate::motion::MotionSource;

/// Identifier of a loaded character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct CharacterId(pub String);

impl CharacterId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharacterId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CharacterId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One performance: its motion source, tracked point and recorded trajectory.
pub struct Character {
    pub id: CharacterId,
    /// Bone whose end point is tracked (names differ between skeletons).
    pub tracked_point: String,
    pub source: Box<dyn MotionSource>,
    pub store: TrajectoryStore,
    /// Time last pushed into `source`.
    pub presented_time: f64,
    /// Held still this tick because no usable warp existed.
    pub frozen: bool,
    /// Set after the first failed bone lookup, to keep logs quiet.
    pub lookup_failed: bool,
    /// Display color (RGB, 0..1).
    pub color: [f32; 3],
}

impl Character {
    pub fn new(
        id: CharacterId,
        tracked_point: String,
        source: Box<dyn MotionSource>,
        capacity: usize,
    ) -> Self {
        Self {
            id,
            tracked_point,
            source,
            store: TrajectoryStore::with_capacity(capacity),
            presented_time: 0.0,
            frozen: false,
            lookup_failed: false,
            color: [0.8, 0.8, 0.8],
        }
    }

    /// Push `time` into the motion source.
    pub fn pose_at(&mut self, time: f64) {
        self.source.update(time);
        self.presented_time = time;
    }
}

impl fmt::Debug for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Character")
            .field("id", &self.id)
            .field("tracked_point", &self.tracked_point)
            .field("source", &self.source.describe())
            .field("samples", &self.store.len())
            .field("cycle_count", &self.store.cycle_count())
            .field("presented_time", &self.presented_time)
            .field("frozen", &self.frozen)
            .finish()
    }
}

/// Characters keyed by id, iterated in load order.
#[derive(Debug, Default)]
pub struct CharacterSet {
    characters: HashMap<CharacterId, Character>,
    order: Vec<CharacterId>,
}

impl CharacterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &CharacterId) -> bool {
        self.characters.contains_key(id)
    }

    /// Insert a character; returns it back if the id is taken.
    pub fn insert(&mut self, character: Character) -> Result<(), Character> {
        if self.characters.contains_key(&character.id) {
            return Err(character);
        }
        self.order.push(character.id.clone());
        self.characters.insert(character.id.clone(), character);
        Ok(())
    }

    pub fn get(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.get(id)
    }

    pub fn get_mut(&mut self, id: &CharacterId) -> Option<&mut Character> {
        self.characters.get_mut(id)
    }

    pub fn ids(&self) -> &[CharacterId] {
        &self.order
    }

    pub fn first_id(&self) -> Option<&CharacterId> {
        self.order.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.order.iter().filter_map(|id| self.characters.get(id))
    }

    /// Visit every character mutably, in load order.
    pub fn for_each_mut<F: FnMut(&mut Character)>(&mut self, mut f: F) {
        for id in &self.order {
            if let Some(c) = self.characters.get_mut(id) {
                f(c);
            }
        }
    }

    pub fn clear(&mut self) {
        self.characters.clear();
        self.order.clear();
    }
}
