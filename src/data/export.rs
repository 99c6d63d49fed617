//! Session export: recorded trajectories as CSV and a JSON summary.
//!
//! Nothing here is read back; the engine always starts from an empty session.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::SyncConfig;
use crate::data::characters::{CharacterId, CharacterSet};
use crate::engine::snapshot::PlaybackSnapshot;
use crate::engine::SyncEngine;
use crate::error::SyncResult;

/// One row per recorded sample of every character.
pub fn write_trajectories_csv<W: Write>(mut w: W, characters: &CharacterSet) -> std::io::Result<()> {
    writeln!(w, "character,index,time,x,y,z,dx,dy,dz,vx,vy,vz")?;
    for c in characters.iter() {
        for s in c.store.samples() {
            writeln!(
                w,
                "{},{},{:.9},{},{},{},{},{},{},{},{},{}",
                c.id,
                s.index,
                s.time,
                s.position.x,
                s.position.y,
                s.position.z,
                s.displacement.x,
                s.displacement.y,
                s.displacement.z,
                s.velocity.x,
                s.velocity.y,
                s.velocity.z
            )?;
        }
    }
    Ok(())
}

/// One row per sync frame: `character,ordinal,time`.
pub fn write_sync_frames_csv<W: Write>(mut w: W, characters: &CharacterSet) -> std::io::Result<()> {
    writeln!(w, "character,ordinal,time")?;
    for c in characters.iter() {
        for (i, t) in c.store.sync_frames().unwrap_or_default().iter().enumerate() {
            writeln!(w, "{},{},{:.9}", c.id, i, t)?;
        }
    }
    Ok(())
}

pub fn save_trajectories_csv<P: AsRef<Path>>(path: P, characters: &CharacterSet) -> SyncResult<()> {
    let f = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_trajectories_csv(f, characters)?;
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct CharacterReport {
    pub id: CharacterId,
    pub tracked_point: String,
    pub cycle_count: u32,
    pub sample_count: usize,
    pub sync_frames: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub generated_at: DateTime<Utc>,
    pub reference: Option<CharacterId>,
    pub config: SyncConfig,
    pub playback: PlaybackSnapshot,
    pub characters: Vec<CharacterReport>,
}

pub fn session_report(engine: &SyncEngine) -> SessionReport {
    SessionReport {
        generated_at: Utc::now(),
        reference: engine.reference_id().cloned(),
        config: engine.config().clone(),
        playback: engine.snapshot(),
        characters: engine
            .characters()
            .iter()
            .map(|c| CharacterReport {
                id: c.id.clone(),
                tracked_point: c.tracked_point.clone(),
                cycle_count: c.store.cycle_count(),
                sample_count: c.store.len(),
                sync_frames: c.store.sync_frames().map(|s| s.to_vec()),
            })
            .collect(),
    }
}

/// Write `<stem>.json` (report) and `<stem>.csv` (trajectories) next to each other.
pub fn save_session<P: AsRef<Path>>(path: P, engine: &SyncEngine) -> SyncResult<()> {
    let path = path.as_ref();
    let report = session_report(engine);
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(path.with_extension("json"), json)?;
    save_trajectories_csv(path.with_extension("csv"), engine.characters())?;
    tracing::info!(path = %path.display(), characters = report.characters.len(), "session exported");
    Ok(())
}
