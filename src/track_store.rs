// src/track_store.rs
//
// Canonical per-frame, per-entity-class record. Populated by the external
// detector/tracker, progressively enriched by the pipeline stages, then
// sampled read-only by the evaluator. Persisted as a single JSON blob so a
// later run can resume without re-running inference.

use crate::types::{BBox, Point};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub type TrackId = u32;
pub type TeamLabel = u8;

/// Track ID the external tracker reserves for the ball.
pub const BALL_TRACK_ID: TrackId = 1;

/// Team-control value before any possession has been observed.
pub const NEUTRAL_TEAM: TeamLabel = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityClass {
    Players,
    Referees,
    Ball,
}

impl EntityClass {
    pub const ALL: [EntityClass; 3] = [EntityClass::Players, EntityClass::Referees, EntityClass::Ball];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Players => "players",
            Self::Referees => "referees",
            Self::Ball => "ball",
        }
    }
}

/// One tracked entity in one frame. Only `bbox` comes from the tracker;
/// every other field is filled in by a later pipeline stage and stays absent
/// until that stage has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub bbox: BBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_adjusted: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_transformed: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_color: Option<[u8; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_ball: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
}

impl EntityRecord {
    pub fn new(bbox: BBox) -> Self {
        Self {
            bbox,
            position: None,
            position_adjusted: None,
            position_transformed: None,
            team: None,
            team_color: None,
            has_ball: None,
            speed_kmh: None,
            distance_m: None,
        }
    }

    /// Team assignment is append-only per track: the first write wins and
    /// every later attempt is ignored.
    pub fn set_team_once(&mut self, team: TeamLabel, color: [u8; 3]) {
        if self.team.is_none() {
            self.team = Some(team);
            self.team_color = Some(color);
        }
    }
}

/// Everything the tracker and pipeline know about one video frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub players: BTreeMap<TrackId, EntityRecord>,
    pub referees: BTreeMap<TrackId, EntityRecord>,
    pub ball: BTreeMap<TrackId, EntityRecord>,
}

impl FrameRecord {
    pub fn class(&self, class: EntityClass) -> &BTreeMap<TrackId, EntityRecord> {
        match class {
            EntityClass::Players => &self.players,
            EntityClass::Referees => &self.referees,
            EntityClass::Ball => &self.ball,
        }
    }

    pub fn class_mut(&mut self, class: EntityClass) -> &mut BTreeMap<TrackId, EntityRecord> {
        match class {
            EntityClass::Players => &mut self.players,
            EntityClass::Referees => &mut self.referees,
            EntityClass::Ball => &mut self.ball,
        }
    }

    /// The tracker models at most one ball per frame, under a fixed ID.
    pub fn ball_record(&self) -> Option<&EntityRecord> {
        self.ball.get(&BALL_TRACK_ID)
    }

    /// The unique possession holder in this frame, if any, searched across
    /// every entity class.
    pub fn possession_holder(&self) -> Option<(EntityClass, TrackId)> {
        for class in EntityClass::ALL {
            for (id, record) in self.class(class) {
                if record.has_ball == Some(true) {
                    return Some((class, *id));
                }
            }
        }
        None
    }
}

/// The fully-buffered sequence of frame records for one clip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackStore {
    pub frames: Vec<FrameRecord>,
}

impl TrackStore {
    pub fn with_frame_count(frame_count: usize) -> Self {
        Self {
            frames: vec![FrameRecord::default(); frame_count],
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Serialize the whole store to a single JSON snapshot.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create snapshot directory: {}", parent.display())
                })?;
            }
        }
        let file = fs::File::create(path)
            .with_context(|| format!("Failed to create snapshot file: {}", path.display()))?;
        serde_json::to_writer(file, self)
            .with_context(|| format!("Failed to serialize track store to {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open track store snapshot: {}", path.display()))?;
        let store: TrackStore = serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to parse track store snapshot: {}", path.display()))?;
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(x1: f64) -> EntityRecord {
        EntityRecord::new(BBox::new(x1, 0.0, x1 + 10.0, 20.0))
    }

    #[test]
    fn test_team_first_write_wins() {
        let mut rec = record(0.0);
        rec.set_team_once(1, [255, 0, 0]);
        rec.set_team_once(2, [0, 0, 255]);
        assert_eq!(rec.team, Some(1));
        assert_eq!(rec.team_color, Some([255, 0, 0]));
    }

    #[test]
    fn test_possession_holder_searches_all_classes() {
        let mut frame = FrameRecord::default();
        frame.players.insert(7, record(0.0));
        frame.referees.insert(3, record(50.0));

        assert_eq!(frame.possession_holder(), None);

        frame.players.get_mut(&7).unwrap().has_ball = Some(true);
        assert_eq!(frame.possession_holder(), Some((EntityClass::Players, 7)));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut store = TrackStore::with_frame_count(3);
        store.frames[0].players.insert(4, record(12.0));
        store.frames[1].ball.insert(BALL_TRACK_ID, record(100.0));
        let mut teamed = record(14.0);
        teamed.set_team_once(2, [0, 0, 255]);
        store.frames[2].players.insert(4, teamed);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots/track_store.json");
        store.save(&path).unwrap();

        let loaded = TrackStore::load(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_absent_fields_are_omitted_from_snapshot() {
        let mut store = TrackStore::with_frame_count(1);
        store.frames[0].players.insert(1, record(0.0));

        let json = serde_json::to_string(&store).unwrap();
        assert!(!json.contains("has_ball"));
        assert!(!json.contains("position_transformed"));
    }
}
