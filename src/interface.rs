// src/interface.rs
//
// Seams to the external collaborators: the object detector/tracker, the team
// color classifier, and the camera-motion estimator's persisted output. The
// pipeline treats all of them as black boxes; a failure here is a fatal
// precondition violation for the run, never something to retry.

use crate::track_store::{TeamLabel, TrackId, TrackStore};
use crate::types::{BBox, Point};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Produces the initial track store: per frame, per class, track IDs with
/// raw bounding boxes. Everything else is filled in by the pipeline.
pub trait Detector {
    fn detect(&mut self) -> Result<TrackStore>;
}

/// Reads the detector's persisted snapshot instead of re-running inference.
pub struct StubDetector {
    path: PathBuf,
}

impl StubDetector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Detector for StubDetector {
    fn detect(&mut self) -> Result<TrackStore> {
        TrackStore::load(&self.path)
    }
}

/// Color-clustering team classifier. Stateless per call: remembering the
/// first answer per track ID is the identity resolver's responsibility.
pub trait TeamClassifier {
    fn classify(&mut self, frame_index: usize, track_id: TrackId, bbox: &BBox)
        -> Result<TeamLabel>;
}

/// Replays persisted classifier output (a JSON map of track ID to label).
/// Like the other stubs this skips re-running the external model; asking it
/// about a track the cache has never seen is a corrupted upstream signal and
/// fails the run.
pub struct StubTeamClassifier {
    hints: HashMap<TrackId, TeamLabel>,
}

impl StubTeamClassifier {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read team hints cache: {}", path.display()))?;
        let hints: HashMap<TrackId, TeamLabel> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse team hints cache: {}", path.display()))?;
        Ok(Self { hints })
    }
}

impl TeamClassifier for StubTeamClassifier {
    fn classify(
        &mut self,
        _frame_index: usize,
        track_id: TrackId,
        _bbox: &BBox,
    ) -> Result<TeamLabel> {
        self.hints
            .get(&track_id)
            .copied()
            .with_context(|| format!("No persisted team hint for track {track_id}"))
    }
}

/// Accumulated camera displacement per frame, from the external estimator's
/// persisted cache (a JSON array of [dx, dy] pairs, one per frame).
pub fn load_camera_movement(path: impl AsRef<Path>) -> Result<Vec<Point>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read camera movement cache: {}", path.display()))?;
    let raw: Vec<[f64; 2]> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse camera movement cache: {}", path.display()))?;
    Ok(raw.into_iter().map(|[x, y]| Point::new(x, y)).collect())
}
