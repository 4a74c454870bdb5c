// src/kinematics.rs
//
// Windowed speed and cumulative distance per player/referee track, computed
// in pitch space so distances are meters. A track only accrues distance
// while it is continuously observable: the window baseline resets whenever
// the ID disappears (or loses its pitch projection), so a track that vanishes
// and reappears elsewhere never books the teleport as running distance.

use crate::track_store::{EntityClass, TrackId, TrackStore};
use crate::types::Point;
use std::collections::BTreeSet;

const MPS_TO_KMH: f64 = 3.6;

pub struct KinematicsAggregator {
    window_frames: usize,
    frame_rate: f64,
}

impl KinematicsAggregator {
    pub fn new(window_frames: usize, frame_rate: f64) -> Self {
        Self {
            window_frames: window_frames.max(1),
            frame_rate,
        }
    }

    /// Enrich every player and referee record with speed (km/h) and
    /// cumulative distance (meters). The ball is skipped: its motion is not
    /// a running metric.
    pub fn add_speed_and_distance(&self, store: &mut TrackStore) {
        for class in [EntityClass::Players, EntityClass::Referees] {
            let ids: BTreeSet<TrackId> = store
                .frames
                .iter()
                .flat_map(|frame| frame.class(class).keys().copied())
                .collect();

            for id in ids {
                self.aggregate_track(store, class, id);
            }
        }
    }

    fn aggregate_track(&self, store: &mut TrackStore, class: EntityClass, id: TrackId) {
        // Window baseline: last frame at which a window closed (or the track
        // reappeared). Reset to None on any discontinuity.
        let mut baseline: Option<(usize, Point)> = None;
        let mut cumulative_m = 0.0_f64;
        let mut current_speed: Option<f64> = None;
        let mut window_completed = false;

        for frame_index in 0..store.frame_count() {
            let observed = store.frames[frame_index]
                .class(class)
                .get(&id)
                .and_then(|record| record.position_transformed);

            let Some(position) = observed else {
                baseline = None;
                current_speed = None;
                continue;
            };

            match baseline {
                None => {
                    baseline = Some((frame_index, position));
                }
                Some((start_frame, start_position)) => {
                    if frame_index - start_frame == self.window_frames {
                        let distance = start_position.distance(&position);
                        let elapsed = (frame_index - start_frame) as f64 / self.frame_rate;
                        cumulative_m += distance;
                        current_speed =
                            Some(distance / elapsed * MPS_TO_KMH);
                        window_completed = true;
                        baseline = Some((frame_index, position));
                    }
                }
            }

            // Nothing is written until the first full window closes, so a
            // track's first sub-window carries no speed or distance.
            if window_completed {
                if let Some(record) = store.frames[frame_index].class_mut(class).get_mut(&id) {
                    record.distance_m = Some(cumulative_m);
                    record.speed_kmh = current_speed;
                }
            }
        }
    }
}
