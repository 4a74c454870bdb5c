// src/possession.rs
//
// Ball possession per frame plus the derived team-control series. The series
// is a fold over the frame sequence: each frame's value is either the
// possessor's team or the previous frame's value (neutral before any
// possession is seen). No accumulator state survives outside the fold.

use crate::track_store::{FrameRecord, TeamLabel, TrackId, TrackStore, NEUTRAL_TEAM};
use crate::types::Point;
use tracing::debug;

pub struct PossessionResolver {
    max_player_ball_distance: f64,
}

impl PossessionResolver {
    pub fn new(max_player_ball_distance: f64) -> Self {
        Self {
            max_player_ball_distance,
        }
    }

    /// Assign possession frame-sequentially and return the team-control
    /// series, one value per frame. Exactly one player per frame ends up
    /// with `has_ball = true`, or none when no player is close enough.
    pub fn resolve(&self, store: &mut TrackStore) -> Vec<TeamLabel> {
        let mut control = Vec::with_capacity(store.frame_count());

        for frame_index in 0..store.frame_count() {
            let frame = &mut store.frames[frame_index];

            // Re-running on a resumed snapshot must not leave stale holders.
            for record in frame.players.values_mut() {
                record.has_ball = None;
            }

            let ball_center = frame.ball_record().map(|r| r.bbox.center());
            let possessor = match ball_center {
                Some(center) => self.nearest_player(frame, &center),
                None => None,
            };

            let assigned_team = possessor.and_then(|id| {
                frame.players.get_mut(&id).map(|record| {
                    record.has_ball = Some(true);
                    record.team.unwrap_or(NEUTRAL_TEAM)
                })
            });

            let value = match assigned_team {
                Some(team) => team,
                None => control.last().copied().unwrap_or(NEUTRAL_TEAM),
            };
            control.push(value);
        }

        debug!(frames = control.len(), "team control series derived");
        control
    }

    /// The player whose foot point is nearest the ball center, within the
    /// eligibility radius. Distance is the smaller of the two bottom bbox
    /// corners, so a player lunging with either foot can win the ball.
    fn nearest_player(&self, frame: &FrameRecord, ball_center: &Point) -> Option<TrackId> {
        let mut best: Option<(TrackId, f64)> = None;

        for (&id, record) in &frame.players {
            let distance = record
                .bbox
                .bottom_left()
                .distance(ball_center)
                .min(record.bbox.bottom_right().distance(ball_center));

            if distance > self.max_player_ball_distance {
                continue;
            }
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((id, distance));
            }
        }

        best.map(|(id, _)| id)
    }
}
