// src/interpolation.rs
//
// Gap repair for the ball track. The tracker loses the ball for stretches of
// frames (occlusion, motion blur); downstream possession resolution wants a
// dense bbox sequence. Missing frames between two detections are filled by
// linear interpolation of the bbox coordinates. Frames before the first
// detection or after the last are left empty: the filler never extrapolates.

use crate::track_store::{EntityRecord, TrackStore, BALL_TRACK_ID};
use crate::types::BBox;

/// Fill interior gaps in the ball track in place. Deterministic and
/// idempotent: a store without interior gaps passes through unchanged.
pub fn interpolate_ball_track(store: &mut TrackStore) {
    let observed: Vec<Option<BBox>> = store
        .frames
        .iter()
        .map(|frame| frame.ball_record().map(|r| r.bbox))
        .collect();

    let known: Vec<usize> = observed
        .iter()
        .enumerate()
        .filter_map(|(i, b)| b.map(|_| i))
        .collect();

    for pair in known.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        if end - start <= 1 {
            continue;
        }

        let from = observed[start].unwrap();
        let to = observed[end].unwrap();
        let span = (end - start) as f64;

        for frame in start + 1..end {
            let t = (frame - start) as f64 / span;
            let bbox = BBox::new(
                lerp(from.x1, to.x1, t),
                lerp(from.y1, to.y1, t),
                lerp(from.x2, to.x2, t),
                lerp(from.y2, to.y2, t),
            );
            store.frames[frame]
                .ball
                .insert(BALL_TRACK_ID, EntityRecord::new(bbox));
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball_at(center_x: f64, center_y: f64) -> EntityRecord {
        EntityRecord::new(BBox::new(
            center_x - 2.0,
            center_y - 2.0,
            center_x + 2.0,
            center_y + 2.0,
        ))
    }

    fn store_with_gap() -> TrackStore {
        // Ball seen at frames 4 and 10, missing for 5..=9.
        let mut store = TrackStore::with_frame_count(12);
        store.frames[4].ball.insert(BALL_TRACK_ID, ball_at(0.0, 0.0));
        store.frames[10].ball.insert(BALL_TRACK_ID, ball_at(10.0, 0.0));
        store
    }

    #[test]
    fn test_gap_is_filled_linearly() {
        let mut store = store_with_gap();
        interpolate_ball_track(&mut store);

        for frame in 5..=9 {
            assert!(store.frames[frame].ball_record().is_some(), "frame {frame}");
        }

        // Frame 7 sits 3/6 of the way through the gap: center x = 5.
        let center = store.frames[7].ball_record().unwrap().bbox.center();
        assert!((center.x - 5.0).abs() < 1e-9);
        assert!(center.y.abs() < 1e-9);
    }

    #[test]
    fn test_leading_and_trailing_gaps_stay_empty() {
        let mut store = store_with_gap();
        interpolate_ball_track(&mut store);

        for frame in 0..4 {
            assert!(store.frames[frame].ball_record().is_none(), "frame {frame}");
        }
        assert!(store.frames[11].ball_record().is_none());
    }

    #[test]
    fn test_interpolation_is_idempotent() {
        let mut once = store_with_gap();
        interpolate_ball_track(&mut once);

        let mut twice = once.clone();
        interpolate_ball_track(&mut twice);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_adjacent_detections_are_untouched() {
        let mut store = TrackStore::with_frame_count(2);
        store.frames[0].ball.insert(BALL_TRACK_ID, ball_at(1.0, 1.0));
        store.frames[1].ball.insert(BALL_TRACK_ID, ball_at(2.0, 2.0));

        let before = store.clone();
        interpolate_ball_track(&mut store);
        assert_eq!(store, before);
    }
}
