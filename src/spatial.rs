// src/spatial.rs
//
// Spatial enrichment of the track store, in three in-place passes that must
// run in order: anchor position from bbox, camera-motion compensation, then
// homography projection into pitch coordinates. Each pass is a pure function
// of its inputs; re-running one overwrites the same values.

use crate::track_store::{EntityClass, TrackStore};
use crate::types::Point;
use crate::view::ViewTransform;
use anyhow::{bail, Result};

/// Write the ground-contact anchor for every entity in every frame: the
/// bottom-center of the bbox for players and referees, the bbox center for
/// the ball.
pub fn add_positions(store: &mut TrackStore) {
    for frame in &mut store.frames {
        for class in EntityClass::ALL {
            for record in frame.class_mut(class).values_mut() {
                let position = match class {
                    EntityClass::Ball => record.bbox.center(),
                    EntityClass::Players | EntityClass::Referees => record.bbox.foot_position(),
                };
                record.position = Some(position);
            }
        }
    }
}

/// Subtract the accumulated camera displacement for each frame, producing
/// positions in a camera-stable image frame.
pub fn adjust_for_camera_movement(store: &mut TrackStore, movement: &[Point]) -> Result<()> {
    if movement.len() < store.frame_count() {
        bail!(
            "Camera movement cache covers {} frames but the clip has {}",
            movement.len(),
            store.frame_count()
        );
    }

    for (frame, displacement) in store.frames.iter_mut().zip(movement) {
        for class in EntityClass::ALL {
            for record in frame.class_mut(class).values_mut() {
                if let Some(position) = record.position {
                    record.position_adjusted = Some(Point::new(
                        position.x - displacement.x,
                        position.y - displacement.y,
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Project camera-compensated positions into pitch coordinates. Points the
/// transform places outside the playing surface stay untransformed; that is
/// expected for entities near the frame edges, not an error.
pub fn add_transformed_positions(store: &mut TrackStore, transform: &dyn ViewTransform) {
    for frame in &mut store.frames {
        for class in EntityClass::ALL {
            for record in frame.class_mut(class).values_mut() {
                record.position_transformed = record
                    .position_adjusted
                    .as_ref()
                    .and_then(|p| transform.transform(p));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track_store::{EntityRecord, BALL_TRACK_ID};
    use crate::types::BBox;

    struct ShiftTransform;

    impl ViewTransform for ShiftTransform {
        fn transform(&self, point: &Point) -> Option<Point> {
            if point.x < 0.0 {
                return None;
            }
            Some(Point::new(point.x + 100.0, point.y + 100.0))
        }
    }

    fn store_with_one_of_each() -> TrackStore {
        let mut store = TrackStore::with_frame_count(1);
        store.frames[0]
            .players
            .insert(9, EntityRecord::new(BBox::new(10.0, 10.0, 30.0, 50.0)));
        store.frames[0]
            .ball
            .insert(BALL_TRACK_ID, EntityRecord::new(BBox::new(0.0, 0.0, 4.0, 4.0)));
        store
    }

    #[test]
    fn test_players_anchor_at_feet_ball_at_center() {
        let mut store = store_with_one_of_each();
        add_positions(&mut store);

        let player = &store.frames[0].players[&9];
        assert_eq!(player.position, Some(Point::new(20.0, 50.0)));

        let ball = store.frames[0].ball_record().unwrap();
        assert_eq!(ball.position, Some(Point::new(2.0, 2.0)));
    }

    #[test]
    fn test_camera_displacement_is_subtracted() {
        let mut store = store_with_one_of_each();
        add_positions(&mut store);
        adjust_for_camera_movement(&mut store, &[Point::new(5.0, -3.0)]).unwrap();

        let player = &store.frames[0].players[&9];
        assert_eq!(player.position_adjusted, Some(Point::new(15.0, 53.0)));
    }

    #[test]
    fn test_short_movement_cache_is_rejected() {
        let mut store = TrackStore::with_frame_count(3);
        add_positions(&mut store);
        assert!(adjust_for_camera_movement(&mut store, &[Point::new(0.0, 0.0)]).is_err());
    }

    #[test]
    fn test_out_of_bounds_projection_stays_unset() {
        let mut store = store_with_one_of_each();
        add_positions(&mut store);
        // Push the ball's adjusted position negative so ShiftTransform
        // reports it outside the playing surface.
        adjust_for_camera_movement(&mut store, &[Point::new(3.0, 0.0)]).unwrap();
        add_transformed_positions(&mut store, &ShiftTransform);

        let player = &store.frames[0].players[&9];
        assert_eq!(player.position_transformed, Some(Point::new(117.0, 150.0)));

        let ball = store.frames[0].ball_record().unwrap();
        assert_eq!(ball.position_transformed, None);
    }
}
