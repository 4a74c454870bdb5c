// src/team.rs
//
// Team identity resolution. The color classifier is consulted exactly once
// per track ID; its first answer is cached in an append-only map and reused
// for every later frame. Per-frame classification is much noisier than the
// underlying truth (a player does not change team mid-clip), so the cache
// deliberately ignores whatever the classifier would say on later frames.

use crate::interface::TeamClassifier;
use crate::track_store::{TeamLabel, TrackId, TrackStore};
use crate::types::BBox;
use anyhow::Result;
use std::collections::HashMap;
use tracing::debug;

pub struct TeamResolver {
    cache: HashMap<TrackId, TeamLabel>,
    team_colors: [[u8; 3]; 2],
}

impl TeamResolver {
    pub fn new(team_colors: [[u8; 3]; 2]) -> Self {
        Self {
            cache: HashMap::new(),
            team_colors,
        }
    }

    /// Display color for a resolved label. Labels outside {1, 2} (possible
    /// with a misbehaving classifier) fall back to a neutral grey.
    pub fn color_for(&self, team: TeamLabel) -> [u8; 3] {
        match team {
            1 => self.team_colors[0],
            2 => self.team_colors[1],
            _ => [128, 128, 128],
        }
    }

    /// Resolve the team for one track ID, consulting the classifier only on
    /// the first encounter.
    pub fn resolve(
        &mut self,
        classifier: &mut dyn TeamClassifier,
        frame_index: usize,
        track_id: TrackId,
        bbox: &BBox,
    ) -> Result<TeamLabel> {
        if let Some(&team) = self.cache.get(&track_id) {
            return Ok(team);
        }
        let team = classifier.classify(frame_index, track_id, bbox)?;
        debug!(track_id, team, frame_index, "team locked for track");
        self.cache.insert(track_id, team);
        Ok(team)
    }

    /// Stamp the resolved team and its display color onto every player
    /// record, frame-sequentially. Referees and the ball are never
    /// classified and keep `team` unset. Teams already present in the store
    /// (a resumed snapshot) are adopted into the cache unchanged.
    pub fn assign_teams(
        &mut self,
        store: &mut TrackStore,
        classifier: &mut dyn TeamClassifier,
    ) -> Result<()> {
        for frame_index in 0..store.frame_count() {
            let ids: Vec<TrackId> = store.frames[frame_index].players.keys().copied().collect();
            for id in ids {
                let cached = self.cache.get(&id).copied();
                let existing = store.frames[frame_index].players[&id].team;
                let bbox = store.frames[frame_index].players[&id].bbox;

                let team = if let Some(team) = cached {
                    team
                } else if let Some(team) = existing {
                    self.cache.insert(id, team);
                    team
                } else {
                    self.resolve(classifier, frame_index, id, &bbox)?
                };

                let color = self.color_for(team);
                if let Some(record) = store.frames[frame_index].players.get_mut(&id) {
                    record.team = Some(team);
                    record.team_color = Some(color);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track_store::EntityRecord;
    use crate::types::BBox;

    /// Returns a scripted label per (frame, track) call and counts calls.
    struct ScriptedClassifier {
        labels: Vec<TeamLabel>,
        calls: usize,
    }

    impl ScriptedClassifier {
        fn new(labels: Vec<TeamLabel>) -> Self {
            Self { labels, calls: 0 }
        }
    }

    impl TeamClassifier for ScriptedClassifier {
        fn classify(
            &mut self,
            _frame_index: usize,
            _track_id: TrackId,
            _bbox: &BBox,
        ) -> Result<TeamLabel> {
            let label = self.labels[self.calls.min(self.labels.len() - 1)];
            self.calls += 1;
            Ok(label)
        }
    }

    fn store_with_player(frames: usize, id: TrackId) -> TrackStore {
        let mut store = TrackStore::with_frame_count(frames);
        for frame in 0..frames {
            store.frames[frame]
                .players
                .insert(id, EntityRecord::new(BBox::new(0.0, 0.0, 10.0, 20.0)));
        }
        store
    }

    #[test]
    fn test_first_label_sticks_despite_classifier_noise() {
        // Track 17: classified team 1 on first sight; the classifier would
        // say team 2 on every later frame. The cache must win.
        let mut store = store_with_player(60, 17);
        let mut classifier = ScriptedClassifier::new(vec![1, 2, 2, 2]);
        let mut resolver = TeamResolver::new([[255, 0, 0], [0, 0, 255]]);

        resolver.assign_teams(&mut store, &mut classifier).unwrap();

        assert_eq!(store.frames[0].players[&17].team, Some(1));
        assert_eq!(store.frames[50].players[&17].team, Some(1));
        assert_eq!(classifier.calls, 1, "classifier consulted once per track");
    }

    #[test]
    fn test_team_color_derived_from_label() {
        let mut store = store_with_player(1, 3);
        let mut classifier = ScriptedClassifier::new(vec![2]);
        let mut resolver = TeamResolver::new([[255, 0, 0], [0, 0, 255]]);

        resolver.assign_teams(&mut store, &mut classifier).unwrap();

        assert_eq!(store.frames[0].players[&3].team_color, Some([0, 0, 255]));
    }

    #[test]
    fn test_referees_stay_unclassified() {
        let mut store = TrackStore::with_frame_count(2);
        for frame in 0..2 {
            store.frames[frame]
                .referees
                .insert(40, EntityRecord::new(BBox::new(0.0, 0.0, 10.0, 20.0)));
        }
        let mut classifier = ScriptedClassifier::new(vec![1]);
        let mut resolver = TeamResolver::new([[255, 0, 0], [0, 0, 255]]);

        resolver.assign_teams(&mut store, &mut classifier).unwrap();

        assert_eq!(store.frames[0].referees[&40].team, None);
        assert_eq!(classifier.calls, 0);
    }

    #[test]
    fn test_resumed_snapshot_labels_are_adopted_not_reclassified() {
        let mut store = store_with_player(3, 8);
        store.frames[0].players.get_mut(&8).unwrap().team = Some(2);

        let mut classifier = ScriptedClassifier::new(vec![1]);
        let mut resolver = TeamResolver::new([[255, 0, 0], [0, 0, 255]]);
        resolver.assign_teams(&mut store, &mut classifier).unwrap();

        assert_eq!(store.frames[2].players[&8].team, Some(2));
        assert_eq!(classifier.calls, 0, "existing label adopted without a classifier call");
    }
}
