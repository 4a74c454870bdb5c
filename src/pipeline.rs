// src/pipeline.rs
//
// Stage orchestration. The store is fully buffered and exclusively owned for
// the duration of the run; stages execute in dependency order, each a plain
// function over the store, so the ordering constraints (possession needs
// teams, kinematics needs projections) are visible right here and every
// stage stays independently testable.

use crate::interface::TeamClassifier;
use crate::interpolation;
use crate::kinematics::KinematicsAggregator;
use crate::possession::PossessionResolver;
use crate::spatial;
use crate::team::TeamResolver;
use crate::track_store::{TeamLabel, TrackStore, NEUTRAL_TEAM};
use crate::types::{Config, Point};
use crate::view::ViewTransform;
use anyhow::Result;
use std::collections::BTreeSet;
use tracing::info;

pub struct PipelineOutput {
    pub store: TrackStore,
    pub team_control: Vec<TeamLabel>,
    pub stats: PipelineStats,
}

/// Run summary, logged at the end of a clip.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub total_frames: usize,
    pub ball_frames: usize,
    pub unique_players: usize,
    pub possession_frames: usize,
    pub team_control_counts: [usize; 3], // neutral, team 1, team 2
}

pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn run(
        &self,
        mut store: TrackStore,
        camera_movement: &[Point],
        transform: &dyn ViewTransform,
        classifier: &mut dyn TeamClassifier,
    ) -> Result<PipelineOutput> {
        info!(frames = store.frame_count(), "pipeline start");

        spatial::add_positions(&mut store);
        spatial::adjust_for_camera_movement(&mut store, camera_movement)?;
        spatial::add_transformed_positions(&mut store, transform);
        info!("spatial adjustment complete");

        interpolation::interpolate_ball_track(&mut store);
        info!("ball gaps filled");

        KinematicsAggregator::new(
            self.config.kinematics.window_frames,
            self.config.video.frame_rate,
        )
        .add_speed_and_distance(&mut store);
        info!("speed and distance aggregated");

        let mut teams = TeamResolver::new(self.config.teams.team_colors);
        teams.assign_teams(&mut store, classifier)?;
        info!("team identities resolved");

        let team_control =
            PossessionResolver::new(self.config.possession.max_player_ball_distance)
                .resolve(&mut store);
        info!("possession resolved");

        let stats = collect_stats(&store, &team_control);
        Ok(PipelineOutput {
            store,
            team_control,
            stats,
        })
    }
}

fn collect_stats(store: &TrackStore, team_control: &[TeamLabel]) -> PipelineStats {
    let unique_players: BTreeSet<_> = store
        .frames
        .iter()
        .flat_map(|frame| frame.players.keys().copied())
        .collect();

    let mut counts = [0usize; 3];
    for &team in team_control {
        let slot = match team {
            NEUTRAL_TEAM => 0,
            1 => 1,
            _ => 2,
        };
        counts[slot] += 1;
    }

    PipelineStats {
        total_frames: store.frame_count(),
        ball_frames: store
            .frames
            .iter()
            .filter(|frame| frame.ball_record().is_some())
            .count(),
        unique_players: unique_players.len(),
        possession_frames: store
            .frames
            .iter()
            .filter(|frame| frame.possession_holder().is_some())
            .count(),
        team_control_counts: counts,
    }
}
