// src/main.rs

use anyhow::{Context, Result};
use tracing::info;

use pitchtrack::evaluation::AccuracyEvaluator;
use pitchtrack::interface::{load_camera_movement, Detector, StubDetector, StubTeamClassifier};
use pitchtrack::pipeline::Pipeline;
use pitchtrack::report::ReportWriter;
use pitchtrack::types::Config;
use pitchtrack::view::HomographyTransform;

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = Config::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("pitchtrack={}", config.logging.level))
        .init();

    info!("⚽ Track Fusion Pipeline Starting");
    info!("✓ Configuration loaded from {}", config_path);

    // All three external collaborators replay persisted caches; nothing here
    // runs model inference or touches video.
    let store = StubDetector::new(&config.stubs.track_store_path)
        .detect()
        .context("Loading detector snapshot")?;
    info!("✓ Track store loaded: {} frames", store.frame_count());

    let camera_movement = load_camera_movement(&config.stubs.camera_movement_path)
        .context("Loading camera movement cache")?;
    let transform = HomographyTransform::from_config(&config.pitch)?;
    let mut classifier = StubTeamClassifier::load(&config.stubs.team_hints_path)
        .context("Loading team hints cache")?;

    let output = Pipeline::new(config.clone()).run(
        store,
        &camera_movement,
        &transform,
        &mut classifier,
    )?;

    output
        .store
        .save(&config.stubs.track_store_path)
        .context("Saving enriched track store snapshot")?;
    info!(
        "✓ Updated track store saved to {}",
        config.stubs.track_store_path
    );

    let report = AccuracyEvaluator::new(config.evaluation.clone()).evaluate(&output.store);
    ReportWriter::new(config.report.clone()).write(&report)?;

    let stats = &output.stats;
    info!("\n✓ Clip processed successfully!");
    info!("  Total frames: {}", stats.total_frames);
    info!(
        "  Ball visible (incl. interpolated): {} ({:.1}%)",
        stats.ball_frames,
        100.0 * stats.ball_frames as f64 / stats.total_frames.max(1) as f64
    );
    info!("  Unique players tracked: {}", stats.unique_players);
    info!("  Possession assigned: {} frames", stats.possession_frames);
    info!(
        "  Team control: team 1 {} / team 2 {} / neutral {}",
        stats.team_control_counts[1], stats.team_control_counts[2], stats.team_control_counts[0]
    );

    let mut visibility: Vec<_> = report.visibility.iter().collect();
    visibility.sort_by(|a, b| b.1.total_cmp(a.1));
    for (id, percent) in visibility {
        info!("  Player {id}: visible in {percent:.1}% of sampled frames");
    }

    info!(
        "  Ball Possession Accuracy:    {:.2}%",
        report.summary.possession_accuracy
    );
    info!(
        "  Player Tracking Consistency: {:.2}%",
        report.summary.tracking_consistency
    );
    info!(
        "  Team Assignment Accuracy:    {:.2}%",
        report.summary.team_assignment_accuracy
    );
    if let Some(coverage) = report.summary.possession_coverage {
        info!("  Possession Coverage:         {coverage:.2}%");
    }

    Ok(())
}
