// src/types.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub video: VideoConfig,
    pub stubs: StubConfig,
    pub pitch: PitchConfig,
    pub kinematics: KinematicsConfig,
    pub possession: PossessionConfig,
    pub teams: TeamConfig,
    pub evaluation: EvaluationConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Broadcast clip frame rate, used to convert frame spans to seconds.
    pub frame_rate: f64,
}

/// Persisted caches produced by the external detector and camera estimator.
/// Loading these skips re-running inference entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StubConfig {
    pub track_store_path: String,
    pub camera_movement_path: String,
    pub team_hints_path: String,
}

/// Four image-space points with known pitch-space counterparts. The
/// homography is solved from these correspondences; pitch_width/pitch_length
/// also bound the valid playing-surface region after projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchConfig {
    pub image_corners: [[f64; 2]; 4],
    pub pitch_corners: [[f64; 2]; 4],
    pub pitch_width: f64,
    pub pitch_length: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinematicsConfig {
    /// Sampling window in frames for speed/distance estimation.
    pub window_frames: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PossessionConfig {
    /// Maximum foot-to-ball distance (pixels) for a player to be eligible.
    pub max_player_ball_distance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamConfig {
    /// Display colors for team labels 1 and 2.
    pub team_colors: [[u8; 3]; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Evaluate every Nth frame.
    pub frame_sample_rate: usize,
    /// A track is "consistent" when visibility ratio is strictly above this.
    pub tracking_threshold: f64,
    /// Also report the share of sampled frames with an assigned possessor.
    /// The literal possession-accuracy metric only counts frames where
    /// `has_ball` was written, which the resolver only does on success, so
    /// it degenerates to 100% — this column is the honest companion number.
    pub report_possession_coverage: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_dir: String,
    pub summary_csv: String,
    pub visibility_csv: String,
    pub summary_chart: String,
    pub visibility_chart: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            video: VideoConfig { frame_rate: 24.0 },
            stubs: StubConfig {
                track_store_path: "stubs/track_store.json".to_string(),
                camera_movement_path: "stubs/camera_movement.json".to_string(),
                team_hints_path: "stubs/team_hints.json".to_string(),
            },
            pitch: PitchConfig::default(),
            kinematics: KinematicsConfig { window_frames: 5 },
            possession: PossessionConfig {
                max_player_ball_distance: 70.0,
            },
            teams: TeamConfig {
                team_colors: [[235, 235, 235], [60, 60, 200]],
            },
            evaluation: EvaluationConfig {
                frame_sample_rate: 10,
                tracking_threshold: 0.4,
                report_possession_coverage: false,
            },
            report: ReportConfig {
                output_dir: "output".to_string(),
                summary_csv: "accuracy_report.csv".to_string(),
                visibility_csv: "player_visibility.csv".to_string(),
                summary_chart: "evaluation_accuracy_summary.png".to_string(),
                visibility_chart: "player_visibility_chart.png".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for PitchConfig {
    fn default() -> Self {
        // Calibrated for a fixed broadcast camera: a trapezoid of the visible
        // pitch mapped onto a 68m x 23.32m strip of the playing surface.
        Self {
            image_corners: [
                [110.0, 1035.0],
                [265.0, 275.0],
                [910.0, 260.0],
                [1700.0, 915.0],
            ],
            pitch_corners: [[0.0, 68.0], [0.0, 0.0], [23.32, 0.0], [23.32, 68.0]],
            pitch_width: 68.0,
            pitch_length: 23.32,
        }
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned box in image coordinates, [x1, y1] top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) * 0.5, (self.y1 + self.y2) * 0.5)
    }

    /// Contact point with the ground: bottom-center of the box.
    pub fn foot_position(&self) -> Point {
        Point::new((self.x1 + self.x2) * 0.5, self.y2)
    }

    pub fn bottom_left(&self) -> Point {
        Point::new(self.x1, self.y2)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.x2, self.y2)
    }
}
