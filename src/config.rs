use crate::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(
            parsed.possession.max_player_ball_distance,
            Config::default().possession.max_player_ball_distance
        );
        assert_eq!(parsed.pitch.image_corners, Config::default().pitch.image_corners);
    }

    #[test]
    fn test_load_rejects_missing_file() {
        assert!(Config::load("definitely/not/here.yaml").is_err());
    }
}
