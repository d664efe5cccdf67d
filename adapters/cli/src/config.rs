//! Loading session settings from TOML files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use path_defence_engine::SessionConfig;

/// Reads the session settings, falling back to defaults without a file.
pub(crate) fn load(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read session config at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid session config in {}", path.display()))
}

pub(crate) fn parse(contents: &str) -> Result<SessionConfig> {
    toml::from_str(contents).context("failed to parse session config toml contents")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("").expect("empty config parses");
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn sections_override_individual_fields() {
        let config = parse(
            r#"
            [rules]
            starting_lives = 5
            tower_range = 128.0

            [waves]
            initial_countdown = 31

            [combat]
            attack_period_ms = 250

            [map]
            columns = 8
            rows = 4
            waypoints = [[0, 1], [7, 1]]
            "#,
        )
        .expect("config parses");

        assert_eq!(config.rules.starting_lives, 5);
        assert_eq!(config.rules.tower_cost, 50);
        assert!((config.rules.tower_range - 128.0).abs() < f32::EPSILON);
        assert_eq!(config.waves.initial_countdown, 31);
        assert_eq!(config.waves.wave_length, 30);
        assert_eq!(config.combat.attack_period_ms, 250);
        assert_eq!((config.map.columns, config.map.rows), (8, 4));
        assert_eq!(config.map.waypoints, vec![[0, 1], [7, 1]]);
    }

    #[test]
    fn mistyped_values_are_reported() {
        let error = parse("[rules]\nstarting_lives = \"many\"\n").expect_err("wrong type");
        assert!(error.to_string().contains("toml"));
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let error = load(Some(Path::new("/nonexistent/path-defence.toml")))
            .expect_err("file does not exist");
        assert!(format!("{error:#}").contains("/nonexistent/path-defence.toml"));
    }

    #[test]
    fn no_file_means_defaults() {
        assert_eq!(load(None).expect("defaults"), SessionConfig::default());
    }
}
