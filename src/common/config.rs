use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

pub fn config_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".config")
        .join("rowtile")
        .join("config.toml")
}

#[derive(Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "yes")]
    pub animate: bool,
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub animation: AnimationSettings,
    #[serde(default)]
    pub cursor: CursorSettings,
    #[serde(default)]
    pub resize: ResizeSettings,
    #[serde(default)]
    pub float: FloatSettings,
    #[serde(default)]
    pub highlight: HighlightSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    /// Gap between row neighbors before display scaling.
    #[serde(default = "default_window_spacing")]
    pub window_spacing: i32,
    /// Fraction of the display height unfocused windows are pushed down by.
    #[serde(default = "default_out_of_focus_offset")]
    pub out_of_focus_offset: f64,
    #[serde(default = "yes")]
    pub preposition_new_windows: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            window_spacing: default_window_spacing(),
            out_of_focus_offset: default_out_of_focus_offset(),
            preposition_new_windows: true,
        }
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.window_spacing <= 0 {
            issues.push(format!(
                "layout.window_spacing must be positive (got {})",
                self.window_spacing
            ));
        }
        if !(0.0..1.0).contains(&self.out_of_focus_offset) {
            issues.push(format!(
                "layout.out_of_focus_offset must be in [0, 1) (got {})",
                self.out_of_focus_offset
            ));
        }
        issues
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct AnimationSettings {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "move_duration_ms", default = "default_move_duration")]
    pub move_duration: Duration,
}

impl Default for AnimationSettings {
    fn default() -> Self { Self { move_duration: default_move_duration() } }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct CursorSettings {
    #[serde(default = "yes")]
    pub follows_focus: bool,
    #[serde(default = "default_cursor_fps")]
    pub fps: f64,
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self {
            follows_focus: true,
            fps: default_cursor_fps(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct ResizeSettings {
    #[serde(default = "default_horizontal_ratios")]
    pub horizontal_ratios: Vec<f64>,
    #[serde(default = "default_vertical_ratios")]
    pub vertical_ratios: Vec<f64>,
}

impl Default for ResizeSettings {
    fn default() -> Self {
        Self {
            horizontal_ratios: default_horizontal_ratios(),
            vertical_ratios: default_vertical_ratios(),
        }
    }
}

impl ResizeSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (name, ratios) in [
            ("horizontal_ratios", &self.horizontal_ratios),
            ("vertical_ratios", &self.vertical_ratios),
        ] {
            if ratios.is_empty() {
                issues.push(format!("resize.{name} must not be empty"));
            }
            for ratio in ratios {
                if !(*ratio > 0.0 && *ratio <= 1.0) {
                    issues.push(format!("resize.{name} contains {ratio}, expected (0, 1]"));
                }
            }
        }
        issues
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct FloatSettings {
    #[serde(default = "default_drop_offset")]
    pub drop_offset: i32,
}

impl Default for FloatSettings {
    fn default() -> Self { Self { drop_offset: default_drop_offset() } }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct HighlightSettings {
    #[serde(default = "yes")]
    pub enabled: bool,
}

impl Default for HighlightSettings {
    fn default() -> Self { Self { enabled: true } }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            animate: true,
            layout: LayoutSettings::default(),
            animation: AnimationSettings::default(),
            cursor: CursorSettings::default(),
            resize: ResizeSettings::default(),
            float: FloatSettings::default(),
            highlight: HighlightSettings::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        issues.extend(self.layout.validate());
        issues.extend(self.resize.validate());
        if self.cursor.fps <= 0.0 {
            issues.push(format!("cursor.fps must be positive (got {})", self.cursor.fps));
        }
        issues
    }
}

fn yes() -> bool { true }

fn default_window_spacing() -> i32 { 16 }

fn default_out_of_focus_offset() -> f64 { 0.05 }

fn default_move_duration() -> Duration { Duration::from_millis(250) }

fn default_cursor_fps() -> f64 { 30.0 }

fn default_horizontal_ratios() -> Vec<f64> { vec![0.35, 0.5, 0.65] }

fn default_vertical_ratios() -> Vec<f64> { vec![0.35, 0.5, 0.65, 0.9] }

fn default_drop_offset() -> i32 { 150 }

const DEFAULT_CONFIG: &str = include_str!("../../rowtile.default.toml");

impl Default for Config {
    fn default() -> Self {
        match Self::parse(DEFAULT_CONFIG) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("bundled default config is invalid: {e:#}");
                Config { settings: Settings::default() }
            }
        }
    }
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&buf)
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        match toml::from_str::<ConfigFile>(buf) {
            Ok(c) => Ok(Config { settings: c.settings }),
            Err(e) => bail!("{e}"),
        }
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.validate() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_builtin_defaults() {
        let config = Config::default();
        assert!(config.settings.animate);
        assert_eq!(config.settings.layout, LayoutSettings::default());
        assert_eq!(config.settings.animation.move_duration, Duration::from_millis(250));
        assert_eq!(config.settings.resize, ResizeSettings::default());
        assert_eq!(config.settings.float.drop_offset, 150);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = Config::parse(
            r#"
            [settings]
            animate = false
            [settings.layout]
            window_spacing = 24
            "#,
        )
        .unwrap();
        assert!(!config.settings.animate);
        assert_eq!(config.settings.layout.window_spacing, 24);
        assert_eq!(config.settings.layout.out_of_focus_offset, 0.05);
        assert_eq!(config.settings.cursor, CursorSettings::default());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = Config::parse("[settings]\nanimte = true\n").unwrap_err();
        assert!(err.to_string().contains("animte"), "{err}");
    }

    #[test]
    fn test_validation_reports_bad_values() {
        let mut config = Config::default();
        config.settings.layout.window_spacing = 0;
        config.settings.layout.out_of_focus_offset = 1.5;
        config.settings.resize.vertical_ratios = vec![];
        config.settings.resize.horizontal_ratios = vec![0.5, 1.2];
        config.settings.cursor.fps = 0.0;
        let issues = config.validate();
        assert_eq!(issues.len(), 5, "{issues:#?}");
    }
}
