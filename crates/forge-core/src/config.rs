use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::path::Path;
use std::{fmt, str::FromStr};

use crate::error::ErrorCode;
use crate::model::ParseEnumError;

/// Environment variable that overrides `[layout] direction`.
pub const DIRECTION_ENV: &str = "FORGE_LAYOUT_DIRECTION";

/// Flow direction of dependency edges in the laid-out diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Down,
    Up,
    Right,
    Left,
}

impl Direction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
            Self::Right => "right",
            Self::Left => "left",
        }
    }

    /// `true` when ranks advance along the x axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Right | Self::Left)
    }

    /// `true` when ranks advance toward negative coordinates.
    #[must_use]
    pub const fn is_reversed(self) -> bool {
        matches!(self, Self::Up | Self::Left)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "down" | "tb" | "td" => Ok(Self::Down),
            "up" | "bt" => Ok(Self::Up),
            "right" | "lr" => Ok(Self::Right),
            "left" | "rl" => Ok(Self::Left),
            _ => Err(ParseEnumError {
                expected: "direction",
                got: s.to_string(),
            }),
        }
    }
}

/// Ranking strategy used by the layered delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutAlgorithm {
    /// Longest-path ranking followed by edge-length tightening.
    #[default]
    Layered,
    /// Plain longest-path ranking: every node as close to the sources as
    /// its predecessors allow.
    LongestPath,
}

/// Parameters for one auto-layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoLayoutOptions {
    #[serde(default)]
    pub direction: Direction,
    /// Gap between neighbouring nodes inside one rank.
    #[serde(default = "default_node_spacing")]
    pub node_spacing: f64,
    /// Gap between consecutive ranks.
    #[serde(default = "default_level_spacing")]
    pub level_spacing: f64,
    /// Lane width reserved for an edge passing through a rank.
    #[serde(default = "default_edge_spacing")]
    pub edge_spacing: f64,
    #[serde(default)]
    pub algorithm: LayoutAlgorithm,
}

impl Default for AutoLayoutOptions {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            node_spacing: default_node_spacing(),
            level_spacing: default_level_spacing(),
            edge_spacing: default_edge_spacing(),
            algorithm: LayoutAlgorithm::default(),
        }
    }
}

impl AutoLayoutOptions {
    #[must_use]
    pub const fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

/// Default placement grid for nodes without a stored position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_cell_width")]
    pub cell_width: f64,
    #[serde(default = "default_cell_height")]
    pub cell_height: f64,
    #[serde(default = "default_per_row")]
    pub per_row: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_width: default_cell_width(),
            cell_height: default_cell_height(),
            per_row: default_per_row(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Tags shown as individual nodes; every other tag starts collapsed.
    #[serde(default)]
    pub expanded: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub layout: AutoLayoutOptions,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub clustering: ClusteringConfig,
}

/// Load `.forge/config.toml` under `project_root`, or defaults if absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".forge/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content).with_context(|| {
        format!(
            "{}: failed to parse {}",
            ErrorCode::ConfigParseError,
            path.display()
        )
    })
}

/// Load the project config and apply environment overrides.
///
/// # Errors
///
/// Returns an error if the config file is unreadable or malformed, or if
/// `FORGE_LAYOUT_DIRECTION` holds an unknown direction.
pub fn resolve_config(project_root: &Path) -> Result<ProjectConfig> {
    let mut config = load_project_config(project_root)?;
    let env_direction = env::var(DIRECTION_ENV).ok();
    config.layout.direction = resolve_direction(config.layout.direction, env_direction.as_deref())?;
    Ok(config)
}

fn resolve_direction(file_value: Direction, env_value: Option<&str>) -> Result<Direction> {
    match env_value.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => {
            let direction = raw
                .parse::<Direction>()
                .with_context(|| format!("invalid {DIRECTION_ENV}"))?;
            tracing::debug!(%direction, "layout direction overridden from environment");
            Ok(direction)
        }
        None => Ok(file_value),
    }
}

const fn default_node_spacing() -> f64 {
    50.0
}

const fn default_level_spacing() -> f64 {
    80.0
}

const fn default_edge_spacing() -> f64 {
    20.0
}

const fn default_cell_width() -> f64 {
    250.0
}

const fn default_cell_height() -> f64 {
    150.0
}

const fn default_per_row() -> usize {
    5
}
