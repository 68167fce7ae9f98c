//! Run settings and presets
//!
//! Persisted by the host between runs; the engine only reads them.

use serde::{Deserialize, Serialize};

/// Base tile density for the smaller field dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FieldSizePreset {
    Small,
    #[default]
    Medium,
    Large,
    Huge,
}

impl FieldSizePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldSizePreset::Small => "Small",
            FieldSizePreset::Medium => "Medium",
            FieldSizePreset::Large => "Large",
            FieldSizePreset::Huge => "Huge",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" => Some(FieldSizePreset::Small),
            "medium" | "med" => Some(FieldSizePreset::Medium),
            "large" => Some(FieldSizePreset::Large),
            "huge" => Some(FieldSizePreset::Huge),
            _ => None,
        }
    }

    /// Tiles along the smaller screen dimension
    pub fn base_density(&self) -> i32 {
        match self {
            FieldSizePreset::Small => 15,
            FieldSizePreset::Medium => 20,
            FieldSizePreset::Large => 25,
            FieldSizePreset::Huge => 30,
        }
    }
}

/// Host loop cadence (continuous mode only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedPreset {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl SpeedPreset {
    /// Milliseconds between host ticks
    pub fn tick_interval_ms(&self) -> u64 {
        match self {
            SpeedPreset::Slow => 250,
            SpeedPreset::Medium => 150,
            SpeedPreset::Fast => 80,
        }
    }
}

/// What happens when the head leaves the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BorderMode {
    /// Hitting a border ends the run
    #[default]
    Solid,
    /// The head wraps to the opposite edge
    Wrap,
}

/// What happens when the head would land on the snake's own body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SelfHitBehavior {
    /// Refuse the move and let the player pick a new direction
    #[default]
    BlockMove,
    /// End the run
    EndRun,
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Field size preset
    pub field_size: FieldSizePreset,
    /// Loop speed preset
    pub speed: SpeedPreset,
    /// Border behavior
    pub border: BorderMode,
    /// Self-collision behavior
    pub self_hit: SelfHitBehavior,
    /// Bombs spawned per field
    pub bomb_count: u32,
    /// Whether portals may spawn at all
    pub portals_enabled: bool,
    /// Turn-based mode: snakes only advance on explicit player input
    pub turn_based: bool,
    /// Two snakes with individual scores
    pub multiplayer: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field_size: FieldSizePreset::Medium,
            speed: SpeedPreset::Medium,
            border: BorderMode::Solid,
            self_hit: SelfHitBehavior::BlockMove,
            bomb_count: 1,
            portals_enabled: true,
            turn_based: false,
            multiplayer: false,
        }
    }
}

impl Settings {
    /// Serialize for host-side persistence
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Restore from persisted JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
