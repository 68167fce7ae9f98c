//! Deterministic field simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Wall-clock timestamps are explicit parameters, never sampled internally
//! - Seeded RNG only (owned by `GameWorld`)
//! - No rendering or platform dependencies

pub mod engine;
pub mod r#gen;
pub mod grid;
pub mod jungle;
pub mod portal;
pub mod sea;
pub mod space;
pub mod state;

pub use engine::{FieldEngine, RunEnd, Scene, SceneLayer, StepOutcome};
pub use grid::{in_bounds, manhattan, wrap, STEPS_AND_STAY};
pub use state::{
    Bomb, Enemy, EnemyKind, FieldKind, FieldView, Food, FoodKind, FruitCounters, GameWorld,
    Obstacle, ObstacleKind, PlanetSize, Portal, Snake,
};
