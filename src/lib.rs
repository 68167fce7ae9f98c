//! Snake Fields - field/level engine for a grid snake arcade game
//!
//! Core modules:
//! - `sim`: Deterministic field simulation (procedural layouts, enemy
//!   behavior, portals, collision arbitration)
//! - `settings`: Run settings and presets
//!
//! Rendering, input handling and the outer game loop live in the host;
//! this crate owns everything behind the field boundary.

pub mod settings;
pub mod sim;

pub use settings::{BorderMode, SelfHitBehavior, Settings};
pub use sim::{
    Bomb, Enemy, EnemyKind, FieldEngine, FieldKind, Food, FoodKind, FruitCounters, GameWorld,
    Obstacle, ObstacleKind, Portal, RunEnd, Snake, StepOutcome,
};

/// Game configuration constants
pub mod consts {
    /// Points needed since the last portal entry before a new portal may spawn
    pub const PORTAL_THRESHOLD: u32 = 10;
    /// Score delta after jungle entry that summons the king monkey
    pub const KING_MONKEY_THRESHOLD: u32 = 5;

    /// Fraction of field area that planet tiles may occupy
    pub const PLANET_OCCUPANCY_CAP: f64 = 0.07;
    /// Fraction of field area kept populated with fruit
    pub const FOOD_DENSITY: f64 = 0.0075;

    /// Attempt budgets for rejection-sampled placement. Every placement
    /// routine degrades to an unchecked fallback rather than failing.
    pub const PORTAL_SPAWN_ATTEMPTS: u32 = 200;
    pub const SAFE_SPAWN_ATTEMPTS: u32 = 100;
    pub const PLANET_PLACE_ATTEMPTS: u32 = 400;
    pub const FOOD_SPAWN_ATTEMPTS: u32 = 200;
    pub const SINGLE_FOOD_ATTEMPTS: u32 = 100;
    pub const BOMB_SPAWN_ATTEMPTS: u32 = 100;
    pub const MONKEY_PLACE_ATTEMPTS: u32 = 100;
    pub const FISH_PLACE_ATTEMPTS: u32 = 200;
    /// Budget for drawing distinct spawn columns before allowing repeats
    pub const DISTINCT_COLUMN_ATTEMPTS: u32 = 200;
    /// Retries to keep two snakes from emerging on the same cell
    pub const DISTINCT_SPAWN_ATTEMPTS: u32 = 50;

    /// Safe-spawn spiral search radius around the field center
    pub const SPIRAL_MAX_RADIUS: i32 = 5;

    /// Per-entity movement intervals in milliseconds, jittered per instance
    pub const MONKEY_INTERVAL_MS: (f64, f64) = (800.0, 1200.0);
    pub const KING_MONKEY_INTERVAL_MS: (f64, f64) = (400.0, 600.0);
    pub const ASTEROID_INTERVAL_MS: (f64, f64) = (300.0, 600.0);
    pub const BIG_ASTEROID_INTERVAL_MS: (f64, f64) = (350.0, 600.0);
    pub const FISH_INTERVAL_MS: (f64, f64) = (500.0, 800.0);
    pub const BUBBLE_INTERVAL_MS: (f64, f64) = (250.0, 450.0);

    /// Horizontal fish steps between vertical dives
    pub const FISH_STEPS_PER_DIVE: u32 = 5;

    /// Big asteroids span this many columns on their obstacle row
    pub const BIG_ASTEROID_WIDTH: i32 = 3;
}
