//! Field data model and shared game state
//!
//! Everything that must be persisted for save/continue and determinism
//! lives here. `GameWorld` is the explicit host context passed into every
//! engine call: grid dimensions, snakes, fruit, bombs, counters, settings
//! and the seeded RNG. Obstacles, enemies and the portal are field-scoped
//! and owned by [`FieldEngine`](crate::sim::FieldEngine).

use std::collections::VecDeque;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::Settings;

/// The four themed fields. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FieldKind {
    #[default]
    Home,
    Jungle,
    Space,
    Sea,
}

impl FieldKind {
    /// Portal destinations outside Home, in cycle order
    pub const NON_HOME: [FieldKind; 3] = [FieldKind::Jungle, FieldKind::Space, FieldKind::Sea];

    /// Name shown in the host UI
    pub fn display_name(&self) -> &'static str {
        match self {
            FieldKind::Home => "🏠 Home",
            FieldKind::Jungle => "🌴 Jungle",
            FieldKind::Space => "🌌 Space",
            FieldKind::Sea => "🌊 Sea",
        }
    }
}

/// Planet footprint size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanetSize {
    /// 3x3 footprint, 5 blocking tiles
    Small,
    /// 5x5 footprint, 13 blocking tiles
    Large,
}

/// What a field tile belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// One tile of a vertical three-tile tree; `segment` is 1..=3 top-down
    Tree { segment: u8 },
    /// One tile of a planet footprint; `sprite` indexes the fixed pattern
    Planet {
        sprite: u8,
        size: PlanetSize,
        center: IVec2,
    },
}

/// A field-scoped static tile. Cleared and regenerated on every field
/// switch. Decorative tiles of multi-tile structures are passable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: IVec2,
    pub kind: ObstacleKind,
    pub blocking: bool,
}

/// Kind-specific enemy state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Monkey,
    KingMonkey,
    Asteroid,
    /// One bottom-row tile of a three-column big asteroid; tiles sharing a
    /// group id live and die together
    BigAsteroidTile { group: u32 },
    Fish {
        sprite: u8,
        dir_x: i32,
        steps_since_dive: u32,
    },
    Bubble { carrying: Option<u64> },
}

/// A field-scoped mobile entity with its own jittered movement timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: IVec2,
    pub kind: EnemyKind,
    pub last_move_ms: f64,
    pub interval_ms: f64,
}

impl Enemy {
    pub fn new(pos: IVec2, kind: EnemyKind, interval_ms: f64) -> Self {
        Self {
            pos,
            kind,
            last_move_ms: 0.0,
            interval_ms,
        }
    }

    /// Whether this enemy's timer has elapsed at `now_ms`
    pub fn due(&self, now_ms: f64) -> bool {
        now_ms - self.last_move_ms > self.interval_ms
    }
}

/// The single live portal, if any. Destination is fixed at spawn time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Portal {
    pub pos: IVec2,
    pub destination: FieldKind,
}

/// Fruit varieties. All are worth one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodKind {
    Strawberry,
    Tomato,
    Lemon,
    Apple,
    Orange,
}

impl FoodKind {
    pub const ALL: [FoodKind; 5] = [
        FoodKind::Strawberry,
        FoodKind::Tomato,
        FoodKind::Lemon,
        FoodKind::Apple,
        FoodKind::Orange,
    ];

    pub fn points(&self) -> u32 {
        1
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            FoodKind::Strawberry => "🍓",
            FoodKind::Tomato => "🍅",
            FoodKind::Lemon => "🍋",
            FoodKind::Apple => "🍎",
            FoodKind::Orange => "🍊",
        }
    }
}

/// A fruit on the field. Ids are stable so a bubble can keep a reference
/// to the fruit it carries across unrelated removals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Food {
    pub id: u64,
    pub pos: IVec2,
    pub kind: FoodKind,
}

/// A bomb. Touching one ends the run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bomb {
    pub pos: IVec2,
}

/// One player's snake: head-first cell sequence plus current direction
/// (zero = none) and individual score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snake {
    pub body: VecDeque<IVec2>,
    pub dir: IVec2,
    pub score: u32,
}

impl Snake {
    pub fn new(head: IVec2) -> Self {
        Self {
            body: VecDeque::from([head]),
            dir: IVec2::ZERO,
            score: 0,
        }
    }

    /// Rebuild as `len` stacked segments on one cell (coiled, about to
    /// emerge after a teleport)
    pub fn coiled(at: IVec2, len: usize, score: u32) -> Self {
        Self {
            body: std::iter::repeat(at).take(len.max(1)).collect(),
            dir: IVec2::ZERO,
            score,
        }
    }

    pub fn head(&self) -> Option<IVec2> {
        self.body.front().copied()
    }

    pub fn occupies(&self, cell: IVec2) -> bool {
        self.body.contains(&cell)
    }
}

/// Per-kind fruit destruction counters, for the host's stats display
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FruitCounters {
    pub monkey: u32,
    pub asteroid: u32,
    pub fish: u32,
    pub bubble: u32,
}

/// Read view over the engine-owned field state, for occupancy checks
/// from routines that only have the shared world
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    pub obstacles: &'a [Obstacle],
    pub portal: Option<IVec2>,
}

impl FieldView<'_> {
    /// An empty field (no obstacles, no portal)
    pub const EMPTY: FieldView<'static> = FieldView {
        obstacles: &[],
        portal: None,
    };

    /// Any structure tile at `cell`, decorative or not
    pub fn obstacle_at(&self, cell: IVec2) -> bool {
        self.obstacles.iter().any(|o| o.pos == cell)
    }

    /// A blocking tile at `cell`
    pub fn blocking_at(&self, cell: IVec2) -> bool {
        self.obstacles.iter().any(|o| o.pos == cell && o.blocking)
    }
}

fn restored_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Host-owned shared state, passed `&mut` into every engine call.
///
/// The engine is the sole mutator of obstacle/enemy/portal state; food,
/// bombs and snakes are mutated both here (snake movement, respawns) and
/// by the engine (enemy-fruit interactions). Single-threaded by design,
/// so the shared ownership is a convention, not a race.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameWorld {
    pub width: i32,
    pub height: i32,
    pub seed: u64,
    pub snakes: Vec<Snake>,
    pub foods: Vec<Food>,
    pub bombs: Vec<Bomb>,
    pub counters: FruitCounters,
    pub settings: Settings,
    /// Movement is held until the player picks a direction (run start and
    /// post-teleport, continuous mode only)
    pub paused_for_redirect: bool,
    next_food_id: u64,
    /// Not serialized; call [`GameWorld::reseed`] after restoring
    #[serde(skip, default = "restored_rng")]
    pub rng: Pcg32,
}

impl GameWorld {
    pub fn new(width: i32, height: i32, settings: Settings, seed: u64) -> Self {
        let center = IVec2::new(width / 2, height / 2);
        let mut snakes = vec![Snake::new(center)];
        if settings.multiplayer {
            snakes.push(Snake::new(IVec2::new(
                (width / 2 + 5).min(width - 1),
                height / 2,
            )));
        }
        Self {
            width,
            height,
            seed,
            snakes,
            foods: Vec::new(),
            bombs: Vec::new(),
            counters: FruitCounters::default(),
            settings,
            paused_for_redirect: false,
            next_food_id: 1,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Restore the RNG from the stored seed after deserialization
    pub fn reseed(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
    }

    /// Combined score across players (single player: the one snake's score)
    pub fn total_score(&self) -> u32 {
        self.snakes.iter().map(|s| s.score).sum()
    }

    pub fn alloc_food_id(&mut self) -> u64 {
        let id = self.next_food_id;
        self.next_food_id += 1;
        id
    }

    /// Uniformly random cell on the field
    pub fn random_cell(&mut self) -> IVec2 {
        IVec2::new(
            self.rng.random_range(0..self.width),
            self.rng.random_range(0..self.height),
        )
    }

    pub fn food_index_at(&self, cell: IVec2) -> Option<usize> {
        self.foods.iter().position(|f| f.pos == cell)
    }

    pub fn remove_food_by_id(&mut self, id: u64) -> bool {
        if let Some(i) = self.foods.iter().position(|f| f.id == id) {
            self.foods.remove(i);
            true
        } else {
            false
        }
    }

    /// Distinct fruit columns, in fruit order
    pub fn fruit_columns(&self) -> Vec<i32> {
        let mut columns = Vec::new();
        for food in &self.foods {
            if !columns.contains(&food.pos.x) {
                columns.push(food.pos.x);
            }
        }
        columns
    }

    /// Column of a random fruit (weighted by fruit count), if any exist
    pub fn random_fruit_column(&mut self) -> Option<i32> {
        if self.foods.is_empty() {
            return None;
        }
        let i = self.rng.random_range(0..self.foods.len());
        Some(self.foods[i].pos.x)
    }

    /// Any segment of any snake at `cell`
    pub fn snake_at(&self, cell: IVec2) -> bool {
        self.snakes.iter().any(|s| s.occupies(cell))
    }

    /// Any snake head at `cell`
    pub fn snake_head_at(&self, cell: IVec2) -> bool {
        self.snakes.iter().any(|s| s.head() == Some(cell))
    }

    /// Fruit population target for this field size
    pub fn target_food_count(&self) -> usize {
        let area = (self.width as f64) * (self.height as f64);
        ((area * FOOD_DENSITY).floor() as usize).max(1)
    }

    /// General occupancy: snakes, fruit, bombs, any structure tile
    /// (decorative included) and the portal
    pub fn is_occupied(&self, cell: IVec2, view: &FieldView) -> bool {
        self.snake_at(cell)
            || self.foods.iter().any(|f| f.pos == cell)
            || self.bombs.iter().any(|b| b.pos == cell)
            || view.obstacle_at(cell)
            || view.portal == Some(cell)
    }

    /// Bomb placement ignores the portal and passable decoration tiles
    pub fn is_occupied_for_bomb(&self, cell: IVec2, view: &FieldView) -> bool {
        self.snake_at(cell)
            || self.foods.iter().any(|f| f.pos == cell)
            || self.bombs.iter().any(|b| b.pos == cell)
            || view.blocking_at(cell)
    }

    /// Blocked for walking entities: blocking tiles plus anything occupied
    pub fn is_blocked(&self, cell: IVec2, view: &FieldView) -> bool {
        view.blocking_at(cell) || self.is_occupied(cell, view)
    }

    /// Replace the whole fruit population for a freshly entered field
    pub fn spawn_food(&mut self, view: &FieldView) {
        self.foods.clear();
        for _ in 0..self.target_food_count() {
            self.spawn_single_food_with_budget(view, FOOD_SPAWN_ATTEMPTS);
        }
    }

    /// Spawn one replacement fruit, avoiding occupied cells on a bounded
    /// budget and accepting the last candidate on exhaustion
    pub fn spawn_single_food(&mut self, view: &FieldView) {
        self.spawn_single_food_with_budget(view, SINGLE_FOOD_ATTEMPTS);
    }

    fn spawn_single_food_with_budget(&mut self, view: &FieldView, budget: u32) {
        let kind = FoodKind::ALL[self.rng.random_range(0..FoodKind::ALL.len())];
        let mut attempts = 0;
        let pos = loop {
            let candidate = self.random_cell();
            attempts += 1;
            if !self.is_occupied(candidate, view) || attempts > budget {
                break candidate;
            }
        };
        let id = self.alloc_food_id();
        self.foods.push(Food { id, pos, kind });
    }

    /// Replace the bomb set for a freshly entered field
    pub fn spawn_bombs(&mut self, view: &FieldView) {
        self.bombs.clear();
        for _ in 0..self.settings.bomb_count {
            let mut attempts = 0;
            let pos = loop {
                let candidate = self.random_cell();
                attempts += 1;
                if !self.is_occupied_for_bomb(candidate, view) || attempts > BOMB_SPAWN_ATTEMPTS {
                    break candidate;
                }
            };
            self.bombs.push(Bomb { pos });
        }
    }
}

/// Jittered per-instance interval in `[range.0, range.1)` milliseconds
pub(crate) fn jitter(rng: &mut Pcg32, range: (f64, f64)) -> f64 {
    rng.random_range(range.0..range.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(w: i32, h: i32) -> GameWorld {
        GameWorld::new(w, h, Settings::default(), 7)
    }

    #[test]
    fn test_target_food_count() {
        // 20x20 = 400 tiles -> floor(3.0) = 3 fruit
        assert_eq!(world(20, 20).target_food_count(), 3);
        // Tiny fields still get one fruit
        assert_eq!(world(5, 5).target_food_count(), 1);
    }

    #[test]
    fn test_spawn_food_avoids_occupied() {
        let mut w = world(20, 20);
        w.spawn_food(&FieldView::EMPTY);
        assert_eq!(w.foods.len(), 3);
        // No two fruit share a cell on an otherwise empty 20x20 field
        for (i, a) in w.foods.iter().enumerate() {
            for b in w.foods.iter().skip(i + 1) {
                assert_ne!(a.pos, b.pos);
            }
        }
    }

    #[test]
    fn test_food_ids_stable() {
        let mut w = world(10, 10);
        w.spawn_food(&FieldView::EMPTY);
        let first = w.foods[0].id;
        w.spawn_single_food(&FieldView::EMPTY);
        assert!(w.foods.last().unwrap().id > first);
        assert!(w.remove_food_by_id(first));
        assert!(!w.remove_food_by_id(first));
    }

    #[test]
    fn test_fruit_columns_distinct() {
        let mut w = world(10, 10);
        w.foods = vec![
            Food { id: 1, pos: IVec2::new(3, 1), kind: FoodKind::Apple },
            Food { id: 2, pos: IVec2::new(3, 7), kind: FoodKind::Lemon },
            Food { id: 3, pos: IVec2::new(5, 2), kind: FoodKind::Tomato },
        ];
        assert_eq!(w.fruit_columns(), vec![3, 5]);
        let col = w.random_fruit_column().unwrap();
        assert!(col == 3 || col == 5);
    }

    #[test]
    fn test_occupancy_flavors() {
        let mut w = world(10, 10);
        let portal_cell = IVec2::new(4, 4);
        let deco = Obstacle {
            pos: IVec2::new(6, 6),
            kind: ObstacleKind::Planet {
                sprite: 1,
                size: PlanetSize::Large,
                center: IVec2::new(7, 7),
            },
            blocking: false,
        };
        let obstacles = [deco];
        let view = FieldView {
            obstacles: &obstacles,
            portal: Some(portal_cell),
        };
        w.bombs.push(Bomb { pos: IVec2::new(1, 1) });

        // Portal counts for general occupancy, not for bomb placement
        assert!(w.is_occupied(portal_cell, &view));
        assert!(!w.is_occupied_for_bomb(portal_cell, &view));
        // Decorative planet tile occupies but does not block bombs
        assert!(w.is_occupied(deco.pos, &view));
        assert!(!w.is_occupied_for_bomb(deco.pos, &view));
        // A decorative tile is not blocking for walkers either
        assert!(!view.blocking_at(deco.pos));
    }

    #[test]
    fn test_coiled_snake() {
        let s = Snake::coiled(IVec2::new(2, 3), 4, 3);
        assert_eq!(s.body.len(), 4);
        assert!(s.body.iter().all(|&c| c == IVec2::new(2, 3)));
        assert_eq!(s.dir, IVec2::ZERO);
        // Zero-length request still yields a head
        assert_eq!(Snake::coiled(IVec2::ZERO, 0, 0).body.len(), 1);
    }

    #[test]
    fn test_world_serde_roundtrip() {
        let mut w = world(20, 20);
        w.spawn_food(&FieldView::EMPTY);
        w.snakes[0].score = 7;
        w.counters.fish = 2;

        let json = serde_json::to_string(&w).unwrap();
        let mut restored: GameWorld = serde_json::from_str(&json).unwrap();
        restored.reseed();

        assert_eq!(restored.width, 20);
        assert_eq!(restored.snakes[0].score, 7);
        assert_eq!(restored.counters.fish, 2);
        assert_eq!(restored.foods.len(), w.foods.len());
        assert_eq!(restored.seed, w.seed);
    }

    #[test]
    fn test_determinism_same_seed() {
        let mut a = world(20, 20);
        let mut b = world(20, 20);
        a.spawn_food(&FieldView::EMPTY);
        b.spawn_food(&FieldView::EMPTY);
        let pa: Vec<IVec2> = a.foods.iter().map(|f| f.pos).collect();
        let pb: Vec<IVec2> = b.foods.iter().map(|f| f.pos).collect();
        assert_eq!(pa, pb);
    }
}
