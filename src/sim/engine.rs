//! Field engine orchestrator
//!
//! Owns the current field identity plus its obstacle/enemy/portal
//! collections, dispatches generation and simulation over the field-kind
//! enum, and arbitrates every snake-head move in a fixed precedence:
//! self-collision, boundary, obstacle, food, bomb, enemy, portal.

use std::collections::HashSet;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::{BorderMode, SelfHitBehavior};
use crate::sim::state::{
    Enemy, EnemyKind, FieldKind, FieldView, GameWorld, Obstacle, Portal,
};
use crate::sim::{grid, jungle, sea, space};

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEnd {
    SelfCollision,
    Wall,
    Obstacle,
    /// The head advance was reverted; `at` is the blast cell for the
    /// host's explosion overlay
    Bomb { at: IVec2 },
}

/// Result of arbitrating one snake-head advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No direction set; nothing moved
    Idle,
    /// Self-collision with block-move behavior: the move was refused
    Blocked,
    /// The snake advanced
    Moved { ate_food: bool, teleported: bool },
    /// Terminal game-state transition
    Ended(RunEnd),
}

/// Paint order entry for the host renderer
#[derive(Debug, Clone, Copy)]
pub enum SceneLayer<'a> {
    Obstacles(&'a [Obstacle]),
    Enemies(&'a [Enemy]),
}

/// Draw data for the active field. Space paints falling rocks beneath the
/// planets; every other field paints structures first.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub field: FieldKind,
    pub layers: [SceneLayer<'a>; 2],
    pub portal: Option<&'a Portal>,
}

/// The field/level engine. Sole mutator of obstacle, enemy and portal
/// state; reads and occasionally rewrites the host's snakes (portal
/// entry) and fruit/bombs (enemy interactions, field switches).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldEngine {
    pub(crate) current_field: FieldKind,
    pub(crate) previous_field: Option<FieldKind>,
    pub(crate) obstacles: Vec<Obstacle>,
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) portal: Option<Portal>,
    /// Non-Home fields visited since the snake was last Home
    pub(crate) cycle_visited: HashSet<FieldKind>,
    /// Score when the last portal was entered
    pub(crate) last_portal_score: u32,
    /// Score when the current field was entered
    pub(crate) field_entry_score: u32,
    pub(crate) king_monkey_spawned: bool,
    pub(crate) big_asteroid_group: Option<u32>,
    pub(crate) next_group_id: u32,
}

impl Default for FieldEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldEngine {
    pub fn new() -> Self {
        Self {
            current_field: FieldKind::Home,
            previous_field: None,
            obstacles: Vec::new(),
            enemies: Vec::new(),
            portal: None,
            cycle_visited: HashSet::new(),
            last_portal_score: 0,
            field_entry_score: 0,
            king_monkey_spawned: false,
            big_asteroid_group: None,
            next_group_id: 1,
        }
    }

    pub fn current_field(&self) -> FieldKind {
        self.current_field
    }

    pub fn previous_field(&self) -> Option<FieldKind> {
        self.previous_field
    }

    /// Name of the active field for the host UI
    pub fn field_display_name(&self) -> &'static str {
        self.current_field.display_name()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn portal(&self) -> Option<&Portal> {
        self.portal.as_ref()
    }

    pub fn field_entry_score(&self) -> u32 {
        self.field_entry_score
    }

    pub fn last_portal_score(&self) -> u32 {
        self.last_portal_score
    }

    /// Read view over engine-owned field state for occupancy checks
    pub(crate) fn view(&self) -> FieldView<'_> {
        FieldView {
            obstacles: &self.obstacles,
            portal: self.portal.as_ref().map(|p| p.pos),
        }
    }

    /// Advance field-specific simulation by one tick. Portal spawning is
    /// checked first, then the active field's entities move on their own
    /// wall-clock timers.
    pub fn update(&mut self, world: &mut GameWorld, now_ms: f64) {
        if self.should_spawn_portal(world) {
            self.spawn_portal(world);
        }

        match self.current_field {
            FieldKind::Home => {}
            FieldKind::Jungle => {
                let Self {
                    obstacles,
                    enemies,
                    portal,
                    ..
                } = self;
                let view = FieldView {
                    obstacles,
                    portal: portal.as_ref().map(|p| p.pos),
                };
                jungle::update_monkeys(world, &view, enemies, now_ms);
                self.maybe_spawn_king_monkey(world);
            }
            FieldKind::Space => {
                let Self {
                    obstacles,
                    enemies,
                    portal,
                    ..
                } = self;
                let view = FieldView {
                    obstacles,
                    portal: portal.as_ref().map(|p| p.pos),
                };
                space::update_asteroids(world, &view, enemies, now_ms);
            }
            FieldKind::Sea => {
                let Self {
                    obstacles,
                    enemies,
                    portal,
                    ..
                } = self;
                let view = FieldView {
                    obstacles,
                    portal: portal.as_ref().map(|p| p.pos),
                };
                sea::update_sea(world, &view, enemies, now_ms);
            }
        }
    }

    /// The king monkey appears once per jungle visit, after the score has
    /// grown past the entry baseline
    fn maybe_spawn_king_monkey(&mut self, world: &mut GameWorld) {
        if self.king_monkey_spawned {
            return;
        }
        let delta = world.total_score().saturating_sub(self.field_entry_score);
        if delta >= KING_MONKEY_THRESHOLD {
            let Self {
                obstacles, enemies, ..
            } = self;
            jungle::spawn_king_monkey(world, obstacles, enemies);
            self.king_monkey_spawned = true;
        }
    }

    /// Drop a big asteroid: three obstacle tiles sharing one group id.
    /// Host-invocable only; the engine never schedules one itself.
    pub fn spawn_big_asteroid(&mut self, world: &mut GameWorld) {
        let group = self.next_group_id;
        self.next_group_id += 1;
        let tiles = space::big_asteroid_tiles(world, group);
        self.enemies.extend(tiles);
        self.big_asteroid_group = Some(group);
    }

    /// Test-and-apply enemy interaction for a snake head cell. Eaten
    /// monkeys and asteroids respawn; a big asteroid dies as one unit;
    /// fish and bubbles ignore the snake entirely.
    pub fn handle_enemy_collision(&mut self, world: &mut GameWorld, head: IVec2) -> bool {
        for i in (0..self.enemies.len()).rev() {
            if self.enemies[i].pos != head {
                continue;
            }
            match self.enemies[i].kind {
                EnemyKind::Monkey => {
                    self.enemies.remove(i);
                    let Self {
                        obstacles,
                        enemies,
                        portal,
                        ..
                    } = self;
                    let view = FieldView {
                        obstacles,
                        portal: portal.as_ref().map(|p| p.pos),
                    };
                    jungle::spawn_monkey_above_tree(world, &view, enemies);
                    return true;
                }
                EnemyKind::KingMonkey => {
                    self.enemies.remove(i);
                    let Self {
                        obstacles, enemies, ..
                    } = self;
                    jungle::spawn_king_monkey(world, obstacles, enemies);
                    return true;
                }
                EnemyKind::Asteroid => {
                    self.enemies.remove(i);
                    space::spawn_asteroid_at_fruit_column(world, &mut self.enemies);
                    return true;
                }
                EnemyKind::BigAsteroidTile { group } => {
                    self.enemies.retain(
                        |e| !matches!(e.kind, EnemyKind::BigAsteroidTile { group: g } if g == group),
                    );
                    if self.big_asteroid_group == Some(group) {
                        self.big_asteroid_group = None;
                    }
                    return true;
                }
                EnemyKind::Fish { .. } | EnemyKind::Bubble { .. } => continue,
            }
        }
        false
    }

    /// Arbitrate one head advance for `snake_index`, in fixed precedence:
    /// self-collision, boundary, obstacle, food, bomb, enemy, portal.
    pub fn step_snake(&mut self, world: &mut GameWorld, snake_index: usize) -> StepOutcome {
        let Some(snake) = world.snakes.get(snake_index) else {
            return StepOutcome::Idle;
        };
        let dir = snake.dir;
        let Some(head_cell) = snake.head() else {
            return StepOutcome::Idle;
        };
        if dir == IVec2::ZERO {
            return StepOutcome::Idle;
        }
        let mut head = head_cell + dir;

        // (1) self-collision, tested on the unwrapped cell
        if snake.body.iter().skip(1).any(|&seg| seg == head) {
            return match world.settings.self_hit {
                SelfHitBehavior::EndRun => StepOutcome::Ended(RunEnd::SelfCollision),
                SelfHitBehavior::BlockMove => StepOutcome::Blocked,
            };
        }

        // (2) boundary
        match world.settings.border {
            BorderMode::Wrap => head = grid::wrap(head, world.width, world.height),
            BorderMode::Solid => {
                if !grid::in_bounds(head, world.width, world.height) {
                    return StepOutcome::Ended(RunEnd::Wall);
                }
            }
        }

        // (3) blocking obstacle tiles; decoration never ends the run
        if self.obstacles.iter().any(|o| o.pos == head && o.blocking) {
            return StepOutcome::Ended(RunEnd::Obstacle);
        }

        world.snakes[snake_index].body.push_front(head);

        // (4) food
        let mut ate_food = false;
        if let Some(i) = world.food_index_at(head) {
            let points = world.foods[i].kind.points();
            world.foods.remove(i);
            world.snakes[snake_index].score += points;
            ate_food = true;
            let view = self.view();
            world.spawn_single_food(&view);
        }

        // (5) bomb: revert the advance so the snake ends just short of it
        if world.bombs.iter().any(|b| b.pos == head) {
            world.snakes[snake_index].body.pop_front();
            return StepOutcome::Ended(RunEnd::Bomb { at: head });
        }

        // (6) field-specific enemies
        self.handle_enemy_collision(world, head);

        if !ate_food {
            world.snakes[snake_index].body.pop_back();
        }

        // (7) portal
        let teleported = self.check_portal_collision(world, head);

        StepOutcome::Moved {
            ate_food,
            teleported,
        }
    }

    /// Replace the fruit population, avoiding engine-owned field state
    pub fn spawn_food(&self, world: &mut GameWorld) {
        world.spawn_food(&self.view());
    }

    /// Spawn one replacement fruit
    pub fn spawn_single_food(&self, world: &mut GameWorld) {
        world.spawn_single_food(&self.view());
    }

    /// Replace the bomb set
    pub fn spawn_bombs(&self, world: &mut GameWorld) {
        world.spawn_bombs(&self.view());
    }

    /// Whether a cell blocks movement: blocking obstacle or any occupancy
    pub fn is_position_blocked(&self, world: &GameWorld, cell: IVec2) -> bool {
        world.is_blocked(cell, &self.view())
    }

    /// Whether a cell is occupied by anything at all
    pub fn is_position_occupied(&self, world: &GameWorld, cell: IVec2) -> bool {
        world.is_occupied(cell, &self.view())
    }

    /// Total placement routine for snakes: random cells on a bounded
    /// budget, then a perimeter spiral out from the center, then the
    /// center itself unchecked
    pub fn find_safe_spawn(&self, world: &mut GameWorld) -> IVec2 {
        let view = self.view();
        for _ in 0..SAFE_SPAWN_ATTEMPTS {
            let candidate = world.random_cell();
            if !world.is_blocked(candidate, &view) {
                return candidate;
            }
        }

        let center = IVec2::new(world.width / 2, world.height / 2);
        for radius in 1..=SPIRAL_MAX_RADIUS {
            for dx in -radius..=radius {
                for dy in -radius..=radius {
                    if dx.abs() != radius && dy.abs() != radius {
                        continue;
                    }
                    let cell = center + IVec2::new(dx, dy);
                    if grid::in_bounds(cell, world.width, world.height)
                        && !world.is_blocked(cell, &view)
                    {
                        return cell;
                    }
                }
            }
        }
        center
    }

    /// Reset for a fresh run: portal baseline zeroed, portal gone, Home
    /// regenerated
    pub fn reset_run(&mut self, world: &mut GameWorld) {
        self.last_portal_score = 0;
        self.portal = None;
        self.switch_to_field(world, FieldKind::Home);
    }

    /// Draw data in paint order for the host renderer
    pub fn scene(&self) -> Scene<'_> {
        let layers = match self.current_field {
            FieldKind::Space => [
                SceneLayer::Enemies(&self.enemies),
                SceneLayer::Obstacles(&self.obstacles),
            ],
            _ => [
                SceneLayer::Obstacles(&self.obstacles),
                SceneLayer::Enemies(&self.enemies),
            ],
        };
        Scene {
            field: self.current_field,
            layers,
            portal: self.portal.as_ref(),
        }
    }
}
