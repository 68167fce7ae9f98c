//! Jungle field: monkeys that chase and steal fruit
//!
//! Monkeys step toward the Manhattan-nearest fruit, preferring the axis
//! with the larger distance and degrading to a random wander when every
//! improving step is blocked. The king monkey uses the same movement rule
//! at twice the pace.

use glam::IVec2;
use rand::Rng;

use crate::consts::*;
use crate::sim::grid;
use crate::sim::state::{jitter, Enemy, EnemyKind, FieldView, GameWorld, Obstacle, ObstacleKind};

use super::r#gen;

/// Advance every monkey whose timer elapsed, stealing fruit they land on
pub(crate) fn update_monkeys(
    world: &mut GameWorld,
    view: &FieldView,
    enemies: &mut [Enemy],
    now_ms: f64,
) {
    for enemy in enemies.iter_mut() {
        if !matches!(enemy.kind, EnemyKind::Monkey | EnemyKind::KingMonkey) {
            continue;
        }
        if !enemy.due(now_ms) {
            continue;
        }
        enemy.pos = step_monkey(world, view, enemy.pos);
        enemy.last_move_ms = now_ms;
        steal_fruit(world, view, enemy.pos);
    }
}

/// One greedy step toward the nearest fruit, or a random wander
fn step_monkey(world: &mut GameWorld, view: &FieldView, pos: IVec2) -> IVec2 {
    let mut nearest: Option<(IVec2, i32)> = None;
    for food in &world.foods {
        let d = grid::manhattan(pos, food.pos);
        if nearest.is_none_or(|(_, best)| d < best) {
            nearest = Some((food.pos, d));
        }
    }

    if let Some((target, _)) = nearest {
        let dx = (target.x - pos.x).signum();
        let dy = (target.y - pos.y).signum();
        let x_dist = (target.x - pos.x).abs();
        let y_dist = (target.y - pos.y).abs();

        if x_dist >= y_dist && dx != 0 {
            let next = pos + IVec2::new(dx, 0);
            if next.x >= 0 && next.x < world.width && !view.obstacle_at(next) {
                return next;
            }
        }
        if dy != 0 {
            let next = pos + IVec2::new(0, dy);
            if next.y >= 0 && next.y < world.height && !view.obstacle_at(next) {
                return next;
            }
        }
        if dx != 0 && x_dist < y_dist {
            let next = pos + IVec2::new(dx, 0);
            if next.x >= 0 && next.x < world.width && !view.obstacle_at(next) {
                return next;
            }
        }
    }

    // No improving move: random single step, possibly staying put
    let step = grid::STEPS_AND_STAY[world.rng.random_range(0..grid::STEPS_AND_STAY.len())];
    let next = pos + step;
    if grid::in_bounds(next, world.width, world.height) && !view.obstacle_at(next) {
        next
    } else {
        pos
    }
}

/// A monkey landing on a fruit destroys it; a replacement spawns elsewhere
fn steal_fruit(world: &mut GameWorld, view: &FieldView, pos: IVec2) {
    if let Some(i) = world.food_index_at(pos) {
        world.foods.remove(i);
        world.counters.monkey += 1;
        world.spawn_single_food(view);
    }
}

/// Distinct x coordinates holding tree tiles
fn tree_columns(obstacles: &[Obstacle]) -> Vec<i32> {
    let mut columns = Vec::new();
    for tile in obstacles {
        if matches!(tile.kind, ObstacleKind::Tree { .. }) && !columns.contains(&tile.pos.x) {
            columns.push(tile.pos.x);
        }
    }
    columns
}

/// Topmost tree tile row in the given column
fn column_top(obstacles: &[Obstacle], x: i32) -> i32 {
    obstacles
        .iter()
        .filter(|o| matches!(o.kind, ObstacleKind::Tree { .. }) && o.pos.x == x)
        .map(|o| o.pos.y)
        .min()
        .unwrap_or(0)
}

/// Summon the king monkey just above a random tree column, or anywhere if
/// the jungle somehow has no trees
pub(crate) fn spawn_king_monkey(
    world: &mut GameWorld,
    obstacles: &[Obstacle],
    enemies: &mut Vec<Enemy>,
) {
    let columns = tree_columns(obstacles);
    let mut pos = world.random_cell();
    if !columns.is_empty() {
        let x = columns[world.rng.random_range(0..columns.len())];
        let top = column_top(obstacles, x);
        if top - 1 >= 0 {
            pos = IVec2::new(x, top - 1);
        }
    }
    let interval = jitter(&mut world.rng, KING_MONKEY_INTERVAL_MS);
    log::info!("King monkey enters the jungle at ({}, {})", pos.x, pos.y);
    enemies.push(Enemy::new(pos, EnemyKind::KingMonkey, interval));
}

/// Respawn an eaten monkey above a random tree column, falling back to a
/// random open cell when no perch is free
pub(crate) fn spawn_monkey_above_tree(
    world: &mut GameWorld,
    view: &FieldView,
    enemies: &mut Vec<Enemy>,
) {
    let columns = tree_columns(view.obstacles);
    if columns.is_empty() {
        let monkey = r#gen::random_monkey(world, view);
        enemies.push(monkey);
        return;
    }
    for _ in 0..columns.len() {
        let x = columns[world.rng.random_range(0..columns.len())];
        let perch = IVec2::new(x, column_top(view.obstacles, x) - 1);
        if perch.y >= 0 && !world.is_occupied(perch, view) {
            let interval = jitter(&mut world.rng, MONKEY_INTERVAL_MS);
            enemies.push(Enemy::new(perch, EnemyKind::Monkey, interval));
            return;
        }
    }
    let monkey = r#gen::random_monkey(world, view);
    enemies.push(monkey);
}
