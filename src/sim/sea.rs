//! Sea field: patrolling fish and fruit-lifting bubbles
//!
//! Fish sweep horizontally, bouncing off walls, and dive toward fruit
//! every few steps. Bubbles drift upward; an unclaimed fruit in a bubble's
//! cell gets carried to the surface and lost there. A snake head on the
//! cell always wins the fruit over the bubble.

use glam::IVec2;
use rand::Rng;

use crate::consts::*;
use crate::sim::grid;
use crate::sim::state::{Enemy, EnemyKind, FieldView, GameWorld};

/// One simulation pass: fish first, then bubbles
pub(crate) fn update_sea(
    world: &mut GameWorld,
    view: &FieldView,
    enemies: &mut [Enemy],
    now_ms: f64,
) {
    update_fishes(world, view, enemies, now_ms);
    update_bubbles(world, view, enemies, now_ms);
}

fn update_fishes(world: &mut GameWorld, view: &FieldView, enemies: &mut [Enemy], now_ms: f64) {
    for enemy in enemies.iter_mut() {
        if !matches!(enemy.kind, EnemyKind::Fish { .. }) {
            continue;
        }
        if !enemy.due(now_ms) {
            continue;
        }
        enemy.last_move_ms = now_ms;

        let Enemy { pos, kind, .. } = enemy;
        let EnemyKind::Fish {
            dir_x,
            steps_since_dive,
            ..
        } = kind
        else {
            continue;
        };

        // Horizontal sweep, reversing on walls and structure tiles
        let mut nx = pos.x + *dir_x;
        if nx < 0 || nx >= world.width || view.obstacle_at(IVec2::new(nx, pos.y)) {
            *dir_x = -*dir_x;
            nx = pos.x + *dir_x;
        }
        if nx >= 0 && nx < world.width && !view.obstacle_at(IVec2::new(nx, pos.y)) {
            pos.x = nx;
            *steps_since_dive += 1;
        }

        // Periodic vertical step toward the nearest fruit's row
        if *steps_since_dive >= FISH_STEPS_PER_DIVE {
            *steps_since_dive = 0;
            let mut nearest: Option<(IVec2, i32)> = None;
            for food in &world.foods {
                let d = grid::manhattan(*pos, food.pos);
                if nearest.is_none_or(|(_, best)| d < best) {
                    nearest = Some((food.pos, d));
                }
            }
            let dy = match nearest {
                Some((target, _)) => (target.y - pos.y).signum(),
                None => {
                    if world.rng.random_bool(0.5) {
                        -1
                    } else {
                        1
                    }
                }
            };
            let ny = pos.y + dy;
            if ny >= 0 && ny < world.height && !view.obstacle_at(IVec2::new(pos.x, ny)) {
                pos.y = ny;
            }
        }

        // Nibble any fruit the fish swam onto
        if let Some(i) = world.food_index_at(*pos) {
            world.foods.remove(i);
            world.counters.fish += 1;
            world.spawn_single_food(view);
        }
    }
}

fn update_bubbles(world: &mut GameWorld, view: &FieldView, enemies: &mut [Enemy], now_ms: f64) {
    for enemy in enemies.iter_mut() {
        if !matches!(enemy.kind, EnemyKind::Bubble { .. }) {
            continue;
        }
        if !enemy.due(now_ms) {
            continue;
        }
        enemy.last_move_ms = now_ms;

        let Enemy { pos, kind, .. } = enemy;
        let EnemyKind::Bubble { carrying } = kind else {
            continue;
        };

        // Pick up an unclaimed fruit at the current cell
        if carrying.is_none() && !world.snake_head_at(*pos) {
            if let Some(i) = world.food_index_at(*pos) {
                *carrying = Some(world.foods[i].id);
            }
        }

        let ny = pos.y - 1;
        if ny < 0 {
            // Surface: the carried fruit pops with the bubble
            if let Some(id) = carrying.take() {
                world.remove_food_by_id(id);
                world.spawn_single_food(view);
                world.counters.bubble += 1;
            }
            pos.y = world.height - 1;
            pos.x = fruit_column_or_random(world);
            continue;
        }
        pos.y = ny;

        if let Some(id) = *carrying {
            // The carried fruit rides along
            if let Some(food) = world.foods.iter_mut().find(|f| f.id == id) {
                food.pos = *pos;
            }
        } else if !world.snake_head_at(*pos) {
            if let Some(i) = world.food_index_at(*pos) {
                *carrying = Some(world.foods[i].id);
            }
        }
    }
}

/// Random current fruit column, or any column when no fruit exists
fn fruit_column_or_random(world: &mut GameWorld) -> i32 {
    let columns = world.fruit_columns();
    if columns.is_empty() {
        world.rng.random_range(0..world.width)
    } else {
        columns[world.rng.random_range(0..columns.len())]
    }
}
