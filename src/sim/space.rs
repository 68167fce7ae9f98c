//! Space field: falling asteroids that crush fruit
//!
//! Asteroids fall one row per elapsed interval and wrap back to the top in
//! a fruit-biased column, so the player is always racing one. Planets are
//! static scenery and never deflect them.

use glam::IVec2;
use rand::Rng;

use crate::consts::*;
use crate::sim::state::{jitter, Enemy, EnemyKind, FieldView, GameWorld};

use super::r#gen;

/// Column of a random fruit, or a random column when none exist
fn fruit_or_random_column(world: &mut GameWorld) -> i32 {
    match world.random_fruit_column() {
        Some(x) => x,
        None => world.rng.random_range(0..world.width),
    }
}

/// Top-row column leaving room for a big asteroid's three tiles
fn clearance_column(world: &mut GameWorld) -> i32 {
    world
        .rng
        .random_range(0..(world.width - BIG_ASTEROID_WIDTH + 1).max(1))
}

/// Advance every asteroid whose timer elapsed, crush fruit under their
/// obstacle tiles and top the small-asteroid population back up
pub(crate) fn update_asteroids(
    world: &mut GameWorld,
    view: &FieldView,
    enemies: &mut Vec<Enemy>,
    now_ms: f64,
) {
    for i in 0..enemies.len() {
        let kind = enemies[i].kind;
        if !matches!(kind, EnemyKind::Asteroid | EnemyKind::BigAsteroidTile { .. }) {
            continue;
        }
        if !enemies[i].due(now_ms) {
            continue;
        }
        enemies[i].last_move_ms = now_ms;

        let new_y = enemies[i].pos.y + 1;
        if new_y >= world.height {
            enemies[i].pos.y = 0;
            enemies[i].pos.x = match kind {
                EnemyKind::Asteroid => fruit_or_random_column(world),
                _ => clearance_column(world),
            };
        } else {
            enemies[i].pos.y = new_y;
        }

        crush_fruit(world, view, enemies[i].pos);
    }

    // Eaten asteroids leave the population short; refill at the top
    let target = r#gen::swarm_target(world.width, world.height);
    let current = enemies
        .iter()
        .filter(|e| e.kind == EnemyKind::Asteroid)
        .count();
    for _ in current..target {
        spawn_asteroid_at_fruit_column(world, enemies);
    }
}

/// Destroy and replace any fruit at the asteroid's obstacle tile
fn crush_fruit(world: &mut GameWorld, view: &FieldView, pos: IVec2) {
    while let Some(i) = world.food_index_at(pos) {
        world.foods.remove(i);
        world.counters.asteroid += 1;
        world.spawn_single_food(view);
    }
}

/// One fresh asteroid at the top, in a fruit-biased column
pub(crate) fn spawn_asteroid_at_fruit_column(world: &mut GameWorld, enemies: &mut Vec<Enemy>) {
    let x = fruit_or_random_column(world);
    let interval = jitter(&mut world.rng, ASTEROID_INTERVAL_MS);
    enemies.push(Enemy::new(IVec2::new(x, 0), EnemyKind::Asteroid, interval));
}

/// The three bottom-row tiles of a big asteroid, sharing one group id.
/// Each tile keeps its own jittered timer.
pub(crate) fn big_asteroid_tiles(world: &mut GameWorld, group: u32) -> Vec<Enemy> {
    let x = clearance_column(world);
    (0..BIG_ASTEROID_WIDTH)
        .map(|col| {
            let interval = jitter(&mut world.rng, BIG_ASTEROID_INTERVAL_MS);
            Enemy::new(
                IVec2::new(x + col, 2),
                EnemyKind::BigAsteroidTile { group },
                interval,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::{Food, FoodKind};

    fn world(seed: u64) -> GameWorld {
        GameWorld::new(20, 20, Settings::default(), seed)
    }

    fn asteroid_at(x: i32, y: i32) -> Enemy {
        Enemy::new(IVec2::new(x, y), EnemyKind::Asteroid, 400.0)
    }

    /// Population filler whose timer never elapses in a test
    fn inert_asteroid() -> Enemy {
        Enemy::new(IVec2::new(0, 10), EnemyKind::Asteroid, 1e9)
    }

    fn fruit(id: u64, x: i32, y: i32) -> Food {
        Food {
            id,
            pos: IVec2::new(x, y),
            kind: FoodKind::Lemon,
        }
    }

    #[test]
    fn test_asteroid_falls_one_row() {
        let mut w = world(1);
        let mut enemies = vec![asteroid_at(5, 3)];
        // Keep the population check quiet by topping up first
        while enemies.len() < r#gen::swarm_target(20, 20) {
            enemies.push(inert_asteroid());
        }
        update_asteroids(&mut w, &FieldView::EMPTY, &mut enemies, 1000.0);
        assert_eq!(enemies[0].pos, IVec2::new(5, 4));
        assert_eq!(enemies[0].last_move_ms, 1000.0);

        // Not due again immediately
        update_asteroids(&mut w, &FieldView::EMPTY, &mut enemies, 1100.0);
        assert_eq!(enemies[0].pos, IVec2::new(5, 4));
    }

    #[test]
    fn test_asteroid_respawns_at_fruit_column() {
        let mut w = world(2);
        w.foods = vec![fruit(1, 13, 9)];
        let mut enemies = vec![asteroid_at(5, 19)];
        while enemies.len() < r#gen::swarm_target(20, 20) {
            enemies.push(inert_asteroid());
        }
        update_asteroids(&mut w, &FieldView::EMPTY, &mut enemies, 1000.0);
        assert_eq!(enemies[0].pos, IVec2::new(13, 0));
    }

    #[test]
    fn test_asteroid_crushes_fruit() {
        let mut w = world(3);
        w.foods = vec![fruit(1, 5, 4)];
        let mut enemies = vec![asteroid_at(5, 3)];
        while enemies.len() < r#gen::swarm_target(20, 20) {
            enemies.push(inert_asteroid());
        }
        update_asteroids(&mut w, &FieldView::EMPTY, &mut enemies, 1000.0);
        assert_eq!(w.counters.asteroid, 1);
        // Replacement spawned elsewhere
        assert_eq!(w.foods.len(), 1);
        assert_ne!(w.foods[0].id, 1);
    }

    #[test]
    fn test_population_maintained() {
        let mut w = world(4);
        let mut enemies = vec![asteroid_at(5, 3)];
        update_asteroids(&mut w, &FieldView::EMPTY, &mut enemies, 1000.0);
        let small = enemies
            .iter()
            .filter(|e| e.kind == EnemyKind::Asteroid)
            .count();
        assert_eq!(small, r#gen::swarm_target(20, 20));
        // Refills start at the top row
        assert!(enemies.iter().skip(1).all(|e| e.pos.y == 0));
    }

    #[test]
    fn test_big_asteroid_tiles_share_group_and_fit() {
        let mut w = world(5);
        let tiles = big_asteroid_tiles(&mut w, 7);
        assert_eq!(tiles.len(), 3);
        let base_x = tiles[0].pos.x;
        for (i, t) in tiles.iter().enumerate() {
            assert_eq!(t.pos, IVec2::new(base_x + i as i32, 2));
            assert_eq!(t.kind, EnemyKind::BigAsteroidTile { group: 7 });
            assert!((350.0..600.0).contains(&t.interval_ms));
        }
        // Two-cell clearance keeps the whole row on the field
        assert!(base_x + 2 < 20);
    }

    #[test]
    fn test_big_tile_respawns_with_clearance() {
        let mut w = world(6);
        let mut enemies = vec![Enemy::new(
            IVec2::new(9, 19),
            EnemyKind::BigAsteroidTile { group: 1 },
            400.0,
        )];
        while enemies.len() < r#gen::swarm_target(20, 20) + 1 {
            enemies.push(inert_asteroid());
        }
        update_asteroids(&mut w, &FieldView::EMPTY, &mut enemies, 1000.0);
        assert_eq!(enemies[0].pos.y, 0);
        assert!(enemies[0].pos.x >= 0 && enemies[0].pos.x <= 17);
    }
}
