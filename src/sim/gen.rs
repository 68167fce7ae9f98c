//! Procedural field layouts
//!
//! Builds the initial obstacle and enemy collections for a freshly entered
//! field, scaled by field size. Placement is rejection-sampled on bounded
//! budgets; on exhaustion every routine falls back to an unchecked
//! position rather than failing.

use glam::IVec2;
use rand::Rng;

use crate::consts::*;
use crate::sim::grid;
use crate::sim::state::{
    jitter, Enemy, EnemyKind, FieldView, GameWorld, Obstacle, ObstacleKind, PlanetSize,
};

/// Entity counts per size tier (smaller field dimension: <20, <25, <30, >=30)
const TREE_COUNTS: [usize; 4] = [5, 7, 10, 15];
const MONKEY_COUNTS: [usize; 4] = [3, 4, 5, 6];
const PLANET_COUNTS: [usize; 4] = [3, 5, 7, 10];
const SWARM_COUNTS: [usize; 4] = [3, 5, 7, 10];

/// Fraction of planets that use the large footprint
const LARGE_PLANET_SHARE: f64 = 0.4;

/// Sprites of the 3x3 footprint that block movement
const SMALL_BLOCKING_SPRITES: [u8; 5] = [2, 4, 5, 6, 8];
/// Sprites of the 5x5 footprint that are passable decoration
const LARGE_PASSABLE_SPRITES: [u8; 12] = [1, 2, 4, 5, 6, 10, 16, 20, 21, 22, 24, 25];

/// Size tier for the given smaller field dimension
pub fn size_tier(min_dim: i32) -> usize {
    if min_dim < 20 {
        0
    } else if min_dim < 25 {
        1
    } else if min_dim < 30 {
        2
    } else {
        3
    }
}

fn tier_count(table: [usize; 4], width: i32, height: i32) -> usize {
    table[size_tier(width.min(height))]
}

/// Asteroid/fish/bubble population target for this field size
pub fn swarm_target(width: i32, height: i32) -> usize {
    tier_count(SWARM_COUNTS, width, height)
}

/// Vertical three-tile trees at random anchors. Tiles extending past the
/// bottom edge are clipped, not rejected; all tree tiles block.
pub fn jungle_trees(world: &mut GameWorld) -> Vec<Obstacle> {
    let count = tier_count(TREE_COUNTS, world.width, world.height);
    let mut trees = Vec::with_capacity(count * 3);
    for _ in 0..count {
        let anchor = world.random_cell();
        for segment in 1..=3u8 {
            let pos = anchor + IVec2::new(0, segment as i32 - 1);
            if pos.y < world.height {
                trees.push(Obstacle {
                    pos,
                    kind: ObstacleKind::Tree { segment },
                    blocking: true,
                });
            }
        }
    }
    trees
}

/// One monkey on a random non-blocked cell, unchecked after the budget
pub fn random_monkey(world: &mut GameWorld, view: &FieldView) -> Enemy {
    let mut attempts = 0;
    let pos = loop {
        let candidate = world.random_cell();
        attempts += 1;
        if !world.is_blocked(candidate, view) || attempts > MONKEY_PLACE_ATTEMPTS {
            break candidate;
        }
    };
    let interval = jitter(&mut world.rng, MONKEY_INTERVAL_MS);
    Enemy::new(pos, EnemyKind::Monkey, interval)
}

/// Initial monkey troop for the jungle
pub fn jungle_monkeys(world: &mut GameWorld, view: &FieldView) -> Vec<Enemy> {
    let count = tier_count(MONKEY_COUNTS, world.width, world.height);
    (0..count).map(|_| random_monkey(world, view)).collect()
}

/// The fixed footprint of one planet, or None if it would leave the field
/// or overlap an already-placed planet tile
fn planet_tiles(
    center: IVec2,
    size: PlanetSize,
    width: i32,
    height: i32,
    existing: &[Obstacle],
) -> Option<Vec<Obstacle>> {
    let (span, reach) = match size {
        PlanetSize::Small => (3, 1),
        PlanetSize::Large => (5, 2),
    };
    let mut tiles = Vec::with_capacity((span * span) as usize);
    for row in 0..span {
        for col in 0..span {
            let sprite = (row * span + col + 1) as u8;
            let pos = center + IVec2::new(col - reach, row - reach);
            if !grid::in_bounds(pos, width, height) {
                return None;
            }
            if existing.iter().any(|o| o.pos == pos) {
                return None;
            }
            let blocking = match size {
                PlanetSize::Small => SMALL_BLOCKING_SPRITES.contains(&sprite),
                PlanetSize::Large => !LARGE_PASSABLE_SPRITES.contains(&sprite),
            };
            tiles.push(Obstacle {
                pos,
                kind: ObstacleKind::Planet {
                    sprite,
                    size,
                    center,
                },
                blocking,
            });
        }
    }
    Some(tiles)
}

fn place_planets(
    world: &mut GameWorld,
    planets: &mut Vec<Obstacle>,
    occupied: &mut usize,
    cap: usize,
    count: usize,
    size: PlanetSize,
) {
    let mut placed = 0;
    let mut tries = 0;
    while placed < count && tries < PLANET_PLACE_ATTEMPTS && *occupied < cap {
        let center = world.random_cell();
        tries += 1;
        let Some(tiles) = planet_tiles(center, size, world.width, world.height, planets) else {
            continue;
        };
        if *occupied + tiles.len() > cap {
            break;
        }
        *occupied += tiles.len();
        planets.extend(tiles);
        placed += 1;
    }
}

/// Planet barriers for the space field: large footprints first, then
/// small, with total tiles capped at a fraction of the field area
pub fn space_planets(world: &mut GameWorld) -> Vec<Obstacle> {
    let total = tier_count(PLANET_COUNTS, world.width, world.height);
    let large = ((total as f64 * LARGE_PLANET_SHARE).round() as usize).max(1);
    let small = total.saturating_sub(large);

    let area = (world.width as f64) * (world.height as f64);
    let cap = (area * PLANET_OCCUPANCY_CAP).floor() as usize;

    let mut planets = Vec::new();
    let mut occupied = 0;
    place_planets(world, &mut planets, &mut occupied, cap, large, PlanetSize::Large);
    place_planets(world, &mut planets, &mut occupied, cap, small, PlanetSize::Small);
    planets
}

/// Fill `columns` up to `count`, preferring distinct random columns on a
/// bounded budget and then permitting repeats
fn fill_columns(world: &mut GameWorld, columns: &mut Vec<i32>, count: usize) {
    let mut attempts = 0;
    while columns.len() < count && attempts < DISTINCT_COLUMN_ATTEMPTS {
        let x = world.rng.random_range(0..world.width);
        if !columns.contains(&x) {
            columns.push(x);
        }
        attempts += 1;
    }
    while columns.len() < count {
        let x = world.rng.random_range(0..world.width);
        columns.push(x);
    }
}

/// Falling asteroids, spawn columns biased toward current fruit columns so
/// the player races them. Call after food placement.
pub fn space_asteroids(world: &mut GameWorld) -> Vec<Enemy> {
    let count = swarm_target(world.width, world.height);
    let mut columns = world.fruit_columns();
    columns.truncate(count);
    fill_columns(world, &mut columns, count);

    (0..count)
        .map(|i| {
            let interval = jitter(&mut world.rng, ASTEROID_INTERVAL_MS);
            // Entities sit on the bottom tile of the drawn meteorite
            Enemy::new(
                IVec2::new(columns[i % columns.len()], 2),
                EnemyKind::Asteroid,
                interval,
            )
        })
        .collect()
}

/// Fish shoal at random open-water cells with random heading and sprite
pub fn sea_fish(world: &mut GameWorld, view: &FieldView) -> Vec<Enemy> {
    let count = swarm_target(world.width, world.height);
    let mut fishes = Vec::with_capacity(count);
    for _ in 0..count {
        let mut attempts = 0;
        let pos = loop {
            let candidate = world.random_cell();
            attempts += 1;
            if !world.is_blocked(candidate, view) || attempts > FISH_PLACE_ATTEMPTS {
                break candidate;
            }
        };
        let sprite = world.rng.random_range(1..=3u8);
        let dir_x = if world.rng.random_bool(0.5) { -1 } else { 1 };
        let interval = jitter(&mut world.rng, FISH_INTERVAL_MS);
        fishes.push(Enemy::new(
            pos,
            EnemyKind::Fish {
                sprite,
                dir_x,
                steps_since_dive: 0,
            },
            interval,
        ));
    }
    fishes
}

/// Bubbles along the bottom row, columns biased toward current fruit
pub fn sea_bubbles(world: &mut GameWorld) -> Vec<Enemy> {
    let count = swarm_target(world.width, world.height);
    let mut columns = world.fruit_columns();
    columns.truncate(count);
    fill_columns(world, &mut columns, count);

    let bottom = world.height - 1;
    (0..count)
        .map(|i| {
            let interval = jitter(&mut world.rng, BUBBLE_INTERVAL_MS);
            Enemy::new(
                IVec2::new(columns[i % columns.len()], bottom),
                EnemyKind::Bubble { carrying: None },
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

    fn world(w: i32, h: i32, seed: u64) -> GameWorld {
        GameWorld::new(w, h, Settings::default(), seed)
    }

    #[test]
    fn test_size_tiers() {
        assert_eq!(size_tier(15), 0);
        assert_eq!(size_tier(19), 0);
        assert_eq!(size_tier(20), 1);
        assert_eq!(size_tier(24), 1);
        assert_eq!(size_tier(25), 2);
        assert_eq!(size_tier(30), 3);
        assert_eq!(size_tier(40), 3);
    }

    #[test]
    fn test_trees_in_bounds_and_clipped() {
        let mut w = world(15, 15, 3);
        let trees = jungle_trees(&mut w);
        assert!(!trees.is_empty());
        for tile in &trees {
            assert!(grid::in_bounds(tile.pos, 15, 15));
            assert!(tile.blocking);
        }
        // Tier 0 plants 5 trees of up to 3 tiles each
        assert!(trees.len() <= 15);
    }

    #[test]
    fn test_monkeys_avoid_blocked_cells() {
        let mut w = world(20, 20, 11);
        let trees = jungle_trees(&mut w);
        let view = FieldView {
            obstacles: &trees,
            portal: None,
        };
        let monkeys = jungle_monkeys(&mut w, &view);
        assert_eq!(monkeys.len(), 4);
        for m in &monkeys {
            assert!(grid::in_bounds(m.pos, 20, 20));
            // Plenty of open cells on 20x20, so the budget never trips
            assert!(!view.blocking_at(m.pos));
        }
    }

    #[test]
    fn test_planet_footprints() {
        let mut w = world(30, 30, 5);
        let planets = space_planets(&mut w);
        assert!(!planets.is_empty());

        // Group tiles by their structure center and check the fixed patterns
        let mut centers: Vec<IVec2> = Vec::new();
        for tile in &planets {
            let ObstacleKind::Planet { center, .. } = tile.kind else {
                panic!("space generator produced a non-planet tile");
            };
            if !centers.contains(&center) {
                centers.push(center);
            }
        }
        for &c in &centers {
            let group: Vec<&Obstacle> = planets
                .iter()
                .filter(|o| matches!(o.kind, ObstacleKind::Planet { center, .. } if center == c))
                .collect();
            let blocking = group.iter().filter(|o| o.blocking).count();
            match group.len() {
                9 => assert_eq!(blocking, 5),
                25 => assert_eq!(blocking, 13),
                n => panic!("unexpected planet footprint of {n} tiles"),
            }
        }
    }

    #[test]
    fn test_planet_occupancy_cap_and_no_overlap() {
        let mut w = world(30, 30, 9);
        let planets = space_planets(&mut w);
        let cap = (30.0 * 30.0 * PLANET_OCCUPANCY_CAP).floor() as usize;
        assert!(planets.len() <= cap);
        for (i, a) in planets.iter().enumerate() {
            for b in planets.iter().skip(i + 1) {
                assert_ne!(a.pos, b.pos);
            }
        }
    }

    #[test]
    fn test_asteroids_prefer_fruit_columns() {
        let mut w = world(20, 20, 13);
        w.foods = vec![
            Food { id: 1, pos: IVec2::new(4, 9), kind: FoodKind::Apple },
            Food { id: 2, pos: IVec2::new(11, 3), kind: FoodKind::Lemon },
        ];
        let asteroids = space_asteroids(&mut w);
        assert_eq!(asteroids.len(), 5);
        let columns: Vec<i32> = asteroids.iter().map(|a| a.pos.x).collect();
        assert!(columns.contains(&4));
        assert!(columns.contains(&11));
        for a in &asteroids {
            assert_eq!(a.pos.y, 2);
            assert_eq!(a.kind, EnemyKind::Asteroid);
            assert!((300.0..600.0).contains(&a.interval_ms));
        }
    }

    #[test]
    fn test_bubbles_start_on_bottom_row() {
        let mut w = world(20, 20, 17);
        w.foods = vec![Food { id: 1, pos: IVec2::new(7, 2), kind: FoodKind::Orange }];
        let bubbles = sea_bubbles(&mut w);
        assert_eq!(bubbles.len(), 5);
        assert!(bubbles.iter().any(|b| b.pos.x == 7));
        for b in &bubbles {
            assert_eq!(b.pos.y, 19);
            assert!(matches!(b.kind, EnemyKind::Bubble { carrying: None }));
        }
    }

    #[test]
    fn test_fish_spawn_open_water() {
        let mut w = world(25, 25, 19);
        let fish = sea_fish(&mut w, &FieldView::EMPTY);
        assert_eq!(fish.len(), 7);
        for f in &fish {
            assert!(grid::in_bounds(f.pos, 25, 25));
            let EnemyKind::Fish { sprite, dir_x, steps_since_dive } = f.kind else {
                panic!("sea generator produced a non-fish");
            };
            assert!((1..=3).contains(&sprite));
            assert!(dir_x == 1 || dir_x == -1);
            assert_eq!(steps_since_dive, 0);
        }
    }

    #[test]
    fn test_generation_deterministic() {
        let mut a = world(20, 20, 42);
        let mut b = world(20, 20, 42);
        let ta: Vec<IVec2> = jungle_trees(&mut a).iter().map(|o| o.pos).collect();
        let tb: Vec<IVec2> = jungle_trees(&mut b).iter().map(|o| o.pos).collect();
        assert_eq!(ta, tb);
    }
}
