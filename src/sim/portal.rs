//! Portal subsystem: spawn gating, destination cycling and field switches
//!
//! At most one portal is live. It appears once the score has grown by the
//! threshold since the last portal entry, and entering it rebuilds the
//! snakes on the destination field with their score-determined lengths.

use glam::IVec2;
use rand::Rng;

use crate::consts::*;
use crate::sim::engine::FieldEngine;
use crate::sim::r#gen;
use crate::sim::state::{FieldKind, FieldView, GameWorld, Portal, Snake};

impl FieldEngine {
    /// A portal may spawn iff portals are enabled, none is live, and the
    /// score has grown by the threshold since the last portal entry
    pub fn should_spawn_portal(&self, world: &GameWorld) -> bool {
        world.settings.portals_enabled
            && self.portal.is_none()
            && world.total_score().saturating_sub(self.last_portal_score) >= PORTAL_THRESHOLD
    }

    /// Place the portal on a random unoccupied cell (unchecked after the
    /// attempt budget) with a destination fixed at spawn time
    pub(crate) fn spawn_portal(&mut self, world: &mut GameWorld) {
        if self.portal.is_some() {
            return;
        }
        let view = self.view();
        let mut attempts = 0;
        let pos = loop {
            let candidate = world.random_cell();
            attempts += 1;
            if !world.is_occupied(candidate, &view) || attempts > PORTAL_SPAWN_ATTEMPTS {
                break candidate;
            }
        };
        let destination = self.choose_destination(world);
        log::info!(
            "Portal spawned at ({}, {}) to {}",
            pos.x,
            pos.y,
            destination.display_name()
        );
        self.portal = Some(Portal { pos, destination });
    }

    /// From Home, any non-Home field starts a new cycle. Elsewhere,
    /// continue to a non-Home field not yet visited this cycle; once all
    /// have been seen, the only way out is Home.
    fn choose_destination(&self, world: &mut GameWorld) -> FieldKind {
        if self.current_field == FieldKind::Home {
            let i = world.rng.random_range(0..FieldKind::NON_HOME.len());
            return FieldKind::NON_HOME[i];
        }
        let remaining: Vec<FieldKind> = FieldKind::NON_HOME
            .iter()
            .copied()
            .filter(|f| !self.cycle_visited.contains(f) && *f != self.current_field)
            .collect();
        if remaining.is_empty() {
            FieldKind::Home
        } else {
            remaining[world.rng.random_range(0..remaining.len())]
        }
    }

    /// Test-and-apply portal entry for a snake head cell
    pub fn check_portal_collision(&mut self, world: &mut GameWorld, head: IVec2) -> bool {
        if self.portal.is_some_and(|p| p.pos == head) {
            self.enter_portal(world);
            true
        } else {
            false
        }
    }

    /// Teleport: rebuild every snake coiled on a safe cell at its
    /// score-determined length, reset directions, advance the portal
    /// baseline and switch fields
    pub(crate) fn enter_portal(&mut self, world: &mut GameWorld) {
        let Some(portal) = self.portal else {
            return;
        };
        let destination = portal.destination;

        let mut spawns: Vec<IVec2> = Vec::with_capacity(world.snakes.len());
        for _ in 0..world.snakes.len() {
            let mut pos = self.find_safe_spawn(world);
            // Keep the players off each other's emergence cell
            for _ in 0..DISTINCT_SPAWN_ATTEMPTS {
                if !spawns.contains(&pos) {
                    break;
                }
                pos = self.find_safe_spawn(world);
            }
            spawns.push(pos);
        }
        for (i, snake) in world.snakes.iter_mut().enumerate() {
            let len = snake.score as usize + 1;
            *snake = Snake::coiled(spawns[i], len, snake.score);
        }
        if !world.settings.turn_based {
            world.paused_for_redirect = true;
        }

        self.last_portal_score = world.total_score();
        self.portal = None;
        log::info!("Portal entered, destination {}", destination.display_name());
        self.switch_to_field(world, destination);
    }

    /// Tear down the old field and build the new one: fresh obstacles and
    /// enemies, fresh fruit and bombs, new entry-score baseline, one-shot
    /// spawn flags reset. Atomic from the caller's perspective.
    pub fn switch_to_field(&mut self, world: &mut GameWorld, field: FieldKind) {
        let old = self.current_field;
        self.previous_field = Some(old);
        self.current_field = field;

        world.foods.clear();
        world.bombs.clear();

        self.field_entry_score = world.total_score();
        self.king_monkey_spawned = false;
        self.big_asteroid_group = None;

        if field == FieldKind::Home {
            self.cycle_visited.clear();
        } else {
            self.cycle_visited.insert(field);
        }

        match field {
            FieldKind::Home => {
                self.obstacles.clear();
                self.enemies.clear();
            }
            FieldKind::Jungle => {
                self.obstacles = r#gen::jungle_trees(world);
                let view = FieldView {
                    obstacles: &self.obstacles,
                    portal: self.portal.as_ref().map(|p| p.pos),
                };
                self.enemies = r#gen::jungle_monkeys(world, &view);
            }
            FieldKind::Space => {
                self.obstacles = r#gen::space_planets(world);
                // Asteroids wait for the fruit so their columns can align
                self.enemies.clear();
            }
            FieldKind::Sea => {
                self.obstacles.clear();
                let mut shoal = r#gen::sea_fish(world, &FieldView::EMPTY);
                shoal.extend(r#gen::sea_bubbles(world));
                self.enemies = shoal;
            }
        }

        let view = self.view();
        world.spawn_food(&view);

        if field == FieldKind::Space {
            self.enemies = r#gen::space_asteroids(world);
        }

        let view = self.view();
        world.spawn_bombs(&view);

        log::info!(
            "Field switch: {} -> {}",
            old.display_name(),
            field.display_name()
        );
    }
}
