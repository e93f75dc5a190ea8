//! Per-frame simulation step
//!
//! [`advance`] moves every entity by one (clamped) time step, resolves
//! collisions, and returns what happened as a list of [`SimEvent`]s. It never
//! looks at session state: pausing and quizzes are handled by the caller
//! simply not calling it.

use glam::Vec2;
use rand::Rng;

use super::collision::clamp_to_arena;
use super::state::SimulationState;
use crate::consts::{PLAYER_COLOR, REFERENCE_FRAME_DT};
use crate::input::Intents;
use crate::scaled_chance;

/// What caused a player hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitCause {
    /// Struck by an enemy bullet
    Bullet,
    /// Overlapping an invader
    Collision,
}

/// Something that happened during a step
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Player fired a bullet
    ShotFired { bullet_id: u32 },
    /// Particle burst spawned
    Explosion { pos: Vec2, color: u32 },
    /// Player bullet destroyed an invader
    EnemyHit { invader_id: u32, points: u32, pos: Vec2 },
    /// Player took a hit
    PlayerHit { cause: HitCause },
    /// Last invader of the wave is gone (reported once per wave)
    WaveCleared { level: u32 },
}

/// Advance the simulation by `dt` seconds
///
/// `dt` is clamped to the tuning's `max_dt`. Zero, negative or non-finite
/// deltas leave the state untouched and produce no events.
pub fn advance(state: &mut SimulationState, input: &Intents, dt: f32) -> Vec<SimEvent> {
    let mut events = Vec::new();
    if !dt.is_finite() || dt <= 0.0 {
        return events;
    }
    let dt = dt.min(state.tuning.max_dt);
    state.clock += dt as f64;

    move_player(state, input, dt);
    if input.fire && state.fire.try_fire(state.clock) {
        state.spawn_player_bullet();
        if let Some(bullet) = state.bullets.last() {
            events.push(SimEvent::ShotFired {
                bullet_id: bullet.id,
            });
        }
    }
    move_bullets(state, dt);
    move_invaders(state, dt);
    enemy_fire(state, dt);
    update_particles(state, dt);

    resolve_player_bullets(state, &mut events);
    resolve_enemy_bullets(state, &mut events);
    resolve_body_collisions(state, &mut events);

    if state.invaders.is_empty() && !state.wave_cleared_reported {
        state.wave_cleared_reported = true;
        events.push(SimEvent::WaveCleared { level: state.level });
    }

    events
}

fn move_player(state: &mut SimulationState, input: &Intents, dt: f32) {
    let speed = state.tuning.player_speed;
    let arena_width = state.tuning.arena_width;
    let player = &mut state.player;

    player.vel = Vec2::new(input.horizontal() * speed, 0.0);
    player.pos += player.vel * dt;
    player.pos.x = clamp_to_arena(player.pos.x, player.size.width, arena_width);
}

fn move_bullets(state: &mut SimulationState, dt: f32) {
    let top = -state.tuning.bullet_despawn_margin;
    let bottom = state.tuning.arena_height + state.tuning.bullet_despawn_margin;
    let in_bounds = |y: f32| y > top && y < bottom;

    for bullet in state.bullets.iter_mut().chain(state.enemy_bullets.iter_mut()) {
        bullet.pos += bullet.vel * dt;
    }
    state.bullets.retain(|b| in_bounds(b.pos.y));
    state.enemy_bullets.retain(|b| in_bounds(b.pos.y));
}

fn move_invaders(state: &mut SimulationState, dt: f32) {
    let SimulationState {
        invaders,
        rng,
        tuning,
        level,
        ..
    } = state;

    let min_y = tuning.invader_min_y;
    let max_y = tuning.invader_max_y();
    let nudge_chance = scaled_chance(tuning.invader_nudge_chance(*level), dt);
    let reverse_chance = scaled_chance(tuning.invader_reverse_chance, dt);

    for invader in invaders.iter_mut() {
        invader.pos += invader.vel * dt;

        // Walls: always head back into the arena
        let right_wall = tuning.arena_width - invader.size.width;
        if invader.pos.x <= 0.0 {
            invader.pos.x = 0.0;
            invader.vel.x = invader.vel.x.abs();
        } else if invader.pos.x >= right_wall {
            invader.pos.x = right_wall;
            invader.vel.x = -invader.vel.x.abs();
        }

        // Altitude band: bounce partway back up off the floor
        if invader.pos.y > max_y {
            invader.pos.y = max_y;
            invader.vel.y = -invader.vel.y.abs() * tuning.invader_bounce_factor;
        }
        if invader.pos.y < min_y {
            invader.pos.y = min_y;
            invader.vel.y = invader.vel.y.abs();
        }

        if rng.random_bool(nudge_chance) {
            invader.vel.y += tuning.invader_nudge;
        }
        if rng.random_bool(reverse_chance) {
            invader.vel.x = -invader.vel.x;
        }
    }
}

/// 0 when the lowest invader is at the top of the band, 1 at the floor
fn wave_lowness(state: &SimulationState) -> f32 {
    let min_y = state.tuning.invader_min_y;
    let max_y = state.tuning.invader_max_y();
    let lowest = state
        .invaders
        .iter()
        .map(|i| i.pos.y)
        .fold(min_y, f32::max);
    ((lowest - min_y) / (max_y - min_y)).clamp(0.0, 1.0)
}

fn enemy_fire(state: &mut SimulationState, dt: f32) {
    let count = state.invaders.len();
    if count == 0 {
        return;
    }
    let chance = state.tuning.enemy_fire_chance(state.level, wave_lowness(state));
    if !state.rng.random_bool(scaled_chance(chance, dt)) {
        return;
    }

    // Lowest invaders first; they get most of the shots
    let mut order: Vec<usize> = (0..count).collect();
    order.sort_by(|&a, &b| {
        state.invaders[b]
            .pos
            .y
            .total_cmp(&state.invaders[a].pos.y)
    });
    let bias = state.tuning.enemy_low_shooter_bias.clamp(0.0, 1.0);
    let pick = if state.rng.random_bool(bias) {
        state.rng.random_range(0..count.div_ceil(2))
    } else {
        state.rng.random_range(0..count)
    };
    state.spawn_enemy_bullet(order[pick]);
}

fn update_particles(state: &mut SimulationState, dt: f32) {
    // Damping is tuned per 60 Hz frame; rescale so fade-out is frame-rate independent
    let damping = state
        .tuning
        .particle_damping
        .powf(dt / REFERENCE_FRAME_DT);
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel * dt;
        particle.vel *= damping;
        particle.life -= dt;
    }
    state.particles.retain(|p| p.life > 0.0);
}

/// Oldest bullet first, lowest invader index first; one kill per bullet
fn resolve_player_bullets(state: &mut SimulationState, events: &mut Vec<SimEvent>) {
    let burst = state.tuning.invader_burst;
    let mut i = 0;
    while i < state.bullets.len() {
        let bullet_box = state.bullets[i].aabb();
        let Some(hit) = state
            .invaders
            .iter()
            .position(|invader| invader.aabb().overlaps(&bullet_box))
        else {
            i += 1;
            continue;
        };

        state.bullets.remove(i);
        let invader = state.invaders.remove(hit);
        let center = invader.center();
        let color = invader.color();
        state.spawn_explosion(center, color, burst);

        log::debug!(
            "Invader {} (tier {}) destroyed at ({:.0}, {:.0})",
            invader.id,
            invader.tier,
            center.x,
            center.y
        );
        events.push(SimEvent::Explosion { pos: center, color });
        events.push(SimEvent::EnemyHit {
            invader_id: invader.id,
            points: invader.points,
            pos: center,
        });
    }
}

/// Every enemy bullet that connects is its own hit
fn resolve_enemy_bullets(state: &mut SimulationState, events: &mut Vec<SimEvent>) {
    let burst = state.tuning.player_burst;
    let player_box = state.player.aabb();
    let mut i = 0;
    while i < state.enemy_bullets.len() {
        if !state.enemy_bullets[i].aabb().overlaps(&player_box) {
            i += 1;
            continue;
        }
        state.enemy_bullets.remove(i);
        let center = player_box.center();
        state.spawn_explosion(center, PLAYER_COLOR, burst);
        events.push(SimEvent::Explosion {
            pos: center,
            color: PLAYER_COLOR,
        });
        events.push(SimEvent::PlayerHit {
            cause: HitCause::Bullet,
        });
    }
}

/// One hit per step while any invader overlaps the player
fn resolve_body_collisions(state: &mut SimulationState, events: &mut Vec<SimEvent>) {
    let player_box = state.player.aabb();
    if state
        .invaders
        .iter()
        .any(|invader| invader.aabb().overlaps(&player_box))
    {
        events.push(SimEvent::PlayerHit {
            cause: HitCause::Collision,
        });
    }
}
