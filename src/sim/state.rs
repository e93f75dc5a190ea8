//! Entity records and the owned simulation state
//!
//! The engine owns every collection here for the lifetime of a session.
//! Renderers only ever see a borrowed [`Snapshot`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Size};
use super::wave::generate_wave;
use crate::consts::*;
use crate::input::FireLimiter;
use crate::tuning::Tuning;
use crate::random_range;

/// The player's ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Size,
    pub vel: Vec2,
    pub lives: u32,
}

impl Player {
    /// Player centered horizontally on its fixed row
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(
                (tuning.arena_width - tuning.player_width) / 2.0,
                tuning.player_y(),
            ),
            size: Size::new(tuning.player_width, tuning.player_height),
            vel: Vec2::ZERO,
            lives: tuning.starting_lives,
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    /// Where player bullets leave the ship (top center)
    pub fn muzzle(&self, bullet_size: Size) -> Vec2 {
        Vec2::new(
            self.pos.x + (self.size.width - bullet_size.width) / 2.0,
            self.pos.y - bullet_size.height,
        )
    }
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// A bullet in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub size: Size,
    pub vel: Vec2,
    pub owner: BulletOwner,
}

impl Bullet {
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }
}

/// A single invader of the current wave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invader {
    pub id: u32,
    pub pos: Vec2,
    pub size: Size,
    pub vel: Vec2,
    /// Shape/color tier, 1..=5
    pub tier: u8,
    pub health: u32,
    pub max_health: u32,
    pub points: u32,
}

impl Invader {
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.aabb().center()
    }

    /// Tier color (0xRRGGBB)
    pub fn color(&self) -> u32 {
        let idx = (self.tier.max(1) as usize - 1) % TIER_COLORS.len();
        TIER_COLORS[idx]
    }

    /// Render opacity: dims as health drops, never below half
    pub fn opacity(&self) -> f32 {
        if self.max_health == 0 {
            return 1.0;
        }
        0.5 + 0.5 * (self.health as f32 / self.max_health as f32)
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: u32,
    /// Seconds remaining
    pub life: f32,
    pub max_life: f32,
}

impl Particle {
    /// Fade factor for rendering (1 = fresh, 0 = gone)
    pub fn opacity(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 0.0;
        }
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

/// Everything the engine simulates for one session
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Current level (drives wave generation and difficulty)
    pub level: u32,
    /// Simulated seconds since the session started
    pub clock: f64,
    pub player: Player,
    /// Player bullets in fire order
    pub bullets: Vec<Bullet>,
    /// Enemy bullets in fire order
    pub enemy_bullets: Vec<Bullet>,
    pub invaders: Vec<Invader>,
    pub particles: Vec<Particle>,
    /// Player fire-rate limiter (reads `clock`)
    pub fire: FireLimiter,
    /// Particle budget; oldest particles are dropped past this
    pub particle_cap: usize,
    /// Set once `WaveCleared` has been reported for the current wave
    pub(crate) wave_cleared_reported: bool,
    pub(crate) tuning: Tuning,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl SimulationState {
    /// Fresh state at level 1 with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            level: 1,
            clock: 0.0,
            player: Player::new(&tuning),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            invaders: Vec::new(),
            particles: Vec::new(),
            fire: FireLimiter::new(tuning.fire_cooldown),
            particle_cap: tuning.max_particles,
            wave_cleared_reported: false,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            tuning,
        };
        state.load_level(1);
        state
    }

    /// Clear every entity and start over at `level` (restart semantics)
    pub fn reset(&mut self, level: u32) {
        self.clock = 0.0;
        self.player = Player::new(&self.tuning);
        self.bullets.clear();
        self.enemy_bullets.clear();
        self.particles.clear();
        self.fire.reset();
        self.load_level(level);
    }

    /// Replace the wave with a freshly generated one for `level`
    pub fn load_level(&mut self, level: u32) {
        let level = self.tuning.clamp_level(level);
        self.level = level;
        let first_id = self.next_id;
        self.invaders = generate_wave(level, &self.tuning, &mut self.rng, first_id);
        self.next_id += self.invaders.len() as u32;
        self.wave_cleared_reported = false;
        log::debug!(
            "Level {} wave: {} invaders",
            level,
            self.invaders.len()
        );
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn a player bullet at the muzzle
    pub fn spawn_player_bullet(&mut self) {
        let size = Size::new(
            self.tuning.player_bullet_width,
            self.tuning.player_bullet_height,
        );
        let bullet = Bullet {
            id: self.next_entity_id(),
            pos: self.player.muzzle(size),
            size,
            vel: Vec2::new(0.0, -self.tuning.player_bullet_speed),
            owner: BulletOwner::Player,
        };
        self.bullets.push(bullet);
    }

    /// Spawn an enemy bullet just below the invader at `index`
    pub fn spawn_enemy_bullet(&mut self, index: usize) {
        let Some(invader) = self.invaders.get(index) else {
            return;
        };
        let size = Size::new(
            self.tuning.enemy_bullet_width,
            self.tuning.enemy_bullet_height,
        );
        let pos = Vec2::new(
            invader.pos.x + (invader.size.width - size.width) / 2.0,
            invader.pos.y + invader.size.height,
        );
        let bullet = Bullet {
            id: self.next_entity_id(),
            pos,
            size,
            vel: Vec2::new(0.0, self.tuning.enemy_bullet_speed(self.level)),
            owner: BulletOwner::Enemy,
        };
        self.enemy_bullets.push(bullet);
    }

    /// Radial particle burst at `center`
    pub fn spawn_explosion(&mut self, center: Vec2, color: u32, count: u32) {
        let life = self.tuning.particle_life;
        for i in 0..count {
            if self.particle_cap == 0 {
                return;
            }
            if self.particles.len() >= self.particle_cap {
                // Remove oldest particles to make room
                self.particles.remove(0);
            }
            let angle = std::f32::consts::TAU * i as f32 / count as f32;
            let (min_speed, max_speed) = (
                self.tuning.particle_min_speed,
                self.tuning.particle_max_speed,
            );
            let (min_size, max_size) = (self.tuning.particle_min_size, self.tuning.particle_max_size);
            let speed = random_range(&mut self.rng, min_speed, max_speed);
            let size = random_range(&mut self.rng, min_size, max_size);
            let particle = Particle {
                id: self.next_entity_id(),
                pos: center,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                size,
                color,
                life,
                max_life: life,
            };
            self.particles.push(particle);
        }
    }

    /// Read-only view for renderers
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            arena: Size::new(self.tuning.arena_width, self.tuning.arena_height),
            player: &self.player,
            bullets: &self.bullets,
            enemy_bullets: &self.enemy_bullets,
            invaders: self
                .invaders
                .iter()
                .map(|invader| InvaderView {
                    invader,
                    color: invader.color(),
                    opacity: invader.opacity(),
                })
                .collect(),
            particles: self
                .particles
                .iter()
                .map(|particle| ParticleView {
                    particle,
                    opacity: particle.opacity(),
                })
                .collect(),
        }
    }
}

/// Invader plus its derived render values
#[derive(Debug, Serialize)]
pub struct InvaderView<'a> {
    #[serde(flatten)]
    pub invader: &'a Invader,
    pub color: u32,
    pub opacity: f32,
}

/// Particle plus its fade value
#[derive(Debug, Serialize)]
pub struct ParticleView<'a> {
    #[serde(flatten)]
    pub particle: &'a Particle,
    pub opacity: f32,
}

/// Per-frame render snapshot
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub arena: Size,
    pub player: &'a Player,
    pub bullets: &'a [Bullet],
    pub enemy_bullets: &'a [Bullet],
    pub invaders: Vec<InvaderView<'a>>,
    pub particles: Vec<ParticleView<'a>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_level_one_wave() {
        let state = SimulationState::new(1, Tuning::default());
        assert_eq!(state.level, 1);
        assert_eq!(state.invaders.len(), 3 * 7);
        assert!(state.bullets.is_empty());
        assert!(state.particles.is_empty());
        assert_eq!(state.player.lives, STARTING_LIVES);
    }

    #[test]
    fn test_entity_ids_unique_across_waves() {
        let mut state = SimulationState::new(5, Tuning::default());
        let mut ids: Vec<u32> = state.invaders.iter().map(|i| i.id).collect();
        state.load_level(2);
        ids.extend(state.invaders.iter().map(|i| i.id));
        state.spawn_player_bullet();
        ids.push(state.bullets[0].id);
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = SimulationState::new(3, Tuning::default());
        state.load_level(4);
        state.spawn_player_bullet();
        state.spawn_enemy_bullet(0);
        state.spawn_explosion(Vec2::new(100.0, 100.0), 0xffffff, 10);
        state.player.pos.x = 0.0;
        state.clock = 12.0;

        state.reset(1);
        assert_eq!(state.level, 1);
        assert!(state.bullets.is_empty());
        assert!(state.enemy_bullets.is_empty());
        assert!(state.particles.is_empty());
        assert_eq!(state.invaders.len(), 21);
        assert_eq!(state.clock, 0.0);
        assert_eq!(state.player, Player::new(state.tuning()));
    }

    #[test]
    fn test_explosion_respects_cap() {
        let mut state = SimulationState::new(3, Tuning::default());
        state.particle_cap = 25;
        state.spawn_explosion(Vec2::ZERO, 0xff0000, 15);
        state.spawn_explosion(Vec2::ZERO, 0x00ff00, 15);
        assert_eq!(state.particles.len(), 25);
        // Newest burst survives intact
        assert_eq!(
            state.particles.iter().filter(|p| p.color == 0x00ff00).count(),
            15
        );

        state.particles.clear();
        state.particle_cap = 0;
        state.spawn_explosion(Vec2::ZERO, 0xff0000, 15);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_enemy_bullet_spawns_below_invader() {
        let mut state = SimulationState::new(3, Tuning::default());
        let invader = state.invaders[0].clone();
        state.spawn_enemy_bullet(0);
        let bullet = &state.enemy_bullets[0];
        assert_eq!(bullet.owner, BulletOwner::Enemy);
        assert!((bullet.pos.y - (invader.pos.y + invader.size.height)).abs() < 1e-4);
        assert!(bullet.vel.y > 0.0);
        // Out-of-range index is ignored
        state.spawn_enemy_bullet(10_000);
        assert_eq!(state.enemy_bullets.len(), 1);
    }

    #[test]
    fn test_invader_opacity_and_color() {
        let mut state = SimulationState::new(3, Tuning::default());
        state.load_level(4);
        let invader = &mut state.invaders[0];
        assert_eq!(invader.opacity(), 1.0);
        invader.health = 0;
        assert_eq!(invader.opacity(), 0.5);
        invader.tier = 2;
        assert_eq!(invader.color(), TIER_COLORS[1]);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = SimulationState::new(3, Tuning::default());
        let json = serde_json::to_value(state.snapshot()).expect("snapshot serializes");
        assert_eq!(json["arena"]["width"], 800.0);
        assert!(json["enemyBullets"].as_array().is_some());
        let first = &json["invaders"][0];
        assert!(first["color"].is_number());
        assert!(first["opacity"].is_number());
        assert!(first["tier"].is_number());
    }
}
