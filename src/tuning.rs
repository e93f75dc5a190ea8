//! Data-driven game balance
//!
//! Every gameplay constant and per-level scaling coefficient lives here, so
//! difficulty can be retuned (or loaded from JSON) without touching the engine.
//! Speeds are in pixels per second, times in seconds. Chances are per 60 Hz
//! frame and get rescaled to the actual frame length by the engine.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena / timing ===
    pub arena_width: f32,
    pub arena_height: f32,
    /// Frame deltas above this are clamped
    pub max_dt: f32,

    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    /// Distance from the arena bottom to the player's top edge
    pub player_bottom_offset: f32,
    pub player_speed: f32,
    pub starting_lives: u32,

    // === Player bullets ===
    pub player_bullet_width: f32,
    pub player_bullet_height: f32,
    pub player_bullet_speed: f32,
    /// Minimum time between player shots
    pub fire_cooldown: f32,
    /// Bullets are dropped once this far outside the arena vertically
    pub bullet_despawn_margin: f32,

    // === Wave grid ===
    pub invader_width: f32,
    pub invader_height: f32,
    pub grid_base_rows: u32,
    /// One extra row every this many levels
    pub grid_levels_per_row: u32,
    pub grid_max_rows: u32,
    pub grid_base_cols: u32,
    pub grid_max_cols: u32,
    pub grid_col_spacing: f32,
    pub grid_row_spacing: f32,
    pub grid_top: f32,
    /// Later waves start lower
    pub grid_top_per_level: f32,
    pub points_per_tier: u32,

    // === Invader movement ===
    pub invader_base_speed: f32,
    /// Speed multiplier grows by this much per level above 1
    pub invader_speed_per_level: f32,
    pub invader_drift_base: f32,
    pub invader_drift_per_level: f32,
    /// Highest the wave may sit (smallest y)
    pub invader_min_y: f32,
    /// Lowest the wave may sit, measured up from the arena bottom
    pub invader_floor_offset: f32,
    /// Fraction of drift speed kept when bouncing off the floor
    pub invader_bounce_factor: f32,
    pub invader_reverse_chance: f32,
    pub invader_nudge_chance_per_level: f32,
    pub invader_nudge: f32,

    // === Enemy fire ===
    pub enemy_fire_chance_per_level: f32,
    /// Extra fire chance (fraction) when the wave sits at the floor
    pub enemy_fire_low_bonus: f32,
    /// Chance the shooter is picked from the lower half of the wave
    pub enemy_low_shooter_bias: f64,
    pub enemy_bullet_width: f32,
    pub enemy_bullet_height: f32,
    pub enemy_bullet_base_speed: f32,
    pub enemy_bullet_speed_base_factor: f32,
    pub enemy_bullet_speed_per_level: f32,

    // === Particles ===
    pub invader_burst: u32,
    pub player_burst: u32,
    pub particle_min_speed: f32,
    pub particle_max_speed: f32,
    pub particle_min_size: f32,
    pub particle_max_size: f32,
    pub particle_life: f32,
    /// Velocity kept per 60 Hz frame
    pub particle_damping: f32,
    pub max_particles: usize,

    // === Progression / scoring ===
    pub max_level: u32,
    pub invader_health_level_divisor: u32,
    pub correct_answer_score: u64,
    pub wrong_answer_penalty: u64,
    /// Score lost on top of the life when the player is hit (0 = lives only)
    pub player_hit_penalty: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            max_dt: MAX_FRAME_DT,

            player_width: 50.0,
            player_height: 40.0,
            player_bottom_offset: 60.0,
            player_speed: 300.0,
            starting_lives: STARTING_LIVES,

            player_bullet_width: 6.0,
            player_bullet_height: 12.0,
            player_bullet_speed: 480.0,
            fire_cooldown: 0.25,
            bullet_despawn_margin: 20.0,

            invader_width: 40.0,
            invader_height: 30.0,
            grid_base_rows: 3,
            grid_levels_per_row: 2,
            grid_max_rows: 5,
            grid_base_cols: 7,
            grid_max_cols: 11,
            grid_col_spacing: 55.0,
            grid_row_spacing: 45.0,
            grid_top: 30.0,
            grid_top_per_level: 15.0,
            points_per_tier: 10,

            invader_base_speed: 120.0,
            invader_speed_per_level: 0.4,
            invader_drift_base: 18.0,
            invader_drift_per_level: 6.0,
            invader_min_y: 20.0,
            invader_floor_offset: 150.0,
            invader_bounce_factor: 0.5,
            invader_reverse_chance: 0.03,
            invader_nudge_chance_per_level: 0.02,
            invader_nudge: 12.0,

            enemy_fire_chance_per_level: 0.04,
            enemy_fire_low_bonus: 1.0,
            enemy_low_shooter_bias: 0.7,
            enemy_bullet_width: 6.0,
            enemy_bullet_height: 10.0,
            enemy_bullet_base_speed: 480.0,
            enemy_bullet_speed_base_factor: 0.5,
            enemy_bullet_speed_per_level: 0.15,

            invader_burst: 15,
            player_burst: 20,
            particle_min_speed: 120.0,
            particle_max_speed: 360.0,
            particle_min_size: 3.0,
            particle_max_size: 7.0,
            particle_life: 0.5,
            particle_damping: 0.98,
            max_particles: 500,

            max_level: FINAL_LEVEL,
            invader_health_level_divisor: 2,
            correct_answer_score: 100,
            wrong_answer_penalty: 25,
            player_hit_penalty: 50,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning table; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject tables that cannot produce a playable game
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(Error::InvalidTuning(msg.to_string()));

        if !(self.arena_width > 0.0 && self.arena_height > 0.0) {
            return fail("arena dimensions must be positive");
        }
        if self.player_width <= 0.0 || self.player_width > self.arena_width {
            return fail("player must be narrower than the arena");
        }
        if !(self.max_dt > 0.0) {
            return fail("max_dt must be positive");
        }
        if self.fire_cooldown < 0.0 {
            return fail("fire_cooldown must not be negative");
        }
        if self.max_level == 0 {
            return fail("max_level must be at least 1");
        }
        if self.grid_base_rows == 0
            || self.grid_base_cols == 0
            || self.grid_max_rows == 0
            || self.grid_max_cols == 0
        {
            return fail("a wave needs at least one row and one column");
        }
        if self.starting_lives == 0 {
            return fail("starting_lives must be at least 1");
        }
        if self.grid_levels_per_row == 0 || self.invader_health_level_divisor == 0 {
            return fail("level divisors must be non-zero");
        }
        if self.invader_min_y >= self.invader_max_y() {
            return fail("invader altitude band is empty");
        }
        if self.particle_min_speed > self.particle_max_speed
            || self.particle_min_size > self.particle_max_size
        {
            return fail("particle ranges are inverted");
        }
        Ok(())
    }

    /// Lowest y an invader's top edge may reach
    #[inline]
    pub fn invader_max_y(&self) -> f32 {
        self.arena_height - self.invader_floor_offset
    }

    /// Player's fixed row (top edge)
    #[inline]
    pub fn player_y(&self) -> f32 {
        self.arena_height - self.player_bottom_offset
    }

    /// Clamp a level into `[1, max_level]`
    #[inline]
    pub fn clamp_level(&self, level: u32) -> u32 {
        level.clamp(1, self.max_level)
    }

    pub fn grid_rows(&self, level: u32) -> u32 {
        let level = self.clamp_level(level);
        (self.grid_base_rows + (level - 1) / self.grid_levels_per_row).min(self.grid_max_rows)
    }

    pub fn grid_cols(&self, level: u32) -> u32 {
        let level = self.clamp_level(level);
        (self.grid_base_cols + (level - 1)).min(self.grid_max_cols)
    }

    pub fn invader_health(&self, level: u32) -> u32 {
        1 + self.clamp_level(level) / self.invader_health_level_divisor
    }

    /// Horizontal speed magnitude for invaders on this level
    pub fn invader_speed(&self, level: u32) -> f32 {
        let level = self.clamp_level(level);
        self.invader_base_speed * (1.0 + (level - 1) as f32 * self.invader_speed_per_level)
    }

    /// Initial downward drift for invaders on this level
    pub fn invader_drift(&self, level: u32) -> f32 {
        self.invader_drift_base + self.clamp_level(level) as f32 * self.invader_drift_per_level
    }

    pub fn enemy_bullet_speed(&self, level: u32) -> f32 {
        let level = self.clamp_level(level);
        self.enemy_bullet_base_speed
            * (self.enemy_bullet_speed_base_factor
                + level as f32 * self.enemy_bullet_speed_per_level)
    }

    /// Per-frame enemy fire chance; `lowness` is 0 at the top of the band, 1 at the floor
    pub fn enemy_fire_chance(&self, level: u32, lowness: f32) -> f32 {
        let level = self.clamp_level(level);
        self.enemy_fire_chance_per_level
            * level as f32
            * (1.0 + lowness.clamp(0.0, 1.0) * self.enemy_fire_low_bonus)
    }

    /// Per-frame chance an invader gets nudged downward
    pub fn invader_nudge_chance(&self, level: u32) -> f32 {
        self.invader_nudge_chance_per_level * self.clamp_level(level) as f32
    }
}
