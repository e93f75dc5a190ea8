//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (fire order for bullets, grid order for invaders)
//! - No rendering, session or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;
pub mod wave;

pub use collision::{Aabb, Size, aabb_overlap, clamp_to_arena};
pub use state::{
    Bullet, BulletOwner, Invader, Particle, Player, SimulationState, Snapshot,
};
pub use tick::{HitCause, SimEvent, advance};
pub use wave::generate_wave;
