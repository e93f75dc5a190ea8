//! Quiz Invaders - an invaders-style shooter where kills are gated by physics questions
//!
//! Core modules:
//! - `sim`: Simulation engine (entities, wave generation, per-frame advance, collisions)
//! - `session`: Modal state machine (menu/playing/paused/quiz/game over/victory)
//! - `stats`: Score, lives and progress reducer
//! - `quiz`: Questions, answer checking and the question bank
//! - `input`: Raw key state to intents, fire-rate limiting
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `autopilot`: Idle/demo AI
//! - `web`: Browser binding (wasm32 only)

pub mod autopilot;
pub mod error;
pub mod input;
pub mod quiz;
pub mod session;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{Error, Result};
pub use input::{InputCollector, Intents};
pub use quiz::{AnswerKind, Question, QuestionBank, QuestionSource};
pub use session::{AnswerOutcome, Session, SessionEvent, SessionState};
pub use settings::{QualityPreset, Settings};
pub use stats::{SessionStats, StatsDelta};
pub use tuning::Tuning;

use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Arena dimensions (pixels)
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Longest frame the engine will integrate in one call (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Frame length the per-frame chances and damping were tuned at (60 Hz)
    pub const REFERENCE_FRAME_DT: f32 = 1.0 / 60.0;

    /// Levels per session; clearing this one wins
    pub const FINAL_LEVEL: u32 = 5;
    pub const STARTING_LIVES: u32 = 3;

    /// Invader tier palette (0xRRGGBB), indexed by tier - 1
    pub const TIER_COLORS: [u32; 5] = [0xff0066, 0xff6600, 0xffcc00, 0x00ff66, 0x0066ff];
    pub const PLAYER_COLOR: u32 = 0x00ff00;
}

/// Uniform float in `[min, max)`; returns `min` for an empty range
#[inline]
pub fn random_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

/// +1.0 or -1.0 with equal probability
#[inline]
pub fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}

/// Convert a chance tuned per 60 Hz frame into a chance for a frame of `dt` seconds
#[inline]
pub fn scaled_chance(per_frame: f32, dt: f32) -> f64 {
    (per_frame * dt / consts::REFERENCE_FRAME_DT).clamp(0.0, 1.0) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_random_range_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            let v = random_range(&mut rng, 2.0, 6.0);
            assert!((2.0..6.0).contains(&v));
        }
        // Degenerate range does not panic
        assert_eq!(random_range(&mut rng, 3.0, 3.0), 3.0);
        assert_eq!(random_range(&mut rng, 5.0, 1.0), 5.0);
    }

    #[test]
    fn test_scaled_chance() {
        let at_reference = scaled_chance(0.03, consts::REFERENCE_FRAME_DT);
        assert!((at_reference - 0.03).abs() < 1e-6);
        // Half-length frame halves the chance
        let half = scaled_chance(0.03, consts::REFERENCE_FRAME_DT / 2.0);
        assert!((half - 0.015).abs() < 1e-6);
        assert_eq!(scaled_chance(50.0, 1.0), 1.0);
        assert_eq!(scaled_chance(0.5, 0.0), 0.0);
    }
}
