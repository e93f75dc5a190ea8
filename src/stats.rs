//! Score, lives and progress tracking
//!
//! [`SessionStats::apply`] is a pure reducer: it never lets score or lives go
//! negative, keeps the level inside `[1, max_level]` and never decrements the
//! counters.

use serde::{Deserialize, Serialize};

use crate::consts::STARTING_LIVES;

/// Per-session counters shown by the HUD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub score: u64,
    pub level: u32,
    pub lives: u32,
    pub enemies_destroyed: u32,
    pub questions_answered: u32,
    pub correct_answers: u32,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new(STARTING_LIVES)
    }
}

/// Signed change to [`SessionStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsDelta {
    pub score: i64,
    pub lives: i32,
    pub level: i32,
    pub enemies_destroyed: u32,
    pub questions_answered: u32,
    pub correct_answers: u32,
}

impl StatsDelta {
    /// A correctly answered quiz
    pub fn correct_answer(reward: u64) -> Self {
        Self {
            score: reward as i64,
            enemies_destroyed: 1,
            questions_answered: 1,
            correct_answers: 1,
            ..Self::default()
        }
    }

    /// A wrongly answered quiz
    pub fn wrong_answer(penalty: u64) -> Self {
        Self {
            score: -(penalty as i64),
            questions_answered: 1,
            ..Self::default()
        }
    }

    /// The player lost a life (plus an optional score penalty)
    pub fn player_hit(penalty: u64) -> Self {
        Self {
            score: -(penalty as i64),
            lives: -1,
            ..Self::default()
        }
    }

    pub fn level_up() -> Self {
        Self {
            level: 1,
            ..Self::default()
        }
    }
}

impl SessionStats {
    /// Fresh stats at level 1
    pub fn new(lives: u32) -> Self {
        Self {
            score: 0,
            level: 1,
            lives,
            enemies_destroyed: 0,
            questions_answered: 0,
            correct_answers: 0,
        }
    }

    /// Apply a delta, enforcing the floors and the level range
    pub fn apply(&self, delta: &StatsDelta, max_level: u32) -> Self {
        let max_level = max_level.max(1);
        Self {
            score: self.score.saturating_add_signed(delta.score),
            level: self
                .level
                .saturating_add_signed(delta.level)
                .clamp(1, max_level),
            lives: self.lives.saturating_add_signed(delta.lives),
            enemies_destroyed: self
                .enemies_destroyed
                .saturating_add(delta.enemies_destroyed),
            questions_answered: self
                .questions_answered
                .saturating_add(delta.questions_answered),
            correct_answers: self.correct_answers.saturating_add(delta.correct_answers),
        }
    }

    /// In-place [`apply`](Self::apply)
    pub fn apply_mut(&mut self, delta: &StatsDelta, max_level: u32) {
        *self = self.apply(delta, max_level);
    }

    /// Fraction of questions answered correctly (0 when none answered)
    pub fn accuracy(&self) -> f32 {
        if self.questions_answered == 0 {
            0.0
        } else {
            self.correct_answers as f32 / self.questions_answered as f32
        }
    }
}
