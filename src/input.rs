//! Input collection
//!
//! Raw key events (DOM key names) are folded into a held-key set, which is
//! resolved into [`Intents`] once per frame. Pause is edge-triggered: each
//! press is reported exactly once.

use std::collections::HashSet;

/// Semantic actions a key can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Fire,
    Pause,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            " " | "Space" | "Spacebar" => Some(Key::Fire),
            "p" | "P" | "Escape" => Some(Key::Pause),
            _ => None,
        }
    }
}

/// Intents for a single engine step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intents {
    pub move_left: bool,
    pub move_right: bool,
    pub fire: bool,
}

impl Intents {
    /// Horizontal direction: -1, 0 or +1 (opposing directions cancel)
    pub fn horizontal(&self) -> f32 {
        match (self.move_left, self.move_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Collects key events between frames
///
/// Single consumer: the frame driver calls [`InputCollector::intents`] and
/// [`InputCollector::take_pause`] once per frame on the same thread that
/// receives key events.
#[derive(Debug, Clone, Default)]
pub struct InputCollector {
    held: HashSet<Key>,
    pause_pressed: bool,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press; returns false for unmapped keys
    pub fn key_down(&mut self, key: &str) -> bool {
        let Some(key) = Key::from_dom(key) else {
            return false;
        };
        // Auto-repeat sends key_down while held; count the first one only
        if self.held.insert(key) && key == Key::Pause {
            self.pause_pressed = true;
        }
        true
    }

    /// Record a key release; returns false for unmapped keys
    pub fn key_up(&mut self, key: &str) -> bool {
        match Key::from_dom(key) {
            Some(key) => {
                self.held.remove(&key);
                true
            }
            None => false,
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Resolve held keys into intents
    pub fn intents(&self) -> Intents {
        Intents {
            move_left: self.is_held(Key::Left),
            move_right: self.is_held(Key::Right),
            fire: self.is_held(Key::Fire),
        }
    }

    /// Consume a pending pause toggle
    pub fn take_pause(&mut self) -> bool {
        std::mem::take(&mut self.pause_pressed)
    }

    /// Forget all held keys (e.g. on window blur)
    pub fn clear(&mut self) {
        self.held.clear();
        self.pause_pressed = false;
    }
}

/// Minimum-interval gate on player shots
///
/// Driven by the simulation clock, so the cap holds no matter how often the
/// fire intent is polled.
#[derive(Debug, Clone, PartialEq)]
pub struct FireLimiter {
    cooldown: f64,
    last_shot: Option<f64>,
}

impl FireLimiter {
    pub fn new(cooldown_secs: f32) -> Self {
        Self {
            cooldown: cooldown_secs.max(0.0) as f64,
            last_shot: None,
        }
    }

    pub fn cooldown(&self) -> f64 {
        self.cooldown
    }

    pub fn last_shot(&self) -> Option<f64> {
        self.last_shot
    }

    /// Whether a shot would be allowed at `now`
    pub fn ready(&self, now: f64) -> bool {
        match self.last_shot {
            Some(last) => now - last >= self.cooldown,
            None => true,
        }
    }

    /// Record a shot at `now` if the cooldown has elapsed
    pub fn try_fire(&mut self, now: f64) -> bool {
        if self.ready(now) {
            self.last_shot = Some(now);
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.last_shot = None;
    }
}
