//! Idle/demo mode: an AI that plays the game
//!
//! Dodges enemy bullets about to land on the ship, otherwise lines up under
//! the lowest invader (leading its horizontal motion) and fires.

use crate::input::Intents;
use crate::sim::SimulationState;

/// How far above the ship an incoming bullet is considered a threat
const THREAT_RANGE: f32 = 140.0;
/// Extra horizontal clearance kept around the ship when dodging
const DODGE_MARGIN: f32 = 12.0;
/// Close enough to the target to stop moving
const DEADZONE: f32 = 4.0;

/// Intents for the next frame
pub fn steer(state: &SimulationState) -> Intents {
    let player = &state.player;
    let player_box = player.aabb();
    let player_mid = player_box.center().x;

    // Incoming bullet about to land on us: step away from it
    let threat = state
        .enemy_bullets
        .iter()
        .filter(|b| b.vel.y > 0.0)
        .filter(|b| {
            let bottom = b.pos.y + b.size.height;
            bottom <= player_box.max.y && player_box.min.y - bottom < THREAT_RANGE
        })
        .filter(|b| {
            b.pos.x < player_box.max.x + DODGE_MARGIN
                && b.pos.x + b.size.width > player_box.min.x - DODGE_MARGIN
        })
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    if let Some(bullet) = threat {
        let bullet_mid = bullet.pos.x + bullet.size.width / 2.0;
        let arena_width = state.tuning().arena_width;
        let mut go_right = bullet_mid < player_mid;
        // Pinned against a wall: the only way out is the other side
        if go_right && player_box.max.x >= arena_width - 1.0 {
            go_right = false;
        } else if !go_right && player_box.min.x <= 1.0 {
            go_right = true;
        }
        return Intents {
            move_left: !go_right,
            move_right: go_right,
            fire: true,
        };
    }

    let Some(target) = state
        .invaders
        .iter()
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
    else {
        return Intents::default();
    };

    // Lead the target by the bullet's flight time
    let center = target.center();
    let flight = (player_box.min.y - center.y).max(0.0) / state.tuning().player_bullet_speed;
    let aim_x = center.x + target.vel.x * flight;
    let dx = aim_x - player_mid;

    Intents {
        move_left: dx < -DEADZONE,
        move_right: dx > DEADZONE,
        fire: dx.abs() < target.size.width / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Bullet, BulletOwner, Size};
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn quiet_state() -> SimulationState {
        let mut state = SimulationState::new(8, Tuning::default());
        for invader in &mut state.invaders {
            invader.vel = Vec2::ZERO;
        }
        state
    }

    fn incoming_at(state: &mut SimulationState, x: f32) {
        let id = state.next_entity_id();
        let y = state.player.pos.y - 60.0;
        state.enemy_bullets.push(Bullet {
            id,
            pos: Vec2::new(x, y),
            size: Size::new(6.0, 10.0),
            vel: Vec2::new(0.0, 300.0),
            owner: BulletOwner::Enemy,
        });
    }

    #[test]
    fn test_tracks_lowest_invader() {
        let mut state = quiet_state();
        let last = state.invaders.len() - 1;
        state.invaders[last].pos = Vec2::new(700.0, 300.0);
        let intents = steer(&state);
        assert!(intents.move_right && !intents.move_left);
        assert!(!intents.fire);

        let target_mid = state.invaders[last].center().x;
        state.player.pos.x = target_mid - state.player.size.width / 2.0;
        let intents = steer(&state);
        assert_eq!(intents.horizontal(), 0.0);
        assert!(intents.fire);
    }

    #[test]
    fn test_dodges_incoming_bullet() {
        let mut state = quiet_state();
        let mid = state.player.aabb().center().x;
        incoming_at(&mut state, mid - 10.0);
        let intents = steer(&state);
        assert!(intents.move_right);

        state.enemy_bullets.clear();
        incoming_at(&mut state, mid + 5.0);
        assert!(steer(&state).move_left);
    }

    #[test]
    fn test_dodge_away_from_wall() {
        let mut state = quiet_state();
        state.player.pos.x = 0.0;
        let mid = state.player.aabb().center().x;
        incoming_at(&mut state, mid + 5.0);
        assert!(steer(&state).move_right);
    }

    #[test]
    fn test_idle_without_invaders() {
        let mut state = quiet_state();
        state.invaders.clear();
        assert_eq!(steer(&state), Intents::default());
    }
}
