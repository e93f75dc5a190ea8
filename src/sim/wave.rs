//! Wave generation
//!
//! Builds the invader grid for a level. The grid is centered in the arena,
//! grows with level (up to the tuning caps) and starts a little lower each
//! level. Tiers cycle through the palette by row.

use glam::Vec2;
use rand::Rng;

use super::collision::Size;
use super::state::Invader;
use crate::consts::TIER_COLORS;
use crate::random_sign;
use crate::tuning::Tuning;

/// Generate a fresh wave for `level`, numbering invaders from `first_id`
///
/// Only the initial horizontal directions are random; placement is fully
/// determined by the level and tuning.
pub fn generate_wave<R: Rng + ?Sized>(
    level: u32,
    tuning: &Tuning,
    rng: &mut R,
    first_id: u32,
) -> Vec<Invader> {
    let level = tuning.clamp_level(level);
    let rows = tuning.grid_rows(level);
    let cols = tuning.grid_cols(level);

    let size = Size::new(tuning.invader_width, tuning.invader_height);
    let grid_width = cols.saturating_sub(1) as f32 * tuning.grid_col_spacing + size.width;
    let start_x = ((tuning.arena_width - grid_width) / 2.0).max(0.0);
    let start_y = tuning.grid_top + (level - 1) as f32 * tuning.grid_top_per_level;

    let speed = tuning.invader_speed(level);
    let drift = tuning.invader_drift(level);
    let health = tuning.invader_health(level);

    log::info!(
        "Level {}: {}x{} grid, speed {:.0}, health {}",
        level,
        rows,
        cols,
        speed,
        health
    );

    let mut invaders = Vec::with_capacity((rows * cols) as usize);
    let mut id = first_id;
    for row in 0..rows {
        let tier = (row as usize % TIER_COLORS.len()) as u8 + 1;
        for col in 0..cols {
            invaders.push(Invader {
                id,
                pos: Vec2::new(
                    start_x + col as f32 * tuning.grid_col_spacing,
                    start_y + row as f32 * tuning.grid_row_spacing,
                ),
                size,
                vel: Vec2::new(random_sign(rng) * speed, drift),
                tier,
                health,
                max_health: health,
                points: tier as u32 * tuning.points_per_tier,
            });
            id += 1;
        }
    }
    invaders
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_wave_is_centered() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        for level in 1..=tuning.max_level {
            let wave = generate_wave(level, &tuning, &mut rng, 1);
            let left = wave.iter().map(|i| i.pos.x).fold(f32::MAX, f32::min);
            let right = wave
                .iter()
                .map(|i| i.pos.x + i.size.width)
                .fold(f32::MIN, f32::max);
            assert!((left - (tuning.arena_width - right)).abs() < 1e-3);
            assert!(left >= 0.0 && right <= tuning.arena_width);
        }
    }

    #[test]
    fn test_wave_dimensions_and_stats() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let wave = generate_wave(3, &tuning, &mut rng, 100);
        assert_eq!(wave.len(), (tuning.grid_rows(3) * tuning.grid_cols(3)) as usize);
        assert_eq!(wave[0].id, 100);
        assert_eq!(wave.last().map(|i| i.id), Some(100 + wave.len() as u32 - 1));
        for invader in &wave {
            assert_eq!(invader.health, 2);
            assert_eq!(invader.max_health, 2);
            assert!((invader.vel.x.abs() - tuning.invader_speed(3)).abs() < 1e-4);
            assert!(invader.vel.y > 0.0);
            assert!((1..=5).contains(&invader.tier));
            assert_eq!(invader.points, invader.tier as u32 * 10);
        }
    }

    #[test]
    fn test_tier_cycles_by_row() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let wave = generate_wave(5, &tuning, &mut rng, 1);
        let cols = tuning.grid_cols(5) as usize;
        for (row, chunk) in wave.chunks(cols).enumerate() {
            assert!(chunk.iter().all(|i| i.tier as usize == row + 1));
            assert!(chunk.iter().all(|i| i.pos.y == chunk[0].pos.y));
        }
    }

    #[test]
    fn test_later_waves_start_lower() {
        let tuning = Tuning::default();
        let top = |level: u32| {
            generate_wave(level, &tuning, &mut Pcg32::seed_from_u64(level as u64), 1)[0]
                .pos
                .y
        };
        assert!(top(2) > top(1));
        assert!(top(5) > top(4));
        // Same level and seed gives the same directions
        let a = generate_wave(2, &tuning, &mut Pcg32::seed_from_u64(9), 1);
        let b = generate_wave(2, &tuning, &mut Pcg32::seed_from_u64(9), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_width_grid_is_empty() {
        let tuning = Tuning {
            grid_max_cols: 0,
            ..Tuning::default()
        };
        let wave = generate_wave(1, &tuning, &mut Pcg32::seed_from_u64(4), 1);
        assert!(wave.is_empty());
    }
}
