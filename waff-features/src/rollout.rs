//! Percentage draws.

use rand::Rng;

/// Draw uniformly from `[0, 100]` and compare against `percent`.
pub fn draw(percent: f64) -> bool {
    let roll: f64 = rand::rng().random_range(0.0..=100.0);
    roll <= percent
}
