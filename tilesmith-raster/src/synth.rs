//! Procedural Synthesizer: floor dust and wall-top waves.
//!
//! Both patterns are written straight into the accumulator as if they had
//! been sampled from the source atlas, so they go through the same gamma
//! conversion as real glyphs. The generator is seeded with a constant:
//! every run produces the same tiles.

use std::f64::consts::PI;

use crate::accumulator::{Accumulator, FULL_SCALE};
use crate::mapper::TileSize;

/// Fixed seed for the floor-dust generator.
pub const NOISE_SEED: u64 = 1_234_567;

/// Bias added to every noise sample (keeps dust dimly visible).
const NOISE_BIAS: u32 = 0x280;

/// 64-bit xorshift* generator.
#[derive(Clone, Debug)]
pub struct Xorshift64Star {
    state: u64,
}

impl Xorshift64Star {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// One synthesized sample: `(count, sum_of_squares)`.
    fn noise(&mut self) -> (u32, u32) {
        (1, NOISE_BIAS + (self.next_u64() >> 54) as u32)
    }
}

/// Sprinkle isolated dots over a blank floor tile.
///
/// Border pixels are seeded at fixed strides (offset by 2 on the bottom and
/// right edges) so neighbouring floor tiles stitch together; the interior
/// receives dots in shuffled order, skipping any position that touches an
/// existing dot (8-connected).
pub fn add_floor_dust(acc: &mut Accumulator) {
    if acc.width() <= 2 || acc.height() <= 2 {
        return;
    }
    let w = acc.width() - 2;
    let h = acc.height() - 2;
    let mut rng = Xorshift64Star::new(NOISE_SEED);

    // stitch edges
    for x in (0..w).step_by(4) {
        let (c, s) = rng.noise();
        acc.set(x, 0, c, s);
    }
    for y in (0..h).step_by(4) {
        let (c, s) = rng.noise();
        acc.set(0, y, c, s);
    }
    for x in (2..w).step_by(4) {
        let (c, s) = rng.noise();
        acc.set(x, h + 1, c, s);
    }
    for y in (2..h).step_by(4) {
        let (c, s) = rng.noise();
        acc.set(w + 1, y, c, s);
    }

    // Fisher–Yates over interior positions
    let n = w * h;
    let mut order: Vec<usize> = (0..n).collect();
    for i in 0..n.saturating_sub(1) {
        let j = (rng.next_u64() % (n - i) as u64) as usize + i;
        order.swap(i, j);
    }

    for &i in &order {
        let x = 1 + i % w;
        let y = 1 + i / w;
        let crowded = (y - 1..=y + 1)
            .flat_map(|ny| (x - 1..=x + 1).map(move |nx| (nx, ny)))
            .any(|(nx, ny)| (nx, ny) != (x, y) && acc.is_occupied(nx, ny));
        if !crowded {
            let (c, s) = rng.noise();
            acc.set(x, y, c, s);
        }
    }
}

/// Number of wave periods across and down a wall-top tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveCounts {
    pub horizontal: u32,
    pub vertical: u32,
}

impl WaveCounts {
    /// Roughly one period per four pixels of the fit box, within limits.
    pub fn for_fit(fit: TileSize) -> Self {
        let periods = |len: usize, max: u32| ((len as f64 * 0.25).round() as u32).clamp(2, max);
        Self {
            horizontal: periods(fit.width, 6),
            vertical: periods(fit.height, 11),
        }
    }
}

/// Diagonal `sin²` interference pattern for wall tops.
///
/// Rows are painted from the top until the middle of the tile, or until a
/// row whose first pixel already carries ink. `full_height` paints every
/// row unconditionally.
pub fn add_wall_tops(acc: &mut Accumulator, waves: WaveCounts, full_height: bool) {
    let (w, h) = (acc.width(), acc.height());
    for y in 0..h {
        if !full_height && (y > h / 2 || acc.sum(0, y) != 0) {
            break;
        }
        for x in 0..w {
            let phase = x as f64 / w as f64 * waves.horizontal as f64
                + y as f64 / h as f64 * waves.vertical as f64;
            let value = (2.0 * PI * phase).sin() / 2.0 + 0.5;
            acc.set(x, y, 1, (FULL_SCALE as f64 * value * value) as u32);
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
