//! Per-tile accumulator of linear-light samples.
//!
//! Each target pixel keeps a sample count and a sum of squared source
//! intensities (gamma 2.0). The accumulator lives for a single
//! `prepare_tile` call and is never shared between tiles.

/// Squared full-scale intensity (`255²`).
pub const FULL_SCALE: u32 = 255 * 255;

/// Struct-of-arrays accumulator sized to one output tile.
#[derive(Clone, Debug)]
pub struct Accumulator {
    width: usize,
    height: usize,
    counts: Vec<u32>,
    sums: Vec<u32>,
}

impl Accumulator {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            counts: vec![0; width * height],
            sums: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Add one source sample. Samples outside the tile are dropped.
    pub fn add(&mut self, x: i32, y: i32, value: u8) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let i = y as usize * self.width + x as usize;
        let v = value as u32;
        self.counts[i] += 1;
        self.sums[i] += v * v;
    }

    /// Overwrite a pixel with a synthesized sample.
    pub fn set(&mut self, x: usize, y: usize, count: u32, sum: u32) {
        let i = y * self.width + x;
        self.counts[i] = count;
        self.sums[i] = sum;
    }

    /// Raw sum of squares at a pixel.
    pub fn sum(&self, x: usize, y: usize) -> u32 {
        self.sums[y * self.width + x]
    }

    /// Raw sample count at a pixel.
    pub fn count(&self, x: usize, y: usize) -> u32 {
        self.counts[y * self.width + x]
    }

    /// Any sample (real or synthesized) has touched this pixel.
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        let i = y * self.width + x;
        self.counts[i] != 0 || self.sums[i] != 0
    }

    /// Mean linear intensity (0..=`FULL_SCALE`), 0 when nothing landed here.
    pub fn average(&self, x: usize, y: usize) -> u32 {
        let i = y * self.width + x;
        match self.counts[i] {
            0 => 0,
            n => self.sums[i] / n,
        }
    }

    fn row_is_empty(&self, y: usize) -> bool {
        self.counts[y * self.width..(y + 1) * self.width]
            .iter()
            .all(|&c| c == 0)
    }

    /// Fill target rows that no source row landed on.
    ///
    /// When two consecutive source rows map to `t0` and `t1 > t0 + 1`, the
    /// rows in between are linearly interpolated from the averages of `t0`
    /// and `t1`, so upscaled segments do not show empty bands.
    pub fn fill_skipped_rows(&mut self, scaled_y: &[Option<i32>]) {
        let height = self.height;
        let in_tile = |t: i32| t >= 0 && (t as usize) < height;
        for pair in scaled_y.windows(2) {
            let (Some(t0), Some(t1)) = (pair[0], pair[1]) else {
                continue;
            };
            if t1 <= t0 + 1 || !in_tile(t0) || !in_tile(t1) {
                continue;
            }
            let (t0, t1) = (t0 as usize, t1 as usize);
            for t in t0 + 1..t1 {
                if !self.row_is_empty(t) {
                    continue;
                }
                let frac = (t - t0) as f64 / (t1 - t0) as f64;
                for x in 0..self.width {
                    let above = self.average(x, t0) as f64;
                    let below = self.average(x, t1) as f64;
                    let value = (above + (below - above) * frac).round() as u32;
                    self.set(x, t, 1, value);
                }
            }
        }
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_squares() {
        let mut acc = Accumulator::new(2, 2);
        acc.add(0, 0, 255);
        acc.add(0, 0, 0);
        assert_eq!(acc.count(0, 0), 2);
        assert_eq!(acc.sum(0, 0), FULL_SCALE);
        assert_eq!(acc.average(0, 0), FULL_SCALE / 2);
        assert_eq!(acc.average(1, 1), 0);
    }

    #[test]
    fn test_out_of_range_samples_dropped() {
        let mut acc = Accumulator::new(3, 3);
        acc.add(-1, 0, 255);
        acc.add(0, 3, 255);
        acc.add(3, 0, 255);
        for y in 0..3 {
            for x in 0..3 {
                assert!(!acc.is_occupied(x, y));
            }
        }
    }

    #[test]
    fn test_zero_sample_still_occupies() {
        let mut acc = Accumulator::new(1, 1);
        acc.add(0, 0, 0);
        assert!(acc.is_occupied(0, 0));
        assert_eq!(acc.average(0, 0), 0);
    }

    #[test]
    fn test_skipped_rows_interpolated() {
        let mut acc = Accumulator::new(1, 5);
        acc.add(0, 0, 255);
        acc.add(0, 4, 0);
        acc.fill_skipped_rows(&[Some(0), Some(4)]);
        assert_eq!(acc.average(0, 0), FULL_SCALE);
        assert_eq!(acc.average(0, 2), (FULL_SCALE as f64 / 2.0).round() as u32);
        assert!(acc.average(0, 1) > acc.average(0, 2));
        assert!(acc.average(0, 3) < acc.average(0, 2));
        assert_eq!(acc.average(0, 4), 0);
    }

    #[test]
    fn test_unmapped_rows_not_interpolated() {
        let mut acc = Accumulator::new(1, 5);
        acc.add(0, 0, 255);
        acc.add(0, 4, 255);
        acc.fill_skipped_rows(&[Some(0), None, Some(4)]);
        assert!(!acc.is_occupied(0, 2));
    }

    #[test]
    fn test_skipped_rows_past_tile_ignored() {
        let mut acc = Accumulator::new(1, 5);
        acc.add(0, 0, 255);
        acc.fill_skipped_rows(&[Some(0), Some(9), Some(-3)]);
        for y in 1..5 {
            assert!(!acc.is_occupied(0, y));
        }
    }
}
