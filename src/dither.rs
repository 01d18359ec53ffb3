use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::content::Pos;

const BAYER_2X2: [[u8; 2]; 2] = [[0, 2], [3, 1]];

const BAYER_4X4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

/// Strategy that perturbs the cutoff between two neighbouring stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dither {
    /// Ordered dithering with the 2x2 Bayer matrix.
    Bayer2x2,
    /// Ordered dithering with the 4x4 Bayer matrix.
    Bayer4x4,
    /// Seeded per-cell noise.
    Noise { seed: u64 },
}

impl Dither {
    /// Undamped threshold of the cell, in `(0, 1)`.
    pub fn raw(&self, pos: Pos) -> f64 {
        match self {
            Dither::Bayer2x2 => {
                let m = BAYER_2X2[pos.y.rem_euclid(2) as usize][pos.x.rem_euclid(2) as usize];
                (m as f64 + 0.5) / 4.0
            }
            Dither::Bayer4x4 => {
                let m = BAYER_4X4[pos.y.rem_euclid(4) as usize][pos.x.rem_euclid(4) as usize];
                (m as f64 + 0.5) / 16.0
            }
            Dither::Noise { seed } => {
                let mut rng = StdRng::seed_from_u64(seed ^ cell_key(pos));
                rng.random::<f64>()
            }
        }
    }

    /// Cutoff for picking the right hand stop: `0.5` pulled toward the raw
    /// threshold by `strength`.
    pub fn threshold(&self, pos: Pos, strength: f64) -> f64 {
        let strength = strength.clamp(0.0, 1.0);
        0.5 + (self.raw(pos) - 0.5) * strength
    }
}

fn cell_key(pos: Pos) -> u64 {
    let packed = ((pos.x as u32 as u64) << 32) | pos.y as u32 as u64;
    packed.wrapping_mul(0x9E37_79B9_7F4A_7C15).rotate_left(29)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bayer_tables_are_fixed() {
        let row: Vec<f64> = (0..4).map(|x| Dither::Bayer4x4.raw(Pos::new(x, 1))).collect();
        assert_eq!(row, vec![12.5 / 16.0, 4.5 / 16.0, 14.5 / 16.0, 6.5 / 16.0]);
        assert_eq!(Dither::Bayer2x2.raw(Pos::new(0, 0)), 0.125);
        assert_eq!(Dither::Bayer2x2.raw(Pos::new(1, 0)), 0.625);
        assert_eq!(Dither::Bayer2x2.raw(Pos::new(0, 1)), 0.875);
        assert_eq!(Dither::Bayer2x2.raw(Pos::new(1, 1)), 0.375);
    }

    #[test]
    fn matrix_tiles_over_negative_positions() {
        assert_eq!(
            Dither::Bayer4x4.raw(Pos::new(-1, -3)),
            Dither::Bayer4x4.raw(Pos::new(3, 1))
        );
    }

    #[test]
    fn zero_strength_is_plain_midpoint() {
        for dither in [Dither::Bayer2x2, Dither::Bayer4x4, Dither::Noise { seed: 9 }] {
            assert_eq!(dither.threshold(Pos::new(3, 7), 0.0), 0.5);
        }
        assert_eq!(Dither::Bayer2x2.threshold(Pos::new(0, 0), 1.0), 0.125);
    }

    #[test]
    fn noise_is_reproducible_per_seed() {
        let a = Dither::Noise { seed: 42 };
        let b = Dither::Noise { seed: 43 };
        let first: Vec<f64> = (0..16).map(|x| a.raw(Pos::new(x, 2))).collect();
        let again: Vec<f64> = (0..16).map(|x| a.raw(Pos::new(x, 2))).collect();
        let other: Vec<f64> = (0..16).map(|x| b.raw(Pos::new(x, 2))).collect();
        assert_eq!(first, again);
        assert_ne!(first, other);
        assert!(first.iter().all(|v| (0.0..1.0).contains(v)));
    }
}
