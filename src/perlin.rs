// Seeded 2D Perlin noise over a shuffled permutation table.

use noise::NoiseFn;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const TABLE_SIZE: usize = 256;

/// Gradient noise field built from a single seed.
///
/// The permutation table is `0..256` shuffled with Fisher-Yates and stored
/// twice back to back, so `perm[i] == perm[i + 256]` and corner hashing never
/// has to wrap. A field never changes after construction; producing a new
/// layout means building a new field.
#[derive(Clone)]
pub struct NoiseField {
    seed: u64,
    perm: [u8; TABLE_SIZE * 2],
}

impl NoiseField {
    pub fn new(seed: u64) -> Self {
        let mut permutation = [0u8; TABLE_SIZE];
        for (i, slot) in permutation.iter_mut().enumerate() {
            *slot = i as u8;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for i in (1..TABLE_SIZE).rev() {
            let j = rng.gen_range(0..=i);
            permutation.swap(i, j);
        }

        let mut perm = [0u8; TABLE_SIZE * 2];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = permutation[i % TABLE_SIZE];
        }

        Self { seed, perm }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn permutation(&self) -> &[u8; TABLE_SIZE * 2] {
        &self.perm
    }

    /// Noise remapped to `[0, 1]`.
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        (self.raw(x, y) + 1.0) / 2.0
    }

    /// Signed noise in `[-1, 1]`, before the `[0, 1]` remap.
    pub fn raw(&self, x: f64, y: f64) -> f64 {
        let x_floor = x.floor();
        let y_floor = y.floor();

        let x_int = (x_floor as i32 & 255) as usize;
        let y_int = (y_floor as i32 & 255) as usize;

        let x_frac = x - x_floor;
        let y_frac = y - y_floor;

        let u = fade(x_frac);
        let v = fade(y_frac);

        // Hash the 4 cell corners
        let a = self.perm[x_int] as usize + y_int;
        let b = self.perm[x_int + 1] as usize + y_int;

        lerp(v,
            lerp(u, grad(self.perm[a], x_frac, y_frac),
                    grad(self.perm[b], x_frac - 1.0, y_frac)),
            lerp(u, grad(self.perm[a + 1], x_frac, y_frac - 1.0),
                    grad(self.perm[b + 1], x_frac - 1.0, y_frac - 1.0)))
    }
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish_non_exhaustive()
    }
}

impl NoiseFn<f64, 2> for NoiseField {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.noise(point[0], point[1])
    }
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (6.0 * t - 15.0) + 10.0)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

// Only the low 3 bits select a gradient, giving the 4 diagonals twice over.
fn grad(hash: u8, x: f64, y: f64) -> f64 {
    let h = hash & 7;
    let (u, v) = if h < 4 { (x, y) } else { (y, x) };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points(seed: u64, count: usize) -> Vec<(f64, f64)> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..count)
            .map(|_| (rng.gen_range(-600.0..600.0), rng.gen_range(-600.0..600.0)))
            .collect()
    }

    #[test]
    fn test_table_is_doubled_permutation() {
        let field = NoiseField::new(114514);
        let perm = field.permutation();
        for i in 0..TABLE_SIZE {
            assert_eq!(perm[i], perm[i + TABLE_SIZE]);
        }
        let mut seen = [false; TABLE_SIZE];
        for &value in &perm[..TABLE_SIZE] {
            assert!(!seen[value as usize], "value {} repeated", value);
            seen[value as usize] = true;
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let a = NoiseField::new(7);
        let b = NoiseField::new(7);
        assert_eq!(a.permutation(), b.permutation());
        for (x, y) in sample_points(1, 500) {
            assert_eq!(a.noise(x, y), b.noise(x, y));
        }
    }

    #[test]
    fn test_different_seeds_shuffle_differently() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(2);
        assert_ne!(a.permutation(), b.permutation());
    }

    #[test]
    fn test_noise_stays_in_unit_range() {
        for seed in [0, 42, 114514, u64::MAX] {
            let field = NoiseField::new(seed);
            for (x, y) in sample_points(seed, 2000) {
                let n = field.noise(x, y);
                assert!((0.0..=1.0).contains(&n), "noise({x}, {y}) = {n}");
                let r = field.raw(x, y);
                assert!((-1.0..=1.0).contains(&r), "raw({x}, {y}) = {r}");
            }
        }
    }

    #[test]
    fn test_lattice_points_sit_at_midpoint() {
        // Every corner gradient is dotted with a zero offset on the lattice.
        let field = NoiseField::new(3);
        for x in -5..5 {
            for y in -5..5 {
                assert_eq!(field.noise(x as f64, y as f64), 0.5);
            }
        }
    }

    #[test]
    fn test_noise_is_continuous_across_cell_edges() {
        let field = NoiseField::new(99);
        let eps = 1e-6;
        let edges = [0.0, 1.0, 17.0, 255.0, 256.0, -1.0, -256.0];
        for &edge in &edges {
            for &y in &[0.25, 3.7, -12.4] {
                let left = field.noise(edge - eps, y);
                let right = field.noise(edge + eps, y);
                assert!((left - right).abs() < 1e-4, "jump at x = {edge}");
                let below = field.noise(y, edge - eps);
                let above = field.noise(y, edge + eps);
                assert!((below - above).abs() < 1e-4, "jump at y = {edge}");
            }
        }
    }

    #[test]
    fn test_lattice_wraps_every_256_cells() {
        let field = NoiseField::new(5);
        for (x, y) in sample_points(5, 100) {
            let a = field.noise(x, y);
            let b = field.noise(x + 256.0, y - 512.0);
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_grad_selects_diagonals() {
        assert_eq!(grad(0, 0.25, 0.5), 0.75);
        assert_eq!(grad(1, 0.25, 0.5), 0.25);
        assert_eq!(grad(2, 0.25, 0.5), -0.25);
        assert_eq!(grad(3, 0.25, 0.5), -0.75);
        assert_eq!(grad(4, 0.25, 0.5), 0.75);
        assert_eq!(grad(5, 0.25, 0.5), -0.25);
        assert_eq!(grad(6, 0.25, 0.5), 0.25);
        assert_eq!(grad(7, 0.25, 0.5), -0.75);
        // Upper bits are ignored.
        assert_eq!(grad(8 | 5, 0.25, 0.5), grad(5, 0.25, 0.5));
    }

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert_eq!(fade(0.5), 0.5);
    }

    #[test]
    fn test_noise_fn_matches_noise() {
        let field = NoiseField::new(11);
        for (x, y) in sample_points(11, 50) {
            assert_eq!(NoiseFn::get(&field, [x, y]), field.noise(x, y));
        }
    }
}
