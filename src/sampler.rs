//! # Weight Sampler
//!
//! $$
//! w_i \sim \mathcal{U}[0.1,\ 0.2 + 1/N), \qquad w \mapsto w / \textstyle\sum_i w_i
//! $$
//!
//! Random long-only weight vectors normalized to sum to one. The sampling
//! band keeps weights away from zero and from degenerate single-asset
//! concentration; the bound is the reference empirical constant and any
//! change to it is a behavioral deviation.

use impl_new_derive::ImplNew;
use ndarray::Array1;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

const LOW: f64 = 0.1;

/// Generates a finite sequence of `num_portfolios` random weight vectors
/// over `size` assets. Unseeded sampling draws fresh entropy per trial;
/// seeded sampling derives an independent stream per trial index, so a
/// given trial produces the same vector regardless of how trials are
/// partitioned across workers.
#[derive(ImplNew, Clone, Debug)]
pub struct WeightSampler {
  pub size: usize,
  pub num_portfolios: usize,
  pub seed: Option<u64>,
}

impl WeightSampler {
  fn high(&self) -> f64 {
    LOW + LOW + 1.0 / self.size as f64
  }

  /// RNG stream for one trial index.
  pub fn trial_rng(&self, trial: usize) -> StdRng {
    match self.seed {
      Some(seed) => {
        let stream = (trial as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        StdRng::seed_from_u64(seed ^ stream)
      }
      None => StdRng::from_entropy(),
    }
  }

  /// Draw one normalized weight vector.
  pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Array1<f64> {
    assert!(self.size >= 1, "weight sampler requires at least one asset");
    let raw = Array1::random_using(self.size, Uniform::new(LOW, self.high()), rng);
    let total = raw.sum();
    raw / total
  }

  /// Lazy sequence of `(weights, trial index)` pairs, not restartable.
  pub fn iter(&self) -> impl Iterator<Item = (Array1<f64>, usize)> + '_ {
    (0..self.num_portfolios).map(move |trial| {
      let mut rng = self.trial_rng(trial);
      (self.draw(&mut rng), trial)
    })
  }
}
