//! Synthetic histogram generation.
//!
//! Produces binned data from a known parameter point so the shape and the fit
//! objective can be exercised without any external data:
//!
//! - the expected count in each bin is the shape evaluated at the bin center
//! - with `fluctuate`, each count is drawn from a Poisson distribution around
//!   that expectation using a seeded RNG, so a given seed always yields the
//!   same histogram

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Poisson;
use tracing::debug;

use crate::domain::{Histogram, PARAM_COUNT, bin_centers};
use crate::error::{ErrorKind, ShapeError};
use crate::fit::evaluate_many;

/// Binning and noise settings for [`generate_histogram`].
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub bins: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub seed: u64,
    /// Draw Poisson counts instead of using the exact expectation.
    pub fluctuate: bool,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            bins: 80,
            x_min: -2.0,
            x_max: 2.0,
            seed: 42,
            fluctuate: true,
        }
    }
}

/// Generate a histogram whose expected contents follow the shape at `p`.
pub fn generate_histogram(
    p: &[f64; PARAM_COUNT],
    config: &SampleConfig,
) -> Result<Histogram, ShapeError> {
    let centers = bin_centers(config.x_min, config.x_max, config.bins)
        .map_err(|e| ShapeError::new(ErrorKind::InvalidSample, e.to_string()))?;
    let expected = evaluate_many(&centers, p);

    if let Some(i) = expected.iter().position(|v| !(v.is_finite() && *v >= 0.0)) {
        return Err(ShapeError::new(
            ErrorKind::InvalidSample,
            format!(
                "Expected count {} in bin {i} is not a valid Poisson mean; check the parameters.",
                expected[i]
            ),
        ));
    }

    let contents = if config.fluctuate {
        let mut rng = StdRng::seed_from_u64(config.seed);
        expected
            .iter()
            .map(|&mean| draw_count(&mut rng, mean))
            .collect::<Result<Vec<f64>, ShapeError>>()?
    } else {
        expected
    };

    debug!(
        bins = config.bins,
        seed = config.seed,
        fluctuate = config.fluctuate,
        total = contents.iter().sum::<f64>(),
        "generated synthetic histogram"
    );
    Histogram::new(centers, contents)
}

fn draw_count(rng: &mut StdRng, mean: f64) -> Result<f64, ShapeError> {
    // Poisson requires a strictly positive mean; an empty expectation stays empty.
    if mean <= 0.0 {
        return Ok(0.0);
    }
    let poisson = Poisson::new(mean)
        .map_err(|e| ShapeError::new(ErrorKind::InvalidSample, format!("Poisson error: {e}")))?;
    Ok(poisson.sample(rng))
}
