use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{Result, SimulationError};
use crate::sampler::ScoreSampler;
use crate::team::Team;

/// Calculate the probability of the away team outscoring the home team.
///
/// The home-minus-away margin of two independent Gaussians is itself Gaussian
/// with mean `home - away` and variance `var_home + var_away`; the away side
/// wins when that margin falls below zero.
///
/// # Arguments
/// * `away` - Away team with a fitted distribution
/// * `home` - Home team with a fitted distribution
///
/// # Returns
/// Probability of the away team winning (0.0-1.0)
pub fn matchup_win_prob(away: &Team, home: &Team) -> Result<f64> {
    let away = away.sampler()?;
    let home = home.sampler()?;
    win_prob_from_samplers(&away, &home)
}

/// Away win probability from two already-built samplers.
pub fn win_prob_from_samplers(away: &ScoreSampler, home: &ScoreSampler) -> Result<f64> {
    let margin_mean = home.mean() - away.mean();
    let margin_variance = home.variance() + away.variance();
    let margin = Normal::new(margin_mean, margin_variance.sqrt()).map_err(|_| {
        SimulationError::InvalidDistributionParameters {
            mean: margin_mean,
            variance: margin_variance,
        }
    })?;
    Ok(margin.cdf(0.0))
}

/// Calculate expected scores for a matchup.
///
/// Returns (away_expected_score, home_expected_score)
pub fn calculate_expected_scores(away: &Team, home: &Team) -> Result<(f64, f64)> {
    Ok((away.sampler()?.mean(), home.sampler()?.mean()))
}
