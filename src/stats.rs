use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::game::{score_history, Game};
use crate::team::{Team, TeamId};

/// Mean and population variance of a score sequence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub average: f64,
    pub variance: f64,
}

impl TeamStats {
    /// False for an empty history, whose average is NaN.
    pub fn is_defined(&self) -> bool {
        !self.average.is_nan()
    }
}

/// Trailing window of `scores`. A window of zero or one that covers the whole
/// sequence leaves it untouched.
pub fn trailing_window(scores: &[f64], limit: Option<usize>) -> &[f64] {
    match limit {
        Some(n) if n > 0 && n < scores.len() => &scores[scores.len() - n..],
        _ => scores,
    }
}

fn average(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Fit mean and population variance over the last `limit` scores.
///
/// An empty sequence yields a NaN average; check [`TeamStats::is_defined`].
pub fn fit_stats(scores: &[f64], limit: Option<usize>) -> TeamStats {
    let window = trailing_window(scores, limit);
    let avg = average(window);
    let square_diffs: Vec<f64> = window.iter().map(|v| (v - avg).powi(2)).collect();

    TeamStats {
        average: avg,
        variance: average(&square_diffs),
    }
}

/// Fit every team's distribution from its past scores.
///
/// Teams without history come back with `mean`/`variance` unset rather than
/// NaN. Past games naming a team outside `teams` are rejected.
pub fn fit_team_stats(past_games: &[Game], teams: &[Team], window: Option<usize>) -> Result<Vec<Team>> {
    let known: HashSet<TeamId> = teams.iter().map(|t| t.id).collect();
    for game in past_games {
        game.validate()?;
        for side in [&game.away, &game.home] {
            if !known.contains(&side.team_id) {
                return Err(SimulationError::UnknownTeamReference {
                    team_id: side.team_id,
                    game_id: game.id,
                });
            }
        }
    }

    let fitted = teams
        .iter()
        .map(|team| {
            let history = score_history(past_games, team.id);
            let stats = fit_stats(&history, window);
            let mut fitted = team.clone();
            if stats.is_defined() {
                fitted.mean = Some(stats.average);
                fitted.variance = Some(stats.variance);
            } else {
                debug!("team {} has no scored games, leaving distribution unset", team.id);
                fitted.mean = None;
                fitted.variance = None;
            }
            fitted
        })
        .collect();

    Ok(fitted)
}
