use std::collections::HashMap;

use crate::error::{Result, SimulationError};
use crate::game::Game;
use crate::random::UniformSource;
use crate::sampler::ScoreSampler;
use crate::team::TeamId;

/// Monte Carlo game simulation.
///
/// Draws one uniform for the away side, then one for the home side, turns
/// each into a score through that side's distribution, and returns a resolved
/// copy of `game`. Equal scores go to the home team.
///
/// # Arguments
/// * `game` - Scheduled matchup (left untouched)
/// * `away` - Away team's fitted distribution
/// * `home` - Home team's fitted distribution
/// * `source` - Uniform draws; exactly two are consumed
///
/// # Returns
/// The matchup with both totals and the winner filled in
pub fn simulate_matchup<U: UniformSource + ?Sized>(
    game: &Game,
    away: &ScoreSampler,
    home: &ScoreSampler,
    source: &mut U,
) -> Result<Game> {
    let away_draw = source.next_uniform();
    let home_draw = source.next_uniform();

    let away_points = away.sample(away_draw)?;
    let home_points = home.sample(home_draw)?;

    let mut result = game.clone();
    result.record_result(away_points, home_points);
    Ok(result)
}

/// Simulate a scheduled game looking both sides up in `samplers`.
pub fn simulate_scheduled<U: UniformSource + ?Sized>(
    game: &Game,
    samplers: &HashMap<TeamId, ScoreSampler>,
    source: &mut U,
) -> Result<Game> {
    let lookup = |team_id: TeamId| {
        samplers
            .get(&team_id)
            .ok_or(SimulationError::UnknownTeamReference { team_id, game_id: game.id })
    };
    let away = lookup(game.away.team_id)?;
    let home = lookup(game.home.team_id)?;
    simulate_matchup(game, away, home, source)
}
