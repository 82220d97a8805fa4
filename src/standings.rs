use crate::config::LeagueConfig;
use crate::error::{Result, SimulationError};
use crate::game::{Game, Winner};
use crate::seeding::seed_teams;
use crate::team::{index_by_id, SeasonRecord, Team, TeamId};

/// Rebuild every team's record from scratch over `games`.
///
/// Records start at zero on every call; teams that appear in no game keep an
/// empty record. Team ids must be unique, and each game must reference known
/// teams and carry finite totals with the winner they imply.
pub fn resolve_records<'a, I>(games: I, teams: &[Team]) -> Result<Vec<Team>>
where
    I: IntoIterator<Item = &'a Game>,
{
    let mut resolved: Vec<Team> = teams
        .iter()
        .map(|t| {
            let mut team = t.clone();
            team.record = SeasonRecord::default();
            team.playoff_seed = None;
            team
        })
        .collect();
    let index = index_by_id(&resolved)?;

    for game in games {
        let position = |team_id: TeamId| {
            index
                .get(&team_id)
                .copied()
                .ok_or(SimulationError::UnknownTeamReference { team_id, game_id: game.id })
        };
        let away_idx = position(game.away.team_id)?;
        let home_idx = position(game.home.team_id)?;

        let (away_points, home_points, winner) = game.final_result()?;

        apply_result(&mut resolved[away_idx].record, away_points, home_points, winner == Winner::Away);
        apply_result(&mut resolved[home_idx].record, home_points, away_points, winner == Winner::Home);
    }

    Ok(resolved)
}

/// Records plus playoff seeds for a set of resolved games.
///
/// Returns the teams sorted by seed.
pub fn resolve_standings(games: &[Game], teams: &[Team], league: &LeagueConfig) -> Result<Vec<Team>> {
    let with_records = resolve_records(games, teams)?;
    seed_teams(&with_records, league)
}

fn apply_result(record: &mut SeasonRecord, own: f64, opponent: f64, won: bool) {
    if won {
        record.wins += 1;
    } else {
        record.losses += 1;
    }
    record.points_for += own;
    record.points_against += opponent;
}
