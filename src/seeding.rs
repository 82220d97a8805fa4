use std::cmp::Ordering;

use crate::config::LeagueConfig;
use crate::error::{Result, SimulationError};
use crate::team::{SeasonRecord, Team};

/// Standings order: more wins first, then more points scored.
pub fn compare_records(a: &SeasonRecord, b: &SeasonRecord) -> Ordering {
    b.wins
        .cmp(&a.wins)
        .then_with(|| b.points_for.total_cmp(&a.points_for))
}

fn rank(teams: &mut [Team]) {
    // Stable, so fully tied teams keep their input order
    teams.sort_by(|a, b| compare_records(&a.record, &b.record));
}

/// Assign playoff seeds.
///
/// Each configured division's best team is a division winner; winners take
/// seeds `1..=D` ranked against each other, every other team follows ranked
/// as one wild-card pool. Returns the teams sorted by seed.
pub fn seed_teams(teams: &[Team], league: &LeagueConfig) -> Result<Vec<Team>> {
    let mut divisions: Vec<Vec<Team>> = vec![Vec::new(); league.divisions.len()];

    for team in teams {
        let slot = league
            .divisions
            .iter()
            .position(|&d| d == team.division_id)
            .ok_or(SimulationError::UnknownDivision {
                team_id: team.id,
                division_id: team.division_id,
            })?;
        divisions[slot].push(team.clone());
    }

    let mut winners = Vec::with_capacity(divisions.len());
    let mut wild_cards = Vec::with_capacity(teams.len());
    for mut division in divisions {
        if division.is_empty() {
            continue;
        }
        rank(&mut division);
        let mut members = division.into_iter();
        winners.extend(members.next());
        wild_cards.extend(members);
    }

    rank(&mut winners);
    rank(&mut wild_cards);

    let mut seeded = winners;
    seeded.append(&mut wild_cards);
    for (i, team) in seeded.iter_mut().enumerate() {
        team.playoff_seed = Some(i + 1);
    }

    Ok(seeded)
}
