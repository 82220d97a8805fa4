use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::team::TeamId;

/// Which side of a matchup won.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    Away,
    Home,
}

impl Winner {
    /// Winner of a finished game. Equal totals go to the home side.
    pub fn from_totals(away: f64, home: f64) -> Self {
        if away > home {
            Winner::Away
        } else {
            Winner::Home
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSide {
    pub team_id: TeamId,
    pub total_points: Option<f64>,
}

impl GameSide {
    pub fn new(team_id: TeamId, total_points: Option<f64>) -> Self {
        GameSide { team_id, total_points }
    }
}

/// One head-to-head matchup in a given week.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    pub week: u32,
    pub away: GameSide,
    pub home: GameSide,
    pub winner: Option<Winner>,
}

impl Game {
    /// Unplayed matchup.
    pub fn scheduled(id: u64, week: u32, away: TeamId, home: TeamId) -> Self {
        Game {
            id,
            week,
            away: GameSide::new(away, None),
            home: GameSide::new(home, None),
            winner: None,
        }
    }

    /// Finished matchup; the winner is derived from the totals.
    pub fn played(id: u64, week: u32, away: (TeamId, f64), home: (TeamId, f64)) -> Self {
        let mut game = Game::scheduled(id, week, away.0, home.0);
        game.record_result(away.1, home.1);
        game
    }

    /// Set both totals and the matching winner.
    pub fn record_result(&mut self, away_points: f64, home_points: f64) {
        self.away.total_points = Some(away_points);
        self.home.total_points = Some(home_points);
        self.winner = Some(Winner::from_totals(away_points, home_points));
    }

    pub fn has_scores(&self) -> bool {
        self.away.total_points.is_some() && self.home.total_points.is_some()
    }

    pub fn is_resolved(&self) -> bool {
        self.has_scores() && self.winner.is_some()
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.away.team_id == team_id || self.home.team_id == team_id
    }

    pub fn winner_id(&self) -> Option<TeamId> {
        self.winner.map(|w| match w {
            Winner::Away => self.away.team_id,
            Winner::Home => self.home.team_id,
        })
    }

    /// Reject games that pair a team with itself.
    pub fn validate(&self) -> Result<()> {
        if self.away.team_id == self.home.team_id {
            return Err(SimulationError::SelfMatchup { game_id: self.id });
        }
        Ok(())
    }

    /// Final totals and winner of a finished game.
    ///
    /// Both totals must be finite and the winner must be the one
    /// [`Winner::from_totals`] gives for them.
    pub fn final_result(&self) -> Result<(f64, f64, Winner)> {
        let (away, home, winner) = match (self.away.total_points, self.home.total_points, self.winner) {
            (Some(a), Some(h), Some(w)) => (a, h, w),
            _ => return Err(SimulationError::UnresolvedGame { game_id: self.id }),
        };
        if !away.is_finite() || !home.is_finite() {
            return Err(SimulationError::NonFiniteScore { game_id: self.id });
        }
        if winner != Winner::from_totals(away, home) {
            return Err(SimulationError::InconsistentResult { game_id: self.id, winner });
        }
        Ok((away, home, winner))
    }
}

/// Split a league schedule around the current week.
///
/// Past games are those before `current_week` with both totals present; a
/// winner is filled in from the totals if the feed did not carry one. Every
/// game from `current_week` onwards is future, stripped of any partial score.
/// Earlier games with missing totals are dropped. A winner the feed did carry
/// is kept as-is; [`Game::final_result`] rejects it later if it contradicts
/// the totals.
pub fn split_schedule(games: &[Game], current_week: u32) -> (Vec<Game>, Vec<Game>) {
    let mut past = Vec::new();
    let mut future = Vec::new();

    for game in games {
        if game.week < current_week {
            if let (Some(away), Some(home)) = (game.away.total_points, game.home.total_points) {
                let mut resolved = game.clone();
                if resolved.winner.is_none() {
                    resolved.winner = Some(Winner::from_totals(away, home));
                }
                past.push(resolved);
            }
        } else {
            future.push(Game::scheduled(game.id, game.week, game.away.team_id, game.home.team_id));
        }
    }

    past.sort_by_key(|g| g.week);
    future.sort_by_key(|g| g.week);
    (past, future)
}

/// A team's scores in week order, taken from whichever side it played.
pub fn score_history(games: &[Game], team_id: TeamId) -> Vec<f64> {
    let mut scored: Vec<(u32, f64)> = games
        .iter()
        .filter_map(|g| {
            if g.away.team_id == team_id {
                g.away.total_points.map(|p| (g.week, p))
            } else if g.home.team_id == team_id {
                g.home.total_points.map(|p| (g.week, p))
            } else {
                None
            }
        })
        .collect();
    scored.sort_by_key(|&(week, _)| week);
    scored.into_iter().map(|(_, p)| p).collect()
}
