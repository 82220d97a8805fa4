use thiserror::Error;

use crate::game::Winner;
use crate::team::{DivisionId, TeamId};

pub type Result<T> = std::result::Result<T, SimulationError>;

/// Everything that can go wrong while fitting, resolving or simulating a season.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("team {team_id} has no usable score history")]
    InsufficientHistory { team_id: TeamId },
    #[error("invalid gaussian parameters: mean {mean}, variance {variance} (variance must be > 0)")]
    InvalidDistributionParameters { mean: f64, variance: f64 },
    #[error("uniform draw {value} is outside the open interval (0, 1)")]
    InvalidUniformDraw { value: f64 },
    #[error("game {game_id} references unknown team {team_id}")]
    UnknownTeamReference { team_id: TeamId, game_id: u64 },
    #[error("team {team_id} belongs to unconfigured division {division_id}")]
    UnknownDivision { team_id: TeamId, division_id: DivisionId },
    #[error("cannot simulate: teams {team_ids:?} lack a fitted distribution")]
    IncompleteTeamData { team_ids: Vec<TeamId> },
    #[error("game {game_id} has no final score")]
    UnresolvedGame { game_id: u64 },
    #[error("game {game_id} pairs a team with itself")]
    SelfMatchup { game_id: u64 },
    #[error("team {team_id} appears more than once")]
    DuplicateTeam { team_id: TeamId },
    #[error("game {game_id} has a non-finite total")]
    NonFiniteScore { game_id: u64 },
    #[error("game {game_id} is tagged {winner:?} but its totals say otherwise")]
    InconsistentResult { game_id: u64, winner: Winner },
}
