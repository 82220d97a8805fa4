//! Playoff Core - Monte Carlo playoff odds for head-to-head fantasy leagues.
//!
//! Fits each team's weekly scoring as a Gaussian, simulates the remaining
//! schedule many times, seeds every simulated season under a division-winner
//! plus wild-card policy and aggregates the seeds into probabilities.
//! Python bindings are available behind the `python` feature.

pub mod aggregate;
pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod matchup;
pub mod random;
pub mod sampler;
pub mod season;
pub mod seeding;
pub mod standings;
pub mod stats;
pub mod team;
pub mod win_prob;

#[cfg(feature = "python")]
mod python;

pub use aggregate::{ExpectedRecord, SimulationAggregate, SimulationReport};
pub use config::{LeagueConfig, SimulationConfig};
pub use constants::{DEFAULT_PLAYOFF_SPOTS, DEFAULT_RUNS};
pub use error::{Result, SimulationError};
pub use game::{score_history, split_schedule, Game, GameSide, Winner};
pub use matchup::simulate_matchup;
pub use random::{UniformSequence, UniformSource};
pub use sampler::ScoreSampler;
pub use season::{run_simulation, SeasonState};
pub use seeding::{compare_records, seed_teams};
pub use standings::{resolve_records, resolve_standings};
pub use stats::{fit_stats, fit_team_stats, TeamStats};
pub use team::{DivisionId, SeasonRecord, Team, TeamId};
pub use win_prob::{calculate_expected_scores, matchup_win_prob};
