use std::collections::HashMap;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::{LeagueConfig, SimulationConfig};
use crate::constants::{DEFAULT_DIVISIONS, DEFAULT_PLAYOFF_SPOTS, DEFAULT_RUNS};
use crate::error::SimulationError;
use crate::game::Game;
use crate::sampler::ScoreSampler;
use crate::season::SeasonState;
use crate::team::{Team, TeamId};
use crate::win_prob::win_prob_from_samplers;

impl From<SimulationError> for PyErr {
    fn from(err: SimulationError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Schedule row: (game id, week, away team, away points, home team, home points)
type ScheduleRow = (u64, u32, TeamId, Option<f64>, TeamId, Option<f64>);

/// A loaded season ready to simulate.
#[pyclass(name = "Season")]
pub struct PySeason {
    state: SeasonState,
}

#[pymethods]
impl PySeason {
    /// Create a season from `(id, division, name)` teams and a raw schedule.
    #[new]
    #[pyo3(signature = (teams, schedule, current_week, divisions = None, window = None))]
    fn new(
        teams: Vec<(TeamId, u32, String)>,
        schedule: Vec<ScheduleRow>,
        current_week: u32,
        divisions: Option<Vec<u32>>,
        window: Option<usize>,
    ) -> PyResult<Self> {
        let teams: Vec<Team> = teams
            .into_iter()
            .map(|(id, division, name)| Team::new(id, division, name))
            .collect();
        let games: Vec<Game> = schedule
            .into_iter()
            .map(|(id, week, away, away_points, home, home_points)| {
                let mut game = Game::scheduled(id, week, away, home);
                game.away.total_points = away_points;
                game.home.total_points = home_points;
                game
            })
            .collect();
        let league = LeagueConfig::new(
            divisions.unwrap_or_else(|| DEFAULT_DIVISIONS.to_vec()),
            DEFAULT_PLAYOFF_SPOTS,
        );

        let state = SeasonState::from_schedule(&teams, &games, current_week, league, window)?;
        Ok(PySeason { state })
    }

    /// Map of team id to (mean, variance).
    fn fitted_stats(&self) -> HashMap<TeamId, (Option<f64>, Option<f64>)> {
        self.state
            .teams()
            .iter()
            .map(|t| (t.id, (t.mean, t.variance)))
            .collect()
    }

    /// Current standings as (team id, seed, wins, losses, points for, points against).
    fn standings(&self) -> PyResult<Vec<(TeamId, usize, u32, u32, f64, f64)>> {
        let standings = self.state.current_standings()?;
        Ok(standings
            .iter()
            .map(|t| {
                (
                    t.id,
                    t.playoff_seed.unwrap_or_default(),
                    t.record.wins,
                    t.record.losses,
                    t.record.points_for,
                    t.record.points_against,
                )
            })
            .collect())
    }

    /// Run the Monte Carlo batch.
    ///
    /// Returns a map of team id to (playoff probability, average seed, seed histogram).
    #[pyo3(signature = (runs = DEFAULT_RUNS, seed = None, playoff_spots = DEFAULT_PLAYOFF_SPOTS))]
    fn simulate(
        &self,
        py: Python<'_>,
        runs: usize,
        seed: Option<u64>,
        playoff_spots: usize,
    ) -> PyResult<HashMap<TeamId, (f64, f64, HashMap<usize, f64>)>> {
        let mut config = SimulationConfig::default().with_runs(runs);
        config.seed = seed;

        let report = py.allow_threads(|| self.state.run_simulations(&config, None))?;
        Ok(report
            .aggregates
            .into_iter()
            .map(|a| {
                let odds = a.playoff_probability(playoff_spots);
                (a.team_id, (odds, a.average_seed, a.seed_histogram.into_iter().collect()))
            })
            .collect())
    }

    fn __repr__(&self) -> String {
        format!(
            "Season({} teams, {} past games, {} future games)",
            self.state.teams().len(),
            self.state.past_games().len(),
            self.state.future_games().len()
        )
    }
}

/// Probability of the away side winning a single matchup.
#[pyfunction]
fn matchup_win_prob(away_mean: f64, away_variance: f64, home_mean: f64, home_variance: f64) -> PyResult<f64> {
    let away = ScoreSampler::new(away_mean, away_variance)?;
    let home = ScoreSampler::new(home_mean, home_variance)?;
    Ok(win_prob_from_samplers(&away, &home)?)
}

/// Python module definition
#[pymodule]
fn playoff_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySeason>()?;
    m.add_function(wrap_pyfunction!(matchup_win_prob, m)?)?;

    m.add("DEFAULT_RUNS", DEFAULT_RUNS)?;
    m.add("DEFAULT_PLAYOFF_SPOTS", DEFAULT_PLAYOFF_SPOTS)?;

    Ok(())
}
