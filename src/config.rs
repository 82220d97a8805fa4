use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DIVISIONS, DEFAULT_PLAYOFF_SPOTS, DEFAULT_RUNS};
use crate::team::DivisionId;

/// League policy: which divisions exist and how many seeds reach the playoffs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueConfig {
    /// Every division a team may belong to, in a fixed order.
    pub divisions: Vec<DivisionId>,
    /// Seeds `1..=playoff_spots` qualify.
    pub playoff_spots: usize,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        LeagueConfig {
            divisions: DEFAULT_DIVISIONS.to_vec(),
            playoff_spots: DEFAULT_PLAYOFF_SPOTS,
        }
    }
}

impl LeagueConfig {
    pub fn new(divisions: Vec<DivisionId>, playoff_spots: usize) -> Self {
        LeagueConfig {
            divisions,
            playoff_spots,
        }
    }

    pub fn has_division(&self, division_id: DivisionId) -> bool {
        self.divisions.contains(&division_id)
    }
}

/// Batch settings for a season simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of seasons to simulate.
    pub runs: usize,
    /// Master seed; `None` draws one from system entropy.
    pub seed: Option<u64>,
    /// Wall-clock budget for the whole batch. Runs not started when it
    /// expires are skipped.
    pub time_budget: Option<Duration>,
    /// Run on the rayon pool instead of the calling thread.
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            runs: DEFAULT_RUNS,
            seed: None,
            time_budget: None,
            parallel: true,
        }
    }
}

impl SimulationConfig {
    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}
