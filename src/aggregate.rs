use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::team::{Team, TeamId};

/// Incremental mean that can be merged with another partial mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningMean {
    n: u64,
    mean: f64,
}

impl RunningMean {
    pub fn add(&mut self, x: f64) {
        self.n += 1;
        self.mean += (x - self.mean) / (self.n as f64);
    }

    /// Combine two partial means as if every sample had been added to one.
    pub fn merge(&mut self, other: &RunningMean) {
        if other.n == 0 {
            return;
        }
        let total = self.n + other.n;
        self.mean += (other.mean - self.mean) * (other.n as f64 / total as f64);
        self.n = total;
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    /// NaN until a sample arrives.
    pub fn mean(&self) -> f64 {
        if self.n == 0 {
            f64::NAN
        } else {
            self.mean
        }
    }
}

/// Expected end-of-season record, averaged over simulated seasons.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpectedRecord {
    pub wins: f64,
    pub losses: f64,
    pub points_for: f64,
    pub points_against: f64,
}

/// One team's outcome distribution across all completed runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationAggregate {
    pub team_id: TeamId,
    pub average_seed: f64,
    /// Seed -> share of completed runs that ended with that seed. Seeds never
    /// reached are absent.
    pub seed_histogram: BTreeMap<usize, f64>,
    pub expected_record: ExpectedRecord,
}

impl SimulationAggregate {
    pub fn seed_probability(&self, seed: usize) -> f64 {
        self.seed_histogram.get(&seed).copied().unwrap_or(0.0)
    }

    /// Probability of finishing with a seed in `1..=cutoff`.
    pub fn playoff_probability(&self, cutoff: usize) -> f64 {
        if cutoff == 0 {
            return 0.0;
        }
        self.seed_histogram.range(1..=cutoff).map(|(_, p)| p).sum()
    }
}

/// Outcome of a simulation batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// In the order of the input team list.
    pub aggregates: Vec<SimulationAggregate>,
    pub runs_requested: usize,
    /// Histograms and means are scaled by this, not by `runs_requested`.
    pub runs_completed: usize,
    /// True when a time budget or cancellation cut the batch short.
    pub stopped_early: bool,
}

impl SimulationReport {
    pub fn get(&self, team_id: TeamId) -> Option<&SimulationAggregate> {
        self.aggregates.iter().find(|a| a.team_id == team_id)
    }

    /// `(team_id, playoff probability)` for every team, in input order.
    pub fn playoff_odds(&self, cutoff: usize) -> Vec<(TeamId, f64)> {
        self.aggregates
            .iter()
            .map(|a| (a.team_id, a.playoff_probability(cutoff)))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
struct TeamTally {
    seed_counts: BTreeMap<usize, u64>,
    seed: RunningMean,
    wins: RunningMean,
    losses: RunningMean,
    points_for: RunningMean,
    points_against: RunningMean,
}

impl TeamTally {
    fn merge(&mut self, other: &TeamTally) {
        for (&seed, &count) in &other.seed_counts {
            *self.seed_counts.entry(seed).or_insert(0) += count;
        }
        self.seed.merge(&other.seed);
        self.wins.merge(&other.wins);
        self.losses.merge(&other.losses);
        self.points_for.merge(&other.points_for);
        self.points_against.merge(&other.points_against);
    }
}

/// Per-worker accumulator of run outcomes, indexed by team position.
#[derive(Debug, Clone)]
pub struct SeasonAccumulator {
    runs: usize,
    tallies: Vec<TeamTally>,
}

impl SeasonAccumulator {
    pub fn new(team_count: usize) -> Self {
        SeasonAccumulator {
            runs: 0,
            tallies: vec![TeamTally::default(); team_count],
        }
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Fold one run's outcome in. `outcome[i]` belongs to team position `i`
    /// and must carry a seed.
    pub fn record(&mut self, outcome: &[Team]) {
        debug_assert_eq!(outcome.len(), self.tallies.len());
        for (tally, team) in self.tallies.iter_mut().zip(outcome) {
            if let Some(seed) = team.playoff_seed {
                *tally.seed_counts.entry(seed).or_insert(0) += 1;
                tally.seed.add(seed as f64);
            }
            tally.wins.add(team.record.wins as f64);
            tally.losses.add(team.record.losses as f64);
            tally.points_for.add(team.record.points_for);
            tally.points_against.add(team.record.points_against);
        }
        self.runs += 1;
    }

    pub fn merge(mut self, other: SeasonAccumulator) -> Self {
        for (mine, theirs) in self.tallies.iter_mut().zip(&other.tallies) {
            mine.merge(theirs);
        }
        self.runs += other.runs;
        self
    }

    /// Turn counts into probabilities over the completed runs.
    pub fn finish(self, team_ids: &[TeamId]) -> Vec<SimulationAggregate> {
        let runs = self.runs;
        team_ids
            .iter()
            .zip(self.tallies)
            .map(|(&team_id, tally)| SimulationAggregate {
                team_id,
                average_seed: tally.seed.mean(),
                seed_histogram: tally
                    .seed_counts
                    .iter()
                    .map(|(&seed, &count)| (seed, count as f64 / runs as f64))
                    .collect(),
                expected_record: ExpectedRecord {
                    wins: tally.wins.mean(),
                    losses: tally.losses.mean(),
                    points_for: tally.points_for.mean(),
                    points_against: tally.points_against.mean(),
                },
            })
            .collect()
    }
}
