use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::aggregate::{SeasonAccumulator, SimulationReport};
use crate::config::{LeagueConfig, SimulationConfig};
use crate::error::{Result, SimulationError};
use crate::game::{split_schedule, Game};
use crate::matchup::simulate_scheduled;
use crate::random::UniformSource;
use crate::sampler::ScoreSampler;
use crate::seeding::seed_teams;
use crate::standings::{resolve_records, resolve_standings};
use crate::stats::fit_team_stats;
use crate::team::{index_by_id, Team, TeamId};

/// Read-only snapshot of a season: fitted teams, the games already played and
/// the games still to come.
///
/// Construction validates everything a run needs, so simulation only fails on
/// bad draws from a caller-supplied source.
#[derive(Clone, Debug)]
pub struct SeasonState {
    teams: Vec<Team>,
    past_games: Vec<Game>,
    future_games: Vec<Game>,
    league: LeagueConfig,
    samplers: HashMap<TeamId, ScoreSampler>,
    positions: HashMap<TeamId, usize>,
}

impl SeasonState {
    pub fn new(
        teams: Vec<Team>,
        past_games: Vec<Game>,
        future_games: Vec<Game>,
        league: LeagueConfig,
    ) -> Result<Self> {
        let positions = index_by_id(&teams)?;

        let mut samplers = HashMap::with_capacity(teams.len());
        let mut missing = Vec::new();
        for team in &teams {
            match team.sampler() {
                Ok(sampler) => {
                    samplers.insert(team.id, sampler);
                }
                Err(err) => {
                    warn!("team {} cannot be simulated: {}", team.id, err);
                    missing.push(team.id);
                }
            }
        }
        if !missing.is_empty() {
            return Err(SimulationError::IncompleteTeamData { team_ids: missing });
        }

        for team in &teams {
            if !league.has_division(team.division_id) {
                return Err(SimulationError::UnknownDivision {
                    team_id: team.id,
                    division_id: team.division_id,
                });
            }
        }

        for game in past_games.iter().chain(&future_games) {
            game.validate()?;
            for team_id in [game.away.team_id, game.home.team_id] {
                if !samplers.contains_key(&team_id) {
                    return Err(SimulationError::UnknownTeamReference { team_id, game_id: game.id });
                }
            }
        }
        for game in &past_games {
            game.final_result()?;
        }

        Ok(SeasonState {
            teams,
            past_games,
            future_games,
            league,
            samplers,
            positions,
        })
    }

    /// Build a season from a raw schedule: split it at `current_week`, fit
    /// every team over the trailing `window`, and attach current records.
    pub fn from_schedule(
        teams: &[Team],
        schedule: &[Game],
        current_week: u32,
        league: LeagueConfig,
        window: Option<usize>,
    ) -> Result<Self> {
        let (past, future) = split_schedule(schedule, current_week);
        let fitted = fit_team_stats(&past, teams, window)?;
        let with_records = resolve_records(&past, &fitted)?;
        debug!(
            "season loaded at week {}: {} teams, {} past games, {} future games",
            current_week,
            with_records.len(),
            past.len(),
            future.len()
        );
        SeasonState::new(with_records, past, future, league)
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn past_games(&self) -> &[Game] {
        &self.past_games
    }

    pub fn future_games(&self) -> &[Game] {
        &self.future_games
    }

    pub fn league(&self) -> &LeagueConfig {
        &self.league
    }

    /// Standings from the real results only.
    pub fn current_standings(&self) -> Result<Vec<Team>> {
        resolve_standings(&self.past_games, &self.teams, &self.league)
    }

    /// Simulate the rest of the season once. Returns teams sorted by seed.
    pub fn simulate_season<U: UniformSource + ?Sized>(&self, source: &mut U) -> Result<Vec<Team>> {
        let mut outcome = self.simulate_outcome(source)?;
        outcome.sort_by_key(|t| t.playoff_seed);
        Ok(outcome)
    }

    /// One run with teams left in input order, records and seeds filled in.
    fn simulate_outcome<U: UniformSource + ?Sized>(&self, source: &mut U) -> Result<Vec<Team>> {
        let simulated = self
            .future_games
            .iter()
            .map(|game| simulate_scheduled(game, &self.samplers, &mut *source))
            .collect::<Result<Vec<Game>>>()?;

        let mut outcome = resolve_records(self.past_games.iter().chain(&simulated), &self.teams)?;
        for seeded in seed_teams(&outcome, &self.league)? {
            if let Some(&i) = self.positions.get(&seeded.id) {
                outcome[i].playoff_seed = seeded.playoff_seed;
            }
        }
        Ok(outcome)
    }

    /// Run `config.runs` independent seasons.
    ///
    /// Run `i` draws from its own ChaCha8 stream seeded from a master
    /// generator, so a fixed `config.seed` reproduces the report whether or
    /// not the batch runs in parallel. Runs that would start after the time
    /// budget expires or after `cancel` is raised are skipped.
    pub fn run_simulations(
        &self,
        config: &SimulationConfig,
        cancel: Option<&AtomicBool>,
    ) -> Result<SimulationReport> {
        let mut master = match config.seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        let run_seeds: Vec<u64> = (0..config.runs).map(|_| master.gen::<u64>()).collect();

        let started = Instant::now();
        let stop = StopCondition::new(config.time_budget.map(|budget| started + budget), cancel);
        let stopped = AtomicBool::new(false);
        let team_count = self.teams.len();

        info!(
            "simulating {} seasons ({} future games, parallel: {})",
            config.runs,
            self.future_games.len(),
            config.parallel
        );

        let run_one = |mut acc: SeasonAccumulator, seed: &u64| -> Result<SeasonAccumulator> {
            if stop.reached() {
                stopped.store(true, Ordering::Relaxed);
                return Ok(acc);
            }
            let mut rng = ChaCha8Rng::seed_from_u64(*seed);
            let outcome = self.simulate_outcome(&mut rng)?;
            acc.record(&outcome);
            Ok(acc)
        };

        let accumulator = if config.parallel {
            run_seeds
                .par_iter()
                .try_fold(|| SeasonAccumulator::new(team_count), run_one)
                .try_reduce(|| SeasonAccumulator::new(team_count), |a, b| Ok(a.merge(b)))?
        } else {
            run_seeds
                .iter()
                .try_fold(SeasonAccumulator::new(team_count), run_one)?
        };

        let stopped_early = stopped.load(Ordering::Relaxed);
        if stopped_early {
            warn!(
                "simulation stopped early: {} of {} runs completed",
                accumulator.runs(),
                config.runs
            );
        }
        info!(
            "completed {} runs in {:.3}s",
            accumulator.runs(),
            started.elapsed().as_secs_f64()
        );

        Ok(self.report(accumulator, config.runs, stopped_early))
    }

    /// Run `runs` seasons sequentially, drawing from `source`. Stops before
    /// the next run once `cancel` is raised.
    pub fn run_with_source<U: UniformSource + ?Sized>(
        &self,
        runs: usize,
        source: &mut U,
        cancel: Option<&AtomicBool>,
    ) -> Result<SimulationReport> {
        let stop = StopCondition::new(None, cancel);
        let mut accumulator = SeasonAccumulator::new(self.teams.len());
        let mut stopped_early = false;
        for _ in 0..runs {
            if stop.reached() {
                stopped_early = true;
                break;
            }
            let outcome = self.simulate_outcome(source)?;
            accumulator.record(&outcome);
        }
        if stopped_early {
            warn!("simulation stopped early: {} of {} runs completed", accumulator.runs(), runs);
        }
        Ok(self.report(accumulator, runs, stopped_early))
    }

    fn report(&self, accumulator: SeasonAccumulator, runs_requested: usize, stopped_early: bool) -> SimulationReport {
        let team_ids: Vec<TeamId> = self.teams.iter().map(|t| t.id).collect();
        let runs_completed = accumulator.runs();
        SimulationReport {
            aggregates: accumulator.finish(&team_ids),
            runs_requested,
            runs_completed,
            stopped_early,
        }
    }
}

/// Checked before each run of a batch.
#[derive(Clone, Copy)]
struct StopCondition<'a> {
    deadline: Option<Instant>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> StopCondition<'a> {
    fn new(deadline: Option<Instant>, cancel: Option<&'a AtomicBool>) -> Self {
        StopCondition { deadline, cancel }
    }

    fn reached(&self) -> bool {
        self.cancel.is_some_and(|c| c.load(Ordering::Relaxed))
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Simulate the remaining season `config.runs` times and aggregate seeds.
///
/// `teams` must already carry fitted distributions (see
/// [`fit_team_stats`]). Any team without one fails the whole batch with
/// [`SimulationError::IncompleteTeamData`].
pub fn run_simulation(
    teams: &[Team],
    future_games: &[Game],
    past_games: &[Game],
    league: &LeagueConfig,
    config: &SimulationConfig,
) -> Result<SimulationReport> {
    let state = SeasonState::new(teams.to_vec(), past_games.to_vec(), future_games.to_vec(), league.clone())?;
    state.run_simulations(config, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Winner;
    use crate::random::UniformSequence;
    use std::time::Duration;

    fn make_league() -> (Vec<Team>, Vec<Game>, Vec<Game>) {
        let teams = vec![
            Team::new(1, 0, "A").with_stats(120.0, 150.0),
            Team::new(2, 0, "B").with_stats(100.0, 200.0),
            Team::new(3, 1, "C").with_stats(95.0, 120.0),
            Team::new(4, 1, "D").with_stats(110.0, 300.0),
        ];
        let past = vec![
            Game::played(1, 1, (1, 118.0), (2, 96.0)),
            Game::played(2, 1, (3, 99.0), (4, 104.0)),
        ];
        let future = vec![
            Game::scheduled(3, 2, 1, 3),
            Game::scheduled(4, 2, 2, 4),
            Game::scheduled(5, 3, 4, 1),
            Game::scheduled(6, 3, 3, 2),
        ];
        (teams, past, future)
    }

    fn make_state() -> SeasonState {
        let (teams, past, future) = make_league();
        SeasonState::new(teams, past, future, LeagueConfig::default()).unwrap()
    }

    #[test]
    fn test_incomplete_team_data() {
        let (mut teams, past, future) = make_league();
        teams[1].mean = None;
        teams[3].variance = Some(0.0);
        let err = SeasonState::new(teams, past, future, LeagueConfig::default()).unwrap_err();
        assert_eq!(err, SimulationError::IncompleteTeamData { team_ids: vec![2, 4] });
    }

    #[test]
    fn test_unknown_division_rejected_up_front() {
        let (mut teams, past, future) = make_league();
        teams[0].division_id = 5;
        let err = SeasonState::new(teams, past, future, LeagueConfig::default()).unwrap_err();
        assert_eq!(err, SimulationError::UnknownDivision { team_id: 1, division_id: 5 });
    }

    #[test]
    fn test_unknown_team_in_future_game() {
        let (teams, past, mut future) = make_league();
        future.push(Game::scheduled(99, 4, 1, 12));
        let err = SeasonState::new(teams, past, future, LeagueConfig::default()).unwrap_err();
        assert_eq!(err, SimulationError::UnknownTeamReference { team_id: 12, game_id: 99 });
    }

    #[test]
    fn test_unresolved_past_game() {
        let (teams, mut past, future) = make_league();
        past.push(Game::scheduled(50, 1, 1, 4));
        let err = SeasonState::new(teams, past, future, LeagueConfig::default()).unwrap_err();
        assert_eq!(err, SimulationError::UnresolvedGame { game_id: 50 });
    }

    #[test]
    fn test_duplicate_team_rejected() {
        let (mut teams, past, future) = make_league();
        teams.push(Team::new(1, 1, "A again").with_stats(100.0, 100.0));
        let err = SeasonState::new(teams, past, future, LeagueConfig::default()).unwrap_err();
        assert_eq!(err, SimulationError::DuplicateTeam { team_id: 1 });
    }

    #[test]
    fn test_past_game_must_match_its_totals() {
        let (teams, mut past, future) = make_league();
        past[0].winner = Some(Winner::Home);
        let err = SeasonState::new(teams, past, future, LeagueConfig::default()).unwrap_err();
        assert_eq!(err, SimulationError::InconsistentResult { game_id: 1, winner: Winner::Home });
    }

    #[test]
    fn test_non_finite_past_total_rejected() {
        let (teams, mut past, future) = make_league();
        past[1] = Game::played(2, 1, (3, f64::INFINITY), (4, 104.0));
        let err = SeasonState::new(teams, past, future, LeagueConfig::default()).unwrap_err();
        assert_eq!(err, SimulationError::NonFiniteScore { game_id: 2 });
    }

    #[test]
    fn test_from_schedule_rejects_mislabeled_feed() {
        let teams = vec![Team::new(1, 0, "A"), Team::new(2, 1, "B")];
        let mut first = Game::played(1, 1, (1, 110.0), (2, 100.0));
        first.winner = Some(Winner::Home);
        let schedule = vec![
            first,
            Game::played(2, 2, (2, 120.0), (1, 100.0)),
            Game::scheduled(3, 3, 1, 2),
        ];
        let err = SeasonState::from_schedule(&teams, &schedule, 3, LeagueConfig::default(), None).unwrap_err();
        assert_eq!(err, SimulationError::InconsistentResult { game_id: 1, winner: Winner::Home });
    }

    #[test]
    fn test_simulate_season_median_draws() {
        let state = make_state();
        let mut source = UniformSequence::constant(0.5);
        let standings = state.simulate_season(&mut source).unwrap();
        assert_eq!(source.consumed(), 8);

        // Every future game goes to the higher mean: A 3-0, D 2-1, B 1-2, C 0-3
        let order: Vec<TeamId> = standings.iter().map(|t| t.id).collect();
        assert_eq!(order, vec![1, 4, 2, 3]);
        assert_eq!(standings[0].record.wins, 3);
        assert_eq!(standings[1].record.wins, 2);
        assert!(standings.iter().all(|t| t.record.games_played() == 3));
    }

    #[test]
    fn test_past_games_untouched() {
        let state = make_state();
        let before = state.past_games().to_vec();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        state.run_with_source(25, &mut rng, None).unwrap();
        assert_eq!(state.past_games(), &before[..]);
        assert!(state.future_games().iter().all(|g| !g.is_resolved()));
    }

    #[test]
    fn test_histograms_sum_to_one() {
        let state = make_state();
        let config = SimulationConfig::default().with_runs(500).with_seed(11);
        let report = state.run_simulations(&config, None).unwrap();

        assert_eq!(report.runs_completed, 500);
        assert!(!report.stopped_early);
        for agg in &report.aggregates {
            let total: f64 = agg.seed_histogram.values().sum();
            assert!((total - 1.0).abs() < 1e-9);
            let weighted: f64 = agg.seed_histogram.iter().map(|(&s, &p)| s as f64 * p).sum();
            assert!((weighted - agg.average_seed).abs() < 1e-9);
        }
    }

    #[test]
    fn test_seeded_batch_is_reproducible_across_modes() {
        let state = make_state();
        let config = SimulationConfig::default().with_runs(200).with_seed(42);
        let parallel = state.run_simulations(&config, None).unwrap();
        let sequential = state.run_simulations(&config.clone().sequential(), None).unwrap();

        for (p, s) in parallel.aggregates.iter().zip(&sequential.aggregates) {
            assert_eq!(p.team_id, s.team_id);
            assert_eq!(p.seed_histogram.len(), s.seed_histogram.len());
            for (seed, prob) in &p.seed_histogram {
                assert!((prob - s.seed_probability(*seed)).abs() < 1e-12);
            }
            assert!((p.average_seed - s.average_seed).abs() < 1e-9);
        }
    }

    #[test]
    fn test_cancelled_batch_reports_partial_runs() {
        let state = make_state();
        let cancel = AtomicBool::new(true);
        let config = SimulationConfig::default().with_runs(100).with_seed(1);
        let report = state.run_simulations(&config, Some(&cancel)).unwrap();

        assert_eq!(report.runs_requested, 100);
        assert_eq!(report.runs_completed, 0);
        assert!(report.stopped_early);
        assert!(report.aggregates.iter().all(|a| a.seed_histogram.is_empty()));
    }

    /// Raises `cancel` once `draws_left` uniforms have been handed out.
    struct CancelAfter<'a> {
        rng: ChaCha8Rng,
        draws_left: usize,
        cancel: &'a AtomicBool,
    }

    impl UniformSource for CancelAfter<'_> {
        fn next_uniform(&mut self) -> f64 {
            self.draws_left = self.draws_left.saturating_sub(1);
            if self.draws_left == 0 {
                self.cancel.store(true, Ordering::Relaxed);
            }
            self.rng.next_uniform()
        }
    }

    #[test]
    fn test_partial_batch_scales_by_completed_runs() {
        let state = make_state();
        let cancel = AtomicBool::new(false);
        // Four future games, two draws each
        let mut source = CancelAfter {
            rng: ChaCha8Rng::seed_from_u64(17),
            draws_left: 3 * 8,
            cancel: &cancel,
        };
        let report = state.run_with_source(10, &mut source, Some(&cancel)).unwrap();

        assert_eq!(report.runs_requested, 10);
        assert_eq!(report.runs_completed, 3);
        assert!(report.stopped_early);
        for agg in &report.aggregates {
            let total: f64 = agg.seed_histogram.values().sum();
            assert!((total - 1.0).abs() < 1e-9);
            assert!(agg.seed_histogram.values().all(|&p| {
                let thirds = p * 3.0;
                (thirds - thirds.round()).abs() < 1e-9
            }));
            let weighted: f64 = agg.seed_histogram.iter().map(|(&s, &p)| s as f64 * p).sum();
            assert!((weighted - agg.average_seed).abs() < 1e-9);
            let games = agg.expected_record.wins + agg.expected_record.losses;
            assert!((games - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_uncancelled_source_batch_runs_to_completion() {
        let state = make_state();
        let cancel = AtomicBool::new(false);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let report = state.run_with_source(12, &mut rng, Some(&cancel)).unwrap();
        assert_eq!(report.runs_completed, 12);
        assert!(!report.stopped_early);
    }

    #[test]
    fn test_expired_budget_stops_batch() {
        let state = make_state();
        let config = SimulationConfig::default()
            .with_runs(1000)
            .with_seed(1)
            .with_time_budget(Duration::ZERO);
        let report = state.run_simulations(&config, None).unwrap();
        assert_eq!(report.runs_completed, 0);
        assert!(report.stopped_early);
    }

    #[test]
    fn test_from_schedule() {
        let teams = vec![
            Team::new(1, 0, "A"),
            Team::new(2, 0, "B"),
            Team::new(3, 1, "C"),
            Team::new(4, 1, "D"),
        ];
        let schedule = vec![
            Game::played(1, 1, (1, 110.0), (2, 100.0)),
            Game::played(2, 1, (3, 90.0), (4, 130.0)),
            Game::played(3, 2, (2, 120.0), (3, 80.0)),
            Game::played(4, 2, (4, 100.0), (1, 90.0)),
            Game::scheduled(5, 3, 1, 3),
            Game::scheduled(6, 3, 2, 4),
        ];

        let state = SeasonState::from_schedule(&teams, &schedule, 3, LeagueConfig::default(), None).unwrap();
        assert_eq!(state.past_games().len(), 4);
        assert_eq!(state.future_games().len(), 2);
        assert_eq!(state.teams()[0].mean, Some(100.0));
        assert_eq!(state.teams()[0].variance, Some(100.0));
        assert_eq!(state.teams()[3].record.wins, 2);

        let standings = state.current_standings().unwrap();
        assert_eq!(standings[0].id, 4);
    }
}
