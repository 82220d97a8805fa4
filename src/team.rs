use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::sampler::ScoreSampler;

pub type TeamId = u32;
pub type DivisionId = u32;

/// Win/loss/points totals for one resolution pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub wins: u32,
    pub losses: u32,
    pub points_for: f64,
    pub points_against: f64,
}

impl SeasonRecord {
    pub fn games_played(&self) -> u32 {
        self.wins + self.losses
    }
}

/// League member with its fitted scoring distribution and current standing.
///
/// `mean` and `variance` stay `None` until enough history has been fitted;
/// `playoff_seed` stays `None` until seeding runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub division_id: DivisionId,
    pub name: String,

    /// Average weekly points over the fitted window
    pub mean: Option<f64>,

    /// Population variance of weekly points over the fitted window
    pub variance: Option<f64>,

    #[serde(default)]
    pub record: SeasonRecord,

    /// 1-based playoff seed
    pub playoff_seed: Option<usize>,
}

impl Team {
    pub fn new(id: TeamId, division_id: DivisionId, name: impl Into<String>) -> Self {
        Team {
            id,
            division_id,
            name: name.into(),
            mean: None,
            variance: None,
            record: SeasonRecord::default(),
            playoff_seed: None,
        }
    }

    /// Create a team with known distribution parameters (internal and test use)
    pub fn with_stats(mut self, mean: f64, variance: f64) -> Self {
        self.mean = Some(mean);
        self.variance = Some(variance);
        self
    }

    pub fn has_distribution(&self) -> bool {
        matches!((self.mean, self.variance), (Some(m), Some(v)) if m.is_finite() && v.is_finite() && v > 0.0)
    }

    /// Build the sampler for this team's fitted distribution.
    pub fn sampler(&self) -> Result<ScoreSampler> {
        match (self.mean, self.variance) {
            (Some(mean), Some(variance)) if !mean.is_nan() => ScoreSampler::new(mean, variance),
            _ => Err(SimulationError::InsufficientHistory { team_id: self.id }),
        }
    }
}

/// Map each team id to its position in `teams`. Ids must be unique.
pub fn index_by_id(teams: &[Team]) -> Result<HashMap<TeamId, usize>> {
    let mut index = HashMap::with_capacity(teams.len());
    for (i, team) in teams.iter().enumerate() {
        if index.insert(team.id, i).is_some() {
            return Err(SimulationError::DuplicateTeam { team_id: team.id });
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_team_is_unfitted() {
        let team = Team::new(3, 1, "Gridiron Gurus");
        assert!(!team.has_distribution());
        assert_eq!(team.record, SeasonRecord::default());
        assert_eq!(team.playoff_seed, None);
    }

    #[test]
    fn test_sampler_requires_history() {
        let team = Team::new(3, 1, "Gridiron Gurus");
        assert_eq!(
            team.sampler().unwrap_err(),
            SimulationError::InsufficientHistory { team_id: 3 }
        );
    }

    #[test]
    fn test_zero_variance_is_not_a_distribution() {
        let team = Team::new(1, 0, "A").with_stats(110.0, 0.0);
        assert!(!team.has_distribution());
        assert!(matches!(
            team.sampler(),
            Err(SimulationError::InvalidDistributionParameters { .. })
        ));
    }

    #[test]
    fn test_fitted_team_has_sampler() {
        let team = Team::new(1, 0, "A").with_stats(110.0, 25.0);
        assert!(team.has_distribution());
        let sampler = team.sampler().unwrap();
        assert!((sampler.mean() - 110.0).abs() < 1e-12);
    }

    #[test]
    fn test_index_by_id() {
        let teams = vec![Team::new(7, 0, "A"), Team::new(3, 1, "B")];
        let index = index_by_id(&teams).unwrap();
        assert_eq!(index[&7], 0);
        assert_eq!(index[&3], 1);

        let dupes = vec![Team::new(1, 0, "A"), Team::new(2, 0, "B"), Team::new(1, 1, "C")];
        assert_eq!(index_by_id(&dupes).unwrap_err(), SimulationError::DuplicateTeam { team_id: 1 });
    }
}
