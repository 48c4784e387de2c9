//! Expected fantasy points from finishing-position and completion distributions.
//!
//! Each scoring category is an inner product of a probability distribution with the matching column of
//! a [ScoringTable]. Overtake points are taken over the joint (qualifying, race) distribution of a
//! single entrant; teammate points over the joint distribution of an entrant and its teammate, with the
//! teammate conditioned on not sharing the entrant's position.

use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;
use tracing::debug;

use crate::distribution::{
    CompletionDistribution, InvalidDistribution, PositionDistribution, QUARTILES,
};
use crate::forecast::Forecast;
use crate::linear::Matrix;
use crate::probs::SliceExt;
use crate::registry::{EntrantId, Registry, TeamId};
use crate::roster::Snapshot;


/// Whether points are awarded to an entrant in its own right or as a contribution to its team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Mode {
    Solo,
    Team,
}

/// Points per finishing position; element `i` applies to position `i + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionPoints {
    pub qualifying: Vec<f64>,
    pub race: Vec<f64>,
}
impl PositionPoints {
    fn linear(positions: usize, qualifying: (f64, f64), race: (f64, f64)) -> Self {
        let series = |(intercept, slope): (f64, f64)| -> Vec<f64> {
            (1..=positions)
                .map(|position| intercept - slope * position as f64)
                .collect()
        };
        Self {
            qualifying: series(qualifying),
            race: series(race),
        }
    }
}

/// Points awarded for any position delta of at least `from`, until superseded by the next band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub from: usize,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringTable {
    pub solo: PositionPoints,
    pub team: PositionPoints,

    /// Points for completing each quartile of the race.
    pub completion: [f64; QUARTILES],

    /// Points per position gained from the qualifying position to the race position.
    pub overtake_per_position: f64,

    /// Bands of points for finishing ahead of the teammate, keyed by the margin in positions.
    pub teammate: Vec<Band>,

    /// Points for finishing 1, 2, … positions ahead of the baseline rank. Larger improvements are
    /// capped at the last element.
    pub improvement: Vec<f64>,
}
impl ScoringTable {
    pub fn positions(&self) -> usize {
        self.solo.race.len()
    }

    pub fn position_points(&self, mode: Mode) -> &PositionPoints {
        match mode {
            Mode::Solo => &self.solo,
            Mode::Team => &self.team,
        }
    }

    pub fn overtake(&self, qualifying: usize, race: usize) -> f64 {
        if race < qualifying {
            self.overtake_per_position * (qualifying - race) as f64
        } else {
            0.0
        }
    }

    /// Points for finishing `delta` positions ahead of the teammate.
    pub fn teammate(&self, delta: isize) -> f64 {
        if delta <= 0 {
            return 0.0;
        }
        self.teammate
            .iter()
            .take_while(|band| band.from as isize <= delta)
            .last()
            .map(|band| band.points)
            .unwrap_or(0.0)
    }

    /// Points for finishing `delta` positions ahead of the baseline rank.
    pub fn improvement(&self, delta: isize) -> f64 {
        if delta <= 0 || self.improvement.is_empty() {
            return 0.0;
        }
        let index = usize::min(delta as usize, self.improvement.len()) - 1;
        self.improvement[index]
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        let positions = self.positions();
        if positions == 0 {
            return Err(ScoringError::InvalidTable("no positions are scored".into()));
        }
        for (mode, column, len) in [
            (Mode::Solo, "qualifying", self.solo.qualifying.len()),
            (Mode::Team, "qualifying", self.team.qualifying.len()),
            (Mode::Team, "race", self.team.race.len()),
        ] {
            if len != positions {
                return Err(ScoringError::InvalidTable(format!(
                    "{mode} {column} scores {len} positions, expected {positions}"
                )));
            }
        }
        for pair in self.teammate.windows(2) {
            if pair[0].from >= pair[1].from {
                return Err(ScoringError::InvalidTable(
                    "teammate bands must be in strictly ascending order".into(),
                ));
            }
        }
        if self.teammate.first().map(|band| band.from == 0).unwrap_or(false) {
            return Err(ScoringError::InvalidTable(
                "teammate bands must start from a margin of at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ScoringTable {
    fn default() -> Self {
        const POSITIONS: usize = 20;
        Self {
            solo: PositionPoints::linear(POSITIONS, (52.0, 2.0), (103.0, 3.0)),
            team: PositionPoints::linear(POSITIONS, (31.0, 1.0), (62.0, 2.0)),
            completion: [3.0, 3.0, 3.0, 0.0],
            overtake_per_position: 3.0,
            teammate: vec![
                Band { from: 1, points: 2.0 },
                Band { from: 4, points: 5.0 },
                Band { from: 8, points: 8.0 },
                Band { from: 13, points: 12.0 },
            ],
            improvement: vec![0.0, 2.0, 4.0, 6.0, 9.0, 12.0, 16.0, 20.0, 25.0],
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("entrant '{0}' is not a member of any team")]
    MissingTeam(String),

    #[error("entrant '{0}' has no baseline rank")]
    MissingRank(String),

    #[error("distribution covers {actual} positions but only {expected} are scored")]
    MismatchedPositions { expected: usize, actual: usize },

    #[error("forecast covers {actual} entrants but the registry holds {expected}")]
    MisalignedForecast { expected: usize, actual: usize },

    #[error("invalid scoring table: {0}")]
    InvalidTable(String),

    #[error("{0}")]
    Distribution(#[from] InvalidDistribution),
}

/// Expected points by category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Breakdown {
    pub qualifying: f64,
    pub race: f64,
    pub completion: f64,
    pub overtake: f64,
    pub teammate: f64,
    pub improvement: f64,
}
impl Breakdown {
    pub fn total(&self) -> f64 {
        self.qualifying
            + self.race
            + self.completion
            + self.overtake
            + self.teammate
            + self.improvement
    }
}

impl AddAssign<&Breakdown> for Breakdown {
    fn add_assign(&mut self, rhs: &Breakdown) {
        self.qualifying += rhs.qualifying;
        self.race += rhs.race;
        self.completion += rhs.completion;
        self.overtake += rhs.overtake;
        self.teammate += rhs.teammate;
        self.improvement += rhs.improvement;
    }
}

impl Add for Breakdown {
    type Output = Breakdown;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += &rhs;
        self
    }
}

impl Display for Breakdown {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "qualifying: {:.3}, race: {:.3}, completion: {:.3}, overtake: {:.3}, teammate: {:.3}, improvement: {:.3}, total: {:.3}",
            self.qualifying,
            self.race,
            self.completion,
            self.overtake,
            self.teammate,
            self.improvement,
            self.total()
        )
    }
}

/// Fixed (cost, points) snapshots of every entrant and team, in registry order.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshots {
    pub entrants: Vec<Snapshot>,
    pub teams: Vec<Snapshot>,
}

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    table: ScoringTable,
}
impl ScoringEngine {
    pub fn table(&self) -> &ScoringTable {
        &self.table
    }

    pub fn qualifying_points(
        &self,
        dist: &PositionDistribution,
        mode: Mode,
    ) -> Result<f64, ScoringError> {
        self.check_positions(dist)?;
        Ok(dist.probs().dot(&self.table.position_points(mode).qualifying))
    }

    pub fn race_points(
        &self,
        dist: &PositionDistribution,
        mode: Mode,
    ) -> Result<f64, ScoringError> {
        self.check_positions(dist)?;
        Ok(dist.probs().dot(&self.table.position_points(mode).race))
    }

    pub fn completion_points(&self, completion: &CompletionDistribution) -> f64 {
        completion.probs().dot(&self.table.completion)
    }

    /// Joint probability of qualifying in position `row + 1` and finishing the race in position
    /// `col + 1`, treating the two as independent.
    pub fn overtake_matrix(
        qualifying: &PositionDistribution,
        race: &PositionDistribution,
    ) -> Matrix<f64> {
        let mut joint = Matrix::allocate(qualifying.positions(), race.positions());
        for (row, &qualifying_prob) in qualifying.probs().iter().enumerate() {
            for (col, &race_prob) in race.probs().iter().enumerate() {
                joint[(row, col)] = qualifying_prob * race_prob;
            }
        }
        joint
    }

    pub fn overtake_points(
        &self,
        qualifying: &PositionDistribution,
        race: &PositionDistribution,
    ) -> Result<f64, ScoringError> {
        self.check_positions(qualifying)?;
        self.check_positions(race)?;
        let joint = Self::overtake_matrix(qualifying, race);
        let mut points = 0.0;
        for row in 0..joint.rows() {
            // only finishing ahead of the qualifying position scores
            for col in 0..usize::min(row, joint.cols()) {
                points += joint[(row, col)] * self.table.overtake(row + 1, col + 1);
            }
        }
        Ok(points)
    }

    /// Joint probability of the entrant finishing in position `row + 1` and its teammate in position
    /// `col + 1`. For every position held by the entrant, the teammate's distribution is conditioned on
    /// not holding that same position.
    pub fn teammate_matrix(own: &PositionDistribution, mate: &PositionDistribution) -> Matrix<f64> {
        let positions = usize::max(own.positions(), mate.positions());
        let mut joint = Matrix::allocate(positions, positions);
        for (row, &own_prob) in own.probs().iter().enumerate() {
            if own_prob == 0.0 {
                continue;
            }
            if let Some(conditional) = mate.excluding(row + 1) {
                for (col, &mate_prob) in conditional.probs().iter().enumerate() {
                    joint[(row, col)] = own_prob * mate_prob;
                }
            }
        }
        joint
    }

    pub fn teammate_points(
        &self,
        own: &PositionDistribution,
        mate: &PositionDistribution,
    ) -> Result<f64, ScoringError> {
        self.check_positions(own)?;
        self.check_positions(mate)?;
        let joint = Self::teammate_matrix(own, mate);
        let mut points = 0.0;
        for row in 0..joint.rows() {
            for col in row + 1..joint.cols() {
                points += joint[(row, col)] * self.table.teammate(col as isize - row as isize);
            }
        }
        Ok(points)
    }

    pub fn improvement_points(
        &self,
        race: &PositionDistribution,
        rank: usize,
    ) -> Result<f64, ScoringError> {
        self.check_positions(race)?;
        Ok(race
            .probs()
            .iter()
            .enumerate()
            .map(|(index, &prob)| {
                let position = index + 1;
                prob * self.table.improvement(rank as isize - position as isize)
            })
            .sum())
    }

    /// Expected points of an entrant in its own right, across all categories.
    pub fn entrant_breakdown(
        &self,
        registry: &Registry,
        forecast: &Forecast,
        id: EntrantId,
    ) -> Result<Breakdown, ScoringError> {
        let entrant = registry.entrant(id);
        let probs = forecast.entrant(id);
        let mate = registry
            .teammate_of(id)
            .ok_or_else(|| ScoringError::MissingTeam(entrant.name.clone()))?;
        let rank = entrant
            .rank
            .ok_or_else(|| ScoringError::MissingRank(entrant.name.clone()))?;

        Ok(Breakdown {
            qualifying: self.qualifying_points(&probs.qualifying, Mode::Solo)?,
            race: self.race_points(&probs.race, Mode::Solo)?,
            completion: self.completion_points(&probs.completion),
            overtake: self.overtake_points(&probs.qualifying, &probs.race)?,
            teammate: self.teammate_points(&probs.race, &forecast.entrant(mate).race)?,
            improvement: self.improvement_points(&probs.race, rank)?,
        })
    }

    /// Expected points of a team: the team-mode qualifying and race points of its two members.
    pub fn team_breakdown(
        &self,
        registry: &Registry,
        forecast: &Forecast,
        id: TeamId,
    ) -> Result<Breakdown, ScoringError> {
        let mut breakdown = Breakdown::default();
        for member in registry.team(id).members {
            let probs = forecast.entrant(member);
            breakdown += &Breakdown {
                qualifying: self.qualifying_points(&probs.qualifying, Mode::Team)?,
                race: self.race_points(&probs.race, Mode::Team)?,
                ..Breakdown::default()
            };
        }
        Ok(breakdown)
    }

    /// Fixes the cost and expected points of every entrant and team, for use by the optimiser.
    pub fn snapshots(
        &self,
        registry: &Registry,
        forecast: &Forecast,
    ) -> Result<Snapshots, ScoringError> {
        if forecast.len() != registry.entrants().len() {
            return Err(ScoringError::MisalignedForecast {
                expected: registry.entrants().len(),
                actual: forecast.len(),
            });
        }
        let entrants = registry
            .entrant_ids()
            .map(|id| {
                let entrant = registry.entrant(id);
                let breakdown = self.entrant_breakdown(registry, forecast, id)?;
                debug!("{}: {breakdown}", entrant.name);
                Ok(Snapshot::new(entrant.name.clone(), entrant.cost, breakdown.total()))
            })
            .collect::<Result<Vec<_>, ScoringError>>()?;
        let teams = registry
            .team_ids()
            .map(|id| {
                let team = registry.team(id);
                let breakdown = self.team_breakdown(registry, forecast, id)?;
                debug!("{}: {breakdown}", team.name);
                Ok(Snapshot::new(team.name.clone(), team.cost, breakdown.total()))
            })
            .collect::<Result<Vec<_>, ScoringError>>()?;
        Ok(Snapshots { entrants, teams })
    }

    fn check_positions(&self, dist: &PositionDistribution) -> Result<(), ScoringError> {
        let expected = self.table.positions();
        if dist.positions() > expected {
            return Err(ScoringError::MismatchedPositions {
                expected,
                actual: dist.positions(),
            });
        }
        Ok(())
    }
}

impl TryFrom<ScoringTable> for ScoringEngine {
    type Error = ScoringError;

    fn try_from(table: ScoringTable) -> Result<Self, Self::Error> {
        table.validate()?;
        Ok(Self { table })
    }
}
