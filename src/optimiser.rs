//! Exhaustive search over rosters of five entrants and one team.
//!
//! Rosters are enumerated with the entrant subsets in lexicographic order of the pool and the team as
//! the inner loop; a roster's position in this order is its ordinal. The search is sharded across the
//! rayon pool by subset and reduced by descending points, then ascending ordinal, so that the outcome
//! is the first maximum of the sequential enumeration regardless of scheduling.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::comb::Combinator;
use crate::roster::{select_talent, Roster, Snapshot, ROSTER_SIZE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum cost of an entrant eligible for the talent slot.
    pub talent_cost_threshold: f64,

    /// Factor applied to the talent's points. A multiplier of 2 counts them twice.
    pub talent_multiplier: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            talent_cost_threshold: 18e6,
            talent_multiplier: 2.0,
        }
    }
}

/// An entrant or a team, named in a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Member {
    Entrant(String),
    Team(String),
}

impl Display for Member {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Member::Entrant(name) => write!(f, "driver:{name}"),
            Member::Team(name) => write!(f, "team:{name}"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("'{0}' should be of the form 'driver:NAME' or 'team:NAME'")]
pub struct ParseMemberError(String);

impl FromStr for Member {
    type Err = ParseMemberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, name) = s
            .split_once(':')
            .ok_or_else(|| ParseMemberError(s.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ParseMemberError(s.to_string()));
        }
        match kind.trim() {
            "driver" | "entrant" => Ok(Member::Entrant(name.to_string())),
            "team" => Ok(Member::Team(name.to_string())),
            _ => Err(ParseMemberError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    pub budget: f64,
    pub include: Vec<Member>,
    pub exclude: Vec<Member>,
}
impl Constraints {
    pub fn with_budget(budget: f64) -> Self {
        Self {
            budget,
            include: vec![],
            exclude: vec![],
        }
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Self::with_budget(f64::INFINITY)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SolveError {
    #[error("no roster satisfies the constraints")]
    EmptyFeasibleSet,

    #[error("unknown member '{0}'")]
    UnknownMember(Member),
}

/// Constraints resolved to positions in the entrant and team pools.
#[derive(Debug)]
struct Filter {
    budget: f64,
    included_entrants: Vec<usize>,
    excluded_entrants: Vec<bool>,
    included_teams: Vec<usize>,
    excluded_teams: Vec<bool>,
}
impl Filter {
    fn admits_entrants(&self, subset: &[usize; ROSTER_SIZE]) -> bool {
        subset.iter().all(|&entrant| !self.excluded_entrants[entrant])
            && self
                .included_entrants
                .iter()
                .all(|included| subset.contains(included))
    }

    fn admits_team(&self, team: usize) -> bool {
        !self.excluded_teams[team] && self.included_teams.iter().all(|&included| included == team)
    }
}

pub struct Solver<'a> {
    entrants: &'a [Snapshot],
    teams: &'a [Snapshot],
    config: SolverConfig,
    subsets: Vec<[usize; ROSTER_SIZE]>,
    empty: Snapshot,
}
impl<'a> Solver<'a> {
    pub fn new(entrants: &'a [Snapshot], teams: &'a [Snapshot], config: SolverConfig) -> Self {
        let subsets: Vec<_> = Combinator::<ROSTER_SIZE>::new(entrants.len()).into_iter().collect();
        debug!(
            "{} entrant subsets × {} teams = {} rosters",
            subsets.len(),
            teams.len(),
            subsets.len() * teams.len()
        );
        Self {
            entrants,
            teams,
            config,
            subsets,
            empty: Snapshot::empty(),
        }
    }

    /// Number of rosters enumerated before any filtering.
    pub fn rosters(&self) -> usize {
        self.subsets.len() * self.teams.len()
    }

    /// The roster with the most points among those satisfying `constraints`, choosing the earliest in
    /// enumeration order among equals.
    pub fn solve(&self, constraints: &Constraints) -> Result<Roster<'_>, SolveError> {
        let filter = self.resolve(constraints)?;
        self.feasible(&filter)
            .reduce_with(|best, candidate| {
                if candidate.points > best.points
                    || (candidate.points == best.points && candidate.ordinal < best.ordinal)
                {
                    candidate
                } else {
                    best
                }
            })
            .ok_or(SolveError::EmptyFeasibleSet)
    }

    /// Every roster satisfying `constraints`, in enumeration order.
    pub fn universe(&self, constraints: &Constraints) -> Result<Vec<Roster<'_>>, SolveError> {
        let filter = self.resolve(constraints)?;
        Ok(self.feasible(&filter).collect())
    }

    fn feasible<'s: 'f, 'f>(
        &'s self,
        filter: &'f Filter,
    ) -> impl ParallelIterator<Item = Roster<'s>> + 'f {
        let teams = self.teams.len();
        self.subsets
            .par_iter()
            .enumerate()
            .filter(move |(_, subset)| filter.admits_entrants(subset))
            .flat_map_iter(move |(subset_index, subset)| {
                (0..teams)
                    .filter(move |&team| filter.admits_team(team))
                    .map(move |team| {
                        let ordinal = (subset_index * teams + team) as u64;
                        self.assemble(ordinal, subset, team)
                    })
            })
            .filter(move |roster| roster.cost <= filter.budget)
    }

    fn assemble(&self, ordinal: u64, subset: &[usize; ROSTER_SIZE], team: usize) -> Roster<'_> {
        let entrants = subset.map(|entrant| &self.entrants[entrant]);
        let talent = select_talent(&entrants, self.config.talent_cost_threshold)
            .map(|index| entrants[index])
            .unwrap_or(&self.empty);
        Roster::new(
            ordinal,
            entrants,
            &self.teams[team],
            talent,
            self.config.talent_multiplier,
        )
    }

    fn resolve(&self, constraints: &Constraints) -> Result<Filter, SolveError> {
        let mut filter = Filter {
            budget: constraints.budget,
            included_entrants: vec![],
            excluded_entrants: vec![false; self.entrants.len()],
            included_teams: vec![],
            excluded_teams: vec![false; self.teams.len()],
        };
        for member in &constraints.include {
            match member {
                Member::Entrant(name) => {
                    let entrant = self.entrant_index(member, name)?;
                    filter.included_entrants.push(entrant);
                }
                Member::Team(name) => {
                    let team = self.team_index(member, name)?;
                    filter.included_teams.push(team);
                }
            }
        }
        for member in &constraints.exclude {
            match member {
                Member::Entrant(name) => {
                    let entrant = self.entrant_index(member, name)?;
                    filter.excluded_entrants[entrant] = true;
                }
                Member::Team(name) => {
                    let team = self.team_index(member, name)?;
                    filter.excluded_teams[team] = true;
                }
            }
        }
        Ok(filter)
    }

    fn entrant_index(&self, member: &Member, name: &str) -> Result<usize, SolveError> {
        self.entrants
            .iter()
            .position(|entrant| entrant.name == name)
            .ok_or_else(|| SolveError::UnknownMember(member.clone()))
    }

    fn team_index(&self, member: &Member, name: &str) -> Result<usize, SolveError> {
        self.teams
            .iter()
            .position(|team| team.name == name)
            .ok_or_else(|| SolveError::UnknownMember(member.clone()))
    }
}
