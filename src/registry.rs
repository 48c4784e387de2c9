//! Entrants, teams and the membership relation between them.
//!
//! Teams refer to their members by [EntrantId]; the reverse relation (entrant to team) is held by the
//! [Registry] and is established once, when the registry is built.

use std::fmt::{Display, Formatter};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lookup::HashLookup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntrantId(usize);
impl EntrantId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for EntrantId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamId(usize);
impl TeamId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for TeamId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub name: String,
    pub cost: f64,

    /// Baseline position against which improvement is measured.
    #[serde(default)]
    pub rank: Option<usize>,
}

/// A team as declared in the input, with its members named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub name: String,
    pub cost: f64,
    pub drivers: [String; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub name: String,
    pub cost: f64,
    pub members: [EntrantId; 2],
}

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("duplicate entrant '{0}'")]
    DuplicateEntrant(String),

    #[error("duplicate team '{0}'")]
    DuplicateTeam(String),

    #[error("team '{team}' names unknown entrant '{entrant}'")]
    UnknownMember { team: String, entrant: String },

    #[error("team '{team}' names entrant '{entrant}' twice")]
    DuplicateMember { team: String, entrant: String },

    #[error("entrant '{entrant}' is a member of both '{first}' and '{second}'")]
    SharedMember {
        entrant: String,
        first: String,
        second: String,
    },
}

#[derive(Debug, Clone)]
pub struct Registry {
    entrants: Vec<Entrant>,
    entrant_names: HashLookup<String>,
    teams: Vec<Team>,
    team_names: HashLookup<String>,
    memberships: FxHashMap<EntrantId, TeamId>,
}
impl Registry {
    pub fn try_new(entrants: Vec<Entrant>, teams: Vec<TeamEntry>) -> Result<Self, RegistryError> {
        let mut entrant_names = HashLookup::with_capacity(entrants.len());
        for entrant in &entrants {
            entrant_names
                .try_push(entrant.name.clone())
                .map_err(|_| RegistryError::DuplicateEntrant(entrant.name.clone()))?;
        }

        let mut team_names = HashLookup::with_capacity(teams.len());
        let mut memberships: FxHashMap<EntrantId, TeamId> =
            FxHashMap::with_capacity_and_hasher(entrants.len(), Default::default());
        let mut resolved = Vec::with_capacity(teams.len());
        for entry in teams {
            let team_id = team_names
                .try_push(entry.name.clone())
                .map(TeamId)
                .map_err(|_| RegistryError::DuplicateTeam(entry.name.clone()))?;

            let mut members = [EntrantId(0); 2];
            for (member, driver) in members.iter_mut().zip(&entry.drivers) {
                let entrant_id = entrant_names
                    .index_of(driver.as_str())
                    .map(EntrantId)
                    .ok_or_else(|| RegistryError::UnknownMember {
                        team: entry.name.clone(),
                        entrant: driver.clone(),
                    })?;
                if let Some(&existing) = memberships.get(&entrant_id) {
                    return Err(if existing == team_id {
                        RegistryError::DuplicateMember {
                            team: entry.name.clone(),
                            entrant: driver.clone(),
                        }
                    } else {
                        RegistryError::SharedMember {
                            entrant: driver.clone(),
                            first: team_names[existing.0].clone(),
                            second: entry.name.clone(),
                        }
                    });
                }
                memberships.insert(entrant_id, team_id);
                *member = entrant_id;
            }

            resolved.push(Team {
                name: entry.name,
                cost: entry.cost,
                members,
            });
        }

        Ok(Self {
            entrants,
            entrant_names,
            teams: resolved,
            team_names,
            memberships,
        })
    }

    pub fn entrants(&self) -> &[Entrant] {
        &self.entrants
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn entrant_ids(&self) -> impl Iterator<Item = EntrantId> {
        (0..self.entrants.len()).map(EntrantId)
    }

    pub fn team_ids(&self) -> impl Iterator<Item = TeamId> {
        (0..self.teams.len()).map(TeamId)
    }

    pub fn entrant(&self, id: EntrantId) -> &Entrant {
        &self.entrants[id.0]
    }

    pub fn team(&self, id: TeamId) -> &Team {
        &self.teams[id.0]
    }

    pub fn entrant_id(&self, name: &str) -> Option<EntrantId> {
        self.entrant_names.index_of(name).map(EntrantId)
    }

    pub fn team_id(&self, name: &str) -> Option<TeamId> {
        self.team_names.index_of(name).map(TeamId)
    }

    pub fn entrant_names(&self) -> impl Iterator<Item = &str> {
        self.entrants.iter().map(|entrant| entrant.name.as_str())
    }

    pub fn team_of(&self, entrant: EntrantId) -> Option<TeamId> {
        self.memberships.get(&entrant).copied()
    }

    /// The other member of the given entrant's team, if the entrant belongs to one.
    pub fn teammate_of(&self, entrant: EntrantId) -> Option<EntrantId> {
        self.team_of(entrant).map(|team| {
            let [first, second] = self.teams[team.0].members;
            if first == entrant {
                second
            } else {
                first
            }
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn registry() -> Registry {
        Registry::try_new(
            vec![
                entrant("A", 30.0, Some(1)),
                entrant("B", 20.0, Some(2)),
                entrant("C", 10.0, None),
                entrant("D", 5.0, Some(4)),
                entrant("E", 4.0, Some(5)),
            ],
            vec![team("Red", 25.0, "A", "C"), team("Blue", 12.0, "D", "B")],
        )
        .unwrap()
    }

    #[test]
    fn resolves_memberships() {
        let registry = registry();
        let a = registry.entrant_id("A").unwrap();
        let b = registry.entrant_id("B").unwrap();
        let c = registry.entrant_id("C").unwrap();
        let d = registry.entrant_id("D").unwrap();
        let e = registry.entrant_id("E").unwrap();
        let red = registry.team_id("Red").unwrap();
        let blue = registry.team_id("Blue").unwrap();

        assert_eq!(Some(red), registry.team_of(a));
        assert_eq!(Some(red), registry.team_of(c));
        assert_eq!(Some(blue), registry.team_of(b));
        assert_eq!(None, registry.team_of(e));

        assert_eq!(Some(c), registry.teammate_of(a));
        assert_eq!(Some(a), registry.teammate_of(c));
        assert_eq!(Some(b), registry.teammate_of(d));
        assert_eq!(None, registry.teammate_of(e));

        assert_eq!([d, b], registry.team(blue).members);
        assert_eq!(5, registry.entrant_ids().count());
        assert_eq!(2, registry.team_ids().count());
        assert_eq!(None, registry.entrant_id("Z"));
    }

    #[test]
    fn duplicate_entrant() {
        assert_eq!(
            RegistryError::DuplicateEntrant("A".into()),
            Registry::try_new(vec![entrant("A", 1.0, None), entrant("A", 2.0, None)], vec![])
                .unwrap_err()
        );
    }

    #[test]
    fn duplicate_team() {
        assert_eq!(
            RegistryError::DuplicateTeam("Red".into()),
            Registry::try_new(
                vec![
                    entrant("A", 1.0, None),
                    entrant("B", 1.0, None),
                    entrant("C", 1.0, None),
                    entrant("D", 1.0, None)
                ],
                vec![team("Red", 1.0, "A", "B"), team("Red", 1.0, "C", "D")]
            )
            .unwrap_err()
        );
    }

    #[test]
    fn unknown_member() {
        assert_eq!(
            RegistryError::UnknownMember {
                team: "Red".into(),
                entrant: "Z".into()
            },
            Registry::try_new(vec![entrant("A", 1.0, None)], vec![team("Red", 1.0, "A", "Z")])
                .unwrap_err()
        );
    }

    #[test]
    fn shared_member() {
        let err = Registry::try_new(
            vec![
                entrant("A", 1.0, None),
                entrant("B", 1.0, None),
                entrant("C", 1.0, None),
            ],
            vec![team("Red", 1.0, "A", "B"), team("Blue", 1.0, "C", "A")],
        )
        .unwrap_err();
        assert_eq!(
            RegistryError::SharedMember {
                entrant: "A".into(),
                first: "Red".into(),
                second: "Blue".into()
            },
            err
        );
        assert_eq!(
            "entrant 'A' is a member of both 'Red' and 'Blue'",
            err.to_string()
        );
    }

    #[test]
    fn duplicate_member() {
        assert_eq!(
            RegistryError::DuplicateMember {
                team: "Red".into(),
                entrant: "A".into()
            },
            Registry::try_new(vec![entrant("A", 1.0, None)], vec![team("Red", 1.0, "A", "A")])
                .unwrap_err()
        );
    }
}
