//! Priced and scored members of the pool, and the rosters assembled from them.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Number of entrants in a roster, in addition to its team.
pub const ROSTER_SIZE: usize = 5;

/// Name of the placeholder talent slot when no rostered entrant qualifies.
pub const EMPTY: &str = "EMPTY";

/// Fixed cost and expected points of an entrant or a team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub cost: f64,
    pub points: f64,
}
impl Snapshot {
    pub fn new(name: impl Into<String>, cost: f64, points: f64) -> Self {
        Self {
            name: name.into(),
            cost,
            points,
        }
    }

    /// The zero-cost, zero-points placeholder.
    pub fn empty() -> Self {
        Self::new(EMPTY, 0.0, 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.name == EMPTY && self.cost == 0.0 && self.points == 0.0
    }

    /// Cost of each expected point. Infinite when no points are expected.
    pub fn cost_per_point(&self) -> f64 {
        if self.points > 0.0 {
            self.cost / self.points
        } else {
            f64::INFINITY
        }
    }
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (cost: {:.1}, points: {:.3})", self.name, self.cost, self.points)
    }
}

/// Picks the talent among `entrants`: the highest-scoring one whose cost does not exceed `threshold`.
/// Ties go to the earliest. Returns the index of the talent within `entrants`.
pub fn select_talent(entrants: &[&Snapshot], threshold: f64) -> Option<usize> {
    let mut talent: Option<usize> = None;
    for (index, entrant) in entrants.iter().enumerate() {
        if entrant.cost > threshold {
            continue;
        }
        match talent {
            Some(best) if entrants[best].points >= entrant.points => {}
            _ => talent = Some(index),
        }
    }
    talent
}

/// Points added to a roster for fielding `talent`, which already contributes its points once.
pub fn talent_bonus(talent: &Snapshot, multiplier: f64) -> f64 {
    (multiplier - 1.0) * talent.points
}

/// Five entrants and a team, with one of the entrants (or the empty placeholder) as the talent.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster<'a> {
    /// Position of this roster in the enumeration order.
    pub ordinal: u64,
    pub entrants: [&'a Snapshot; ROSTER_SIZE],
    pub team: &'a Snapshot,
    pub talent: &'a Snapshot,
    pub cost: f64,
    pub points: f64,
}
impl<'a> Roster<'a> {
    pub fn new(
        ordinal: u64,
        entrants: [&'a Snapshot; ROSTER_SIZE],
        team: &'a Snapshot,
        talent: &'a Snapshot,
        talent_multiplier: f64,
    ) -> Self {
        let cost = entrants.iter().map(|entrant| entrant.cost).sum::<f64>() + team.cost;
        let points = entrants.iter().map(|entrant| entrant.points).sum::<f64>()
            + team.points
            + talent_bonus(talent, talent_multiplier);
        Self {
            ordinal,
            entrants,
            team,
            talent,
            cost,
            points,
        }
    }

    pub fn contains_entrant(&self, name: &str) -> bool {
        self.entrants.iter().any(|entrant| entrant.name == name)
    }
}

impl Display for Roster<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.entrants.iter().map(|entrant| entrant.name.as_str()).collect();
        write!(
            f,
            "[{}] + {}, talent: {}, cost: {:.1}, points: {:.3}",
            names.join(", "),
            self.team.name,
            self.talent.name,
            self.cost,
            self.points
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    fn pool() -> Vec<Snapshot> {
        [(10.0, 50.0), (15.0, 80.0), (18.0, 60.0), (20.0, 90.0), (25.0, 40.0)]
            .into_iter()
            .enumerate()
            .map(|(index, (cost, points))| Snapshot::new(format!("d{index}"), cost, points))
            .collect()
    }

    #[test]
    fn talent_is_best_affordable_entrant() {
        let pool = pool();
        let entrants: Vec<_> = pool.iter().collect();
        assert_eq!(Some(1), select_talent(&entrants, 18.0));
        assert_eq!(Some(0), select_talent(&entrants, 10.0));
        assert_eq!(None, select_talent(&entrants, 9.99));
    }

    #[test]
    fn talent_ties_go_to_the_earliest() {
        let pool = [
            Snapshot::new("a", 10.0, 30.0),
            Snapshot::new("b", 5.0, 40.0),
            Snapshot::new("c", 6.0, 40.0),
        ];
        let entrants: Vec<_> = pool.iter().collect();
        assert_eq!(Some(1), select_talent(&entrants, 18.0));
    }

    #[test]
    fn roster_totals() {
        let pool = pool();
        let team = Snapshot::new("t", 12.0, 35.0);
        let entrants = [&pool[0], &pool[1], &pool[2], &pool[3], &pool[4]];
        let roster = Roster::new(7, entrants, &team, &pool[1], 2.0);
        assert_float_absolute_eq!(100.0, roster.cost, 1e-12);
        assert_float_absolute_eq!(320.0 + 35.0 + 80.0, roster.points, 1e-12);
        assert!(roster.contains_entrant("d3"));
        assert!(!roster.contains_entrant("t"));

        let empty = Snapshot::empty();
        let roster = Roster::new(7, entrants, &team, &empty, 2.0);
        assert_float_absolute_eq!(355.0, roster.points, 1e-12);
    }

    #[test]
    fn talent_multiplier() {
        let talent = Snapshot::new("d", 10.0, 40.0);
        assert_float_absolute_eq!(40.0, talent_bonus(&talent, 2.0), 1e-12);
        assert_float_absolute_eq!(20.0, talent_bonus(&talent, 1.5), 1e-12);
        assert_eq!(0.0, talent_bonus(&Snapshot::empty(), 2.0));
    }

    #[test]
    fn cost_per_point() {
        assert_float_absolute_eq!(0.25, Snapshot::new("d", 10.0, 40.0).cost_per_point(), 1e-12);
        assert_eq!(f64::INFINITY, Snapshot::new("d", 10.0, 0.0).cost_per_point());
        assert!(Snapshot::empty().is_empty());
    }
}
