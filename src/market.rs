//! Books of decimal odds and the removal of the bookmaker's margin.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use tracing::debug;

use crate::lookup::HashLookup;
use crate::probs::SliceExt;

/// The markets that a race card may offer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MarketKind {
    Win,
    Podium,
    Top6,
    PointsFinish,
    Pole,
    Retirement,
}
impl MarketKind {
    /// Whether the book prices a single winner, so that its implied probabilities sum to one.
    pub fn is_outright(self) -> bool {
        matches!(self, MarketKind::Win | MarketKind::Pole)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidOdds {
    #[error("book contains no outcomes")]
    Empty,

    #[error("price {price} for '{outcome}' must be positive and finite")]
    NonPositive { outcome: String, price: f64 },

    #[error("missing outcome '{0}'")]
    MissingOutcome(String),

    #[error("duplicate outcome '{0}'")]
    DuplicateOutcome(String),

    #[error("extraneous outcome '{0}'")]
    ExtraneousOutcome(String),
}

/// An ordered book of decimal prices, keyed by outcome name. The order of outcomes is significant:
/// derived grids retain it and ties are resolved in its favour.
#[derive(Debug, Clone)]
pub struct Odds {
    outcomes: HashLookup<String>,
    prices: Vec<f64>,
}
impl Odds {
    pub fn try_from_pairs<N, I>(pairs: I) -> Result<Self, InvalidOdds>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, f64)>,
    {
        let pairs = pairs.into_iter();
        let (lower, _) = pairs.size_hint();
        let mut outcomes = HashLookup::with_capacity(lower);
        let mut prices = Vec::with_capacity(lower);
        for (outcome, price) in pairs {
            let outcome = outcome.into();
            if outcomes.try_push(outcome.clone()).is_err() {
                return Err(InvalidOdds::DuplicateOutcome(outcome));
            }
            prices.push(price);
        }
        Ok(Self { outcomes, prices })
    }

    pub fn outcomes(&self) -> &[String] {
        self.outcomes.items()
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn price_of(&self, outcome: &str) -> Option<f64> {
        self.outcomes.index_of(outcome).map(|index| self.prices[index])
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Reorders the book to match `names`, failing if any name is absent or if the book carries
    /// outcomes not in `names`.
    pub fn aligned_to<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Odds, InvalidOdds> {
        let mut aligned = Vec::with_capacity(self.len());
        for name in names {
            let price = self
                .price_of(name)
                .ok_or_else(|| InvalidOdds::MissingOutcome(name.to_string()))?;
            aligned.push((name, price));
        }
        if aligned.len() != self.len() {
            let extraneous = self
                .outcomes()
                .iter()
                .find(|outcome| !aligned.iter().any(|(name, _)| *name == outcome.as_str()))
                .cloned()
                .unwrap_or_default();
            return Err(InvalidOdds::ExtraneousOutcome(extraneous));
        }
        Odds::try_from_pairs(aligned)
    }

    fn validate(&self) -> Result<(), InvalidOdds> {
        if self.is_empty() {
            return Err(InvalidOdds::Empty);
        }
        for (outcome, &price) in self.outcomes().iter().zip(&self.prices) {
            if !(price > 0.0 && price.is_finite()) {
                return Err(InvalidOdds::NonPositive {
                    outcome: outcome.clone(),
                    price,
                });
            }
        }
        Ok(())
    }
}

/// A book with its margin removed: implied probabilities are rescaled so that they sum to 1.
#[derive(Debug, Clone)]
pub struct Market {
    pub odds: Odds,
    pub probs: Vec<f64>,
    pub overround: f64,
}
impl Market {
    pub fn fit(odds: &Odds) -> Result<Self, InvalidOdds> {
        odds.validate()?;
        let mut probs: Vec<_> = odds.prices().invert().collect();
        let overround = probs.normalise(1.0);
        debug!("fitted {} outcomes, overround: {overround:.4}", probs.len());
        Ok(Self {
            odds: odds.clone(),
            probs,
            overround,
        })
    }

    pub fn outcomes(&self) -> &[String] {
        self.odds.outcomes()
    }

    pub fn prob_of(&self, outcome: &str) -> Option<f64> {
        self.odds
            .outcomes
            .index_of(outcome)
            .map(|index| self.probs[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_slice_f64_relative;
    use assert_float_eq::*;
    use std::str::FromStr;

    fn book(prices: &[f64]) -> Odds {
        Odds::try_from_pairs(
            prices
                .iter()
                .enumerate()
                .map(|(index, &price)| (format!("r{}", index + 1), price)),
        )
        .unwrap()
    }

    #[test]
    fn fit_fair() {
        let market = Market::fit(&book(&[10.0, 5.0, 3.333, 2.5])).unwrap();
        assert_slice_f64_relative(&[0.1, 0.2, 0.3, 0.4], &market.probs, 0.001);
        assert_float_absolute_eq!(1.0, market.overround, 0.001);
    }

    #[test]
    fn fit_with_margin() {
        let market = Market::fit(&book(&[9.0909, 4.5454, 3.0303, 2.273])).unwrap();
        assert_slice_f64_relative(&[0.1, 0.2, 0.3, 0.4], &market.probs, 0.001);
        assert_float_absolute_eq!(1.1, market.overround, 0.001);
        assert_float_absolute_eq!(1.0, market.probs.sum(), 1e-12);
    }

    #[test]
    fn fit_preserves_ranking() {
        let prices = [2.25, 7.5, 2.25, 1001.0, 41.0, 11.0];
        let market = Market::fit(&book(&prices)).unwrap();
        assert_float_absolute_eq!(1.0, market.probs.sum(), 1e-12);
        for i in 0..prices.len() {
            for j in 0..prices.len() {
                if prices[i] < prices[j] {
                    assert!(market.probs[i] > market.probs[j], "{i} vs {j}");
                } else if prices[i] == prices[j] {
                    assert_eq!(market.probs[i], market.probs[j]);
                }
            }
        }
    }

    #[test]
    fn fit_single_outcome() {
        let market = Market::fit(&book(&[1.5])).unwrap();
        assert_float_absolute_eq!(1.0, market.probs[0], 1e-12);
        assert_float_absolute_eq!(1.0, market.prob_of("r1").unwrap(), 1e-12);
        assert_eq!(None, market.prob_of("r2"));
    }

    #[test]
    fn fit_empty() {
        let odds = Odds::try_from_pairs(Vec::<(String, f64)>::new()).unwrap();
        assert_eq!(InvalidOdds::Empty, Market::fit(&odds).unwrap_err());
    }

    #[test]
    fn fit_non_positive() {
        assert_eq!(
            InvalidOdds::NonPositive {
                outcome: "r2".into(),
                price: 0.0
            },
            Market::fit(&book(&[2.0, 0.0, 3.0])).unwrap_err()
        );
        assert!(matches!(
            Market::fit(&book(&[2.0, -1.0])).unwrap_err(),
            InvalidOdds::NonPositive { .. }
        ));
    }

    #[test]
    fn duplicate_outcome() {
        let err = Odds::try_from_pairs([("a", 2.0), ("b", 3.0), ("a", 4.0)]).unwrap_err();
        assert_eq!(InvalidOdds::DuplicateOutcome("a".into()), err);
        assert_eq!("duplicate outcome 'a'", err.to_string());
    }

    #[test]
    fn aligned_to() {
        let odds = Odds::try_from_pairs([("a", 2.0), ("b", 3.0), ("c", 4.0)]).unwrap();
        let aligned = odds.aligned_to(["c", "a", "b"]).unwrap();
        assert_eq!(&["c", "a", "b"], aligned.outcomes());
        assert_eq!(&[4.0, 2.0, 3.0], aligned.prices());

        assert_eq!(
            InvalidOdds::MissingOutcome("d".into()),
            odds.aligned_to(["a", "d"]).unwrap_err()
        );
        assert_eq!(
            InvalidOdds::ExtraneousOutcome("c".into()),
            odds.aligned_to(["a", "b"]).unwrap_err()
        );
    }

    #[test]
    fn market_kind_from_str() {
        assert_eq!(MarketKind::Top6, MarketKind::from_str("top6").unwrap());
        assert_eq!(MarketKind::PointsFinish, MarketKind::from_str("points_finish").unwrap());
        assert_eq!("retirement", MarketKind::Retirement.to_string());
    }

    #[test]
    fn outright_markets() {
        assert!(MarketKind::Win.is_outright());
        assert!(MarketKind::Pole.is_outright());
        assert!(!MarketKind::Podium.is_outright());
        assert!(!MarketKind::PointsFinish.is_outright());
        assert!(!MarketKind::Retirement.is_outright());
    }
}
