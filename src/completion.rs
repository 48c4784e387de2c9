//! Derivation of race completion probabilities from a "first to retire" market.
//!
//! The book is expected to carry a synthetic [NO_RETIREMENT] outcome alongside the runners. Treating
//! retirements as `N` independent low-probability events, the probability that nobody retires gives the
//! average per-runner retirement probability `1 − p_none^(1/N)`; the first-to-retire shares are then
//! rescaled to total `N` times that average, and each runner's retirement probability is spread across
//! the race quartiles.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::distribution::{CompletionDistribution, InvalidDistribution, QUARTILES, TOLERANCE};
use crate::market::{InvalidOdds, Market, Odds};
use crate::probs::SliceExt;

/// Name of the synthetic outcome representing a race without retirements.
pub const NO_RETIREMENT: &str = "No retirement";

#[derive(Debug, Error, PartialEq)]
pub enum CompletionError {
    #[error("{0}")]
    Odds(#[from] InvalidOdds),

    #[error("{0}")]
    Distribution(#[from] InvalidDistribution),

    #[error("quartile weights {0:?} must be non-negative and sum to 1")]
    InvalidWeights([f64; QUARTILES]),
}

/// Share of retirements falling within each quartile of the race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; QUARTILES]", into = "[f64; QUARTILES]")]
pub struct QuartileWeights([f64; QUARTILES]);
impl QuartileWeights {
    pub fn try_new(weights: [f64; QUARTILES]) -> Result<Self, CompletionError> {
        if weights.iter().any(|&weight| weight < 0.0) || (weights.sum() - 1.0).abs() > TOLERANCE {
            return Err(CompletionError::InvalidWeights(weights));
        }
        Ok(Self(weights))
    }

    pub fn weights(&self) -> &[f64; QUARTILES] {
        &self.0
    }
}

impl Default for QuartileWeights {
    fn default() -> Self {
        Self([0.5, 0.25, 0.125, 0.125])
    }
}

impl TryFrom<[f64; QUARTILES]> for QuartileWeights {
    type Error = CompletionError;

    fn try_from(weights: [f64; QUARTILES]) -> Result<Self, Self::Error> {
        Self::try_new(weights)
    }
}

impl From<QuartileWeights> for [f64; QUARTILES] {
    fn from(weights: QuartileWeights) -> Self {
        weights.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerCompletion {
    pub runner: String,
    pub retirement: f64,
    pub completion: CompletionDistribution,
}

#[derive(Debug, Default)]
pub struct CompletionModel {
    pub weights: QuartileWeights,
}
impl CompletionModel {
    pub fn new(weights: QuartileWeights) -> Self {
        Self { weights }
    }

    /// Derives the completion distribution of every runner in `odds`, in book order, omitting the
    /// synthetic [NO_RETIREMENT] outcome.
    pub fn derive(&self, odds: &Odds) -> Result<Vec<RunnerCompletion>, CompletionError> {
        if odds.price_of(NO_RETIREMENT).is_none() {
            return Err(InvalidOdds::MissingOutcome(NO_RETIREMENT.to_string()).into());
        }
        let market = Market::fit(odds)?;
        let runners = market.probs.len() - 1;
        if runners == 0 {
            return Ok(vec![]);
        }

        let no_retirement = market.prob_of(NO_RETIREMENT).unwrap_or(1.0);
        let average = 1.0 - no_retirement.powf(1.0 / runners as f64);
        let first_retirement = 1.0 - no_retirement;
        let scale = if first_retirement > 0.0 {
            average * runners as f64 / first_retirement
        } else {
            0.0
        };
        debug!(
            "no retirement: {no_retirement:.4}, average retirement: {average:.4}, expected retirements: {:.3}",
            average * runners as f64
        );

        market
            .outcomes()
            .iter()
            .zip(&market.probs)
            .filter(|(runner, _)| *runner != NO_RETIREMENT)
            .map(|(runner, &prob)| {
                let retirement = prob * scale;
                let completion = self.split(retirement)?;
                Ok(RunnerCompletion {
                    runner: runner.clone(),
                    retirement,
                    completion,
                })
            })
            .collect()
    }

    /// Spreads an overall retirement probability across the quartiles, yielding the probability of
    /// completing at least each quartile.
    pub fn split(&self, retirement: f64) -> Result<CompletionDistribution, InvalidDistribution> {
        let mut probs = [0.0; QUARTILES];
        let mut retired = 0.0;
        for (prob, weight) in probs.iter_mut().zip(self.weights.weights()) {
            retired += *weight;
            *prob = 1.0 - retirement * retired;
        }
        probs[QUARTILES - 1] = 1.0 - retirement;
        CompletionDistribution::try_new(probs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_slice_f64_absolute;
    use assert_float_eq::*;

    fn odds() -> Odds {
        Odds::try_from_pairs([("A", 5.0), ("B", 10.0), (NO_RETIREMENT, 1.5), ("C", 20.0)]).unwrap()
    }

    #[test]
    fn derive() {
        let completions = CompletionModel::default().derive(&odds()).unwrap();
        assert_eq!(
            vec!["A", "B", "C"],
            completions
                .iter()
                .map(|completion| completion.runner.as_str())
                .collect::<Vec<_>>()
        );
        assert_slice_f64_absolute(
            &[0.8875261215987864, 0.8312891823981796, 0.8031707127978762, 0.7750522431975728],
            completions[0].completion.probs(),
            1e-9,
        );
        assert_slice_f64_absolute(
            &[0.9718815303996966, 0.9578222955995449, 0.9507926781994691, 0.9437630607993932],
            completions[2].completion.probs(),
            1e-9,
        );
    }

    #[test]
    fn expected_retirements_match_no_retirement_odds() {
        let completions = CompletionModel::default().derive(&odds()).unwrap();
        let expected: f64 = completions.iter().map(|completion| completion.retirement).sum();
        let no_retirement = (1.0 / 1.5) / (1.0 / 5.0 + 1.0 / 10.0 + 1.0 / 20.0 + 1.0 / 1.5);
        let average = 1.0 - f64::powf(no_retirement, 1.0 / 3.0);
        assert_float_absolute_eq!(3.0 * average, expected, 1e-12);
    }

    #[test]
    fn completion_is_non_increasing_and_ends_at_full_distance() {
        for completion in CompletionModel::default().derive(&odds()).unwrap() {
            let probs = completion.completion.probs();
            for quartile in 1..QUARTILES {
                assert!(probs[quartile] <= probs[quartile - 1]);
            }
            assert_float_absolute_eq!(
                1.0 - completion.retirement,
                completion.completion.full_distance(),
                1e-12
            );
            assert_float_absolute_eq!(
                completion.retirement,
                completion.completion.retirement(),
                1e-12
            );
        }
    }

    #[test]
    fn missing_no_retirement() {
        let odds = Odds::try_from_pairs([("A", 5.0), ("B", 10.0)]).unwrap();
        assert_eq!(
            CompletionError::Odds(InvalidOdds::MissingOutcome(NO_RETIREMENT.into())),
            CompletionModel::default().derive(&odds).unwrap_err()
        );
    }

    #[test]
    fn non_positive_odds() {
        let odds = Odds::try_from_pairs([("A", 0.0), (NO_RETIREMENT, 1.5)]).unwrap();
        assert!(matches!(
            CompletionModel::default().derive(&odds).unwrap_err(),
            CompletionError::Odds(InvalidOdds::NonPositive { .. })
        ));
    }

    #[test]
    fn only_no_retirement() {
        let odds = Odds::try_from_pairs([(NO_RETIREMENT, 1.01)]).unwrap();
        assert!(CompletionModel::default().derive(&odds).unwrap().is_empty());
    }

    #[test]
    fn split_with_custom_weights() {
        let weights = QuartileWeights::try_new([0.25, 0.25, 0.25, 0.25]).unwrap();
        let model = CompletionModel::new(weights);
        let completion = model.split(0.4).unwrap();
        assert_slice_f64_absolute(&[0.9, 0.8, 0.7, 0.6], completion.probs(), 1e-12);
    }

    #[test]
    fn split_certain_retirement_beyond_one() {
        assert!(matches!(
            CompletionModel::default().split(1.2).unwrap_err(),
            InvalidDistribution::OutOfRange { quartile: 3, .. }
        ));
    }

    #[test]
    fn invalid_weights() {
        assert_eq!(
            CompletionError::InvalidWeights([0.5, 0.5, 0.5, 0.0]),
            QuartileWeights::try_new([0.5, 0.5, 0.5, 0.0]).unwrap_err()
        );
        assert!(QuartileWeights::try_new([-0.5, 1.0, 0.5, 0.0]).is_err());
    }
}
