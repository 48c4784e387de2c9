//! Validated probability distributions over finishing positions and race completion.

use std::ops::Index;

use thiserror::Error;

use crate::probs::SliceExt;

/// Permitted deviation of a distribution's sum from unity, and of any probability below zero.
pub const TOLERANCE: f64 = 1e-6;

/// Number of race quartiles tracked for completion.
pub const QUARTILES: usize = 4;

#[derive(Debug, Error, PartialEq)]
pub enum InvalidDistribution {
    #[error("distribution contains no positions")]
    Empty,

    #[error("probabilities sum to {sum}, expected 1")]
    Degenerate { sum: f64 },

    #[error("negative probability {prob} at position {position}")]
    Negative { position: usize, prob: f64 },

    #[error("completion probability {prob} for quartile {quartile} lies outside [0, 1]")]
    OutOfRange { quartile: usize, prob: f64 },

    #[error("completion probability for quartile {quartile} exceeds that of the preceding quartile")]
    Increasing { quartile: usize },
}

/// Probability of finishing in each position, where `probs[0]` is the probability of first place.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionDistribution {
    probs: Vec<f64>,
}
impl PositionDistribution {
    pub fn try_new(probs: Vec<f64>) -> Result<Self, InvalidDistribution> {
        if probs.is_empty() {
            return Err(InvalidDistribution::Empty);
        }
        for (index, &prob) in probs.iter().enumerate() {
            if prob < -TOLERANCE || prob.is_nan() {
                return Err(InvalidDistribution::Negative {
                    position: index + 1,
                    prob,
                });
            }
        }
        let sum = probs.sum();
        if (sum - 1.0).abs() > TOLERANCE {
            return Err(InvalidDistribution::Degenerate { sum });
        }
        Ok(Self { probs })
    }

    /// A uniform distribution across `positions` positions.
    pub fn uniform(positions: usize) -> Self {
        assert!(positions > 0, "at least one position is required");
        Self {
            probs: vec![1.0 / positions as f64; positions],
        }
    }

    pub fn positions(&self) -> usize {
        self.probs.len()
    }

    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    /// Probability of finishing in `position`, numbered from 1. Positions beyond the field have zero
    /// probability.
    pub fn at(&self, position: usize) -> f64 {
        debug_assert!(position > 0, "positions are numbered from 1");
        self.probs.get(position - 1).copied().unwrap_or(0.0)
    }

    /// The distribution of this runner conditional on not occupying `position`, or `None` if
    /// all the probability mass lies in `position`.
    pub fn excluding(&self, position: usize) -> Option<PositionDistribution> {
        let mut probs = self.probs.clone();
        if let Some(prob) = probs.get_mut(position - 1) {
            *prob = 0.0;
        }
        let remaining = probs.sum();
        if remaining <= 0.0 {
            return None;
        }
        probs.scale(1.0 / remaining);
        Some(Self { probs })
    }
}

impl Index<usize> for PositionDistribution {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.probs[index]
    }
}

/// Probability of completing at least each quartile of the race.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionDistribution {
    probs: [f64; QUARTILES],
}
impl CompletionDistribution {
    pub fn try_new(probs: [f64; QUARTILES]) -> Result<Self, InvalidDistribution> {
        for (index, &prob) in probs.iter().enumerate() {
            if !(-TOLERANCE..=1.0 + TOLERANCE).contains(&prob) {
                return Err(InvalidDistribution::OutOfRange {
                    quartile: index + 1,
                    prob,
                });
            }
            if index > 0 && prob > probs[index - 1] + TOLERANCE {
                return Err(InvalidDistribution::Increasing { quartile: index + 1 });
            }
        }
        Ok(Self { probs })
    }

    /// Every quartile is completed with certainty.
    pub fn certain() -> Self {
        Self {
            probs: [1.0; QUARTILES],
        }
    }

    pub fn probs(&self) -> &[f64; QUARTILES] {
        &self.probs
    }

    /// Probability of completing the full race.
    pub fn full_distance(&self) -> f64 {
        self.probs[QUARTILES - 1]
    }

    /// Probability of retiring at any stage.
    pub fn retirement(&self) -> f64 {
        1.0 - self.full_distance()
    }
}
