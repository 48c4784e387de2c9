//! Expansion of a single market into a runner × position probability grid.
//!
//! Two methods are offered. [GridMethod::Naive] cascades the win probabilities down the field using a
//! heuristic; it is not derived from a finishing-order model and its output should be read as an
//! approximation rather than a calibrated distribution. [GridMethod::Rank] places each runner
//! deterministically by its price, splitting tied runners evenly across the positions they share.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::trace;

use crate::distribution::{InvalidDistribution, PositionDistribution};
use crate::linear::Matrix;
use crate::market::Market;
use crate::probs::SliceExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GridMethod {
    Naive,
    Rank,
}

/// Probabilities of each runner (row) finishing in each position (column). Rows follow the order of
/// the market's outcomes; column `c` corresponds to position `c + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionGrid {
    pub outcomes: Vec<String>,
    pub probs: Matrix<f64>,
}
impl PositionGrid {
    pub fn derive(method: GridMethod, market: &Market) -> Self {
        let probs = match method {
            GridMethod::Naive => naive(&market.probs),
            GridMethod::Rank => rank(market.odds.prices()),
        };
        Self {
            outcomes: market.outcomes().to_vec(),
            probs,
        }
    }

    pub fn runners(&self) -> usize {
        self.probs.rows()
    }

    pub fn distribution(&self, runner: usize) -> Result<PositionDistribution, InvalidDistribution> {
        PositionDistribution::try_new(self.probs.row_slice(runner).to_vec())
    }

    pub fn distribution_of(
        &self,
        outcome: &str,
    ) -> Option<Result<PositionDistribution, InvalidDistribution>> {
        self.outcomes
            .iter()
            .position(|candidate| candidate == outcome)
            .map(|runner| self.distribution(runner))
    }
}

/// Cascades win probabilities into a full grid. Position 1 takes the win probabilities as given. Each
/// intermediate position weights the runners by `c × (1 − c)`, where `c` is the mass that a runner has
/// accumulated over the preceding positions, normalising the weights to fill the column. No cell may
/// exceed the `1 − c` a runner has left; the excess of a capped runner is shared among the runners that
/// still have room, in proportion to their weights. The last position absorbs whatever each runner has
/// left.
pub fn naive(win_probs: &[f64]) -> Matrix<f64> {
    let runners = win_probs.len();
    let mut grid = Matrix::allocate(runners, runners);
    if runners == 0 {
        return grid;
    }
    if runners == 1 {
        grid[(0, 0)] = 1.0;
        return grid;
    }

    let mut cumulative = win_probs.to_vec();
    for (runner, &prob) in win_probs.iter().enumerate() {
        grid[(runner, 0)] = prob;
    }

    let mut weights = vec![0.0; runners];
    for col in 1..runners - 1 {
        for (weight, &prob) in weights.iter_mut().zip(&cumulative) {
            *weight = f64::max(0.0, prob * (1.0 - prob));
        }
        fill_column(&mut grid, col, &mut weights, &mut cumulative);
        trace!("position {}: {:?}", col + 1, grid.col(col).collect::<Vec<_>>());
    }

    let last = runners - 1;
    for runner in 0..runners {
        grid[(runner, last)] = f64::max(0.0, 1.0 - cumulative[runner]);
    }
    grid
}

/// Distributes a unit of mass over column `col` in proportion to `weights`, capping each runner at its
/// room `1 − cumulative`. Each round either places all the remaining mass or fills at least one more
/// runner, so the loop ends after at most one round per runner and a final one.
fn fill_column(grid: &mut Matrix<f64>, col: usize, weights: &mut [f64], cumulative: &mut [f64]) {
    let mut remaining = 1.0;
    for _ in 0..=weights.len() {
        if remaining <= 0.0 {
            break;
        }
        let mut total: f64 = weights
            .iter()
            .zip(cumulative.iter())
            .filter(|&(_, &prob)| prob < 1.0)
            .map(|(&weight, _)| weight)
            .sum();
        if total <= 0.0 {
            // every open runner has placed with certainty or not at all; weight by room instead
            for (weight, &prob) in weights.iter_mut().zip(cumulative.iter()) {
                *weight = f64::max(0.0, 1.0 - prob);
            }
            total = weights.sum();
            if total <= 0.0 {
                break;
            }
        }

        let mut excess = 0.0;
        for runner in 0..weights.len() {
            if cumulative[runner] >= 1.0 {
                continue;
            }
            let share = remaining * weights[runner] / total;
            let room = 1.0 - cumulative[runner];
            if share >= room {
                grid[(runner, col)] += room;
                cumulative[runner] = 1.0;
                excess += share - room;
            } else {
                grid[(runner, col)] += share;
                cumulative[runner] += share;
            }
        }
        remaining = excess;
    }
}

/// Deterministic placement by price. Runners are ranked by ascending price, with tied runners sharing
/// the lowest rank of their group. A runner ranked `r` in a group of `k` has probability `1/k` for
/// each of the positions `r..r+k`.
pub fn rank(prices: &[f64]) -> Matrix<f64> {
    let runners = prices.len();
    let mut grid = Matrix::allocate(runners, runners);
    for (runner, &price) in prices.iter().enumerate() {
        let better = prices.iter().filter(|&&other| other < price).count();
        let tied = prices.iter().filter(|&&other| other == price).count();
        let share = 1.0 / tied as f64;
        for col in better..better + tied {
            grid[(runner, col)] = share;
        }
    }
    grid
}
