//! Per-entrant qualifying, race and completion distributions, derived from the odds books of a race
//! card and held in registry order.

use std::iter;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::completion::{CompletionError, CompletionModel, QuartileWeights, NO_RETIREMENT};
use crate::distribution::{CompletionDistribution, InvalidDistribution, PositionDistribution};
use crate::grid::{GridMethod, PositionGrid};
use crate::market::{InvalidOdds, Market, MarketKind, Odds};
use crate::registry::{EntrantId, Registry};

/// The odds books of a single race, keyed by market.
pub type RaceCard = FxHashMap<MarketKind, Odds>;

#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    #[error("no '{0}' market on the race card")]
    MissingMarket(MarketKind),

    #[error("'{0}' market does not price a single winner and cannot seed a position grid")]
    UnsupportedGridMarket(MarketKind),

    #[error("{0}")]
    Odds(#[from] InvalidOdds),

    #[error("{0}")]
    Distribution(#[from] InvalidDistribution),

    #[error("{0}")]
    Completion(#[from] CompletionError),
}

/// Which market a grid is derived from, and how. Only outright markets (win or pole) are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSource {
    pub market: MarketKind,
    pub method: GridMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Source of the qualifying grid. When its market is absent from the card, the race grid is
    /// reused.
    pub qualifying: GridSource,
    pub race: GridSource,
    #[serde(default)]
    pub weights: QuartileWeights,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            qualifying: GridSource {
                market: MarketKind::Pole,
                method: GridMethod::Naive,
            },
            race: GridSource {
                market: MarketKind::Win,
                method: GridMethod::Naive,
            },
            weights: QuartileWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntrantProbs {
    pub qualifying: PositionDistribution,
    pub race: PositionDistribution,
    pub completion: CompletionDistribution,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    entrants: Vec<EntrantProbs>,
}
impl Forecast {
    /// A forecast over entrants in registry order.
    pub fn new(entrants: Vec<EntrantProbs>) -> Self {
        Self { entrants }
    }

    pub fn derive(
        registry: &Registry,
        card: &RaceCard,
        config: &ForecastConfig,
    ) -> Result<Self, ForecastError> {
        for source in [&config.race, &config.qualifying] {
            if !source.market.is_outright() {
                return Err(ForecastError::UnsupportedGridMarket(source.market));
            }
        }

        let race = derive_grid(registry, card, &config.race)?
            .ok_or(ForecastError::MissingMarket(config.race.market))?;
        let qualifying = match derive_grid(registry, card, &config.qualifying)? {
            Some(grid) => grid,
            None => {
                info!(
                    "no '{}' market; qualifying follows the race grid",
                    config.qualifying.market
                );
                race.clone()
            }
        };

        let completions = match card.get(&MarketKind::Retirement) {
            Some(odds) => {
                let names = registry.entrant_names().chain(iter::once(NO_RETIREMENT));
                let odds = odds.aligned_to(names)?;
                CompletionModel::new(config.weights.clone())
                    .derive(&odds)?
                    .into_iter()
                    .map(|runner| runner.completion)
                    .collect()
            }
            None => {
                info!("no '{}' market; every entrant is assumed to finish", MarketKind::Retirement);
                vec![CompletionDistribution::certain(); registry.entrants().len()]
            }
        };

        let entrants = completions
            .into_iter()
            .enumerate()
            .map(|(runner, completion)| {
                Ok(EntrantProbs {
                    qualifying: qualifying.distribution(runner)?,
                    race: race.distribution(runner)?,
                    completion,
                })
            })
            .collect::<Result<Vec<_>, ForecastError>>()?;
        Ok(Self { entrants })
    }

    pub fn entrant(&self, id: EntrantId) -> &EntrantProbs {
        &self.entrants[id.index()]
    }

    pub fn entrants(&self) -> &[EntrantProbs] {
        &self.entrants
    }

    pub fn len(&self) -> usize {
        self.entrants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrants.is_empty()
    }
}

/// Derives the grid for `source`, with rows in registry order, or `None` if the card lacks the market.
fn derive_grid(
    registry: &Registry,
    card: &RaceCard,
    source: &GridSource,
) -> Result<Option<PositionGrid>, ForecastError> {
    let Some(odds) = card.get(&source.market) else {
        return Ok(None);
    };
    let market = Market::fit(&odds.aligned_to(registry.entrant_names())?)?;
    debug!(
        "{} market: overround {:.3}, {} method",
        source.market, market.overround, source.method
    );
    Ok(Some(PositionGrid::derive(source.method, &market)))
}
