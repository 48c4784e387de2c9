//! Loading of registries and race cards from their JSON file formats.

use std::path::Path;

use anyhow::Context;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::file::FromJsonFile;
use crate::forecast::RaceCard;
use crate::market::{InvalidOdds, MarketKind, Odds};
use crate::registry::{Entrant, Registry, RegistryError, TeamEntry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryFile {
    pub drivers: Vec<Entrant>,
    pub teams: Vec<TeamEntry>,
}
impl RegistryFile {
    pub fn into_registry(self) -> Result<Registry, RegistryError> {
        Registry::try_new(self.drivers, self.teams)
    }
}

/// Books keyed by market, each an ordered list of `[outcome, price]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsFile(pub FxHashMap<MarketKind, Vec<(String, f64)>>);
impl OddsFile {
    pub fn into_race_card(self) -> Result<RaceCard, InvalidOdds> {
        self.0
            .into_iter()
            .map(|(market, book)| Ok((market, Odds::try_from_pairs(book)?)))
            .collect()
    }
}

pub fn read_registry(path: impl AsRef<Path>) -> anyhow::Result<Registry> {
    let path = path.as_ref();
    let file = RegistryFile::from_json_file(path)
        .with_context(|| format!("reading registry from {}", path.display()))?;
    let registry = file.into_registry()?;
    debug!(
        "loaded {} entrants and {} teams from {}",
        registry.entrants().len(),
        registry.teams().len(),
        path.display()
    );
    Ok(registry)
}

pub fn read_race_card(path: impl AsRef<Path>) -> anyhow::Result<RaceCard> {
    let path = path.as_ref();
    let file = OddsFile::from_json_file(path)
        .with_context(|| format!("reading odds from {}", path.display()))?;
    let card = file.into_race_card()?;
    debug!("loaded {} markets from {}", card.len(), path.display());
    Ok(card)
}
