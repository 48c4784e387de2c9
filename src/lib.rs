//! Expected fantasy points for a motorsport race, derived from bookmakers' odds, and an exhaustive
//! search for the roster of five drivers and one team that maximises them within a budget.

pub mod comb;
pub mod completion;
pub mod csv;
pub mod data;
pub mod distribution;
pub mod file;
pub mod forecast;
pub mod grid;
pub mod linear;
pub mod lookup;
pub mod market;
pub mod optimiser;
pub mod print;
pub mod probs;
pub mod registry;
pub mod roster;
pub mod scoring;
pub mod timed;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
