use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::ensure;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use gridrival::completion::QuartileWeights;
use gridrival::csv::{write_universe, CsvWriter};
use gridrival::data;
use gridrival::file::FromJsonFile;
use gridrival::forecast::{Forecast, ForecastConfig, GridSource};
use gridrival::grid::GridMethod;
use gridrival::market::MarketKind;
use gridrival::optimiser::{Constraints, Member, Solver, SolverConfig};
use gridrival::print;
use gridrival::scoring::{ScoringEngine, ScoringTable};
use gridrival::timed::Timed;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// JSON file of drivers and teams
    #[clap(long, default_value = "data/registry.json")]
    registry: PathBuf,

    /// JSON file of odds books, keyed by market
    #[clap(long, default_value = "data/odds.json")]
    odds: PathBuf,

    /// JSON file of the scoring table; the league defaults apply if omitted
    #[clap(long)]
    scoring: Option<PathBuf>,

    /// maximum cost of the roster
    #[clap(short = 'b', long)]
    budget: f64,

    /// driver or team that must be rostered, as 'driver:NAME' or 'team:NAME'
    #[clap(short = 'i', long)]
    include: Vec<Member>,

    /// driver or team that must not be rostered, as 'driver:NAME' or 'team:NAME'
    #[clap(short = 'x', long)]
    exclude: Vec<Member>,

    /// pole or win market for the qualifying grid; the race grid is reused if the card lacks it
    #[clap(long, default_value = "pole")]
    qualifying_market: MarketKind,

    /// method for deriving the qualifying grid
    #[clap(long, default_value = "naive")]
    qualifying_method: GridMethod,

    /// win or pole market for the race grid
    #[clap(long, default_value = "win")]
    race_market: MarketKind,

    /// method for deriving the race grid
    #[clap(long, default_value = "naive")]
    race_method: GridMethod,

    /// maximum cost of a driver eligible for the talent slot
    #[clap(long, default_value_t = 18e6)]
    talent_threshold: f64,

    /// factor applied to the talent driver's points
    #[clap(long, default_value_t = 2.0)]
    talent_multiplier: f64,

    /// print the expected points of every driver and team by category
    #[clap(long)]
    breakdown: bool,

    /// write every feasible roster to this CSV file
    #[clap(long)]
    universe: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.budget > 0.0, "budget must be positive");
        ensure!(
            self.talent_threshold >= 0.0,
            "talent threshold must not be negative"
        );
        ensure!(
            self.talent_multiplier >= 1.0,
            "talent multiplier must be at least 1"
        );
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let registry = data::read_registry(&args.registry)?;
    let card = data::read_race_card(&args.odds)?;
    let table = match &args.scoring {
        Some(path) => ScoringTable::from_json_file(path)?,
        None => ScoringTable::default(),
    };
    let engine = ScoringEngine::try_from(table)?;

    let forecast_config = ForecastConfig {
        qualifying: GridSource {
            market: args.qualifying_market,
            method: args.qualifying_method,
        },
        race: GridSource {
            market: args.race_market,
            method: args.race_method,
        },
        weights: QuartileWeights::default(),
    };
    let forecast = Forecast::derive(&registry, &card, &forecast_config)?;
    let snapshots = engine.snapshots(&registry, &forecast)?;

    if args.breakdown {
        let mut breakdowns = Vec::with_capacity(registry.entrants().len());
        for id in registry.entrant_ids() {
            breakdowns.push(engine.entrant_breakdown(&registry, &forecast, id)?);
        }
        let rows: Vec<_> = snapshots.entrants.iter().zip(&breakdowns).collect();
        info!(
            "drivers:\n{}",
            Console::default().render(&print::tabulate_breakdowns(&rows))
        );

        let mut breakdowns = Vec::with_capacity(registry.teams().len());
        for id in registry.team_ids() {
            breakdowns.push(engine.team_breakdown(&registry, &forecast, id)?);
        }
        let rows: Vec<_> = snapshots.teams.iter().zip(&breakdowns).collect();
        info!(
            "teams:\n{}",
            Console::default().render(&print::tabulate_breakdowns(&rows))
        );
    }

    let solver_config = SolverConfig {
        talent_cost_threshold: args.talent_threshold,
        talent_multiplier: args.talent_multiplier,
    };
    let solver = Solver::new(&snapshots.entrants, &snapshots.teams, solver_config);
    let constraints = Constraints {
        budget: args.budget,
        include: args.include.clone(),
        exclude: args.exclude.clone(),
    };
    let roster = Timed::result(|| solver.solve(&constraints))?;
    info!(
        "searched {} rosters in {:.3}s",
        solver.rosters(),
        roster.elapsed.as_millis() as f64 / 1_000.
    );
    info!("optimal roster: {}", roster.value);
    info!(
        "\n{}",
        Console::default().render(&print::tabulate_roster(&roster.value, args.talent_multiplier))
    );

    if let Some(path) = &args.universe {
        let universe = solver.universe(&constraints)?;
        let mut writer = CsvWriter::create(path)?;
        write_universe(&mut writer, &universe)?;
        info!("wrote {} feasible rosters to {}", universe.len(), path.display());
    }

    Ok(())
}
