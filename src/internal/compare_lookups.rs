//! Command line front end: builds a session, then benchmarks, narrates or draws it

use std::{error::Error, fs, ops::ControlFlow, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use lookup_lab::{
    AccessPattern, Key, LookupSession, SessionConfig, Spacing, chained_table::DEFAULT_TABLE_SIZE,
};
use rand::{SeedableRng, rngs::StdRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Chart rendering
mod charts;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(
    name = "compare_lookups",
    about = "Compare binary search tree and hash table lookups side by side"
)]
struct Cli {
    /// How the session is populated
    #[command(flatten)]
    population: PopulationArgs,

    /// What to do with the populated session
    #[command(subcommand)]
    command: Command,
}

/// Flags shared by every command
#[derive(Args, Debug)]
struct PopulationArgs {
    /// Keys to insert in order, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    keys: Vec<Key>,

    /// Random batches of 50 keys from 1..=1000 to insert afterwards
    #[arg(long, default_value_t = 0)]
    random_batches: usize,

    /// Insert 10000 keys from 1..=50000 afterwards
    #[arg(long)]
    bulk: bool,

    /// Number of hash table buckets
    #[arg(long, default_value_t = DEFAULT_TABLE_SIZE)]
    table_size: usize,

    /// Rebuild the tree into a minimal-height shape before running the command
    #[arg(long)]
    balance: bool,

    /// Seed for every random choice; omitted means a fresh seed
    #[arg(long)]
    seed: Option<u64>,
}

/// Action run on the populated session
#[derive(Subcommand, Debug)]
enum Command {
    /// Print the statistics panel
    Stats,

    /// Narrate a lookup in both structures
    Search {
        /// Key to look up
        #[arg(allow_hyphen_values = true)]
        key: Key,
    },

    /// Time lookups over the standard sample sizes and chart them
    Bench {
        /// How the looked-up keys are chosen
        #[arg(long, value_enum, default_value_t = PatternArg::Random)]
        pattern: PatternArg,

        /// Largest sample size to run
        #[arg(long, default_value_t = 1_000)]
        max_sample: usize,

        /// Directory the charts are written to
        #[arg(long, default_value = "lookup_charts")]
        out_dir: PathBuf,
    },

    /// Draw the tree and the bucket chains
    Draw {
        /// Scale of the tree drawing, greater than zero
        #[arg(long, default_value_t = 1.0, value_parser = parse_zoom)]
        zoom: f64,

        /// Deepest tree level to draw, the root being level 0; omitted draws every level
        #[arg(long)]
        max_depth: Option<usize>,

        /// Directory the drawings are written to
        #[arg(long, default_value = "lookup_charts")]
        out_dir: PathBuf,
    },
}

/// Access pattern as spelled on the command line
#[derive(ValueEnum, Clone, Copy, Debug)]
enum PatternArg {
    /// Keys drawn from the inserted population
    Random,
    /// The first inserted key, repeated
    Best,
    /// An absent key, repeated
    Worst,
}

impl From<PatternArg> for AccessPattern {
    fn from(pattern: PatternArg) -> Self {
        match pattern {
            PatternArg::Random => Self::Random,
            PatternArg::Best => Self::BestCase,
            PatternArg::Worst => Self::WorstCase,
        }
    }
}

/// Parses a zoom factor, rejecting values that would collapse the drawing
fn parse_zoom(value: &str) -> Result<f64, String> {
    let zoom: f64 = value.parse().map_err(|err| format!("invalid zoom `{value}`: {err}"))?;
    if zoom.is_finite() && zoom > 0.0 {
        Ok(zoom)
    } else {
        Err(format!("zoom must be a finite number greater than 0, got {value}"))
    }
}

/// Builds and fills the session described by the population flags
fn populate(args: &PopulationArgs, rng: &mut StdRng) -> Result<LookupSession, Box<dyn Error>> {
    let mut session = LookupSession::with_config(SessionConfig::with_table_size(args.table_size))?;
    session.insert_all(args.keys.iter().copied());

    for _ in 0..args.random_batches {
        session.insert_random(rng);
    }

    if args.bulk {
        let progress = session.bulk_load(rng, |step| {
            info!(inserted = step.inserted, total = step.total, "bulk load");
            ControlFlow::Continue(())
        });
        info!(inserted = progress.inserted, "bulk load finished");
    }

    if args.balance {
        session.balance();
    }
    Ok(session)
}

/// Entry point
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut rng = cli.population.seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let session = populate(&cli.population, &mut rng)?;
    info!(items = session.log().len(), distinct = session.node_count(), "session ready");

    match cli.command {
        Command::Stats => println!("{}", session.stats()),
        Command::Search { key } => {
            let animation = session.start_search_animation(key);
            println!("BST:");
            for event in &animation.bst {
                println!("  {event}");
            }
            println!("Hash Table:");
            for event in &animation.hash {
                println!("  {event}");
            }

            let timed = session.timed_search(key);
            let verdict = timed.speedup.map_or_else(
                || "Both lookups finished below timer resolution".to_owned(),
                |speedup| {
                    format!(
                        "{} was faster ({:?} vs {:?}, {speedup:.2}x)",
                        timed.faster, timed.bst_time, timed.hash_time
                    )
                },
            );
            println!("{verdict}");
        }
        Command::Bench { pattern, max_sample, out_dir } => {
            fs::create_dir_all(&out_dir)?;
            let pattern = AccessPattern::from(pattern);
            let reports = session.run_sweep(max_sample, pattern, &mut rng)?;

            for report in &reports {
                let ratio = report
                    .speed_ratio
                    .map_or_else(|| "n/a".to_owned(), |ratio| format!("{ratio:.2}x"));
                println!(
                    "{:>6} lookups  BST {:>10?}  Hash {:>10?}  faster: {} ({ratio})",
                    report.sample_size, report.bst_mean, report.hash_mean, report.faster
                );
                let name = format!("{}_{}.png", pattern.to_string().to_lowercase(), report.sample_size);
                charts::draw_report(report, &out_dir.join(name))?;
            }
            charts::draw_summary(&reports, &out_dir.join("summary.png"))?;
            info!(charts = reports.len().saturating_add(1), dir = %out_dir.display(), "charts written");
        }
        Command::Draw { zoom, max_depth, out_dir } => {
            fs::create_dir_all(&out_dir)?;
            let layout = session.compute_layout();
            println!("Showing {} of {} nodes", layout.visible_count(max_depth), layout.len());
            charts::draw_tree(&layout, &Spacing::zoomed(zoom), max_depth, &out_dir.join("tree.svg"))?;
            charts::draw_buckets(session.table(), &out_dir.join("buckets.png"))?;
            info!(dir = %out_dir.display(), "drawings written");
        }
    }

    Ok(())
}
