//! Roam Simulation Runner
//!
//! Generates a population, runs it for a number of ticks and writes
//! snapshots and statistics.

use clap::Parser;
use roam_core::output::{write_stats, SnapshotWriter, StatsCollector, DEFAULT_OUTPUT_DIR};
use roam_core::{Config, Engine, EntityId, MotionPolicyKind, PopulationSnapshot, TickReport, TickScheduler};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "roam_sim")]
#[command(about = "Geographic movement simulation")]
struct Args {
    /// Configuration file (defaults to roam.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate; 0 with --realtime runs until Ctrl-C
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Number of entities to generate
    #[arg(long)]
    population: Option<usize>,

    /// Motion policy: path_following or random_walk
    #[arg(long)]
    policy: Option<MotionPolicyKind>,

    /// Pace ticks on the wall clock instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Directory for snapshots and stats
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Search display names after the run and follow the first match
    #[arg(long)]
    search: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    tracing::info!(
        "Seed {}, population {}, {} policy, {} s/tick",
        config.simulation.seed,
        config.simulation.population,
        config.motion.policy.as_str(),
        config.simulation.tick_seconds
    );

    let population = config.simulation.population;
    let snapshot_interval = config.simulation.snapshot_interval;
    let engine = Arc::new(Engine::new(config)?);
    engine.generate_population(population)?;

    let mut writer = SnapshotWriter::new(&args.output_dir, snapshot_interval);
    let mut stats = StatsCollector::new();
    writer.write_snapshot(&engine.snapshot())?;

    {
        let total = args.ticks;
        let mut on_tick = |report: &TickReport, snapshot: &Arc<PopulationSnapshot>| {
            stats.record_tick(report);
            if let Err(e) = writer.maybe_write(snapshot) {
                tracing::warn!("Could not write snapshot at tick {}: {}", report.tick, e);
            }
            if report.tick % 100 == 0 {
                tracing::info!(
                    "Tick {} / {}: mean speed {:.1} km/h, {} legs re-planned",
                    report.tick,
                    total,
                    report.mean_speed_kmh,
                    report.replanned
                );
            }
        };

        if args.realtime {
            let scheduler = TickScheduler::new(Arc::clone(&engine));
            if args.ticks == 0 {
                let shutdown = async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::warn!("Could not listen for Ctrl-C: {}", e);
                    }
                };
                scheduler.run_until(shutdown, on_tick).await;
            } else {
                scheduler.run_ticks(args.ticks, on_tick).await;
            }
        } else {
            for _ in 0..args.ticks {
                let report = engine.tick();
                on_tick(&report, &engine.snapshot());
            }
        }
    }

    if let Some(query) = &args.search {
        report_search(&engine, query)?;
    }

    let final_snapshot = engine.snapshot();
    writer.write_current_state(&final_snapshot)?;
    let stats_path = write_stats(&stats.generate_stats(), &args.output_dir)?;

    tracing::info!(
        "Simulation complete. Ran {} ticks, wrote {} snapshots to {} and {}",
        final_snapshot.tick,
        writer.snapshot_count(),
        writer.snapshots_dir().display(),
        stats_path.display()
    );
    Ok(())
}

/// File config with command line overrides applied
fn load_config(args: &Args) -> Result<Config, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };

    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(population) = args.population {
        config.simulation.population = population;
    }
    if let Some(policy) = args.policy {
        config.motion.policy = policy;
    }

    config.validate()?;
    Ok(config)
}

fn report_search(engine: &Engine, query: &str) -> Result<(), Box<dyn Error>> {
    let outcome = engine.search(query);
    let results = outcome.results();

    println!();
    println!("Search \"{}\": {} match(es)", query, results.len());
    for entity in results {
        println!("  {} {} at {}", entity.id, entity.display_name, entity.position());
    }

    if let Some(first) = results.first() {
        engine.choose_search_result(&EntityId::new(first.id.clone()))?;
    }
    if let Some(followed) = engine.followed_entity() {
        println!(
            "Following {} at {} ({:.0} km/h)",
            followed.display_name,
            followed.position(),
            followed.speed_kmh
        );
    }
    Ok(())
}
