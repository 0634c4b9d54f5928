//! Cognitive Core - command-line runner
//!
//! Runs the cognition loop over a graph snapshot or a seeded demo graph.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cognitive_core::cognition::{
    CognitionLoop, CognitionRunner, JournalSink, JsonlJournal, MemoryJournal,
};
use cognitive_core::concepts::GraphSnapshot;
use cognitive_core::events::EventBus;
use cognitive_core::graph::{category_connectivity, compute_metrics, ConceptGraph};
use cognitive_core::memory::SystemClock;
use cognitive_core::{demo, Config, Organism};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cognitive-core")]
#[command(about = "Concept-graph cognition loop")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the cognition loop until Ctrl-C (or --cycles)
    Run {
        /// YAML config file (defaults to ./cognition.yaml when present)
        #[arg(short, long, env = "COGNITION_CONFIG")]
        config: Option<PathBuf>,

        /// Graph snapshot (JSON) to start from
        #[arg(short, long, conflicts_with = "demo")]
        graph: Option<PathBuf>,

        /// Start from a seeded demo graph with N concepts
        #[arg(long)]
        demo: Option<usize>,

        /// Stop after N cycles
        #[arg(long)]
        cycles: Option<u64>,

        /// Write the final graph snapshot here on exit
        #[arg(long)]
        save_graph: Option<PathBuf>,
    },

    /// Print statistics for a graph snapshot
    Inspect {
        #[arg(short, long)]
        graph: PathBuf,

        /// Number of top bridge concepts to list
        #[arg(long, default_value = "5")]
        top: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,cognitive_core=debug".into());
    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    match cli.command {
        Commands::Run {
            config,
            graph,
            demo,
            cycles,
            save_graph,
        } => {
            let config = Config::from_yaml_and_env(config.as_deref())?;
            run(config, graph.as_deref(), demo, cycles, save_graph.as_deref()).await
        }
        Commands::Inspect { graph, top } => inspect(&graph, top),
    }
}

fn read_snapshot(path: &Path) -> Result<GraphSnapshot> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid graph snapshot {}", path.display()))
}

async fn run(
    config: Config,
    graph: Option<&Path>,
    demo_size: Option<usize>,
    cycles: Option<u64>,
    save_graph: Option<&Path>,
) -> Result<()> {
    let organism = match (graph, demo_size) {
        (Some(path), _) => {
            let snapshot = read_snapshot(path)?;
            Organism::from_snapshot(&config, &snapshot, Arc::new(SystemClock))?
        }
        (None, Some(size)) => {
            let mut organism = Organism::new(&config);
            demo::populate(organism.store_mut(), size, config.rng_seed)?;
            organism
        }
        (None, None) => bail!("Nothing to run on: pass --graph <file> or --demo <N>"),
    };
    tracing::info!(
        concepts = organism.store().len(),
        relations = organism.store().relation_count(),
        "Graph loaded"
    );

    let journal: Arc<dyn JournalSink> = match &config.cognition.journal_path {
        Some(path) => {
            tracing::info!("Writing diary to {}", path.display());
            Arc::new(JsonlJournal::new(path))
        }
        None => Arc::new(MemoryJournal::new()),
    };

    let shared = organism.into_shared();
    let cognition = CognitionLoop::new(
        shared.clone(),
        config.cognition.clone(),
        journal,
        config.rng_seed.wrapping_add(4),
    )
    .with_events(Arc::new(EventBus::default()));

    let token = CancellationToken::new();
    let runner = CognitionRunner::spawn(cognition, token.clone(), cycles);

    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, stopping after the current cycle");
            ctrl_c_token.cancel();
        }
    });

    let cognition = runner.join().await?;
    tracing::info!(cycles = cognition.cycle(), "Run finished");

    if let Some(path) = save_graph {
        let snapshot = shared.read().await.store().snapshot();
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write graph {}", path.display()))?;
        tracing::info!("Graph saved to {}", path.display());
    }
    Ok(())
}

fn inspect(path: &Path, top: usize) -> Result<()> {
    let snapshot = read_snapshot(path)?;
    let config = Config::default();
    let organism = Organism::from_snapshot(&config, &snapshot, Arc::new(SystemClock))?;
    let store = organism.store();

    println!(
        "{} concepts, {} relations, {} dimensions, cycle {}",
        store.len(),
        store.relation_count(),
        snapshot.dimensions,
        snapshot.cycle
    );

    println!("\nCategories:");
    for stats in category_connectivity(store) {
        println!(
            "  {:<12} {:>4} members, mean degree {:.2}, least connected: {}",
            stats.category.to_string(),
            stats.members,
            stats.mean_degree,
            stats.least_connected
        );
    }

    let metrics = compute_metrics(&ConceptGraph::from_store(store));
    let mut bridges: Vec<_> = metrics.into_iter().collect();
    bridges.sort_by(|a, b| b.1.betweenness.total_cmp(&a.1.betweenness));
    println!("\nTop bridges:");
    for (name, m) in bridges.into_iter().take(top) {
        println!(
            "  {:<20} betweenness {:.3}, degree {:.3}",
            name, m.betweenness, m.degree_centrality
        );
    }
    Ok(())
}
