use anyhow::{Context as AnyhowContext, Result};
use batch::{collect_metadata, ChunkEmitter};
use clap::{Args, Parser, Subcommand};
use config::DepchunkConfig;
use depchunk_graph::{DependencyEdge, FqnCollision, ParseFailure, ResolutionPhase};
use depchunk_indexer::{path_string, IndexStats, ProjectIndexer};
use depchunk_protocol::jsonl::{changed_main_files, parse_records, write_records};
use depchunk_protocol::{
    chunk_record_schema, parse_metadata, serialize_json_pretty, RECORD_SCHEMA_VERSION,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

mod batch;
mod config;

#[derive(Parser)]
#[command(name = "depchunk")]
#[command(
    about = "File-level dependency graphs and token-bounded chunks for Java projects",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file (TOML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// tokenizer.json used for token counting (overrides the config file)
    #[arg(long, global = true)]
    tokenizer: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dependency graph of one project as JSON
    Graph(GraphArgs),

    /// Measure every project in a directory and write size metadata
    Metadata(MetadataArgs),

    /// Pack projects into chunk records, appended per size class
    Chunks(ChunksArgs),

    /// Keep new records whose main file's dependency count changed
    Diff(DiffArgs),

    /// Print the JSON schema of a chunk record
    Schema,
}

#[derive(Args)]
struct GraphArgs {
    /// Project root (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Include every edge with the phase that resolved it
    #[arg(long)]
    edges: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct MetadataArgs {
    /// Directory whose sub-directories are projects
    projects_dir: PathBuf,

    /// Metadata file to write
    #[arg(short, long, default_value = "metadata.json")]
    output: PathBuf,
}

#[derive(Args)]
struct ChunksArgs {
    /// Directory whose sub-directories are projects
    projects_dir: PathBuf,

    /// Metadata file from `depchunk metadata` (measured on the fly when absent)
    #[arg(short, long)]
    metadata: Option<PathBuf>,

    /// Directory receiving small.jsonl, medium.jsonl and large.jsonl
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// First numeric project id
    #[arg(long, default_value_t = 0)]
    first_id: u64,
}

#[derive(Args)]
struct DiffArgs {
    /// Records from the previous run
    old: PathBuf,

    /// Records from the current run
    new: PathBuf,

    /// File receiving the changed records
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Serialize)]
struct GraphReport {
    root: String,
    stats: IndexStats,
    /// Edge count per resolution phase, every phase listed
    phases: BTreeMap<&'static str, usize>,
    files: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    edges: Option<Vec<DependencyEdge>>,
    failures: Vec<ParseFailure>,
    collisions: Vec<FqnCollision>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = match &cli.config {
        Some(path) => DepchunkConfig::load(path)?,
        None => DepchunkConfig::default(),
    };
    if let Some(tokenizer) = cli.tokenizer {
        config.tokenizer = Some(tokenizer);
    }

    match cli.command {
        Commands::Graph(args) => run_graph(args, &config).await?,
        Commands::Metadata(args) => run_metadata(args, &config).await?,
        Commands::Chunks(args) => run_chunks(args, &config).await?,
        Commands::Diff(args) => run_diff(args).await?,
        Commands::Schema => run_schema()?,
    }

    Ok(())
}

async fn run_graph(args: GraphArgs, config: &DepchunkConfig) -> Result<()> {
    let root = args.path.canonicalize().context("Invalid project path")?;
    let indexer = ProjectIndexer::new(&root, config.indexer_config()).await?;
    let project = indexer.build().await?;

    let files = project
        .graph
        .to_adjacency()
        .into_iter()
        .map(|(path, deps)| {
            let deps = deps.iter().map(|dep| path_string(dep)).collect();
            (path_string(&path), deps)
        })
        .collect();

    let counts = project.graph.phase_counts();
    let phases = ResolutionPhase::ALL
        .iter()
        .map(|phase| (phase.as_str(), counts.get(phase).copied().unwrap_or(0)))
        .collect();

    let report = GraphReport {
        root: path_string(&root),
        stats: project.stats.clone(),
        phases,
        files,
        edges: args.edges.then(|| project.graph.edges()),
        failures: project.failures.clone(),
        collisions: project.index.collisions().to_vec(),
    };

    let json = serialize_json_pretty(&report)?;
    match args.output {
        Some(path) => {
            tokio::fs::write(&path, json + "\n")
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} files, {} edges, {} parse failures -> {}",
                project.stats.parsed_files(),
                project.stats.edges,
                project.stats.parse_failures,
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn run_metadata(args: MetadataArgs, config: &DepchunkConfig) -> Result<()> {
    let counter = config.token_counter()?;
    let metadata = collect_metadata(&args.projects_dir, config, counter.as_ref()).await?;

    let json = serialize_json_pretty(&metadata)?;
    tokio::fs::write(&args.output, json + "\n")
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    eprintln!(
        "Processed {} projects. Metadata saved to {}",
        metadata.len(),
        args.output.display()
    );
    Ok(())
}

async fn run_chunks(args: ChunksArgs, config: &DepchunkConfig) -> Result<()> {
    let counter = config.token_counter()?;

    let metadata = match &args.metadata {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_metadata(&text)?
        }
        None => collect_metadata(&args.projects_dir, config, counter.as_ref()).await?,
    };

    let mut emitter = ChunkEmitter::new(&args.output_dir)?;
    let summary = emitter
        .emit(
            &args.projects_dir,
            &metadata,
            args.first_id,
            config,
            counter.as_ref(),
        )
        .await?;
    let written = emitter.finish()?;

    eprintln!(
        "Wrote {} records for {} projects ({} skipped) to {}",
        summary.records,
        summary.projects,
        summary.skipped,
        args.output_dir.display()
    );
    for path in written {
        eprintln!("  {}", path.display());
    }
    Ok(())
}

async fn run_diff(args: DiffArgs) -> Result<()> {
    let old = read_records(&args.old).await?;
    let new = read_records(&args.new).await?;
    let changed = changed_main_files(&old, &new);

    let file = std::fs::File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);
    let written = write_records(&mut writer, changed)?;
    std::io::Write::flush(&mut writer)?;

    eprintln!(
        "{written} of {} records changed -> {}",
        new.len(),
        args.output.display()
    );
    Ok(())
}

async fn read_records(path: &Path) -> Result<Vec<depchunk_protocol::ChunkRecord>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_records(&text).with_context(|| format!("Invalid records in {}", path.display()))
}

fn run_schema() -> Result<()> {
    let schema = serde_json::json!({
        "version": RECORD_SCHEMA_VERSION,
        "chunk_record": chunk_record_schema(),
    });
    println!("{}", serialize_json_pretty(&schema)?);
    Ok(())
}
