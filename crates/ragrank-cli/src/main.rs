//! `ragrank` command-line interface.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use ragrank_core::config::{CliOverrides, RagConfig};
use ragrank_core::models::IndexId;
use ragrank_pipeline::observability::init_tracing;
use ragrank_pipeline::Pipeline;
use ragrank_rerank::HttpChatOracle;

#[derive(Parser)]
#[command(name = "ragrank", version)]
#[command(about = "Build a PCA/IVF index over a CSV corpus and answer queries with LLM reranking")]
struct Args {
    /// Config file. Missing files fall back to defaults.
    #[arg(short, long, global = true, default_value = "ragrank.toml")]
    config: PathBuf,

    /// Directory holding index artifacts
    #[arg(long, global = true)]
    artifact_dir: Option<String>,

    /// Log filter, e.g. "debug" or "ragrank_index=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Embed a CSV corpus and persist its index
    Build {
        /// CSV file with a header row
        corpus: PathBuf,

        /// Column to embed (auto-detected when omitted)
        #[arg(long)]
        text_column: Option<String>,

        /// PCA output dimension
        #[arg(long)]
        target_dimension: Option<usize>,

        /// Number of IVF lists
        #[arg(long)]
        n_clusters: Option<usize>,
    },

    /// Retrieve and rank documents for a query
    Query {
        /// Id printed by `ragrank build`
        index_id: String,

        /// The question
        query: String,

        /// Number of documents to return
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Inverted lists probed per query
        #[arg(long)]
        nprobe: Option<usize>,

        /// Skip LLM rescoring and return the distance ranking
        #[arg(long)]
        no_rerank: bool,

        /// Send the question and retrieved documents to the chat model
        #[arg(long)]
        generate: bool,

        /// Print the full answer as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut overrides = CliOverrides {
        artifact_dir: args.artifact_dir.clone(),
        log_level: args.log_level.clone(),
        ..CliOverrides::default()
    };
    match &args.command {
        Command::Build {
            text_column,
            target_dimension,
            n_clusters,
            ..
        } => {
            overrides.text_column = text_column.clone();
            overrides.target_dimension = *target_dimension;
            overrides.n_clusters = *n_clusters;
        }
        Command::Query { nprobe, no_rerank, .. } => {
            overrides.nprobe = *nprobe;
            if *no_rerank {
                overrides.rerank_enabled = Some(false);
            }
        }
    }

    let config = RagConfig::load(Some(&args.config), Some(&overrides))
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;
    init_tracing(&config.observability);

    match args.command {
        Command::Build { corpus, .. } => build(config, &corpus),
        Command::Query {
            index_id,
            query,
            top_k,
            generate,
            json,
            ..
        } => run_query(config, &index_id, &query, top_k, generate, json),
    }
}

fn build(config: RagConfig, corpus: &std::path::Path) -> Result<()> {
    let pipeline = Pipeline::new(config).context("failed to initialise pipeline")?;
    let id = pipeline
        .build_index(corpus)
        .with_context(|| format!("failed to build index from {}", corpus.display()))?;
    info!(index_id = %id, "build finished");
    println!("{id}");
    Ok(())
}

fn run_query(config: RagConfig, index_id: &str, query: &str, top_k: Option<usize>, generate: bool, json: bool) -> Result<()> {
    let top_k = top_k.unwrap_or(config.pipeline.default_top_k);
    let id = IndexId::parse(index_id)?;
    let generator = if generate {
        Some(HttpChatOracle::from_config(&config.rerank).context("failed to create chat client")?)
    } else {
        None
    };
    let pipeline = Pipeline::new(config).context("failed to initialise pipeline")?;

    let (answer, reply) = match &generator {
        Some(generator) => {
            let (answer, reply) = pipeline.answer_with_generator(query, &id, top_k, &[], generator)?;
            (answer, Some(reply))
        }
        None => (pipeline.answer_query(query, &id, top_k)?, None),
    };

    if json {
        let mut value = serde_json::to_value(&answer)?;
        if let Some(reply) = &reply {
            value["reply"] = serde_json::Value::String(reply.clone());
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if !answer.rescored {
        eprintln!("note: results are in distance order (rescoring off or unavailable)");
    }
    for (i, doc) in answer.results.iter().enumerate() {
        match doc.score {
            Some(score) => println!("{}. [{score}] {}", i + 1, doc.display()),
            None => println!("{}. {}", i + 1, doc.display()),
        }
    }
    if let Some(reply) = reply {
        println!("\n{reply}");
    }
    Ok(())
}
