use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use retriever_core::eval::EvaluationHarness;
use retriever_core::metrics::Gain;
use retriever_core::query::{BooleanQueryProcessor, VectorQueryProcessor};
use retriever_core::{IndexBuilder, InvertedIndex};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod corpus;

#[derive(Parser)]
#[command(name = "retriever")]
#[command(about = "Inverted-index retrieval engine over a Cranfield-style collection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Boolean,
    Vector,
}

#[derive(Clone, Copy, ValueEnum)]
enum GainArg {
    Exponential,
    Linear,
}

impl From<GainArg> for Gain {
    fn from(g: GainArg) -> Self {
        match g {
            GainArg::Exponential => Gain::Exponential,
            GainArg::Linear => Gain::Linear,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the inverted index from a collection file and save it
    Index {
        /// Collection file in marker format
        #[arg(long)]
        corpus: PathBuf,
        /// Output index file
        #[arg(long)]
        output: PathBuf,
    },
    /// Run one query against a saved index
    Query {
        /// Index file
        #[arg(long)]
        index: PathBuf,
        /// Retrieval model
        #[arg(long, value_enum)]
        mode: Mode,
        /// Number of results for the vector model
        #[arg(long, default_value_t = 3)]
        k: usize,
        /// Raw query text
        text: String,
    },
    /// Evaluate both models over a query file with relevance judgments
    Eval {
        /// Index file
        #[arg(long)]
        index: PathBuf,
        /// Query file in marker format
        #[arg(long)]
        queries: PathBuf,
        /// Relevance judgments file
        #[arg(long)]
        qrels: PathBuf,
        /// Evaluate only the first N queries
        #[arg(long)]
        sample: Option<usize>,
        /// Retrieval depth for the vector model
        #[arg(long, default_value_t = 10)]
        k: usize,
        /// NDCG rank cutoff
        #[arg(long, default_value_t = 50)]
        cutoff: usize,
        /// Gain mode for NDCG
        #[arg(long, value_enum, default_value = "exponential")]
        gain: GainArg,
        /// Emit the full report as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Index { corpus, output } => build_index(&corpus, &output),
        Commands::Query {
            index,
            mode,
            k,
            text,
        } => run_query(&index, mode, k, &text),
        Commands::Eval {
            index,
            queries,
            qrels,
            sample,
            k,
            cutoff,
            gain,
            json,
        } => run_eval(&index, &queries, &qrels, sample, k, cutoff, gain.into(), json),
    }
}

fn build_index(corpus: &PathBuf, output: &PathBuf) -> Result<()> {
    let docs = corpus::load_collection(corpus)?;
    let mut builder = IndexBuilder::new();
    for doc in &docs {
        builder
            .index_doc(doc)
            .with_context(|| format!("indexing document {}", doc.id))?;
    }
    let index = builder.finish();
    index.save(output)?;
    println!(
        "indexed {} documents, {} terms -> {}",
        index.n_docs(),
        index.n_terms(),
        output.display()
    );
    Ok(())
}

fn run_query(index_path: &PathBuf, mode: Mode, k: usize, text: &str) -> Result<()> {
    let index = InvertedIndex::load(index_path)?;
    match mode {
        Mode::Boolean => {
            let hits = BooleanQueryProcessor::new(&index).run(text);
            println!("{} documents", hits.len());
            for doc_id in hits {
                println!("{doc_id}");
            }
        }
        Mode::Vector => {
            let hits = VectorQueryProcessor::new(&index).run(text, k)?;
            for (doc_id, score) in hits {
                println!("{doc_id}\t{score:.6}");
            }
        }
    }
    Ok(())
}

fn run_eval(
    index_path: &PathBuf,
    queries_path: &PathBuf,
    qrels_path: &PathBuf,
    sample: Option<usize>,
    k: usize,
    cutoff: usize,
    gain: Gain,
    json: bool,
) -> Result<()> {
    let index = InvertedIndex::load(index_path)?;
    let mut queries = corpus::load_queries(queries_path)?;
    let qrels = corpus::load_qrels(qrels_path, &queries)?;
    if let Some(n) = sample {
        queries.truncate(n);
    }

    let harness = EvaluationHarness::new(&index, k, cutoff, gain)?;
    let report = harness.evaluate(&queries, &qrels)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for score in &report.per_query {
        println!(
            "query {:>4}  boolean NDCG {:.4}  vector NDCG {:.4}",
            score.query_id, score.boolean_ndcg, score.vector_ndcg
        );
    }
    println!(
        "mean over {} queries: boolean NDCG {:.4}, vector NDCG {:.4}",
        report.per_query.len(),
        report.mean_boolean_ndcg,
        report.mean_vector_ndcg
    );
    Ok(())
}
