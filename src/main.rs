use anyhow::{Context, Result};
use charembed::{CharPipeline, EmbeddingConfig, Tokenizer};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "charembed")]
#[command(about = "Character-level tokenizer and embedding table", long_about = None)]
struct Args {
    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Build a vocabulary from corpus files and save it as JSON.
    BuildVocab {
        /// Where to write the vocabulary
        #[arg(short, long)]
        output: PathBuf,

        /// Corpus files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Embed text with a fresh table and decode it back.
    Roundtrip {
        /// Saved vocabulary
        #[arg(short, long)]
        vocab: PathBuf,

        /// Embedding config (JSON); vocab_size is replaced by the vocabulary's size
        #[arg(long)]
        config: Option<PathBuf>,

        /// Embedding dimension, overrides the config
        #[arg(long)]
        dim: Option<usize>,

        /// Weight seed, overrides the config
        #[arg(long)]
        seed: Option<u64>,

        text: String,
    },
}

const DEFAULT_DIM: usize = 32;

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_vocab(output: PathBuf, files: Vec<PathBuf>) -> Result<()> {
    let mut texts = Vec::with_capacity(files.len());
    for file in &files {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read corpus {}", file.display()))?;
        texts.push(text);
    }

    let tokenizer = Tokenizer::from_texts(&texts);
    tokenizer
        .save_vocabulary(&output)
        .with_context(|| format!("failed to save vocabulary to {}", output.display()))?;

    info!(files = files.len(), vocab_size = tokenizer.vocab_size(), "vocabulary built");
    println!("{}", tokenizer.vocab_size());
    Ok(())
}

fn roundtrip(
    vocab: PathBuf,
    config: Option<PathBuf>,
    dim: Option<usize>,
    seed: Option<u64>,
    text: String,
) -> Result<()> {
    let tokenizer = Tokenizer::load(&vocab)
        .with_context(|| format!("failed to load vocabulary from {}", vocab.display()))?;

    let mut config = match config {
        Some(path) => EmbeddingConfig::from_json_file(path)?,
        None => EmbeddingConfig::new(tokenizer.vocab_size(), DEFAULT_DIM),
    };
    if let Some(dim) = dim {
        config.embedding_dim = dim;
    }
    if seed.is_some() {
        config.seed = seed;
    }

    let pipeline = CharPipeline::with_tokenizer(tokenizer, &config)?;
    info!(
        vocab_size = pipeline.table().vocab_size(),
        embedding_dim = pipeline.table().embedding_dim(),
        "embedding table ready"
    );

    let tokens = pipeline.tokenizer().tokenize(&text);
    let vectors = pipeline.table().forward(&tokens);
    let recovered = pipeline.recover_tokens(&vectors);

    println!("tokens:    {:?}", tokens);
    println!("recovered: {:?}", recovered);
    println!("text:      {}", pipeline.tokenizer().decode(&recovered));
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    match args.cmd {
        Cmd::BuildVocab { output, files } => build_vocab(output, files),
        Cmd::Roundtrip {
            vocab,
            config,
            dim,
            seed,
            text,
        } => roundtrip(vocab, config, dim, seed, text),
    }
}
