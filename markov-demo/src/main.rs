use std::path::PathBuf;

use clap::Parser;
use log::info;

use markov_core::io::read_lines;
use markov_core::model::tokenize::lowercase;
use markov_core::snapshot::load_corpus;
use markov_core::{whitespace_tokenize, Chain, ChainError};

/// Train a Markov chain on a text corpus and print a few responses.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Text corpus, one training line per line
    corpus: PathBuf,

    /// Prompt used to seed a response (repeatable). Unseeded when omitted
    #[arg(short, long)]
    prompt: Vec<String>,

    /// Number of responses per prompt
    #[arg(short = 'n', long, default_value_t = 5)]
    count: usize,

    /// Responses have strictly more words than this
    #[arg(long, default_value_t = 3)]
    min_len: usize,

    /// Responses have at most this many words
    #[arg(long, default_value_t = 20)]
    max_len: usize,

    /// Context length of the chain (2 or 3)
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(2..=3))]
    order: u8,

    /// Lowercase lines before tokenizing
    #[arg(long)]
    lowercase: bool,

    /// Reuse (or write) a `.bin` snapshot next to the corpus
    #[arg(long)]
    snapshot: bool,
}

fn run<const N: usize>(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = if args.lowercase {
        Chain::<N>::with_hooks(whitespace_tokenize, Some(lowercase))
    } else {
        Chain::<N>::new()
    };

    // Either load the binary snapshot (written on first run),
    // or learn the text directly
    if args.snapshot {
        load_corpus(&mut chain, &args.corpus)?;
    } else {
        let lines = read_lines(&args.corpus)?;
        chain.train_parallel(lines.as_slice());
    }
    info!("learned {} contexts from {}", chain.table().len(), args.corpus.display());

    let prompts = if args.prompt.is_empty() { vec![String::new()] } else { args.prompt.clone() };
    for prompt in &prompts {
        println!("> {}", prompt);
        for _ in 0..args.count {
            match chain.respond(prompt, args.min_len, args.max_len) {
                Ok(response) => println!("{}", response),
                // Only this call failed, try the next one
                Err(e @ ChainError::ConstraintUnsatisfiable { .. }) => println!("({})", e),
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.order {
        3 => run::<3>(&args),
        _ => run::<2>(&args),
    }
}
