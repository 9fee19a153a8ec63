//! Corpus trainer for the posting bot.
//!
//! Reads a corpus file (one training line per text line), builds the chain
//! in parallel and writes the JSON model document the bot loads at startup.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use prattle_core::model::chain::MarkovChain;

#[derive(Parser, Debug)]
#[command(name = "prattle-train", about = "Trains a Markov chain model from a text corpus", version)]
struct Args {
	/// Corpus file, one training line per text line
	corpus: PathBuf,

	/// Number of consecutive tokens forming one context
	#[arg(long, default_value_t = 1)]
	order: usize,

	/// Upper bound on tokens appended beyond the opening
	#[arg(long, default_value_t = 9)]
	max_length: usize,

	/// Where to write the model document, the corpus path with a `json`
	/// extension when omitted
	#[arg(long)]
	output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
	env_logger::init();
	let args = Args::parse();

	let chain = MarkovChain::from_corpus(&args.corpus, args.order, args.max_length)?;
	info!(
		"trained on `{}` ({} openings, {} contexts)",
		args.corpus.display(),
		chain.starts().len(),
		chain.context_count()
	);

	let output = args.output.unwrap_or_else(|| args.corpus.with_extension("json"));
	fs::write(&output, chain.to_json()?)?;
	info!("model written to `{}`", output.display());

	Ok(())
}
