//! Runtime settings.

use std::path::PathBuf;

use clap::Parser;

/// Runtime settings for the posting bot.
///
/// Every flag can also come from the environment, which is how deployments
/// usually configure the bot.
#[derive(Parser, Clone, Debug)]
#[command(name = "prattle-bot", about = "Markov chain posting bot", version)]
pub struct Config {
	/// Path of the trained model document
	#[arg(long, env = "PRATTLE_MODEL", default_value = "markov.json")]
	pub model: PathBuf,

	/// Directory holding durable bot state
	#[arg(long, env = "PRATTLE_DATA_DIR", default_value = "data")]
	pub data_dir: PathBuf,

	/// Minimum time between two scheduled posts, in milliseconds
	#[arg(long, env = "POST_INTERVAL", default_value_t = 3_600_000)]
	pub post_interval: u64,

	/// Time between two scheduler wake-ups, in milliseconds
	#[arg(long, env = "TICK_INTERVAL", default_value_t = 60_000)]
	pub tick_interval: u64,

	/// Probability of answering an engagement, between 0.0 and 1.0
	#[arg(long, env = "REPLY_CHANCE", default_value_t = 0.25)]
	pub reply_chance: f64,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_mirror_the_usual_deployment() {
		let config = Config::try_parse_from(["prattle-bot"]).unwrap();
		assert_eq!(config.model, PathBuf::from("markov.json"));
		assert_eq!(config.data_dir, PathBuf::from("data"));
		assert_eq!(config.post_interval, 3_600_000);
		assert_eq!(config.tick_interval, 60_000);
		assert_eq!(config.reply_chance, 0.25);
	}

	#[test]
	fn flags_override_defaults() {
		let config = Config::try_parse_from([
			"prattle-bot",
			"--model",
			"other.json",
			"--post-interval",
			"1000",
			"--reply-chance",
			"1.0",
		])
		.unwrap();
		assert_eq!(config.model, PathBuf::from("other.json"));
		assert_eq!(config.post_interval, 1000);
		assert_eq!(config.reply_chance, 1.0);
	}
}
