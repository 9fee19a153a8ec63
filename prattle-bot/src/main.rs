//! Markov chain posting bot.
//!
//! Loads a trained model, then runs two loops in one process: a scheduler
//! tick that posts a fresh status once the configured interval elapsed,
//! and an engagement feed (JSON lines on standard input) answered with
//! the occasional reply.

use std::error::Error;
use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{error, info, warn};

use prattle_core::model::chain::MarkovChain;

mod bot;
mod config;
mod events;
mod publish;
mod schedule;

use bot::Bot;
use config::Config;
use events::Engagement;
use publish::ConsolePublisher;
use schedule::{StateStore, Throttle};

fn main() -> Result<(), Box<dyn Error>> {
	env_logger::init();
	let config = Config::parse();

	let chain = MarkovChain::load(&config.model)?;
	info!(
		"model `{}` loaded ({} openings, {} contexts)",
		config.model.display(),
		chain.starts().len(),
		chain.context_count()
	);

	let throttle = Throttle::new(StateStore::open(&config.data_dir)?);
	let mut bot = Bot::new(chain, ConsolePublisher::stdout(), throttle, config.clone());

	// Engagement events arrive as JSON lines on standard input
	let (tx, rx) = mpsc::channel();
	thread::spawn(move || {
		for line in std::io::stdin().lock().lines() {
			let Ok(line) = line else { break };
			if line.trim().is_empty() {
				continue;
			}
			match serde_json::from_str::<Engagement>(&line) {
				Ok(event) => {
					if tx.send(event).is_err() {
						break;
					}
				}
				Err(parse_error) => warn!("unreadable event line: {parse_error}"),
			}
		}
	});

	let tick = Duration::from_millis(config.tick_interval);
	let mut next_tick = Instant::now();
	loop {
		let wait = next_tick.saturating_duration_since(Instant::now());
		match rx.recv_timeout(wait) {
			Ok(event) => {
				if let Err(bot_error) = bot.on_event(&event) {
					error!("event handling failed: {bot_error}");
				}
			}
			Err(mpsc::RecvTimeoutError::Timeout) => {
				if let Err(bot_error) = bot.on_interval() {
					error!("scheduled post failed: {bot_error}");
				}
				next_tick = Instant::now() + tick;
			}
			Err(mpsc::RecvTimeoutError::Disconnected) => break,
		}
	}

	// Feed closed, keep the scheduler running on its own
	info!("event feed closed, scheduling only");
	loop {
		thread::sleep(tick);
		if let Err(bot_error) = bot.on_interval() {
			error!("scheduled post failed: {bot_error}");
		}
	}
}
