//! Durable state and interval throttling.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use log::trace;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A durable record failed to load or save.
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("state i/o failure: {0}")]
	Io(#[from] io::Error),

	/// The record exists but no longer parses. Deliberately not papered
	/// over with a default, a truncated file should be looked at.
	#[error("corrupt state record: {0}")]
	Decode(#[from] serde_json::Error),
}

/// Tiny durable store keeping one JSON document per key.
///
/// Records live as `<dir>/<key>.json`. A missing record reads back as the
/// type's default, so first runs need no setup.
pub struct StateStore {
	dir: PathBuf,
}

impl StateStore {
	/// Opens a store rooted at `dir`, creating the directory if needed.
	pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
		let dir = dir.as_ref().to_path_buf();
		fs::create_dir_all(&dir)?;
		Ok(Self { dir })
	}

	fn record_path(&self, key: &str) -> PathBuf {
		self.dir.join(format!("{key}.json"))
	}

	/// Reads the record under `key`, or its default when never written.
	pub fn read<T>(&self, key: &str) -> Result<T, StoreError>
	where
		T: DeserializeOwned + Default,
	{
		match fs::read_to_string(self.record_path(key)) {
			Ok(document) => Ok(serde_json::from_str(&document)?),
			Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(T::default()),
			Err(error) => Err(error.into()),
		}
	}

	/// Writes the record under `key`.
	pub fn write<T: Serialize>(&self, key: &str, record: &T) -> Result<(), StoreError> {
		let document = serde_json::to_string_pretty(record)?;
		fs::write(self.record_path(key), document)?;
		Ok(())
	}
}

/// Durable timestamp of the last completed run of a recurring action.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct LastRun {
	#[serde(default, with = "chrono::serde::ts_milliseconds_option")]
	last_run_time: Option<DateTime<Utc>>,
}

/// Decides whether a recurring action is due, backed by a [`StateStore`].
///
/// The deciding timestamp survives restarts, so an interval cannot be
/// cheated by bouncing the process.
pub struct Throttle {
	store: StateStore,
}

impl Throttle {
	pub fn new(store: StateStore) -> Self {
		Self { store }
	}

	/// Time left before the action under `key` is due again.
	///
	/// Returns `None` when the action never ran or the interval has fully
	/// elapsed, meaning it may run now.
	pub fn remaining(&self, key: &str, interval: TimeDelta) -> Result<Option<TimeDelta>, StoreError> {
		let record: LastRun = self.store.read(key)?;
		let Some(last_run) = record.last_run_time else {
			return Ok(None);
		};

		let elapsed = Utc::now() - last_run;
		if elapsed >= interval {
			Ok(None)
		} else {
			Ok(Some(interval - elapsed))
		}
	}

	/// Records that the action under `key` completed at `at`.
	pub fn mark_ran(&self, key: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
		trace!("marking `{key}` as ran at {at}");
		self.store.write(key, &LastRun { last_run_time: Some(at) })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn open_throttle(dir: &tempfile::TempDir) -> Throttle {
		Throttle::new(StateStore::open(dir.path()).unwrap())
	}

	#[test]
	fn action_is_due_when_it_never_ran() {
		let dir = tempfile::tempdir().unwrap();
		let throttle = open_throttle(&dir);
		assert_eq!(throttle.remaining("post", TimeDelta::hours(1)).unwrap(), None);
	}

	#[test]
	fn fresh_mark_pushes_the_action_out() {
		let dir = tempfile::tempdir().unwrap();
		let throttle = open_throttle(&dir);
		throttle.mark_ran("post", Utc::now()).unwrap();

		let remaining = throttle.remaining("post", TimeDelta::hours(1)).unwrap();
		assert!(remaining.is_some());
		assert!(remaining.unwrap() <= TimeDelta::hours(1));
	}

	#[test]
	fn elapsed_interval_makes_the_action_due_again() {
		let dir = tempfile::tempdir().unwrap();
		let throttle = open_throttle(&dir);
		throttle.mark_ran("post", Utc::now() - TimeDelta::hours(2)).unwrap();

		assert_eq!(throttle.remaining("post", TimeDelta::hours(1)).unwrap(), None);
	}

	#[test]
	fn marks_survive_reopening_the_store() {
		let dir = tempfile::tempdir().unwrap();
		open_throttle(&dir).mark_ran("post", Utc::now()).unwrap();

		let reopened = open_throttle(&dir);
		assert!(reopened.remaining("post", TimeDelta::hours(1)).unwrap().is_some());
	}

	#[test]
	fn last_run_is_stored_as_epoch_milliseconds() {
		let dir = tempfile::tempdir().unwrap();
		let throttle = open_throttle(&dir);
		let at = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
		throttle.mark_ran("post", at).unwrap();

		let raw = std::fs::read_to_string(dir.path().join("post.json")).unwrap();
		assert!(raw.contains("\"lastRunTime\": 1700000000000"));
	}

	#[test]
	fn corrupt_record_is_reported_not_reset() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("post.json"), "{ not json").unwrap();

		let throttle = open_throttle(&dir);
		assert!(matches!(
			throttle.remaining("post", TimeDelta::hours(1)),
			Err(StoreError::Decode(_))
		));
	}

	#[test]
	fn store_round_trips_arbitrary_records() {
		#[derive(Serialize, Deserialize, Default, PartialEq, Debug)]
		struct Cursor {
			offset: u64,
		}

		let dir = tempfile::tempdir().unwrap();
		let store = StateStore::open(dir.path()).unwrap();

		assert_eq!(store.read::<Cursor>("cursor").unwrap(), Cursor::default());
		store.write("cursor", &Cursor { offset: 42 }).unwrap();
		assert_eq!(store.read::<Cursor>("cursor").unwrap(), Cursor { offset: 42 });
	}
}
