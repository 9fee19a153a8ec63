use std::fs;

use rand::SeedableRng;
use rand::rngs::StdRng;

use prattle_core::model::chain::{MarkovChain, tokenize};

const CORPUS: &str = "\
the cat sat on the mat
the dog slept by the door
a bird sang in the tree
the cat chased the bird
rain fell on the roof all night
";

fn written_corpus(dir: &tempfile::TempDir) -> std::path::PathBuf {
	let corpus_path = dir.path().join("corpus.txt");
	fs::write(&corpus_path, CORPUS).unwrap();
	corpus_path
}

#[test]
fn corpus_training_snapshots_and_reloads() {
	let dir = tempfile::tempdir().unwrap();
	let corpus_path = written_corpus(&dir);

	let chain = MarkovChain::from_corpus(&corpus_path, 1, 9).unwrap();
	assert_eq!(chain.starts().len(), 5);
	assert!(chain.followers("the").is_some());

	// Training leaves a binary snapshot next to the corpus
	assert!(dir.path().join("corpus.bin").exists());

	// A second call hits the snapshot and restores the same chain
	let reloaded = MarkovChain::from_corpus(&corpus_path, 1, 9).unwrap();
	assert_eq!(reloaded, chain);
}

#[test]
fn snapshot_with_different_bounds_is_rebuilt() {
	let dir = tempfile::tempdir().unwrap();
	let corpus_path = written_corpus(&dir);

	let first = MarkovChain::from_corpus(&corpus_path, 1, 9).unwrap();
	assert_eq!(first.order(), 1);

	let second = MarkovChain::from_corpus(&corpus_path, 2, 9).unwrap();
	assert_eq!(second.order(), 2);
	assert!(second.followers("the cat").is_some());
}

#[test]
fn empty_corpus_trains_an_empty_chain() {
	let dir = tempfile::tempdir().unwrap();
	let corpus_path = dir.path().join("empty.txt");
	fs::write(&corpus_path, "").unwrap();

	let chain = MarkovChain::from_corpus(&corpus_path, 1, 9).unwrap();
	assert!(chain.is_empty());
	assert!(chain.generate().is_err());
}

#[test]
fn exported_document_loads_back_identically() {
	let dir = tempfile::tempdir().unwrap();
	let corpus_path = written_corpus(&dir);

	let chain = MarkovChain::from_corpus(&corpus_path, 1, 9).unwrap();
	let model_path = dir.path().join("corpus.json");
	fs::write(&model_path, chain.to_json().unwrap()).unwrap();

	let loaded = MarkovChain::load(&model_path).unwrap();
	assert_eq!(loaded, chain);
}

#[test]
fn load_rejects_a_tampered_document() {
	let dir = tempfile::tempdir().unwrap();
	let model_path = dir.path().join("model.json");
	let tampered = r#"{ "order": 1, "maxLength": 9, "transitions": { "the": [] }, "starts": ["the"] }"#;
	fs::write(&model_path, tampered).unwrap();

	assert!(MarkovChain::load(&model_path).is_err());
}

#[test]
fn trained_chain_generates_walkable_sequences() {
	let dir = tempfile::tempdir().unwrap();
	let corpus_path = written_corpus(&dir);

	let chain = MarkovChain::from_corpus(&corpus_path, 1, 9).unwrap();
	let mut rng = StdRng::seed_from_u64(42);
	for _ in 0..32 {
		let sequence = chain.generate_with(&mut rng).unwrap();
		let tokens = tokenize(&sequence);
		assert!(!tokens.is_empty() && tokens.len() <= 1 + 9);
		for pair in tokens.windows(2) {
			assert!(chain.followers(pair[0]).unwrap().contains(&pair[1].to_string()));
		}
	}
}
