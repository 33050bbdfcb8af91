//! Training data files.
//!
//! Examples are written as MessagePack with named fields, so the records
//! decode as maps on the training side. Each run also gets a JSON metadata
//! file describing how the data was produced.

use crate::config::SelfPlayConfig;
use crate::driver::SelfPlayReport;
use crate::example::TrainingExample;
use anyhow::{Context, Result};
use qumalaq_core::Player;
use qumalaq_mcts::SearchStats;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Description of a self-play run, stored next to its data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub game: String,
    pub seed: u64,
    pub evaluator: String,
    pub config: SelfPlayConfig,
    pub games: usize,
    /// Examples produced by self-play.
    pub generated: usize,
    /// Examples actually written to the chunk files.
    pub examples: usize,
    pub first_wins: usize,
    pub second_wins: usize,
    pub draws: usize,
    pub capped: usize,
    pub dropped: usize,
    pub avg_plies: f64,
    pub search: SearchStats,
    pub elapsed_ms: u64,
}

impl RunMetadata {
    pub fn from_report(
        game: &str,
        seed: u64,
        evaluator: &str,
        config: &SelfPlayConfig,
        report: &SelfPlayReport,
        written: usize,
    ) -> Self {
        Self {
            game: game.to_string(),
            seed,
            evaluator: evaluator.to_string(),
            config: config.clone(),
            games: report.num_games(),
            generated: report.examples.len(),
            examples: written,
            first_wins: report.wins(Player::First),
            second_wins: report.wins(Player::Second),
            draws: report.draws(),
            capped: report.capped(),
            dropped: report.dropped(),
            avg_plies: report.avg_plies(),
            search: report.search,
            elapsed_ms: report.elapsed_ms,
        }
    }
}

/// Writes numbered example chunks and run metadata into one directory.
pub struct ExampleWriter {
    dir: PathBuf,
    next_chunk: usize,
}

impl ExampleWriter {
    /// Use `dir` as output directory, creating it if needed.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
        Ok(Self { dir, next_chunk: 0 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `examples` to the next `examples_NNNNNN.msgpack` file.
    pub fn write_chunk(&mut self, examples: &[TrainingExample]) -> Result<PathBuf> {
        let path = self
            .dir
            .join(format!("examples_{:06}.msgpack", self.next_chunk));
        let file =
            File::create(&path).with_context(|| format!("Failed to create file: {:?}", path))?;
        let mut writer = BufWriter::new(file);
        rmp_serde::encode::write_named(&mut writer, examples)
            .with_context(|| format!("Failed to serialize examples to {:?}", path))?;
        writer
            .flush()
            .with_context(|| format!("Failed to write {:?}", path))?;

        self.next_chunk += 1;
        info!(path = %path.display(), examples = examples.len(), "wrote examples");
        Ok(path)
    }

    /// Write all examples in chunks of at most `chunk_size`.
    pub fn write_all(
        &mut self,
        examples: &[TrainingExample],
        chunk_size: usize,
    ) -> Result<Vec<PathBuf>> {
        examples
            .chunks(chunk_size.max(1))
            .map(|chunk| self.write_chunk(chunk))
            .collect()
    }

    /// Write `metadata.json`.
    pub fn write_metadata(&self, metadata: &RunMetadata) -> Result<PathBuf> {
        let path = self.dir.join("metadata.json");
        let file =
            File::create(&path).with_context(|| format!("Failed to create file: {:?}", path))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, metadata)
            .with_context(|| format!("Failed to write metadata to {:?}", path))?;
        writer
            .flush()
            .with_context(|| format!("Failed to write {:?}", path))?;
        Ok(path)
    }
}

/// Read back one chunk written by [`ExampleWriter::write_chunk`].
pub fn read_examples(path: impl AsRef<Path>) -> Result<Vec<TrainingExample>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    rmp_serde::from_read(BufReader::new(file))
        .with_context(|| format!("Failed to decode examples from {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_are_numbered() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ExampleWriter::create(dir.path().join("out")).unwrap();

        let example = TrainingExample {
            state: vec![0.5; 4],
            policy: vec![0.25; 4],
            value: -1.0,
            mover: Player::Second,
        };
        let paths = writer.write_all(&vec![example.clone(); 5], 2).unwrap();

        assert_eq!(paths.len(), 3);
        assert!(paths[2].ends_with("examples_000002.msgpack"));
        assert_eq!(read_examples(&paths[0]).unwrap(), vec![example.clone(); 2]);
        assert_eq!(read_examples(&paths[2]).unwrap(), vec![example]);
    }

    #[test]
    fn test_metadata_is_json() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExampleWriter::create(dir.path()).unwrap();
        let metadata = RunMetadata::from_report(
            "tictactoe",
            7,
            "uniform",
            &SelfPlayConfig::default(),
            &SelfPlayReport::default(),
            0,
        );

        let path = writer.write_metadata(&metadata).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let back: RunMetadata = serde_json::from_str(&text).unwrap();
        assert_eq!(back, metadata);
    }

    #[test]
    fn test_metadata_counts_written_examples() {
        let example = TrainingExample {
            state: vec![0.0],
            policy: vec![1.0],
            value: 1.0,
            mover: Player::First,
        };
        let report = SelfPlayReport {
            examples: vec![example; 5],
            ..Default::default()
        };

        // A replay window of 3 keeps only part of the run.
        let metadata = RunMetadata::from_report(
            "togyz_qumalaq",
            1,
            "uniform",
            &SelfPlayConfig::default(),
            &report,
            3,
        );
        assert_eq!(metadata.generated, 5);
        assert_eq!(metadata.examples, 3);
    }
}
