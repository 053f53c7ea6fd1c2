use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::HistoryError;
use crate::stats::Stats;

/// One finished session, as stored in the results log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub date: String,
    pub words: usize,
    pub elapsed_secs: f64,
    pub wpm: u32,
    pub accuracy: u32,
    pub adjusted_wpm: u32,
    pub mistakes: usize,
}

impl ResultRecord {
    pub fn new(stats: &Stats, words: usize, mistakes: usize) -> Self {
        Self {
            date: Local::now().format("%c").to_string(),
            words,
            elapsed_secs: (stats.time * 100.0).round() / 100.0,
            wpm: stats.wpm,
            accuracy: stats.accuracy,
            adjusted_wpm: stats.adjusted_wpm(),
            mistakes,
        }
    }
}

/// Append-only CSV log of session results
#[derive(Debug, Clone)]
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    pub fn new() -> Self {
        Self::with_path(AppDirs::results_path())
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &ResultRecord) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // a new file gets a header row
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<ResultRecord>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let records = reader
            .deserialize()
            .collect::<Result<Vec<ResultRecord>, csv::Error>>()?;
        Ok(records)
    }
}

impl Default for ResultsLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn stats(wpm: u32, accuracy: u32, time: f64) -> Stats {
        Stats {
            wpm,
            accuracy,
            time,
        }
    }

    #[test]
    fn missing_log_reads_empty() {
        let dir = tempdir().unwrap();
        let log = ResultsLog::with_path(dir.path().join("results.csv"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn appends_rows_under_single_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("results.csv");
        let log = ResultsLog::with_path(&path);

        log.append(&ResultRecord::new(&stats(60, 95, 12.346), 10, 2))
            .unwrap();
        log.append(&ResultRecord::new(&stats(42, 80, 30.0), 10, 9))
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("adjusted_wpm").count(), 1);

        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].wpm, 60);
        assert_eq!(records[0].adjusted_wpm, 57);
        assert_eq!(records[0].elapsed_secs, 12.35);
        assert_eq!(records[1].mistakes, 9);
        assert_eq!(records[1].adjusted_wpm, 33);
    }
}
