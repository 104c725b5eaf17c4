//! CSV Trade Recorder
//!
//! Appends trades to a CSV journal, writing the header once.

use super::recorder::{RecordError, TradeRecord, TradeRecorder};
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// CSV journal of paper trades
///
/// File I/O runs on the blocking pool; a mutex keeps concurrent records
/// from interleaving lines.
pub struct CsvRecorder {
    file_path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl CsvRecorder {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Arc::new(file_path.into()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

fn append_line(path: &Path, line: &str) -> Result<(), RecordError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if file.metadata()?.len() == 0 {
        writeln!(file, "{}", TradeRecord::csv_header())?;
    }
    writeln!(file, "{}", line)?;
    Ok(())
}

#[async_trait]
impl TradeRecorder for CsvRecorder {
    async fn record(&self, trade: &TradeRecord) -> Result<(), RecordError> {
        let file_path = Arc::clone(&self.file_path);
        let write_lock = Arc::clone(&self.write_lock);
        let line = trade.to_csv_line();

        tokio::task::spawn_blocking(move || {
            // A poisoned lock only means an earlier write panicked
            let _guard = write_lock.lock().unwrap_or_else(|e| e.into_inner());
            append_line(&file_path, &line)
        })
        .await
        .map_err(|e| RecordError::Io(std::io::Error::other(e)))?
    }
}
