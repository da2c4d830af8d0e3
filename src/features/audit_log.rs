// Resolution audit log
// Fire-and-forget: requests enqueue, a background task writes CSV + capped JSON.
// Both files are locked while written so several instances can share LOG_DIR.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::models::attempt_log::{ResolutionAttemptLog, CSV_HEADER};
use crate::utils::config::AUDIT_JSON_CAP;
use crate::utils::formatters::csv_line;

const CSV_FILE: &str = "facebook_requests.csv";
const JSON_FILE: &str = "facebook_requests.json";

/// Handle for enqueueing audit records
#[derive(Clone)]
pub struct AuditLog {
    tx: mpsc::Sender<ResolutionAttemptLog>,
}

impl AuditLog {
    /// Start the background writer
    ///
    /// The writer exits once every handle has been dropped and the
    /// queue is drained.
    pub fn spawn(dir: impl Into<PathBuf>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<ResolutionAttemptLog>(capacity.max(1));
        let files = AuditFiles::new(dir);

        let handle = tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                let files = files.clone();
                let result = tokio::task::spawn_blocking(move || files.append(&entry)).await;
                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("Failed to write audit record: {:#}", e),
                    Err(e) => error!("Audit writer task panicked: {}", e),
                }
            }
            debug!("Audit writer stopped");
        });

        (Self { tx }, handle)
    }

    /// Enqueue a record; drops it if the queue is full or closed
    pub fn record(&self, entry: ResolutionAttemptLog) {
        if let Err(e) = self.tx.try_send(entry) {
            warn!("Dropping audit record: {}", e);
        }
    }
}

/// The two on-disk audit files
#[derive(Debug, Clone)]
pub struct AuditFiles {
    dir: PathBuf,
}

impl AuditFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn csv_path(&self) -> PathBuf {
        self.dir.join(CSV_FILE)
    }

    pub fn json_path(&self) -> PathBuf {
        self.dir.join(JSON_FILE)
    }

    /// Write one record to both files
    pub fn append(&self, entry: &ResolutionAttemptLog) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create log dir: {}", self.dir.display()))?;
        self.append_csv(entry)?;
        self.append_json(entry)
    }

    fn append_csv(&self, entry: &ResolutionAttemptLog) -> Result<()> {
        let path = self.csv_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open audit CSV: {}", path.display()))?;

        with_lock(&file, &path)?;
        let result = (|| -> Result<()> {
            let mut out = String::new();
            if file.metadata()?.len() == 0 {
                out.push_str(&csv_line(&CSV_HEADER));
                out.push('\n');
            }
            out.push_str(&csv_line(&entry.csv_row()));
            out.push('\n');
            file.write_all(out.as_bytes())?;
            Ok(())
        })();
        FileExt::unlock(&file)?;
        result
    }

    fn append_json(&self, entry: &ResolutionAttemptLog) -> Result<()> {
        let path = self.json_path();
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("failed to open audit JSON: {}", path.display()))?;

        with_lock(&file, &path)?;
        let result = (|| -> Result<()> {
            let mut content = String::new();
            file.read_to_string(&mut content)?;

            // Unreadable history is replaced rather than blocking new records
            let mut entries: Vec<Value> = serde_json::from_str(&content).unwrap_or_default();
            entries.push(serde_json::to_value(entry)?);
            if entries.len() > AUDIT_JSON_CAP {
                let excess = entries.len() - AUDIT_JSON_CAP;
                entries.drain(..excess);
            }

            let json = serde_json::to_string_pretty(&entries)?;
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(json.as_bytes())?;
            Ok(())
        })();
        FileExt::unlock(&file)?;
        result
    }
}

fn with_lock(file: &File, path: &Path) -> Result<()> {
    FileExt::lock_exclusive(file)
        .with_context(|| format!("failed to lock {}", path.display()))
}
