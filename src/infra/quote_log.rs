//! On-disk log of issued quotes, pruned of expired entries on load.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::domain::{Quote, QuoteStatus};

const QUOTES_FILENAME: &str = "quotes.json";

/// Get the quote log path (in the app data directory).
fn default_path() -> PathBuf {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dive-estimator")
            .join(QUOTES_FILENAME)
    })
    .clone()
}

#[derive(Debug, Error)]
pub enum QuoteLogError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("quote log is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug)]
pub struct QuoteLog {
    path: PathBuf,
}

impl Default for QuoteLog {
    fn default() -> Self {
        Self::at(default_path())
    }
}

impl QuoteLog {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Quotes on disk, minus open quotes that expired before `now`. An unreadable
    /// log is logged and treated as empty; use [`QuoteLog::try_load`] to tell
    /// the two apart.
    pub fn load(&self, now: OffsetDateTime) -> Vec<Quote> {
        match self.try_load(now) {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(path = %self.path.display(), "failed to load quote log: {e}");
                Vec::new()
            }
        }
    }

    pub fn try_load(&self, now: OffsetDateTime) -> Result<Vec<Quote>, QuoteLogError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no quote log yet");
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let quotes: Vec<Quote> = serde_json::from_str(&content)?;

        let total = quotes.len();
        let kept: Vec<Quote> = quotes
            .into_iter()
            .filter(|quote| quote.effective_status(now) != QuoteStatus::Expired)
            .collect();
        if kept.len() != total {
            info!(pruned = total - kept.len(), "pruned expired quotes");
        }
        Ok(kept)
    }

    pub fn save(&self, quotes: &[Quote]) -> Result<(), QuoteLogError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(quotes)?;
        fs::write(&self.path, content)?;
        debug!(count = quotes.len(), path = %self.path.display(), "saved quote log");
        Ok(())
    }

    /// Adds `quote`, replacing one with the same number. A log that cannot be
    /// parsed is moved aside before a fresh one is written; a log that cannot be
    /// read is left alone and the append fails.
    pub fn append(&self, quote: Quote, now: OffsetDateTime) -> Result<Vec<Quote>, QuoteLogError> {
        let mut quotes = match self.try_load(now) {
            Ok(quotes) => quotes,
            Err(QuoteLogError::Parse(e)) => {
                let backup = self.backup_path(now);
                fs::rename(&self.path, &backup)?;
                warn!(
                    backup = %backup.display(),
                    "quote log was unreadable ({e}); moved aside"
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        quotes.retain(|existing| existing.number != quote.number);
        quotes.push(quote);
        self.save(&quotes)?;
        Ok(quotes)
    }

    fn backup_path(&self, now: OffsetDateTime) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| QUOTES_FILENAME.to_string());
        self.path
            .with_file_name(format!("{name}.{}.bak", now.unix_timestamp()))
    }
}
