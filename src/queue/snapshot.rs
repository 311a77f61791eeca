use anyhow::{Context, Result};
use tracing::debug;

use crate::host::{QueueEntry, QueueSource};

/// Entries the user thinks of as "the queue": explicitly queued items and
/// context tracks marked as queued. Autoplay continuation is left out.
pub fn is_logically_queued(entry: &QueueEntry) -> bool {
    entry.provider == "queue" || entry.track.as_ref().is_some_and(|t| t.is_queued())
}

/// Read-only view of the logically queued entries at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueSnapshot {
    entries: Vec<QueueEntry>,
}

impl QueueSnapshot {
    pub fn from_entries(raw: Vec<QueueEntry>) -> Self {
        Self {
            entries: raw.into_iter().filter(is_logically_queued).collect(),
        }
    }

    /// Take a fresh snapshot. Call again at every decision point.
    pub async fn read(source: &dyn QueueSource) -> Result<Self> {
        let raw = source.next_tracks().await.context("Failed to read the queue")?;
        let total = raw.len();
        let snapshot = Self::from_entries(raw);
        debug!(total, queued = snapshot.len(), "Read queue snapshot");
        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QueueEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// `"<title> - <artist>"` for the entry at `index`, degrading to the
    /// title alone, then to `"Track <index + 1>"` when there is no entry.
    pub fn display_name(&self, index: usize) -> String {
        let Some(entry) = self.get(index) else {
            return format!("Track {}", index + 1);
        };

        let track = entry.track.as_ref();
        let title = track.and_then(|t| t.title()).unwrap_or("Unknown Track");
        match track.and_then(|t| t.artist()) {
            Some(artist) => format!("{} - {}", title, artist),
            None => title.to_string(),
        }
    }
}
