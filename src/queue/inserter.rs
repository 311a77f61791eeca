use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use crate::error::Error;
use crate::host::{Anchor, Notifier, QueueMutator, QueueSource, TrackRef};
use crate::queue::snapshot::QueueSnapshot;

pub const FAILURE_MESSAGE: &str = "Unable to add to queue. Check the log.";
pub const NOTHING_TO_ADD_MESSAGE: &str = "Nothing to add";

/// Which path an insertion took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The queue was empty, tracks were appended
    AddedToQueue,
    /// Target was the last slot (or past it), tracks were appended
    AddedToEnd,
    /// Inserted right after the entry labelled `label`
    AddedAfter { label: String },
    /// Nothing resolved, no host call made
    NothingToAdd,
}

impl fmt::Display for InsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertOutcome::AddedToQueue => f.write_str("Added to queue"),
            InsertOutcome::AddedToEnd => f.write_str("Added to end of queue"),
            InsertOutcome::AddedAfter { label } => write!(f, "Added after \"{}\"", label),
            InsertOutcome::NothingToAdd => f.write_str(NOTHING_TO_ADD_MESSAGE),
        }
    }
}

/// Anchor for "insert after `position`": the entry right behind it.
fn anchor_after(snapshot: &QueueSnapshot, position: usize) -> Result<Anchor, Error> {
    let next = position + 1;
    let track = snapshot.get(next).and_then(|e| e.track.as_ref());

    let uri = track
        .and_then(|t| t.uri.clone())
        .ok_or(Error::MalformedAnchor { position: next, missing: "uri" })?;
    let uid = track
        .and_then(|t| t.uid.clone())
        .ok_or(Error::MalformedAnchor { position: next, missing: "uid" })?;

    Ok(Anchor { uri, uid })
}

/// Splices tracks into the live queue behind a chosen slot.
pub struct PositionInserter {
    queue: Arc<dyn QueueSource>,
    player: Arc<dyn QueueMutator>,
    notifier: Arc<dyn Notifier>,
}

impl PositionInserter {
    pub fn new(queue: Arc<dyn QueueSource>, player: Arc<dyn QueueMutator>, notifier: Arc<dyn Notifier>) -> Self {
        Self { queue, player, notifier }
    }

    /// Insert `tracks` after snapshot slot `position` and tell the user how
    /// it went. Failures end here: logged in full, one error notification,
    /// no retry.
    pub async fn insert_after(&self, tracks: &[String], position: usize) -> Option<InsertOutcome> {
        match self.try_insert_after(tracks, position).await {
            Ok(outcome) => {
                info!(position, count = tracks.len(), %outcome, "Inserted into queue");
                self.notifier.show(&outcome.to_string(), false);
                Some(outcome)
            }
            Err(e) => {
                error!(position, "Failed to insert into queue: {:#}", e);
                self.notifier.show(FAILURE_MESSAGE, true);
                None
            }
        }
    }

    /// The insertion itself, without reporting.
    pub async fn try_insert_after(&self, tracks: &[String], position: usize) -> Result<InsertOutcome> {
        if tracks.is_empty() {
            return Ok(InsertOutcome::NothingToAdd);
        }

        // 1. Host shape
        let refs: Vec<TrackRef> = tracks.iter().map(TrackRef::new).collect();

        // 2. Fresh read, the queue may have moved since the menu was drawn
        let snapshot = QueueSnapshot::read(self.queue.as_ref()).await?;

        // 3. Empty queue
        if snapshot.is_empty() {
            self.player.add_to_queue(&refs).await?;
            return Ok(InsertOutcome::AddedToQueue);
        }

        // 4. Last slot or beyond (also covers a queue that shrank since render)
        if position >= snapshot.len() - 1 {
            self.player.add_to_queue(&refs).await?;
            return Ok(InsertOutcome::AddedToEnd);
        }

        // 5. Mid-queue: insert before slot position + 1
        let anchor = anchor_after(&snapshot, position)?;
        self.player.insert_into_queue(&refs, &anchor).await?;

        Ok(InsertOutcome::AddedAfter {
            label: snapshot.display_name(position),
        })
    }
}
