use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::error::Error;
use crate::host::{HostServices, Notifier, QueueSource, SlotView, SubMenuHandler};
use crate::queue::{PositionInserter, QueueSnapshot};
use crate::resolver::{Selection, SelectionResolver};

/// Spotify never shows more than 80 upcoming queue items.
pub const MAX_QUEUE_ITEMS: usize = 80;

pub const RESOLVE_FAILURE_MESSAGE: &str = "Failed to add tracks. Check the log.";

/// Single slot holding the selection of the most recent menu open.
/// A later open overwrites it.
#[derive(Debug, Default)]
pub struct PendingSelection {
    slot: Mutex<Option<Selection>>,
}

impl PendingSelection {
    pub fn replace(&self, selection: Selection) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(selection);
    }

    pub fn current(&self) -> Option<Selection> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// The "Add to Queue After..." submenu: one row per queued slot.
pub struct QueueAfterMenu {
    queue: Arc<dyn QueueSource>,
    notifier: Arc<dyn Notifier>,
    resolver: SelectionResolver,
    inserter: PositionInserter,
    pending: PendingSelection,
    slots: usize,
}

impl QueueAfterMenu {
    pub fn new(services: &HostServices, slots: usize) -> Self {
        Self {
            queue: services.queue.clone(),
            notifier: services.notifier.clone(),
            resolver: SelectionResolver::new(
                services.uris.clone(),
                services.catalog.clone(),
                services.playlists.clone(),
            ),
            inserter: PositionInserter::new(
                services.queue.clone(),
                services.player.clone(),
                services.notifier.clone(),
            ),
            pending: PendingSelection::default(),
            slots: slots.min(MAX_QUEUE_ITEMS),
        }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn pending(&self) -> Option<Selection> {
        self.pending.current()
    }

    async fn snapshot(&self) -> Option<QueueSnapshot> {
        match QueueSnapshot::read(self.queue.as_ref()).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Queue unavailable: {:#}", e);
                None
            }
        }
    }

    fn report_resolve_failure(&self, e: anyhow::Error) {
        error!("Failed to add tracks: {:#}", e);
        self.notifier.show(RESOLVE_FAILURE_MESSAGE, true);
    }
}

/// Row `index` against `snapshot`: hidden past the end, otherwise labelled
/// with whatever sits there right now.
pub fn slot_view(snapshot: &QueueSnapshot, index: usize) -> SlotView {
    SlotView {
        visible: index < snapshot.len(),
        label: snapshot.display_name(index),
    }
}

#[async_trait]
impl SubMenuHandler for QueueAfterMenu {
    async fn should_show(&self, uris: &[String]) -> bool {
        if !self.resolver.is_eligible(uris) {
            return false;
        }
        let Some(selection) = Selection::new(uris.to_vec()) else {
            return false;
        };
        self.pending.replace(selection);

        // Nothing to insert after
        self.snapshot().await.is_some_and(|s| !s.is_empty())
    }

    async fn render_item(&self, index: usize) -> SlotView {
        if index >= self.slots {
            return SlotView {
                visible: false,
                label: format!("Track {}", index + 1),
            };
        }
        let snapshot = self.snapshot().await.unwrap_or_default();
        slot_view(&snapshot, index)
    }

    async fn activate(&self, index: usize) {
        let Some(selection) = self.pending.current() else {
            warn!(index, "{}", Error::EmptySelection);
            self.notifier.show(RESOLVE_FAILURE_MESSAGE, true);
            return;
        };
        debug!(index, items = selection.uris().len(), "Queue slot picked");

        let tracks = match self.resolver.resolve(&selection).await {
            Ok(tracks) => tracks,
            Err(e) => {
                self.report_resolve_failure(e);
                return;
            }
        };

        self.inserter.insert_after(&tracks, index).await;
    }
}
