use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::host::traits::{
    Anchor, CapabilityProbe, CatalogApi, Capability, ContextMenuHost, ContextTrack, Notifier,
    PlaylistApi, QueueEntry, QueueMutator, QueueSource, ResourceType, SlotView, SubMenuHandler,
    SubMenuSpec, TrackRef, UriParser,
};
use crate::host::uri;

/// A notification as the user would have seen it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub is_error: bool,
}

/// Successful mutation calls, in the order the host accepted them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCall {
    Append(Vec<TrackRef>),
    InsertBefore(Vec<TrackRef>, Anchor),
}

type Registration = (SubMenuSpec, Arc<dyn SubMenuHandler>);

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process host with a mutable queue model.
///
/// Appends land after every upcoming entry (continuation tracks included),
/// anchored inserts go right before the entry whose `uid` matches.
pub struct MemoryHost {
    entries: Mutex<Vec<QueueEntry>>,
    albums: Mutex<HashMap<String, Vec<String>>>,
    playlists: Mutex<HashMap<String, Vec<String>>>,
    notifications: Mutex<Vec<Notification>>,
    calls: Mutex<Vec<QueueCall>>,
    capabilities: Mutex<HashSet<Capability>>,
    registration: Mutex<Option<Registration>>,
    fail_fetches: AtomicBool,
    fail_mutations: AtomicBool,
    fail_queue_reads: AtomicBool,
    playlist_limits: Mutex<Vec<u64>>,
    next_uid: AtomicU64,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            albums: Mutex::new(HashMap::new()),
            playlists: Mutex::new(HashMap::new()),
            notifications: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            capabilities: Mutex::new(Capability::ALL.into_iter().collect()),
            registration: Mutex::new(None),
            fail_fetches: AtomicBool::new(false),
            fail_mutations: AtomicBool::new(false),
            fail_queue_reads: AtomicBool::new(false),
            playlist_limits: Mutex::new(Vec::new()),
            next_uid: AtomicU64::new(1),
        }
    }

    /// Entry explicitly queued by the user.
    pub fn queued(uri: &str, uid: &str, title: &str, artist: &str) -> QueueEntry {
        Self::entry("queue", uri, uid, title, artist, false)
    }

    /// Autoplay continuation entry.
    pub fn continuation(uri: &str, uid: &str, title: &str, artist: &str) -> QueueEntry {
        Self::entry("context", uri, uid, title, artist, false)
    }

    /// Context entry flagged as queued ("play next").
    pub fn play_next(uri: &str, uid: &str, title: &str, artist: &str) -> QueueEntry {
        Self::entry("context", uri, uid, title, artist, true)
    }

    fn entry(provider: &str, uri: &str, uid: &str, title: &str, artist: &str, is_queued: bool) -> QueueEntry {
        let mut metadata = HashMap::new();
        metadata.insert("title".to_string(), title.to_string());
        metadata.insert("artist_name".to_string(), artist.to_string());
        if is_queued {
            metadata.insert("is_queued".to_string(), "true".to_string());
        }
        QueueEntry {
            provider: provider.to_string(),
            track: Some(ContextTrack {
                uri: Some(uri.to_string()),
                uid: Some(uid.to_string()),
                metadata,
            }),
        }
    }

    pub fn set_entries(&self, entries: Vec<QueueEntry>) {
        *lock(&self.entries) = entries;
    }

    pub fn entries(&self) -> Vec<QueueEntry> {
        lock(&self.entries).clone()
    }

    /// URIs of every upcoming entry, in order.
    pub fn upcoming_uris(&self) -> Vec<String> {
        lock(&self.entries)
            .iter()
            .filter_map(|e| e.track.as_ref().and_then(|t| t.uri.clone()))
            .collect()
    }

    /// Simulate playback advancing past the first upcoming entry.
    pub fn advance(&self) -> Option<QueueEntry> {
        let mut entries = lock(&self.entries);
        if entries.is_empty() {
            None
        } else {
            Some(entries.remove(0))
        }
    }

    pub fn add_album(&self, album_id: &str, tracks: &[&str]) {
        lock(&self.albums).insert(album_id.to_string(), tracks.iter().map(|s| s.to_string()).collect());
    }

    pub fn add_playlist(&self, uri: &str, tracks: &[&str]) {
        lock(&self.playlists).insert(uri.to_string(), tracks.iter().map(|s| s.to_string()).collect());
    }

    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.notifications).clone()
    }

    pub fn calls(&self) -> Vec<QueueCall> {
        lock(&self.calls).clone()
    }

    pub fn set_capability(&self, capability: Capability, present: bool) {
        let mut caps = lock(&self.capabilities);
        if present {
            caps.insert(capability);
        } else {
            caps.remove(&capability);
        }
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    pub fn fail_queue_reads(&self, fail: bool) {
        self.fail_queue_reads.store(fail, Ordering::SeqCst);
    }

    /// Page sizes requested from the playlist API, in call order.
    pub fn playlist_limits(&self) -> Vec<u64> {
        lock(&self.playlist_limits).clone()
    }

    pub fn registered_spec(&self) -> Option<SubMenuSpec> {
        lock(&self.registration).as_ref().map(|(spec, _)| spec.clone())
    }

    fn handler(&self) -> Result<(SubMenuSpec, Arc<dyn SubMenuHandler>)> {
        lock(&self.registration)
            .as_ref()
            .map(|(spec, handler)| (spec.clone(), handler.clone()))
            .ok_or_else(|| anyhow!("no submenu registered"))
    }

    /// Right-click on `uris`: returns whether the submenu would appear.
    pub async fn open_menu(&self, uris: &[&str]) -> Result<bool> {
        let (_, handler) = self.handler()?;
        let uris: Vec<String> = uris.iter().map(|s| s.to_string()).collect();
        Ok(handler.should_show(&uris).await)
    }

    /// Show the submenu and collect every row.
    pub async fn render_menu(&self) -> Result<Vec<SlotView>> {
        let (spec, handler) = self.handler()?;
        let mut rows = Vec::with_capacity(spec.item_count);
        for index in 0..spec.item_count {
            rows.push(handler.render_item(index).await);
        }
        Ok(rows)
    }

    /// Pick submenu row `index`.
    pub async fn click(&self, index: usize) -> Result<()> {
        let (_, handler) = self.handler()?;
        handler.activate(index).await;
        Ok(())
    }

    fn check_fetch(&self) -> Result<()> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            bail!("content service unavailable");
        }
        Ok(())
    }

    fn materialize(&self, tracks: &[TrackRef]) -> Vec<QueueEntry> {
        tracks
            .iter()
            .map(|t| {
                let uid = format!("mem-{}", self.next_uid.fetch_add(1, Ordering::SeqCst));
                QueueEntry {
                    provider: "queue".to_string(),
                    track: Some(ContextTrack {
                        uri: Some(t.uri.clone()),
                        uid: Some(uid),
                        metadata: HashMap::new(),
                    }),
                }
            })
            .collect()
    }
}

#[async_trait]
impl QueueSource for MemoryHost {
    async fn next_tracks(&self) -> Result<Vec<QueueEntry>> {
        if self.fail_queue_reads.load(Ordering::SeqCst) {
            bail!("queue state unavailable");
        }
        Ok(self.entries())
    }
}

#[async_trait]
impl CatalogApi for MemoryHost {
    async fn album_tracks(&self, album_id: &str) -> Result<Vec<String>> {
        self.check_fetch()?;
        lock(&self.albums)
            .get(album_id)
            .cloned()
            .ok_or_else(|| anyhow!("album {} not found", album_id))
    }
}

#[async_trait]
impl PlaylistApi for MemoryHost {
    async fn playlist_tracks(&self, uri: &str, limit: u64) -> Result<Vec<String>> {
        lock(&self.playlist_limits).push(limit);
        self.check_fetch()?;
        let tracks = lock(&self.playlists)
            .get(uri)
            .cloned()
            .ok_or_else(|| anyhow!("playlist {} not found", uri))?;
        Ok(tracks.into_iter().take(usize::try_from(limit).unwrap_or(usize::MAX)).collect())
    }
}

#[async_trait]
impl QueueMutator for MemoryHost {
    async fn add_to_queue(&self, tracks: &[TrackRef]) -> Result<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            bail!("player rejected addToQueue");
        }
        let new_entries = self.materialize(tracks);
        lock(&self.entries).extend(new_entries);
        lock(&self.calls).push(QueueCall::Append(tracks.to_vec()));
        Ok(())
    }

    async fn insert_into_queue(&self, tracks: &[TrackRef], before: &Anchor) -> Result<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            bail!("player rejected insertIntoQueue");
        }
        let new_entries = self.materialize(tracks);
        {
            let mut entries = lock(&self.entries);
            let at = entries
                .iter()
                .position(|e| {
                    e.track.as_ref().and_then(|t| t.uid.as_deref()) == Some(before.uid.as_str())
                })
                .ok_or_else(|| anyhow!("anchor {} ({}) is not in the queue", before.uid, before.uri))?;
            let tail = entries.split_off(at);
            entries.extend(new_entries);
            entries.extend(tail);
        }
        lock(&self.calls).push(QueueCall::InsertBefore(tracks.to_vec(), before.clone()));
        Ok(())
    }
}

impl UriParser for MemoryHost {
    fn resource_type(&self, uri: &str) -> ResourceType {
        uri::classify(uri)
    }
}

impl Notifier for MemoryHost {
    fn show(&self, message: &str, is_error: bool) {
        lock(&self.notifications).push(Notification {
            message: message.to_string(),
            is_error,
        });
    }
}

impl CapabilityProbe for MemoryHost {
    fn has_capability(&self, capability: Capability) -> bool {
        lock(&self.capabilities).contains(&capability)
    }
}

impl ContextMenuHost for MemoryHost {
    fn register_submenu(&self, spec: SubMenuSpec, handler: Arc<dyn SubMenuHandler>) -> Result<()> {
        let mut registration = lock(&self.registration);
        if registration.is_some() {
            bail!("submenu \"{}\" is already registered", spec.label);
        }
        *registration = Some((spec, handler));
        Ok(())
    }
}
