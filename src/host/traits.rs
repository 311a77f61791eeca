use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Kind of resource a URI points at, as classified by the host's URI parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Track,
    Album,
    /// Legacy `spotify:user:<user>:playlist:<id>` form
    Playlist,
    /// Current `spotify:playlist:<id>` form
    PlaylistV2,
    Local,
    Other,
}

/// Track metadata the host embeds in a queue entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextTrack {
    #[serde(default)]
    pub uri: Option<String>,
    /// Stable identifier of this entry inside the queue
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ContextTrack {
    pub fn title(&self) -> Option<&str> {
        self.metadata
            .get("title")
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn artist(&self) -> Option<&str> {
        self.metadata
            .get("artist_name")
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Context tracks flagged by "play next" style insertions.
    pub fn is_queued(&self) -> bool {
        self.metadata.get("is_queued").map(String::as_str) == Some("true")
    }
}

/// One element of the host's upcoming list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    #[serde(default)]
    pub provider: String,
    #[serde(default, rename = "contextTrack")]
    pub track: Option<ContextTrack>,
}

/// Track reference in the shape the host's queue primitives accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    pub uri: String,
}

impl TrackRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// Existing queue entry used as an insert-before point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub uri: String,
    pub uid: String,
}

/// Host features the extension needs before it can register its menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Queue,
    Catalog,
    ContextMenu,
    UriParser,
    Platform,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::Queue,
        Capability::Catalog,
        Capability::ContextMenu,
        Capability::UriParser,
        Capability::Platform,
    ];
}

/// What a single submenu row shows on this render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    pub visible: bool,
    pub label: String,
}

/// Static description of a submenu handed to the host at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubMenuSpec {
    pub label: String,
    pub item_count: usize,
}

/// Read access to the live upcoming list (queued and continuation entries).
#[async_trait]
pub trait QueueSource: Send + Sync {
    async fn next_tracks(&self) -> Result<Vec<QueueEntry>>;
}

/// Album lookups against the catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn album_tracks(&self, album_id: &str) -> Result<Vec<String>>;
}

/// Playlist content lookups. `limit` is the page size requested.
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    async fn playlist_tracks(&self, uri: &str, limit: u64) -> Result<Vec<String>>;
}

/// The two queue mutation primitives the host exposes.
#[async_trait]
pub trait QueueMutator: Send + Sync {
    /// Append to the end of the queue.
    async fn add_to_queue(&self, tracks: &[TrackRef]) -> Result<()>;

    /// Insert immediately before `before`.
    async fn insert_into_queue(&self, tracks: &[TrackRef], before: &Anchor) -> Result<()>;
}

pub trait UriParser: Send + Sync {
    fn resource_type(&self, uri: &str) -> ResourceType;
}

pub trait Notifier: Send + Sync {
    fn show(&self, message: &str, is_error: bool);
}

pub trait CapabilityProbe: Send + Sync {
    fn has_capability(&self, capability: Capability) -> bool;
}

/// Callbacks the host invokes for a registered submenu.
#[async_trait]
pub trait SubMenuHandler: Send + Sync {
    /// Called on every context menu open with the selected URIs.
    async fn should_show(&self, uris: &[String]) -> bool;

    /// Called for every row each time the submenu is shown.
    async fn render_item(&self, index: usize) -> SlotView;

    /// Called when the user picks row `index`. Runs to completion.
    async fn activate(&self, index: usize);
}

pub trait ContextMenuHost: Send + Sync {
    fn register_submenu(&self, spec: SubMenuSpec, handler: Arc<dyn SubMenuHandler>) -> Result<()>;
}

/// Everything the extension consumes from the host, one handle per concern.
#[derive(Clone)]
pub struct HostServices {
    pub queue: Arc<dyn QueueSource>,
    pub catalog: Arc<dyn CatalogApi>,
    pub playlists: Arc<dyn PlaylistApi>,
    pub player: Arc<dyn QueueMutator>,
    pub uris: Arc<dyn UriParser>,
    pub notifier: Arc<dyn Notifier>,
    pub menu: Arc<dyn ContextMenuHost>,
    pub probe: Arc<dyn CapabilityProbe>,
}

impl HostServices {
    /// Build from a single host object that implements every concern.
    pub fn from_host<H>(host: Arc<H>) -> Self
    where
        H: QueueSource
            + CatalogApi
            + PlaylistApi
            + QueueMutator
            + UriParser
            + Notifier
            + ContextMenuHost
            + CapabilityProbe
            + 'static,
    {
        Self {
            queue: host.clone(),
            catalog: host.clone(),
            playlists: host.clone(),
            player: host.clone(),
            uris: host.clone(),
            notifier: host.clone(),
            menu: host.clone(),
            probe: host,
        }
    }
}
