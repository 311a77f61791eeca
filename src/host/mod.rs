pub mod memory;
pub mod traits;
pub mod uri;
pub mod web;

pub use memory::{MemoryHost, Notification, QueueCall};
pub use traits::{
    Anchor, Capability, CapabilityProbe, CatalogApi, ContextMenuHost, ContextTrack, HostServices,
    Notifier, PlaylistApi, QueueEntry, QueueMutator, QueueSource, ResourceType, SlotView,
    SubMenuHandler, SubMenuSpec, TrackRef, UriParser,
};
pub use uri::SpotifyUriParser;
pub use web::WebApi;
