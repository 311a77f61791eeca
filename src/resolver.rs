//! Turns what the user right-clicked into an ordered list of playable tracks.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::error::Error;
use crate::host::{CatalogApi, PlaylistApi, ResourceType, UriParser};

/// Page size requested from the playlist API: everything in one call.
pub const UNBOUNDED_PAGE_LIMIT: u64 = u64::MAX;

/// The URIs a context menu was opened on. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    uris: Vec<String>,
}

impl Selection {
    pub fn new(uris: Vec<String>) -> Option<Self> {
        if uris.is_empty() {
            None
        } else {
            Some(Self { uris })
        }
    }

    pub fn uris(&self) -> &[String] {
        &self.uris
    }

    pub fn is_multi(&self) -> bool {
        self.uris.len() > 1
    }

    /// The first identifier; the only one for single selections.
    pub fn first(&self) -> &str {
        &self.uris[0]
    }
}

/// Album id of `spotify:album:<id>`: the third colon-delimited segment.
pub fn album_id(uri: &str) -> Result<&str, Error> {
    uri.split(':')
        .nth(2)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::InvalidUri(uri.to_string()))
}

pub struct SelectionResolver {
    uris: Arc<dyn UriParser>,
    catalog: Arc<dyn CatalogApi>,
    playlists: Arc<dyn PlaylistApi>,
}

impl SelectionResolver {
    pub fn new(uris: Arc<dyn UriParser>, catalog: Arc<dyn CatalogApi>, playlists: Arc<dyn PlaylistApi>) -> Self {
        Self {
            uris,
            catalog,
            playlists,
        }
    }

    /// Multi-selections are always eligible; single items only when they
    /// expand to tracks.
    pub fn is_eligible(&self, uris: &[String]) -> bool {
        match uris {
            [] => false,
            [single] => matches!(
                self.uris.resource_type(single),
                ResourceType::Track
                    | ResourceType::Playlist
                    | ResourceType::PlaylistV2
                    | ResourceType::Album
                    | ResourceType::Local
            ),
            _ => true,
        }
    }

    /// Expand a selection into track URIs in source order. Fetches fresh
    /// every time so playlist edits are picked up.
    pub async fn resolve(&self, selection: &Selection) -> Result<Vec<String>> {
        if selection.is_multi() {
            return Ok(selection.uris().to_vec());
        }

        let uri = selection.first();
        let tracks = match self.uris.resource_type(uri) {
            ResourceType::Track | ResourceType::Local => vec![uri.to_string()],
            ResourceType::Playlist | ResourceType::PlaylistV2 => self
                .playlists
                .playlist_tracks(uri, UNBOUNDED_PAGE_LIMIT)
                .await
                .with_context(|| format!("Failed to fetch playlist {}", uri))?,
            ResourceType::Album => {
                let id = album_id(uri)?;
                self.catalog
                    .album_tracks(id)
                    .await
                    .with_context(|| format!("Failed to fetch album {}", id))?
            }
            ResourceType::Other => Vec::new(),
        };

        debug!(%uri, count = tracks.len(), "Resolved selection");
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    fn resolver(host: &Arc<MemoryHost>) -> SelectionResolver {
        SelectionResolver::new(host.clone(), host.clone(), host.clone())
    }

    fn selection(uris: &[&str]) -> Selection {
        Selection::new(uris.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn strings(uris: &[&str]) -> Vec<String> {
        uris.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        assert!(Selection::new(Vec::new()).is_none());
    }

    #[test]
    fn test_album_id_is_third_segment() {
        assert_eq!(album_id("spotify:album:XYZ").unwrap(), "XYZ");
        assert!(album_id("spotify:album").is_err());
        assert!(album_id("spotify:album:").is_err());
    }

    #[test]
    fn test_eligibility() {
        let host = Arc::new(MemoryHost::new());
        let r = resolver(&host);

        assert!(r.is_eligible(&strings(&["spotify:track:a"])));
        assert!(r.is_eligible(&strings(&["spotify:album:a"])));
        assert!(r.is_eligible(&strings(&["spotify:playlist:a"])));
        assert!(r.is_eligible(&strings(&["spotify:user:u:playlist:a"])));
        assert!(r.is_eligible(&strings(&["spotify:local:a:b:c:1"])));

        assert!(!r.is_eligible(&strings(&["spotify:artist:a"])));
        assert!(!r.is_eligible(&[]));

        // Anything goes once there is more than one item
        assert!(r.is_eligible(&strings(&["spotify:artist:a", "spotify:show:b"])));
    }

    #[tokio::test]
    async fn test_multi_selection_is_verbatim() {
        let host = Arc::new(MemoryHost::new());
        host.fail_fetches(true);

        let uris = ["spotify:track:c", "spotify:album:a", "spotify:track:b"];
        let tracks = resolver(&host).resolve(&selection(&uris)).await.unwrap();

        assert_eq!(tracks, strings(&uris));
    }

    #[tokio::test]
    async fn test_single_track_and_local() {
        let host = Arc::new(MemoryHost::new());
        host.fail_fetches(true);
        let r = resolver(&host);

        let track = r.resolve(&selection(&["spotify:track:a"])).await.unwrap();
        assert_eq!(track, strings(&["spotify:track:a"]));

        let local = r.resolve(&selection(&["spotify:local:A:B:C:10"])).await.unwrap();
        assert_eq!(local, strings(&["spotify:local:A:B:C:10"]));
    }

    #[tokio::test]
    async fn test_playlist_keeps_source_order() {
        let host = Arc::new(MemoryHost::new());
        host.add_playlist("spotify:playlist:p", &["spotify:track:3", "spotify:track:1", "spotify:track:2"]);
        host.add_playlist("spotify:user:me:playlist:q", &["spotify:track:9"]);
        let r = resolver(&host);

        let tracks = r.resolve(&selection(&["spotify:playlist:p"])).await.unwrap();
        assert_eq!(tracks, strings(&["spotify:track:3", "spotify:track:1", "spotify:track:2"]));

        let legacy = r.resolve(&selection(&["spotify:user:me:playlist:q"])).await.unwrap();
        assert_eq!(legacy, strings(&["spotify:track:9"]));

        // Whole playlist in one call, no page cap
        assert_eq!(host.playlist_limits(), vec![u64::MAX, u64::MAX]);
        assert_eq!(UNBOUNDED_PAGE_LIMIT, u64::MAX);
    }

    #[tokio::test]
    async fn test_album_fetch_uses_album_id() {
        let host = Arc::new(MemoryHost::new());
        host.add_album("XYZ", &["spotify:track:x1", "spotify:track:x2"]);

        let tracks = resolver(&host).resolve(&selection(&["spotify:album:XYZ"])).await.unwrap();
        assert_eq!(tracks, strings(&["spotify:track:x1", "spotify:track:x2"]));
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let host = Arc::new(MemoryHost::new());
        host.add_album("XYZ", &["spotify:track:x1"]);
        host.fail_fetches(true);

        let err = resolver(&host).resolve(&selection(&["spotify:album:XYZ"])).await.unwrap_err();
        assert!(err.to_string().contains("XYZ"));
    }

    #[tokio::test]
    async fn test_unsupported_single_resolves_empty() {
        let host = Arc::new(MemoryHost::new());
        let tracks = resolver(&host).resolve(&selection(&["spotify:artist:a"])).await.unwrap();
        assert!(tracks.is_empty());
    }
}
