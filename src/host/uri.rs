use crate::host::traits::{ResourceType, UriParser};

/// Classifies `spotify:` URIs the way the desktop client does.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpotifyUriParser;

impl UriParser for SpotifyUriParser {
    fn resource_type(&self, uri: &str) -> ResourceType {
        classify(uri)
    }
}

pub fn classify(uri: &str) -> ResourceType {
    let parts: Vec<&str> = uri.split(':').collect();
    if parts.len() < 3 || parts[0] != "spotify" {
        return ResourceType::Other;
    }

    match parts[1] {
        "track" if parts.len() == 3 && !parts[2].is_empty() => ResourceType::Track,
        "album" if parts.len() == 3 && !parts[2].is_empty() => ResourceType::Album,
        "playlist" if parts.len() == 3 && !parts[2].is_empty() => ResourceType::PlaylistV2,
        // spotify:user:<user>:playlist:<id>
        "user" if parts.len() == 5 && parts[3] == "playlist" && !parts[4].is_empty() => {
            ResourceType::Playlist
        }
        // spotify:local:<artist>:<album>:<title>:<duration>, fields may be empty
        "local" => ResourceType::Local,
        _ => ResourceType::Other,
    }
}

/// Last colon-delimited segment, which is the id for every supported type.
pub fn last_segment(uri: &str) -> &str {
    uri.rsplit(':').next().unwrap_or(uri)
}
