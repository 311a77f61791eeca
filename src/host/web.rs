use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::WebConfig;
use crate::host::traits::{CatalogApi, PlaylistApi};
use crate::host::uri::last_segment;

pub const DEFAULT_BASE_URL: &str = "https://api.spotify.com/v1";

/// Largest page the Web API hands out for playlist items.
const PLAYLIST_PAGE_MAX: u64 = 100;

#[derive(Debug, Deserialize)]
struct AlbumResponse {
    tracks: Page<SimplifiedTrack>,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SimplifiedTrack {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    // null for removed or region-locked tracks
    track: Option<SimplifiedTrack>,
}

/// Catalog and playlist lookups over the Spotify Web API 🌐
pub struct WebApi {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl WebApi {
    pub fn new(client: Client, base_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
        }
    }

    pub fn from_config(config: &WebConfig) -> Self {
        Self::new(Client::new(), config.base_url.clone(), config.access_token.clone())
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let mut req = self.client.get(url);
        // `next` links already carry their own query string
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(ref token) = self.access_token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("{} rejected the request", url))?;

        resp.json::<T>()
            .await
            .with_context(|| format!("unexpected response body from {}", url))
    }
}

#[async_trait]
impl CatalogApi for WebApi {
    async fn album_tracks(&self, album_id: &str) -> Result<Vec<String>> {
        let url = format!("{}/albums/{}", self.base_url, album_id);
        let album: AlbumResponse = self.get_json(&url, &[]).await?;

        let mut uris: Vec<String> = album.tracks.items.into_iter().map(|t| t.uri).collect();
        let mut next = album.tracks.next;

        // Albums longer than one page carry a link to the rest
        while let Some(url) = next {
            debug!(%url, "Fetching next album page");
            let page: Page<SimplifiedTrack> = self.get_json(&url, &[]).await?;
            uris.extend(page.items.into_iter().map(|t| t.uri));
            next = page.next;
        }

        Ok(uris)
    }
}

#[async_trait]
impl PlaylistApi for WebApi {
    async fn playlist_tracks(&self, uri: &str, limit: u64) -> Result<Vec<String>> {
        let url = format!("{}/playlists/{}/tracks", self.base_url, last_segment(uri));
        let page_size = limit.clamp(1, PLAYLIST_PAGE_MAX);

        let mut uris = Vec::new();
        let mut page: Page<PlaylistItem> = self
            .get_json(&url, &[("limit", page_size.to_string())])
            .await?;

        loop {
            uris.extend(page.items.into_iter().filter_map(|item| item.track).map(|t| t.uri));

            if uris.len() as u64 >= limit {
                uris.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
                break;
            }
            match page.next {
                Some(next) => page = self.get_json(&next, &[]).await?,
                None => break,
            }
        }

        Ok(uris)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_album_tracks_follow_next_page() {
        let server = MockServer::start().await;
        let next = format!("{}/albums/XYZ/tracks?offset=2", server.uri());

        Mock::given(method("GET"))
            .and(path("/albums/XYZ"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tracks": {
                    "items": [{ "uri": "spotify:track:1" }, { "uri": "spotify:track:2" }],
                    "next": next
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/albums/XYZ/tracks"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "uri": "spotify:track:3" }],
                "next": null
            })))
            .mount(&server)
            .await;

        let api = WebApi::new(Client::new(), server.uri(), Some("secret".into()));
        let tracks = api.album_tracks("XYZ").await.unwrap();

        assert_eq!(tracks, vec!["spotify:track:1", "spotify:track:2", "spotify:track:3"]);
    }

    #[tokio::test]
    async fn test_playlist_tracks_skip_missing_items() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/playlists/abc/tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "track": { "uri": "spotify:track:b" } },
                    { "track": null },
                    { "track": { "uri": "spotify:local:A:B:C:100" } },
                    { "track": { "uri": "spotify:track:a" } }
                ],
                "next": null
            })))
            .mount(&server)
            .await;

        let api = WebApi::from_config(&WebConfig {
            base_url: format!("{}/", server.uri()),
            access_token: None,
        });
        let tracks = api.playlist_tracks("spotify:playlist:abc", u64::MAX).await.unwrap();

        assert_eq!(
            tracks,
            vec!["spotify:track:b", "spotify:local:A:B:C:100", "spotify:track:a"]
        );
    }

    #[tokio::test]
    async fn test_playlist_tracks_follow_next_page() {
        let server = MockServer::start().await;
        let next = format!("{}/playlists/abc/tracks?offset=2&limit=100", server.uri());

        Mock::given(method("GET"))
            .and(path("/playlists/abc/tracks"))
            .and(query_param("limit", "100"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "track": { "uri": "spotify:track:3" } }],
                "next": null
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/playlists/abc/tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "track": { "uri": "spotify:track:1" } },
                    { "track": { "uri": "spotify:track:2" } }
                ],
                "next": next
            })))
            .mount(&server)
            .await;

        let api = WebApi::new(Client::new(), server.uri(), None);
        let tracks = api.playlist_tracks("spotify:playlist:abc", u64::MAX).await.unwrap();

        assert_eq!(tracks, vec!["spotify:track:1", "spotify:track:2", "spotify:track:3"]);
    }

    #[tokio::test]
    async fn test_playlist_tracks_stop_at_limit() {
        let server = MockServer::start().await;
        let next = format!("{}/playlists/abc/tracks?offset=2&limit=2", server.uri());

        Mock::given(method("GET"))
            .and(path("/playlists/abc/tracks"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "track": { "uri": "spotify:track:1" } },
                    { "track": null },
                    { "track": { "uri": "spotify:track:2" } }
                ],
                "next": next
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = WebApi::new(Client::new(), server.uri(), None);
        let tracks = api.playlist_tracks("spotify:playlist:abc", 2).await.unwrap();

        assert_eq!(tracks, vec!["spotify:track:1", "spotify:track:2"]);
    }

    #[tokio::test]
    async fn test_http_error_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/albums/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let api = WebApi::new(Client::new(), server.uri(), None);
        assert!(api.album_tracks("gone").await.is_err());
    }
}
