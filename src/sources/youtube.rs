use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serenity::model::id::UserId;
use std::sync::OnceLock;
use tracing::{debug, error};

use super::duration::parse_iso8601_secs;
use super::{MusicSource, ResolutionError};
use crate::player::track::TrackDescriptor;

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";
const VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    items: Vec<VideoDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoDetails {
    id: String,
    snippet: VideoSnippet,
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: String,
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize, Clone)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

/// Cliente de búsqueda y metadata contra la YouTube Data API v3.
pub struct YouTubeClient {
    api_key: String,
    client: reqwest::Client,
}

impl YouTubeClient {
    pub fn new(api_key: String, client: reqwest::Client) -> Self {
        Self { api_key, client }
    }

    /// Resuelve una lista de IDs de video a descriptores con duración.
    async fn lookup_videos(&self, ids: &[String]) -> Result<Vec<TrackDescriptor>, ResolutionError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(VIDEOS_ENDPOINT)
            .query(&[
                ("part", "snippet,contentDetails"),
                ("id", &ids.join(",")),
                ("key", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| ResolutionError::Provider(e.to_string()))?;

        let response = map_api_status(response)?;
        let videos: VideosResponse = response
            .json()
            .await
            .map_err(|e| ResolutionError::Provider(e.to_string()))?;

        Ok(videos
            .items
            .into_iter()
            .map(|video| {
                let url = format!("https://www.youtube.com/watch?v={}", video.id);
                let thumbnail = video
                    .snippet
                    .thumbnails
                    .high
                    .clone()
                    .or(video.snippet.thumbnails.medium.clone())
                    .map(|t| t.url);

                let mut track = TrackDescriptor::new(video.snippet.title, url, UserId::default())
                    .with_duration_secs(parse_iso8601_secs(&video.content_details.duration));
                if let Some(thumbnail) = thumbnail {
                    track = track.with_thumbnail(thumbnail);
                }
                track
            })
            .collect())
    }
}

#[async_trait]
impl MusicSource for YouTubeClient {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<TrackDescriptor>, ResolutionError> {
        debug!("🔍 Búsqueda YouTube: {}", query);

        let response = self
            .client
            .get(SEARCH_ENDPOINT)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", &limit.to_string()),
                ("key", &self.api_key),
                ("order", "relevance"),
            ])
            .send()
            .await
            .map_err(|e| ResolutionError::Provider(e.to_string()))?;

        let response = map_api_status(response)?;
        let results: SearchResponse = response
            .json()
            .await
            .map_err(|e| ResolutionError::Provider(e.to_string()))?;

        let ids: Vec<String> = results
            .items
            .into_iter()
            .map(|item| item.id.video_id)
            .collect();

        self.lookup_videos(&ids).await
    }

    async fn get_track(&self, url: &str) -> Result<TrackDescriptor, ResolutionError> {
        let video_id =
            extract_video_id(url).ok_or_else(|| ResolutionError::InvalidLink(url.to_string()))?;

        self.lookup_videos(&[video_id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ResolutionError::NotFound(url.to_string()))
    }

    fn is_valid_url(&self, url: &str) -> bool {
        is_youtube_url(url)
    }

    fn source_name(&self) -> &'static str {
        "YouTube"
    }
}

/// Convierte los estados HTTP de la API en errores de resolución. Cuota
/// agotada o demasiadas peticiones se reportan como rate limit, no como
/// "sin resultados".
fn map_api_status(response: reqwest::Response) -> Result<reqwest::Response, ResolutionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    error!("❌ YouTube API respondió {}", status);
    match status.as_u16() {
        403 | 429 => Err(ResolutionError::ProviderRateLimited),
        _ => Err(ResolutionError::Provider(format!(
            "YouTube API respondió {status}"
        ))),
    }
}

/// Detecta enlaces de YouTube en cualquiera de sus dominios habituales.
pub fn is_youtube_url(url: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^https?://(www\.|m\.|music\.)?(youtube\.com|youtu\.be)/").expect("regex válida")
    });
    pattern.is_match(url)
}

/// Extrae el ID de video de un enlace de YouTube.
pub fn extract_video_id(url: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"(?:youtube\.com/(?:watch\?v=|embed/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})")
            .expect("regex válida")
    });
    pattern
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
