use async_trait::async_trait;
use serenity::model::id::UserId;
use tracing::debug;
use url::Url;

use super::{MusicSource, ResolutionError};
use crate::player::track::TrackDescriptor;

const AUDIO_EXTENSIONS: [&str; 6] = [".mp3", ".wav", ".ogg", ".flac", ".m4a", ".opus"];

/// Cliente para enlaces directos a archivos de audio.
///
/// Sin búsqueda: valida el enlace con una petición HEAD y deriva el título
/// del nombre de archivo. La duración queda en 0 (desconocida) porque una
/// URL directa no trae metadata.
pub struct DirectUrlClient {
    client: reqwest::Client,
}

impl DirectUrlClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MusicSource for DirectUrlClient {
    async fn search(
        &self,
        query: &str,
        _limit: usize,
    ) -> Result<Vec<TrackDescriptor>, ResolutionError> {
        // Un enlace directo no es un índice buscable.
        Err(ResolutionError::NotFound(query.to_string()))
    }

    async fn get_track(&self, url: &str) -> Result<TrackDescriptor, ResolutionError> {
        debug!("🔗 Validando enlace directo: {}", url);

        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|_| ResolutionError::InvalidLink(url.to_string()))?;

        if !response.status().is_success() {
            return Err(ResolutionError::InvalidLink(url.to_string()));
        }

        let is_audio = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|content_type| content_type.starts_with("audio/"))
            .unwrap_or(false);

        if !is_audio && !has_audio_extension(url) {
            return Err(ResolutionError::InvalidLink(url.to_string()));
        }

        Ok(TrackDescriptor::new(
            title_from_url(url),
            url.to_string(),
            UserId::default(),
        ))
    }

    fn is_valid_url(&self, url: &str) -> bool {
        (url.starts_with("http://") || url.starts_with("https://")) && has_audio_extension(url)
    }

    fn source_name(&self) -> &'static str {
        "direct"
    }
}

fn has_audio_extension(url: &str) -> bool {
    let path = Url::parse(url)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_else(|_| url.to_lowercase());
    AUDIO_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Deriva un título presentable del último segmento del path.
fn title_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.last().map(str::to_string))
        })
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_audio_extension_detection() {
        let client = DirectUrlClient::new(reqwest::Client::new());
        assert!(client.is_valid_url("https://cdn.example.com/temas/cancion.mp3"));
        assert!(client.is_valid_url("https://cdn.example.com/cancion.OGG"));
        assert!(!client.is_valid_url("https://cdn.example.com/pagina.html"));
        assert!(!client.is_valid_url("ftp://cdn.example.com/cancion.mp3"));
    }

    #[test]
    fn test_title_from_url() {
        assert_eq!(
            title_from_url("https://cdn.example.com/temas/cancion.mp3"),
            "cancion.mp3"
        );
    }

    #[test]
    fn test_extension_ignores_query_string() {
        assert!(has_audio_extension(
            "https://cdn.example.com/cancion.mp3?token=abc"
        ));
    }
}
