use chrono::{DateTime, Utc};
use serenity::model::id::UserId;

/// Track resuelto y listo para reproducir.
///
/// Valor inmutable: lo crea el resolver y pasa por la cola y el slot de
/// "reproduciendo ahora" sin mutarse nunca.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackDescriptor {
    pub title: String,
    /// Localizador de stream: URL de YouTube (resuelta a audio al reproducir)
    /// o URL directa de audio.
    pub stream_url: String,
    /// Duración en segundos; `0` significa desconocida o en vivo.
    pub duration_secs: u64,
    pub thumbnail: Option<String>,
    pub requested_by: UserId,
    pub added_at: DateTime<Utc>,
}

impl TrackDescriptor {
    pub fn new(title: String, stream_url: String, requested_by: UserId) -> Self {
        Self {
            title,
            stream_url,
            duration_secs: 0,
            thumbnail: None,
            requested_by,
            added_at: Utc::now(),
        }
    }

    pub fn with_duration_secs(mut self, secs: u64) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: String) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }
}
