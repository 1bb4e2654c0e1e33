pub mod driver;
pub mod engine;
pub mod error;
pub mod notify;
pub mod queue;
pub mod reaper;
pub mod registry;
pub mod session;
pub mod track;
pub mod transport;

#[cfg(test)]
pub(crate) mod testutil;

use std::sync::Arc;

use serenity::model::id::{ChannelId, GuildId, UserId};
use tokio::sync::oneshot;
use tracing::{info, warn};

pub use error::RegistryError;
pub use notify::{Notification, NotificationSink};
pub use registry::SessionRegistry;
pub use session::{QueueSnapshot, SessionCommand, SessionConfig};
pub use track::TrackDescriptor;

use crate::sources::TrackResolver;

/// Fachada del reproductor: resuelve búsquedas y enruta peticiones a la
/// sesión de cada servidor.
pub struct PlayerService {
    registry: Arc<SessionRegistry>,
    resolver: Arc<TrackResolver>,
}

impl PlayerService {
    pub fn new(registry: Arc<SessionRegistry>, resolver: Arc<TrackResolver>) -> Self {
        Self { registry, resolver }
    }

    /// Resuelve la consulta y encola el resultado en la sesión del servidor,
    /// creándola si hace falta. La resolución va primero: una consulta
    /// irresoluble jamás crea sesión ni conexión de voz.
    pub async fn request_play(
        &self,
        guild_id: GuildId,
        voice_channel_id: ChannelId,
        query: &str,
        requested_by: UserId,
        sink: Arc<dyn NotificationSink>,
    ) {
        let track = match self.resolver.resolve(query, requested_by).await {
            Ok(track) => track,
            Err(e) => {
                warn!("🔍 Resolución fallida para '{}': {}", query, e);
                sink.notify(Notification::ResolutionFailed {
                    query: query.to_string(),
                    reason: notify::truncate_reason(&e.to_string()),
                })
                .await;
                return;
            }
        };

        info!("🎶 Resuelto '{}' → '{}'", query, track.title);
        let handle = self
            .registry
            .get_or_create(guild_id, voice_channel_id, sink);
        let _ = handle.send(SessionCommand::Enqueue { track });
    }

    /// Salta el track actual de la sesión del servidor.
    pub fn request_skip(&self, guild_id: GuildId) -> Result<(), RegistryError> {
        self.registry
            .get(guild_id)
            .ok_or(RegistryError::NoSession)?
            .send(SessionCommand::Skip)
    }

    /// Detiene la sesión del servidor. Idempotente: sin sesión viva no hay
    /// nada que detener y eso no es un error.
    pub fn request_stop(&self, guild_id: GuildId) {
        if let Some(handle) = self.registry.get(guild_id) {
            let _ = handle.send(SessionCommand::Stop);
        }
    }

    /// Vista de la cola de la sesión del servidor, si existe.
    pub async fn request_queue_view(&self, guild_id: GuildId) -> Option<QueueSnapshot> {
        let handle = self.registry.get(guild_id)?;
        let (tx, rx) = oneshot::channel();
        handle.send(SessionCommand::QueueView { reply: tx }).ok()?;
        rx.await.ok()
    }
}
