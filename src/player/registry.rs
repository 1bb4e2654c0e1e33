use std::sync::Arc;

use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId};
use tracing::{debug, info};

use super::notify::NotificationSink;
use super::session::{self, SessionConfig, SessionHandle};
use super::transport::VoiceTransport;

/// Registro de sesiones vivas, una por servidor.
///
/// La entrada del mapa es la existencia de la sesión: se inserta al crearla
/// y la tarea de sesión la retira en su epílogo de cierre.
pub struct SessionRegistry {
    sessions: DashMap<GuildId, SessionHandle>,
    transport: Arc<dyn VoiceTransport>,
    config: SessionConfig,
}

impl SessionRegistry {
    pub fn new(transport: Arc<dyn VoiceTransport>, config: SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            transport,
            config,
        }
    }

    /// Devuelve la sesión del servidor, creándola si no existe. La creación
    /// es atómica: dos llamadas concurrentes obtienen la misma sesión.
    pub fn get_or_create(
        self: &Arc<Self>,
        guild_id: GuildId,
        channel_id: ChannelId,
        sink: Arc<dyn NotificationSink>,
    ) -> SessionHandle {
        self.sessions
            .entry(guild_id)
            .or_insert_with(|| {
                info!("🆕 Creando sesión para guild {}", guild_id);
                session::spawn(
                    guild_id,
                    channel_id,
                    Arc::clone(&self.transport),
                    sink,
                    self.config.clone(),
                    Arc::clone(self),
                )
            })
            .value()
            .clone()
    }

    pub fn get(&self, guild_id: GuildId) -> Option<SessionHandle> {
        self.sessions.get(&guild_id).map(|entry| entry.value().clone())
    }

    /// Retira la sesión del registro. Lo llama la propia tarea al terminar.
    pub fn remove(&self, guild_id: GuildId) {
        if self.sessions.remove(&guild_id).is_some() {
            debug!("🗂️ Sesión de guild {} retirada del registro", guild_id);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }
}
