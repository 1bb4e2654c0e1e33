use std::sync::Arc;

use serenity::{builder::CreateMessage, http::Http, model::id::ChannelId};
use serenity::async_trait;
use tracing::warn;

use crate::player::{Notification, NotificationSink};
use crate::ui::embeds;

/// Publica las notificaciones de una sesión como embeds en el canal de
/// texto donde se pidió la música.
pub struct ChannelNotifier {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl ChannelNotifier {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl NotificationSink for ChannelNotifier {
    async fn notify(&self, notification: Notification) {
        let embed = match notification {
            Notification::NowPlaying { track } => embeds::now_playing(&track),
            Notification::TrackQueued { track, position } => {
                embeds::track_queued(&track, position)
            }
            Notification::PlaybackError { title, reason } => {
                embeds::playback_error(&title, &reason)
            }
            Notification::ResolutionFailed { query, reason } => {
                embeds::resolution_failed(&query, &reason)
            }
            Notification::QueueFull { title, max } => embeds::notice(
                "🚫 Cola Llena",
                &format!("**{title}** no entró: la cola ya tiene {max} canciones"),
            ),
            Notification::ConnectionLost { reason } => {
                embeds::notice("🔌 Conexión Perdida", &reason)
            }
            Notification::IdleDisconnect => embeds::notice(
                "👋 Hasta Luego",
                "Me desconecté del canal de voz por inactividad",
            ),
        };

        let message = CreateMessage::new().embed(embed);
        if let Err(e) = self.channel_id.send_message(&self.http, message).await {
            warn!("⚠️ No se pudo enviar la notificación: {}", e);
        }
    }
}
