use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId};
use songbird::events::{CoreEvent, Event, EventContext, EventHandler as VoiceEventHandler, TrackEvent};
use songbird::input::{HttpRequest, Input, YoutubeDl};
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::Songbird;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use super::error::{StreamError, TransportError};
use super::transport::{TransportSignal, VoiceTransport};
use crate::sources::youtube;

/// Transporte de voz real sobre songbird.
///
/// Traduce los eventos del driver a señales de sesión y mantiene el handle
/// del track activo de cada servidor para poder detenerlo.
pub struct DiscordTransport {
    manager: Arc<Songbird>,
    http: reqwest::Client,
    tracks: DashMap<GuildId, TrackHandle>,
    signals: DashMap<GuildId, UnboundedSender<TransportSignal>>,
}

impl DiscordTransport {
    pub fn new(manager: Arc<Songbird>, http: reqwest::Client) -> Self {
        Self {
            manager,
            http,
            tracks: DashMap::new(),
            signals: DashMap::new(),
        }
    }
}

#[async_trait]
impl VoiceTransport for DiscordTransport {
    async fn connect(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        signals: UnboundedSender<TransportSignal>,
    ) -> Result<(), TransportError> {
        let call = self
            .manager
            .join(guild_id, channel_id)
            .await
            .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;

        self.signals.insert(guild_id, signals.clone());

        let mut call = call.lock().await;
        call.remove_all_global_events();
        call.add_global_event(
            Event::Core(CoreEvent::DriverDisconnect),
            SignalForwarder {
                signals: signals.clone(),
            },
        );
        call.add_global_event(
            Event::Core(CoreEvent::DriverReconnect),
            SignalForwarder { signals },
        );
        Ok(())
    }

    async fn open_stream(
        &self,
        guild_id: GuildId,
        locator: &str,
        seq: u64,
    ) -> Result<(), StreamError> {
        let call = self
            .manager
            .get(guild_id)
            .ok_or_else(|| StreamError("sin conexión de voz activa".to_string()))?;
        let signals = self
            .signals
            .get(&guild_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StreamError("sin canal de señales registrado".to_string()))?;

        // yt-dlp resuelve los enlaces de YouTube; el resto se trata como
        // audio directo por HTTP.
        let input: Input = if youtube::is_youtube_url(locator) {
            YoutubeDl::new(self.http.clone(), locator.to_string()).into()
        } else {
            HttpRequest::new(self.http.clone(), locator.to_string()).into()
        };

        let mut call = call.lock().await;
        let handle = call.play_input(input);
        handle
            .add_event(
                Event::Track(TrackEvent::End),
                TrackSignal {
                    signals: signals.clone(),
                    seq,
                    failed: false,
                },
            )
            .map_err(|e| StreamError(e.to_string()))?;
        handle
            .add_event(
                Event::Track(TrackEvent::Error),
                TrackSignal {
                    signals,
                    seq,
                    failed: true,
                },
            )
            .map_err(|e| StreamError(e.to_string()))?;

        self.tracks.insert(guild_id, handle);
        debug!("🎧 Stream abierto (seq {}) en guild {}", seq, guild_id);
        Ok(())
    }

    async fn stop_stream(&self, guild_id: GuildId) {
        if let Some((_, handle)) = self.tracks.remove(&guild_id) {
            // stop dispara el evento End del track, igual que un fin natural.
            if let Err(e) = handle.stop() {
                warn!("⚠️ No se pudo detener el track en guild {}: {}", guild_id, e);
            }
        }
    }

    async fn destroy(&self, guild_id: GuildId) {
        self.tracks.remove(&guild_id);
        self.signals.remove(&guild_id);
        if let Err(e) = self.manager.remove(guild_id).await {
            warn!("⚠️ Error al salir del canal de voz en guild {}: {}", guild_id, e);
        }
    }
}

/// Reenvía los eventos de conexión del driver como señales de sesión.
struct SignalForwarder {
    signals: UnboundedSender<TransportSignal>,
}

#[async_trait]
impl VoiceEventHandler for SignalForwarder {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        match ctx {
            EventContext::DriverDisconnect(_) => {
                let _ = self.signals.send(TransportSignal::Disconnected);
            }
            EventContext::DriverReconnect(_) => {
                let _ = self.signals.send(TransportSignal::Reconnected);
            }
            _ => {}
        }
        None
    }
}

/// Reenvía el fin o la falla de un track con su número de secuencia.
struct TrackSignal {
    signals: UnboundedSender<TransportSignal>,
    seq: u64,
    failed: bool,
}

#[async_trait]
impl VoiceEventHandler for TrackSignal {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        let signal = if self.failed {
            let reason = match ctx {
                EventContext::Track(list) => list
                    .first()
                    .and_then(|(state, _)| match &state.playing {
                        PlayMode::Errored(e) => Some(e.to_string()),
                        _ => None,
                    })
                    .unwrap_or_else(|| "error de reproducción".to_string()),
                _ => "error de reproducción".to_string(),
            };
            TransportSignal::TrackFailed {
                seq: self.seq,
                reason,
            }
        } else {
            TransportSignal::TrackEnded { seq: self.seq }
        };

        let _ = self.signals.send(signal);
        None
    }
}
