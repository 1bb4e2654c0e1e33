use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serenity::model::id::{ChannelId, GuildId};
use tokio::sync::mpsc::UnboundedSender;

use super::error::{StreamError, TransportError};
use super::notify::{Notification, NotificationSink};
use super::transport::{TransportSignal, VoiceTransport};

/// Sink que solo acumula notificaciones para inspeccionarlas en los tests.
#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<Notification> {
        self.events.lock().clone()
    }

    pub(crate) fn now_playing_titles(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                Notification::NowPlaying { track } => Some(track.title.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn count(&self, predicate: impl Fn(&Notification) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, notification: Notification) {
        self.events.lock().push(notification);
    }
}

#[derive(Default)]
struct FakeInner {
    signals: HashMap<GuildId, UnboundedSender<TransportSignal>>,
    opened: Vec<(GuildId, String, u64)>,
    failing: HashSet<String>,
    active: HashMap<GuildId, u64>,
}

/// Transporte controlable desde los tests: registra cada stream abierto y
/// permite inyectar señales como lo haría el driver real.
#[derive(Default)]
pub(crate) struct FakeTransport {
    pub(crate) connects: AtomicUsize,
    pub(crate) destroys: AtomicUsize,
    connect_fails: AtomicUsize,
    inner: Mutex<FakeInner>,
}

impl FakeTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hace fallar los próximos `n` intentos de conexión.
    pub(crate) fn fail_next_connects(&self, n: usize) {
        self.connect_fails.store(n, Ordering::SeqCst);
    }

    /// Marca un localizador para que `open_stream` falle al abrirlo.
    pub(crate) fn fail_open(&self, locator: &str) {
        self.inner.lock().failing.insert(locator.to_string());
    }

    pub(crate) fn opened(&self, guild_id: GuildId) -> Vec<String> {
        self.inner
            .lock()
            .opened
            .iter()
            .filter(|(guild, _, _)| *guild == guild_id)
            .map(|(_, locator, _)| locator.clone())
            .collect()
    }

    fn send(&self, guild_id: GuildId, signal: TransportSignal) {
        let sender = self.inner.lock().signals.get(&guild_id).cloned();
        if let Some(sender) = sender {
            let _ = sender.send(signal);
        }
    }

    /// Emite el fin natural del stream activo.
    pub(crate) fn end_track(&self, guild_id: GuildId) {
        let seq = self.inner.lock().active.remove(&guild_id);
        if let Some(seq) = seq {
            self.send(guild_id, TransportSignal::TrackEnded { seq });
        }
    }

    /// Emite la falla a mitad de reproducción del stream activo.
    pub(crate) fn fail_track(&self, guild_id: GuildId, reason: &str) {
        let seq = self.inner.lock().active.remove(&guild_id);
        if let Some(seq) = seq {
            self.send(
                guild_id,
                TransportSignal::TrackFailed {
                    seq,
                    reason: reason.to_string(),
                },
            );
        }
    }

    /// Emite una señal de fin con una secuencia arbitraria, como haría un
    /// evento rezagado del driver.
    pub(crate) fn end_track_with_seq(&self, guild_id: GuildId, seq: u64) {
        self.send(guild_id, TransportSignal::TrackEnded { seq });
    }

    pub(crate) fn drop_connection(&self, guild_id: GuildId) {
        self.send(guild_id, TransportSignal::Disconnected);
    }

    pub(crate) fn restore_connection(&self, guild_id: GuildId) {
        self.send(guild_id, TransportSignal::Reconnected);
    }
}

#[async_trait]
impl VoiceTransport for FakeTransport {
    async fn connect(
        &self,
        guild_id: GuildId,
        _channel_id: ChannelId,
        signals: UnboundedSender<TransportSignal>,
    ) -> Result<(), TransportError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let remaining = self.connect_fails.load(Ordering::SeqCst);
        if remaining > 0 {
            self.connect_fails.store(remaining - 1, Ordering::SeqCst);
            return Err(TransportError::ConnectFailed("fallo simulado".to_string()));
        }
        self.inner.lock().signals.insert(guild_id, signals);
        Ok(())
    }

    async fn open_stream(
        &self,
        guild_id: GuildId,
        locator: &str,
        seq: u64,
    ) -> Result<(), StreamError> {
        let mut inner = self.inner.lock();
        inner.opened.push((guild_id, locator.to_string(), seq));
        if inner.failing.contains(locator) {
            return Err(StreamError(format!("no se pudo abrir {locator}")));
        }
        inner.active.insert(guild_id, seq);
        Ok(())
    }

    async fn stop_stream(&self, guild_id: GuildId) {
        // Igual que el driver real: detener emite la misma señal de fin
        // que un término natural.
        self.end_track(guild_id);
    }

    async fn destroy(&self, guild_id: GuildId) {
        self.destroys.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock();
        inner.signals.remove(&guild_id);
        inner.active.remove(&guild_id);
    }
}

/// Espera activa con pasos cortos de tiempo virtual hasta que la condición
/// se cumpla.
pub(crate) async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("la condición esperada nunca se cumplió");
}
