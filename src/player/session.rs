use std::sync::Arc;
use std::time::Duration;

use serenity::model::id::{ChannelId, GuildId};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::engine;
use super::error::{RegistryError, TransportError};
use super::notify::{truncate_reason, Notification, NotificationSink};
use super::queue::SessionQueue;
use super::reaper::InactivityReaper;
use super::registry::SessionRegistry;
use super::track::TrackDescriptor;
use super::transport::{TransportConnection, TransportSignal, VoiceTransport};

/// Parámetros de comportamiento de una sesión.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub max_queue_size: usize,
    /// Gracia de inactividad antes de cerrar la sesión.
    pub idle_grace: Duration,
    /// Plazo para distinguir una mudanza de canal de una caída real.
    pub reconnect_grace: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 1000,
            idle_grace: Duration::from_secs(300),
            reconnect_grace: Duration::from_secs(5),
        }
    }
}

/// Peticiones entrantes hacia una sesión.
#[derive(Debug)]
pub enum SessionCommand {
    Enqueue { track: TrackDescriptor },
    Skip,
    Stop,
    QueueView { reply: oneshot::Sender<QueueSnapshot> },
}

/// Todo lo que puede despertar a la tarea de sesión.
///
/// Toda mutación del estado de la sesión ocurre al procesar uno de estos
/// eventos, uno por vez: dos manejadores del mismo servidor nunca corren
/// intercalados.
#[derive(Debug)]
pub enum SessionEvent {
    Command(SessionCommand),
    /// Chequeo diferido del reaper de inactividad, sellado con la época
    /// en que se armó.
    ReaperCheck { epoch: u64 },
    /// Venció el plazo de recuperación de la época de desconexión dada.
    ReconnectTimeout { epoch: u64 },
}

/// Vista de solo lectura del estado de una sesión.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSnapshot {
    pub current: Option<TrackDescriptor>,
    pub upcoming: Vec<TrackDescriptor>,
    /// Estado del motor; el invariante es `playing == current.is_some()`.
    pub playing: bool,
}

/// Estado de reproducción de una sesión, propiedad exclusiva de su tarea.
pub(crate) struct SessionState {
    pub(crate) guild_id: GuildId,
    pub(crate) queue: SessionQueue,
    pub(crate) engine: engine::EngineState,
    pub(crate) current: Option<TrackDescriptor>,
    /// Secuencia de reproducción: invalida señales de fin obsoletas.
    pub(crate) play_seq: u64,
    pub(crate) connection: TransportConnection,
    pub(crate) sink: Arc<dyn NotificationSink>,
    pub(crate) events: mpsc::UnboundedSender<SessionEvent>,
    pub(crate) reaper: InactivityReaper,
}

impl SessionState {
    fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            current: self.current.clone(),
            upcoming: self.queue.tracks(),
            playing: matches!(self.engine, engine::EngineState::Playing),
        }
    }
}

/// Handle de una sesión viva: la única vía de acceso desde fuera de su tarea.
#[derive(Clone)]
pub struct SessionHandle {
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    /// Entrega una petición a la tarea de sesión. Falla solo si la sesión
    /// ya terminó.
    pub fn send(&self, command: SessionCommand) -> Result<(), RegistryError> {
        self.events
            .send(SessionEvent::Command(command))
            .map_err(|_| RegistryError::NoSession)
    }
}

/// Crea la sesión de un servidor y arranca su tarea.
pub(crate) fn spawn(
    guild_id: GuildId,
    channel_id: ChannelId,
    transport: Arc<dyn VoiceTransport>,
    sink: Arc<dyn NotificationSink>,
    config: SessionConfig,
    registry: Arc<SessionRegistry>,
) -> SessionHandle {
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let state = SessionState {
        guild_id,
        queue: SessionQueue::new(config.max_queue_size),
        engine: engine::EngineState::Idle,
        current: None,
        play_seq: 0,
        connection: TransportConnection::new(transport, guild_id, channel_id),
        sink,
        events: events_tx.clone(),
        reaper: InactivityReaper::new(config.idle_grace),
    };

    let reconnect_grace = config.reconnect_grace;
    tokio::spawn(async move {
        run(state, events_rx, reconnect_grace, registry).await;
    });

    SessionHandle { events: events_tx }
}

/// Bucle de eventos de la sesión. Termina en cualquier camino de cierre:
/// stop explícito, reaper, o caída de transporte irrecuperable.
async fn run(
    mut state: SessionState,
    mut events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    reconnect_grace: Duration,
    registry: Arc<SessionRegistry>,
) {
    let (signals_tx, mut signals_rx) = mpsc::unbounded_channel();

    // Conectar es lo primero; un fallo aquí es fatal para la sesión.
    if let Err(e) = state.connection.connect(signals_tx).await {
        error!("❌ Conexión de voz falló en guild {}: {}", state.guild_id, e);
        state
            .sink
            .notify(Notification::ConnectionLost {
                reason: truncate_reason(&e.to_string()),
            })
            .await;
        registry.remove(state.guild_id);
        return;
    }

    loop {
        tokio::select! {
            maybe_signal = signals_rx.recv() => {
                let Some(signal) = maybe_signal else { break };
                if !handle_signal(&mut state, signal, reconnect_grace).await {
                    break;
                }
            }
            maybe_event = events_rx.recv() => {
                let Some(event) = maybe_event else { break };
                if !handle_event(&mut state, event).await {
                    break;
                }
            }
        }
    }

    // Epílogo único de cierre: destruir transporte y salir del registro.
    state.connection.destroy().await;
    registry.remove(state.guild_id);
    info!("🛑 Sesión de guild {} finalizada", state.guild_id);
}

/// Procesa un evento. Devuelve `false` cuando la sesión debe terminar.
async fn handle_event(state: &mut SessionState, event: SessionEvent) -> bool {
    match event {
        SessionEvent::Command(SessionCommand::Enqueue { track }) => {
            engine::handle_enqueue(state, track).await;
            true
        }
        SessionEvent::Command(SessionCommand::Skip) => {
            engine::skip(state).await;
            true
        }
        SessionEvent::Command(SessionCommand::Stop) => {
            engine::stop(state).await;
            false
        }
        SessionEvent::Command(SessionCommand::QueueView { reply }) => {
            let _ = reply.send(state.snapshot());
            true
        }
        SessionEvent::ReaperCheck { epoch } => {
            // Revalidar: una nueva reproducción en el interín desarma el
            // chequeo implícitamente. Un chequeo de una época anterior
            // tampoco vale, aunque la sesión vuelva a estar ociosa: el
            // rearme posterior ya corre su propia gracia completa.
            let still_idle = state.reaper.is_current(epoch)
                && matches!(state.engine, engine::EngineState::Idle)
                && state.queue.is_empty();
            if !still_idle {
                debug!("⏲️ Chequeo de inactividad ignorado: guild {} activa", state.guild_id);
                return true;
            }

            info!("🚪 Cerrando sesión de guild {} por inactividad", state.guild_id);
            state.sink.notify(Notification::IdleDisconnect).await;
            engine::stop(state).await;
            false
        }
        SessionEvent::ReconnectTimeout { epoch } => {
            if !state.connection.recovery_expired(epoch) {
                return true;
            }

            warn!(
                "🔌 Conexión de guild {} no se recuperó a tiempo, cerrando",
                state.guild_id
            );
            state
                .sink
                .notify(Notification::ConnectionLost {
                    reason: TransportError::Dropped.to_string(),
                })
                .await;
            engine::stop(state).await;
            false
        }
    }
}

/// Procesa una señal del transporte. Devuelve `false` para terminar.
async fn handle_signal(
    state: &mut SessionState,
    signal: TransportSignal,
    reconnect_grace: Duration,
) -> bool {
    match signal {
        TransportSignal::TrackEnded { seq } => {
            if seq != state.play_seq || !matches!(state.engine, engine::EngineState::Playing) {
                debug!("🎵 Señal de fin obsoleta (seq {}) en guild {}", seq, state.guild_id);
                return true;
            }

            state.current = None;
            state.engine = engine::EngineState::Idle;
            engine::start_next(state).await;
            true
        }
        TransportSignal::TrackFailed { seq, reason } => {
            if seq != state.play_seq || !matches!(state.engine, engine::EngineState::Playing) {
                return true;
            }

            let title = state
                .current
                .take()
                .map(|track| track.title)
                .unwrap_or_default();
            warn!("❌ Stream falló en guild {}: {}", state.guild_id, reason);
            state.engine = engine::EngineState::Idle;
            state
                .sink
                .notify(Notification::PlaybackError {
                    title,
                    reason: truncate_reason(&reason),
                })
                .await;
            engine::start_next(state).await;
            true
        }
        TransportSignal::Disconnected => {
            let epoch = state.connection.on_disconnected();
            let events = state.events.clone();
            tokio::spawn(async move {
                tokio::time::sleep(reconnect_grace).await;
                let _ = events.send(SessionEvent::ReconnectTimeout { epoch });
            });
            true
        }
        TransportSignal::Reconnected => {
            state.connection.on_reconnected();
            true
        }
    }
}
