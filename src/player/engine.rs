use tracing::{debug, info, warn};

use super::notify::{truncate_reason, Notification};
use super::session::SessionState;
use super::track::TrackDescriptor;

/// Estado del motor de reproducción.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineState {
    Idle,
    Playing,
}

/// Incorpora un track a la sesión: lo reproduce de inmediato si el motor
/// está ocioso, o lo deja en cola.
pub(crate) async fn handle_enqueue(state: &mut SessionState, track: TrackDescriptor) {
    let queued = track.clone();
    if let Err(e) = state.queue.enqueue(track) {
        warn!("🚫 Cola llena en guild {}: {}", state.guild_id, e);
        state
            .sink
            .notify(Notification::QueueFull {
                title: queued.title,
                max: state.queue.max_size(),
            })
            .await;
        return;
    }

    match state.engine {
        EngineState::Idle => start_next(state).await,
        EngineState::Playing => {
            // Posición 1-based contando el track en reproducción.
            let position = state.queue.len();
            state
                .sink
                .notify(Notification::TrackQueued {
                    track: queued,
                    position,
                })
                .await;
        }
    }
}

/// Avanza al siguiente track de la cola, saltando los que fallan al abrir.
/// Si la cola se agota, el motor queda ocioso y se arma el reaper.
pub(crate) async fn start_next(state: &mut SessionState) {
    loop {
        let Some(track) = state.queue.dequeue_front() else {
            state.current = None;
            state.engine = EngineState::Idle;
            state.reaper.arm(state.guild_id, &state.events);
            debug!("💤 Cola agotada en guild {}, motor ocioso", state.guild_id);
            return;
        };

        state.play_seq += 1;
        match state
            .connection
            .open_stream(&track.stream_url, state.play_seq)
            .await
        {
            Ok(()) => {
                info!("▶️ Reproduciendo '{}' en guild {}", track.title, state.guild_id);
                state
                    .sink
                    .notify(Notification::NowPlaying {
                        track: track.clone(),
                    })
                    .await;
                state.current = Some(track);
                state.engine = EngineState::Playing;
                return;
            }
            Err(e) => {
                warn!(
                    "❌ No se pudo abrir '{}' en guild {}: {}",
                    track.title, state.guild_id, e
                );
                state
                    .sink
                    .notify(Notification::PlaybackError {
                        title: track.title,
                        reason: truncate_reason(&e.to_string()),
                    })
                    .await;
            }
        }
    }
}

/// Salta el track actual. Sin reproducción activa no hace nada: el avance
/// real llega con la señal de fin del transporte.
pub(crate) async fn skip(state: &mut SessionState) {
    if state.engine != EngineState::Playing {
        debug!("⏭️ Skip ignorado en guild {}: nada en reproducción", state.guild_id);
        return;
    }
    state.connection.stop_stream().await;
}

/// Detiene todo: vacía la cola y corta el stream activo.
pub(crate) async fn stop(state: &mut SessionState) {
    state.queue.clear();
    if state.engine == EngineState::Playing {
        state.connection.stop_stream().await;
    }
    state.current = None;
    state.engine = EngineState::Idle;
}
