use async_trait::async_trait;

use super::track::TrackDescriptor;

/// Largo máximo del detalle de error que se muestra al usuario.
const MAX_REASON_LEN: usize = 200;

/// Mensajes de estado hacia el usuario. El motor los emite; quién los
/// renderiza (embed, texto plano) lo decide el dueño del sink.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Track agregado a la cola (no empezó a sonar de inmediato).
    TrackQueued {
        track: TrackDescriptor,
        position: usize,
    },
    NowPlaying {
        track: TrackDescriptor,
    },
    /// El stream de un track falló; la reproducción sigue con el próximo.
    PlaybackError {
        title: String,
        reason: String,
    },
    /// La consulta no produjo ningún track reproducible.
    ResolutionFailed {
        query: String,
        reason: String,
    },
    /// La cola alcanzó su capacidad y el track fue rechazado.
    QueueFull {
        title: String,
        max: usize,
    },
    /// La conexión de voz se perdió de forma irrecuperable.
    ConnectionLost {
        reason: String,
    },
    /// La sesión se cerró tras el período de gracia sin actividad.
    IdleDisconnect,
}

/// Canal de salida abstracto para mensajes al usuario. Lo aporta la capa de
/// comandos al crear la sesión (normalmente "publicar en este canal de
/// texto").
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification);
}

/// Recorta un detalle de error a un largo presentable.
pub fn truncate_reason(reason: &str) -> String {
    if reason.len() <= MAX_REASON_LEN {
        return reason.to_string();
    }
    let mut end = MAX_REASON_LEN;
    while !reason.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &reason[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_reason_untouched() {
        assert_eq!(truncate_reason("falló el stream"), "falló el stream");
    }

    #[test]
    fn test_long_reason_truncated() {
        let long = "x".repeat(500);
        let truncated = truncate_reason(&long);
        assert_eq!(truncated.chars().count(), MAX_REASON_LEN + 1);
        assert!(truncated.ends_with('…'));
    }
}
