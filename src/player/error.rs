use thiserror::Error;

/// Errores de la conexión de voz. Siempre fatales para la sesión: la sesión
/// se destruye en lugar de quedar a medio conectar.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no se pudo conectar al canal de voz: {0}")]
    ConnectFailed(String),
    #[error("la conexión de voz se perdió y no se recuperó a tiempo")]
    Dropped,
}

/// Error al abrir el stream de un track. Local a ese track: la reproducción
/// avanza al siguiente en lugar de detenerse.
#[derive(Debug, Error)]
#[error("no se pudo abrir el stream: {0}")]
pub struct StreamError(pub String);

#[derive(Debug, Error, PartialEq)]
pub enum QueueError {
    #[error("la cola está llena (máximo {0} canciones)")]
    Full(usize),
}

/// Acción sobre una sesión que no existe. Nunca un crash: el llamador
/// responde "no hay nada reproduciéndose".
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("no hay ninguna sesión activa en este servidor")]
    NoSession,
}
