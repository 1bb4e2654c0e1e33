use std::sync::Arc;

use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use super::error::{StreamError, TransportError};

/// Fases de la conexión de voz.
///
/// `Signalling → Connecting → Ready`; `Ready ⇄ Disconnected` ante una caída
/// de red; `Disconnected → Destroyed` si no llega señal de recuperación
/// dentro del plazo. `Destroyed` es terminal desde cualquier fase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Signalling,
    Connecting,
    Ready,
    Disconnected,
    Destroyed,
}

/// Señales asíncronas que el transporte entrega a la sesión.
///
/// `seq` es el número de secuencia de reproducción asignado al abrir el
/// stream: una señal de fin obsoleta nunca puede saltarse el track que
/// vino después.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportSignal {
    /// El track terminó (fin natural o stop forzado, mismo camino).
    TrackEnded { seq: u64 },
    /// El stream falló a mitad de reproducción.
    TrackFailed { seq: u64, reason: String },
    /// Se perdió la conexión de red.
    Disconnected,
    /// La plataforma restableció la conexión (mudanza de canal, migración).
    Reconnected,
}

/// Proveedor de transporte de voz. En producción lo implementa songbird;
/// en tests, un doble controlable.
#[async_trait]
pub trait VoiceTransport: Send + Sync {
    /// Establece la sesión de red y registra el canal de señales.
    async fn connect(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        signals: UnboundedSender<TransportSignal>,
    ) -> Result<(), TransportError>;

    /// Abre el stream del localizador bajo el número de secuencia dado.
    async fn open_stream(
        &self,
        guild_id: GuildId,
        locator: &str,
        seq: u64,
    ) -> Result<(), StreamError>;

    /// Detiene el stream actual; el transporte emite `TrackEnded` igual que
    /// en un fin natural.
    async fn stop_stream(&self, guild_id: GuildId);

    /// Libera la conexión de red.
    async fn destroy(&self, guild_id: GuildId);
}

/// Conexión de voz de una sesión, con su máquina de fases.
///
/// Propiedad exclusiva de la sesión: nadie más llama a `destroy`.
pub struct TransportConnection {
    guild_id: GuildId,
    channel_id: ChannelId,
    phase: ConnectionPhase,
    transport: Arc<dyn VoiceTransport>,
    /// Época de desconexión; invalida plazos de recuperación obsoletos
    /// cuando la conexión cae y se recupera varias veces seguidas.
    disconnect_epoch: u64,
}

impl TransportConnection {
    pub fn new(
        transport: Arc<dyn VoiceTransport>,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Self {
        Self {
            guild_id,
            channel_id,
            phase: ConnectionPhase::Signalling,
            transport,
            disconnect_epoch: 0,
        }
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    /// Establece la conexión. Idempotente por servidor: si ya está `Ready`
    /// reutiliza la conexión existente.
    pub async fn connect(
        &mut self,
        signals: UnboundedSender<TransportSignal>,
    ) -> Result<(), TransportError> {
        if self.phase == ConnectionPhase::Ready {
            debug!("🔊 Conexión ya establecida en guild {}", self.guild_id);
            return Ok(());
        }

        self.phase = ConnectionPhase::Connecting;
        self.transport
            .connect(self.guild_id, self.channel_id, signals)
            .await?;
        self.phase = ConnectionPhase::Ready;

        info!("🔊 Conectado al canal de voz en guild {}", self.guild_id);
        Ok(())
    }

    pub async fn open_stream(&self, locator: &str, seq: u64) -> Result<(), StreamError> {
        self.transport
            .open_stream(self.guild_id, locator, seq)
            .await
    }

    pub async fn stop_stream(&self) {
        self.transport.stop_stream(self.guild_id).await;
    }

    /// Registra la caída de red y devuelve la época con la que debe
    /// programarse el plazo de recuperación.
    pub fn on_disconnected(&mut self) -> u64 {
        warn!("🔌 Conexión de voz caída en guild {}", self.guild_id);
        self.phase = ConnectionPhase::Disconnected;
        self.disconnect_epoch += 1;
        self.disconnect_epoch
    }

    /// Señal de recuperación iniciada por la plataforma (mudanza de canal).
    pub fn on_reconnected(&mut self) {
        if self.phase == ConnectionPhase::Disconnected {
            info!("🔄 Conexión de voz recuperada en guild {}", self.guild_id);
            self.phase = ConnectionPhase::Ready;
        }
    }

    /// ¿Venció el plazo de recuperación de esta época sin reconexión?
    pub fn recovery_expired(&self, epoch: u64) -> bool {
        self.phase == ConnectionPhase::Disconnected && self.disconnect_epoch == epoch
    }

    /// Libera el recurso de red. Única transición terminal válida.
    pub async fn destroy(&mut self) {
        if self.phase == ConnectionPhase::Destroyed {
            return;
        }
        self.phase = ConnectionPhase::Destroyed;
        self.transport.destroy(self.guild_id).await;
        info!("👋 Conexión de voz destruida en guild {}", self.guild_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct StubTransport {
        connects: AtomicUsize,
        destroys: AtomicUsize,
    }

    #[async_trait]
    impl VoiceTransport for StubTransport {
        async fn connect(
            &self,
            _guild_id: GuildId,
            _channel_id: ChannelId,
            _signals: UnboundedSender<TransportSignal>,
        ) -> Result<(), TransportError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn open_stream(
            &self,
            _guild_id: GuildId,
            _locator: &str,
            _seq: u64,
        ) -> Result<(), StreamError> {
            Ok(())
        }

        async fn stop_stream(&self, _guild_id: GuildId) {}

        async fn destroy(&self, _guild_id: GuildId) {
            self.destroys.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn connection(stub: Arc<StubTransport>) -> TransportConnection {
        TransportConnection::new(stub, GuildId::new(1), ChannelId::new(2))
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let stub = Arc::new(StubTransport::default());
        let mut conn = connection(stub.clone());
        let (tx, _rx) = mpsc::unbounded_channel();

        conn.connect(tx.clone()).await.unwrap();
        conn.connect(tx).await.unwrap();

        assert_eq!(conn.phase(), ConnectionPhase::Ready);
        assert_eq!(stub.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reconnect_within_grace_keeps_connection() {
        let stub = Arc::new(StubTransport::default());
        let mut conn = connection(stub);
        let (tx, _rx) = mpsc::unbounded_channel();
        conn.connect(tx).await.unwrap();

        let epoch = conn.on_disconnected();
        conn.on_reconnected();

        assert_eq!(conn.phase(), ConnectionPhase::Ready);
        assert!(!conn.recovery_expired(epoch));
    }

    #[tokio::test]
    async fn test_stale_recovery_epoch_ignored() {
        let stub = Arc::new(StubTransport::default());
        let mut conn = connection(stub);
        let (tx, _rx) = mpsc::unbounded_channel();
        conn.connect(tx).await.unwrap();

        // Cae, se recupera, y vuelve a caer: el plazo de la primera caída
        // ya no aplica, el de la segunda sí.
        let first = conn.on_disconnected();
        conn.on_reconnected();
        let second = conn.on_disconnected();

        assert!(!conn.recovery_expired(first));
        assert!(conn.recovery_expired(second));
    }

    #[tokio::test]
    async fn test_destroy_is_terminal_and_once() {
        let stub = Arc::new(StubTransport::default());
        let mut conn = connection(stub.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        conn.connect(tx).await.unwrap();

        conn.destroy().await;
        conn.destroy().await;

        assert_eq!(conn.phase(), ConnectionPhase::Destroyed);
        assert_eq!(stub.destroys.load(Ordering::SeqCst), 1);
    }
}
