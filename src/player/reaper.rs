use std::time::Duration;

use serenity::model::id::GuildId;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::session::SessionEvent;

/// Política de cierre por inactividad.
///
/// Se arma cada vez que la cola queda vacía sin track sonando. El chequeo
/// diferido revalida al disparar: si para entonces la sesión volvió a tener
/// actividad, no hace nada. Cada rearme sube la época, de modo que un
/// chequeo armado en un período ocioso anterior llega obsoleto y se ignora
/// aunque la sesión vuelva a estar ociosa.
pub struct InactivityReaper {
    grace: Duration,
    epoch: u64,
}

impl InactivityReaper {
    pub fn new(grace: Duration) -> Self {
        Self { grace, epoch: 0 }
    }

    /// Programa un único chequeo diferido tras el período de gracia.
    pub fn arm(&mut self, guild_id: GuildId, events: &UnboundedSender<SessionEvent>) {
        self.epoch += 1;
        let epoch = self.epoch;
        debug!(
            "⏲️ Chequeo de inactividad programado en {}s para guild {}",
            self.grace.as_secs(),
            guild_id
        );

        let events = events.clone();
        let grace = self.grace;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            // Si la sesión ya murió el envío falla y no pasa nada.
            let _ = events.send(SessionEvent::ReaperCheck { epoch });
        });
    }

    /// Un chequeo solo vale si ningún rearme posterior lo superó.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }
}
