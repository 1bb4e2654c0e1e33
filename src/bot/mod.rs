//! Bot de Discord: registro de comandos, despacho de interacciones y
//! seguimiento del estado de voz. Toda la lógica de reproducción vive en
//! [`crate::player`]; este módulo solo traduce interacciones a peticiones.

use std::sync::Arc;

use serenity::{
    all::{Context, EventHandler, Interaction, Ready, VoiceState},
    async_trait,
};
use tracing::{error, info};

pub mod commands;
pub mod handlers;
pub mod notifier;

use crate::{config::Config, player::PlayerService};

/// Handler principal del bot.
pub struct MelodiaBot {
    config: Arc<Config>,
    pub player: Arc<PlayerService>,
}

impl MelodiaBot {
    pub fn new(config: Arc<Config>, player: Arc<PlayerService>) -> Self {
        Self { config, player }
    }

    async fn register_commands(&self, ctx: &Context) -> anyhow::Result<()> {
        info!("🔧 Application ID: {}", self.config.application_id);
        match self.config.guild_id {
            // Registro por guild: instantáneo, para desarrollo.
            Some(guild_id) => {
                info!("⚡ Registrando comandos en guild {}", guild_id);
                commands::register_guild_commands(ctx, guild_id.into()).await
            }
            None => {
                info!("🌍 Registrando comandos globales");
                commands::register_global_commands(ctx).await
            }
        }
    }
}

#[async_trait]
impl EventHandler for MelodiaBot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🤖 {} está en línea!", ready.user.name);
        info!("📊 Conectado a {} servidores", ready.guilds.len());

        if let Err(e) = self.register_commands(&ctx).await {
            error!("Error al registrar comandos: {:?}", e);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command_interaction) = interaction {
            if let Err(e) = handlers::handle_command(&ctx, command_interaction, self).await {
                error!("Error manejando comando: {:?}", e);
            }
        }
    }

    /// Si expulsan al bot del canal de voz, su sesión se detiene.
    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        let current_user_id = ctx.cache.current_user().id;
        if new.user_id != current_user_id {
            return;
        }

        if old.is_some() && new.channel_id.is_none() {
            if let Some(guild_id) = new.guild_id {
                info!("🔌 Bot desconectado en guild {}", guild_id);
                self.player.request_stop(guild_id);
            }
        }
    }
}
