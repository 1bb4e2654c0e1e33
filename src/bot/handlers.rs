use std::sync::Arc;

use anyhow::Result;
use serenity::{
    builder::{CreateInteractionResponse, CreateInteractionResponseMessage},
    model::{
        application::CommandInteraction,
        id::{ChannelId, GuildId, UserId},
    },
    prelude::Context,
};
use tracing::info;

use crate::bot::{notifier::ChannelNotifier, MelodiaBot};
use crate::player::RegistryError;
use crate::ui::embeds;

/// Maneja comandos slash
pub async fn handle_command(
    ctx: &Context,
    command: CommandInteraction,
    bot: &MelodiaBot,
) -> Result<()> {
    let guild_id = command
        .guild_id
        .ok_or_else(|| anyhow::anyhow!("Comando usado fuera de un servidor"))?;

    info!(
        "📝 Comando /{} usado por {} en guild {}",
        command.data.name, command.user.name, guild_id
    );

    match command.data.name.as_str() {
        "play" => handle_play(ctx, command, bot, guild_id).await?,
        "skip" => handle_skip(ctx, command, bot, guild_id).await?,
        "stop" => handle_stop(ctx, command, bot, guild_id).await?,
        "queue" => handle_queue(ctx, command, bot, guild_id).await?,
        "nowplaying" => handle_nowplaying(ctx, command, bot, guild_id).await?,
        _ => {
            respond_ephemeral(ctx, &command, "❌ Comando no reconocido").await?;
        }
    }

    Ok(())
}

async fn handle_play(
    ctx: &Context,
    command: CommandInteraction,
    bot: &MelodiaBot,
    guild_id: GuildId,
) -> Result<()> {
    let query = command
        .data
        .options
        .iter()
        .find(|opt| opt.name == "query")
        .and_then(|opt| opt.value.as_str())
        .ok_or_else(|| anyhow::anyhow!("Query no proporcionado"))?
        .to_string();

    // El usuario tiene que estar en un canal de voz
    let voice_channel_id = match get_user_voice_channel(ctx, guild_id, command.user.id) {
        Ok(channel_id) => channel_id,
        Err(_) => {
            respond_ephemeral(ctx, &command, "❌ Debes estar en un canal de voz").await?;
            return Ok(());
        }
    };

    // Responder de inmediato; el resultado llega como notificación al canal.
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().content(format!("🔎 Buscando: **{query}**")),
            ),
        )
        .await?;

    let sink = Arc::new(ChannelNotifier::new(ctx.http.clone(), command.channel_id));
    bot.player
        .request_play(guild_id, voice_channel_id, &query, command.user.id, sink)
        .await;

    Ok(())
}

async fn handle_skip(
    ctx: &Context,
    command: CommandInteraction,
    bot: &MelodiaBot,
    guild_id: GuildId,
) -> Result<()> {
    match bot.player.request_skip(guild_id) {
        Ok(()) => {
            command
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new().content("⏭️ Canción saltada"),
                    ),
                )
                .await?;
        }
        Err(RegistryError::NoSession) => {
            respond_ephemeral(ctx, &command, "❌ No hay nada reproduciéndose").await?;
        }
    }
    Ok(())
}

async fn handle_stop(
    ctx: &Context,
    command: CommandInteraction,
    bot: &MelodiaBot,
    guild_id: GuildId,
) -> Result<()> {
    bot.player.request_stop(guild_id);
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content("⏹️ Reproducción detenida y cola limpiada"),
            ),
        )
        .await?;
    Ok(())
}

async fn handle_queue(
    ctx: &Context,
    command: CommandInteraction,
    bot: &MelodiaBot,
    guild_id: GuildId,
) -> Result<()> {
    match bot.player.request_queue_view(guild_id).await {
        Some(view) => {
            command
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new().embed(embeds::queue(&view)),
                    ),
                )
                .await?;
        }
        None => {
            respond_ephemeral(ctx, &command, "❌ No hay una sesión activa").await?;
        }
    }
    Ok(())
}

async fn handle_nowplaying(
    ctx: &Context,
    command: CommandInteraction,
    bot: &MelodiaBot,
    guild_id: GuildId,
) -> Result<()> {
    let current = bot
        .player
        .request_queue_view(guild_id)
        .await
        .and_then(|view| view.current);

    match current {
        Some(track) => {
            command
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new().embed(embeds::now_playing(&track)),
                    ),
                )
                .await?;
        }
        None => {
            respond_ephemeral(ctx, &command, "❌ No hay nada reproduciéndose").await?;
        }
    }
    Ok(())
}

async fn respond_ephemeral(ctx: &Context, command: &CommandInteraction, content: &str) -> Result<()> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

// Funciones auxiliares

fn get_user_voice_channel(ctx: &Context, guild_id: GuildId, user_id: UserId) -> Result<ChannelId> {
    let guild = guild_id
        .to_guild_cached(&ctx.cache)
        .ok_or_else(|| anyhow::anyhow!("Guild no encontrada en caché"))?;

    let channel_id = guild
        .voice_states
        .get(&user_id)
        .and_then(|voice_state| voice_state.channel_id)
        .ok_or_else(|| anyhow::anyhow!("Debes estar en un canal de voz"))?;

    Ok(channel_id)
}
