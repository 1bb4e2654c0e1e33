use anyhow::Result;
use serenity::{model::gateway::GatewayIntents, Client};
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tracing::{error, info};

mod bot;
mod config;
mod player;
mod sources;
mod ui;

use crate::bot::MelodiaBot;
use crate::config::Config;
use crate::player::driver::DiscordTransport;
use crate::player::{PlayerService, SessionRegistry};
use crate::sources::{DirectUrlClient, TrackResolver, YouTubeClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Inicializar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("melodia=debug".parse()?)
                .add_directive("serenity=info".parse()?)
                .add_directive("songbird=info".parse()?),
        )
        .init();

    info!("🎵 Iniciando Melodía v{}", env!("CARGO_PKG_VERSION"));

    // Cargar configuración
    let config = Arc::new(Config::load()?);

    let http_client = reqwest::Client::new();

    // Fuentes de resolución
    let resolver = Arc::new(TrackResolver::new(
        Arc::new(YouTubeClient::new(
            config.youtube_api_key.clone(),
            http_client.clone(),
        )),
        Arc::new(DirectUrlClient::new(http_client.clone())),
    ));

    // Transporte de voz y registro de sesiones
    let songbird = Songbird::serenity();
    let transport = Arc::new(DiscordTransport::new(songbird.clone(), http_client));
    let registry = Arc::new(SessionRegistry::new(transport, config.session_config()));
    let player = Arc::new(PlayerService::new(registry, resolver));

    // Configurar intents mínimos necesarios
    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_VOICE_STATES;

    let handler = MelodiaBot::new(config.clone(), player);

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .register_songbird_with(songbird)
        .await?;

    // Manejar shutdown graceful
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Error al registrar Ctrl+C");
        info!("⚠️ Señal de shutdown recibida, cerrando...");
        std::process::exit(0);
    });

    // Iniciar bot
    info!("🚀 Bot iniciado exitosamente");
    if let Err(why) = client.start().await {
        error!("Error al ejecutar cliente: {:?}", why);
    }

    Ok(())
}
