use serenity::{
    all::Timestamp,
    builder::{CreateEmbed, CreateEmbedFooter},
};

use crate::player::{QueueSnapshot, TrackDescriptor};

/// Paleta de colores estandarizada para el bot
pub mod colors {
    use serenity::all::Colour;

    pub const SUCCESS_GREEN: Colour = Colour::from_rgb(67, 181, 129);
    pub const ERROR_RED: Colour = Colour::from_rgb(220, 53, 69);
    pub const INFO_BLUE: Colour = Colour::from_rgb(52, 144, 220);
    pub const NEUTRAL_GRAY: Colour = Colour::from_rgb(108, 117, 125);
}

/// Footer estandarizado para todos los embeds
const STANDARD_FOOTER: &str = "🎵 Melodía · Respeta los derechos de autor";

/// Embed de la canción en reproducción.
pub fn now_playing(track: &TrackDescriptor) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title("🎵 Reproduciendo Ahora")
        .description(format!("**{}**", track.title))
        .color(colors::SUCCESS_GREEN)
        .field("⏱️ Duración", duration_field(track), true)
        .field(
            "👤 Solicitado por",
            format!("<@{}>", track.requested_by),
            true,
        )
        .field("🕒 Agregada", added_field(track), true);

    if let Some(thumbnail) = &track.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }

    embed
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER))
}

/// Embed de canción agregada a la cola, con su posición.
pub fn track_queued(track: &TrackDescriptor, position: usize) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title("✅ Canción Agregada")
        .description(format!(
            "**{}** se ha agregado a la cola de reproducción",
            track.title
        ))
        .color(colors::SUCCESS_GREEN)
        .field("📊 Posición", format!("#{position}"), true)
        .field("⏱️ Duración", duration_field(track), true)
        .field(
            "👤 Solicitado por",
            format!("<@{}>", track.requested_by),
            true,
        )
        .field("🕒 Agregada", added_field(track), true);

    if let Some(thumbnail) = &track.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }

    embed
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER))
}

/// Embed de la cola de reproducción.
pub fn queue(view: &QueueSnapshot) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title("📋 Cola de Reproducción")
        .color(colors::INFO_BLUE)
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER));

    match &view.current {
        Some(track) => {
            embed = embed.field(
                "🎵 Sonando ahora",
                format!("**{}** `[{}]`", track.title, format_duration(track.duration_secs)),
                false,
            );
        }
        None => {
            embed = embed.description("No hay nada en reproducción");
        }
    }

    if view.upcoming.is_empty() {
        embed = embed.field("⏭️ A continuación", "La cola está vacía", false);
    } else {
        let listing: Vec<String> = view
            .upcoming
            .iter()
            .take(10)
            .enumerate()
            .map(|(i, track)| {
                format!(
                    "`{}.` **{}** `[{}]`",
                    i + 1,
                    track.title,
                    format_duration(track.duration_secs)
                )
            })
            .collect();

        let mut body = listing.join("\n");
        if view.upcoming.len() > 10 {
            body.push_str(&format!("\n… y {} más", view.upcoming.len() - 10));
        }
        embed = embed.field(
            format!("⏭️ A continuación ({})", view.upcoming.len()),
            body,
            false,
        );
    }

    embed
}

/// Embed de error de reproducción.
pub fn playback_error(title: &str, reason: &str) -> CreateEmbed {
    CreateEmbed::default()
        .title("❌ Error de Reproducción")
        .description(format!("No se pudo reproducir **{title}**"))
        .color(colors::ERROR_RED)
        .field("Motivo", reason, false)
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER))
}

/// Embed de búsqueda sin resultados.
pub fn resolution_failed(query: &str, reason: &str) -> CreateEmbed {
    CreateEmbed::default()
        .title("🔍 Sin Resultados")
        .description(format!("No se encontró nada para **{query}**"))
        .color(colors::ERROR_RED)
        .field("Motivo", reason, false)
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER))
}

/// Embed informativo simple con el color neutro.
pub fn notice(title: &str, description: &str) -> CreateEmbed {
    CreateEmbed::default()
        .title(title.to_string())
        .description(description.to_string())
        .color(colors::NEUTRAL_GRAY)
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER))
}

/// Marca de tiempo relativa de Discord (`<t:unix:R>`) del momento en que
/// el track entró a la sesión.
fn added_field(track: &TrackDescriptor) -> String {
    format!("<t:{}:R>", track.added_at.timestamp())
}

fn duration_field(track: &TrackDescriptor) -> String {
    if track.duration_secs == 0 {
        "🔴 En vivo".to_string()
    } else {
        format_duration(track.duration_secs)
    }
}

/// Formatea segundos como `m:ss` o `h:mm:ss`.
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(185), "3:05");
        assert_eq!(format_duration(3725), "1:02:05");
    }

    #[test]
    fn test_added_field_renders_discord_timestamp() {
        use serenity::model::id::UserId;

        let mut track = TrackDescriptor::new(
            "canción".to_string(),
            "https://cdn.example.com/cancion.mp3".to_string(),
            UserId::new(1),
        );
        track.added_at = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(added_field(&track), "<t:1700000000:R>");
    }
}
