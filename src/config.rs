use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::player::SessionConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    // Discord
    pub discord_token: String,
    pub application_id: u64,
    pub guild_id: Option<u64>, // Para comandos de desarrollo

    // Fuentes
    pub youtube_api_key: String,

    // Sesiones
    pub max_queue_size: usize,
    pub idle_grace_secs: u64,      // Gracia de inactividad
    pub reconnect_grace_secs: u64, // Plazo de recuperación de voz
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            // Discord
            discord_token: std::env::var("DISCORD_TOKEN")?,
            application_id: std::env::var("APPLICATION_ID")?.parse()?,
            guild_id: std::env::var("GUILD_ID").ok().and_then(|s| s.parse().ok()),

            // Fuentes
            youtube_api_key: std::env::var("YOUTUBE_API_KEY")?,

            // Sesiones
            max_queue_size: std::env::var("MAX_QUEUE_SIZE")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()?,
            idle_grace_secs: std::env::var("IDLE_GRACE_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,
            reconnect_grace_secs: std::env::var("RECONNECT_GRACE_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.discord_token.trim().is_empty() {
            anyhow::bail!("DISCORD_TOKEN no puede estar vacío");
        }
        if self.youtube_api_key.trim().is_empty() {
            anyhow::bail!("YOUTUBE_API_KEY no puede estar vacío");
        }
        if self.max_queue_size == 0 {
            anyhow::bail!("MAX_QUEUE_SIZE debe ser mayor que cero");
        }
        if self.idle_grace_secs == 0 {
            anyhow::bail!("IDLE_GRACE_SECS debe ser mayor que cero");
        }
        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            max_queue_size: self.max_queue_size,
            idle_grace: Duration::from_secs(self.idle_grace_secs),
            reconnect_grace: Duration::from_secs(self.reconnect_grace_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Config {
        Config {
            discord_token: "token".to_string(),
            application_id: 1234567890,
            guild_id: None,
            youtube_api_key: "clave".to_string(),
            max_queue_size: 1000,
            idle_grace_secs: 300,
            reconnect_grace_secs: 5,
        }
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_token() {
        let mut config = sample();
        config.discord_token = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_session_config_mapping() {
        let session = sample().session_config();
        assert_eq!(session.max_queue_size, 1000);
        assert_eq!(session.idle_grace, Duration::from_secs(300));
        assert_eq!(session.reconnect_grace, Duration::from_secs(5));
    }
}
