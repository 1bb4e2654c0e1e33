pub mod direct_url;
pub mod duration;
pub mod youtube;

use std::sync::Arc;

use async_trait::async_trait;
use serenity::model::id::UserId;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub use direct_url::DirectUrlClient;
pub use youtube::YouTubeClient;

use crate::player::track::TrackDescriptor;

/// Fallo al resolver una consulta o enlace a un track reproducible.
///
/// `ProviderRateLimited` se distingue de `NotFound` para poder aconsejar
/// "intenta en un rato" en lugar de "sin resultados".
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolutionError {
    #[error("no se encontraron resultados para «{0}»")]
    NotFound(String),
    #[error("el proveedor está limitando las peticiones, intenta de nuevo en unos minutos")]
    ProviderRateLimited,
    #[error("el enlace no es válido o no es reproducible: {0}")]
    InvalidLink(String),
    #[error("error del proveedor: {0}")]
    Provider(String),
}

/// Trait común para todas las fuentes de música.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MusicSource: Send + Sync {
    /// Busca tracks en la fuente.
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<TrackDescriptor>, ResolutionError>;

    /// Obtiene metadata de un track por URL.
    async fn get_track(&self, url: &str) -> Result<TrackDescriptor, ResolutionError>;

    /// Verifica si la URL es válida para esta fuente.
    fn is_valid_url(&self, url: &str) -> bool;

    /// Nombre de la fuente.
    fn source_name(&self) -> &'static str;
}

/// Resuelve texto libre o enlaces directos a un [`TrackDescriptor`].
///
/// Un enlace bien formado se valida contra el proveedor de metadata sin
/// pasar por búsqueda; texto libre se resuelve con una única búsqueda de
/// primer resultado.
pub struct TrackResolver {
    search: Arc<dyn MusicSource>,
    direct: Arc<dyn MusicSource>,
}

impl TrackResolver {
    pub fn new(search: Arc<dyn MusicSource>, direct: Arc<dyn MusicSource>) -> Self {
        Self { search, direct }
    }

    pub async fn resolve(
        &self,
        query: &str,
        requested_by: UserId,
    ) -> Result<TrackDescriptor, ResolutionError> {
        let mut track = if is_http_url(query) {
            debug!("🔗 Resolviendo enlace directo: {}", query);
            if self.search.is_valid_url(query) {
                debug!("✅ Enlace atendido por {}", self.search.source_name());
                self.search.get_track(query).await?
            } else if self.direct.is_valid_url(query) {
                debug!("✅ Enlace atendido por {}", self.direct.source_name());
                self.direct.get_track(query).await?
            } else {
                return Err(ResolutionError::InvalidLink(query.to_string()));
            }
        } else {
            debug!("🔍 Buscando primer resultado para: {}", query);
            self.search
                .search(query, 1)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| ResolutionError::NotFound(query.to_string()))?
        };

        track.requested_by = requested_by;
        Ok(track)
    }
}

fn is_http_url(query: &str) -> bool {
    Url::parse(query)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn descriptor(title: &str) -> TrackDescriptor {
        TrackDescriptor::new(
            title.to_string(),
            "https://www.youtube.com/watch?v=abc123def45".to_string(),
            UserId::default(),
        )
    }

    fn resolver(search: MockMusicSource, direct: MockMusicSource) -> TrackResolver {
        TrackResolver::new(Arc::new(search), Arc::new(direct))
    }

    #[tokio::test]
    async fn test_free_text_uses_top_search_result() {
        let mut search = MockMusicSource::new();
        search
            .expect_search()
            .withf(|query, limit| query == "algo de jazz" && *limit == 1)
            .returning(|_, _| Ok(vec![descriptor("Take Five")]));
        let direct = MockMusicSource::new();

        let track = resolver(search, direct)
            .resolve("algo de jazz", UserId::new(7))
            .await
            .unwrap();

        assert_eq!(track.title, "Take Five");
        assert_eq!(track.requested_by, UserId::new(7));
    }

    #[tokio::test]
    async fn test_empty_search_is_not_found() {
        let mut search = MockMusicSource::new();
        search.expect_search().returning(|_, _| Ok(vec![]));
        let direct = MockMusicSource::new();

        let err = resolver(search, direct)
            .resolve("nada de nada", UserId::new(7))
            .await
            .unwrap_err();

        assert_eq!(err, ResolutionError::NotFound("nada de nada".to_string()));
    }

    #[tokio::test]
    async fn test_direct_link_skips_search() {
        let mut search = MockMusicSource::new();
        search.expect_is_valid_url().returning(|_| true);
        search.expect_source_name().return_const("YouTube");
        search
            .expect_get_track()
            .returning(|_| Ok(descriptor("Video directo")));
        search.expect_search().never();
        let direct = MockMusicSource::new();

        let track = resolver(search, direct)
            .resolve("https://www.youtube.com/watch?v=abc123def45", UserId::new(9))
            .await
            .unwrap();

        assert_eq!(track.title, "Video directo");
    }

    #[tokio::test]
    async fn test_unsupported_link_is_invalid() {
        let mut search = MockMusicSource::new();
        search.expect_is_valid_url().returning(|_| false);
        let mut direct = MockMusicSource::new();
        direct.expect_is_valid_url().returning(|_| false);

        let err = resolver(search, direct)
            .resolve("https://example.com/pagina", UserId::new(1))
            .await
            .unwrap_err();

        assert!(matches!(err, ResolutionError::InvalidLink(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_is_surfaced_distinctly() {
        let mut search = MockMusicSource::new();
        search
            .expect_search()
            .returning(|_, _| Err(ResolutionError::ProviderRateLimited));
        let direct = MockMusicSource::new();

        let err = resolver(search, direct)
            .resolve("lo que sea", UserId::new(1))
            .await
            .unwrap_err();

        assert_eq!(err, ResolutionError::ProviderRateLimited);
    }
}
