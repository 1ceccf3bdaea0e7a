//! Emoji image resolution.

pub mod cache;
pub mod url;

pub use cache::EmojiCache;
pub use url::{emoji_url, twemoji_key};

use crate::config::ResolverConfig;
use crate::image_loading::{HttpImageFetcher, ImageFetcher};
use crate::surface::DecodedImage;
use crate::token::EmojiRef;
use futures::future::join_all;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

lazy_static! {
    static ref SHARED_RESOLVER: EmojiResolver = EmojiResolver::new(
        ResolverConfig::default(),
        Arc::new(
            HttpImageFetcher::new(&ResolverConfig::default())
                .expect("Failed to construct reqwest client")
        ),
    );
}

#[derive(Debug, Clone)]
pub struct ResolvedEmoji {
    pub emoji: EmojiRef,
    pub url: String,
    /// `None` when the image could not be loaded.
    pub image: Option<Arc<DecodedImage>>,
}

/// Maps emoji to CDN images, fetching each URL at most once at a time and
/// caching successful loads.
pub struct EmojiResolver {
    config: ResolverConfig,
    fetcher: Arc<dyn ImageFetcher>,
    cache: Arc<EmojiCache>,
}

impl EmojiResolver {
    pub fn new(config: ResolverConfig, fetcher: Arc<dyn ImageFetcher>) -> Self {
        let cache = Arc::new(EmojiCache::new(config.cache_max_bytes));
        Self::with_cache(config, fetcher, cache)
    }

    /// Resolver with an HTTP fetcher built from `config`.
    pub fn with_http(config: ResolverConfig) -> Result<Self, crate::error::FcError> {
        let fetcher = HttpImageFetcher::new(&config)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    pub fn with_cache(
        config: ResolverConfig,
        fetcher: Arc<dyn ImageFetcher>,
        cache: Arc<EmojiCache>,
    ) -> Self {
        Self {
            config,
            fetcher,
            cache,
        }
    }

    /// The process-wide resolver with default settings.
    pub fn shared() -> &'static EmojiResolver {
        &SHARED_RESOLVER
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<EmojiCache> {
        &self.cache
    }

    pub fn url_for(&self, emoji: &EmojiRef) -> String {
        emoji_url(emoji, &self.config)
    }

    /// Resolve one URL through the cache.
    pub async fn resolve_url(&self, url: &str) -> Option<Arc<DecodedImage>> {
        self.cache
            .get_or_fetch(url, || self.fetcher.fetch(url))
            .await
    }

    /// Resolve every distinct emoji URL concurrently.
    ///
    /// Each URL is fetched at most once. Failed loads map to `image: None`.
    pub async fn resolve_all<'a>(
        &self,
        emojis: impl IntoIterator<Item = &'a EmojiRef>,
    ) -> HashMap<String, ResolvedEmoji> {
        let mut unique: HashMap<String, &EmojiRef> = HashMap::new();
        for emoji in emojis {
            unique.entry(self.url_for(emoji)).or_insert(emoji);
        }
        if unique.is_empty() {
            return HashMap::new();
        }
        debug!("Resolving {} distinct emoji", unique.len());

        let resolved = join_all(unique.into_iter().map(|(url, emoji)| async move {
            info!("Resolving emoji image {url}");
            let image = self.resolve_url(&url).await;
            let resolved = ResolvedEmoji {
                emoji: emoji.clone(),
                url: url.clone(),
                image,
            };
            (url, resolved)
        }))
        .await;

        resolved.into_iter().collect()
    }
}
