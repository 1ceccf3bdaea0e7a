//! Process-wide emoji image cache with single-flight fetching.

use crate::error::FcError;
use crate::surface::DecodedImage;
use futures::future::{BoxFuture, FutureExt, Shared};
use log::warn;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type PendingFetch = Shared<BoxFuture<'static, Option<Arc<DecodedImage>>>>;

#[derive(Debug)]
struct CacheEntry {
    image: Arc<DecodedImage>,
    size_bytes: usize,
    last_used: u64,
}

/// LRU of decoded images bounded by total pixel bytes.
#[derive(Debug)]
struct ImageLru {
    max_bytes: usize,
    total_bytes: usize,
    clock: u64,
    entries: HashMap<String, CacheEntry>,
}

impl ImageLru {
    fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            total_bytes: 0,
            clock: 0,
            entries: HashMap::new(),
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.clock = self.clock.wrapping_add(1);
        self.clock
    }

    fn get(&mut self, url: &str) -> Option<Arc<DecodedImage>> {
        let tick = self.next_tick();
        let entry = self.entries.get_mut(url)?;
        entry.last_used = tick;
        Some(Arc::clone(&entry.image))
    }

    fn insert(&mut self, url: &str, image: Arc<DecodedImage>) {
        let size_bytes = image.byte_len();
        // Never pin a single oversize image.
        if size_bytes > self.max_bytes {
            return;
        }
        let tick = self.next_tick();
        if let Some(old) = self.entries.insert(
            url.to_string(),
            CacheEntry {
                image,
                size_bytes,
                last_used: tick,
            },
        ) {
            self.total_bytes = self.total_bytes.saturating_sub(old.size_bytes);
        }
        self.total_bytes += size_bytes;
        self.evict_to_budget();
    }

    fn evict_to_budget(&mut self) {
        while self.total_bytes > self.max_bytes {
            let lru_key = self
                .entries
                .iter()
                .min_by_key(|(_key, entry)| entry.last_used)
                .map(|(key, _entry)| key.clone());

            let Some(key) = lru_key else {
                break;
            };

            if let Some(entry) = self.entries.remove(&key) {
                self.total_bytes = self.total_bytes.saturating_sub(entry.size_bytes);
            } else {
                break;
            }
        }
    }
}

struct CacheState {
    images: ImageLru,
    in_flight: HashMap<String, PendingFetch>,
}

/// Decoded emoji images keyed by URL.
///
/// Concurrent requests for a URL that is not cached yet share one fetch.
/// Only successful loads are kept.
pub struct EmojiCache {
    state: Mutex<CacheState>,
}

impl EmojiCache {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                images: ImageLru::new(max_bytes),
                in_flight: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, url: &str) -> Option<Arc<DecodedImage>> {
        self.lock().images.get(url)
    }

    pub fn len(&self) -> usize {
        self.lock().images.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_bytes(&self) -> usize {
        self.lock().images.total_bytes
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.images = ImageLru::new(state.images.max_bytes);
    }

    /// Return the cached image for `url`, joining or starting a fetch otherwise.
    ///
    /// `fetch` is only called when no fetch for `url` is in flight.
    pub async fn get_or_fetch<F>(&self, url: &str, fetch: F) -> Option<Arc<DecodedImage>>
    where
        F: FnOnce() -> BoxFuture<'static, Result<DecodedImage, FcError>>,
    {
        let pending = {
            let mut state = self.lock();
            if let Some(image) = state.images.get(url) {
                return Some(image);
            }
            match state.in_flight.get(url) {
                Some(pending) => pending.clone(),
                None => {
                    let request = fetch();
                    let owned_url = url.to_string();
                    let pending = async move {
                        match request.await {
                            Ok(image) => Some(Arc::new(image)),
                            Err(err) => {
                                warn!("Failed to load emoji image {owned_url}: {err}");
                                None
                            }
                        }
                    }
                    .boxed()
                    .shared();
                    state.in_flight.insert(url.to_string(), pending.clone());
                    pending
                }
            }
        };

        let image = pending.clone().await;

        let mut state = self.lock();
        let is_current = state
            .in_flight
            .get(url)
            .is_some_and(|current| current.ptr_eq(&pending));
        if is_current {
            state.in_flight.remove(url);
            if let Some(image) = &image {
                state.images.insert(url, Arc::clone(image));
            }
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn image(side: u32) -> DecodedImage {
        DecodedImage {
            width: side,
            height: side,
            data: vec![255; (side * side * 4) as usize],
        }
    }

    fn ready(side: u32) -> BoxFuture<'static, Result<DecodedImage, FcError>> {
        async move { Ok(image(side)) }.boxed()
    }

    #[test]
    fn test_lru_evicts_least_recently_used() {
        // 2x2 images are 16 bytes each
        let mut lru = ImageLru::new(40);
        lru.insert("a", Arc::new(image(2)));
        lru.insert("b", Arc::new(image(2)));
        assert!(lru.get("a").is_some());
        lru.insert("c", Arc::new(image(2)));

        assert!(lru.get("a").is_some());
        assert!(lru.get("b").is_none());
        assert!(lru.get("c").is_some());
        assert_eq!(lru.total_bytes, 32);
    }

    #[test]
    fn test_lru_skips_oversize_images() {
        let mut lru = ImageLru::new(10);
        lru.insert("big", Arc::new(image(2)));
        assert!(lru.entries.is_empty());
        assert_eq!(lru.total_bytes, 0);
    }

    #[test]
    fn test_lru_reinsert_does_not_double_count() {
        let mut lru = ImageLru::new(100);
        lru.insert("a", Arc::new(image(2)));
        lru.insert("a", Arc::new(image(2)));
        assert_eq!(lru.total_bytes, 16);
    }

    #[tokio::test]
    async fn test_success_is_cached() {
        let cache = EmojiCache::new(1024);
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let image = cache
                .get_or_fetch("u", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    ready(2)
                })
                .await;
            assert!(image.is_some());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.total_bytes(), 16);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let cache = EmojiCache::new(1024);
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            let image = cache
                .get_or_fetch("u", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(FcError::AccessDenied("u".to_string())) }.boxed()
                })
                .await;
            assert!(image.is_none());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_fetch() {
        let cache = EmojiCache::new(1024);
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<_, FcError>(image(1))
            }
            .boxed()
        };

        let (a, b, c) = tokio::join!(
            cache.get_or_fetch("u", fetch),
            cache.get_or_fetch("u", fetch),
            cache.get_or_fetch("u", fetch),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
        assert!(Arc::ptr_eq(&a, &b) && Arc::ptr_eq(&b, &c));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = EmojiCache::new(1024);
        cache.get_or_fetch("u", || ready(1)).await;
        assert!(cache.get("u").is_some());
        cache.clear();
        assert!(cache.get("u").is_none());
    }
}
