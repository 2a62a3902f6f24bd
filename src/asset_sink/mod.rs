//! Asset localization
//!
//! The [`AssetSink`] turns remote images and inline SVG markup into stable
//! relative paths, deduplicating per owner scope, and accumulates the
//! [`AssetEntry`] records an external packager drains afterwards.
//!
//! The sink is shared by reference between sessions. Its naming state sits
//! behind a `parking_lot::Mutex` that is released before any fetch is awaited,
//! so concurrent conversions never receive the same file name.

pub mod errors;
pub mod fetcher;
pub mod scope;
pub mod types;
pub mod writer;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

pub use errors::{AssetError, AssetResult};
pub use fetcher::{FetchConfig, HttpImageFetcher, ImageFetcher};
pub use scope::{AssetOwnerScope, ScopeKey};
pub use types::{AssetEntry, AssetPayload, FetchedImage, ResourceType};

use crate::utils::{canonicalize_url, content_hash, sanitize_file_name, url_extension};
use types::{extension_for_mime, mime_for_extension};

const DEFAULT_IMAGE_EXTENSION: &str = "png";
const SVG_MIME: &str = "image/svg+xml";

#[derive(Debug, Default)]
struct SinkState {
    scopes: HashMap<ScopeKey, AssetOwnerScope>,
    entries: Vec<AssetEntry>,
    next_sort_index: usize,
}

impl SinkState {
    /// Claim a file name in `key`'s scope and a global sort slot.
    fn reserve(&mut self, key: &ScopeKey, extension: &str) -> (String, usize) {
        let scope = self.scopes.entry(key.clone()).or_default();
        let index = scope.reserve_index();
        let file_name = sanitize_file_name(&format!("{}{index}.{extension}", key.prefix));
        let logical_path = if key.directory.is_empty() {
            file_name
        } else {
            format!("{}/{file_name}", key.directory)
        };
        let sort_index = self.next_sort_index;
        self.next_sort_index += 1;
        (logical_path, sort_index)
    }
}

/// Deduplicating store of localized assets.
pub struct AssetSink {
    fetcher: Option<Arc<dyn ImageFetcher>>,
    state: Mutex<SinkState>,
}

impl std::fmt::Debug for AssetSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetSink")
            .field("has_fetcher", &self.fetcher.is_some())
            .field("entries", &self.state.lock().entries.len())
            .finish()
    }
}

impl Default for AssetSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetSink {
    /// Sink that records remote images as `Pending` for the packager to fetch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fetcher: None,
            state: Mutex::new(SinkState::default()),
        }
    }

    /// Sink that fetches remote images eagerly at localization time.
    #[must_use]
    pub fn with_fetcher(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            fetcher: Some(fetcher),
            state: Mutex::new(SinkState::default()),
        }
    }

    /// Localize a remote image and return its path relative to the document.
    ///
    /// Idempotent per canonical URL (query and fragment ignored) within one
    /// `(prefix, directory)` owner. The file extension comes from the URL, or
    /// from the fetched MIME type when the URL has none.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty or `data:` URL; `Fetch` when the fetcher
    /// gives up. A failed fetch releases the URL so a later call retries it.
    pub async fn localize_image(
        &self,
        url: &str,
        directory: &str,
        prefix: &str,
    ) -> AssetResult<String> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AssetError::invalid("image url", "empty string"));
        }
        if url
            .get(..5)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
        {
            return Err(AssetError::invalid(
                "image url",
                "data: URLs are already self-contained",
            ));
        }

        let canonical = canonicalize_url(url);
        let key = ScopeKey::new(prefix, directory);
        if let Some(existing) = self.path_for_url(&key, &canonical) {
            log::debug!("Reusing {existing} for {canonical}");
            return Ok(existing);
        }

        match (url_extension(&canonical), &self.fetcher) {
            // No extension to go by: name the file after the fetched type
            (None, Some(fetcher)) => {
                let image = fetcher.fetch(url).await?;
                let extension = extension_for_mime(&image.mime_type).unwrap_or(DEFAULT_IMAGE_EXTENSION);
                let mut state = self.state.lock();
                if let Some(existing) = state
                    .scopes
                    .get(&key)
                    .and_then(|scope| scope.path_for_url(&canonical))
                {
                    return Ok(existing.to_string());
                }
                let (logical_path, sort_index) = state.reserve(&key, extension);
                if let Some(scope) = state.scopes.get_mut(&key) {
                    scope.remember_url(canonical.clone(), logical_path.clone());
                }
                log::debug!("Localized image {canonical} -> {logical_path}");
                state.entries.push(AssetEntry {
                    logical_path: logical_path.clone(),
                    payload: AssetPayload::Bytes(image.bytes),
                    mime_type: image.mime_type,
                    sort_index,
                    resource_type: ResourceType::Image,
                });
                Ok(logical_path)
            }
            (extension, fetcher) => {
                let extension = extension.unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string());
                let (logical_path, sort_index) = {
                    let mut state = self.state.lock();
                    if let Some(existing) = state
                        .scopes
                        .get(&key)
                        .and_then(|scope| scope.path_for_url(&canonical))
                    {
                        return Ok(existing.to_string());
                    }
                    let (path, sort_index) = state.reserve(&key, &extension);
                    if let Some(scope) = state.scopes.get_mut(&key) {
                        scope.remember_url(canonical.clone(), path.clone());
                    }
                    (path, sort_index)
                };

                let (payload, mime_type) = match fetcher {
                    Some(fetcher) => match fetcher.fetch(url).await {
                        Ok(image) => (AssetPayload::Bytes(image.bytes), image.mime_type),
                        Err(e) => {
                            if let Some(scope) = self.state.lock().scopes.get_mut(&key) {
                                scope.forget_url(&canonical);
                            }
                            return Err(e);
                        }
                    },
                    None => (
                        AssetPayload::Pending {
                            url: url.to_string(),
                        },
                        mime_for_extension(&extension).to_string(),
                    ),
                };

                log::debug!("Localized image {canonical} -> {logical_path}");
                self.state.lock().entries.push(AssetEntry {
                    logical_path: logical_path.clone(),
                    payload,
                    mime_type,
                    sort_index,
                    resource_type: ResourceType::Image,
                });
                Ok(logical_path)
            }
        }
    }

    fn path_for_url(&self, key: &ScopeKey, canonical: &str) -> Option<String> {
        self.state
            .lock()
            .scopes
            .get(key)
            .and_then(|scope| scope.path_for_url(canonical))
            .map(str::to_string)
    }

    /// Localize inline SVG markup and return its path relative to the document.
    ///
    /// Idempotent per content hash within one owner.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `markup` is not an `<svg>` element.
    pub async fn localize_svg(
        &self,
        markup: &str,
        directory: &str,
        prefix: &str,
    ) -> AssetResult<String> {
        let markup = markup.trim();
        if !markup
            .get(..4)
            .is_some_and(|open| open.eq_ignore_ascii_case("<svg"))
        {
            return Err(AssetError::invalid(
                "svg markup",
                "expected an <svg> element",
            ));
        }

        let hash = content_hash(markup.as_bytes());
        let key = ScopeKey::new(prefix, directory);

        let mut state = self.state.lock();
        if let Some(existing) = state
            .scopes
            .get(&key)
            .and_then(|scope| scope.path_for_hash(&hash))
        {
            log::debug!("Reusing {existing} for svg {hash}");
            return Ok(existing.to_string());
        }

        let (logical_path, sort_index) = state.reserve(&key, "svg");
        if let Some(scope) = state.scopes.get_mut(&key) {
            scope.remember_hash(hash, logical_path.clone());
        }
        state.entries.push(AssetEntry {
            logical_path: logical_path.clone(),
            payload: AssetPayload::Text(markup.to_string()),
            mime_type: SVG_MIME.to_string(),
            sort_index,
            resource_type: ResourceType::Svg,
        });
        log::debug!("Localized svg -> {logical_path}");
        Ok(logical_path)
    }

    /// Snapshot of the current entries in creation order.
    #[must_use]
    pub fn entries(&self) -> Vec<AssetEntry> {
        let mut entries = self.state.lock().entries.clone();
        entries.sort_by_key(|e| e.sort_index);
        entries
    }

    /// Take every entry, in creation order. Naming state is kept, so paths
    /// already handed out stay reserved.
    pub fn drain(&self) -> Vec<AssetEntry> {
        let mut entries = std::mem::take(&mut self.state.lock().entries);
        entries.sort_by_key(|e| e.sort_index);
        entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain the sink and write every entry under `root`.
    ///
    /// # Errors
    ///
    /// See [`writer::write_assets`].
    pub async fn write_to_dir(
        &self,
        root: &Path,
        fetcher: Option<&dyn ImageFetcher>,
    ) -> AssetResult<Vec<PathBuf>> {
        writer::write_assets(self.drain(), root, fetcher).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct StubFetcher {
        calls: AtomicUsize,
        fail: bool,
        mime: Option<&'static str>,
    }

    #[async_trait]
    impl ImageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> AssetResult<FetchedImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AssetError::Fetch {
                    url: url.to_string(),
                    attempts: 3,
                    message: "boom".into(),
                });
            }
            Ok(FetchedImage {
                bytes: url.as_bytes().to_vec(),
                mime_type: self.mime.unwrap_or("image/png").into(),
            })
        }
    }

    #[tokio::test]
    async fn test_image_dedup_ignores_query() {
        let sink = AssetSink::new();
        let a = sink
            .localize_image("https://img.example.com/x.jpg?w=1", "assets", "")
            .await
            .unwrap();
        let b = sink
            .localize_image("https://img.example.com/x.jpg?w=2#f", "assets", "")
            .await
            .unwrap();
        let c = sink
            .localize_image("https://img.example.com/y", "assets", "")
            .await
            .unwrap();
        assert_eq!(a, "assets/1.jpg");
        assert_eq!(a, b);
        assert_eq!(c, "assets/2.png");
        assert_eq!(sink.len(), 2);

        let entries = sink.drain();
        assert_eq!(
            entries[0].payload,
            AssetPayload::Pending {
                url: "https://img.example.com/x.jpg?w=1".into()
            }
        );
        assert_eq!(entries[0].mime_type, "image/jpeg");
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_scopes_are_independent() {
        let sink = AssetSink::new();
        let a = sink.localize_image("http://h/a.png", "assets", "p1_").await.unwrap();
        let b = sink.localize_image("http://h/a.png", "assets", "p2_").await.unwrap();
        let c = sink.localize_image("http://h/a.png", "media", "p1_").await.unwrap();
        assert_eq!(a, "assets/p1_1.png");
        assert_eq!(b, "assets/p2_1.png");
        assert_eq!(c, "media/p1_1.png");
        let sorted: Vec<usize> = sink.entries().iter().map(|e| e.sort_index).collect();
        assert_eq!(sorted, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_contract_violations() {
        let sink = AssetSink::new();
        let err = sink.localize_image("  ", "assets", "").await.unwrap_err();
        assert!(err.is_contract_violation());
        let err = sink
            .localize_image("data:image/png;base64,AAAA", "assets", "")
            .await
            .unwrap_err();
        assert!(err.is_contract_violation());
        let err = sink.localize_svg("<div></div>", "assets", "").await.unwrap_err();
        assert!(err.is_contract_violation());
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_svg_dedup_by_content() {
        let sink = AssetSink::new();
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect/></svg>"#;
        let a = sink.localize_svg(svg, "assets", "").await.unwrap();
        let b = sink.localize_svg(&format!("  {svg}\n"), "assets", "").await.unwrap();
        let c = sink.localize_svg("<svg><circle/></svg>", "assets", "").await.unwrap();
        assert_eq!(a, "assets/1.svg");
        assert_eq!(a, b);
        assert_eq!(c, "assets/2.svg");
        assert_eq!(sink.entries()[0].resource_type, ResourceType::Svg);
    }

    #[tokio::test]
    async fn test_fetcher_payload_and_single_fetch() {
        let fetcher = Arc::new(StubFetcher::default());
        let sink = AssetSink::with_fetcher(fetcher.clone());
        sink.localize_image("http://h/a.gif", "assets", "").await.unwrap();
        sink.localize_image("http://h/a.gif", "assets", "").await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            sink.entries()[0].payload,
            AssetPayload::Bytes(b"http://h/a.gif".to_vec())
        );
    }

    #[tokio::test]
    async fn test_extensionless_url_named_after_fetched_type() {
        let fetcher = Arc::new(StubFetcher {
            mime: Some("image/jpeg"),
            ..Default::default()
        });
        let sink = AssetSink::with_fetcher(fetcher.clone());
        let a = sink
            .localize_image("https://img.example/direct/abc", "assets", "")
            .await
            .unwrap();
        let b = sink
            .localize_image("https://img.example/direct/abc?x=1", "assets", "")
            .await
            .unwrap();
        assert_eq!(a, "assets/1.jpg");
        assert_eq!(a, b);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(sink.entries()[0].mime_type, "image/jpeg");

        // Failed fetches of extensionless URLs claim no file number
        let failing = Arc::new(StubFetcher {
            fail: true,
            ..Default::default()
        });
        let sink = AssetSink::with_fetcher(failing);
        assert!(sink.localize_image("https://img.example/x", "assets", "").await.is_err());
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_failed_fetch_propagates_and_releases_url() {
        let fetcher = Arc::new(StubFetcher {
            fail: true,
            ..Default::default()
        });
        let sink = AssetSink::with_fetcher(fetcher.clone());
        let err = sink.localize_image("http://h/a.png", "assets", "").await.unwrap_err();
        assert!(matches!(err, AssetError::Fetch { .. }));
        assert!(!err.is_contract_violation());
        assert!(sink.is_empty());

        // The URL is not cached, so the next call fetches again
        let _ = sink.localize_image("http://h/a.png", "assets", "").await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_write_to_dir_resolves_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let sink = AssetSink::new();
        sink.localize_svg("<svg/>", "assets", "").await.unwrap();
        sink.localize_image("http://h/a.png", "assets", "").await.unwrap();

        let fetcher = StubFetcher::default();
        let written = sink.write_to_dir(dir.path(), Some(&fetcher)).await.unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("assets/1.svg")).unwrap(),
            "<svg/>"
        );
        assert_eq!(
            std::fs::read(dir.path().join("assets/2.png")).unwrap(),
            b"http://h/a.png"
        );
    }

    #[tokio::test]
    async fn test_write_to_dir_skips_pending_without_fetcher() {
        let dir = tempfile::tempdir().unwrap();
        let sink = AssetSink::new();
        sink.localize_image("http://h/a.png", "assets", "").await.unwrap();
        let written = sink.write_to_dir(dir.path(), None).await.unwrap();
        assert!(written.is_empty());
        assert!(!dir.path().join("assets/1.png").exists());
    }
}
