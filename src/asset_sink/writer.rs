//! Directory packager
//!
//! Writes drained [`AssetEntry`] records under an output root, resolving
//! `Pending` payloads through a fetcher when one is supplied.

use std::path::{Path, PathBuf};

use super::errors::{AssetError, AssetResult};
use super::fetcher::ImageFetcher;
use super::types::{AssetEntry, AssetPayload};

/// Write `entries` to `root/<logical_path>`.
///
/// Pending entries are fetched with `fetcher`; without one they are skipped
/// with a warning. Returns the paths actually written, in `sort_index` order.
///
/// # Errors
///
/// Returns `AssetError::Io` on filesystem failures and propagates fetch errors
/// for pending entries.
pub async fn write_assets(
    mut entries: Vec<AssetEntry>,
    root: &Path,
    fetcher: Option<&dyn ImageFetcher>,
) -> AssetResult<Vec<PathBuf>> {
    entries.sort_by_key(|e| e.sort_index);
    let mut written = Vec::with_capacity(entries.len());

    for entry in entries {
        let target = root.join(&entry.logical_path);

        let bytes = match entry.payload {
            AssetPayload::Bytes(bytes) => bytes,
            AssetPayload::Text(text) => text.into_bytes(),
            AssetPayload::Pending { url } => match fetcher {
                Some(fetcher) => fetcher.fetch(&url).await?.bytes,
                None => {
                    log::warn!(
                        "Skipping {} - no fetcher available for pending image {url}",
                        entry.logical_path
                    );
                    continue;
                }
            },
        };

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| AssetError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|source| AssetError::Io {
                path: target.clone(),
                source,
            })?;

        log::debug!("Wrote {} ({} bytes)", target.display(), bytes.len());
        written.push(target);
    }

    Ok(written)
}
