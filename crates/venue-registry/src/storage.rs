use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::telemetry::ASSET_UPLOAD_BYTES;

/// URL prefix under which stored assets are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// A file received in a multipart form, not yet persisted.
#[derive(Debug, Clone)]
pub struct Upload { pub file_name: String, pub bytes: Bytes }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset { pub reference: String, pub size_bytes: u64 }

/// Durable blob storage for uploaded images. Records only ever hold the returned reference.
#[async_trait]
pub trait AssetStore: Send + Sync + 'static {
    async fn put(&self, original_name: &str, bytes: Bytes) -> anyhow::Result<StoredAsset>;
    /// Directory served under [`PUBLIC_PREFIX`], if the store is filesystem backed.
    fn serve_dir(&self) -> Option<&Path> { None }
}

/// Stores files as `<unix-millis>-<original name>` in a local directory.
#[derive(Debug, Clone)]
pub struct LocalAssetStore { dir: PathBuf }

impl LocalAssetStore {
    pub fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).with_context(|| format!("create upload dir {dir:?}"))?;
        info!(dir=%dir.display(), "asset_store.init_local");
        Ok(Self { dir })
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn put(&self, original_name: &str, bytes: Bytes) -> anyhow::Result<StoredAsset> {
        let name = sanitize_file_name(original_name);
        let tmp_path = self.dir.join(format!(".upload-{}.part", Uuid::new_v4()));
        tokio::fs::write(&tmp_path, &bytes).await.with_context(|| format!("write {tmp_path:?}"))?;
        // hard_link refuses to replace an existing file, so two uploads never share a name
        let mut millis = chrono::Utc::now().timestamp_millis();
        let mut attempts = 0;
        let file_name = loop {
            let candidate = format!("{millis}-{name}");
            match tokio::fs::hard_link(&tmp_path, self.dir.join(&candidate)).await {
                Ok(()) => break candidate,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && attempts < MAX_NAME_ATTEMPTS => {
                    millis += 1;
                    attempts += 1;
                }
                Err(e) => {
                    let _ = tokio::fs::remove_file(&tmp_path).await;
                    return Err(anyhow::Error::new(e).context(format!("persist asset {candidate}")));
                }
            }
        };
        if let Err(e) = tokio::fs::remove_file(&tmp_path).await { warn!(?e, path=%tmp_path.display(), "asset_store.tmp_cleanup_failed"); }
        let size_bytes = bytes.len() as u64;
        ASSET_UPLOAD_BYTES.inc_by(size_bytes);
        let reference = format!("{PUBLIC_PREFIX}/{file_name}");
        info!(%reference, size_bytes, "asset.stored");
        Ok(StoredAsset { reference, size_bytes })
    }

    fn serve_dir(&self) -> Option<&Path> { Some(&self.dir) }
}

/// Keep only the final path component and replace anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(original: &str) -> String {
    let last = original.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = last.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() { "upload".to_string() } else { cleaned.to_string() }
}
