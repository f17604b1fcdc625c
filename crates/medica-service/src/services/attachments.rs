//! Consult attachment storage.
//!
//! Uploaded files are written under the configured upload directory with a
//! unique name `{unix_seconds}_{8 hex}_{sanitized}` and referenced from the
//! consult as `uploads/{name}`.

use crate::errors::MedicaError;
use async_trait::async_trait;
use ring::rand::{SecureRandom, SystemRandom};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::instrument;

/// File extensions accepted for consult attachments (lowercase).
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["pdf", "doc", "docx", "jpg", "jpeg", "png"];

/// Prefix of the path stored on the consult.
pub const ATTACHMENT_PATH_PREFIX: &str = "uploads";

/// Longest sanitized name kept. The stored path adds 28 characters and must
/// fit `vip_consults.attachment_path VARCHAR(500)`.
pub const MAX_SANITIZED_NAME_CHARS: usize = 200;

/// Whether the file name carries an allowed extension.
pub fn allowed_file(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied file name to a safe single path component.
///
/// Directory components are dropped, whitespace becomes `_`, only
/// `[A-Za-z0-9._-]` is kept, and leading dots are removed. Long names are
/// cut to [`MAX_SANITIZED_NAME_CHARS`], keeping the extension. Returns
/// `None` when nothing is left.
pub fn sanitize_filename(file_name: &str) -> Option<String> {
    let base = file_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);

    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        None
    } else {
        Some(truncate_keeping_extension(cleaned, MAX_SANITIZED_NAME_CHARS))
    }
}

fn truncate_keeping_extension(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.chars().count() < max_chars => {
            let keep = max_chars - ext.chars().count() - 1;
            let stem: String = stem.chars().take(keep).collect();
            format!("{stem}.{ext}")
        }
        _ => name.chars().take(max_chars).collect(),
    }
}

/// Stored file name for a sanitized upload.
pub fn stored_file_name(unix_seconds: i64, suffix: &str, sanitized: &str) -> String {
    format!("{unix_seconds}_{suffix}_{sanitized}")
}

/// Sink for consult attachments.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Persist `contents` under a unique name derived from `sanitized_name`
    /// and return the path to record on the consult.
    async fn save(&self, sanitized_name: &str, contents: &[u8]) -> Result<String, MedicaError>;

    /// Remove a file previously returned by [`AttachmentStore::save`].
    /// Removing a missing file is not an error.
    async fn delete(&self, path: &str) -> Result<(), MedicaError>;
}

/// File name part of a stored path, if it is a single component under
/// [`ATTACHMENT_PATH_PREFIX`].
fn stored_name(path: &str) -> Option<&str> {
    path.strip_prefix(ATTACHMENT_PATH_PREFIX)?
        .strip_prefix('/')
        .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && !name.starts_with('.'))
}

/// Attachment store backed by a local directory.
pub struct LocalAttachmentStore {
    dir: PathBuf,
    rng: SystemRandom,
}

impl LocalAttachmentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            rng: SystemRandom::new(),
        }
    }

    fn random_suffix(&self) -> Result<String, MedicaError> {
        let mut bytes = [0u8; 4];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| MedicaError::Storage("CSPRNG failure".to_string()))?;
        Ok(hex::encode(bytes))
    }
}

#[async_trait]
impl AttachmentStore for LocalAttachmentStore {
    #[instrument(skip_all, fields(size = contents.len()))]
    async fn save(&self, sanitized_name: &str, contents: &[u8]) -> Result<String, MedicaError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| MedicaError::Storage(format!("create upload dir: {e}")))?;

        let name = stored_file_name(
            chrono::Utc::now().timestamp(),
            &self.random_suffix()?,
            sanitized_name,
        );
        let path = self.dir.join(&name);

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| MedicaError::Storage(format!("open {}: {e}", path.display())))?;

        file.write_all(contents)
            .await
            .map_err(|e| MedicaError::Storage(format!("write {}: {e}", path.display())))?;
        file.flush()
            .await
            .map_err(|e| MedicaError::Storage(format!("flush {}: {e}", path.display())))?;

        tracing::debug!(target: "medica.service.attachments", file = %name, "Attachment stored");

        Ok(format!("{ATTACHMENT_PATH_PREFIX}/{name}"))
    }

    #[instrument(skip_all)]
    async fn delete(&self, path: &str) -> Result<(), MedicaError> {
        let name = stored_name(path)
            .ok_or_else(|| MedicaError::Storage(format!("not an attachment path: {path}")))?;

        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => {
                tracing::debug!(target: "medica.service.attachments", file = %name, "Attachment removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MedicaError::Storage(format!("remove {name}: {e}"))),
        }
    }
}

/// In-memory attachment store for tests.
pub mod memory {
    use super::{stored_file_name, AttachmentStore, ATTACHMENT_PATH_PREFIX};
    use crate::errors::MedicaError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Mutex;

    /// Keeps saved attachments in a map keyed by the returned path.
    #[derive(Default)]
    pub struct InMemoryAttachmentStore {
        files: Mutex<HashMap<String, Vec<u8>>>,
        saves: AtomicU32,
    }

    impl InMemoryAttachmentStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Contents saved under `path`, if any.
        pub async fn get(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }

        /// Number of saved files.
        pub async fn len(&self) -> usize {
            self.files.lock().await.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.files.lock().await.is_empty()
        }
    }

    #[async_trait]
    impl AttachmentStore for InMemoryAttachmentStore {
        async fn save(&self, sanitized_name: &str, contents: &[u8]) -> Result<String, MedicaError> {
            let mut files = self.files.lock().await;
            let suffix = format!("{:08x}", self.saves.fetch_add(1, Ordering::Relaxed));
            let path = format!(
                "{ATTACHMENT_PATH_PREFIX}/{}",
                stored_file_name(chrono::Utc::now().timestamp(), &suffix, sanitized_name)
            );
            files.insert(path.clone(), contents.to_vec());
            Ok(path)
        }

        async fn delete(&self, path: &str) -> Result<(), MedicaError> {
            self.files.lock().await.remove(path);
            Ok(())
        }
    }
}
