use crate::errors::ServiceError;
use std::path::PathBuf;
use tracing::info;

/// Maximum accepted image size (16 MiB)
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Local blob store for task and profile images. Files land under `root` and
/// are served back under the `/uploads` path by the HTTP layer.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    /// Validate and persist an uploaded image, returning its public URL.
    ///
    /// The stored name is `{prefix}_{sanitized original name}` so task and
    /// profile images cannot collide.
    pub async fn store(
        &self,
        prefix: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, ServiceError> {
        if original_name.is_empty() {
            return Err(ServiceError::ValidationError(
                "No image selected".to_string(),
            ));
        }

        if !allowed_file(original_name) {
            return Err(ServiceError::ValidationError(
                "Invalid file type. Use PNG, JPG, JPEG, or GIF".to_string(),
            ));
        }

        if bytes.is_empty() {
            return Err(ServiceError::ValidationError(
                "Uploaded file is empty".to_string(),
            ));
        }

        if bytes.len() > self.max_bytes {
            return Err(ServiceError::ValidationError(format!(
                "File exceeds the maximum upload size of {} bytes",
                self.max_bytes
            )));
        }

        let filename = format!("{}_{}", prefix, sanitize_filename(original_name));
        let path = self.root.join(&filename);

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ServiceError::InternalError(format!("Upload dir unavailable: {}", e)))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ServiceError::InternalError(format!("Failed to store upload: {}", e)))?;

        info!(file = %filename, size = bytes.len(), "Stored uploaded image");

        Ok(format!("/uploads/{}", filename))
    }
}

/// Whether the filename carries an allowed image extension
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Strip path components and collapse anything outside [A-Za-z0-9._-]
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim_matches('.');

    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_whitelist() {
        assert!(allowed_file("photo.png"));
        assert!(allowed_file("photo.JPG"));
        assert!(allowed_file("photo.jpeg"));
        assert!(allowed_file("animation.gif"));
        assert!(!allowed_file("notes.txt"));
        assert!(!allowed_file("archive.tar.gz"));
        assert!(!allowed_file("no_extension"));
    }

    #[test]
    fn sanitize_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd.png"), "passwd.png");
        assert_eq!(sanitize_filename("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_filename("C:\\temp\\shot.gif"), "shot.gif");
    }

    #[tokio::test]
    async fn store_writes_the_file_and_returns_a_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), MAX_UPLOAD_BYTES);

        let url = store.store("task_7", "fence.png", b"fake-png").await.unwrap();
        assert_eq!(url, "/uploads/task_7_fence.png");
        assert!(dir.path().join("task_7_fence.png").exists());
    }

    #[tokio::test]
    async fn store_rejects_disallowed_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), MAX_UPLOAD_BYTES);

        let err = store.store("task_7", "malware.exe", b"nope").await;
        assert!(matches!(err, Err(ServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn store_rejects_oversized_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), 8);

        let err = store.store("task_7", "big.png", b"123456789").await;
        assert!(matches!(err, Err(ServiceError::ValidationError(_))));
    }
}
