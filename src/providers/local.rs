use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::ImageFormat;
use tokio::fs;
use tokio::sync::Mutex;

use crate::bridge::{asset_path_to_native, convert_path_protocol};
use crate::capabilities::{BlobFetcher, Camera, Filesystem, KeyValueStore};
use crate::error::{ProviderError, ProviderResult};
use crate::storage::data_uri_payload;
use crate::types::{CameraOptions, CapturedPhoto, Directory};

fn io_error(path: &Path, e: std::io::Error) -> ProviderError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ProviderError::NotFound(path.display().to_string())
    } else {
        ProviderError::Io(e)
    }
}

pub fn file_uri(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    if normalized.starts_with('/') {
        format!("file://{}", normalized)
    } else {
        format!("file:///{}", normalized)
    }
}

fn native_path(uri: &str) -> PathBuf {
    let stripped = uri.strip_prefix("file://").unwrap_or(uri);
    // Windows drive paths come back as `/C:/...`.
    let stripped = match stripped.as_bytes() {
        [b'/', _, b':', ..] => &stripped[1..],
        _ => stripped,
    };
    PathBuf::from(stripped)
}

pub struct LocalFilesystem {
    root: PathBuf,
}

impl LocalFilesystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        log::info!("LocalFilesystem initialized with root: {}", root.display());
        Self { root }
    }

    pub fn directory_path(&self, directory: Directory) -> PathBuf {
        self.root.join(directory.as_str())
    }

    fn resolve(&self, path: &str, directory: Directory) -> ProviderResult<PathBuf> {
        if path.is_empty() || path.contains('/') || path.contains('\\') || path == ".." || path == "." {
            return Err(ProviderError::InvalidData(format!(
                "expected a bare file name, got {:?}",
                path
            )));
        }
        Ok(self.directory_path(directory).join(path))
    }
}

#[async_trait]
impl Filesystem for LocalFilesystem {
    async fn write_file(&self, path: &str, data: &str, directory: Directory) -> ProviderResult<String> {
        let target = self.resolve(path, directory)?;
        let bytes = BASE64
            .decode(data_uri_payload(data))
            .map_err(|e| ProviderError::InvalidData(format!("file data is not base64: {}", e)))?;

        let dir = self.directory_path(directory);
        if !dir.exists() {
            fs::create_dir_all(&dir).await.map_err(|e| io_error(&dir, e))?;
        }
        fs::write(&target, &bytes).await.map_err(|e| {
            log::error!("Failed to write file {}: {}", target.display(), e);
            io_error(&target, e)
        })?;

        log::debug!("Wrote {} bytes to {}", bytes.len(), target.display());
        Ok(file_uri(&target))
    }

    async fn read_file(&self, path: &str, directory: Option<Directory>) -> ProviderResult<String> {
        let source = match directory {
            Some(dir) => self.resolve(path, dir)?,
            None => native_path(path),
        };
        let bytes = fs::read(&source).await.map_err(|e| io_error(&source, e))?;
        Ok(BASE64.encode(bytes))
    }

    async fn delete_file(&self, path: &str, directory: Directory) -> ProviderResult<()> {
        let target = self.resolve(path, directory)?;
        fs::remove_file(&target).await.map_err(|e| io_error(&target, e))?;
        log::debug!("Deleted {}", target.display());
        Ok(())
    }
}

pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_map(&self) -> ProviderResult<serde_json::Map<String, serde_json::Value>> {
        if !self.path.exists() {
            return Ok(serde_json::Map::new());
        }
        let contents = fs::read_to_string(&self.path)
            .await
            .map_err(|e| io_error(&self.path, e))?;
        if contents.trim().is_empty() {
            return Ok(serde_json::Map::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn set(&self, key: &str, value: &str) -> ProviderResult<()> {
        let _guard = self.lock.lock().await;

        let mut map = self.read_map().await?;
        map.insert(key.to_string(), serde_json::Value::String(value.to_string()));
        let serialized = serde_json::to_string_pretty(&map)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| io_error(parent, e))?;
            }
        }

        let temp_path = self.path.with_extension(format!("json.{}.tmp", std::process::id()));
        fs::write(&temp_path, serialized.as_bytes())
            .await
            .map_err(|e| io_error(&temp_path, e))?;
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            log::error!("Failed to replace store file {}: {}", self.path.display(), e);
            io_error(&self.path, e)
        })?;
        Ok(())
    }

    async fn get(&self, key: &str) -> ProviderResult<Option<String>> {
        let _guard = self.lock.lock().await;

        let map = self.read_map().await?;
        match map.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Ok(Some(other.to_string())),
        }
    }
}

/// Camera stand-in for desktop shells: "captures" by importing a JPEG file.
pub struct FileImportCamera {
    source: PathBuf,
}

impl FileImportCamera {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

#[async_trait]
impl Camera for FileImportCamera {
    async fn get_photo(&self, options: CameraOptions) -> ProviderResult<CapturedPhoto> {
        log::debug!("Importing {} with {:?}", self.source.display(), options);

        let bytes = fs::read(&self.source)
            .await
            .map_err(|e| io_error(&self.source, e))?;
        match image::guess_format(&bytes) {
            Ok(ImageFormat::Jpeg) => {}
            Ok(other) => {
                return Err(ProviderError::Unsupported(format!(
                    "{} is {:?}, expected JPEG",
                    self.source.display(),
                    other
                )))
            }
            Err(e) => {
                return Err(ProviderError::InvalidData(format!(
                    "{} is not an image: {}",
                    self.source.display(),
                    e
                )))
            }
        }

        let absolute = fs::canonicalize(&self.source)
            .await
            .unwrap_or_else(|_| self.source.clone());
        let native = absolute.to_string_lossy().to_string();
        Ok(CapturedPhoto {
            web_path: convert_path_protocol(&native),
            path: Some(native),
            format: "jpeg".to_string(),
        })
    }
}

/// Resolves `asset://`, `file://` and `data:` URIs to bytes.
#[derive(Debug, Default)]
pub struct LocalBlobFetcher;

#[async_trait]
impl BlobFetcher for LocalBlobFetcher {
    async fn fetch(&self, uri: &str) -> ProviderResult<Vec<u8>> {
        if uri.starts_with("data:") {
            return BASE64
                .decode(data_uri_payload(uri))
                .map_err(|e| ProviderError::InvalidData(format!("bad data URI: {}", e)));
        }

        let path = if uri.starts_with("asset://") {
            PathBuf::from(asset_path_to_native(uri))
        } else if uri.starts_with("file://") {
            native_path(uri)
        } else if uri.contains("://") || uri.starts_with("blob:") {
            return Err(ProviderError::Unsupported(format!("cannot fetch {}", uri)));
        } else {
            PathBuf::from(uri)
        };

        log::debug!("Fetching blob from: {}", path.display());
        fs::read(&path).await.map_err(|e| io_error(&path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JPEG_DATA_URI_PREFIX;

    const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];

    #[tokio::test]
    async fn local_filesystem_round_trips_base64() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFilesystem::new(dir.path());

        let uri = fs
            .write_file("1.jpeg", &BASE64.encode(JPEG_BYTES), Directory::Data)
            .await
            .unwrap();

        assert!(uri.starts_with("file://"));
        assert!(uri.ends_with("/data/1.jpeg"));
        assert_eq!(
            std::fs::read(dir.path().join("data").join("1.jpeg")).unwrap(),
            JPEG_BYTES
        );
        assert_eq!(
            fs.read_file("1.jpeg", Some(Directory::Data)).await.unwrap(),
            BASE64.encode(JPEG_BYTES)
        );
        assert_eq!(
            fs.read_file(&uri, None).await.unwrap(),
            BASE64.encode(JPEG_BYTES)
        );
    }

    #[tokio::test]
    async fn local_filesystem_accepts_data_uri_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFilesystem::new(dir.path());
        let data_uri = format!("{}{}", JPEG_DATA_URI_PREFIX, BASE64.encode(JPEG_BYTES));

        fs.write_file("2.jpeg", &data_uri, Directory::Data).await.unwrap();

        assert_eq!(
            std::fs::read(fs.directory_path(Directory::Data).join("2.jpeg")).unwrap(),
            JPEG_BYTES
        );
    }

    #[tokio::test]
    async fn local_filesystem_rejects_nested_paths() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFilesystem::new(dir.path());

        let err = fs
            .write_file("../escape.jpeg", "QUJD", Directory::Data)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidData(_)));
    }

    #[tokio::test]
    async fn deleting_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFilesystem::new(dir.path());

        let err = fs.delete_file("nope.jpeg", Directory::Data).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[tokio::test]
    async fn json_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("store.json");

        let store = JsonFileStore::new(&path);
        assert_eq!(store.get("photos").await.unwrap(), None);
        store.set("photos", "[]").await.unwrap();
        store.set("other", "x").await.unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("photos").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(reopened.get("other").await.unwrap().as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn import_camera_rejects_non_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("shot.png");
        std::fs::write(&png, [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();

        let err = FileImportCamera::new(&png)
            .get_photo(CameraOptions::gallery_capture())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unsupported(_)));
    }

    #[tokio::test]
    async fn imported_capture_is_fetchable_through_its_web_path() {
        let dir = tempfile::tempdir().unwrap();
        let jpeg = dir.path().join("shot.jpg");
        std::fs::write(&jpeg, JPEG_BYTES).unwrap();

        let captured = FileImportCamera::new(&jpeg)
            .get_photo(CameraOptions::gallery_capture())
            .await
            .unwrap();

        assert!(captured.web_path.starts_with("asset://localhost/"));
        assert!(captured.path.is_some());
        assert_eq!(LocalBlobFetcher.fetch(&captured.web_path).await.unwrap(), JPEG_BYTES);
    }

    #[tokio::test]
    async fn blob_fetcher_decodes_data_uris() {
        let uri = format!("{}{}", JPEG_DATA_URI_PREFIX, BASE64.encode(JPEG_BYTES));
        assert_eq!(LocalBlobFetcher.fetch(&uri).await.unwrap(), JPEG_BYTES);
        assert!(LocalBlobFetcher.fetch("blob:http://localhost/1").await.is_err());
    }
}
