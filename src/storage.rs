use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::ImageFormat;
use tokio::sync::oneshot;

use crate::capabilities::{BlobFetcher, Capabilities, Filesystem, UriBridge};
use crate::error::{GalleryError, ProviderError, Result};
use crate::types::{CapturedPhoto, Directory, Photo, RuntimeEnvironment, JPEG_DATA_URI_PREFIX};

#[async_trait]
pub trait PhotoStorage: Send + Sync {
    fn environment(&self) -> RuntimeEnvironment;

    async fn read_as_base64(&self, photo: &CapturedPhoto) -> Result<String>;

    async fn save_picture(&self, photo: &CapturedPhoto) -> Result<Photo>;

    fn serialize(&self, photos: &[Photo]) -> Result<String>;

    /// Post-load enrichment of records read back from the store.
    async fn hydrate(&self, photos: &mut [Photo]) -> Result<()>;
}

pub fn for_environment(
    environment: RuntimeEnvironment,
    capabilities: &Capabilities,
) -> Box<dyn PhotoStorage> {
    match environment {
        RuntimeEnvironment::Hybrid => Box::new(HybridStorage {
            filesystem: capabilities.filesystem.clone(),
            bridge: capabilities.bridge.clone(),
        }),
        RuntimeEnvironment::Browser => Box::new(BrowserStorage {
            filesystem: capabilities.filesystem.clone(),
            blobs: capabilities.blobs.clone(),
        }),
    }
}

pub fn photo_file_name(epoch_millis: i64) -> String {
    format!("{}.jpeg", epoch_millis)
}

async fn write_to_data_dir(filesystem: &dyn Filesystem, base64_data: &str) -> Result<(String, String)> {
    let file_name = photo_file_name(chrono::Utc::now().timestamp_millis());
    let uri = filesystem
        .write_file(&file_name, base64_data, Directory::Data)
        .await
        .map_err(|source| {
            log::error!("Failed to write photo file {}: {}", file_name, source);
            GalleryError::FileWriteFailed {
                path: file_name.clone(),
                source,
            }
        })?;
    log::debug!("Wrote photo {} ({} base64 chars) to {}", file_name, base64_data.len(), uri);
    Ok((file_name, uri))
}

pub struct HybridStorage {
    filesystem: Arc<dyn Filesystem>,
    bridge: Arc<dyn UriBridge>,
}

#[async_trait]
impl PhotoStorage for HybridStorage {
    fn environment(&self) -> RuntimeEnvironment {
        RuntimeEnvironment::Hybrid
    }

    async fn read_as_base64(&self, photo: &CapturedPhoto) -> Result<String> {
        let path = photo.path.as_deref().ok_or_else(|| {
            GalleryError::CaptureFailed(ProviderError::InvalidData(format!(
                "capture {} has no native path",
                photo.web_path
            )))
        })?;

        self.filesystem
            .read_file(path, None)
            .await
            .map_err(|source| {
                log::error!("Failed to read captured file {}: {}", path, source);
                GalleryError::FileReadFailed {
                    path: path.to_string(),
                    source,
                }
            })
    }

    async fn save_picture(&self, photo: &CapturedPhoto) -> Result<Photo> {
        let data = self.read_as_base64(photo).await?;
        let (_, uri) = write_to_data_dir(self.filesystem.as_ref(), &data).await?;
        let webview_path = self.bridge.convert_file_src(&uri);
        Ok(Photo::new(uri, webview_path))
    }

    fn serialize(&self, photos: &[Photo]) -> Result<String> {
        Ok(serde_json::to_string(photos)?)
    }

    async fn hydrate(&self, _photos: &mut [Photo]) -> Result<()> {
        Ok(())
    }
}

pub struct BrowserStorage {
    filesystem: Arc<dyn Filesystem>,
    blobs: Arc<dyn BlobFetcher>,
}

#[async_trait]
impl PhotoStorage for BrowserStorage {
    fn environment(&self) -> RuntimeEnvironment {
        RuntimeEnvironment::Browser
    }

    async fn read_as_base64(&self, photo: &CapturedPhoto) -> Result<String> {
        let blob = self
            .blobs
            .fetch(&photo.web_path)
            .await
            .map_err(|e| GalleryError::BlobReadFailed {
                uri: photo.web_path.clone(),
                reason: e.to_string(),
            })?;
        let data_uri = blob_to_data_uri(&photo.web_path, blob).await?;
        if !data_uri.starts_with(JPEG_DATA_URI_PREFIX) {
            log::error!("Rejecting non-JPEG capture {}", photo.web_path);
            return Err(GalleryError::BlobReadFailed {
                uri: photo.web_path.clone(),
                reason: "captured image is not a JPEG".to_string(),
            });
        }
        Ok(data_uri_payload(&data_uri).to_string())
    }

    async fn save_picture(&self, photo: &CapturedPhoto) -> Result<Photo> {
        let data = self.read_as_base64(photo).await?;
        let (file_name, _) = write_to_data_dir(self.filesystem.as_ref(), &data).await?;
        Ok(Photo::new(file_name, photo.web_path.clone()))
    }

    fn serialize(&self, photos: &[Photo]) -> Result<String> {
        let stripped: Vec<Photo> = photos.iter().map(Photo::without_base64).collect();
        Ok(serde_json::to_string(&stripped)?)
    }

    async fn hydrate(&self, photos: &mut [Photo]) -> Result<()> {
        for photo in photos.iter_mut() {
            let data = self
                .filesystem
                .read_file(&photo.filepath, Some(Directory::Data))
                .await
                .map_err(|source| {
                    log::error!("Failed to read saved photo {}: {}", photo.filepath, source);
                    GalleryError::FileReadFailed {
                        path: photo.filepath.clone(),
                        source,
                    }
                })?;
            photo.base64 = Some(format!("{}{}", JPEG_DATA_URI_PREFIX, data));
        }
        Ok(())
    }
}

// A worker that dies before answering surfaces as a read failure.
pub async fn blob_to_data_uri(uri: &str, blob: Vec<u8>) -> Result<String> {
    let (tx, rx) = oneshot::channel::<std::result::Result<String, String>>();

    tokio::task::spawn_blocking(move || {
        let outcome = if blob.is_empty() {
            Err("empty blob".to_string())
        } else {
            let mime = sniff_mime(&blob);
            Ok(format!("data:{};base64,{}", mime, BASE64.encode(&blob)))
        };
        let _ = tx.send(outcome);
    });

    match rx.await {
        Ok(Ok(data_uri)) => Ok(data_uri),
        Ok(Err(reason)) => Err(GalleryError::BlobReadFailed {
            uri: uri.to_string(),
            reason,
        }),
        Err(_) => Err(GalleryError::BlobReadFailed {
            uri: uri.to_string(),
            reason: "encoder stopped before finishing".to_string(),
        }),
    }
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::Png) => "image/png",
        Ok(other) => {
            log::warn!("Captured image has unexpected format {:?}", other);
            "application/octet-stream"
        }
        Err(_) => {
            log::warn!("Could not determine captured image format");
            "application/octet-stream"
        }
    }
}

/// Part of a data URI after the `base64,` marker; non-data strings pass through.
pub fn data_uri_payload(data_uri: &str) -> &str {
    match data_uri.find(";base64,") {
        Some(idx) if data_uri.starts_with("data:") => &data_uri[idx + ";base64,".len()..],
        _ => data_uri,
    }
}
