use std::sync::Arc;

use crate::capabilities::{Camera, Capabilities, Filesystem, KeyValueStore};
use crate::error::{GalleryError, Result};
use crate::storage::{self, PhotoStorage};
use crate::types::{CameraOptions, Directory, Photo, RuntimeEnvironment};

pub const DEFAULT_STORAGE_KEY: &str = "photos";

/// Keeps the newest-first photo list in sync with the filesystem and the
/// key-value store.
///
/// Operations take `&mut self` and run one capability call at a time. Hosts
/// sharing a gallery between tasks wrap it in `Arc<tokio::sync::Mutex<_>>`.
pub struct PhotoGallery {
    camera: Arc<dyn Camera>,
    filesystem: Arc<dyn Filesystem>,
    store: Arc<dyn KeyValueStore>,
    storage: Box<dyn PhotoStorage>,
    storage_key: String,
    photos: Vec<Photo>,
}

impl PhotoGallery {
    pub fn new(capabilities: Capabilities, storage_key: impl Into<String>) -> Self {
        let environment = capabilities.platform.environment();
        let storage = storage::for_environment(environment, &capabilities);
        let storage_key = storage_key.into();

        log::info!(
            "PhotoGallery initialized for {} environment with storage key: {}",
            environment,
            storage_key
        );

        Self {
            camera: capabilities.camera,
            filesystem: capabilities.filesystem,
            store: capabilities.store,
            storage,
            storage_key,
            photos: Vec::new(),
        }
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn environment(&self) -> RuntimeEnvironment {
        self.storage.environment()
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Capture a photo, save it to the data directory and persist the list.
    ///
    /// A placeholder entry is shown while the file is written and is replaced
    /// in place by the durable record, so each capture adds one entry.
    pub async fn add_new_to_gallery(&mut self) -> Result<Photo> {
        let captured = self
            .camera
            .get_photo(CameraOptions::gallery_capture())
            .await
            .map_err(|e| {
                log::error!("Camera capture failed: {}", e);
                GalleryError::CaptureFailed(e)
            })?;

        log::debug!("[PhotoGallery] Captured photo at {}", captured.web_path);

        self.photos.insert(0, Photo::placeholder(captured.web_path.clone()));

        let saved = match self.storage.save_picture(&captured).await {
            Ok(saved) => saved,
            Err(e) => {
                self.remove_placeholder(&captured.web_path);
                return Err(e);
            }
        };

        match self.placeholder_index(&captured.web_path) {
            Some(idx) => self.photos[idx] = saved.clone(),
            None => self.photos.insert(0, saved.clone()),
        }

        self.persist().await?;

        log::info!("Added photo {} to gallery", saved.filepath);
        Ok(saved)
    }

    /// A missing value (or JSON `null`) loads as an empty gallery; a value that
    /// does not parse is reported and leaves the current list untouched.
    pub async fn load_saved(&mut self) -> Result<&[Photo]> {
        let stored = self
            .store
            .get(&self.storage_key)
            .await
            .map_err(|source| {
                log::error!("Failed to read {} from store: {}", self.storage_key, source);
                GalleryError::StoreReadFailed {
                    key: self.storage_key.clone(),
                    source,
                }
            })?;

        let mut photos = match stored {
            Some(value) => serde_json::from_str::<Option<Vec<Photo>>>(&value)
                .map_err(|source| {
                    log::error!("Stored photo list under {} is malformed: {}", self.storage_key, source);
                    GalleryError::MalformedPersistedList {
                        key: self.storage_key.clone(),
                        source,
                    }
                })?
                .unwrap_or_default(),
            None => Vec::new(),
        };

        self.storage.hydrate(&mut photos).await?;

        log::info!("Loaded {} photos from {}", photos.len(), self.storage_key);
        self.photos = photos;
        Ok(&self.photos)
    }

    /// The entry at `position` is removed when it matches `photo`; otherwise
    /// the first entry with the same `filepath` is. A failed store write puts
    /// the entry back and leaves the file alone.
    pub async fn delete_picture(&mut self, photo: &Photo, position: usize) -> Result<Option<Photo>> {
        let index = match self.photos.get(position) {
            Some(candidate) if candidate.filepath == photo.filepath => Some(position),
            _ => self.photos.iter().position(|p| p.filepath == photo.filepath),
        };

        let removed = index.map(|idx| (idx, self.photos.remove(idx)));
        if removed.is_none() {
            log::warn!(
                "Photo {} not found in gallery (position {}), deleting file only",
                photo.filepath,
                position
            );
        }

        if let Err(e) = self.persist().await {
            if let Some((idx, record)) = removed {
                self.photos.insert(idx, record);
            }
            return Err(e);
        }
        let removed = removed.map(|(_, record)| record);

        let file_name = photo.file_name();
        self.filesystem
            .delete_file(file_name, Directory::Data)
            .await
            .map_err(|source| {
                log::error!("Failed to delete photo file {}: {}", file_name, source);
                GalleryError::FileDeleteFailed {
                    path: file_name.to_string(),
                    source,
                }
            })?;

        log::info!("Deleted photo {}", photo.filepath);
        Ok(removed)
    }

    async fn persist(&self) -> Result<()> {
        let value = self.storage.serialize(&self.photos)?;
        self.store
            .set(&self.storage_key, &value)
            .await
            .map_err(|source| {
                log::error!("Failed to write {} to store: {}", self.storage_key, source);
                GalleryError::StoreWriteFailed {
                    key: self.storage_key.clone(),
                    source,
                }
            })
    }

    fn placeholder_index(&self, web_path: &str) -> Option<usize> {
        self.photos
            .iter()
            .position(|p| p.is_placeholder() && p.webview_path == web_path)
    }

    fn remove_placeholder(&mut self, web_path: &str) {
        if let Some(idx) = self.placeholder_index(web_path) {
            self.photos.remove(idx);
        }
    }
}
