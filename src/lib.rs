mod bridge;
mod capabilities;
mod config;
mod error;
mod gallery;
pub mod providers;
mod storage;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

pub use bridge::{asset_path_to_native, convert_path_protocol, AssetProtocolBridge};
pub use capabilities::{BlobFetcher, Camera, Capabilities, Filesystem, KeyValueStore, Platform, UriBridge};
pub use config::GalleryConfig;
pub use error::{GalleryError, ProviderError, ProviderResult, Result};
pub use gallery::{PhotoGallery, DEFAULT_STORAGE_KEY};
pub use storage::{blob_to_data_uri, photo_file_name, PhotoStorage};
pub use types::{
    CameraOptions, CameraResultType, CameraSource, CapturedPhoto, Directory, Photo, RuntimeEnvironment,
    JPEG_DATA_URI_PREFIX, PLACEHOLDER_FILEPATH,
};

use providers::memory::ScriptedCamera;
use providers::{FileImportCamera, FixedPlatform, JsonFileStore, LocalBlobFetcher, LocalFilesystem};

/// Build a gallery over the local-disk providers described by `config`.
///
/// `import` is the JPEG the camera hands out on capture; without it every
/// capture is reported as cancelled.
pub fn open_local_gallery(config: &GalleryConfig, import: Option<PathBuf>) -> PhotoGallery {
    let camera: Arc<dyn Camera> = match import {
        Some(path) => Arc::new(FileImportCamera::new(path)),
        None => Arc::new(ScriptedCamera::default()),
    };

    let capabilities = Capabilities {
        camera,
        filesystem: Arc::new(LocalFilesystem::new(&config.data_dir)),
        store: Arc::new(JsonFileStore::new(config.store_path())),
        platform: Arc::new(FixedPlatform(config.environment)),
        bridge: Arc::new(AssetProtocolBridge),
        blobs: Arc::new(LocalBlobFetcher),
    };

    PhotoGallery::new(capabilities, config.storage_key.clone())
}
