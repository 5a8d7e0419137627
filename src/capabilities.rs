use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProviderResult;
use crate::types::{CameraOptions, CapturedPhoto, Directory, RuntimeEnvironment};

#[async_trait]
pub trait Camera: Send + Sync {
    async fn get_photo(&self, options: CameraOptions) -> ProviderResult<CapturedPhoto>;
}

/// Filesystem plugin. File contents travel as base64 strings.
#[async_trait]
pub trait Filesystem: Send + Sync {
    async fn write_file(&self, path: &str, data: &str, directory: Directory) -> ProviderResult<String>;

    /// Read a file as base64. `None` addresses an absolute native path.
    async fn read_file(&self, path: &str, directory: Option<Directory>) -> ProviderResult<String>;

    async fn delete_file(&self, path: &str, directory: Directory) -> ProviderResult<()>;
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> ProviderResult<()>;

    async fn get(&self, key: &str) -> ProviderResult<Option<String>>;
}

/// Fetches the bytes behind a transient capture URI (browser mode).
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    async fn fetch(&self, uri: &str) -> ProviderResult<Vec<u8>>;
}

pub trait Platform: Send + Sync {
    fn environment(&self) -> RuntimeEnvironment;
}

/// Converts a native file URI into one a web view can render.
pub trait UriBridge: Send + Sync {
    fn convert_file_src(&self, uri: &str) -> String;
}

#[derive(Clone)]
pub struct Capabilities {
    pub camera: Arc<dyn Camera>,
    pub filesystem: Arc<dyn Filesystem>,
    pub store: Arc<dyn KeyValueStore>,
    pub platform: Arc<dyn Platform>,
    pub bridge: Arc<dyn UriBridge>,
    pub blobs: Arc<dyn BlobFetcher>,
}
