use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::capabilities::{BlobFetcher, Camera, Filesystem, KeyValueStore};
use crate::error::{ProviderError, ProviderResult};
use crate::types::{CameraOptions, CapturedPhoto, Directory};

// Empty queue reports a cancelled capture.
#[derive(Default)]
pub struct ScriptedCamera {
    queue: Mutex<VecDeque<CapturedPhoto>>,
    last_options: Mutex<Option<CameraOptions>>,
}

impl ScriptedCamera {
    pub fn push(&self, photo: CapturedPhoto) {
        self.queue.lock().unwrap().push_back(photo);
    }

    pub fn last_options(&self) -> Option<CameraOptions> {
        *self.last_options.lock().unwrap()
    }
}

#[async_trait]
impl Camera for ScriptedCamera {
    async fn get_photo(&self, options: CameraOptions) -> ProviderResult<CapturedPhoto> {
        *self.last_options.lock().unwrap() = Some(options);
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(ProviderError::Cancelled)
    }
}

#[derive(Default)]
pub struct MemoryFilesystem {
    files: Mutex<HashMap<(Directory, String), String>>,
    native: Mutex<HashMap<String, String>>,
    last_uri: Mutex<Option<String>>,
    reads: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryFilesystem {
    pub const URI_PREFIX: &'static str = "file:///memory/";

    /// Place a file outside the managed directories, as a native camera would.
    pub fn insert_native(&self, path: &str, data: impl Into<String>) {
        self.native.lock().unwrap().insert(path.to_string(), data.into());
    }

    pub fn data_file(&self, name: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(&(Directory::Data, name.to_string()))
            .cloned()
    }

    pub fn last_written_uri(&self) -> Option<String> {
        self.last_uri.lock().unwrap().clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Filesystem for MemoryFilesystem {
    async fn write_file(&self, path: &str, data: &str, directory: Directory) -> ProviderResult<String> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ProviderError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.files
            .lock()
            .unwrap()
            .insert((directory, path.to_string()), data.to_string());
        let uri = format!("{}{}/{}", Self::URI_PREFIX, directory.as_str(), path);
        *self.last_uri.lock().unwrap() = Some(uri.clone());
        Ok(uri)
    }

    async fn read_file(&self, path: &str, directory: Option<Directory>) -> ProviderResult<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let found = match directory {
            Some(dir) => self.files.lock().unwrap().get(&(dir, path.to_string())).cloned(),
            None => self.native.lock().unwrap().get(path).cloned(),
        };
        found.ok_or_else(|| ProviderError::NotFound(path.to_string()))
    }

    async fn delete_file(&self, path: &str, directory: Directory) -> ProviderResult<()> {
        self.files
            .lock()
            .unwrap()
            .remove(&(directory, path.to_string()))
            .map(|_| ())
            .ok_or_else(|| ProviderError::NotFound(path.to_string()))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn insert(&self, key: &str, value: impl Into<String>) {
        self.values.lock().unwrap().insert(key.to_string(), value.into());
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &str) -> ProviderResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ProviderError::Unsupported("store is read-only".to_string()));
        }
        self.insert(key, value);
        Ok(())
    }

    async fn get(&self, key: &str) -> ProviderResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ProviderError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "store locked",
            )));
        }
        Ok(self.value(key))
    }
}

#[derive(Default)]
pub struct MemoryBlobFetcher {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobFetcher {
    pub fn insert(&self, uri: &str, bytes: Vec<u8>) {
        self.blobs.lock().unwrap().insert(uri.to_string(), bytes);
    }
}

#[async_trait]
impl BlobFetcher for MemoryBlobFetcher {
    async fn fetch(&self, uri: &str) -> ProviderResult<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap()
            .get(uri)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(uri.to_string()))
    }
}
