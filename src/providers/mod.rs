pub mod local;
pub mod memory;

use crate::capabilities::Platform;
use crate::types::RuntimeEnvironment;

pub use local::{FileImportCamera, JsonFileStore, LocalBlobFetcher, LocalFilesystem};

/// Platform whose environment is decided by configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedPlatform(pub RuntimeEnvironment);

impl Platform for FixedPlatform {
    fn environment(&self) -> RuntimeEnvironment {
        self.0
    }
}
