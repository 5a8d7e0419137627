use serde::{Deserialize, Serialize};

/// Filepath given to the optimistic entry shown while a capture is being saved.
pub const PLACEHOLDER_FILEPATH: &str = "soon...";

/// Prefix of the data URIs rebuilt for browser rendering.
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub filepath: String,
    pub webview_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

impl Photo {
    pub fn new(filepath: impl Into<String>, webview_path: impl Into<String>) -> Self {
        Self {
            filepath: filepath.into(),
            webview_path: webview_path.into(),
            base64: None,
        }
    }

    pub fn placeholder(webview_path: impl Into<String>) -> Self {
        Self::new(PLACEHOLDER_FILEPATH, webview_path)
    }

    pub fn is_placeholder(&self) -> bool {
        self.filepath == PLACEHOLDER_FILEPATH
    }

    /// Bare filename: everything after the last `/` of `filepath`.
    pub fn file_name(&self) -> &str {
        match self.filepath.rfind('/') {
            Some(idx) => &self.filepath[idx + 1..],
            None => &self.filepath,
        }
    }

    /// Copy of the record without its transient base64 payload.
    pub fn without_base64(&self) -> Self {
        Self {
            base64: None,
            ..self.clone()
        }
    }
}

/// Reference returned by the camera for a freshly captured image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedPhoto {
    /// Transient URI, valid until the image is persisted.
    pub web_path: String,
    /// Native filesystem path; only present inside a hybrid shell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraResultType {
    Uri,
    Base64,
    DataUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraSource {
    Prompt,
    Camera,
    Photos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraOptions {
    pub result_type: CameraResultType,
    pub source: CameraSource,
    pub quality: u8,
}

impl CameraOptions {
    /// JPEG straight from the camera at full quality, delivered as a URI.
    pub fn gallery_capture() -> Self {
        Self {
            result_type: CameraResultType::Uri,
            source: CameraSource::Camera,
            quality: 100,
        }
    }
}

/// Filesystem areas the gallery writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directory {
    Data,
}

impl Directory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Directory::Data => "data",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    Hybrid,
    Browser,
}

impl std::fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeEnvironment::Hybrid => write!(f, "hybrid"),
            RuntimeEnvironment::Browser => write!(f, "browser"),
        }
    }
}

impl std::str::FromStr for RuntimeEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hybrid" => Ok(RuntimeEnvironment::Hybrid),
            "browser" | "web" => Ok(RuntimeEnvironment::Browser),
            other => Err(format!("unknown runtime environment: {}", other)),
        }
    }
}
