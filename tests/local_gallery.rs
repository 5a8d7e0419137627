//! End-to-end runs of the gallery over the local-disk providers.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use photo_gallery::{open_local_gallery, GalleryConfig, RuntimeEnvironment, JPEG_DATA_URI_PREFIX};

const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01];

fn config(root: &std::path::Path, environment: RuntimeEnvironment) -> GalleryConfig {
    GalleryConfig {
        data_dir: root.join("app"),
        store_file: None,
        storage_key: "photos".to_string(),
        environment,
    }
}

fn write_capture(root: &std::path::Path) -> std::path::PathBuf {
    let path = root.join("camera-roll.jpg");
    std::fs::write(&path, JPEG_BYTES).unwrap();
    path
}

#[tokio::test]
async fn hybrid_capture_survives_restart_and_delete_removes_file() {
    let root = tempfile::tempdir().unwrap();
    let config = config(root.path(), RuntimeEnvironment::Hybrid);
    let capture = write_capture(root.path());

    let mut gallery = open_local_gallery(&config, Some(capture));
    let saved = gallery.add_new_to_gallery().await.unwrap();

    assert!(saved.filepath.starts_with("file://"));
    assert!(saved.webview_path.starts_with("asset://localhost/"));
    let file_on_disk = config.data_dir.join("data").join(saved.filepath.rsplit('/').next().unwrap());
    assert_eq!(std::fs::read(&file_on_disk).unwrap(), JPEG_BYTES);

    let mut reopened = open_local_gallery(&config, None);
    let loaded = reopened.load_saved().await.unwrap().to_vec();
    assert_eq!(loaded, vec![saved.clone()]);

    reopened.delete_picture(&saved, 0).await.unwrap();
    assert!(reopened.photos().is_empty());
    assert!(!file_on_disk.exists());

    let mut again = open_local_gallery(&config, None);
    assert!(again.load_saved().await.unwrap().is_empty());
}

#[tokio::test]
async fn browser_reload_rebuilds_data_uri_from_stored_file() {
    let root = tempfile::tempdir().unwrap();
    let config = config(root.path(), RuntimeEnvironment::Browser);
    let capture = write_capture(root.path());

    let mut gallery = open_local_gallery(&config, Some(capture));
    let saved = gallery.add_new_to_gallery().await.unwrap();
    assert!(saved.filepath.ends_with(".jpeg"));
    assert!(!saved.filepath.contains('/'));

    let stored = std::fs::read_to_string(config.store_path()).unwrap();
    assert!(!stored.contains(JPEG_DATA_URI_PREFIX));

    let mut reopened = open_local_gallery(&config, None);
    let loaded = reopened.load_saved().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(
        loaded[0].base64.as_deref(),
        Some(format!("{}{}", JPEG_DATA_URI_PREFIX, BASE64.encode(JPEG_BYTES)).as_str())
    );
}

#[tokio::test]
async fn capture_without_camera_input_is_cancelled() {
    let root = tempfile::tempdir().unwrap();
    let config = config(root.path(), RuntimeEnvironment::Hybrid);

    let mut gallery = open_local_gallery(&config, None);
    let err = gallery.add_new_to_gallery().await.unwrap_err();

    assert!(matches!(err, photo_gallery::GalleryError::CaptureFailed(_)));
    assert!(!config.store_path().exists());
}
