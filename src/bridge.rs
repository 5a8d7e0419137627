use crate::capabilities::UriBridge;

pub const ASSET_PREFIX: &str = "asset://localhost/";

/// Serves native files to the web view through the `asset://` protocol.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetProtocolBridge;

impl UriBridge for AssetProtocolBridge {
    fn convert_file_src(&self, uri: &str) -> String {
        convert_path_protocol(uri)
    }
}

pub fn convert_path_protocol(path: &str) -> String {
    log::debug!("Converting path: {}", path);
    let result = if path.starts_with("asset://") {
        path.to_string()
    } else {
        let native = path.strip_prefix("file://").unwrap_or(path);
        format!("{}{}", ASSET_PREFIX, native.replace('\\', "/"))
    };
    log::debug!("Converted to: {}", result);
    result
}

/// Inverse of [`convert_path_protocol`].
pub fn asset_path_to_native(uri: &str) -> String {
    uri.replace(ASSET_PREFIX, "").replace("asset://", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_uri_becomes_asset_uri() {
        let bridge = AssetProtocolBridge;
        assert_eq!(
            bridge.convert_file_src("file:///data/app/files/1700.jpeg"),
            "asset://localhost//data/app/files/1700.jpeg"
        );
    }

    #[test]
    fn windows_separators_are_normalised() {
        assert_eq!(
            convert_path_protocol(r"C:\Users\me\gallery\1700.jpeg"),
            "asset://localhost/C:/Users/me/gallery/1700.jpeg"
        );
    }

    #[test]
    fn asset_uris_pass_through() {
        let uri = "asset://localhost/already.jpeg";
        assert_eq!(convert_path_protocol(uri), uri);
    }

    #[test]
    fn asset_uri_maps_back_to_native_path() {
        let native = "/data/app/files/1700.jpeg";
        assert_eq!(asset_path_to_native(&convert_path_protocol(native)), native);
    }
}
