pub mod table_read;
pub mod table_write;

use std::path::Path;

/// Lower-cased extension of `path`, or an empty string when it has none.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}
