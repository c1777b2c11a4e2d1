//! Stored filename generation and validation.

use uuid::Uuid;

/// Pick the filename an asset is stored under.
///
/// Without an explicit name this is a random hex UUID plus `.{extension}`.
/// An explicit name keeps its base and gets `.{extension}` appended unless it
/// already ends with it (compared case-insensitively).
pub fn storage_filename(extension: &str, filename: Option<&str>) -> String {
    match filename {
        Some(name) => {
            let suffix = format!(".{}", extension.to_lowercase());
            if name.to_lowercase().ends_with(&suffix) {
                name.to_string()
            } else {
                format!("{}{}", name, suffix)
            }
        }
        None => format!("{}.{}", Uuid::new_v4().simple(), extension.to_lowercase()),
    }
}

/// True if `filename` names a file directly inside the storage directory.
pub fn is_valid_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
        && filename != "."
}
