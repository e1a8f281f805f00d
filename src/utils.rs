//! Utility functions and constants
//!
//! **Used by**: builder (directory scan), memory graph (EXR layers), CLI

pub mod exr_header;
pub mod files;

/// Image file type detection
pub mod media {
    use std::path::Path;

    /// Image file extensions a render may be written as
    pub const IMAGE_EXTS: &[&str] = &["exr", "dpx", "tif", "tiff", "png", "jpg", "jpeg", "hdr"];

    /// Check if the extension of `path` is one of `exts` (case-insensitive)
    pub fn has_extension(path: &Path, exts: &[String]) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|s| exts.iter().any(|e| e.eq_ignore_ascii_case(s)))
            .unwrap_or(false)
    }

    /// Check if file is an image format
    pub fn is_image(path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|s| IMAGE_EXTS.contains(&s.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_has_extension_ignores_case() {
            let exts = vec!["exr".to_string()];
            assert!(has_extension(Path::new("shot.diffuse.EXR"), &exts));
            assert!(!has_extension(Path::new("shot.diffuse.tif"), &exts));
            assert!(!has_extension(Path::new("shot"), &exts));
        }

        #[test]
        fn test_is_image() {
            assert!(is_image(Path::new("a.b.Exr")));
            assert!(!is_image(Path::new("notes.txt")));
        }
    }
}
