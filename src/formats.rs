/// Source format detection
///
/// Payloads carry a media type the same way a browser `File` does. When a
/// payload comes from disk the media type is derived from the extension and,
/// failing that, from the file's magic bytes.
use image::ImageFormat;
use std::fmt;
use std::path::Path;

/// Image formats accepted on intake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
    WebP,
    Bmp,
    Tiff,
    Gif,
}

impl SourceFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(SourceFormat::Jpeg),
            "png" => Some(SourceFormat::Png),
            "webp" => Some(SourceFormat::WebP),
            "bmp" => Some(SourceFormat::Bmp),
            "tiff" | "tif" => Some(SourceFormat::Tiff),
            "gif" => Some(SourceFormat::Gif),
            _ => None,
        }
    }

    /// Detect the format from the leading bytes of a payload
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            ImageFormat::Jpeg => Some(SourceFormat::Jpeg),
            ImageFormat::Png => Some(SourceFormat::Png),
            ImageFormat::WebP => Some(SourceFormat::WebP),
            ImageFormat::Bmp => Some(SourceFormat::Bmp),
            ImageFormat::Tiff => Some(SourceFormat::Tiff),
            ImageFormat::Gif => Some(SourceFormat::Gif),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "image/jpeg",
            SourceFormat::Png => "image/png",
            SourceFormat::WebP => "image/webp",
            SourceFormat::Bmp => "image/bmp",
            SourceFormat::Tiff => "image/tiff",
            SourceFormat::Gif => "image/gif",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceFormat::Jpeg => "JPEG",
            SourceFormat::Png => "PNG",
            SourceFormat::WebP => "WebP",
            SourceFormat::Bmp => "BMP",
            SourceFormat::Tiff => "TIFF",
            SourceFormat::Gif => "GIF",
        };
        write!(f, "{}", name)
    }
}

/// Media type for a payload read from `path`, extension first
pub fn detect_media_type(path: &Path, bytes: &[u8]) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(SourceFormat::from_extension)
        .or_else(|| SourceFormat::sniff(bytes))
        .map(|format| format.mime_type())
}
