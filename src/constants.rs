pub const DEFAULT_QUALITY: u8 = 90;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

/// Largest side, in pixels, of a surface the compressor will allocate.
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;

/// Resolution every tier's scale is measured against.
pub const BASE_PPI: u32 = 330;
pub const DEFAULT_TIER_ID: &str = "web";

pub const DOWNLOAD_PREFIX: &str = "compressed-";
pub const OUTPUT_EXTENSION: &str = "jpg";
pub const OUTPUT_MEDIA_TYPE: &str = "image/jpeg";

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif", "gif",
];

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

// Common output message prefixes
pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original size:";
pub const COMPRESSED_SIZE_PREFIX: &str = "📈 Compressed size:";
pub const COMPRESSION_RATIO_PREFIX: &str = "🎯 Size reduction:";
pub const SUCCESS_PREFIX: &str = "✅";
pub const ERROR_PREFIX: &str = "❌";
