use crate::constants::{DEFAULT_QUALITY, MAX_QUALITY, MAX_SURFACE_DIMENSION, MIN_QUALITY};
use crate::error::{CompressionError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder, RgbImage};
use std::fmt;
use std::str::FromStr;

/// Resampling kernel used for the single resize pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleFilter {
    #[default]
    Bilinear,
    CatmullRom,
    Lanczos3,
    /// Only used when asked for explicitly.
    Nearest,
}

impl ResampleFilter {
    pub fn to_image_filter(self) -> FilterType {
        match self {
            ResampleFilter::Bilinear => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
            ResampleFilter::Nearest => FilterType::Nearest,
        }
    }

    pub fn names() -> Vec<&'static str> {
        vec!["bilinear", "catmull-rom", "lanczos3", "nearest"]
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResampleFilter::Bilinear => "bilinear",
            ResampleFilter::CatmullRom => "catmull-rom",
            ResampleFilter::Lanczos3 => "lanczos3",
            ResampleFilter::Nearest => "nearest",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ResampleFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bilinear" | "triangle" => Ok(ResampleFilter::Bilinear),
            "catmull-rom" | "catmullrom" | "bicubic" => Ok(ResampleFilter::CatmullRom),
            "lanczos3" | "lanczos" => Ok(ResampleFilter::Lanczos3),
            "nearest" => Ok(ResampleFilter::Nearest),
            _ => Err(format!(
                "unknown filter '{}', expected one of: {}",
                s,
                ResampleFilter::names().join(", ")
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressorConfig {
    pub quality: u8,
    pub filter: ResampleFilter,
    pub max_dimension: u32,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            filter: ResampleFilter::default(),
            max_dimension: MAX_SURFACE_DIMENSION,
        }
    }
}

impl CompressorConfig {
    pub fn new(quality: Option<u8>, filter: Option<ResampleFilter>) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(CompressionError::InvalidQuality(quality));
        }

        Ok(Self {
            quality,
            filter: filter.unwrap_or_default(),
            ..Self::default()
        })
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }
}

/// Encoded output of one compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl CompressedImage {
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Target dimensions for a `width`×`height` source at `scale`.
///
/// Each side is rounded half away from zero and never drops below one pixel,
/// so a 330×220 source at 0.5 becomes exactly 165×110.
pub fn target_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Resizes a payload by a linear scale factor and re-encodes it as JPEG.
#[derive(Debug, Clone, Default)]
pub struct ImageCompressor {
    config: CompressorConfig,
}

impl ImageCompressor {
    pub fn new(config: CompressorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    /// Decode, resample once, and encode at the configured quality.
    ///
    /// The output is always JPEG whatever the source format; transparency is
    /// dropped.
    pub fn compress(&self, source: &[u8], scale: f64) -> Result<CompressedImage> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CompressionError::ContextUnavailable(format!(
                "invalid scale factor {}",
                scale
            )));
        }

        let img = decode(source)?;
        let (src_width, src_height) = img.dimensions();
        let (width, height) = target_dimensions(src_width, src_height, scale);

        crate::verbose!(
            "Resampling {}x{} -> {}x{} ({})",
            src_width,
            src_height,
            width,
            height,
            self.config.filter
        );

        let surface = rasterize(
            &img,
            width,
            height,
            self.config.filter,
            self.config.max_dimension,
        )?;
        drop(img);

        let bytes = encode_jpeg(&surface, self.config.quality)?;

        Ok(CompressedImage {
            bytes,
            width,
            height,
        })
    }
}

pub fn decode(source: &[u8]) -> Result<DynamicImage> {
    if source.is_empty() {
        return Err(CompressionError::Decode("empty payload".to_string()));
    }
    image::load_from_memory(source).map_err(|e| CompressionError::Decode(e.to_string()))
}

/// Draw `img` onto an RGB surface of the target size.
pub fn rasterize(
    img: &DynamicImage,
    width: u32,
    height: u32,
    filter: ResampleFilter,
    max_dimension: u32,
) -> Result<RgbImage> {
    if width > max_dimension || height > max_dimension {
        return Err(CompressionError::ContextUnavailable(format!(
            "{}x{} surface exceeds the {}px limit",
            width, height, max_dimension
        )));
    }

    let rgb = img.to_rgb8();
    if rgb.dimensions() == (width, height) {
        return Ok(rgb);
    }

    Ok(image::imageops::resize(
        &rgb,
        width,
        height,
        filter.to_image_filter(),
    ))
}

pub fn encode_jpeg(surface: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let (width, height) = surface.dimensions();
    if width == 0 || height == 0 {
        return Err(CompressionError::Encode(format!(
            "cannot encode a {}x{} surface",
            width, height
        )));
    }

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(MIN_QUALITY, MAX_QUALITY))
        .write_image(surface.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| CompressionError::Encode(e.to_string()))?;

    if buffer.is_empty() {
        return Err(CompressionError::Encode(
            "encoder produced no output".to_string(),
        ));
    }

    Ok(buffer)
}
