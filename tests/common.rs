#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use img_shrink::{BinaryPayload, HandleId, HandleRegistry};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Registry double that records every acquire and release.
#[derive(Default)]
pub struct TrackingRegistry {
    state: Mutex<TrackingState>,
}

#[derive(Default)]
struct TrackingState {
    next_id: HandleId,
    live: HashMap<HandleId, String>,
    released: Vec<HandleId>,
}

impl TrackingRegistry {
    pub fn live_count(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    pub fn live_media_types(&self) -> Vec<String> {
        let mut types: Vec<_> = self.state.lock().unwrap().live.values().cloned().collect();
        types.sort();
        types
    }

    pub fn released_count(&self) -> usize {
        self.state.lock().unwrap().released.len()
    }

    pub fn acquired_count(&self) -> u64 {
        self.state.lock().unwrap().next_id
    }
}

impl HandleRegistry for TrackingRegistry {
    fn acquire(&self, media_type: &str, _bytes: &[u8]) -> HandleId {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.live.insert(id, media_type.to_string());
        id
    }

    fn release(&self, id: HandleId) {
        let mut state = self.state.lock().unwrap();
        assert!(state.live.remove(&id).is_some(), "handle {} released twice", id);
        state.released.push(id);
    }
}

pub fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 255) / width.max(1)) as u8,
            ((y * 255) / height.max(1)) as u8,
            128,
        ])
    }))
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

pub fn png_payload(name: &str, width: u32, height: u32) -> BinaryPayload {
    let bytes = encode(&gradient_rgb(width, height), ImageFormat::Png);
    BinaryPayload::new(name, Some("image/png"), 1_700_000_000_000, bytes)
}

pub fn jpeg_payload(name: &str, width: u32, height: u32) -> BinaryPayload {
    let bytes = encode(&gradient_rgb(width, height), ImageFormat::Jpeg);
    BinaryPayload::new(name, Some("image/jpeg"), 1_700_000_000_000, bytes)
}

pub fn transparent_png_payload(name: &str, width: u32, height: u32) -> BinaryPayload {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([10, 200, 30, 0])));
    BinaryPayload::new(name, Some("image/png"), 0, encode(&img, ImageFormat::Png))
}

pub fn corrupt_payload(name: &str) -> BinaryPayload {
    BinaryPayload::new(name, Some("image/jpeg"), 0, b"\xFF\xD8\xFF garbage".to_vec())
}

pub fn write_test_images(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for (name, format) in [
        ("one.png", ImageFormat::Png),
        ("two.jpg", ImageFormat::Jpeg),
        ("three.png", ImageFormat::Png),
    ] {
        let path = dir.join(name);
        std::fs::write(&path, encode(&gradient_rgb(120, 80), format)).unwrap();
        files.push(path);
    }
    std::fs::write(dir.join("notes.txt"), b"not an image").unwrap();
    files
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}
