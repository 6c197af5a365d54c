//! Thumbnails for images the user picked for diagnosis.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use eframe::egui;
use image::GenericImageView;
use tracing::warn;

pub const MAX_THUMBNAIL_DIMENSION: f32 = 240.0;

/// Scales `(width, height)` down so the longer side fits `max`. Never upscales.
pub fn thumbnail_size(width: u32, height: u32, max: f32) -> (u32, u32) {
    let longest = width.max(height).max(1) as f32;
    let scale = (max / longest).min(1.0);
    (
        (width as f32 * scale).max(1.0) as u32,
        (height as f32 * scale).max(1.0) as u32,
    )
}

#[derive(Default)]
pub struct PreviewCache {
    textures: HashMap<PathBuf, Option<egui::TextureHandle>>,
}

impl PreviewCache {
    /// Decodes `path` once; later calls reuse the texture, or `None` if decoding failed.
    pub fn thumbnail(&mut self, ctx: &egui::Context, path: &Path) -> Option<egui::TextureHandle> {
        if let Some(cached) = self.textures.get(path) {
            return cached.clone();
        }
        let texture = load_thumbnail(ctx, path);
        self.textures.insert(path.to_path_buf(), texture.clone());
        texture
    }
}

fn load_thumbnail(ctx: &egui::Context, path: &Path) -> Option<egui::TextureHandle> {
    let decoded = match image::open(path) {
        Ok(image) => image,
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to decode image preview");
            return None;
        }
    };

    let (orig_w, orig_h) = decoded.dimensions();
    let (w, h) = thumbnail_size(orig_w, orig_h, MAX_THUMBNAIL_DIMENSION);
    let resized = if (w, h) != (orig_w, orig_h) {
        decoded.resize(w, h, image::imageops::FilterType::Triangle)
    } else {
        decoded
    };
    let rgba = resized.to_rgba8();
    let color_image = egui::ColorImage::from_rgba_unmultiplied(
        [rgba.width() as usize, rgba.height() as usize],
        rgba.as_raw(),
    );
    Some(ctx.load_texture(
        format!("leaf-preview:{}", path.display()),
        color_image,
        egui::TextureOptions::LINEAR,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_images_fit_the_longest_side() {
        assert_eq!(thumbnail_size(4000, 3000, 240.0), (240, 180));
        assert_eq!(thumbnail_size(600, 1200, 240.0), (120, 240));
    }

    #[test]
    fn small_images_keep_their_size() {
        assert_eq!(thumbnail_size(100, 80, 240.0), (100, 80));
    }

    #[test]
    fn degenerate_sizes_stay_visible() {
        assert_eq!(thumbnail_size(10000, 1, 240.0), (240, 1));
        assert_eq!(thumbnail_size(0, 0, 240.0), (1, 1));
    }

    #[test]
    fn undecodable_file_is_cached_as_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("leaf.jpg");
        std::fs::write(&path, b"not an image").expect("write");

        let ctx = egui::Context::default();
        let mut cache = PreviewCache::default();
        assert!(cache.thumbnail(&ctx, &path).is_none());
        assert!(cache.textures.contains_key(&path));
    }

    #[test]
    fn decoded_png_is_downscaled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("leaf.png");
        image::RgbaImage::from_pixel(480, 240, image::Rgba([30, 140, 60, 255]))
            .save(&path)
            .expect("save png");

        let ctx = egui::Context::default();
        let mut cache = PreviewCache::default();
        let texture = cache.thumbnail(&ctx, &path).expect("texture");
        assert_eq!(texture.size(), [240, 120]);
    }
}
