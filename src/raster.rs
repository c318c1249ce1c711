//! PNG output: rasterise serialised surfaces with resvg and lay characters out left to right.

use crate::config::color::Color;
use crate::foundation::core::SurfaceId;
use crate::foundation::error::{DmakError, DmakResult};
use crate::surface::svg::SvgBackend;
use anyhow::Context as _;
use image::RgbaImage;
use std::path::Path;
use std::sync::Arc;

/// Largest raster edge accepted, in pixels.
pub const MAX_DIM: u32 = 16_384;

/// SVG rasteriser with a shared font database (used by stroke-order labels).
#[derive(Clone)]
pub struct Rasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
    scale: f32,
    background: Option<Color>,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    /// Rasteriser with system fonts loaded.
    pub fn new() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "font database ready");
        Self::with_fontdb(Arc::new(db))
    }

    /// Rasteriser over a caller-built font database.
    pub fn with_fontdb(fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self {
            fontdb,
            scale: 1.0,
            background: None,
        }
    }

    /// Output pixels per surface pixel.
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Opaque background; transparent when unset.
    pub fn background(mut self, color: Option<Color>) -> Self {
        self.background = color;
        self
    }

    /// Rasterise one SVG document to straight-alpha RGBA.
    pub fn rasterize(&self, svg: &str) -> DmakResult<RgbaImage> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(DmakError::render("raster scale must be finite and > 0"));
        }
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(svg, &opts)
            .map_err(|e| DmakError::render(format!("parse surface svg: {e}")))?;

        let size = tree.size();
        let w = (size.width() * self.scale).ceil().max(1.0) as u32;
        let h = (size.height() * self.scale).ceil().max(1.0) as u32;
        if w > MAX_DIM || h > MAX_DIM {
            return Err(DmakError::render(format!(
                "raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
            )));
        }

        let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
            .ok_or_else(|| DmakError::render("failed to allocate pixmap"))?;
        if let Some(bg) = self.background {
            pixmap.fill(resvg::tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, 255));
        }
        let xform = resvg::tiny_skia::Transform::from_scale(self.scale, self.scale);
        resvg::render(&tree, xform, &mut pixmap.as_mut());

        let mut data = pixmap.take();
        demultiply_rgba8_in_place(&mut data);
        RgbaImage::from_raw(w, h, data).ok_or_else(|| DmakError::render("pixmap size mismatch"))
    }

    /// Rasterise `surfaces` as they appear at the backend's clock and lay them out left to right.
    pub fn render_strip(
        &self,
        backend: &mut SvgBackend,
        surfaces: &[SurfaceId],
    ) -> DmakResult<RgbaImage> {
        let mut cells = Vec::with_capacity(surfaces.len());
        for &s in surfaces {
            let svg = backend
                .surface_svg(s)
                .ok_or_else(|| DmakError::render(format!("unknown surface {}", s.0)))?;
            cells.push(self.rasterize(&svg)?);
        }
        Ok(hstack(&cells))
    }
}

/// Place images side by side, top aligned.
pub fn hstack(images: &[RgbaImage]) -> RgbaImage {
    let w = images.iter().map(RgbaImage::width).sum::<u32>().max(1);
    let h = images.iter().map(RgbaImage::height).max().unwrap_or(1).max(1);
    let mut out = RgbaImage::new(w, h);
    let mut x = 0i64;
    for img in images {
        image::imageops::replace(&mut out, img, x, 0);
        x += i64::from(img.width());
    }
    out
}

/// Write `img` as PNG, creating parent directories.
pub fn save_png(path: &Path, img: &RgbaImage) -> DmakResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        img.as_raw(),
        img.width(),
        img.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

fn demultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/raster.rs"]
mod tests;
