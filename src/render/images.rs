//! Avatar and logo bitmaps for the OpenGraph cards.

use crate::error::ScrapeError;
use crate::logo::{SVG_DATA_URI_PREFIX, is_svg_markup};
use crate::utils::truncate_for_log;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Pixel, Rgba, RgbaImage};
use resvg::{tiny_skia, usvg};
use tracing::{debug, instrument};

const RING_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Download an image and decode it. SVG bodies are rasterized at
/// `svg_size` x `svg_size`.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_image(url: &str, svg_size: u32) -> Result<DynamicImage, ScrapeError> {
    let bytes = reqwest::get(url).await?.error_for_status()?.bytes().await?;
    debug!(bytes = bytes.len(), "Fetched image");
    decode_image(&bytes, svg_size)
}

fn decode_image(bytes: &[u8], svg_size: u32) -> Result<DynamicImage, ScrapeError> {
    if std::str::from_utf8(bytes).is_ok_and(is_svg_markup) {
        return Ok(DynamicImage::ImageRgba8(rasterize_svg(bytes, svg_size, svg_size)?));
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Load the logo from an SVG `data:` URI, any other base64 `data:image/*`
/// URI, or a plain URL, scaled to `size` x `size`.
pub async fn load_logo(source: &str, size: u32) -> Result<RgbaImage, ScrapeError> {
    let source = source.trim();
    if let Some(encoded) = source.strip_prefix(SVG_DATA_URI_PREFIX) {
        let svg = STANDARD.decode(encoded)?;
        return rasterize_svg(&svg, size, size);
    }

    let image = if source.starts_with("data:image/") {
        let (_, encoded) = source
            .split_once(',')
            .ok_or_else(|| ScrapeError::InvalidDataUri(truncate_for_log(source, 64)))?;
        decode_image(&STANDARD.decode(encoded)?, size)?
    } else {
        fetch_image(source, size).await?
    };
    Ok(imageops::resize(&image.to_rgba8(), size, size, FilterType::Lanczos3))
}

/// Render SVG markup into a `width` x `height` bitmap, stretched to fit.
pub fn rasterize_svg(svg: &[u8], width: u32, height: u32) -> Result<RgbaImage, ScrapeError> {
    let tree = usvg::Tree::from_data(svg, &usvg::Options::default())
        .map_err(|e| ScrapeError::Svg(e.to_string()))?;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ScrapeError::Svg(format!("cannot allocate a {width}x{height} canvas")))?;

    let size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    Ok(RgbaImage::from_fn(width, height, |x, y| match pixmap.pixel(x, y) {
        Some(pixel) => {
            let c = pixel.demultiply();
            Rgba([c.red(), c.green(), c.blue(), c.alpha()])
        }
        None => Rgba([0, 0, 0, 0]),
    }))
}

/// Crop a photo into a circle of diameter `size` inside a white ring
/// `ring` pixels wide. The result is `size + 2 * ring` pixels square.
pub fn round_avatar(photo: &DynamicImage, size: u32, ring: u32) -> RgbaImage {
    let face = imageops::resize(&photo.to_rgba8(), size, size, FilterType::Lanczos3);
    let outer = size + 2 * ring;
    let mut avatar = RgbaImage::new(outer, outer);

    let inside = |x: u32, y: u32, diameter: u32, offset: u32| {
        let r = diameter as f32 / 2.0;
        let dx = x as f32 + 0.5 - offset as f32 - r;
        let dy = y as f32 + 0.5 - offset as f32 - r;
        dx * dx + dy * dy <= r * r
    };

    for (x, y, pixel) in avatar.enumerate_pixels_mut() {
        if !inside(x, y, outer, 0) {
            continue;
        }
        *pixel = RING_COLOR;
        if x >= ring && y >= ring && inside(x, y, size, ring) {
            if let Some(src) = face.get_pixel_checked(x - ring, y - ring) {
                pixel.blend(src);
            }
        }
    }
    avatar
}
