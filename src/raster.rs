//! PNG output for diagrams.

use std::sync::Arc;

use anyhow::Result;
use image::DynamicImage;

use crate::options::ResolvedOptions;
use crate::render::render_svg;

/// Render a git-graph block straight to an image `target_width_px` wide.
///
/// # Errors
///
/// Returns an error if the generated SVG cannot be rasterized.
pub fn render_to_image(
    text: &str,
    options: &ResolvedOptions,
    target_width_px: u32,
) -> Result<DynamicImage> {
    let svg = render_svg(0, text, options);
    rasterize_svg(&svg, target_width_px)
}

/// Rasterize an SVG string to a `DynamicImage`, scaled so its width matches
/// `target_width_px`.
///
/// # Errors
///
/// Returns an error for malformed SVG or a zero-sized target.
pub fn rasterize_svg(svg: &str, target_width_px: u32) -> Result<DynamicImage> {
    let mut db = resvg::usvg::fontdb::Database::new();
    db.load_system_fonts();

    let opts = resvg::usvg::Options {
        fontdb: Arc::new(db),
        ..Default::default()
    };

    let tree = resvg::usvg::Tree::from_str(svg, &opts)?;
    let size = tree.size();

    let scale = target_width_px as f32 / size.width();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let width = (size.width() * scale).ceil() as u32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let height = (size.height() * scale).ceil() as u32;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow::anyhow!("failed to create pixmap {width}x{height}"))?;

    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let rgba = pixmap.data().to_vec();
    let img_buf = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| anyhow::anyhow!("failed to create image from pixmap data"))?;

    Ok(DynamicImage::ImageRgba8(img_buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rasterize_svg_scales_to_target_width() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50" viewBox="0 0 100 50"><circle cx="10" cy="10" r="5" fill="red" /></svg>"#;
        let img = rasterize_svg(svg, 200).unwrap();
        assert_eq!(img.width(), 200);
        assert_eq!(img.height(), 100);
    }

    #[test]
    fn test_rasterize_svg_rejects_garbage() {
        assert!(rasterize_svg("not svg", 100).is_err());
    }

    #[test]
    fn test_render_to_image_paints_commit_points() {
        let options = ResolvedOptions::default();
        let img = render_to_image("[main]\n1 a\n2 b", &options, 80).unwrap();
        assert_eq!(img.width(), 80);
        let rgba = img.to_rgba8();
        assert!(rgba.pixels().any(|p| p.0[3] > 0), "expected painted pixels");
    }
}
