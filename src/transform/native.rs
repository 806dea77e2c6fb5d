//! In-process backend built on the `image` crate.
//!
//! Mirrors the ImageMagick invocation step by step: trim against the
//! top-left pixel, shrink-only fit, centered extent on a transparent canvas.
//! The encoder is picked from the destination extension; JPEG output drops
//! the alpha channel.

use super::{ImageTransformer, TransformOptions};
use crate::error::ProcessError;
use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Trim / resize / extent without external tools
#[derive(Debug, Default, Clone)]
pub struct NativeTransformer;

impl NativeTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Run every step on a decoded image
    pub fn compose(image: RgbaImage, options: &TransformOptions) -> RgbaImage {
        let image = if options.trim { trim(&image) } else { image };
        let image = fit_within(image, options.canvas_size);
        extent_centered(&image, options.canvas_size)
    }

    fn transform_file(input: &Path, output: &Path, options: &TransformOptions) -> Result<()> {
        let source = image::open(input).map_err(ProcessError::from)?.into_rgba8();
        debug!(
            "Native transform {}x{} -> {}x{}: {}",
            source.width(),
            source.height(),
            options.canvas_size,
            options.canvas_size,
            output.display()
        );

        let canvas = Self::compose(source, options);
        write_image(canvas, output)
    }
}

impl ImageTransformer for NativeTransformer {
    fn name(&self) -> &str {
        "native"
    }

    fn transform<'a>(
        &'a self,
        input: &'a Path,
        output: &'a Path,
        options: &'a TransformOptions,
    ) -> BoxFuture<'a, Result<()>> {
        let input = input.to_path_buf();
        let output = output.to_path_buf();
        let options = *options;

        async move {
            tokio::task::spawn_blocking(move || Self::transform_file(&input, &output, &options)).await??;
            Ok::<(), anyhow::Error>(())
        }
        .boxed()
    }
}

/// Crop to the bounding box of pixels that differ from the top-left pixel.
/// A fully uniform image is returned unchanged.
pub fn trim(image: &RgbaImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let background = *image.get_pixel(0, 0);
    let mut bounds: Option<[u32; 4]> = None; // [x1, y1, x2, y2]

    for (x, y, pixel) in image.enumerate_pixels() {
        if is_background(pixel, &background) {
            continue;
        }
        bounds = Some(match bounds {
            None => [x, y, x, y],
            Some([x1, y1, x2, y2]) => [x1.min(x), y1.min(y), x2.max(x), y2.max(y)],
        });
    }

    match bounds {
        Some([x1, y1, x2, y2]) => imageops::crop_imm(image, x1, y1, x2 - x1 + 1, y2 - y1 + 1).to_image(),
        None => image.clone(),
    }
}

fn is_background(pixel: &Rgba<u8>, background: &Rgba<u8>) -> bool {
    pixel == background || (pixel[3] == 0 && background[3] == 0)
}

/// Scale down to fit inside `size x size`, preserving aspect ratio. Never enlarges.
pub fn fit_within(image: RgbaImage, size: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width <= size && height <= size {
        return image;
    }

    let scale = f64::min(size as f64 / width as f64, size as f64 / height as f64);
    let new_width = ((width as f64 * scale).round() as u32).clamp(1, size);
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, size);

    imageops::resize(&image, new_width, new_height, FilterType::Lanczos3)
}

/// Place `image` at the center of a transparent `size x size` canvas
pub fn extent_centered(image: &RgbaImage, size: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(size, size, TRANSPARENT);
    let x = (size.saturating_sub(image.width()) / 2) as i64;
    let y = (size.saturating_sub(image.height()) / 2) as i64;
    imageops::replace(&mut canvas, image, x, y);
    canvas
}

/// Encode by destination extension and atomically replace the destination
fn write_image(canvas: RgbaImage, output: &Path) -> Result<()> {
    let format = ImageFormat::from_path(output)
        .map_err(|_| ProcessError::UnsupportedFormat(output.display().to_string()))?;

    let encoded = match format {
        ImageFormat::Png | ImageFormat::WebP => DynamicImage::ImageRgba8(canvas),
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8()),
        other => {
            return Err(ProcessError::UnsupportedFormat(format!("{:?} ({})", other, output.display())).into());
        }
    };

    let parent = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut temp = NamedTempFile::new_in(parent).map_err(ProcessError::from)?;
    encoded.write_to(&mut temp, format).map_err(ProcessError::from)?;
    temp.persist(output).map_err(|e| ProcessError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use tempfile::TempDir;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    /// Opaque `w x h` block at (`x`, `y`) on a transparent `cw x ch` image
    fn subject_on_transparent(cw: u32, ch: u32, x: u32, y: u32, w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(cw, ch, |px, py| {
            if px >= x && px < x + w && py >= y && py < y + h {
                RED
            } else {
                TRANSPARENT
            }
        })
    }

    #[test]
    fn test_trim_crops_to_subject() {
        let image = subject_on_transparent(100, 80, 30, 10, 20, 40);
        let trimmed = trim(&image);
        assert_eq!(trimmed.dimensions(), (20, 40));
        assert_eq!(*trimmed.get_pixel(0, 0), RED);
    }

    #[test]
    fn test_trim_uniform_image_is_untouched() {
        let image = RgbaImage::from_pixel(40, 30, TRANSPARENT);
        assert_eq!(trim(&image).dimensions(), (40, 30));
    }

    #[test]
    fn test_fit_never_enlarges() {
        let small = RgbaImage::from_pixel(20, 10, RED);
        assert_eq!(fit_within(small, 512).dimensions(), (20, 10));
    }

    #[test]
    fn test_fit_preserves_aspect_ratio() {
        let wide = RgbaImage::from_pixel(1024, 512, RED);
        assert_eq!(fit_within(wide, 512).dimensions(), (512, 256));

        let tall = RgbaImage::from_pixel(300, 900, RED);
        assert_eq!(fit_within(tall, 512).dimensions(), (171, 512));
    }

    #[test]
    fn test_compose_centers_on_transparent_canvas() {
        let image = subject_on_transparent(100, 100, 40, 45, 20, 10);
        let canvas = NativeTransformer::compose(image, &TransformOptions::default());

        assert_eq!(canvas.dimensions(), (512, 512));
        // trimmed to 20x10, placed at (246, 251)
        assert_eq!(*canvas.get_pixel(246, 251), RED);
        assert_eq!(*canvas.get_pixel(265, 260), RED);
        assert_eq!(canvas.get_pixel(245, 251)[3], 0);
        assert_eq!(canvas.get_pixel(266, 260)[3], 0);
        for (x, y) in [(0, 0), (511, 0), (0, 511), (511, 511)] {
            assert_eq!(canvas.get_pixel(x, y)[3], 0);
        }
    }

    #[test]
    fn test_compose_without_trim_keeps_margins() {
        let image = subject_on_transparent(100, 100, 0, 0, 10, 10);
        let options = TransformOptions {
            canvas_size: 512,
            trim: false,
        };
        let canvas = NativeTransformer::compose(image, &options);
        // untrimmed 100x100 placed at (206, 206); subject in its top-left corner
        assert_eq!(*canvas.get_pixel(206, 206), RED);
        assert_eq!(canvas.get_pixel(256, 256)[3], 0);
    }

    #[test]
    fn test_compose_shrinks_large_subject() {
        let image = RgbaImage::from_pixel(1024, 512, RED);
        let canvas = NativeTransformer::compose(image, &TransformOptions::default());
        assert_eq!(canvas.dimensions(), (512, 512));
        assert_eq!(canvas.get_pixel(256, 256)[3], 255);
        assert_eq!(canvas.get_pixel(256, 100)[3], 0);
        assert_eq!(canvas.get_pixel(256, 420)[3], 0);
    }

    #[tokio::test]
    async fn test_transform_writes_png_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("a_nobg.png");
        let output = temp_dir.path().join("a.png");
        subject_on_transparent(64, 64, 8, 8, 16, 16).save(&input).unwrap();
        std::fs::write(&output, b"stale").unwrap();

        NativeTransformer::new()
            .transform(&input, &output, &TransformOptions::default())
            .await
            .unwrap();

        let result = image::open(&output).unwrap();
        assert_eq!(result.dimensions(), (512, 512));
        assert_eq!(result.get_pixel(0, 0)[3], 0);
        assert_eq!(result.get_pixel(256, 256)[3], 255);
    }

    #[tokio::test]
    async fn test_transform_writes_jpeg_without_alpha() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("b_nobg.png");
        let output = temp_dir.path().join("cats_b.jpg");
        subject_on_transparent(32, 32, 0, 0, 32, 32).save(&input).unwrap();

        NativeTransformer::new()
            .transform(&input, &output, &TransformOptions::default())
            .await
            .unwrap();

        let result = image::open(&output).unwrap();
        assert_eq!(result.dimensions(), (512, 512));
        assert!(!result.color().has_alpha());
    }

    #[tokio::test]
    async fn test_transform_rejects_unknown_extension() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("c_nobg.png");
        subject_on_transparent(8, 8, 0, 0, 4, 4).save(&input).unwrap();

        let err = NativeTransformer::new()
            .transform(&input, &temp_dir.path().join("c.xyz"), &TransformOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProcessError>(),
            Some(ProcessError::UnsupportedFormat(_))
        ));
    }
}
