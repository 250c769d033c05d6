//! Static-image conformance engine.
//!
//! The static path never touches FFmpeg: the `image` crate decodes,
//! contain-fits onto a transparent square canvas, and encodes PNG. If the
//! artifact exceeds the size ceiling, quality is lowered by palette
//! quantization in two bounded steps, and the last step is accepted
//! unconditionally. Dimensions never change across tiers.

use color_quant::NeuQuant;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{imageops, ColorType, ImageEncoder, Rgba, RgbaImage};
use std::path::Path;
use tracing::{debug, info};

use spress_models::StickerPolicy;

use crate::error::{MediaError, MediaResult};

/// Quantizer sample factor (1 = exhaustive, 30 = fastest). 10 matches the
/// quality/speed balance the NeuQuant paper recommends.
const QUANT_SAMPLE_FACTOR: i32 = 10;

/// Quality tiers for the static path, monotonically decreasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageQuality {
    /// Lossless RGBA at maximum PNG compression
    High,
    /// 256-color palette quantization
    Medium,
    /// 64-color palette quantization; accepted unconditionally
    Low,
}

impl ImageQuality {
    /// Palette size for this tier; `None` keeps full color.
    fn palette_size(self) -> Option<usize> {
        match self {
            ImageQuality::High => None,
            ImageQuality::Medium => Some(256),
            ImageQuality::Low => Some(64),
        }
    }
}

/// Conform a static image to the sticker policy (512x512 transparent PNG
/// under the size ceiling).
pub async fn conform_image(
    input: &Path,
    output: &Path,
    policy: &StickerPolicy,
) -> MediaResult<()> {
    let input_owned = input.to_path_buf();
    let policy = *policy;

    let bytes = tokio::task::spawn_blocking(move || render_conformant(&input_owned, &policy))
        .await
        .map_err(|e| MediaError::internal(format!("image task join failed: {e}")))??;

    tokio::fs::write(output, &bytes).await?;
    info!(
        "Static sticker written: {} ({} bytes)",
        output.display(),
        bytes.len()
    );
    Ok(())
}

/// Decode, fit, and encode with bounded quality escalation.
fn render_conformant(input: &Path, policy: &StickerPolicy) -> MediaResult<Vec<u8>> {
    let canvas = squared_canvas(input, policy.output_side)?;

    for quality in [ImageQuality::High, ImageQuality::Medium] {
        let encoded = encode_png(&canvas, quality)?;
        if encoded.len() as u64 <= policy.max_output_bytes {
            return Ok(encoded);
        }
        debug!(
            "{:?} tier over budget ({} > {} bytes), reducing quality",
            quality,
            encoded.len(),
            policy.max_output_bytes
        );
    }

    // Terminal tier: accepted regardless of measured size.
    encode_png(&canvas, ImageQuality::Low)
}

/// Contain-fit the source onto a fully transparent square canvas.
fn squared_canvas(input: &Path, side: u32) -> MediaResult<RgbaImage> {
    let source = image::open(input)?;
    let fitted = source.resize(side, side, imageops::FilterType::Lanczos3);

    let mut canvas = RgbaImage::from_pixel(side, side, Rgba([0, 0, 0, 0]));
    let x = i64::from((side - fitted.width()) / 2);
    let y = i64::from((side - fitted.height()) / 2);
    imageops::overlay(&mut canvas, &fitted.to_rgba8(), x, y);

    Ok(canvas)
}

/// Encode the canvas as PNG at the given quality tier.
fn encode_png(canvas: &RgbaImage, quality: ImageQuality) -> MediaResult<Vec<u8>> {
    let reduced;
    let pixels = match quality.palette_size() {
        None => canvas,
        Some(colors) => {
            reduced = quantize(canvas, colors);
            &reduced
        }
    };

    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, CompressionType::Best, PngFilter::Adaptive);
    encoder.write_image(pixels.as_raw(), canvas.width(), canvas.height(), ColorType::Rgba8)?;
    Ok(out)
}

/// Map every pixel onto a NeuQuant palette of the given size.
fn quantize(canvas: &RgbaImage, colors: usize) -> RgbaImage {
    let quantizer = NeuQuant::new(QUANT_SAMPLE_FACTOR, colors, canvas.as_raw());
    let palette = quantizer.color_map_rgba();

    let mut mapped = canvas.clone();
    for pixel in mapped.pixels_mut() {
        let idx = quantizer.index_of(&pixel.0) * 4;
        pixel.0 = [palette[idx], palette[idx + 1], palette[idx + 2], palette[idx + 3]];
    }
    mapped
}
