//! PDF assembly: decode page images and write a single multi-page PDF.
//!
//! Each image is decoded, forced to a plain three-channel RGB model (PDF
//! page content cannot carry alpha or palette indices), re-encoded as JPEG,
//! and embedded as a DCT-filtered image object on its own page. Page size
//! is derived from the pixel dimensions at a fixed 100 DPI — a normalisation
//! policy, not a true-DPI computation, so every archive renders at a
//! predictable physical size regardless of how pages were scanned.
//!
//! A decode failure skips that image with a warning; only when *zero*
//! images decode does the archive fail. The document is written to
//! `<output>.pdf.tmp` and renamed on success so a crash or full disk never
//! leaves a truncated PDF at the final path.

use crate::error::ConversionError;
use image::RgbImage;
use printpdf::{
    ColorBits, ColorSpace, Image, ImageFilter, ImageTransform, ImageXObject, Mm, PdfDocument,
    PdfDocumentReference, Px,
};
use std::io::{BufWriter, Cursor};
use std::path::Path;
use tracing::{debug, warn};

/// Resolution metadata embedded in the PDF, fixed regardless of source.
const TARGET_DPI: f32 = 100.0;

const MM_PER_INCH: f32 = 25.4;

/// Counts from one assembly run.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyStats {
    /// Pages written to the PDF.
    pub pages: usize,
    /// Images that failed to decode and were skipped.
    pub skipped: usize,
}

/// Assemble `images` (already in page order) into a single PDF at `output`.
pub fn assemble(
    images: &[std::path::PathBuf],
    output: &Path,
    title: &str,
    jpeg_quality: u8,
) -> Result<AssemblyStats, ConversionError> {
    let mut doc: Option<PdfDocumentReference> = None;
    let mut pages = 0usize;
    let mut skipped = 0usize;

    for path in images {
        let rgb = match decode_rgb(path) {
            Ok(img) => img,
            Err(e) => {
                warn!(image = ?path, error = %e, "skipping undecodable image");
                skipped += 1;
                continue;
            }
        };

        let (width, height) = rgb.dimensions();
        let jpeg = match encode_jpeg(&rgb, jpeg_quality) {
            Ok(data) => data,
            Err(e) => {
                warn!(image = ?path, error = %e, "skipping unencodable image");
                skipped += 1;
                continue;
            }
        };

        let page_width = Mm(width as f32 / TARGET_DPI * MM_PER_INCH);
        let page_height = Mm(height as f32 / TARGET_DPI * MM_PER_INCH);

        let layer = match &doc {
            None => {
                let (d, page, layer) = PdfDocument::new(title, page_width, page_height, "Page 1");
                let layer_ref = d.get_page(page).get_layer(layer);
                doc = Some(d);
                layer_ref
            }
            Some(d) => {
                let (page, layer) =
                    d.add_page(page_width, page_height, format!("Page {}", pages + 1));
                d.get_page(page).get_layer(layer)
            }
        };

        let page_image = Image::from(ImageXObject {
            width: Px(width as usize),
            height: Px(height as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: false,
            image_data: jpeg,
            image_filter: Some(ImageFilter::DCT),
            clipping_bbox: None,
            smask: None,
        });

        page_image.add_to_layer(
            layer,
            ImageTransform {
                dpi: Some(TARGET_DPI),
                ..Default::default()
            },
        );

        debug!(image = ?path, width, height, "added page {}", pages + 1);
        pages += 1;
    }

    let doc = doc.ok_or_else(|| ConversionError::NoDecodableImages {
        path: output.to_path_buf(),
        attempted: images.len(),
    })?;

    write_atomic(doc, output)?;

    Ok(AssemblyStats { pages, skipped })
}

/// Decode an image and normalise it to three-channel RGB.
///
/// `to_rgb8` flattens alpha (RGBA, LA), expands palette-indexed pixels,
/// and widens grayscale, which is everything PDF page content requires.
fn decode_rgb(path: &Path) -> Result<RgbImage, image::ImageError> {
    Ok(image::open(path)?.to_rgb8())
}

/// JPEG-encode an RGB image for DCT-filtered embedding.
fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality);
    encoder.encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(buf)
}

/// Write to a temporary sibling path, then rename over the final output.
fn write_atomic(doc: PdfDocumentReference, output: &Path) -> Result<(), ConversionError> {
    let write_failed = |source: std::io::Error| ConversionError::WriteFailed {
        path: output.to_path_buf(),
        source,
    };

    let tmp_path = output.with_extension("pdf.tmp");
    let file = std::fs::File::create(&tmp_path).map_err(write_failed)?;

    doc.save(&mut BufWriter::new(file))
        .map_err(|e| write_failed(std::io::Error::other(e.to_string())))?;

    std::fs::rename(&tmp_path, output).map_err(|e| {
        // Best effort: don't leave the temp file behind on a failed rename.
        let _ = std::fs::remove_file(&tmp_path);
        write_failed(e)
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::path::PathBuf;

    fn write_png_rgba(path: &Path, w: u32, h: u32) {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([200, 30, 30, 128])));
        img.save_with_format(path, image::ImageFormat::Png).unwrap();
    }

    fn write_gif(path: &Path, w: u32, h: u32) {
        // GIF pages are palette-indexed on disk; decoding must normalise.
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([10, 120, 10, 255])));
        img.save_with_format(path, image::ImageFormat::Gif).unwrap();
    }

    #[test]
    fn encode_jpeg_emits_jpeg_magic() {
        let rgb = RgbImage::from_pixel(8, 8, image::Rgb([120, 10, 200]));
        let bytes = encode_jpeg(&rgb, 90).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8]), "missing JPEG SOI marker");
    }

    #[test]
    fn assembles_rgba_and_palette_sources() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("p01.png");
        let b = tmp.path().join("p02.gif");
        write_png_rgba(&a, 24, 32);
        write_gif(&b, 24, 32);

        let output = tmp.path().join("out.pdf");
        let stats = assemble(&[a, b], &output, "test", 90).unwrap();

        assert_eq!(stats.pages, 2);
        assert_eq!(stats.skipped, 0);
        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(!output.with_extension("pdf.tmp").exists());
    }

    #[test]
    fn skips_undecodable_images() {
        let tmp = tempfile::tempdir().unwrap();
        let good = tmp.path().join("p01.png");
        let bad = tmp.path().join("p02.jpg");
        write_png_rgba(&good, 16, 16);
        std::fs::write(&bad, b"not an image").unwrap();

        let output = tmp.path().join("out.pdf");
        let stats = assemble(&[good, bad], &output, "test", 90).unwrap();

        assert_eq!(stats.pages, 1);
        assert_eq!(stats.skipped, 1);
        assert!(output.is_file());
    }

    #[test]
    fn all_undecodable_fails_without_output() {
        let tmp = tempfile::tempdir().unwrap();
        let bad = tmp.path().join("p01.jpg");
        std::fs::write(&bad, b"garbage").unwrap();

        let output = tmp.path().join("out.pdf");
        let err = assemble(&[bad], &output, "test", 90).unwrap_err();

        assert!(matches!(err, ConversionError::NoDecodableImages { attempted: 1, .. }));
        assert!(!output.exists());
    }

    #[test]
    fn empty_input_fails_without_output() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("out.pdf");
        let err = assemble(&Vec::<PathBuf>::new(), &output, "test", 90).unwrap_err();
        assert!(matches!(err, ConversionError::NoDecodableImages { attempted: 0, .. }));
        assert!(!output.exists());
    }
}
