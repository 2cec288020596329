//! Conversions between the encoded image forms a diagram carries (SVG text or
//! base64 raster) and decoded RGBA pixels.

use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgb, RgbImage, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;

use crate::error::TranscodeError;

/// Font database shared by every SVG parse. Loading system fonts is slow, so
/// it happens once.
static FONTS: LazyLock<Arc<usvg::fontdb::Database>> = LazyLock::new(|| {
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();

    let local_fonts = Path::new("fonts");
    if local_fonts.is_dir() {
        fontdb.load_fonts_dir(local_fonts);
    }
    log::debug!("Loaded {} font faces for SVG rendering", fontdb.len());
    Arc::new(fontdb)
});

/// Returns true if the encoded form is SVG markup rather than base64
pub fn is_svg(encoded: &str) -> bool {
    encoded.trim_start().starts_with('<')
}

/// Rasterizes SVG markup at its natural size
pub fn svg_to_raster(svg: &str) -> Result<RgbaImage, TranscodeError> {
    let opts = usvg::Options {
        fontdb: Arc::clone(&FONTS),
        ..usvg::Options::default()
    };

    let tree = usvg::Tree::from_str(svg, &opts).map_err(|e| TranscodeError::Svg(e.to_string()))?;

    let width = tree.size().width().ceil() as u32;
    let height = tree.size().height().ceil() as u32;
    let mut pixmap = Pixmap::new(width, height).ok_or(TranscodeError::EmptyCanvas)?;

    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha; the image crate expects straight alpha
    let mut raster = RgbaImage::new(width, height);
    for (pixel, source) in raster.pixels_mut().zip(pixmap.pixels()) {
        let color = source.demultiply();
        *pixel = image::Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    Ok(raster)
}

/// Decodes either encoded form into pixels
pub fn decode_image(encoded: &str) -> Result<RgbaImage, TranscodeError> {
    if is_svg(encoded) {
        return svg_to_raster(encoded);
    }
    // Older files wrap base64 across lines
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

/// Encodes pixels as base64 PNG text
pub fn encode_raster(image: &RgbaImage) -> Result<String, TranscodeError> {
    Ok(STANDARD.encode(png_bytes(image)?))
}

pub fn png_bytes(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Drops the alpha channel by compositing onto white. JPEG has no alpha.
pub fn flatten_on_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let blend = |c: u8| -> u8 {
            let a = u16::from(a);
            ((u16::from(c) * a + 255 * (255 - a)) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="6">
        <rect x="0" y="0" width="10" height="6" fill="#0000ff"/>
    </svg>"##;

    #[test]
    fn test_svg_detection() {
        assert!(is_svg("  <?xml version=\"1.0\"?><svg/>"));
        assert!(!is_svg("iVBORw0KGgo="));
    }

    #[test]
    fn test_svg_rasterizes_at_natural_size() {
        let raster = svg_to_raster(SVG).unwrap();
        assert_eq!(raster.dimensions(), (10, 6));
        assert_eq!(raster.get_pixel(5, 3), &image::Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_malformed_svg_is_an_error() {
        assert!(matches!(svg_to_raster("<svg"), Err(TranscodeError::Svg(_))));
    }

    #[test]
    fn test_base64_with_line_breaks_decodes() {
        let image = RgbaImage::from_pixel(2, 2, image::Rgba([9, 8, 7, 255]));
        let encoded = encode_raster(&image).unwrap();
        let wrapped: String = encoded
            .as_bytes()
            .chunks(16)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(decode_image(&wrapped).unwrap(), image);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(decode_image("not base64!"), Err(TranscodeError::Base64(_))));
    }

    #[test]
    fn test_flatten_transparent_is_white() {
        let image = RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 0]));
        assert_eq!(flatten_on_white(&image).get_pixel(0, 0), &Rgb([255, 255, 255]));
    }
}
