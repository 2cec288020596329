use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::RgbaImage;
use image::codecs::jpeg::JpegEncoder;

use crate::diagram::Diagram;
use crate::error::ExportError;
use crate::transcode;

const JPEG_QUALITY: u8 = 80;

/// File formats a diagram image can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Jpeg,
    Png,
    Svg,
}

impl ExportFormat {
    /// Format implied by the path's extension, if it names one we write
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }
}

/// Resolves the target path and format. Paths without a known image
/// extension get `.jpg` appended.
pub fn resolve_target(path: &Path) -> (PathBuf, ExportFormat) {
    match ExportFormat::from_path(path) {
        Some(format) => (path.to_path_buf(), format),
        None => {
            let mut name = path.as_os_str().to_owned();
            name.push(".jpg");
            (PathBuf::from(name), ExportFormat::Jpeg)
        }
    }
}

/// Writes the diagram's image to `path`, returning the path written
pub fn export_image(diagram: &Diagram, path: &Path) -> Result<PathBuf, ExportError> {
    let encoded = diagram
        .encoded_image()
        .ok_or_else(|| ExportError::NoImage(diagram.name().to_owned()))?;
    let (path, format) = resolve_target(path);

    let bytes = match format {
        ExportFormat::Svg if transcode::is_svg(encoded) => encoded.as_bytes().to_vec(),
        ExportFormat::Svg => {
            // Raster-only diagrams have no vector form to write
            return Err(ExportError::NoImage(format!("{} (vector)", diagram.name())));
        }
        ExportFormat::Png => transcode::png_bytes(raster(diagram)?.as_ref())?,
        ExportFormat::Jpeg => jpeg_bytes(raster(diagram)?.as_ref())?,
    };

    write_file(&path, &bytes)?;
    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

fn raster(diagram: &Diagram) -> Result<std::sync::Arc<RgbaImage>, ExportError> {
    diagram
        .decode_image()?
        .ok_or_else(|| ExportError::NoImage(diagram.name().to_owned()))
}

fn jpeg_bytes(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let flattened = transcode::flatten_on_white(image);
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY).encode_image(&flattened)?;
    Ok(bytes)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let to_error = |source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(to_error)?);
    writer.write_all(bytes).map_err(to_error)?;
    writer.flush().map_err(to_error)
}

/// Somewhere a raster image can be placed for pasting elsewhere
pub trait ImageClipboard: Send + Sync {
    fn set_image(&self, image: &RgbaImage) -> Result<(), ExportError>;
}

impl ImageClipboard for egui::Context {
    fn set_image(&self, image: &RgbaImage) -> Result<(), ExportError> {
        let size = [image.width() as usize, image.height() as usize];
        self.copy_image(egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::DiagramType;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"><circle cx="4" cy="4" r="3" fill="green"/></svg>"#;

    fn rendered() -> Diagram {
        let mut diagram = Diagram::new(DiagramType::Class, "exported");
        diagram.set_encoded_image(SVG);
        diagram
    }

    #[test]
    fn test_default_extension_is_jpg() {
        let (path, format) = resolve_target(Path::new("/tmp/out"));
        assert_eq!(path, PathBuf::from("/tmp/out.jpg"));
        assert_eq!(format, ExportFormat::Jpeg);

        let (path, format) = resolve_target(Path::new("/tmp/out.SVG"));
        assert_eq!(path, PathBuf::from("/tmp/out.SVG"));
        assert_eq!(format, ExportFormat::Svg);
    }

    #[test]
    fn test_svg_export_writes_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_image(&rendered(), &dir.path().join("d.svg")).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), SVG);
    }

    #[test]
    fn test_raster_exports_decode() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["d", "d.png"] {
            let path = export_image(&rendered(), &dir.path().join(name)).unwrap();
            let decoded = image::open(&path).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (8, 8));
        }
    }

    #[test]
    fn test_unrendered_diagram_fails() {
        let dir = tempfile::tempdir().unwrap();
        let diagram = Diagram::new(DiagramType::Class, "blank");
        assert!(matches!(
            export_image(&diagram, &dir.path().join("x.png")),
            Err(ExportError::NoImage(_))
        ));
    }

    #[test]
    fn test_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("x.svg");
        assert!(matches!(
            export_image(&rendered(), &target),
            Err(ExportError::Write { .. })
        ));
    }
}
