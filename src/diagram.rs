use std::fmt;
use std::sync::{Arc, OnceLock};

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TranscodeError;
use crate::transcode;

/// The kinds of diagram the editor knows about. Fixed when a diagram is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagramType {
    Activity,
    Class,
    UseCase,
    Sequence,
}

impl DiagramType {
    /// All types in display order, which is also the order diagrams are saved in
    pub const ALL: [DiagramType; 4] = [
        DiagramType::Activity,
        DiagramType::Class,
        DiagramType::UseCase,
        DiagramType::Sequence,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Activity => "Activity",
            Self::Class => "Class",
            Self::UseCase => "Use Case",
            Self::Sequence => "Sequence",
        }
    }

    /// Path segment the yUML service expects for this type
    pub fn url_modifier(self) -> Option<&'static str> {
        match self {
            Self::Activity => Some("activity"),
            Self::Class => Some("class"),
            Self::UseCase => Some("usecase"),
            Self::Sequence => None,
        }
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named visual theme handed to a rendering backend along with the script
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiagramStyle {
    pub name: String,
    pub value: String,
}

impl DiagramStyle {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
        }
    }
}

impl fmt::Display for DiagramStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Process-local identity of a diagram. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagramId(Uuid);

impl DiagramId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DiagramId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A diagram definition plus its rendered image.
///
/// The encoded image (SVG text, or base64 for raster images) is what gets
/// persisted; the decoded raster is derived from it on first use and cached.
/// Clones share the cached raster.
#[derive(Clone, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(skip)]
    id: DiagramId,
    name: String,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    script: Option<String>,
    #[serde(default)]
    style: Option<DiagramStyle>,
    #[serde(rename = "type")]
    diagram_type: DiagramType,
    #[serde(default)]
    encoded_image: Option<String>,
    #[serde(skip)]
    image: OnceLock<Arc<RgbaImage>>,
    #[serde(skip)]
    revision: u64,
}

impl Diagram {
    pub fn new(diagram_type: DiagramType, name: impl Into<String>) -> Self {
        Self {
            id: DiagramId::new(),
            name: name.into(),
            note: None,
            script: None,
            style: None,
            diagram_type,
            encoded_image: None,
            image: OnceLock::new(),
            revision: 0,
        }
    }

    pub fn id(&self) -> DiagramId {
        self.id
    }

    pub fn diagram_type(&self) -> DiagramType {
        self.diagram_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Empty notes are stored as `None`
    pub fn set_note(&mut self, note: Option<String>) {
        self.note = note.filter(|n| !n.is_empty());
    }

    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    pub fn set_script(&mut self, script: impl Into<String>) {
        self.script = Some(script.into());
    }

    pub fn style(&self) -> Option<&DiagramStyle> {
        self.style.as_ref()
    }

    pub fn set_style(&mut self, style: DiagramStyle) {
        self.style = Some(style);
    }

    pub fn encoded_image(&self) -> Option<&str> {
        self.encoded_image.as_deref()
    }

    /// Bumped whenever the image changes; keys texture caches
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the encoded image and drops the cached raster so it is
    /// re-derived from the new encoding.
    pub fn set_encoded_image(&mut self, encoded: impl Into<String>) {
        self.encoded_image = Some(encoded.into());
        self.image = OnceLock::new();
        self.revision += 1;
    }

    /// Stores a raster image and re-derives the encoded form (base64 PNG)
    /// from it, replacing any previous encoding.
    pub fn set_image(&mut self, image: RgbaImage) -> Result<(), TranscodeError> {
        self.encoded_image = Some(transcode::encode_raster(&image)?);
        self.image = OnceLock::from(Arc::new(image));
        self.revision += 1;
        Ok(())
    }

    /// Stores the outcome of a render: the SVG source and its rasterization
    pub fn set_rendering(&mut self, svg: String, image: RgbaImage) {
        self.encoded_image = Some(svg);
        self.image = OnceLock::from(Arc::new(image));
        self.revision += 1;
    }

    pub fn has_image(&self) -> bool {
        self.image.get().is_some() || self.encoded_image.is_some()
    }

    /// Decodes the image, failing loudly. Caches on success.
    pub fn decode_image(&self) -> Result<Option<Arc<RgbaImage>>, TranscodeError> {
        if let Some(image) = self.image.get() {
            return Ok(Some(Arc::clone(image)));
        }
        let Some(encoded) = self.encoded_image.as_deref() else {
            return Ok(None);
        };
        let decoded = Arc::new(transcode::decode_image(encoded)?);
        Ok(Some(Arc::clone(self.image.get_or_init(|| decoded))))
    }

    /// Whether submitting this draft requires a new render, compared to the
    /// stored version it was derived from.
    pub fn needs_rendering(&self, original: Option<&Diagram>) -> bool {
        match original {
            None => true,
            Some(original) => {
                self.script != original.script
                    || self.style != original.style
                    || self.encoded_image.is_none()
            }
        }
    }
}

impl PartialEq for Diagram {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.note == other.note
            && self.script == other.script
            && self.style == other.style
            && self.diagram_type == other.diagram_type
            && self.encoded_image == other.encoded_image
    }
}

impl fmt::Debug for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagram")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &self.diagram_type)
            .field("style", &self.style)
            .field("script", &self.script)
            .field("has_image", &self.has_image())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2"><rect width="4" height="2" fill="red"/></svg>"#;

    #[test]
    fn test_type_is_fixed_and_id_unique() {
        let a = Diagram::new(DiagramType::Class, "a");
        let b = a.clone();
        let c = Diagram::new(DiagramType::Class, "a");
        assert_eq!(a.diagram_type(), DiagramType::Class);
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        // Equality ignores identity
        assert_eq!(a, c);
    }

    #[test]
    fn test_encoded_image_derives_raster() {
        let mut diagram = Diagram::new(DiagramType::Activity, "svg");
        diagram.set_encoded_image(SVG);
        let image = diagram.decode_image().unwrap().unwrap();
        assert_eq!((image.width(), image.height()), (4, 2));
        assert_eq!(diagram.revision(), 1);
    }

    #[test]
    fn test_raster_derives_encoding() {
        let mut diagram = Diagram::new(DiagramType::Class, "raster");
        diagram.set_image(RgbaImage::from_pixel(3, 3, image::Rgba([1, 2, 3, 255]))).unwrap();
        let encoded = diagram.encoded_image().unwrap().to_owned();
        assert!(!encoded.starts_with('<'));

        let reloaded = {
            let mut d = Diagram::new(DiagramType::Class, "raster");
            d.set_encoded_image(encoded);
            d
        };
        let image = reloaded.decode_image().unwrap().unwrap();
        assert_eq!(image.get_pixel(1, 1), &image::Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_raster_replaces_previous_encoding() {
        let mut diagram = Diagram::new(DiagramType::Class, "replaced");
        diagram.set_encoded_image(SVG);
        diagram.set_image(RgbaImage::from_pixel(7, 7, image::Rgba([0, 0, 255, 255]))).unwrap();
        assert_eq!(diagram.revision(), 2);

        let live = diagram.decode_image().unwrap().unwrap();
        let mut reloaded = Diagram::new(DiagramType::Class, "replaced");
        reloaded.set_encoded_image(diagram.encoded_image().unwrap());
        let persisted = reloaded.decode_image().unwrap().unwrap();
        assert_eq!(live.dimensions(), (7, 7));
        assert_eq!(persisted.dimensions(), live.dimensions());
    }

    #[test]
    fn test_needs_rendering() {
        let mut original = Diagram::new(DiagramType::Class, "x");
        original.set_script("[A]->[B]");
        original.set_style(DiagramStyle::new("Plain", "plain;"));
        original.set_encoded_image(SVG);

        let mut draft = original.clone();
        draft.set_name("renamed");
        draft.set_note(Some("note".into()));
        assert!(!draft.needs_rendering(Some(&original)));

        draft.set_style(DiagramStyle::new("Scruffy", "scruffy;"));
        assert!(draft.needs_rendering(Some(&original)));
        assert!(draft.needs_rendering(None));
    }

    #[test]
    fn test_empty_note_is_none() {
        let mut diagram = Diagram::new(DiagramType::Sequence, "n");
        diagram.set_note(Some(String::new()));
        assert_eq!(diagram.note(), None);
    }
}
