//! Pluggable backends that turn a diagram script into an image.

mod http;
mod registry;
mod websequence;
mod yuml;

use image::RgbaImage;

use crate::diagram::{Diagram, DiagramStyle, DiagramType};
use crate::error::RenderError;

pub use http::build_client;
pub use registry::RendererRegistry;
pub use websequence::WebSequenceRenderer;
pub use yuml::YumlRenderer;

/// What a backend hands back: the SVG it received and its rasterization
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub svg: String,
    pub image: RgbaImage,
}

/// A rendering backend for one or more diagram types
pub trait Renderer: Send + Sync {
    /// Name for logs
    fn name(&self) -> &str;

    /// Whether this backend handles the diagram's type. Must be pure.
    fn can_render(&self, diagram: &Diagram) -> bool;

    /// Renders the diagram's script with its style. Blocks on the network.
    fn render(&self, diagram: &Diagram) -> Result<RenderedImage, RenderError>;

    /// The styles offered for `diagram_type`, first one being the default
    fn styles_for_type(&self, diagram_type: DiagramType) -> &[DiagramStyle];
}

/// The script and style of `diagram`, or the error a backend reports when
/// there is nothing to render.
pub(crate) fn script_and_style<'a>(
    diagram: &'a Diagram,
    styles: &'a [DiagramStyle],
) -> Result<(&'a str, &'a DiagramStyle), RenderError> {
    let script = diagram
        .script()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| RenderError::failed(diagram.name(), "no script defined."))?;
    let style = diagram
        .style()
        .or_else(|| styles.first())
        .ok_or_else(|| RenderError::failed(diagram.name(), "no style available."))?;
    Ok((script, style))
}
