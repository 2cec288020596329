use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Config;
use crate::diagram::{Diagram, DiagramStyle, DiagramType};
use crate::error::RenderError;
use crate::renderer::{Renderer, WebSequenceRenderer, YumlRenderer, build_client};

/// Ordered list of rendering backends.
///
/// Lookup returns the earliest registered backend whose `can_render` accepts
/// the diagram, so registration order is the priority order.
#[derive(Default)]
pub struct RendererRegistry {
    renderers: RwLock<Vec<Arc<dyn Renderer>>>,
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.renderers.read().iter().map(|r| r.name().to_owned()).collect();
        f.debug_struct("RendererRegistry").field("renderers", &names).finish()
    }
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The yUML backend followed by the web sequence backend, sharing one
    /// HTTP client.
    pub fn with_defaults(config: &Config) -> Result<Self, RenderError> {
        let client = build_client(config)
            .map_err(|e| RenderError::wrap("http client", "failed to build HTTP client", e))?;
        let registry = Self::new();
        registry.register_renderer(Arc::new(YumlRenderer::new(client.clone(), &config.yuml_url)));
        registry.register_renderer(Arc::new(WebSequenceRenderer::new(client, &config.websequence_url)));
        Ok(registry)
    }

    /// Appends a backend. No de-duplication.
    pub fn register_renderer(&self, renderer: Arc<dyn Renderer>) {
        log::debug!("Registered renderer {}", renderer.name());
        self.renderers.write().push(renderer);
    }

    pub fn renderer_for_diagram(&self, diagram: &Diagram) -> Result<Arc<dyn Renderer>, RenderError> {
        self.renderers
            .read()
            .iter()
            .find(|r| r.can_render(diagram))
            .cloned()
            .ok_or(RenderError::NoRendererFound(diagram.diagram_type()))
    }

    /// Styles of the backend that would render a diagram of this type
    pub fn styles_for_type(&self, diagram_type: DiagramType) -> Vec<DiagramStyle> {
        let template = Diagram::new(diagram_type, "");
        self.renderer_for_diagram(&template)
            .map(|r| r.styles_for_type(diagram_type).to_vec())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.renderers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
