use std::sync::Arc;

use image::RgbaImage;
use schnizzle::error::RenderError;
use schnizzle::renderer::RenderedImage;
use schnizzle::{Diagram, DiagramStyle, DiagramType, Renderer, RendererRegistry};

struct Named {
    name: &'static str,
    handles: &'static [DiagramType],
    styles: Vec<DiagramStyle>,
}

impl Renderer for Named {
    fn name(&self) -> &str {
        self.name
    }

    fn can_render(&self, diagram: &Diagram) -> bool {
        self.handles.contains(&diagram.diagram_type())
    }

    fn render(&self, _diagram: &Diagram) -> Result<RenderedImage, RenderError> {
        Ok(RenderedImage {
            svg: String::new(),
            image: RgbaImage::new(1, 1),
        })
    }

    fn styles_for_type(&self, _diagram_type: DiagramType) -> &[DiagramStyle] {
        &self.styles
    }
}

fn named(name: &'static str, handles: &'static [DiagramType], style: &str) -> Arc<dyn Renderer> {
    Arc::new(Named {
        name,
        handles,
        styles: vec![DiagramStyle::new(style, style)],
    })
}

#[test]
fn test_first_registered_match_wins() {
    let registry = RendererRegistry::new();
    registry.register_renderer(named("classes", &[DiagramType::Class], "one"));
    registry.register_renderer(named("everything", &DiagramType::ALL, "two"));

    let class = Diagram::new(DiagramType::Class, "c");
    let sequence = Diagram::new(DiagramType::Sequence, "s");
    assert_eq!(registry.renderer_for_diagram(&class).unwrap().name(), "classes");
    assert_eq!(registry.renderer_for_diagram(&sequence).unwrap().name(), "everything");
    assert_eq!(registry.styles_for_type(DiagramType::Class)[0].name, "one");
    assert_eq!(registry.styles_for_type(DiagramType::Activity)[0].name, "two");
}

#[test]
fn test_unmatched_type_is_reported() {
    let registry = RendererRegistry::new();
    registry.register_renderer(named("classes", &[DiagramType::Class], "one"));

    let result = registry.renderer_for_diagram(&Diagram::new(DiagramType::UseCase, "u"));
    assert!(matches!(result, Err(RenderError::NoRendererFound(DiagramType::UseCase))));
    assert!(registry.styles_for_type(DiagramType::UseCase).is_empty());
}

#[test]
fn test_default_backends_cover_every_type() {
    let registry = RendererRegistry::with_defaults(&schnizzle::Config::default()).unwrap();
    assert_eq!(registry.len(), 2);
    for ty in DiagramType::ALL {
        assert!(!registry.styles_for_type(ty).is_empty(), "{ty} has no styles");
    }
    let sequence_styles: Vec<_> = registry
        .styles_for_type(DiagramType::Sequence)
        .into_iter()
        .map(|s| s.value)
        .collect();
    assert!(sequence_styles.contains(&"napkin".to_owned()));
}
