use std::sync::LazyLock;

use reqwest::blocking::Client;

use crate::diagram::{Diagram, DiagramStyle, DiagramType};
use crate::error::RenderError;
use crate::renderer::{RenderedImage, Renderer, script_and_style};
use crate::transcode;

static STYLES: LazyLock<Vec<DiagramStyle>> = LazyLock::new(|| {
    vec![
        DiagramStyle::new("Boring", "nofunky;"),
        DiagramStyle::new("Plain", "plain;"),
        DiagramStyle::new("Scruffy", "scruffy;"),
    ]
});

/// Activity, class and use case diagrams via a yUML service.
///
/// Rendering takes two requests: a form POST of the DSL which answers with
/// the name of the generated SVG resource, then a GET of that resource.
pub struct YumlRenderer {
    client: Client,
    base_url: String,
}

impl YumlRenderer {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_owned(),
        }
    }

    fn fetch_svg(&self, diagram: &Diagram, dsl: String, post_url: &str) -> reqwest::Result<String> {
        log::debug!("POST {} for '{}'", post_url, diagram.name());
        let resource = self
            .client
            .post(post_url)
            .form(&[("dsl_text", dsl)])
            .send()?
            .error_for_status()?
            .text()?;

        let get_url = format!("{}{}", self.base_url, resource.trim().trim_start_matches('/'));
        log::debug!("GET {}", get_url);
        self.client.get(&get_url).send()?.error_for_status()?.text()
    }
}

/// Collapses a multi-line script into the single-line yUML DSL. Lines that
/// start with `#` in the first column are comments and dropped; the rest are
/// trimmed, blank ones skipped, and joined with `, `.
pub fn build_dsl(script: &str) -> String {
    let lines: Vec<&str> = script
        .trim()
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    format!("{}.svg", lines.join(", "))
}

pub fn post_url(base_url: &str, style: &DiagramStyle, diagram_type: DiagramType) -> Option<String> {
    let modifier = diagram_type.url_modifier()?;
    Some(format!("{}diagram/{}/{}/", base_url, style.value, modifier))
}

impl Renderer for YumlRenderer {
    fn name(&self) -> &str {
        "yUML"
    }

    fn can_render(&self, diagram: &Diagram) -> bool {
        matches!(
            diagram.diagram_type(),
            DiagramType::Activity | DiagramType::Class | DiagramType::UseCase
        )
    }

    fn render(&self, diagram: &Diagram) -> Result<RenderedImage, RenderError> {
        let (script, style) = script_and_style(diagram, &STYLES)?;
        let post_url = post_url(&self.base_url, style, diagram.diagram_type())
            .ok_or(RenderError::NoRendererFound(diagram.diagram_type()))?;

        let svg = self
            .fetch_svg(diagram, build_dsl(script), &post_url)
            .map_err(|e| RenderError::wrap(diagram.name(), "yUML request failed", e))?;
        let image = transcode::svg_to_raster(&svg)
            .map_err(|e| RenderError::wrap(diagram.name(), "yUML returned unusable SVG", e))?;
        Ok(RenderedImage { svg, image })
    }

    fn styles_for_type(&self, _diagram_type: DiagramType) -> &[DiagramStyle] {
        &STYLES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dsl_skips_comments_and_joins() {
        let script = "\n  # header comment\n[Customer]->[Order]\n   [Order]++-*>[LineItem]  \n# trailing\n";
        assert_eq!(build_dsl(script), "[Customer]->[Order], [Order]++-*>[LineItem].svg");
    }

    #[test]
    fn test_indented_hash_is_not_a_comment() {
        assert_eq!(build_dsl("[A]->[B]\n  #[note: x]\n"), "[A]->[B], #[note: x].svg");
    }

    #[test]
    fn test_post_url_per_type() {
        let style = DiagramStyle::new("Plain", "plain;");
        assert_eq!(
            post_url("https://yuml.me/", &style, DiagramType::UseCase).as_deref(),
            Some("https://yuml.me/diagram/plain;/usecase/")
        );
        assert_eq!(post_url("https://yuml.me/", &style, DiagramType::Sequence), None);
    }

    #[test]
    fn test_supports_everything_but_sequences() {
        let renderer = YumlRenderer::new(Client::new(), "http://localhost/");
        for ty in DiagramType::ALL {
            let expected = ty != DiagramType::Sequence;
            assert_eq!(renderer.can_render(&Diagram::new(ty, "t")), expected);
        }
    }

    #[test]
    fn test_missing_script_fails_before_network() {
        // Port 9 (discard) is never contacted: the script check comes first
        let renderer = YumlRenderer::new(Client::new(), "http://127.0.0.1:9/");
        let err = renderer.render(&Diagram::new(DiagramType::Class, "empty")).unwrap_err();
        assert!(err.to_string().contains("no script defined"));
    }
}
