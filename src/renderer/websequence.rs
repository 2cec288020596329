use std::sync::LazyLock;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::diagram::{Diagram, DiagramStyle, DiagramType};
use crate::error::RenderError;
use crate::renderer::{RenderedImage, Renderer, script_and_style};
use crate::transcode;

static STYLES: LazyLock<Vec<DiagramStyle>> = LazyLock::new(|| {
    vec![
        DiagramStyle::new("Plain UML", "default"),
        DiagramStyle::new("Green Earth", "earth"),
        DiagramStyle::new("Blue Modern", "modern-blue"),
        DiagramStyle::new("MSCGen", "mscgen"),
        DiagramStyle::new("Omegapple", "omegapple"),
        DiagramStyle::new("QSD", "qsd"),
        DiagramStyle::new("Rose", "rose"),
        DiagramStyle::new("Round Green", "roundgreen"),
        DiagramStyle::new("Napkin", "napkin"),
    ]
});

/// Reply to the initial POST: where to fetch the image and any script errors
#[derive(Debug, Deserialize)]
pub struct SequenceResponse {
    pub img: String,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Sequence diagrams via websequencediagrams.com
pub struct WebSequenceRenderer {
    client: Client,
    base_url: String,
}

impl WebSequenceRenderer {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_owned(),
        }
    }

    fn request(&self, script: &str, style: &DiagramStyle) -> reqwest::Result<SequenceResponse> {
        self.client
            .post(&self.base_url)
            .form(&[
                ("style", style.value.as_str()),
                ("format", "svg"),
                ("message", script),
            ])
            .send()?
            .error_for_status()?
            .json()
    }

    fn fetch(&self, img: &str) -> reqwest::Result<String> {
        let url = format!("{}{}", self.base_url, img.trim_start_matches('/'));
        log::debug!("GET {}", url);
        self.client.get(&url).send()?.error_for_status()?.text()
    }
}

impl Renderer for WebSequenceRenderer {
    fn name(&self) -> &str {
        "WebSequenceDiagrams"
    }

    fn can_render(&self, diagram: &Diagram) -> bool {
        diagram.diagram_type() == DiagramType::Sequence
    }

    fn render(&self, diagram: &Diagram) -> Result<RenderedImage, RenderError> {
        let (script, style) = script_and_style(diagram, &STYLES)?;

        let response = self
            .request(script, style)
            .map_err(|e| RenderError::wrap(diagram.name(), "sequence diagram request failed", e))?;
        for error in &response.errors {
            log::error!("Sequence diagram '{}': {}", diagram.name(), error);
        }

        let svg = self
            .fetch(&response.img)
            .map_err(|e| RenderError::wrap(diagram.name(), "sequence diagram download failed", e))?;
        let image = transcode::svg_to_raster(&svg)
            .map_err(|e| RenderError::wrap(diagram.name(), "service returned unusable SVG", e))?;
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
    fn test_response_parsing() {
        let response: SequenceResponse =
            serde_json::from_str(r#"{ "img": "?svg=mscKTO107", "errors": ["Line 2: bad arrow"] }"#).unwrap();
        assert_eq!(response.img, "?svg=mscKTO107");
        assert_eq!(response.errors.len(), 1);

        let response: SequenceResponse = serde_json::from_str(r#"{ "img": "?svg=x" }"#).unwrap();
        assert!(response.errors.is_empty());
    }

    #[test]
    fn test_only_sequences() {
        let renderer = WebSequenceRenderer::new(Client::new(), "http://localhost/");
        assert!(renderer.can_render(&Diagram::new(DiagramType::Sequence, "s")));
        assert!(!renderer.can_render(&Diagram::new(DiagramType::Class, "c")));
        assert_eq!(renderer.styles_for_type(DiagramType::Sequence)[0].value, "default");
    }
}
