use std::collections::{HashMap, HashSet};

use egui::{ColorImage, Context, TextureHandle, TextureOptions};

use crate::diagram::{Diagram, DiagramId};

type CacheKey = (DiagramId, u64);

struct CachedTexture {
    handle: TextureHandle,
    last_used: u64,
}

/// GPU textures for rendered diagrams, keyed by diagram id and image
/// revision so a re-rendered diagram never shows a stale picture.
pub struct TextureManager {
    cache: HashMap<CacheKey, CachedTexture>,
    /// Images that failed to decode; reported once, not retried
    failed: HashSet<CacheKey>,
    current_frame: u64,
    capacity: usize,
}

impl TextureManager {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: HashMap::new(),
            failed: HashSet::new(),
            current_frame: 0,
            capacity: capacity.max(1),
        }
    }

    /// Call once per frame, before any lookups
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// The texture for the diagram's current image, uploading it on first
    /// use. `None` when the diagram has no decodable image.
    pub fn texture_for(&mut self, ctx: &Context, diagram: &Diagram) -> Option<TextureHandle> {
        let key = (diagram.id(), diagram.revision());
        if let Some(cached) = self.cache.get_mut(&key) {
            cached.last_used = self.current_frame;
            return Some(cached.handle.clone());
        }

        if self.failed.contains(&key) {
            return None;
        }
        let image = match diagram.decode_image() {
            Ok(image) => image?,
            Err(err) => {
                log::error!("Failed to decode image of diagram '{}': {}", diagram.name(), err);
                self.failed.insert(key);
                return None;
            }
        };
        let size = [image.width() as usize, image.height() as usize];
        let color_image = ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        let handle = ctx.load_texture(format!("diagram_{}_r{}", key.0, key.1), color_image, TextureOptions::LINEAR);

        // Older revisions of this diagram will not be asked for again
        self.cache.retain(|(id, _), _| *id != key.0);
        self.evict_to(self.capacity - 1);
        self.cache.insert(
            key,
            CachedTexture {
                handle: handle.clone(),
                last_used: self.current_frame,
            },
        );
        Some(handle)
    }

    /// Drops textures of diagrams for which `keep` returns false
    pub fn retain(&mut self, mut keep: impl FnMut(DiagramId) -> bool) {
        self.cache.retain(|(id, _), _| keep(*id));
        self.failed.retain(|(id, _)| keep(*id));
    }

    fn evict_to(&mut self, limit: usize) {
        if self.cache.len() <= limit {
            return;
        }
        let mut by_age: Vec<(CacheKey, u64)> = self.cache.iter().map(|(k, v)| (*k, v.last_used)).collect();
        by_age.sort_by_key(|(_, frame)| *frame);
        let excess = self.cache.len() - limit;
        for (key, _) in by_age.into_iter().take(excess) {
            self.cache.remove(&key);
        }
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.failed.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::DiagramType;
    use image::{Rgba, RgbaImage};

    fn rendered(name: &str) -> Diagram {
        let mut diagram = Diagram::new(DiagramType::Class, name);
        diagram
            .set_image(RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255])))
            .unwrap();
        diagram
    }

    #[test]
    fn test_cache_hit() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(4);
        let diagram = rendered("a");

        let first = manager.texture_for(&ctx, &diagram).unwrap();
        let second = manager.texture_for(&ctx, &diagram).unwrap();
        assert_eq!(first.id(), second.id());
        assert_eq!(first.size(), [3, 2]);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_new_revision_replaces_texture() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(4);
        let mut diagram = rendered("a");
        let before = manager.texture_for(&ctx, &diagram).unwrap();

        diagram
            .set_image(RgbaImage::from_pixel(5, 5, Rgba([0, 0, 0, 255])))
            .unwrap();
        let after = manager.texture_for(&ctx, &diagram).unwrap();
        assert_ne!(before.id(), after.id());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_lru_eviction() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(2);
        let diagrams: Vec<_> = ["a", "b", "c"].into_iter().map(rendered).collect();

        for diagram in &diagrams {
            manager.begin_frame();
            manager.texture_for(&ctx, diagram).unwrap();
        }
        assert_eq!(manager.len(), 2);

        let oldest = diagrams[0].id();
        manager.retain(|id| id == oldest);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_undecodable_image_not_retried() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(2);
        let mut diagram = Diagram::new(DiagramType::Class, "broken");
        diagram.set_encoded_image("@@not an image@@");

        assert!(manager.texture_for(&ctx, &diagram).is_none());
        assert!(manager.texture_for(&ctx, &diagram).is_none());
        assert_eq!(manager.failed.len(), 1);

        diagram.set_encoded_image(r#"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2"/>"#);
        assert!(manager.texture_for(&ctx, &diagram).is_some());
    }

    #[test]
    fn test_unrendered_has_no_texture() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(2);
        assert!(manager.texture_for(&ctx, &Diagram::new(DiagramType::Class, "x")).is_none());
    }
}
