use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::diagram::{Diagram, DiagramId, DiagramType};

/// The authoritative store of diagrams and session state.
///
/// Diagrams live in one ordered collection per [`DiagramType`]; insertion
/// order is display order. The dirty flag tracks unsaved changes and is only
/// cleared by [`ApplicationModel::mark_clean`] or
/// [`ApplicationModel::delete_all_diagrams`].
#[derive(Debug, Clone)]
pub struct ApplicationModel {
    collections: HashMap<DiagramType, Vec<Diagram>>,
    file_name: Option<PathBuf>,
    dirty: bool,
    selected: Option<DiagramId>,
}

impl Default for ApplicationModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationModel {
    pub fn new() -> Self {
        Self {
            collections: DiagramType::ALL.iter().map(|ty| (*ty, Vec::new())).collect(),
            file_name: None,
            dirty: false,
            selected: None,
        }
    }

    fn collection_mut(&mut self, diagram_type: DiagramType) -> &mut Vec<Diagram> {
        self.collections.entry(diagram_type).or_default()
    }

    /// Appends to the collection for the diagram's type. Duplicates are kept.
    pub fn add_diagram(&mut self, diagram: Diagram) {
        self.collection_mut(diagram.diagram_type()).push(diagram);
        self.dirty = true;
    }

    /// Removes the diagram with the same id. Marks the model dirty whether or
    /// not anything was removed; returns whether an entry was removed.
    pub fn delete_diagram(&mut self, diagram: &Diagram) -> bool {
        let id = diagram.id();
        let collection = self.collection_mut(diagram.diagram_type());
        let removed = match collection.iter().position(|d| d.id() == id) {
            Some(index) => {
                collection.remove(index);
                true
            }
            None => false,
        };
        if removed && self.selected == Some(id) {
            self.selected = None;
        }
        self.dirty = true;
        removed
    }

    /// Replaces the stored diagram sharing `diagram`'s id. Unknown ids leave
    /// the model untouched.
    pub fn replace_diagram(&mut self, diagram: Diagram) -> bool {
        let id = diagram.id();
        let collection = self.collection_mut(diagram.diagram_type());
        match collection.iter_mut().find(|d| d.id() == id) {
            Some(slot) => {
                *slot = diagram;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Resets to an empty, clean session. The file name is left alone.
    pub fn delete_all_diagrams(&mut self) {
        for collection in self.collections.values_mut() {
            collection.clear();
        }
        self.selected = None;
        self.dirty = false;
    }

    pub fn diagrams(&self, diagram_type: DiagramType) -> &[Diagram] {
        self.collections
            .get(&diagram_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every diagram, grouped by type in [`DiagramType::ALL`] order
    pub fn all_diagrams(&self) -> impl Iterator<Item = &Diagram> {
        DiagramType::ALL.iter().flat_map(|ty| self.diagrams(*ty))
    }

    pub fn find(&self, id: DiagramId) -> Option<&Diagram> {
        self.all_diagrams().find(|d| d.id() == id)
    }

    pub fn index_of(&self, diagram: &Diagram) -> Option<usize> {
        self.diagrams(diagram.diagram_type())
            .iter()
            .position(|d| d.id() == diagram.id())
    }

    pub fn len(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn file_name(&self) -> Option<&Path> {
        self.file_name.as_deref()
    }

    pub fn set_file_name(&mut self, file_name: Option<PathBuf>) {
        self.file_name = file_name;
    }

    pub fn selected(&self) -> Option<&Diagram> {
        self.selected.and_then(|id| self.find(id))
    }

    /// Selects a stored diagram; ids not in the model clear the selection
    pub fn select(&mut self, id: Option<DiagramId>) {
        self.selected = id.filter(|id| self.find(*id).is_some());
    }
}
