use crate::diagram::Diagram;
use crate::event::{AppEvent, EventKind};
use crate::model::ApplicationModel;

/// Most console lines kept before the oldest are dropped
const CONSOLE_LIMIT: usize = 1000;

/// Everything the main window shows, updated only by applying events.
///
/// This is the single consumer of dispatched events: the UI thread drains the
/// event queue and feeds each event to [`AppState::apply`], so the model has
/// exactly one mutator.
#[derive(Debug, Default)]
pub struct AppState {
    pub model: ApplicationModel,
    console: Vec<String>,
    busy: usize,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &AppEvent) {
        match &event.kind {
            EventKind::Log(message) => self.push_console(message),
            EventKind::DiagramAdded(diagram) => self.model.add_diagram(diagram.clone()),
            EventKind::DiagramDeleted(diagram) => {
                self.model.delete_diagram(diagram);
            }
            EventKind::DiagramDeleteAll => self.model.delete_all_diagrams(),
            EventKind::DiagramModified(diagram) => {
                if !self.model.replace_diagram(diagram.clone()) {
                    log::warn!("Modified diagram '{}' is no longer in the model", diagram.name());
                }
                self.model.mark_dirty();
            }
            EventKind::SelectDiagram(diagram) => self.model.select(Some(diagram.id())),
            EventKind::FileNameChanged(file_name) => {
                self.model.set_file_name(file_name.clone());
                self.model.mark_clean();
            }
            EventKind::ProgressStarted => self.busy += 1,
            EventKind::ProgressCompleted => self.busy = self.busy.saturating_sub(1),
        }
    }

    pub fn apply_all<'a>(&mut self, events: impl IntoIterator<Item = &'a AppEvent>) {
        for event in events {
            self.apply(event);
        }
    }

    fn push_console(&mut self, message: &str) {
        self.console.push(message.trim_end().to_owned());
        if self.console.len() > CONSOLE_LIMIT {
            let excess = self.console.len() - CONSOLE_LIMIT;
            self.console.drain(..excess);
        }
    }

    pub fn console(&self) -> &[String] {
        &self.console
    }

    /// True while any progress-bounded operation is running
    pub fn is_busy(&self) -> bool {
        self.busy > 0
    }

    pub fn selected(&self) -> Option<&Diagram> {
        self.model.selected()
    }

    pub fn can_save(&self) -> bool {
        self.model.is_dirty() && self.model.file_name().is_some()
    }

    pub fn can_save_as(&self) -> bool {
        self.model.is_dirty()
    }

    /// Window title: the app name, plus the file when there is one
    pub fn title(&self) -> String {
        match self.model.file_name() {
            Some(path) => format!("Schnizzle - {}", path.display()),
            None => "Schnizzle".to_owned(),
        }
    }
}
