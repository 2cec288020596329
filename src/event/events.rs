use std::path::PathBuf;

use crate::diagram::Diagram;

/// What happened, with the payload each kind of event carries
#[derive(Debug, Clone)]
pub enum EventKind {
    /// A line for the console
    Log(String),
    DiagramAdded(Diagram),
    DiagramDeleted(Diagram),
    DiagramDeleteAll,
    DiagramModified(Diagram),
    SelectDiagram(Diagram),
    /// `None` when the session no longer has a file
    FileNameChanged(Option<PathBuf>),
    ProgressStarted,
    ProgressCompleted,
}

/// An immutable application event
#[derive(Debug, Clone)]
pub struct AppEvent {
    pub kind: EventKind,
    /// Name of the producer, for diagnostics only
    pub source: Option<&'static str>,
}

impl AppEvent {
    pub fn new(kind: EventKind) -> Self {
        Self { kind, source: None }
    }

    pub fn from_source(source: &'static str, kind: EventKind) -> Self {
        Self {
            kind,
            source: Some(source),
        }
    }

    pub fn log(message: impl Into<String>) -> Self {
        Self::new(EventKind::Log(message.into()))
    }

    /// The diagram payload, for the kinds that carry one
    pub fn diagram(&self) -> Option<&Diagram> {
        match &self.kind {
            EventKind::DiagramAdded(d)
            | EventKind::DiagramDeleted(d)
            | EventKind::DiagramModified(d)
            | EventKind::SelectDiagram(d) => Some(d),
            _ => None,
        }
    }

    /// Short tag used in logs and tests
    pub fn name(&self) -> &'static str {
        match self.kind {
            EventKind::Log(_) => "Log",
            EventKind::DiagramAdded(_) => "DiagramAdded",
            EventKind::DiagramDeleted(_) => "DiagramDeleted",
            EventKind::DiagramDeleteAll => "DiagramDeleteAll",
            EventKind::DiagramModified(_) => "DiagramModified",
            EventKind::SelectDiagram(_) => "SelectDiagram",
            EventKind::FileNameChanged(_) => "FileNameChanged",
            EventKind::ProgressStarted => "ProgressStarted",
            EventKind::ProgressCompleted => "ProgressCompleted",
        }
    }
}

impl From<EventKind> for AppEvent {
    fn from(kind: EventKind) -> Self {
        Self::new(kind)
    }
}
