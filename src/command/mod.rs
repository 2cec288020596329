mod commands;
mod pool;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::diagram::Diagram;
use crate::error::AppResult;
use crate::event::{AppEvent, Dispatcher, EventKind};
use crate::export::ImageClipboard;
use crate::renderer::RendererRegistry;
use crate::util::logging::{self, CONSOLE_TARGET};

pub use commands::{close, copy_to_clipboard, delete_diagram, export_image, open, save, submit_diagram};
pub use pool::{PoolError, TaskHandle, TaskPool};

/// Operations the user can trigger. Each one reports back only through
/// dispatched events; none of them touches the model directly.
pub enum Command {
    /// Create (`original: None`) or edit a diagram, rendering when needed
    SubmitDiagram {
        draft: Diagram,
        original: Option<Diagram>,
    },
    DeleteDiagram(Diagram),
    Open(PathBuf),
    /// Save a snapshot of the model's diagrams, in save order
    Save {
        diagrams: Vec<Diagram>,
        path: PathBuf,
    },
    Close,
    ExportImage {
        diagram: Diagram,
        path: PathBuf,
    },
    CopyToClipboard(Diagram),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitDiagram { original: None, .. } => "create diagram",
            Self::SubmitDiagram { .. } => "edit diagram",
            Self::DeleteDiagram(_) => "delete diagram",
            Self::Open(_) => "open",
            Self::Save { .. } => "save",
            Self::Close => "close",
            Self::ExportImage { .. } => "export image",
            Self::CopyToClipboard(_) => "copy to clipboard",
        }
    }

    /// Runs the command. Background commands return the handle of the queued
    /// task.
    pub fn execute(self, ctx: &CommandContext) -> AppResult<Option<TaskHandle>> {
        log::debug!("Executing command: {}", self.name());
        match self {
            Self::SubmitDiagram { draft, original } => submit_diagram(ctx, draft, original).map(Some),
            Self::DeleteDiagram(diagram) => {
                delete_diagram(ctx, diagram);
                Ok(None)
            }
            Self::Open(path) => open(ctx, path).map(Some),
            Self::Save { diagrams, path } => save(ctx, diagrams, path).map(Some),
            Self::Close => {
                close(ctx);
                Ok(None)
            }
            Self::ExportImage { diagram, path } => export_image(ctx, diagram, path).map(Some),
            Self::CopyToClipboard(diagram) => copy_to_clipboard(ctx, &diagram).map(|()| None),
        }
    }
}

/// Puts user-facing messages on the console through the dispatcher and
/// logs them under [`CONSOLE_TARGET`], which the console logger does not
/// forward a second time. Cheap to clone into background tasks.
#[derive(Debug, Clone)]
pub struct Reporter {
    dispatcher: Arc<Dispatcher>,
}

impl Reporter {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatch(&self, source: &'static str, kind: EventKind) {
        self.dispatcher.dispatch_event(AppEvent::from_source(source, kind));
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.report(log::Level::Info, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.report(log::Level::Error, message.as_ref());
    }

    fn report(&self, level: log::Level, message: &str) {
        log::log!(target: CONSOLE_TARGET, level, "{message}");
        self.dispatcher
            .dispatch_event(AppEvent::new(EventKind::Log(logging::console_line(level, message))));
    }
}

/// Everything commands need, passed explicitly instead of living in globals
#[derive(Clone)]
pub struct CommandContext {
    pub dispatcher: Arc<Dispatcher>,
    pub registry: Arc<RendererRegistry>,
    pub pool: Arc<TaskPool>,
    pub clipboard: Option<Arc<dyn ImageClipboard>>,
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("dispatcher", &self.dispatcher)
            .field("registry", &self.registry)
            .field("pool", &self.pool)
            .field("clipboard", &self.clipboard.is_some())
            .finish()
    }
}

impl CommandContext {
    pub fn new(dispatcher: Arc<Dispatcher>, registry: Arc<RendererRegistry>, pool: Arc<TaskPool>) -> Self {
        Self {
            dispatcher,
            registry,
            pool,
            clipboard: None,
        }
    }

    /// Default renderers and a worker pool sized from `config`
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let registry = RendererRegistry::with_defaults(config)?;
        let pool = TaskPool::new(config.worker_threads, config.queue_capacity)?;
        Ok(Self::new(Arc::new(Dispatcher::new()), Arc::new(registry), Arc::new(pool)))
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn ImageClipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn reporter(&self) -> Reporter {
        Reporter::new(Arc::clone(&self.dispatcher))
    }

    /// Cancels queued work and waits for running tasks
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}
