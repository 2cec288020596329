#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod config;
pub mod diagram;
pub mod error;
pub mod event;
pub mod export;
pub mod file_handler;
pub mod model;
pub mod panels;
pub mod renderer;
pub mod state;
pub mod texture_manager;
pub mod transcode;
pub mod util;

pub use app::SchnizzleApp;
pub use command::{Command, CommandContext, TaskPool};
pub use config::Config;
pub use diagram::{Diagram, DiagramStyle, DiagramType};
pub use error::{AppError, AppResult};
pub use event::{AppEvent, Dispatcher, EventHandler, EventKind, EventQueue};
pub use model::ApplicationModel;
pub use renderer::{Renderer, RendererRegistry};
pub use state::AppState;
