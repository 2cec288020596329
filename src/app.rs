use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui;

use crate::command::{Command, CommandContext};
use crate::config::Config;
use crate::diagram::{Diagram, DiagramId, DiagramType};
use crate::error::AppResult;
use crate::event::{AppEvent, EventKind, EventQueue};
use crate::file_handler::FileHandler;
use crate::panels::dialogs::{DiagramEditor, Dialog, DialogOutcome, PathPurpose, Pending, UnsavedChoice};
use crate::panels::{console_panel, definitions_panel, diagram_panel, menu_bar};
use crate::state::AppState;
use crate::texture_manager::TextureManager;
use crate::util::logging::ConsoleSink;

const TEXTURE_CACHE_SIZE: usize = 32;

/// Preferences kept between runs. We derive Deserialize/Serialize so eframe
/// can persist them on shutdown.
#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct Settings {
    /// File of the last session that was opened or saved
    pub last_file: Option<PathBuf>,
    /// Directory the last image was exported to
    pub last_export_dir: Option<PathBuf>,
}

/// Requests raised by panels and menus, handled once the frame's UI is built
#[derive(Debug, Clone)]
pub enum UiAction {
    New(DiagramType),
    Edit(Diagram),
    Delete(Diagram),
    Select(DiagramId),
    Open,
    Save,
    SaveAs,
    Close,
    Exit,
    ExportImage(Diagram),
    CopyToClipboard(Diagram),
    About,
}

pub struct SchnizzleApp {
    settings: Settings,
    state: AppState,
    commands: CommandContext,
    events: Arc<EventQueue>,
    textures: TextureManager,
    file_handler: FileHandler,
    dialog: Option<Dialog>,
    actions: Vec<UiAction>,
    /// Waits for a save to finish before running
    deferred: Option<Pending>,
    title: String,
    allow_close: bool,
}

impl SchnizzleApp {
    /// Called once before the first frame. Log records start reaching the
    /// console once `console` is attached to the app's dispatcher.
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config, console: ConsoleSink) -> AppResult<Self> {
        let settings: Settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let egui_ctx = cc.egui_ctx.clone();
        let events = EventQueue::with_waker(Box::new(move || egui_ctx.request_repaint()));
        let commands = CommandContext::from_config(&config)?.with_clipboard(Arc::new(cc.egui_ctx.clone()));
        commands.dispatcher.add_listener(events.clone());
        console.attach(&commands.dispatcher);
        log::info!(
            "Started with {} renderers and {} workers",
            commands.registry.len(),
            config.worker_threads
        );

        Ok(Self {
            settings,
            state: AppState::new(),
            commands,
            events,
            textures: TextureManager::new(TEXTURE_CACHE_SIZE),
            file_handler: FileHandler::new(),
            dialog: None,
            actions: Vec::new(),
            deferred: None,
            title: String::new(),
            allow_close: false,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn textures_mut(&mut self) -> &mut TextureManager {
        &mut self.textures
    }

    /// Queues an action for the end of the frame
    pub fn request(&mut self, action: UiAction) {
        self.actions.push(action);
    }

    fn drain_events(&mut self) {
        let events = self.events.drain();
        if events.is_empty() {
            return;
        }
        for event in &events {
            log::trace!("Applying {} from {}", event.name(), event.source.unwrap_or("ui"));
            self.state.apply(event);
        }
        if events.iter().any(|e| matches!(e.kind, EventKind::FileNameChanged(Some(_)))) {
            self.settings.last_file = self.state.model.file_name().map(|p| p.to_path_buf());
        }
        let model = &self.state.model;
        self.textures.retain(|id| model.find(id).is_some());
    }

    fn execute(&mut self, command: Command) {
        let name = command.name();
        if let Err(err) = command.execute(&self.commands) {
            // Flows already put the failure on the console
            log::debug!("Command '{name}' did not start: {err}");
        }
    }

    fn handle_action(&mut self, action: UiAction) {
        match action {
            UiAction::New(diagram_type) => self.dialog = Some(Dialog::Editor(DiagramEditor::create(diagram_type))),
            UiAction::Edit(diagram) => self.dialog = Some(Dialog::Editor(DiagramEditor::edit(&diagram))),
            UiAction::Delete(diagram) => self.dialog = Some(Dialog::ConfirmDelete(diagram)),
            UiAction::Select(id) => {
                if let Some(diagram) = self.state.model.find(id) {
                    self.commands
                        .dispatcher
                        .dispatch_event(AppEvent::from_source("ui", EventKind::SelectDiagram(diagram.clone())));
                }
            }
            UiAction::Open => self.guard_unsaved(Pending::Open),
            UiAction::Close => self.guard_unsaved(Pending::Close),
            UiAction::Exit => self.guard_unsaved(Pending::Exit),
            UiAction::Save => self.save_session(None),
            UiAction::SaveAs => self.prompt_save_as(None),
            UiAction::ExportImage(diagram) => {
                let dir = self.settings.last_export_dir.clone().unwrap_or_default();
                let initial = dir.join(format!("{}.jpg", diagram.name()));
                self.dialog = Some(Dialog::path_prompt(
                    PathPurpose::Export(diagram),
                    initial.display().to_string(),
                ));
            }
            UiAction::CopyToClipboard(diagram) => self.execute(Command::CopyToClipboard(diagram)),
            UiAction::About => self.dialog = Some(Dialog::About),
        }
    }

    /// Runs `pending` right away on a clean session, otherwise asks what to
    /// do with the unsaved changes first
    fn guard_unsaved(&mut self, pending: Pending) {
        if self.state.model.is_dirty() {
            self.dialog = Some(Dialog::UnsavedChanges(pending));
        } else {
            self.proceed(pending);
        }
    }

    fn proceed(&mut self, pending: Pending) {
        match pending {
            Pending::Open => {
                let initial = self
                    .settings
                    .last_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                self.dialog = Some(Dialog::path_prompt(PathPurpose::Open, initial));
            }
            Pending::OpenPath(path) => self.execute(Command::Open(path)),
            Pending::Close => self.execute(Command::Close),
            Pending::Exit => self.dialog = Some(Dialog::ConfirmExit),
        }
    }

    /// Saves to the session's file, or asks for one. `then` runs once the
    /// save has landed.
    fn save_session(&mut self, then: Option<Pending>) {
        match self.state.model.file_name().map(|p| p.to_path_buf()) {
            Some(path) => self.save_to(path, then),
            None => self.prompt_save_as(then),
        }
    }

    fn save_to(&mut self, path: PathBuf, then: Option<Pending>) {
        let diagrams = self.state.model.all_diagrams().cloned().collect();
        self.execute(Command::Save { diagrams, path });
        self.deferred = then;
    }

    fn prompt_save_as(&mut self, then: Option<Pending>) {
        let initial = self
            .state
            .model
            .file_name()
            .or(self.settings.last_file.as_deref())
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        self.dialog = Some(Dialog::path_prompt(PathPurpose::SaveAs(then), initial));
    }

    fn run_deferred(&mut self) {
        if self.deferred.is_none() || self.state.is_busy() {
            return;
        }
        let Some(pending) = self.deferred.take() else {
            return;
        };
        if self.state.model.is_dirty() {
            log::warn!("Save did not complete, not continuing with {pending:?}");
            return;
        }
        self.proceed(pending);
    }

    fn show_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };
        let outcome = dialog.show(ctx, &self.commands.registry);
        if matches!(outcome, DialogOutcome::KeepOpen) {
            return;
        }
        self.dialog = None;

        match outcome {
            DialogOutcome::KeepOpen | DialogOutcome::Dismissed => {}
            DialogOutcome::Submit { draft, original } => self.execute(Command::SubmitDiagram { draft, original }),
            DialogOutcome::Path(PathPurpose::Open, path) => self.execute(Command::Open(path)),
            DialogOutcome::Path(PathPurpose::SaveAs(then), path) => self.save_to(path, then),
            DialogOutcome::Path(PathPurpose::Export(diagram), path) => {
                self.settings.last_export_dir = path.parent().map(|p| p.to_path_buf());
                self.execute(Command::ExportImage { diagram, path });
            }
            DialogOutcome::Unsaved(pending, UnsavedChoice::Save) => self.save_session(Some(pending)),
            DialogOutcome::Unsaved(pending, UnsavedChoice::Discard) => self.proceed(pending),
            DialogOutcome::Unsaved(_, UnsavedChoice::Cancel) => {}
            DialogOutcome::ConfirmExit => {
                self.allow_close = true;
                self.commands.shutdown();
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            DialogOutcome::ConfirmDelete(diagram) => self.execute(Command::DeleteDiagram(diagram)),
        }
    }

    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.viewport().close_requested()) || self.allow_close {
            return;
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        if self.dialog.is_none() {
            self.request(UiAction::Exit);
        }
    }

    fn update_title(&mut self, ctx: &egui::Context) {
        let title = self.state.title();
        if title != self.title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.title = title;
        }
    }
}

impl eframe::App for SchnizzleApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.textures.begin_frame();
        self.drain_events();
        self.run_deferred();
        self.handle_close_request(ctx);

        if self.file_handler.check_for_dropped_files(ctx) {
            if let Some(Command::Open(path)) = self.file_handler.take_command() {
                self.guard_unsaved(Pending::OpenPath(path));
            }
        }

        menu_bar(self, ctx);
        console_panel(self, ctx);
        definitions_panel(self, ctx);
        diagram_panel(self, ctx);
        self.show_dialog(ctx);
        self.file_handler.preview_hovering(ctx);

        for action in std::mem::take(&mut self.actions) {
            self.handle_action(action);
        }
        self.update_title(ctx);

        if self.state.is_busy() {
            // Keep the spinner moving while work is in flight
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.commands.shutdown();
        log::info!("Goodbye");
    }
}
