use std::path::PathBuf;

use eframe::egui;

use crate::diagram::{Diagram, DiagramStyle, DiagramType};
use crate::renderer::RendererRegistry;

/// Something the user asked for that has to wait for unsaved changes to be
/// dealt with first
#[derive(Debug, Clone, PartialEq)]
pub enum Pending {
    Open,
    OpenPath(PathBuf),
    Close,
    Exit,
}

/// What a path prompt is for
#[derive(Debug, Clone)]
pub enum PathPurpose {
    Open,
    /// Save under a new name, then carry on with the pending action if any
    SaveAs(Option<Pending>),
    Export(Diagram),
}

impl PathPurpose {
    fn title(&self) -> &'static str {
        match self {
            Self::Open => "Open Diagrams",
            Self::SaveAs(_) => "Save Diagrams As",
            Self::Export(_) => "Export Image",
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            Self::Open | Self::SaveAs(_) => "Path of a .jsl file",
            Self::Export(_) => "Path ending in .jpg, .png or .svg (.jpg is added otherwise)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsavedChoice {
    Save,
    Discard,
    Cancel,
}

/// Result of showing a dialog for one frame
#[derive(Debug)]
pub enum DialogOutcome {
    KeepOpen,
    Dismissed,
    Submit { draft: Diagram, original: Option<Diagram> },
    Path(PathPurpose, PathBuf),
    Unsaved(Pending, UnsavedChoice),
    ConfirmExit,
    ConfirmDelete(Diagram),
}

/// Form state for creating or editing a diagram
#[derive(Debug)]
pub struct DiagramEditor {
    original: Option<Diagram>,
    diagram_type: DiagramType,
    name: String,
    note: String,
    script: String,
    style: Option<DiagramStyle>,
    error: Option<String>,
}

impl DiagramEditor {
    pub fn create(diagram_type: DiagramType) -> Self {
        Self {
            original: None,
            diagram_type,
            name: String::new(),
            note: String::new(),
            script: String::new(),
            style: None,
            error: None,
        }
    }

    pub fn edit(diagram: &Diagram) -> Self {
        Self {
            original: Some(diagram.clone()),
            diagram_type: diagram.diagram_type(),
            name: diagram.name().to_owned(),
            note: diagram.note().unwrap_or_default().to_owned(),
            script: diagram.script().unwrap_or_default().to_owned(),
            style: diagram.style().cloned(),
            error: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.original.is_none()
    }

    /// Builds the draft, keeping the original's identity and image when
    /// editing. Fails when the form is incomplete.
    pub fn draft(&self, styles: &[DiagramStyle]) -> Result<Diagram, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("A diagram needs a name.".to_owned());
        }
        if self.script.trim().is_empty() {
            return Err("A diagram needs a script.".to_owned());
        }

        let mut draft = match &self.original {
            Some(original) => original.clone(),
            None => Diagram::new(self.diagram_type, name),
        };
        draft.set_name(name);
        draft.set_note(Some(self.note.clone()));
        draft.set_script(self.script.clone());
        if let Some(style) = self.style.clone().or_else(|| styles.first().cloned()) {
            draft.set_style(style);
        }
        Ok(draft)
    }

    fn show(&mut self, ui: &mut egui::Ui, registry: &RendererRegistry) -> DialogOutcome {
        let styles = registry.styles_for_type(self.diagram_type);

        egui::Grid::new("diagram_editor_grid")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                ui.label("Type");
                if self.is_new() {
                    egui::ComboBox::from_id_salt("diagram_type")
                        .selected_text(self.diagram_type.label())
                        .show_ui(ui, |ui| {
                            for ty in DiagramType::ALL {
                                if ui.selectable_value(&mut self.diagram_type, ty, ty.label()).changed() {
                                    // Styles differ between backends
                                    self.style = None;
                                }
                            }
                        });
                } else {
                    ui.label(self.diagram_type.label());
                }
                ui.end_row();

                ui.label("Name");
                ui.text_edit_singleline(&mut self.name);
                ui.end_row();

                ui.label("Note");
                ui.text_edit_singleline(&mut self.note);
                ui.end_row();

                ui.label("Style");
                let current = self
                    .style
                    .as_ref()
                    .or_else(|| styles.first())
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| "none available".to_owned());
                egui::ComboBox::from_id_salt("diagram_style")
                    .selected_text(current)
                    .show_ui(ui, |ui| {
                        for style in &styles {
                            let selected = self.style.as_ref() == Some(style);
                            if ui.selectable_label(selected, &style.name).clicked() {
                                self.style = Some(style.clone());
                            }
                        }
                    });
                ui.end_row();
            });

        ui.label("Script");
        ui.add(
            egui::TextEdit::multiline(&mut self.script)
                .code_editor()
                .desired_rows(12)
                .desired_width(f32::INFINITY),
        );

        if let Some(error) = &self.error {
            ui.colored_label(ui.visuals().error_fg_color, error);
        }

        let mut outcome = DialogOutcome::KeepOpen;
        ui.horizontal(|ui| {
            let label = if self.is_new() { "Create" } else { "Update" };
            if ui.button(label).clicked() {
                match self.draft(&styles) {
                    Ok(draft) => {
                        outcome = DialogOutcome::Submit {
                            draft,
                            original: self.original.clone(),
                        }
                    }
                    Err(message) => self.error = Some(message),
                }
            }
            if ui.button("Cancel").clicked() {
                outcome = DialogOutcome::Dismissed;
            }
        });
        outcome
    }
}

/// The one modal dialog that may be open at a time
#[derive(Debug)]
pub enum Dialog {
    Editor(DiagramEditor),
    PathPrompt { purpose: PathPurpose, text: String },
    UnsavedChanges(Pending),
    ConfirmExit,
    ConfirmDelete(Diagram),
    About,
}

impl Dialog {
    pub fn path_prompt(purpose: PathPurpose, initial: impl Into<String>) -> Self {
        Self::PathPrompt {
            purpose,
            text: initial.into(),
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::Editor(editor) if editor.is_new() => "New Diagram",
            Self::Editor(_) => "Edit Diagram",
            Self::PathPrompt { purpose, .. } => purpose.title(),
            Self::UnsavedChanges(_) => "Unsaved Changes",
            Self::ConfirmExit => "Exit",
            Self::ConfirmDelete(_) => "Delete Diagram",
            Self::About => "About Schnizzle",
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, registry: &RendererRegistry) -> DialogOutcome {
        let escape = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        let response = egui::Window::new(self.title())
            .collapsible(false)
            .resizable(matches!(self, Self::Editor(_)))
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| self.contents(ui, registry));

        match response.and_then(|r| r.inner) {
            Some(DialogOutcome::KeepOpen) | None if escape => DialogOutcome::Dismissed,
            Some(outcome) => outcome,
            None => DialogOutcome::KeepOpen,
        }
    }

    fn contents(&mut self, ui: &mut egui::Ui, registry: &RendererRegistry) -> DialogOutcome {
        match self {
            Self::Editor(editor) => editor.show(ui, registry),
            Self::PathPrompt { purpose, text } => {
                ui.label(purpose.hint());
                let edit = ui.add(egui::TextEdit::singleline(text).desired_width(360.0));
                let entered = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let mut outcome = DialogOutcome::KeepOpen;
                ui.horizontal(|ui| {
                    let ok = ui.add_enabled(!text.trim().is_empty(), egui::Button::new("OK"));
                    if (ok.clicked() || entered) && !text.trim().is_empty() {
                        outcome = DialogOutcome::Path(purpose.clone(), PathBuf::from(text.trim()));
                    }
                    if ui.button("Cancel").clicked() {
                        outcome = DialogOutcome::Dismissed;
                    }
                });
                outcome
            }
            Self::UnsavedChanges(pending) => {
                ui.label("The current diagrams have unsaved changes. Save them first?");
                let mut outcome = DialogOutcome::KeepOpen;
                ui.horizontal(|ui| {
                    for (label, choice) in [
                        ("Save", UnsavedChoice::Save),
                        ("Discard", UnsavedChoice::Discard),
                        ("Cancel", UnsavedChoice::Cancel),
                    ] {
                        if ui.button(label).clicked() {
                            outcome = DialogOutcome::Unsaved(pending.clone(), choice);
                        }
                    }
                });
                outcome
            }
            Self::ConfirmExit => yes_no(ui, "Exit Schnizzle?", DialogOutcome::ConfirmExit),
            Self::ConfirmDelete(diagram) => {
                let question = format!("Delete diagram '{}'?", diagram.name());
                yes_no(ui, &question, DialogOutcome::ConfirmDelete(diagram.clone()))
            }
            Self::About => {
                ui.heading(format!("Schnizzle {}", env!("CARGO_PKG_VERSION")));
                ui.label("Draw UML diagrams from text using yUML and websequencediagrams.com.");
                ui.add_space(8.0);
                if ui.button("Close").clicked() {
                    DialogOutcome::Dismissed
                } else {
                    DialogOutcome::KeepOpen
                }
            }
        }
    }
}

fn yes_no(ui: &mut egui::Ui, question: &str, yes: DialogOutcome) -> DialogOutcome {
    ui.label(question);
    let mut outcome = DialogOutcome::KeepOpen;
    ui.horizontal(|ui| {
        if ui.button("Yes").clicked() {
            outcome = yes;
        } else if ui.button("No").clicked() {
            outcome = DialogOutcome::Dismissed;
        }
    });
    outcome
}
