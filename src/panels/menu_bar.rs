use eframe::egui;

use crate::app::{SchnizzleApp, UiAction};
use crate::diagram::DiagramType;
use crate::state::AppState;

/// Enabled entries of the File menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileMenu {
    save: bool,
    save_as: bool,
    close: bool,
}

impl FileMenu {
    fn for_state(state: &AppState) -> Self {
        Self {
            save: state.can_save(),
            save_as: state.can_save_as(),
            close: !state.model.is_empty() || state.model.file_name().is_some(),
        }
    }
}

pub fn menu_bar(app: &mut SchnizzleApp, ctx: &egui::Context) {
    let state = app.state();
    let selected = state.selected().cloned();
    let file_menu = FileMenu::for_state(state);
    let busy = state.is_busy();

    let mut action = None;
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open…").clicked() {
                    action = Some(UiAction::Open);
                    ui.close_menu();
                }
                if ui.add_enabled(file_menu.save, egui::Button::new("Save")).clicked() {
                    action = Some(UiAction::Save);
                    ui.close_menu();
                }
                if ui.add_enabled(file_menu.save_as, egui::Button::new("Save As…")).clicked() {
                    action = Some(UiAction::SaveAs);
                    ui.close_menu();
                }
                if ui.add_enabled(file_menu.close, egui::Button::new("Close")).clicked() {
                    action = Some(UiAction::Close);
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Exit").clicked() {
                    action = Some(UiAction::Exit);
                    ui.close_menu();
                }
            });

            ui.menu_button("Diagram", |ui| {
                ui.menu_button("New", |ui| {
                    for ty in DiagramType::ALL {
                        if ui.button(ty.label()).clicked() {
                            action = Some(UiAction::New(ty));
                            ui.close_menu();
                        }
                    }
                });
                let has_selection = selected.is_some();
                let has_image = selected.as_ref().is_some_and(|d| d.has_image());
                if ui.add_enabled(has_selection, egui::Button::new("Edit…")).clicked() {
                    action = selected.clone().map(UiAction::Edit);
                    ui.close_menu();
                }
                if ui.add_enabled(has_selection, egui::Button::new("Delete")).clicked() {
                    action = selected.clone().map(UiAction::Delete);
                    ui.close_menu();
                }
                ui.separator();
                if ui.add_enabled(has_image, egui::Button::new("Export Image…")).clicked() {
                    action = selected.clone().map(UiAction::ExportImage);
                    ui.close_menu();
                }
                if ui.add_enabled(has_image, egui::Button::new("Copy Image")).clicked() {
                    action = selected.clone().map(UiAction::CopyToClipboard);
                    ui.close_menu();
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    action = Some(UiAction::About);
                    ui.close_menu();
                }
            });

            if busy {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.spinner();
                    ui.label("Working…");
                });
            }
        });
    });

    if let Some(action) = action {
        app.request(action);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::diagram::Diagram;
    use crate::event::{AppEvent, EventKind};

    #[test]
    fn test_save_entries_follow_dirty_state() {
        let mut state = AppState::new();
        assert_eq!(
            FileMenu::for_state(&state),
            FileMenu {
                save: false,
                save_as: false,
                close: false
            }
        );

        state.apply(&AppEvent::new(EventKind::DiagramAdded(Diagram::new(DiagramType::Class, "c"))));
        assert_eq!(
            FileMenu::for_state(&state),
            FileMenu {
                save: false,
                save_as: true,
                close: true
            }
        );

        // Saved and unchanged: nothing to save, even with diagrams present
        state.apply(&AppEvent::new(EventKind::FileNameChanged(Some(PathBuf::from("/tmp/c.jsl")))));
        assert_eq!(
            FileMenu::for_state(&state),
            FileMenu {
                save: false,
                save_as: false,
                close: true
            }
        );

        state.apply(&AppEvent::new(EventKind::DiagramAdded(Diagram::new(DiagramType::Sequence, "s"))));
        assert_eq!(
            FileMenu::for_state(&state),
            FileMenu {
                save: true,
                save_as: true,
                close: true
            }
        );
    }
}
