use eframe::egui;

use crate::app::{SchnizzleApp, UiAction};
use crate::diagram::DiagramType;

/// Diagram definitions grouped by type
pub fn definitions_panel(app: &mut SchnizzleApp, ctx: &egui::Context) {
    let mut action = None;

    egui::SidePanel::left("definitions_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Diagrams");
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                let model = &app.state().model;
                let selected = model.selected().map(|d| d.id());

                for ty in DiagramType::ALL {
                    let diagrams = model.diagrams(ty);
                    egui::CollapsingHeader::new(format!("{} ({})", ty.label(), diagrams.len()))
                        .id_salt(ty)
                        .default_open(true)
                        .show(ui, |ui| {
                            for diagram in diagrams {
                                let mut response =
                                    ui.selectable_label(selected == Some(diagram.id()), diagram.name());
                                if let Some(note) = diagram.note() {
                                    response = response.on_hover_text(note);
                                }
                                if response.double_clicked() {
                                    action = Some(UiAction::Edit(diagram.clone()));
                                } else if response.clicked() {
                                    action = Some(UiAction::Select(diagram.id()));
                                }
                                response.context_menu(|ui| {
                                    if ui.button("Edit…").clicked() {
                                        action = Some(UiAction::Edit(diagram.clone()));
                                        ui.close_menu();
                                    }
                                    if ui.button("Delete").clicked() {
                                        action = Some(UiAction::Delete(diagram.clone()));
                                        ui.close_menu();
                                    }
                                });
                            }
                            if ui.small_button(format!("New {} diagram…", ty.label())).clicked() {
                                action = Some(UiAction::New(ty));
                            }
                        });
                }
            });
        });

    if let Some(action) = action {
        app.request(action);
    }
}
