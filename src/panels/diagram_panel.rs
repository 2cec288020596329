use eframe::egui;

use crate::app::{SchnizzleApp, UiAction};

/// The selected diagram's rendered image
pub fn diagram_panel(app: &mut SchnizzleApp, ctx: &egui::Context) {
    let selected = app.state().selected().cloned();
    let texture = selected
        .as_ref()
        .and_then(|diagram| app.textures_mut().texture_for(ctx, diagram));

    let mut action = None;
    egui::CentralPanel::default().show(ctx, |ui| {
        let Some(diagram) = selected else {
            ui.centered_and_justified(|ui| {
                ui.label("Select a diagram, or create one from the Diagram menu.");
            });
            return;
        };

        ui.horizontal(|ui| {
            ui.heading(diagram.name());
            ui.label(format!("({})", diagram.diagram_type()));
            if let Some(style) = diagram.style() {
                ui.weak(format!("style: {style}"));
            }
        });
        if let Some(note) = diagram.note() {
            ui.label(note);
        }

        ui.horizontal(|ui| {
            if ui.button("Edit…").clicked() {
                action = Some(UiAction::Edit(diagram.clone()));
            }
            if ui.button("Delete").clicked() {
                action = Some(UiAction::Delete(diagram.clone()));
            }
            let has_texture = texture.is_some();
            if ui.add_enabled(has_texture, egui::Button::new("Export Image…")).clicked() {
                action = Some(UiAction::ExportImage(diagram.clone()));
            }
            if ui.add_enabled(has_texture, egui::Button::new("Copy Image")).clicked() {
                action = Some(UiAction::CopyToClipboard(diagram.clone()));
            }
        });
        ui.separator();

        match &texture {
            Some(texture) => {
                egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
                    ui.add(egui::Image::new(texture).shrink_to_fit());
                });
            }
            None if diagram.has_image() => {
                ui.colored_label(ui.visuals().error_fg_color, "The diagram image could not be decoded.");
            }
            None => {
                ui.weak("Not rendered yet.");
            }
        }
    });

    if let Some(action) = action {
        app.request(action);
    }
}
