use eframe::egui;

use crate::app::SchnizzleApp;

pub fn console_panel(app: &SchnizzleApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("console_panel")
        .resizable(true)
        .default_height(120.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Console");
                if app.state().is_busy() {
                    ui.spinner();
                }
            });
            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in app.state().console() {
                        ui.label(egui::RichText::new(line).monospace());
                    }
                });
        });
}
