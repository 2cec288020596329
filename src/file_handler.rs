use std::path::{Path, PathBuf};

use eframe::egui;

use crate::command::Command;
use crate::state::FILE_EXTENSION;

/// Turns diagram files dropped onto the window into `Open` commands
#[derive(Debug, Default)]
pub struct FileHandler {
    dropped: Vec<PathBuf>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects files dropped this frame. Returns true if any were dropped.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        let any = !dropped.is_empty();
        self.dropped.extend(dropped);
        any
    }

    /// Paths queued so far, cleared by [`FileHandler::take_command`]
    pub fn pending(&self) -> &[PathBuf] {
        &self.dropped
    }

    /// One `Open` for the last diagram file dropped. Opening replaces the
    /// session, so earlier files in the same drop would be lost anyway.
    pub fn take_command(&mut self) -> Option<Command> {
        let dropped = std::mem::take(&mut self.dropped);
        for path in &dropped {
            if !is_diagram_file(path) {
                log::warn!("Dropped file is not a diagram file: {}", path.display());
            }
        }
        dropped.into_iter().rfind(|path| is_diagram_file(path)).map(Command::Open)
    }

    /// Shows a hint while files hover over the window
    pub fn preview_hovering(&self, ctx: &egui::Context) {
        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        if !hovering {
            return;
        }
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("file_drop_target"),
        ));
        let screen = ctx.screen_rect();
        painter.rect_filled(screen, 0.0, egui::Color32::from_black_alpha(160));
        painter.text(
            screen.center(),
            egui::Align2::CENTER_CENTER,
            format!("Drop a .{FILE_EXTENSION} file to open it"),
            egui::TextStyle::Heading.resolve(&ctx.style()),
            egui::Color32::WHITE,
        );
    }
}

pub fn is_diagram_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(FILE_EXTENSION))
}
