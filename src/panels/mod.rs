mod console_panel;
mod definitions_panel;
mod diagram_panel;
pub mod dialogs;
mod menu_bar;

pub use console_panel::console_panel;
pub use definitions_panel::definitions_panel;
pub use diagram_panel::diagram_panel;
pub use menu_bar::menu_bar;
