mod app_state;
mod persistence;

pub use app_state::AppState;
pub use persistence::{
    DiagramFile,
    FILE_EXTENSION,
    PersistenceError,
    PersistenceResult,
    load_diagrams,
    save_diagrams,
    with_file_extension,
};
