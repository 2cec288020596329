use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{CommandContext, PoolError, Reporter, TaskHandle};
use crate::diagram::Diagram;
use crate::error::{AppError, AppResult, ExportError};
use crate::event::EventKind;
use crate::export;
use crate::renderer::RendererRegistry;
use crate::state::{self, PersistenceError};

const SOURCE: &str = "command";

/// Brackets `job` with progress events and runs it on the pool. Errors the
/// job returns go to the console; `ProgressCompleted` is dispatched however
/// the job ends, including when it is skipped or never queued.
fn run_in_background<F>(ctx: &CommandContext, name: &'static str, job: F) -> AppResult<TaskHandle>
where
    F: FnOnce(&Reporter, &TaskHandle) -> AppResult<()> + Send + 'static,
{
    let reporter = ctx.reporter();
    reporter.dispatch(SOURCE, EventKind::ProgressStarted);

    let worker_reporter = reporter.clone();
    let submitted = ctx.pool.submit(name, move |handle| {
        let reporter = worker_reporter;
        let result = if handle.is_cancelled() {
            Err(PoolError::Cancelled.into())
        } else {
            job(&reporter, handle)
        };
        match result {
            Ok(()) => {}
            Err(AppError::Pool(PoolError::Cancelled)) => {
                log::info!("Task #{} '{}' cancelled", handle.id(), handle.name());
            }
            Err(err) => reporter.error(format!("Failed to {name}: {err}")),
        }
        reporter.dispatch(SOURCE, EventKind::ProgressCompleted);
    });

    submitted.map_err(|err| {
        reporter.error(format!("Failed to {name}: {err}"));
        reporter.dispatch(SOURCE, EventKind::ProgressCompleted);
        err.into()
    })
}

/// Creates (`original` is `None`) or edits a diagram. The draft is rendered
/// first when its script or style changed, and is only published once the
/// render succeeded.
pub fn submit_diagram(ctx: &CommandContext, draft: Diagram, original: Option<Diagram>) -> AppResult<TaskHandle> {
    let registry = Arc::clone(&ctx.registry);
    let name = if original.is_some() { "edit diagram" } else { "create diagram" };

    run_in_background(ctx, name, move |reporter, handle| {
        let diagram = render_if_needed(&registry, reporter, draft, original.as_ref(), handle)?;
        if original.is_some() {
            reporter.info(format!("Diagram '{}' modified.", diagram.name()));
            reporter.dispatch(SOURCE, EventKind::DiagramModified(diagram));
        } else {
            reporter.info(format!("Diagram '{}' created.", diagram.name()));
            reporter.dispatch(SOURCE, EventKind::DiagramAdded(diagram.clone()));
            reporter.dispatch(SOURCE, EventKind::SelectDiagram(diagram));
        }
        Ok(())
    })
}

fn render_if_needed(
    registry: &RendererRegistry,
    reporter: &Reporter,
    mut draft: Diagram,
    original: Option<&Diagram>,
    handle: &TaskHandle,
) -> AppResult<Diagram> {
    if !draft.needs_rendering(original) {
        log::debug!("Diagram '{}' unchanged, keeping its image", draft.name());
        return Ok(draft);
    }

    let renderer = registry.renderer_for_diagram(&draft)?;
    reporter.info(format!("Rendering diagram '{}'...", draft.name()));
    log::debug!("Using {} for '{}'", renderer.name(), draft.name());
    let rendered = renderer.render(&draft)?;

    // The user may have closed the window while the request was out
    if handle.is_cancelled() {
        return Err(PoolError::Cancelled.into());
    }
    draft.set_rendering(rendered.svg, rendered.image);
    reporter.info(format!("Diagram '{}' successfully rendered.", draft.name()));
    Ok(draft)
}

/// Removes `diagram` from the model. Runs synchronously.
pub fn delete_diagram(ctx: &CommandContext, diagram: Diagram) {
    let reporter = ctx.reporter();
    let name = diagram.name().to_owned();
    reporter.dispatch(SOURCE, EventKind::DiagramDeleted(diagram));
    reporter.info(format!("Diagram '{name}' deleted."));
}

/// Replaces the session with the diagrams stored at `path`. Every image is
/// decoded before anything is published, so a corrupt file leaves the model
/// as it was.
pub fn open(ctx: &CommandContext, path: PathBuf) -> AppResult<TaskHandle> {
    run_in_background(ctx, "open", move |reporter, handle| {
        let diagrams = state::load_diagrams(&path)?;
        for diagram in &diagrams {
            if handle.is_cancelled() {
                return Err(PoolError::Cancelled.into());
            }
            diagram.decode_image().map_err(|err| {
                PersistenceError::InvalidFile(format!("image of '{}' is unreadable: {err}", diagram.name()))
            })?;
        }

        let first = diagrams.first().cloned();
        let count = diagrams.len();
        reporter.dispatch(SOURCE, EventKind::DiagramDeleteAll);
        for diagram in diagrams {
            reporter.dispatch(SOURCE, EventKind::DiagramAdded(diagram));
        }
        if let Some(first) = first {
            reporter.dispatch(SOURCE, EventKind::SelectDiagram(first));
        }
        let path = canonical(&path);
        reporter.info(format!("Opened {} ({count} diagrams).", path.display()));
        reporter.dispatch(SOURCE, EventKind::FileNameChanged(Some(path)));
        Ok(())
    })
}

/// Writes `diagrams` to `path`, adding the `.jsl` extension when missing
pub fn save(ctx: &CommandContext, diagrams: Vec<Diagram>, path: PathBuf) -> AppResult<TaskHandle> {
    run_in_background(ctx, "save", move |reporter, _handle| {
        let written = canonical(&state::save_diagrams(&path, diagrams)?);
        reporter.info(format!("Saved {}.", written.display()));
        reporter.dispatch(SOURCE, EventKind::FileNameChanged(Some(written)));
        Ok(())
    })
}

/// Empties the session and forgets its file. Runs synchronously.
pub fn close(ctx: &CommandContext) {
    let reporter = ctx.reporter();
    reporter.dispatch(SOURCE, EventKind::ProgressStarted);
    reporter.dispatch(SOURCE, EventKind::DiagramDeleteAll);
    reporter.dispatch(SOURCE, EventKind::FileNameChanged(None));
    reporter.dispatch(SOURCE, EventKind::ProgressCompleted);
}

pub fn export_image(ctx: &CommandContext, diagram: Diagram, path: PathBuf) -> AppResult<TaskHandle> {
    run_in_background(ctx, "export image", move |reporter, _handle| {
        let written = export::export_image(&diagram, &path)?;
        reporter.info(format!("Exported '{}' to {}.", diagram.name(), written.display()));
        Ok(())
    })
}

/// Puts the diagram's raster on the clipboard
pub fn copy_to_clipboard(ctx: &CommandContext, diagram: &Diagram) -> AppResult<()> {
    let reporter = ctx.reporter();
    let result = ctx
        .clipboard
        .as_ref()
        .ok_or_else(|| ExportError::Clipboard("no clipboard attached".to_owned()))
        .and_then(|clipboard| {
            let image = diagram
                .decode_image()?
                .ok_or_else(|| ExportError::NoImage(diagram.name().to_owned()))?;
            clipboard.set_image(&image)
        });

    match result {
        Ok(()) => {
            reporter.info(format!("Copied '{}' to the clipboard.", diagram.name()));
            Ok(())
        }
        Err(err) => {
            reporter.error(format!("Failed to copy to clipboard: {err}"));
            Err(err.into())
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|err| {
        log::warn!("Could not canonicalize {}: {err}", path.display());
        path.to_path_buf()
    })
}
