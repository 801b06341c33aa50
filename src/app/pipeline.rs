//! Shared "view pipeline" logic used by the CLI commands.
//!
//! load sources (all-or-nothing) -> build dashboard view

use tracing::info;

use crate::data::{Dataset, LoadState, Loader, SourceReader};
use crate::domain::{SourceId, ViewConfig};
use crate::error::AppError;
use crate::report::DashboardView;

/// All computed outputs of a single `covid view` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub dataset: Dataset,
    pub view: DashboardView,
}

/// Run one load attempt; a failed attempt becomes an exit-code-2 error.
pub fn load(reader: &dyn SourceReader, sources: &[SourceId]) -> Result<Dataset, AppError> {
    let mut loader = Loader::new();
    if let LoadState::Failed(message) = loader.load(reader, sources) {
        return Err(AppError::new(2, message.clone()));
    }
    loader
        .into_dataset()
        .ok_or_else(|| AppError::new(2, "Load finished without a dataset."))
}

/// Load the requested sources and build the view selected by `config`.
pub fn run_view(reader: &dyn SourceReader, sources: &[SourceId], config: &ViewConfig) -> Result<RunOutput, AppError> {
    let dataset = load(reader, sources)?;
    let view = DashboardView::build(&dataset, config)?;
    info!(date = %view.date, index = view.index, "built dashboard view");
    Ok(RunOutput { dataset, view })
}
