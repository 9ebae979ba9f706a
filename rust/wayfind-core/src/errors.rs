use thiserror::Error;

/// Hard failures of the graph layer. Per-search outcomes ("no route", "no
/// nearby node", cancellation) are returned as data in `PathfindingResult`,
/// never as errors.
#[derive(Error, Debug)]
pub enum GraphError {
    /// No spatial-model snapshot has been supplied for the requested version.
    #[error("no spatial model snapshot loaded for version {0}")]
    ModelUnavailable(u64),
}
