//! Exit code logic for the asset-preview process.
//!
//! Single responsibility: map downloaded/failed counts to the process exit outcome.

use crate::ProcessExit;

/// Determines the process exit outcome from downloaded and failed asset counts.
///
/// Skipped assets count as neither; a run with nothing to do succeeds.
pub(crate) fn determine_exit_outcome(downloaded: usize, failed: usize) -> ProcessExit {
    if failed == 0 {
        ProcessExit::Success
    } else if downloaded > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}
