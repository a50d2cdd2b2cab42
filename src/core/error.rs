use thiserror::Error;

use super::diagnostics::Diagnostics;

/// Errors that can occur around a conversion run.
///
/// Findings about the document itself are never raised as errors; they are
/// collected as [`Diagnostic`](super::Diagnostic) values. This type covers
/// API misuse and the final accept/reject decision.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// The consistency pre-check failed, no target document was produced.
    #[error("pre-check failed with {} error(s)", .0.error_count())]
    PreCheck(Diagnostics),

    /// The target document was produced but at least one ERROR was recorded.
    #[error("conversion rejected with {} error(s)", .0.error_count())]
    Rejected(Diagnostics),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// Settings could not be parsed.
    #[error("settings error: {0}")]
    Settings(String),
}

impl ConvertError {
    /// Diagnostics attached to a failed conversion, if any.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::PreCheck(d) | Self::Rejected(d) => Some(d),
            Self::Builder(_) | Self::Settings(_) => None,
        }
    }
}
