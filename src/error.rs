//! Error types for the statements pipeline.
//!
//! Application plumbing uses `anyhow` with context strings. Pipeline stages that need a named
//! failure class (so the orchestrator can decide what to skip and what to abandon) use
//! `StageError`.

use thiserror::Error;

pub type Error = anyhow::Error;
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A failure in one stage of the statement pipeline.
///
/// The variants carry the skip/continue policy: `Fetch` and `Parse` skip a single data file,
/// `Render` and `Document` abandon the customer, `Sink` and `Delivery` are logged and the run
/// moves on. Nothing here aborts the whole run.
#[derive(Debug, Error)]
pub enum StageError {
    /// A data file could not be downloaded from the object store.
    #[error("failed to fetch '{key}': {source:#}")]
    Fetch { key: String, source: Error },

    /// A downloaded data file could not be read as parquet.
    #[error("failed to parse '{key}': {source:#}")]
    Parse { key: String, source: Error },

    /// The statement document could not be rendered.
    #[error("failed to render statement for customer '{customer}': {source:#}")]
    Render { customer: String, source: Error },

    /// The rendered document could not be password protected.
    #[error("failed to protect statement for customer '{customer}': {source:#}")]
    Document { customer: String, source: Error },

    /// The protected statement could not be uploaded. Delivery is still attempted.
    #[error("failed to upload '{key}': {source:#}")]
    Sink { key: String, source: Error },

    /// The statement email could not be sent.
    #[error("failed to deliver statement for customer '{customer}': {source:#}")]
    Delivery { customer: String, source: Error },
}
