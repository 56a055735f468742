//! Dispatcher error types

use thiserror::Error;

/// Construction-time errors
///
/// Runtime failures never surface as errors; they end up in logs and metrics.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Bus client could not be created
    #[error("failed to create publish client: {0}")]
    ClientCreation(#[source] contracts::ContractError),

    /// Message template failed to compile
    #[error("invalid message template: {0}")]
    MessageTemplate(#[source] contracts::ContractError),

    /// Built outside of a Tokio runtime
    #[error("no tokio runtime available: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
}
