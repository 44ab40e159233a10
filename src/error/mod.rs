//! Error handling for the agent desk.
//!
//! Collaborator seams carry their own error types (`HttpError`, `ChatError`,
//! `WorkItemError`, `AgentError`); `DeskError` is what service commands
//! return to the UI layer. Registry mutations never fail: an unknown thread
//! id is a logged no-op there.
//!
//! | Variant | Category | Local state changed |
//! |---------|----------|---------------------|
//! | ThreadNotFound | User | No |
//! | ExternalPersist | Network/Server/Client | No |
//! | Transport | Network/Server/Client | No |
//! | StatusUpdateInFlight | User | No |
//! | Agent | Network/Server/Client | No |
//! | Config | Configuration | No |

mod category;

pub use category::ErrorCategory;

use thiserror::Error;

use crate::agent::AgentError;
use crate::traits::{ChatError, WorkItemError};

/// Result alias for service commands.
pub type DeskResult<T> = Result<T, DeskError>;

/// Errors surfaced to callers of the desk service.
#[derive(Debug, Error)]
pub enum DeskError {
    /// The command referenced a thread the registry does not know
    #[error("Thread {0} not found")]
    ThreadNotFound(String),

    /// The work-item store rejected or failed the status write
    #[error("Failed to persist status of thread {thread_id}: {source}")]
    ExternalPersist {
        thread_id: String,
        #[source]
        source: WorkItemError,
    },

    /// Listing threads from the chat transport failed
    #[error("Failed to fetch threads: {0}")]
    Transport(#[from] ChatError),

    /// Another status write for the same thread has not completed yet
    #[error("A status update for thread {0} is already in flight")]
    StatusUpdateInFlight(String),

    /// Resolving the agent identity, endpoint, or token failed
    #[error("Agent bootstrap failed: {0}")]
    Agent(#[from] AgentError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DeskError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DeskError::ThreadNotFound(_) | DeskError::StatusUpdateInFlight(_) => {
                ErrorCategory::User
            }
            DeskError::ExternalPersist { source, .. } => source.category(),
            DeskError::Transport(err) => err.category(),
            DeskError::Agent(err) => err.category(),
            DeskError::Config(_) => ErrorCategory::Configuration,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            DeskError::ThreadNotFound(_) => "E_THREAD_NOT_FOUND",
            DeskError::ExternalPersist { .. } => "E_PERSIST",
            DeskError::Transport(_) => "E_TRANSPORT",
            DeskError::StatusUpdateInFlight(_) => "E_IN_FLIGHT",
            DeskError::Agent(_) => "E_AGENT",
            DeskError::Config(_) => "E_CONFIG",
        }
    }
}
