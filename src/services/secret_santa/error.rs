use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SecretSantaError {
    #[error("Need at least 2 giving units for Secret Santa, found {units}")]
    InsufficientParticipants { units: usize },

    #[error("Could not generate a valid Secret Santa assignment after {attempts} attempts")]
    MatchExhausted { attempts: u32 },

    #[error("Failed to save Secret Santa assignments: {0}")]
    PersistenceFailure(#[source] anyhow::Error),

    #[error("Failed to load Secret Santa participants: {0}")]
    LoadFailure(#[source] anyhow::Error),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(Uuid),
}

impl SecretSantaError {
    /// Stable identifier surfaced to API clients alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            SecretSantaError::InsufficientParticipants { .. } => "insufficient_participants",
            SecretSantaError::MatchExhausted { .. } => "match_exhausted",
            SecretSantaError::PersistenceFailure(_) => "persistence_failure",
            SecretSantaError::LoadFailure(_) => "load_failure",
            SecretSantaError::ParticipantNotFound(_) => "participant_not_found",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SecretSantaError::InsufficientParticipants { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            SecretSantaError::MatchExhausted { .. } => StatusCode::CONFLICT,
            SecretSantaError::PersistenceFailure(_) | SecretSantaError::LoadFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            SecretSantaError::ParticipantNotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

pub type SecretSantaResult<T> = Result<T, SecretSantaError>;
