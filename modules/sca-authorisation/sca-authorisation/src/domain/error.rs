use sca_authorisation_sdk::{
    AuthorisationId, AuthorisationType, BackendError, ScaApproach, ScaError, StoreError,
};

/// Domain-layer errors for the SCA authorisation module.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("authorisation {0} not found")]
    AuthorisationNotFound(AuthorisationId),

    #[error("parent '{parent_id}' not found")]
    ParentNotFound {
        parent_id: String,
        authorisation_type: AuthorisationType,
    },

    #[error("authorisation {0} has no SCA approach recorded")]
    ApproachMissing(AuthorisationId),

    #[error("no authorisation service registered for SCA approach {0}")]
    ApproachNotRegistered(ScaApproach),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A state the processor never handles, reached through a defect.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A PSU-facing rejection decided by the processor.
    #[error(transparent)]
    Rejected(ScaError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

impl DomainError {
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Expected outcomes of PSU input, as opposed to defects or outages.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Rejected(_) | Self::AuthorisationNotFound(_) | Self::ParentNotFound { .. }
        )
    }
}

impl From<DomainError> for ScaError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::AuthorisationNotFound(id)
            | DomainError::Store(StoreError::NotFound(id)) => {
                Self::resource_unknown(format!("authorisation {id}"))
            }
            DomainError::ParentNotFound { parent_id, .. } => Self::resource_unknown(parent_id),
            DomainError::ApproachMissing(_)
            | DomainError::ApproachNotRegistered(_)
            | DomainError::Configuration(_)
            | DomainError::Unsupported(_) => Self::Internal,
            DomainError::Rejected(e) => e,
            DomainError::Store(StoreError::Conflict { id, .. }) => Self::Conflict {
                authorisation_id: id,
            },
            DomainError::Store(StoreError::Unavailable(message)) => Self::Technical { message },
            DomainError::Backend(e) => e.into(),
        }
    }
}

impl From<ScaError> for DomainError {
    fn from(e: ScaError) -> Self {
        Self::Rejected(e)
    }
}
