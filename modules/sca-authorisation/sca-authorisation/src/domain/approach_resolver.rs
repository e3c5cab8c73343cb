//! SCA approach resolution.
//!
//! The approach is picked once, when an authorisation is created, from the
//! bank's supported approaches and the TPP preference headers. Later calls
//! read the committed value back from the store.

use std::sync::Arc;

use sca_authorisation_sdk::{AuthorisationId, AuthorisationStore, ScaApproach};

use super::error::DomainError;

/// Non-empty, duplicate-free list of the approaches the bank supports, in
/// order of preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedApproaches {
    first: ScaApproach,
    rest: Vec<ScaApproach>,
}

impl SupportedApproaches {
    /// # Errors
    ///
    /// `Configuration` if `approaches` is empty.
    pub fn new(approaches: &[ScaApproach]) -> Result<Self, DomainError> {
        let (&first, tail) = approaches.split_first().ok_or_else(|| {
            DomainError::configuration("at least one SCA approach must be supported")
        })?;
        let mut rest: Vec<ScaApproach> = Vec::with_capacity(tail.len());
        for &approach in tail {
            if approach != first && !rest.contains(&approach) {
                rest.push(approach);
            }
        }
        Ok(Self { first, rest })
    }

    #[must_use]
    pub fn contains(&self, approach: ScaApproach) -> bool {
        self.first == approach || self.rest.contains(&approach)
    }

    pub fn iter(&self) -> impl Iterator<Item = ScaApproach> + '_ {
        std::iter::once(self.first).chain(self.rest.iter().copied())
    }

    /// Bank's own preferred approach.
    #[must_use]
    pub fn first(&self) -> ScaApproach {
        self.first
    }

    fn position(&self, approach: ScaApproach) -> Option<usize> {
        self.iter().position(|a| a == approach)
    }

    /// Pick the approach for a new authorisation.
    ///
    /// A single supported approach always wins. Otherwise a true decoupled
    /// preference selects decoupled, unless redirect is also preferred and
    /// the bank lists redirect first. Everything else falls back to redirect
    /// when supported, else to the bank's first choice.
    #[must_use]
    pub fn resolve(
        &self,
        redirect_preferred: Option<bool>,
        decoupled_preferred: Option<bool>,
    ) -> ScaApproach {
        if self.rest.is_empty() {
            return self.first;
        }

        let redirect = self.position(ScaApproach::Redirect);
        if decoupled_preferred == Some(true)
            && let Some(decoupled) = self.position(ScaApproach::Decoupled)
        {
            let redirect_wins_tie = redirect_preferred == Some(true)
                && redirect.is_some_and(|redirect| redirect < decoupled);
            if !redirect_wins_tie {
                return ScaApproach::Decoupled;
            }
        }

        if redirect.is_some() {
            ScaApproach::Redirect
        } else {
            self.first
        }
    }
}

/// Resolves the approach for new authorisations and looks up the committed
/// approach of existing ones.
pub struct ApproachResolver {
    supported: SupportedApproaches,
    store: Arc<dyn AuthorisationStore>,
}

impl ApproachResolver {
    #[must_use]
    pub fn new(supported: SupportedApproaches, store: Arc<dyn AuthorisationStore>) -> Self {
        Self { supported, store }
    }

    #[must_use]
    pub fn supported(&self) -> &SupportedApproaches {
        &self.supported
    }

    #[must_use]
    pub fn resolve(
        &self,
        redirect_preferred: Option<bool>,
        decoupled_preferred: Option<bool>,
    ) -> ScaApproach {
        let approach = self
            .supported
            .resolve(redirect_preferred, decoupled_preferred);
        tracing::debug!(
            sca_approach = %approach,
            ?redirect_preferred,
            ?decoupled_preferred,
            "resolved SCA approach"
        );
        approach
    }

    /// Committed approach of an existing authorisation.
    ///
    /// # Errors
    ///
    /// - `AuthorisationNotFound` if the store has no such record
    /// - `ApproachMissing` if the record carries no approach
    pub async fn approach_of(
        &self,
        authorisation_id: AuthorisationId,
    ) -> Result<ScaApproach, DomainError> {
        match self.store.get_sca_approach(authorisation_id).await {
            Ok(Some(approach)) => Ok(approach),
            Ok(None) => Err(DomainError::ApproachMissing(authorisation_id)),
            Err(sca_authorisation_sdk::StoreError::NotFound(id)) => {
                Err(DomainError::AuthorisationNotFound(id))
            }
            Err(e) => Err(e.into()),
        }
    }
}
