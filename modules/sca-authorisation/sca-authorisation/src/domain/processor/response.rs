use sca_authorisation_sdk::{
    Authorisation, AuthorisationPatch, AuthorisationType, BusinessObject, ChallengeData,
    ExecutionResult, PsuIdData, ScaApproach, ScaError, ScaMethod, ScaStatus,
    UpdateAuthorisationRequest,
};

/// Input of one processor step.
///
/// `authorisation` is the record as read at the start of the call.
#[derive(Debug, Clone, Copy)]
pub struct ProcessorRequest<'a> {
    pub approach: ScaApproach,
    pub authorisation: &'a Authorisation,
    pub update: &'a UpdateAuthorisationRequest,
    pub object: &'a BusinessObject,
}

/// Outcome of one processor step.
///
/// Carries the status to persist even when `error` is set: a rejection that
/// leaves the status unchanged persists nothing, a rejection that fails the
/// authorisation persists `FAILED`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorResponse {
    pub sca_status: ScaStatus,
    pub sca_approach: ScaApproach,
    /// Identity learned during this step.
    pub psu_data: Option<PsuIdData>,
    /// Methods newly offered to the PSU.
    pub available_sca_methods: Option<Vec<ScaMethod>>,
    pub chosen_sca_method: Option<ScaMethod>,
    pub challenge_data: Option<ChallengeData>,
    pub psu_message: Option<String>,
    /// Set when the protected operation was executed in this step.
    pub execution: Option<ExecutionResult>,
    pub error: Option<ScaError>,
}

impl ProcessorResponse {
    #[must_use]
    pub fn transition(sca_status: ScaStatus, sca_approach: ScaApproach) -> Self {
        Self {
            sca_status,
            sca_approach,
            psu_data: None,
            available_sca_methods: None,
            chosen_sca_method: None,
            challenge_data: None,
            psu_message: None,
            execution: None,
            error: None,
        }
    }

    /// Rejection that leaves the stored record untouched.
    #[must_use]
    pub fn rejected(request: &ProcessorRequest<'_>, error: ScaError) -> Self {
        Self {
            error: Some(error),
            ..Self::transition(request.authorisation.sca_status, request.approach)
        }
    }

    /// Rejection that ends the flow in `FAILED`.
    #[must_use]
    pub fn failed(request: &ProcessorRequest<'_>, error: ScaError) -> Self {
        Self {
            error: Some(error),
            ..Self::transition(ScaStatus::Failed, request.approach)
        }
    }

    #[must_use]
    pub fn with_psu_data(mut self, psu_data: PsuIdData) -> Self {
        self.psu_data = Some(psu_data);
        self
    }

    #[must_use]
    pub fn with_available_methods(mut self, methods: Vec<ScaMethod>) -> Self {
        self.available_sca_methods = Some(methods);
        self
    }

    #[must_use]
    pub fn with_chosen_method(mut self, method: ScaMethod) -> Self {
        self.chosen_sca_method = Some(method);
        self
    }

    #[must_use]
    pub fn with_challenge(mut self, challenge: Option<ChallengeData>) -> Self {
        self.challenge_data = challenge;
        self
    }

    #[must_use]
    pub fn with_psu_message(mut self, message: Option<String>) -> Self {
        self.psu_message = message;
        self
    }

    #[must_use]
    pub fn with_execution(mut self, execution: ExecutionResult) -> Self {
        if self.psu_message.is_none() {
            self.psu_message.clone_from(&execution.psu_message);
        }
        self.execution = Some(execution);
        self
    }

    /// Fold an earlier partial response (identity, offered methods) into this one.
    #[must_use]
    pub fn merged_with(mut self, earlier: Self) -> Self {
        if self.psu_data.is_none() {
            self.psu_data = earlier.psu_data;
        }
        if self.available_sca_methods.is_none() {
            self.available_sca_methods = earlier.available_sca_methods;
        }
        self
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The parent payment must be flagged for further PSUs' authorisation.
    #[must_use]
    pub fn multilevel_sca_required(&self, authorisation_type: AuthorisationType) -> bool {
        authorisation_type == AuthorisationType::PaymentCreation
            && self
                .execution
                .as_ref()
                .is_some_and(|e| e.transaction_status.is_partially_authorised())
    }

    /// Fields to persist for this step, guarded by the status read at the
    /// start of the call. `None` when nothing changes.
    #[must_use]
    pub fn to_patch(&self, before: &Authorisation) -> Option<AuthorisationPatch> {
        if self.is_error() && self.sca_status == before.sca_status {
            return None;
        }

        let patch = AuthorisationPatch {
            expected_status: Some(before.sca_status),
            sca_status: (self.sca_status != before.sca_status).then_some(self.sca_status),
            sca_approach: (before.sca_approach != Some(self.sca_approach))
                .then_some(self.sca_approach),
            psu_data: self
                .psu_data
                .clone()
                .filter(|p| before.psu_data.as_ref() != Some(p)),
            chosen_sca_method: self.chosen_sca_method.clone(),
            available_sca_methods: self.available_sca_methods.clone(),
            challenge_data: self.challenge_data.clone(),
        };
        (!patch.is_empty()).then_some(patch)
    }
}
