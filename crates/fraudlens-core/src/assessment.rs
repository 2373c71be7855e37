//! Risk assessment workflow
//!
//! ```text
//! Editing --submit(invalid)--> Editing + field errors
//! Editing --submit(valid)----> Submitting --ok-----> Result
//!                                         --error--> Editing + notice
//! any     --reset------------> Editing (empty draft)
//! ```

use fraudlens_client::{
    Category, ClientError, ClientResult, RiskAssessmentResult, ScoringClientRef, ScoringRequest,
};
use fraudlens_config::Config;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::{AssessmentError, CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::inflight::{RequestTicket, RequestTracker};
use crate::models::{FormField, FormState};
use crate::risk::{AssessedTransaction, RiskTier};
use crate::validation::{build_request, validate, ValidationErrors};

pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "result", rename_all = "snake_case")]
pub enum AssessmentState {
    Editing,
    Submitting,
    Result(Box<AssessedTransaction>),
}

impl AssessmentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentState::Editing => "editing",
            AssessmentState::Submitting => "submitting",
            AssessmentState::Result(_) => "result",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            AssessmentState::Editing => "editing",
            AssessmentState::Submitting => "submitting",
            AssessmentState::Result(_) => "showing a result",
        }
    }
}

/// How a submission ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Local validation failed; nothing was sent
    Rejected { errors: ValidationErrors },
    Assessed { tier: RiskTier },
    Failed { error: AssessmentError },
    /// A newer submission or a reset happened first
    Superseded,
}

/// Result of the synchronous half of a submission
#[derive(Debug)]
pub enum PreparedSubmission {
    /// Send `request` to the scoring collaborator
    Ready {
        ticket: RequestTicket,
        request: ScoringRequest,
    },
    /// Nothing to send
    Finished(SubmitOutcome),
}

pub struct RiskAssessmentViewModel {
    client: ScoringClientRef,
    form: FormState,
    field_errors: ValidationErrors,
    state: AssessmentState,
    submission_error: Option<AssessmentError>,
    submit_timeout: Duration,
    requests: RequestTracker,
}

impl RiskAssessmentViewModel {
    pub fn new(client: ScoringClientRef) -> Self {
        Self {
            client,
            form: FormState::default(),
            field_errors: ValidationErrors::default(),
            state: AssessmentState::Editing,
            submission_error: None,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            requests: RequestTracker::new(),
        }
    }

    pub fn from_config(client: ScoringClientRef, config: &Config) -> Self {
        Self::new(client).with_submit_timeout(config.timeouts.scoring())
    }

    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    /// Set one field of the draft and clear its inline error
    ///
    /// Editing is allowed while a submission is in flight, but not while a
    /// verdict is shown.
    pub fn update_field(&mut self, field: FormField, value: impl Into<String>) -> CoreResult<()> {
        if let AssessmentState::Result(_) = self.state {
            return Err(self.invalid_state("edit the form"));
        }

        let value = value.into();
        match field {
            FormField::Amount => self.form.amount = value,
            FormField::Sender => self.form.sender = value,
            FormField::Receiver => self.form.receiver = value,
            FormField::Timestamp => self.form.timestamp = value,
            FormField::Description => {
                self.form.description = if value.is_empty() { None } else { Some(value) };
            }
            FormField::Category => {
                self.form.category = value.parse::<Category>().map_err(|message| {
                    CoreError::InvalidField {
                        field: field.to_string(),
                        message,
                    }
                })?;
            }
        }
        self.field_errors.remove(field);
        Ok(())
    }

    /// Validate the current draft without changing state
    pub fn validate(&self) -> ValidationErrors {
        validate(&self.form)
    }

    /// Validate, normalise and issue a ticket
    ///
    /// Anything that can be decided locally finishes here without touching
    /// the network.
    pub fn begin_submit(&mut self) -> CoreResult<PreparedSubmission> {
        if let AssessmentState::Result(_) = self.state {
            return Err(self.invalid_state("submit"));
        }

        let errors = self.validate();
        if !errors.is_empty() {
            log::debug!("Submission rejected: {} invalid fields", errors.len());
            self.field_errors = errors.clone();
            return Ok(PreparedSubmission::Finished(SubmitOutcome::Rejected { errors }));
        }
        self.field_errors.clear();

        let request = match build_request(&self.form) {
            Ok(request) => request,
            Err(message) => {
                // nothing in flight should land on top of a local failure
                self.requests.invalidate();
                let error = AssessmentError::UnknownClientError { message };
                self.fail(&error, None);
                return Ok(PreparedSubmission::Finished(SubmitOutcome::Failed { error }));
            }
        };

        let ticket = self.requests.issue();
        self.submission_error = None;
        self.state = AssessmentState::Submitting;
        log::debug!(
            "Submitting {} -> {} for scoring (request {})",
            request.sender,
            request.receiver,
            ticket.generation()
        );
        Ok(PreparedSubmission::Ready { ticket, request })
    }

    /// Apply the scoring response tagged with `ticket`
    pub fn finish_submit(
        &mut self,
        ticket: RequestTicket,
        request: ScoringRequest,
        result: ClientResult<RiskAssessmentResult>,
    ) -> SubmitOutcome {
        if !self.requests.settle(&ticket) {
            log::debug!("Dropping stale scoring response (request {})", ticket.generation());
            return SubmitOutcome::Superseded;
        }

        let verdict = result.and_then(|verdict| {
            verdict
                .validate()
                .map(|_| verdict)
                .map_err(|message| ClientError::InvalidResponse { message })
        });

        match verdict {
            Ok(verdict) => {
                let assessed = AssessedTransaction::new(request, verdict);
                let tier = assessed.tier();
                log::info!(
                    "Transaction scored {:.2} ({} risk, request {})",
                    assessed.verdict.fraud_score,
                    tier,
                    ticket.generation()
                );
                self.state = AssessmentState::Result(Box::new(assessed));
                SubmitOutcome::Assessed { tier }
            }
            Err(e) => {
                let error = AssessmentError::classify(&e);
                self.fail(&error, Some(ticket));
                SubmitOutcome::Failed { error }
            }
        }
    }

    pub async fn submit(&mut self) -> CoreResult<SubmitOutcome> {
        match self.begin_submit()? {
            PreparedSubmission::Finished(outcome) => Ok(outcome),
            PreparedSubmission::Ready { ticket, request } => {
                let result = score_bounded(self.client.clone(), request.clone(), self.submit_timeout).await;
                Ok(self.finish_submit(ticket, request, result))
            }
        }
    }

    /// Submit through a shared handle without holding the lock across the
    /// scoring call
    ///
    /// The scoring call and `finish_submit` run together in their own task,
    /// so the verdict is applied even if the caller stops waiting.
    pub async fn submit_shared(this: &Arc<RwLock<Self>>) -> CoreResult<SubmitOutcome> {
        let (ticket, request, client, bound) = {
            let mut vm = this.write().await;
            match vm.begin_submit()? {
                PreparedSubmission::Finished(outcome) => return Ok(outcome),
                PreparedSubmission::Ready { ticket, request } => {
                    (ticket, request, vm.client.clone(), vm.submit_timeout)
                }
            }
        };

        let task = tokio::spawn({
            let shared = Arc::clone(this);
            let request = request.clone();
            async move {
                let result = score_bounded(client, request.clone(), bound).await;
                shared.write().await.finish_submit(ticket, request, result)
            }
        });
        this.write().await.requests.attach(&ticket, task.abort_handle());

        match task.await {
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_cancelled() => {
                log::debug!("Scoring request {} was aborted", ticket.generation());
                Ok(SubmitOutcome::Superseded)
            }
            Err(e) => {
                let result = Err(ClientError::Request { message: e.to_string() });
                Ok(this.write().await.finish_submit(ticket, request, result))
            }
        }
    }

    /// Back to an empty draft. In-flight submissions are abandoned.
    pub fn reset(&mut self) {
        self.requests.invalidate();
        self.form = FormState::default();
        self.field_errors.clear();
        self.submission_error = None;
        self.state = AssessmentState::Editing;
    }

    pub fn dismiss_error(&mut self) {
        self.submission_error = None;
    }

    fn fail(&mut self, error: &AssessmentError, ticket: Option<RequestTicket>) {
        let mut context = ErrorContext::new("submit_assessment");
        if let Some(ticket) = ticket {
            context = context.with_request(ticket.generation());
        }
        DefaultErrorLogger.log_failure(error, &context);
        self.submission_error = Some(error.clone());
        self.state = AssessmentState::Editing;
    }

    fn invalid_state(&self, operation: &str) -> CoreError {
        CoreError::InvalidState {
            operation: operation.to_string(),
            state: self.state.describe().to_string(),
        }
    }

    // ==================== Accessors ====================

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn field_errors(&self) -> &ValidationErrors {
        &self.field_errors
    }

    pub fn state(&self) -> &AssessmentState {
        &self.state
    }

    pub fn submission_error(&self) -> Option<&AssessmentError> {
        self.submission_error.as_ref()
    }

    pub fn result(&self) -> Option<&AssessedTransaction> {
        match &self.state {
            AssessmentState::Result(assessed) => Some(&**assessed),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.state == AssessmentState::Submitting
    }
}

async fn score_bounded(
    client: ScoringClientRef,
    request: ScoringRequest,
    bound: Duration,
) -> ClientResult<RiskAssessmentResult> {
    match tokio::time::timeout(bound, client.score(&request)).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fraudlens_client::ScoringClient;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Returns a fixed answer and records what it was sent
    struct FixedScoring {
        answer: ClientResult<RiskAssessmentResult>,
        seen: Mutex<Vec<ScoringRequest>>,
    }

    impl FixedScoring {
        fn new(answer: ClientResult<RiskAssessmentResult>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ScoringClient for FixedScoring {
        async fn score(&self, request: &ScoringRequest) -> ClientResult<RiskAssessmentResult> {
            self.seen.lock().unwrap().push(request.clone());
            self.answer.clone()
        }
    }

    struct HangingScoring;

    #[async_trait]
    impl ScoringClient for HangingScoring {
        async fn score(&self, _request: &ScoringRequest) -> ClientResult<RiskAssessmentResult> {
            std::future::pending().await
        }
    }

    /// First call waits for the gate, later calls answer low risk
    struct GatedScoring {
        gate: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ScoringClient for GatedScoring {
        async fn score(&self, _request: &ScoringRequest) -> ClientResult<RiskAssessmentResult> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.gate.notified().await;
                Ok(verdict(true, 0.95))
            } else {
                Ok(verdict(false, 0.1))
            }
        }
    }

    fn verdict(is_fraud: bool, fraud_score: f64) -> RiskAssessmentResult {
        RiskAssessmentResult {
            is_fraud,
            fraud_score,
            risk_factors: None,
            recommendation: None,
        }
    }

    fn fill(vm: &mut RiskAssessmentViewModel) {
        vm.update_field(FormField::Amount, "500").unwrap();
        vm.update_field(FormField::Sender, "a@bank").unwrap();
        vm.update_field(FormField::Receiver, "b@bank").unwrap();
        vm.update_field(FormField::Timestamp, "2024-06-01T10:00").unwrap();
    }

    #[tokio::test]
    async fn test_end_to_end_high_risk() {
        let client = FixedScoring::new(Ok(RiskAssessmentResult {
            is_fraud: true,
            fraud_score: 0.91,
            risk_factors: Some(vec!["unusual amount".to_string()]),
            recommendation: Some("block".to_string()),
        }));
        let mut vm = RiskAssessmentViewModel::new(client.clone());
        fill(&mut vm);

        let outcome = vm.submit().await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Assessed { tier: RiskTier::High });

        let result = vm.result().unwrap();
        assert_eq!(result.tier(), RiskTier::High);
        assert_eq!(result.verdict.risk_factors(), &["unusual amount".to_string()]);
        assert_eq!(result.verdict.recommendation.as_deref(), Some("block"));
        assert_eq!(result.request.amount, 500.0);

        let sent = client.seen.lock().unwrap()[0].clone();
        assert_eq!(sent.amount, 500.0);
        assert!(sent.timestamp.ends_with(".000Z"));
        assert_eq!(sent.category, Some(Category::Personal));
    }

    #[tokio::test]
    async fn test_invalid_draft_never_hits_network() {
        let client = FixedScoring::new(Ok(verdict(false, 0.1)));
        let mut vm = RiskAssessmentViewModel::new(client.clone());
        vm.update_field(FormField::Amount, "-5").unwrap();

        let outcome = vm.submit().await.unwrap();
        match outcome {
            SubmitOutcome::Rejected { errors } => assert_eq!(errors.len(), 4),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(client.calls(), 0);
        assert_eq!(vm.state(), &AssessmentState::Editing);
        assert!(vm.field_errors().get(FormField::Amount).is_some());

        vm.update_field(FormField::Amount, "5").unwrap();
        assert!(vm.field_errors().get(FormField::Amount).is_none());
        assert!(vm.field_errors().get(FormField::Sender).is_some());
    }

    #[tokio::test]
    async fn test_bad_time_is_a_request_error() {
        let client = FixedScoring::new(Ok(verdict(false, 0.1)));
        let mut vm = RiskAssessmentViewModel::new(client.clone());
        fill(&mut vm);
        vm.update_field(FormField::Timestamp, "tomorrow-ish").unwrap();

        let outcome = vm.submit().await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
        assert_eq!(
            vm.submission_error().unwrap().user_message(),
            "Request error: Invalid time value"
        );
        assert_eq!(client.calls(), 0);
        assert_eq!(vm.form().timestamp, "tomorrow-ish");
    }

    #[tokio::test]
    async fn test_server_error_preserves_draft() {
        let client = FixedScoring::new(Err(ClientError::Server {
            status: 400,
            message: Some("amount too large".to_string()),
        }));
        let mut vm = RiskAssessmentViewModel::new(client);
        fill(&mut vm);

        let outcome = vm.submit().await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
        assert_eq!(vm.state(), &AssessmentState::Editing);
        assert_eq!(vm.form().amount, "500");
        assert_eq!(
            vm.submission_error().unwrap().user_message(),
            "Server error: amount too large"
        );

        vm.dismiss_error();
        assert!(vm.submission_error().is_none());
        assert_eq!(vm.form().sender, "a@bank");
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_rejected() {
        let client = FixedScoring::new(Ok(verdict(true, 1.7)));
        let mut vm = RiskAssessmentViewModel::new(client);
        fill(&mut vm);

        let outcome = vm.submit().await.unwrap();
        match outcome {
            SubmitOutcome::Failed { error } => {
                assert!(matches!(error, AssessmentError::UnknownClientError { .. }))
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(vm.result().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_times_out() {
        let mut vm = RiskAssessmentViewModel::new(Arc::new(HangingScoring));
        fill(&mut vm);

        let outcome = vm.submit().await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Failed { error: AssessmentError::NetworkTimeout });
        assert_eq!(
            vm.submission_error().unwrap().user_message(),
            "The server took too long to respond. Please try again."
        );
        assert_eq!(vm.form().receiver, "b@bank");
    }

    #[tokio::test]
    async fn test_result_is_terminal_until_reset() {
        let client = FixedScoring::new(Ok(verdict(false, 0.3)));
        let mut vm = RiskAssessmentViewModel::new(client);
        fill(&mut vm);
        vm.submit().await.unwrap();
        assert_eq!(vm.result().unwrap().tier(), RiskTier::Low);

        let err = vm.update_field(FormField::Amount, "1").unwrap_err();
        assert_eq!(err.to_string(), "Cannot edit the form while showing a result");
        assert!(vm.submit().await.is_err());

        vm.reset();
        assert_eq!(vm.state(), &AssessmentState::Editing);
        assert!(vm.update_field(FormField::Amount, "1").is_ok());
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let client = FixedScoring::new(Ok(verdict(true, 0.6)));
        let mut vm = RiskAssessmentViewModel::new(client);
        fill(&mut vm);
        vm.update_field(FormField::Category, "food").unwrap();
        vm.submit().await.unwrap();

        vm.reset();
        let first = (vm.state().clone(), vm.form().clone(), vm.field_errors().clone());
        vm.reset();
        let second = (vm.state().clone(), vm.form().clone(), vm.field_errors().clone());
        assert_eq!(first, second);
        assert_eq!(first.0, AssessmentState::Editing);
        assert_eq!(first.1, FormState::default());
        assert!(first.2.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let client = FixedScoring::new(Ok(verdict(false, 0.1)));
        let mut vm = RiskAssessmentViewModel::new(client);
        let err = vm.update_field(FormField::Category, "crypto").unwrap_err();
        assert!(matches!(err, CoreError::InvalidField { .. }));
        assert_eq!(vm.form().category, Category::Personal);
    }

    #[tokio::test]
    async fn test_stale_scoring_response_is_dropped() {
        let client = FixedScoring::new(Ok(verdict(false, 0.1)));
        let mut vm = RiskAssessmentViewModel::new(client);
        fill(&mut vm);

        let (ticket, request) = match vm.begin_submit().unwrap() {
            PreparedSubmission::Ready { ticket, request } => (ticket, request),
            other => panic!("unexpected: {:?}", other),
        };
        assert!(vm.is_submitting());
        vm.reset();

        let outcome = vm.finish_submit(ticket, request, Ok(verdict(true, 0.99)));
        assert_eq!(outcome, SubmitOutcome::Superseded);
        assert!(vm.result().is_none());
        assert_eq!(vm.state(), &AssessmentState::Editing);
    }

    #[tokio::test]
    async fn test_shared_submit_supersedes_in_flight() {
        let client = Arc::new(GatedScoring {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let vm = Arc::new(RwLock::new(RiskAssessmentViewModel::new(client.clone())));
        fill(&mut *vm.write().await);

        let first = tokio::spawn({
            let vm = vm.clone();
            async move { RiskAssessmentViewModel::submit_shared(&vm).await }
        });
        while client.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let second = RiskAssessmentViewModel::submit_shared(&vm).await.unwrap();
        assert_eq!(second, SubmitOutcome::Assessed { tier: RiskTier::Low });
        client.gate.notify_one();

        assert_eq!(first.await.unwrap().unwrap(), SubmitOutcome::Superseded);
        assert_eq!(vm.read().await.result().unwrap().tier(), RiskTier::Low);
    }

    #[tokio::test]
    async fn test_verdict_lands_after_caller_is_dropped() {
        let client = Arc::new(GatedScoring {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let vm = Arc::new(RwLock::new(RiskAssessmentViewModel::new(client.clone())));
        fill(&mut *vm.write().await);

        let caller = tokio::spawn({
            let vm = vm.clone();
            async move { RiskAssessmentViewModel::submit_shared(&vm).await }
        });
        while client.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        caller.abort();
        assert!(caller.await.unwrap_err().is_cancelled());
        assert!(vm.read().await.is_submitting());

        client.gate.notify_one();
        while vm.read().await.is_submitting() {
            tokio::task::yield_now().await;
        }

        let vm = vm.read().await;
        assert_eq!(vm.state().as_str(), "result");
        assert_eq!(vm.result().unwrap().tier(), RiskTier::High);
    }
}
