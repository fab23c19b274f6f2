// Part 3: Booking submission workflow
// Drives the booking form through Idle -> Submitting -> Success | Error against a backend.

use crate::models::{ApiResponse, Booking, BookingRequest};
use crate::part1_booking::{
    validate_draft, BookingDraft, DraftField, DraftUpdate, ValidationError, ValidationReport,
};
use async_trait::async_trait;
use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_SUBMIT_DELAY_MS: u64 = 2000;

// Shown to the guest whenever submission fails; the cause only goes to the log
pub const SUBMISSION_FAILED_MESSAGE: &str = "Failed to submit booking. Please try again.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError {
        status_code: u16,
        message: String,
        is_retryable: bool,
    },

    #[error("Booking rejected: {0}")]
    Rejected(String),
}

impl ApiError {
    // Whether sending the same request again may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::NetworkError(_) => true,
            ApiError::ApiResponseError { is_retryable, .. } => *is_retryable,
            ApiError::Rejected(_) => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    // Simulated round trip of the mock backend
    pub submit_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            submit_delay_ms: DEFAULT_SUBMIT_DELAY_MS,
        }
    }
}

impl ClientConfig {
    // Reads HOTEL_API_URL and HOTEL_SUBMIT_DELAY_MS, falling back to the defaults
    pub fn from_env() -> Result<Self, ClientError> {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var("HOTEL_API_URL") {
            config.base_url = base_url;
        }
        if let Ok(delay) = std::env::var("HOTEL_SUBMIT_DELAY_MS") {
            config.submit_delay_ms = delay.trim().parse().map_err(|_| {
                ClientError::ConfigError(format!("HOTEL_SUBMIT_DELAY_MS is not a number: {}", delay))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.base_url.trim().is_empty() {
            return Err(ClientError::ConfigError("base_url must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }
}

// Suspension point standing in for network latency
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self);
}

#[derive(Debug, Clone, Copy)]
pub struct SleepDelay(pub Duration);

#[async_trait]
impl Delay for SleepDelay {
    async fn wait(&self) {
        tokio::time::sleep(self.0).await;
    }
}

// Resolves immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self) {}
}

// Backend seam for creating bookings
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn create_booking(&self, request: BookingRequest) -> Result<ApiResponse<Booking>, ApiError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Idle,
    Success { booking_id: String, message: String },
    Error { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Submitting,
    Success,
    Error,
}

impl SubmissionPhase {
    // The submit button is disabled while a request is in flight
    pub fn submit_enabled(self) -> bool {
        self != SubmissionPhase::Submitting
    }
}

// Result of a single press of the submit button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAttempt {
    Rejected(ValidationReport),
    Finished(SubmissionOutcome),
    Cancelled,
}

// Fired by the view when it goes away
#[derive(Debug)]
pub struct Teardown {
    tx: watch::Sender<bool>,
}

#[derive(Debug, Clone)]
pub struct TeardownSignal {
    rx: watch::Receiver<bool>,
}

pub fn teardown_channel() -> (Teardown, TeardownSignal) {
    let (tx, rx) = watch::channel(false);
    (Teardown { tx }, TeardownSignal { rx })
}

impl Teardown {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl TeardownSignal {
    pub fn is_torn_down(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    // Completes once teardown fires or the Teardown handle is dropped
    pub async fn torn_down(mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Booking form state owned by one booking page.
///
/// `submit` borrows the form mutably for the whole round trip, so a form can never have
/// two submissions in flight. Views observe progress through [`BookingForm::subscribe`].
#[derive(Debug)]
pub struct BookingForm {
    draft: BookingDraft,
    outcome: SubmissionOutcome,
    last_report: ValidationReport,
    phase: watch::Sender<SubmissionPhase>,
}

impl Default for BookingForm {
    fn default() -> Self {
        Self::new(BookingDraft::default())
    }
}

impl BookingForm {
    pub fn new(draft: BookingDraft) -> Self {
        let (phase, _) = watch::channel(SubmissionPhase::Idle);
        Self {
            draft,
            outcome: SubmissionOutcome::Idle,
            last_report: ValidationReport::default(),
            phase,
        }
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn outcome(&self) -> &SubmissionOutcome {
        &self.outcome
    }

    pub fn last_report(&self) -> &ValidationReport {
        &self.last_report
    }

    pub fn phase(&self) -> SubmissionPhase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionPhase> {
        self.phase.subscribe()
    }

    pub fn update(&mut self, update: DraftUpdate) {
        self.draft.apply(update);
    }

    pub fn update_from_form(&mut self, name: &str, value: &str) -> Result<(), ValidationError> {
        self.draft.apply_form_change(name, value)
    }

    pub async fn submit(&mut self, api: &dyn BookingApi) -> SubmitAttempt {
        self.submit_until(api, std::future::pending::<()>()).await
    }

    pub async fn submit_with_teardown(
        &mut self,
        api: &dyn BookingApi,
        teardown: TeardownSignal,
    ) -> SubmitAttempt {
        self.submit_until(api, teardown.torn_down()).await
    }

    // Runs one submission; if `cancelled` completes first the request is dropped and the
    // form is left as it was before the submit press
    async fn submit_until<C>(&mut self, api: &dyn BookingApi, cancelled: C) -> SubmitAttempt
    where
        C: Future<Output = ()>,
    {
        let report = validate_draft(&self.draft);
        if !report.is_valid() {
            let fields: Vec<DraftField> = report.errors().keys().copied().collect();
            warn!(?fields, "booking form rejected");
            self.last_report = report.clone();
            return SubmitAttempt::Rejected(report);
        }
        self.last_report = report;

        let previous_phase = self.phase();
        let previous_outcome = std::mem::replace(&mut self.outcome, SubmissionOutcome::Idle);
        self.phase.send_replace(SubmissionPhase::Submitting);

        let request = BookingRequest::from_draft(&self.draft, Utc::now());
        let total_price = request.total_price;

        let result = tokio::select! {
            result = api.create_booking(request) => result,
            _ = cancelled => {
                info!("booking form torn down during submission");
                self.outcome = previous_outcome;
                self.phase.send_replace(previous_phase);
                return SubmitAttempt::Cancelled;
            }
        };

        let (outcome, phase) = match result {
            Ok(response) => match (response.success, response.data) {
                (true, Some(booking)) => {
                    info!(booking_id = %booking.id, total_price, "booking confirmed");
                    self.draft.reset();
                    let outcome = SubmissionOutcome::Success {
                        message: format!("Booking confirmed! Your booking ID is: {}", booking.id),
                        booking_id: booking.id,
                    };
                    (outcome, SubmissionPhase::Success)
                }
                _ => {
                    error!(
                        response_message = %response.message,
                        error = ?response.error,
                        "booking submission error"
                    );
                    (submission_failed(), SubmissionPhase::Error)
                }
            },
            Err(e) => {
                error!(error = %e, retryable = e.is_retryable(), "booking submission error");
                (submission_failed(), SubmissionPhase::Error)
            }
        };

        self.outcome = outcome.clone();
        self.phase.send_replace(phase);

        SubmitAttempt::Finished(outcome)
    }
}

fn submission_failed() -> SubmissionOutcome {
    SubmissionOutcome::Error {
        message: SUBMISSION_FAILED_MESSAGE.to_string(),
    }
}
